//! Plugin settings form definition.
//!
//! Cashier renders the plugin's settings page from this schema. Values are not
//! stored yet, so every field is returned with its empty default.

use serde_json::{Value, json};

/// The settings form schema shown in the Cashier admin.
#[must_use]
pub fn settings_schema() -> Value {
    json!({
        "shortString1": {
            "text": "This is a short string field",
            "type": "stringShort",
            "tooltip": "Short string tooltip",
            "placeholder": "Short string placeholder",
            "value": "",
            "validation_schema": {}
        },
        "regularString1": {
            "text": "This is a regular string field ",
            "type": "string",
            "tooltip": "Regular string tooltip",
            "placeholder": "Regular string placeholder",
            "value": "",
            "validation_schema": {}
        },
        "number1": {
            "text": "This is a number field",
            "type": "number",
            "tooltip": "number tooltip",
            "placeholder": "Number placeholder",
            "value": "",
            "validation_schema": {}
        },
        "checkbox1": {
            "text": "This is a checkbox",
            "type": "checkbox",
            "tooltip": "checkbox tooltip",
            "value": "",
            "validation_schema": {}
        },
        "link1": {
            "text": "This is a link",
            "type": "link",
            "value": "https://www.google.ca",
            "validation_schema": {}
        },
        "horizontalRule1": {
            "type": "horizontalRule",
            "validation_schema": {}
        },
        "header1": {
            "text": "This is a header",
            "type": "header",
            "tooltip": "This is a header tooltip",
            "validation_schema": {}
        },
        "toggle1": {
            "text": "This is a toggle",
            "type": "toggle",
            "tooltip": "toggle tooltip",
            "value": 1,
            "validation_schema": {}
        },
        "validationExampleNumber1": {
            "text": "This is required when the toggle is checked",
            "type": "number",
            "tooltip": "Turn off toggle to not require this field",
            "placeholder": "Number placeholder",
            "value": "",
            "validation_schema": {
                "required_if": {
                    "target": "toggle1",
                    "errorText": "Required when toggle is on"
                },
                "min": {
                    "value": 5,
                    "errorText": "Must be greater than 5"
                },
                "max": {
                    "value": 1000,
                    "errorText": "Must be less than 1000"
                }
            }
        }
    })
}
