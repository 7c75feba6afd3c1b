//! Address types.

use serde::{Deserialize, Serialize};

/// Customer destination address from a shipping override request.
///
/// Every field is opaque and passed through to the rate provider unmodified.
/// Fields Cashier omits deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationAddress {
    #[serde(rename = "address1", default)]
    pub address_line: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub province_code: String,
    #[serde(default)]
    pub postal_code: String,
}

/// Store address substituted into checkout for pick-up orders.
///
/// The plugin always sends the configured default store; customers cannot pick
/// a location yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address: String,
    pub address2: String,
    pub phone: String,
    pub city: String,
    pub province: String,
    pub province_code: String,
    pub country: String,
    pub country_code: String,
    pub postal_code: String,
    pub update_billing: bool,
    pub different_billing_address: bool,
}

impl Default for PickupAddress {
    fn default() -> Self {
        Self {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            company: "Bold Commerce Ltd".to_string(),
            address: "50 Fultz Blvd".to_string(),
            address2: "Another Address Line".to_string(),
            phone: "204-678-9087".to_string(),
            city: "Winnipeg".to_string(),
            province: "Manitoba".to_string(),
            province_code: "MB".to_string(),
            country: "Canada".to_string(),
            country_code: "CA".to_string(),
            postal_code: "R3Y 0L6".to_string(),
            update_billing: false,
            different_billing_address: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_reads_address1() {
        let address: DestinationAddress = serde_json::from_value(serde_json::json!({
            "address1": "123 Main St",
            "city": "Austin",
            "country_code": "US",
            "province_code": "TX",
            "postal_code": "78701"
        }))
        .unwrap();

        assert_eq!(address.address_line, "123 Main St");
        assert_eq!(address.province_code, "TX");
    }

    #[test]
    fn test_destination_missing_fields_are_empty() {
        let address: DestinationAddress =
            serde_json::from_value(serde_json::json!({ "city": "Austin" })).unwrap();
        assert_eq!(address.city, "Austin");
        assert!(address.postal_code.is_empty());
    }

    #[test]
    fn test_pickup_address_wire_names() {
        let value = serde_json::to_value(PickupAddress::default()).unwrap();
        assert_eq!(value["address2"], "Another Address Line");
        assert_eq!(value["province_code"], "MB");
        assert_eq!(value["different_billing_address"], true);
    }
}
