//! Shipping rate types.
//!
//! Both upstream sources (Cashier's paid shipping lines and the free pickup
//! location lookup) are normalized into the same [`RateResponse`] shape that
//! checkout accepts as a shipping override.

use std::fmt;
use std::marker::PhantomData;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

use super::money::minor_units_to_display;

/// Override name reported for rates fetched from Cashier.
pub const STANDARD_RATE_NAME: &str = "My Custom Shipping Override";

/// Override name reported for pickup locations.
pub const PICKUP_RATE_NAME: &str = "Pick up: ";

/// One selectable rate in a shipping override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRateQuote {
    pub line_text: String,
    /// Display amount in the standard currency unit.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl ShippingRateQuote {
    /// Quote for a paid shipping line; the provider price is in minor units.
    #[must_use]
    pub fn from_shipping_line(line: ShippingLine) -> Self {
        Self {
            line_text: line.shipping.name,
            value: minor_units_to_display(line.shipping.price),
        }
    }

    /// Quote for a pickup location. Pickup is always free.
    #[must_use]
    pub fn from_pickup_location(location: PickupLocation) -> Self {
        Self {
            line_text: location.name,
            value: Decimal::ZERO,
        }
    }
}

/// Shipping override returned to checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateResponse {
    pub name: String,
    pub rates: Vec<ShippingRateQuote>,
}

impl RateResponse {
    /// Build the override for a standard order, keeping provider order.
    #[must_use]
    pub fn standard(lines: Vec<ShippingLine>) -> Self {
        Self {
            name: STANDARD_RATE_NAME.to_string(),
            rates: lines
                .into_iter()
                .map(ShippingRateQuote::from_shipping_line)
                .collect(),
        }
    }

    /// Build the override for a pick-up order, one free rate per location.
    #[must_use]
    pub fn pickup(locations: Vec<PickupLocation>) -> Self {
        Self {
            name: PICKUP_RATE_NAME.to_string(),
            rates: locations
                .into_iter()
                .map(ShippingRateQuote::from_pickup_location)
                .collect(),
        }
    }
}

// =============================================================================
// Upstream Shapes
// =============================================================================

/// A shipping line entry from Cashier's `shipping_lines` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLine {
    pub shipping: ShippingLineDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingLineDetails {
    pub name: String,
    /// Price in minor units.
    pub price: Decimal,
}

/// Response body of Cashier's `shipping_lines` endpoint.
///
/// `shipping_lines` arrives keyed by line id; only the values matter, in the
/// order the provider sent them. A plain array is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShippingLinesResponse {
    #[serde(deserialize_with = "ordered_values")]
    pub shipping_lines: Vec<ShippingLine>,
}

/// A candidate pickup location from the location provider.
///
/// Providers send many more fields; only `name` is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupLocation {
    pub name: String,
}

/// Deserialize either a JSON object or array into its values, in document order.
fn ordered_values<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OrderedValues<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedValues<T> {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map or sequence of shipping lines")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut values = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((_, value)) = map.next_entry::<de::IgnoredAny, T>()? {
                values.push(value);
            }
            Ok(values)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(value) = seq.next_element()? {
                values.push(value);
            }
            Ok(values)
        }
    }

    deserializer.deserialize_any(OrderedValues(PhantomData))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_response_converts_minor_units() {
        let body: ShippingLinesResponse = serde_json::from_str(
            r#"{"shipping_lines":{"L1":{"shipping":{"name":"Ground","price":599}}}}"#,
        )
        .unwrap();

        let response = RateResponse::standard(body.shipping_lines);
        assert_eq!(response.name, "My Custom Shipping Override");
        assert_eq!(
            response.rates,
            vec![ShippingRateQuote {
                line_text: "Ground".to_string(),
                value: Decimal::new(599, 2),
            }]
        );
    }

    #[test]
    fn test_shipping_lines_keep_document_order() {
        // Keys deliberately out of lexical order
        let body: ShippingLinesResponse = serde_json::from_str(
            r#"{"shipping_lines":{
                "z":{"shipping":{"name":"Express","price":1500}},
                "a":{"shipping":{"name":"Ground","price":599}},
                "m":{"shipping":{"name":"Overnight","price":3000}}
            }}"#,
        )
        .unwrap();

        let names: Vec<_> = body
            .shipping_lines
            .iter()
            .map(|l| l.shipping.name.as_str())
            .collect();
        assert_eq!(names, ["Express", "Ground", "Overnight"]);
    }

    #[test]
    fn test_shipping_lines_accepts_array() {
        let body: ShippingLinesResponse = serde_json::from_str(
            r#"{"shipping_lines":[{"shipping":{"name":"Ground","price":599}}]}"#,
        )
        .unwrap();
        assert_eq!(body.shipping_lines.len(), 1);
    }

    #[test]
    fn test_shipping_lines_rejects_malformed() {
        let result = serde_json::from_str::<ShippingLinesResponse>(
            r#"{"shipping_lines":{"L1":{"shipping":{"name":"Ground"}}}}"#,
        );
        assert!(result.is_err());

        let result = serde_json::from_str::<ShippingLinesResponse>(r#"{"shipping_lines":"nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_pickup_response_is_free() {
        let locations: Vec<PickupLocation> =
            serde_json::from_str(r#"[{"name":"Store A","id":"1","mass":"21"}]"#).unwrap();

        let response = RateResponse::pickup(locations);
        assert_eq!(response.name, "Pick up: ");
        assert_eq!(response.rates.len(), 1);
        assert_eq!(response.rates[0].line_text, "Store A");
        assert_eq!(response.rates[0].value, Decimal::ZERO);
    }

    #[test]
    fn test_quote_value_serializes_as_number() {
        let quote = ShippingRateQuote {
            line_text: "Ground".to_string(),
            value: Decimal::new(599, 2),
        };
        let value = serde_json::to_value(&quote).unwrap();
        assert_eq!(value["value"].as_f64(), Some(5.99));
        assert_eq!(value["line_text"], "Ground");
    }
}
