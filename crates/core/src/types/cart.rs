//! Cart types and validation.
//!
//! Cashier sends line items as loosely-typed JSON. [`CartLineItemPayload`]
//! mirrors that shape; [`Cart::from_payload`] validates it into a [`Cart`] of
//! [`CartLineItem`]s so the rest of the crate never sees a missing title.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The cart payload could not be turned into a valid [`Cart`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCartError {
    /// A line item had no `title` field.
    #[error("line item {index} is missing a title")]
    MissingTitle { index: usize },

    /// A line item reported a negative weight.
    #[error("line item {index} has a negative weight")]
    NegativeWeight { index: usize },

    /// A line item reported a negative quantity.
    #[error("line item {index} has a negative quantity")]
    NegativeQuantity { index: usize },

    /// The event payload carried no cart object.
    #[error("event payload has no cart")]
    MissingCart,
}

/// A line item exactly as Cashier sends it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItemPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub weight: Decimal,
}

/// A validated cart line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    pub title: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub weight: Decimal,
}

/// Line item as forwarded to the rate provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedLineItem {
    #[serde(serialize_with = "json_number::serialize")]
    pub price: Decimal,
    #[serde(serialize_with = "json_number::serialize")]
    pub quantity: Decimal,
    #[serde(serialize_with = "json_number::serialize")]
    pub grams: Decimal,
}

/// Serialize a `Decimal` the way it arrived as a JSON number: whole values as
/// integers (`1999`), everything else as a float (`12.5`).
mod json_number {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::ToPrimitive;
    use serde::{Serializer, ser};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(whole) = value.fract().is_zero().then(|| value.to_i64()).flatten() {
            return serializer.serialize_i64(whole);
        }

        let float = value
            .to_f64()
            .ok_or_else(|| ser::Error::custom(format!("{value} is not representable as f64")))?;
        serializer.serialize_f64(float)
    }
}

impl From<&CartLineItem> for NormalizedLineItem {
    fn from(item: &CartLineItem) -> Self {
        Self {
            price: item.price,
            quantity: item.quantity,
            grams: item.weight,
        }
    }
}

/// An ordered, validated cart. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create a cart from already-validated line items.
    #[must_use]
    pub const fn new(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }

    /// Validate raw line items into a cart, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCartError`] for the first item that has no title, a
    /// negative weight or a negative quantity.
    pub fn from_payload(payload: Vec<CartLineItemPayload>) -> Result<Self, InvalidCartError> {
        let items = payload
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let title = item.title.ok_or(InvalidCartError::MissingTitle { index })?;
                if item.weight.is_sign_negative() && !item.weight.is_zero() {
                    return Err(InvalidCartError::NegativeWeight { index });
                }
                if item.quantity.is_sign_negative() && !item.quantity.is_zero() {
                    return Err(InvalidCartError::NegativeQuantity { index });
                }
                Ok(CartLineItem {
                    title,
                    price: item.price,
                    quantity: item.quantity,
                    weight: item.weight,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { items })
    }

    /// Line items in cart order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line items reduced to what the rate provider needs, in cart order.
    #[must_use]
    pub fn normalized_items(&self) -> Vec<NormalizedLineItem> {
        self.items.iter().map(NormalizedLineItem::from).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn payload(title: Option<&str>) -> CartLineItemPayload {
        CartLineItemPayload {
            title: title.map(String::from),
            price: Decimal::from(1999),
            quantity: Decimal::from(2),
            weight: Decimal::from(450),
        }
    }

    #[test]
    fn test_from_payload_keeps_order() {
        let cart =
            Cart::from_payload(vec![payload(Some("Tea")), payload(Some("Mug"))]).unwrap();
        let titles: Vec<_> = cart.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Tea", "Mug"]);
    }

    #[test]
    fn test_from_payload_missing_title() {
        let err = Cart::from_payload(vec![payload(Some("Tea")), payload(None)]).unwrap_err();
        assert_eq!(err, InvalidCartError::MissingTitle { index: 1 });
    }

    #[test]
    fn test_from_payload_negative_weight() {
        let mut item = payload(Some("Tea"));
        item.weight = Decimal::from(-1);
        let err = Cart::from_payload(vec![item]).unwrap_err();
        assert_eq!(err, InvalidCartError::NegativeWeight { index: 0 });
    }

    #[test]
    fn test_from_payload_negative_quantity() {
        let mut item = payload(Some("Tea"));
        item.quantity = Decimal::from(-2);
        let err = Cart::from_payload(vec![payload(Some("Mug")), item]).unwrap_err();
        assert_eq!(err, InvalidCartError::NegativeQuantity { index: 1 });
    }

    #[test]
    fn test_empty_payload_is_empty_cart() {
        let cart = Cart::from_payload(Vec::new()).unwrap();
        assert!(cart.is_empty());
        assert!(cart.normalized_items().is_empty());
    }

    #[test]
    fn test_payload_defaults_numeric_fields() {
        let item: CartLineItemPayload =
            serde_json::from_value(serde_json::json!({ "title": "Tea" })).unwrap();
        assert_eq!(item.price, Decimal::ZERO);
        assert_eq!(item.quantity, Decimal::ZERO);
        assert_eq!(item.weight, Decimal::ZERO);
    }

    #[test]
    fn test_payload_accepts_json_numbers() {
        let item: CartLineItemPayload = serde_json::from_value(serde_json::json!({
            "title": "Tea",
            "price": 1999,
            "quantity": 3,
            "weight": 12.5
        }))
        .unwrap();
        assert_eq!(item.price, Decimal::from(1999));
        assert_eq!(item.weight, Decimal::new(125, 1));
    }

    #[test]
    fn test_payload_accepts_fractional_quantity() {
        let item: CartLineItemPayload = serde_json::from_value(serde_json::json!({
            "title": "Tea",
            "quantity": 1.0
        }))
        .unwrap();
        assert_eq!(item.quantity, Decimal::ONE);
    }

    #[test]
    fn test_normalized_items_wire_shape() {
        let cart = Cart::from_payload(vec![payload(Some("Tea"))]).unwrap();
        let value = serde_json::to_value(cart.normalized_items()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "price": 1999, "quantity": 2, "grams": 450 }])
        );
        assert_eq!(
            serde_json::to_string(&cart.normalized_items()).unwrap(),
            r#"[{"price":1999,"quantity":2,"grams":450}]"#
        );
    }

    #[test]
    fn test_normalized_items_keep_fractions() {
        let mut item = payload(Some("Tea"));
        item.price = Decimal::new(1999, 2);
        item.quantity = Decimal::new(10, 1);
        item.weight = Decimal::new(125, 1);
        let cart = Cart::from_payload(vec![item]).unwrap();

        assert_eq!(
            serde_json::to_string(&cart.normalized_items()).unwrap(),
            r#"[{"price":19.99,"quantity":1,"grams":12.5}]"#
        );
    }
}
