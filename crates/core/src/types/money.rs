//! Monetary conversion using decimal arithmetic.
//!
//! Cashier reports shipping prices in the currency's minor unit (cents for
//! USD/CAD). Checkout rate overrides expect the standard unit, so every
//! conversion goes through `rust_decimal` to stay exact.

use rust_decimal::Decimal;

/// Number of minor units in one standard unit.
const MINOR_UNITS_PER_UNIT: Decimal = Decimal::ONE_HUNDRED;

/// Convert an amount in minor units (e.g. `599` cents) to its display amount
/// (e.g. `5.99`).
#[must_use]
pub fn minor_units_to_display(minor: Decimal) -> Decimal {
    (minor / MINOR_UNITS_PER_UNIT).normalize()
}
