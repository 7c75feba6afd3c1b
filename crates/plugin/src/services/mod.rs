//! Business logic services.

pub mod settings;
pub mod shipping;

pub use settings::settings_schema;
pub use shipping::ShippingRateAggregator;
