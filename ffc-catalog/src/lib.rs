pub mod materials;
pub mod pricing;

pub use materials::{FulfillmentMode, Material, SizeClass};
pub use pricing::{PriceBreakdown, PricingConfig, QuoteCalculator};
