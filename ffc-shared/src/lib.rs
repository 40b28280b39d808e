pub mod ids;
pub mod pii;

pub use ids::OrderId;
pub use pii::Masked;
