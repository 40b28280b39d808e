pub mod gateway;
pub mod modelgen;
pub mod vendor;

pub use gateway::{ChatGateway, MockChatGateway};
pub use modelgen::{GeneratedModel, MockModelGenerator, ModelGenerator};
pub use vendor::{
    MockPrintVendor, PrintVendorClient, QuoteSet, ShippingAddress, VendorOrder,
    VendorOrderStatus, VendorQuote,
};

/// Boxed error type shared by the external-collaborator traits. The callers
/// decide what is retryable; adapters just surface what the wire said.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
