//! HTTP adapters for the three external collaborators: the chat gateway,
//! the photo-to-model automation sidecar, and the cloud print vendor.

pub mod gateway;
pub mod modelgen;
pub mod vendor;

pub use gateway::HttpChatGateway;
pub use modelgen::HttpModelGenerator;
pub use vendor::HttpPrintVendor;
