pub mod manager;
pub mod models;
pub mod orchestrator;
pub mod repository;

pub use manager::{OrderAdmin, OrderError};
pub use models::{Order, OrderStatus};
pub use orchestrator::{OrderPipeline, PipelineConfig, PipelineError, PipelineReport};
pub use repository::{OrderStats, OrderStore};
