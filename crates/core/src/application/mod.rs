// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod locks;
pub mod queue_service;
pub mod retry;

// Re-exports
pub use queue_service::{AdvanceResult, CoordinatorConfig, CreateQueueRequest, QueueCoordinator};
