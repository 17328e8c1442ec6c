//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case.

pub mod logging;
pub mod migration;
mod transfer;

pub use logging::{
    EventFilter, EventKind, EventRecord, FailureCount, LogEvent, LoggingService, TransferSummary,
};
pub use migration::{MigrationResult, MigrationService};
pub use transfer::TransferService;
