//! Application layer for FluxDone.
//!
//! This crate owns the task store and mediates every mutation through a
//! persistence gateway, plus the configuration and token parsing shared by
//! front ends.

pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod input;
pub mod mediator;
pub mod memory_gateway;
pub mod task_store;

// Re-exports for convenience
pub use config::FluxConfig;
pub use error::{TaskOp, TaskOpError};
pub use events::StoreEvent;
pub use gateway::TaskGateway;
pub use input::{
    ParseError, parse_category, parse_due_date, parse_priority, parse_sort_mode, parse_timestamp,
    parse_utc_offset,
};
pub use mediator::{AddTask, TaskMediator, ViewState};
pub use memory_gateway::{GatewayCall, MemoryGateway, MemoryGatewayError};
pub use task_store::{DuplicateTask, TaskStore};
