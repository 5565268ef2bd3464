//! Action scheduling
//!
//! Queues planner actions and executes them one at a time against the
//! machine without blocking the motion tick.

pub mod executor;
pub mod queue;

pub use executor::{ActionExecutor, ExecutionReport};
pub use queue::{ActionQueue, QUEUE_CAPACITY};
