//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod command_rx;
pub mod limit_watch;
pub mod motion;
pub mod telemetry_tx;

pub use command_rx::command_rx_task;
pub use limit_watch::LimitWatch;
pub use motion::motion_task;
pub use telemetry_tx::telemetry_tx_task;
