//! Hardware abstraction seams
//!
//! The controller is generic over a [`Board`], which names the concrete
//! pin, delay and servo types of one target. The executor only sees the
//! machine through [`Manipulator`]. Host tests use the mocks in `mock`.

pub mod board;
pub mod manipulator;
#[cfg(test)]
pub(crate) mod mock;

pub use board::Board;
pub use manipulator::{Manipulator, Progress};
