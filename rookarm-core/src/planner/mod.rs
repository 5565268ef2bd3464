//! Chess action planner
//!
//! Pure decomposition logic: squares map to gantry steps, and each
//! [`PlannerAction`] expands into pickup/place [`Primitive`]s, each of
//! which expands into an ordered list of [`MotionStep`]s for the executor.
//!
//! Ordering rule: a piece that must leave a square is always cleared
//! before the moving piece arrives there.

pub mod action;
pub mod primitive;
pub mod square;

pub use action::{PlannerAction, MAX_PRIMITIVES};
pub use primitive::{MotionStep, Primitive, MAX_STEPS};
pub use square::ChessSquare;
