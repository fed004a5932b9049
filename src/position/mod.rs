//! Position tracking and the execution seam
//!
//! The monitor holds at most one directional position. Transitions are
//! computed by [`PositionStateMachine::evaluate`], persisted by the caller,
//! then committed; the committed transition is forwarded to an
//! [`ExecutionPort`].

pub mod execution;
pub mod machine;

pub use execution::{ExecutionAction, ExecutionIntent, ExecutionPort, NoopExecution, Side};
pub use machine::{is_legal, unrealized_pct, PositionStateMachine, Transition};
