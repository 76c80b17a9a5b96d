//! Transaction coordination.
//!
//! Every mutating action runs through one state machine:
//! `Idle -> Submitting -> AwaitingFinality -> Succeeded | Failed -> Idle`.
//! At most one action is in flight per coordinator.

mod coordinator;
mod outcome;

pub use coordinator::*;
pub use outcome::*;
