//! Controller layer: pure state transitions for upload, query, gating and reset.
//!
//! Every controller takes the current [`SessionState`] plus its input and returns the next
//! state together with an effect describing what the caller has to do next. Nothing here
//! performs I/O; [`crate::workflow::Workflow`] executes the effects against a backend.

pub mod gate;
pub mod query;
pub mod reset;
pub mod upload;

use crate::state::SessionState;

pub use gate::{can_ask, can_upload, query_ready};
pub use query::{begin_query, complete_query, validate_query, QueryEffect};
pub use reset::reset;
pub use upload::{begin_upload, complete_upload, validate_upload, UploadEffect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<E> {
    pub state: SessionState,
    pub effect: E,
}

impl<E> Transition<E> {
    fn new(state: SessionState, effect: E) -> Self {
        Self { state, effect }
    }
}

/// Result of folding a response back into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The request was no longer pending (reset under the strict policy); state untouched.
    Discarded,
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
