use shared::domain::{DEFAULT_HEADING, DEFAULT_MINUTES};
use tracing::debug;

use crate::state::{SessionState, WorkflowPolicy};

/// Restores inputs and outcomes to their defaults. In-flight requests keep running; under a
/// policy with `discard_stale_responses` their tickets are forgotten so the responses are
/// dropped when they arrive.
pub fn reset(state: &SessionState, policy: WorkflowPolicy) -> SessionState {
    let mut next = state.clone();
    next.file = None;
    next.syllabus_id = None;
    next.heading = DEFAULT_HEADING.to_string();
    next.minutes = DEFAULT_MINUTES.to_string();
    next.clear_outcome();

    if policy.discard_stale_responses {
        if let Some(ticket) = next.pending_upload.take() {
            debug!(ticket = ticket.0, "reset detached in-flight upload");
        }
        if let Some(ticket) = next.pending_query.take() {
            debug!(ticket = ticket.0, "reset detached in-flight query");
        }
    }
    next
}
