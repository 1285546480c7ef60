use shared::domain::{coerce_minutes, minutes_meet_minimum, SyllabusId};

use crate::state::{SessionState, WorkflowPolicy};

/// True when the inputs are complete enough to trigger a query.
pub fn query_ready(syllabus_id: Option<&SyllabusId>, heading: &str, minutes: &str) -> bool {
    syllabus_id.is_some()
        && !heading.trim().is_empty()
        && minutes_meet_minimum(coerce_minutes(minutes))
}

/// Whether the "generate plan" control is enabled for `state`.
pub fn can_ask(state: &SessionState, policy: WorkflowPolicy) -> bool {
    if state.asking() || (!policy.allow_query_during_upload && state.uploading()) {
        return false;
    }
    query_ready(state.syllabus_id(), state.heading(), state.minutes_input())
}

/// Whether the upload control is enabled for `state`.
pub fn can_upload(state: &SessionState, policy: WorkflowPolicy) -> bool {
    !(state.uploading() || (!policy.allow_query_during_upload && state.asking()))
}
