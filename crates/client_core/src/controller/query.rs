use shared::{
    domain::{coerce_minutes, validated_minutes, SyllabusId},
    error::{ValidationError, WorkflowError, CHAT_FAILED},
    protocol::{ChatRequest, ChatResponse},
};
use tracing::{debug, info, warn};

use super::{Completion, Transition};
use crate::state::{RequestTicket, SessionState, WorkflowPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEffect {
    Submit {
        ticket: RequestTicket,
        request: ChatRequest,
    },
    Rejected(ValidationError),
    Blocked(ValidationError),
}

/// Checks the query preconditions in order: session, heading, then minutes.
pub fn validate_query(
    syllabus_id: Option<&SyllabusId>,
    heading: &str,
    minutes: &str,
) -> Result<ChatRequest, ValidationError> {
    let syllabus_id = syllabus_id.ok_or(ValidationError::MissingSession)?;
    if heading.trim().is_empty() {
        return Err(ValidationError::EmptyHeading);
    }
    let minutes =
        validated_minutes(coerce_minutes(minutes)).ok_or(ValidationError::MinutesOutOfRange)?;

    Ok(ChatRequest {
        syllabus_id: syllabus_id.clone(),
        heading: heading.to_string(),
        minutes,
    })
}

pub fn begin_query(state: &SessionState, policy: WorkflowPolicy) -> Transition<QueryEffect> {
    if state.asking() {
        debug!("query already in flight; ignoring duplicate trigger");
        return Transition::new(
            state.clone(),
            QueryEffect::Blocked(ValidationError::QueryInProgress),
        );
    }
    if !policy.allow_query_during_upload && state.uploading() {
        debug!("upload in flight; query locked by policy");
        return Transition::new(
            state.clone(),
            QueryEffect::Blocked(ValidationError::UploadInProgress),
        );
    }

    let mut next = state.clone();
    next.clear_outcome();

    let request = match validate_query(state.syllabus_id(), state.heading(), state.minutes_input())
    {
        Ok(request) => request,
        Err(err) => {
            next.record_error(err.to_string());
            return Transition::new(next, QueryEffect::Rejected(err));
        }
    };

    let ticket = next.issue_ticket();
    next.pending_query = Some(ticket);
    debug!(
        ticket = ticket.0,
        syllabus_id = %request.syllabus_id,
        heading = %request.heading,
        minutes = request.minutes,
        "query issued"
    );
    Transition::new(next, QueryEffect::Submit { ticket, request })
}

pub fn complete_query(
    state: &SessionState,
    ticket: RequestTicket,
    outcome: &Result<ChatResponse, WorkflowError>,
) -> Transition<Completion> {
    if state.pending_query != Some(ticket) {
        warn!(ticket = ticket.0, "discarding stale query response");
        return Transition::new(state.clone(), Completion::Discarded);
    }

    let mut next = state.clone();
    next.pending_query = None;
    match outcome {
        Ok(response) => {
            info!(ticket = ticket.0, answer_len = response.answer.len(), "study plan received");
            next.record_answer(response.answer.clone());
        }
        Err(err) => {
            let message = err.display_message(CHAT_FAILED);
            warn!(ticket = ticket.0, kind = ?err.kind(), %message, "query failed");
            next.record_error(message);
        }
    }
    Transition::new(next, Completion::Applied)
}
