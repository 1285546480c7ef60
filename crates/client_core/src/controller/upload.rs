use shared::{
    domain::PdfFile,
    error::{ValidationError, WorkflowError, UPLOAD_FAILED},
    protocol::UploadResponse,
};
use tracing::{debug, info, warn};

use super::{Completion, Transition};
use crate::state::{RequestTicket, SessionState, WorkflowPolicy};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEffect {
    /// Send `file` to the ingestion endpoint and report back with `ticket`.
    Submit { ticket: RequestTicket, file: PdfFile },
    /// Precondition failed; the message is recorded in the state.
    Rejected(ValidationError),
    /// Another request holds the control; state untouched.
    Blocked(ValidationError),
}

pub fn validate_upload(file: Option<&PdfFile>) -> Result<&PdfFile, ValidationError> {
    file.ok_or(ValidationError::MissingFile)
}

pub fn begin_upload(state: &SessionState, policy: WorkflowPolicy) -> Transition<UploadEffect> {
    if state.uploading() {
        debug!("upload already in flight; ignoring duplicate trigger");
        return Transition::new(
            state.clone(),
            UploadEffect::Blocked(ValidationError::UploadInProgress),
        );
    }
    if !policy.allow_query_during_upload && state.asking() {
        debug!("query in flight; upload locked by policy");
        return Transition::new(
            state.clone(),
            UploadEffect::Blocked(ValidationError::QueryInProgress),
        );
    }

    let mut next = state.clone();
    next.clear_outcome();

    let file = match validate_upload(state.file()) {
        Ok(file) => file.clone(),
        Err(err) => {
            next.record_error(err.to_string());
            return Transition::new(next, UploadEffect::Rejected(err));
        }
    };

    let ticket = next.issue_ticket();
    next.pending_upload = Some(ticket);
    debug!(ticket = ticket.0, file = %file.name, size_bytes = file.len(), "upload issued");
    Transition::new(next, UploadEffect::Submit { ticket, file })
}

pub fn complete_upload(
    state: &SessionState,
    ticket: RequestTicket,
    outcome: &Result<UploadResponse, WorkflowError>,
) -> Transition<Completion> {
    if state.pending_upload != Some(ticket) {
        warn!(ticket = ticket.0, "discarding stale upload response");
        return Transition::new(state.clone(), Completion::Discarded);
    }

    let mut next = state.clone();
    next.pending_upload = None;
    match outcome {
        Ok(response) => {
            info!(ticket = ticket.0, syllabus_id = %response.syllabus_id, "upload completed");
            next.syllabus_id = Some(response.syllabus_id.clone());
            next.clear_outcome();
        }
        Err(err) => {
            let message = err.display_message(UPLOAD_FAILED);
            warn!(ticket = ticket.0, kind = ?err.kind(), %message, "upload failed");
            next.record_error(message);
        }
    }
    Transition::new(next, Completion::Applied)
}
