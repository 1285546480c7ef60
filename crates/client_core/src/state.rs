//! Session state held by the workflow and the policy that governs concurrent actions.

use shared::domain::{coerce_minutes, PdfFile, SyllabusId, DEFAULT_HEADING, DEFAULT_MINUTES};

/// Sequence number stamped on every submitted request. A completion is only folded into the
/// state while its ticket is still the pending one for that action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Allow a query to be triggered while an upload is still in flight (and vice versa).
    pub allow_query_during_upload: bool,
    /// Make `reset` forget in-flight requests so their late responses are dropped.
    pub discard_stale_responses: bool,
}

impl WorkflowPolicy {
    /// Upload and query run independently and late responses land even after a reset.
    pub const fn permissive() -> Self {
        Self {
            allow_query_during_upload: true,
            discard_stale_responses: false,
        }
    }

    /// Upload and query exclude each other and reset drops any response still in flight.
    pub const fn strict() -> Self {
        Self {
            allow_query_during_upload: false,
            discard_stale_responses: true,
        }
    }
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) file: Option<PdfFile>,
    pub(crate) syllabus_id: Option<SyllabusId>,
    pub(crate) heading: String,
    pub(crate) minutes: String,
    pub(crate) answer: Option<String>,
    pub(crate) error: Option<String>,
    pub(crate) pending_upload: Option<RequestTicket>,
    pub(crate) pending_query: Option<RequestTicket>,
    pub(crate) next_ticket: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            file: None,
            syllabus_id: None,
            heading: DEFAULT_HEADING.to_string(),
            minutes: DEFAULT_MINUTES.to_string(),
            answer: None,
            error: None,
            pending_upload: None,
            pending_query: None,
            next_ticket: 1,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&PdfFile> {
        self.file.as_ref()
    }

    pub fn syllabus_id(&self) -> Option<&SyllabusId> {
        self.syllabus_id.as_ref()
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Minutes exactly as entered.
    pub fn minutes_input(&self) -> &str {
        &self.minutes
    }

    pub fn minutes_value(&self) -> f64 {
        coerce_minutes(&self.minutes)
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn uploading(&self) -> bool {
        self.pending_upload.is_some()
    }

    pub fn asking(&self) -> bool {
        self.pending_query.is_some()
    }

    pub fn pending_upload(&self) -> Option<RequestTicket> {
        self.pending_upload
    }

    pub fn pending_query(&self) -> Option<RequestTicket> {
        self.pending_query
    }

    pub fn set_file(&mut self, file: Option<PdfFile>) {
        self.file = file;
    }

    pub fn set_heading(&mut self, heading: impl Into<String>) {
        self.heading = heading.into();
    }

    pub fn set_minutes(&mut self, minutes: impl Into<String>) {
        self.minutes = minutes.into();
    }

    pub(crate) fn issue_ticket(&mut self) -> RequestTicket {
        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    pub(crate) fn clear_outcome(&mut self) {
        self.answer = None;
        self.error = None;
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.answer = None;
        self.error = Some(message);
    }

    pub(crate) fn record_answer(&mut self, answer: String) {
        self.error = None;
        self.answer = Some(answer);
    }
}
