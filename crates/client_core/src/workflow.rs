//! Async driver that runs the pure controllers against a [`CoachBackend`].

use std::sync::Arc;

use shared::{
    domain::{PdfFile, SyllabusId},
    error::WorkflowError,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    backend::{CoachBackend, HttpCoachBackend},
    config::{ClientSettings, SettingsError},
    controller::{self, Completion, QueryEffect, UploadEffect},
    state::{RequestTicket, SessionState, WorkflowPolicy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Upload,
    Query,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// Emitted after every transition with the state it produced.
    StateChanged(SessionState),
    StaleResponseDiscarded {
        action: WorkflowAction,
        ticket: RequestTicket,
    },
}

pub struct Workflow {
    backend: Arc<dyn CoachBackend>,
    policy: WorkflowPolicy,
    state: Mutex<SessionState>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl Workflow {
    pub fn new(backend: Arc<dyn CoachBackend>, policy: WorkflowPolicy) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            backend,
            policy,
            state: Mutex::new(SessionState::default()),
            events,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, SettingsError> {
        let backend = HttpCoachBackend::from_settings(settings)?;
        Ok(Self::new(Arc::new(backend), settings.policy()))
    }

    pub fn policy(&self) -> WorkflowPolicy {
        self.policy
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn can_ask(&self) -> bool {
        controller::can_ask(&*self.state.lock().await, self.policy)
    }

    pub async fn can_upload(&self) -> bool {
        controller::can_upload(&*self.state.lock().await, self.policy)
    }

    pub async fn select_file(&self, file: Option<PdfFile>) {
        self.update(|state| state.set_file(file)).await;
    }

    pub async fn set_heading(&self, heading: impl Into<String>) {
        let heading = heading.into();
        self.update(|state| state.set_heading(heading)).await;
    }

    pub async fn set_minutes(&self, minutes: impl Into<String>) {
        let minutes = minutes.into();
        self.update(|state| state.set_minutes(minutes)).await;
    }

    /// Uploads the selected file and stores the returned session id.
    ///
    /// A response that arrives after a reset which detached the request is returned to the
    /// caller as-is but leaves the state untouched.
    pub async fn upload(&self) -> Result<SyllabusId, WorkflowError> {
        let effect = {
            let mut guard = self.state.lock().await;
            let transition = controller::begin_upload(&guard, self.policy);
            *guard = transition.state;
            self.publish(&guard);
            transition.effect
        };

        let (ticket, file) = match effect {
            UploadEffect::Submit { ticket, file } => (ticket, file),
            UploadEffect::Rejected(err) | UploadEffect::Blocked(err) => {
                debug!(reason = %err, "upload not submitted");
                return Err(err.into());
            }
        };

        let outcome = self.backend.upload_pdf(&file).await;

        {
            let mut guard = self.state.lock().await;
            let transition = controller::complete_upload(&guard, ticket, &outcome);
            *guard = transition.state;
            match transition.effect {
                Completion::Applied => self.publish(&guard),
                Completion::Discarded => self.discarded(WorkflowAction::Upload, ticket),
            }
        }

        outcome.map(|response| response.syllabus_id)
    }

    /// Requests a study plan for the current session, heading and minutes.
    pub async fn ask(&self) -> Result<String, WorkflowError> {
        let effect = {
            let mut guard = self.state.lock().await;
            let transition = controller::begin_query(&guard, self.policy);
            *guard = transition.state;
            self.publish(&guard);
            transition.effect
        };

        let (ticket, request) = match effect {
            QueryEffect::Submit { ticket, request } => (ticket, request),
            QueryEffect::Rejected(err) | QueryEffect::Blocked(err) => {
                debug!(reason = %err, "query not submitted");
                return Err(err.into());
            }
        };

        let outcome = self.backend.chat(&request).await;

        {
            let mut guard = self.state.lock().await;
            let transition = controller::complete_query(&guard, ticket, &outcome);
            *guard = transition.state;
            match transition.effect {
                Completion::Applied => self.publish(&guard),
                Completion::Discarded => self.discarded(WorkflowAction::Query, ticket),
            }
        }

        outcome.map(|response| response.answer)
    }

    /// Restores defaults without touching requests that are still in flight.
    pub async fn reset(&self) {
        let mut guard = self.state.lock().await;
        *guard = controller::reset(&guard, self.policy);
        info!("workflow reset");
        self.publish(&guard);
    }

    async fn update(&self, apply: impl FnOnce(&mut SessionState)) {
        let mut guard = self.state.lock().await;
        apply(&mut guard);
        self.publish(&guard);
    }

    fn publish(&self, state: &SessionState) {
        let _ = self.events.send(WorkflowEvent::StateChanged(state.clone()));
    }

    fn discarded(&self, action: WorkflowAction, ticket: RequestTicket) {
        let _ = self
            .events
            .send(WorkflowEvent::StaleResponseDiscarded { action, ticket });
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
