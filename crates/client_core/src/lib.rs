//! Client-side workflow for the study coach backend: ingest a syllabus PDF, then ask for a
//! study plan scoped to a heading and a time budget.

pub mod backend;
pub mod config;
pub mod controller;
pub mod preferences;
pub mod state;
pub mod workflow;

pub use backend::{CoachBackend, HttpCoachBackend};
pub use config::{load_settings, load_settings_from, ClientSettings, SettingsError};
pub use preferences::{PreferenceError, PreferenceStore, Preferences, Theme};
pub use state::{RequestTicket, SessionState, WorkflowPolicy};
pub use workflow::{Workflow, WorkflowAction, WorkflowEvent};
