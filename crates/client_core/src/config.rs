//! Startup configuration: defaults, then `coach.toml`, then environment overrides.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::protocol::DOCS_PATH;
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::state::WorkflowPolicy;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const SETTINGS_FILE: &str = "coach.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid api base url '{url}': {reason}")]
    InvalidApiBase { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base: String,
    pub request_timeout_secs: Option<u64>,
    pub allow_query_during_upload: bool,
    pub discard_stale_responses: bool,
    pub preferences_path: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        let policy = WorkflowPolicy::default();
        Self {
            api_base: DEFAULT_API_BASE.into(),
            request_timeout_secs: None,
            allow_query_during_upload: policy.allow_query_during_upload,
            discard_stale_responses: policy.discard_stale_responses,
            preferences_path: None,
        }
    }
}

impl ClientSettings {
    pub fn policy(&self) -> WorkflowPolicy {
        WorkflowPolicy {
            allow_query_during_upload: self.allow_query_during_upload,
            discard_stale_responses: self.discard_stale_responses,
        }
    }

    pub fn apply_policy(&mut self, policy: WorkflowPolicy) {
        self.allow_query_during_upload = policy.allow_query_during_upload;
        self.discard_stale_responses = policy.discard_stale_responses;
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn docs_url(&self) -> String {
        format!("{}{DOCS_PATH}", self.api_base)
    }

    /// Replaces the base url after normalizing it.
    pub fn set_api_base(&mut self, raw: &str) -> Result<(), SettingsError> {
        self.api_base = normalize_api_base(raw)?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    api_base: Option<String>,
    request_timeout_secs: Option<u64>,
    allow_query_during_upload: Option<bool>,
    discard_stale_responses: Option<bool>,
    preferences_path: Option<PathBuf>,
}

pub fn load_settings() -> Result<ClientSettings, SettingsError> {
    load_settings_from(Some(Path::new(SETTINGS_FILE)), |key| std::env::var(key).ok())
}

/// Builds settings from an optional TOML file and an environment lookup. A missing file is
/// skipped; a malformed one is logged and ignored. Only an unusable base url is an error.
pub fn load_settings_from(
    file: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let mut settings = ClientSettings::default();

    if let Some(path) = file {
        if let Ok(raw) = fs::read_to_string(path) {
            match toml::from_str::<FileSettings>(&raw) {
                Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
                Err(err) => warn!(path = %path.display(), error = %err, "ignoring malformed settings file"),
            }
        }
    }

    if let Some(v) = env("API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = env("APP__ALLOW_QUERY_DURING_UPLOAD") {
        match parse_flag(&v) {
            Some(flag) => settings.allow_query_during_upload = flag,
            None => warn!(value = %v, "ignoring invalid APP__ALLOW_QUERY_DURING_UPLOAD"),
        }
    }
    if let Some(v) = env("APP__DISCARD_STALE_RESPONSES") {
        match parse_flag(&v) {
            Some(flag) => settings.discard_stale_responses = flag,
            None => warn!(value = %v, "ignoring invalid APP__DISCARD_STALE_RESPONSES"),
        }
    }

    if let Some(v) = env("APP__PREFERENCES_PATH") {
        settings.preferences_path = Some(PathBuf::from(v));
    }

    settings.api_base = normalize_api_base(&settings.api_base)?;
    Ok(settings)
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_base {
        settings.api_base = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = Some(v);
    }
    if let Some(v) = file_cfg.allow_query_during_upload {
        settings.allow_query_during_upload = v;
    }
    if let Some(v) = file_cfg.discard_stale_responses {
        settings.discard_stale_responses = v;
    }
    if let Some(v) = file_cfg.preferences_path {
        settings.preferences_path = Some(v);
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn normalize_api_base(raw: &str) -> Result<String, SettingsError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_API_BASE.to_string());
    }

    let parsed = Url::parse(raw).map_err(|err| SettingsError::InvalidApiBase {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::InvalidApiBase {
            url: raw.to_string(),
            reason: "api base must start with http:// or https://".into(),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
