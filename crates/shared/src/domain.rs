use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADING: &str = "Introduction";
pub const DEFAULT_MINUTES: u32 = 60;

/// Smallest study budget the backend accepts. Shared by the query gate and query validation.
pub const MIN_MINUTES: u32 = 10;
pub const MAX_MINUTES: u32 = 240;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Opaque session identifier returned by the ingestion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyllabusId(pub String);

impl SyllabusId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyllabusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document picked for ingestion. Bytes are shared so state snapshots stay cheap to clone.
#[derive(Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl PdfFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for PdfFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfFile")
            .field("name", &self.name)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// Coerces raw minutes input the way a numeric form field does: surrounding whitespace is
/// ignored, empty input is zero and anything unparsable is NaN.
pub fn coerce_minutes(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn minutes_meet_minimum(minutes: f64) -> bool {
    minutes >= f64::from(MIN_MINUTES)
}

/// Returns the whole-minute budget when `minutes` is an integer inside the accepted range.
pub fn validated_minutes(minutes: f64) -> Option<u32> {
    if !minutes_meet_minimum(minutes) || minutes > f64::from(MAX_MINUTES) {
        return None;
    }
    if minutes.fract() != 0.0 {
        return None;
    }
    Some(minutes as u32)
}
