use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coordinates as supplied by the caller. Not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarRequest {
    pub latitude: String,
    pub longitude: String,
}

impl RadarRequest {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self { latitude: latitude.into(), longitude: longitude.into() }
    }

    /// Points metadata URL for these coordinates.
    pub fn points_url(&self) -> String {
        crate::urls::points_url(&self.latitude, &self.longitude)
    }
}

/// Outcome of the radar image tool.
///
/// Serializes with a `status` tag of `"success"` or `"error"`, which is the
/// shape the agent layer branches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RadarImageResult {
    Success(RadarImage),
    Error { error_message: String },
}

impl RadarImageResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { error_message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn image(&self) -> Option<&RadarImage> {
        match self {
            Self::Success(image) => Some(image),
            Self::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Error { error_message } => Some(error_message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarImage {
    /// Station code parsed from the URL, e.g. `KOKX`.
    pub radar_id: Option<String>,
    pub source_url: String,
    pub media: RadarMedia,
    pub guidance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarMedia {
    pub mime_type: String,
    pub base64_data: String,
}

impl RadarMedia {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self { mime_type: mime_type.into(), base64_data: BASE64_STANDARD.encode(bytes) }
    }

    /// Raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(&self.base64_data)
    }
}

/// What the relay hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nowcast {
    pub radar_id: Option<String>,
    pub source_url: String,
    pub text: String,
    pub generated_at: DateTime<Utc>,
}
