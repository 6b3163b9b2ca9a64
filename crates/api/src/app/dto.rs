use serde::{Deserialize, Serialize};

use pixelift_checkout::{CheckoutFlow, CheckoutStage, FailureCause, UploadedFile};
use pixelift_core::{AggregateRoot, ExpectedVersion};
use pixelift_jobs::Resolution;
use pixelift_pricing::PriceQuote;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub max_file_size_mb: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AttachImageRequest {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SelectResolutionRequest {
    pub resolution: String,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct EnterEmailRequest {
    pub email: String,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Body for endpoints that carry nothing but the concurrency guard.
#[derive(Debug, Default, Deserialize)]
pub struct VersionedRequest {
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Outcome reported back by the payment collaborator.
#[derive(Debug, Deserialize)]
pub struct CheckoutResultRequest {
    pub outcome: ResultOutcome,
    #[serde(default)]
    pub cause: Option<FailureCause>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOutcome {
    Succeeded,
    Failed,
}

pub fn expected(version: Option<u64>) -> ExpectedVersion {
    match version {
        Some(v) => ExpectedVersion::Exact(v),
        None => ExpectedVersion::Any,
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionError {
    pub cause: FailureCause,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub version: u64,
    pub stage: CheckoutStage,
    pub resolution: Resolution,
    pub file: Option<UploadedFile>,
    pub email: Option<String>,
    pub quote: Option<PriceQuote>,
    pub quote_pending: bool,
    pub checkout_enabled: bool,
    pub last_error: Option<SessionError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<&'static str>>,
}

impl SessionResponse {
    pub fn from_flow(flow: &CheckoutFlow) -> Self {
        Self {
            id: flow.session_id().to_string(),
            version: flow.version(),
            stage: flow.stage(),
            resolution: flow.resolution(),
            file: flow.file().cloned(),
            email: flow.email().map(|e| e.as_str().to_string()),
            quote: flow.quote().copied(),
            quote_pending: flow.quote_pending(),
            checkout_enabled: flow.checkout_enabled(),
            last_error: flow.last_error().map(|(cause, msg)| SessionError {
                cause,
                message: msg.to_string(),
            }),
            events: None,
        }
    }

    pub fn with_events(mut self, events: Vec<&'static str>) -> Self {
        self.events = Some(events);
        self
    }
}
