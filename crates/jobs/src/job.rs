use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pixelift_core::{DomainError, DomainResult, Entity, JobId};

use crate::resolution::Resolution;

/// A completed image-upscale request.
///
/// This is the read-only input to notification composing. Construction is the
/// validation boundary: a job with an empty source URL cannot exist, so
/// downstream templating never has to guard against blank interpolations.
/// Token-bearing download links and expiry formatting are produced by the
/// delivery pipeline, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpscaleJob {
    id: JobId,
    resolution: Resolution,
    image_url: String,
    completed_at: DateTime<Utc>,
}

impl UpscaleJob {
    pub fn new(
        id: JobId,
        resolution: Resolution,
        image_url: impl Into<String>,
        completed_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let image_url = image_url.into();
        if image_url.trim().is_empty() {
            return Err(DomainError::missing_field("image_url"));
        }

        Ok(Self {
            id,
            resolution,
            image_url,
            completed_at,
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

impl Entity for UpscaleJob {
    type Id = JobId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructs_with_valid_fields() {
        let job = UpscaleJob::new(
            JobId::new(),
            Resolution::FourX,
            "https://example.com/a.jpg",
            Utc::now(),
        )
        .unwrap();

        assert_eq!(job.resolution(), Resolution::FourX);
        assert_eq!(job.image_url(), "https://example.com/a.jpg");
    }

    #[test]
    fn rejects_empty_image_url() {
        let err =
            UpscaleJob::new(JobId::new(), Resolution::EightX, "   ", Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::missing_field("image_url"));
    }
}
