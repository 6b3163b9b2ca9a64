use serde::{Deserialize, Serialize};

use pixelift_core::{DomainError, DomainResult};
use pixelift_jobs::{Resolution, UpscaleJob};

/// Everything the composer needs to write one download email.
///
/// Construction is the validation boundary (fail fast at the edge, not at
/// interpolation time): a context cannot exist with a required field empty,
/// so composing is total. `download_url` is opaque here; the token inside it
/// is minted by the delivery pipeline. `expiry_date` arrives pre-formatted
/// for the recipient's locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContext {
    resolution: Resolution,
    image_url: String,
    download_url: String,
    expiry_date: String,
    terms_conditions_url: Option<String>,
    site_name: String,
}

/// Raw, possibly incomplete context fields as a caller supplies them.
///
/// Optional section modeled as `Option`, not an empty-string sentinel; an
/// empty `terms_conditions_url` normalizes to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextParts {
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub terms_conditions_url: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
}

fn required(field: &'static str, value: Option<String>) -> DomainResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::missing_field(field)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl NotificationContext {
    /// Assemble a context from a typed job record plus delivery fields.
    pub fn for_job(
        job: &UpscaleJob,
        download_url: impl Into<String>,
        expiry_date: impl Into<String>,
        terms_conditions_url: Option<String>,
        site_name: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::from_parts(ContextParts {
            resolution: Some(job.resolution().to_string()),
            image_url: Some(job.image_url().to_string()),
            download_url: Some(download_url.into()),
            expiry_date: Some(expiry_date.into()),
            terms_conditions_url,
            site_name: Some(site_name.into()),
        })
    }

    /// Validate raw parts into a context.
    ///
    /// Every required field that is absent or blank fails with
    /// `MissingField` naming that key; a malformed resolution string fails
    /// with `Validation`. Nothing is silently interpolated as empty.
    pub fn from_parts(parts: ContextParts) -> DomainResult<Self> {
        let resolution = required("resolution", parts.resolution)?.parse::<Resolution>()?;
        let image_url = required("image_url", parts.image_url)?;
        let download_url = required("download_url", parts.download_url)?;
        let expiry_date = required("expiry_date", parts.expiry_date)?;
        let site_name = required("site_name", parts.site_name)?;

        Ok(Self {
            resolution,
            image_url,
            download_url,
            expiry_date,
            terms_conditions_url: optional(parts.terms_conditions_url),
            site_name,
        })
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn download_url(&self) -> &str {
        &self.download_url
    }

    pub fn expiry_date(&self) -> &str {
        &self.expiry_date
    }

    pub fn terms_conditions_url(&self) -> Option<&str> {
        self.terms_conditions_url.as_deref()
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pixelift_core::JobId;

    fn full_parts() -> ContextParts {
        ContextParts {
            resolution: Some("4x".into()),
            image_url: Some("https://ex.com/a.jpg".into()),
            download_url: Some("https://ex.com/dl/abc123".into()),
            expiry_date: Some("Jan 5, 2025 3:00pm".into()),
            terms_conditions_url: Some("https://ex.com/terms".into()),
            site_name: Some("Acme".into()),
        }
    }

    #[test]
    fn builds_from_complete_parts() {
        let ctx = NotificationContext::from_parts(full_parts()).unwrap();
        assert_eq!(ctx.resolution(), Resolution::FourX);
        assert_eq!(ctx.terms_conditions_url(), Some("https://ex.com/terms"));
    }

    #[test]
    fn each_required_field_is_named_when_missing() {
        let cases: [(&str, fn(&mut ContextParts)); 5] = [
            ("resolution", |p| p.resolution = None),
            ("image_url", |p| p.image_url = None),
            ("download_url", |p| p.download_url = None),
            ("expiry_date", |p| p.expiry_date = None),
            ("site_name", |p| p.site_name = None),
        ];

        for (field, clear) in cases {
            let mut parts = full_parts();
            clear(&mut parts);
            let err = NotificationContext::from_parts(parts).unwrap_err();
            assert_eq!(err, DomainError::missing_field(field), "field: {field}");
        }
    }

    #[test]
    fn blank_required_field_counts_as_missing() {
        let mut parts = full_parts();
        parts.download_url = Some("   ".into());
        let err = NotificationContext::from_parts(parts).unwrap_err();
        assert_eq!(err, DomainError::missing_field("download_url"));
    }

    #[test]
    fn blank_terms_url_normalizes_to_none() {
        let mut parts = full_parts();
        parts.terms_conditions_url = Some("".into());
        let ctx = NotificationContext::from_parts(parts).unwrap();
        assert_eq!(ctx.terms_conditions_url(), None);
    }

    #[test]
    fn malformed_resolution_fails_validation() {
        let mut parts = full_parts();
        parts.resolution = Some("2x".into());
        let err = NotificationContext::from_parts(parts).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn for_job_carries_job_fields() {
        let job = UpscaleJob::new(
            JobId::new(),
            Resolution::EightX,
            "https://ex.com/b.png",
            Utc::now(),
        )
        .unwrap();

        let ctx = NotificationContext::for_job(
            &job,
            "https://ex.com/dl/tok",
            "Feb 1, 2025 9:00am",
            None,
            "Acme",
        )
        .unwrap();

        assert_eq!(ctx.resolution(), Resolution::EightX);
        assert_eq!(ctx.image_url(), "https://ex.com/b.png");
        assert_eq!(ctx.terms_conditions_url(), None);
    }
}
