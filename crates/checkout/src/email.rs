use serde::{Deserialize, Serialize};

use pixelift_core::{DomainError, DomainResult, ValueObject};

/// A syntactically valid email address.
///
/// Validation is intentionally shallow (shape, not deliverability): one `@`,
/// a non-empty local part, and a dotted domain. The payment pipeline is the
/// authority on whether mail actually arrives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("email must not be empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email must not contain whitespace"));
        }

        let mut split = trimmed.splitn(2, '@');
        let local = split.next().unwrap_or_default();
        let domain = split.next().unwrap_or_default();

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(DomainError::validation(
                "email must have the form local@domain",
            ));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(DomainError::validation("email domain must be dotted"));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for EmailAddress {}

impl core::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
