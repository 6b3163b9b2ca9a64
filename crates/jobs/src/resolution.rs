use core::str::FromStr;

use serde::{Deserialize, Serialize};

use pixelift_core::{DomainError, ValueObject};

/// Upscale multiplier tier offered to the customer.
///
/// The wire/display form is `"4x"` / `"8x"` everywhere: job records, pricing,
/// notification bodies and the resolution radio group all agree on it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "4x")]
    FourX,
    #[serde(rename = "8x")]
    EightX,
}

impl Resolution {
    /// Linear upscale factor for this tier.
    pub fn multiplier(self) -> u32 {
        match self {
            Resolution::FourX => 4,
            Resolution::EightX => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::FourX => "4x",
            Resolution::EightX => "8x",
        }
    }

    /// All tiers, in the order they are offered.
    pub fn all() -> [Resolution; 2] {
        [Resolution::FourX, Resolution::EightX]
    }
}

impl ValueObject for Resolution {}

impl core::fmt::Display for Resolution {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4x" => Ok(Resolution::FourX),
            "8x" => Ok(Resolution::EightX),
            other => Err(DomainError::validation(format!(
                "unknown resolution tier: {other} (expected 4x or 8x)"
            ))),
        }
    }
}
