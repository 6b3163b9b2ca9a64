use serde::{Deserialize, Serialize};

use pixelift_core::ValueObject;
use pixelift_jobs::Resolution;

/// Price and output size for one resolution tier.
///
/// Quotes are values: the flow compares and replaces them wholesale when the
/// customer switches tiers, never edits one in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub resolution: Resolution,
    /// Price in smallest currency unit (e.g., cents).
    pub amount_cents: u64,
    /// Linear upscale factor, mirrored from the tier for display.
    pub multiplier: u32,
}

impl PriceQuote {
    pub fn new(resolution: Resolution, amount_cents: u64) -> Self {
        Self {
            resolution,
            amount_cents,
            multiplier: resolution.multiplier(),
        }
    }

    /// Output pixel dimensions for a source image of the given size.
    pub fn output_size(&self, source_width: u32, source_height: u32) -> (u64, u64) {
        (
            u64::from(source_width) * u64::from(self.multiplier),
            u64::from(source_height) * u64::from(self.multiplier),
        )
    }
}

impl ValueObject for PriceQuote {}
