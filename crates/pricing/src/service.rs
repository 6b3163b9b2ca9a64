use thiserror::Error;

use pixelift_jobs::Resolution;

use crate::quote::PriceQuote;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("no price configured for tier: {0}")]
    TierNotConfigured(Resolution),

    #[error("pricing source unavailable: {0}")]
    Unavailable(String),
}

/// Source of price quotes for resolution tiers.
///
/// This is intentionally minimal and gateway-agnostic. Implementations must
/// not mutate domain state; the purchase flow decides what to do with a quote
/// (including dropping it when it arrives stale).
pub trait PricingService: Send + Sync + 'static {
    fn quote(&self, resolution: Resolution) -> Result<PriceQuote, PricingError>;
}

/// Fixed in-process price table.
#[derive(Debug, Clone, Copy)]
pub struct FixedPricing {
    four_x_cents: u64,
    eight_x_cents: u64,
}

impl FixedPricing {
    pub fn new(four_x_cents: u64, eight_x_cents: u64) -> Self {
        Self {
            four_x_cents,
            eight_x_cents,
        }
    }
}

impl Default for FixedPricing {
    /// Launch price list: $5 for 4x, $9 for 8x.
    fn default() -> Self {
        Self::new(500, 900)
    }
}

impl PricingService for FixedPricing {
    fn quote(&self, resolution: Resolution) -> Result<PriceQuote, PricingError> {
        let amount_cents = match resolution {
            Resolution::FourX => self.four_x_cents,
            Resolution::EightX => self.eight_x_cents,
        };
        Ok(PriceQuote::new(resolution, amount_cents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_table_quotes_each_tier() {
        let pricing = FixedPricing::default();
        for tier in Resolution::all() {
            let quote = pricing.quote(tier).unwrap();
            assert_eq!(quote.resolution, tier);
            assert!(quote.amount_cents > 0);
        }
    }

    #[test]
    fn eight_x_costs_more_than_four_x() {
        let pricing = FixedPricing::default();
        let four = pricing.quote(Resolution::FourX).unwrap();
        let eight = pricing.quote(Resolution::EightX).unwrap();
        assert!(eight.amount_cents > four.amount_cents);
    }
}
