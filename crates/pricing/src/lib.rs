//! Pricing collaborator interface.
//!
//! The purchase flow asks an external pricing source for a price and output
//! size every time the customer picks a resolution tier. This crate stays
//! gateway-agnostic: it defines the quote value object, the service trait and
//! a fixed in-process price table for tests and single-tenant deployments.

pub mod quote;
pub mod service;

pub use quote::PriceQuote;
pub use service::{FixedPricing, PricingError, PricingService};
