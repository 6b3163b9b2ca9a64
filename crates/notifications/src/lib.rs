//! Notification composing for completed upscale jobs.
//!
//! This crate turns a job record plus delivery context into the localized
//! "your image is ready" email, implemented purely as deterministic domain
//! logic (no IO, no SMTP, no storage). Two calls with equal input produce
//! byte-identical output, which keeps deliverability debugging sane.

pub mod composer;
pub mod context;

pub use composer::{compose, Notification};
pub use context::{ContextParts, NotificationContext};
