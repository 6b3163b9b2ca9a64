//! Upscale job domain module.
//!
//! This crate contains the job record a completed image-upscale request leaves
//! behind, implemented purely as deterministic domain data (no IO, no HTTP,
//! no storage).

pub mod job;
pub mod resolution;

pub use job::UpscaleJob;
pub use resolution::Resolution;
