use core::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::context::NotificationContext;

/// A composed download email: plain-text subject and body.
///
/// This is the text channel only. Anything rendering these strings into HTML
/// must escape for that context itself; the composer does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub message: String,
}

/// Compose the "your image is ready" email for a completed upscale job.
///
/// Total and pure: no IO, no mutation, and byte-identical output for equal
/// contexts. Field order in the body is fixed; the terms section appears
/// exactly once when a terms URL is configured and not at all otherwise.
pub fn compose(ctx: &NotificationContext) -> Notification {
    let resolution = ctx.resolution();

    let subject = format!(
        "Your high-resolution image is ready - {}",
        ctx.site_name()
    );

    let mut message = String::new();
    message.push_str("Hi there,\n\n");
    let _ = write!(
        message,
        "Your {resolution} resolution image has been processed and is ready for download.\n\n"
    );
    message.push_str("Download your image:\n");
    message.push_str(ctx.download_url());
    message.push_str("\n\n");
    let _ = write!(message, "This link will expire on {}.\n\n", ctx.expiry_date());
    let _ = write!(message, "Original image: {}\n", ctx.image_url());
    let _ = write!(message, "Resolution: {resolution}");

    if let Some(terms_url) = ctx.terms_conditions_url() {
        let _ = write!(message, "\n\nTerms & Conditions: {terms_url}");
    }

    let _ = write!(message, "\n\nThank you,\n{}", ctx.site_name());

    Notification { subject, message }
}
