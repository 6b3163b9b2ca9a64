//! Upload/checkout purchase flow.
//!
//! One checkout session backs one open purchase modal: the customer uploads an
//! image, picks a resolution tier, enters an email, and submits. The flow is
//! implemented purely as a deterministic command/event aggregate (no IO, no
//! HTTP, no storage); price lookups and payment submission happen outside and
//! report back through commands. Everything here is ephemeral: closing the
//! modal discards the session.

pub mod email;
pub mod flow;
pub mod upload;

pub use email::EmailAddress;
pub use flow::{
    ApplyQuote, AttachImage, BeginCheckout, CheckoutCommand, CheckoutEvent, CheckoutFailed,
    CheckoutFlow, CheckoutRetried, CheckoutStage, CheckoutStarted, CheckoutSucceeded,
    CloseSession, CompleteCheckout, EmailEntered, EnterEmail, FailCheckout, FailureCause, ImageAttached,
    ImageRemoved, OpenSession, QuoteApplied, QuoteFailed, QuoteRequested, RejectQuote,
    RemoveImage, ResolutionSelected, Retry, SelectResolution, SessionClosed, SessionOpened,
};
pub use upload::{UploadPolicy, UploadedFile, ACCEPTED_MIME_TYPES, DEFAULT_MAX_FILE_SIZE_MB};
