use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pixelift_core::{Aggregate, AggregateRoot, DomainError, Event, SessionId};
use pixelift_jobs::Resolution;
use pixelift_pricing::PriceQuote;

use crate::email::EmailAddress;
use crate::upload::{UploadPolicy, UploadedFile};

/// Why a submit (or quote lookup) failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureCause {
    /// Customer input was rejected downstream; correcting it recovers.
    Validation,
    /// A collaborator (pricing, payment gateway) failed; retrying recovers.
    Upstream,
}

/// Externally visible position in the purchase flow.
///
/// Derived from the session's components rather than stored: the flow keeps
/// file/quote/email independently so a quote refresh can be in flight while
/// the email stays entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    Idle,
    Uploaded,
    ResolutionChosen,
    EmailEntered,
    CheckoutReady,
    Submitting,
    Succeeded,
    Failed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Browsing,
    Submitting,
    Succeeded,
    Failed(FailureCause),
    Closed,
}

/// Aggregate root: one purchase-modal session.
///
/// Quote staleness guard: every resolution selection bumps `quote_seq` and
/// clears the held quote; a quote response carrying any other sequence is
/// dropped, so a slow lookup for a tier the customer already left can never
/// put a stale price on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutFlow {
    id: SessionId,
    policy: UploadPolicy,
    phase: Phase,
    file: Option<UploadedFile>,
    resolution: Resolution,
    email: Option<EmailAddress>,
    /// Sequence of the most recent quote lookup requested.
    quote_seq: u64,
    /// The quote currently on screen; always belongs to `quote_seq`.
    quote: Option<PriceQuote>,
    last_error: Option<(FailureCause, String)>,
    version: u64,
    opened: bool,
}

impl CheckoutFlow {
    /// Create an empty, not-yet-opened session instance for rehydration.
    pub fn empty(id: SessionId) -> Self {
        Self {
            id,
            policy: UploadPolicy::default(),
            phase: Phase::Browsing,
            file: None,
            resolution: Resolution::default(),
            email: None,
            quote_seq: 0,
            quote: None,
            last_error: None,
            version: 0,
            opened: false,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.id
    }

    pub fn policy(&self) -> UploadPolicy {
        self.policy
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    pub fn quote(&self) -> Option<&PriceQuote> {
        self.quote.as_ref()
    }

    pub fn quote_sequence(&self) -> u64 {
        self.quote_seq
    }

    /// A lookup has been requested and its answer has not arrived.
    pub fn quote_pending(&self) -> bool {
        self.quote_seq > 0 && self.quote.is_none() && self.file.is_some()
    }

    pub fn last_error(&self) -> Option<(FailureCause, &str)> {
        self.last_error
            .as_ref()
            .map(|(cause, msg)| (*cause, msg.as_str()))
    }

    pub fn stage(&self) -> CheckoutStage {
        match self.phase {
            Phase::Closed => CheckoutStage::Closed,
            Phase::Succeeded => CheckoutStage::Succeeded,
            Phase::Failed(_) => CheckoutStage::Failed,
            Phase::Submitting => CheckoutStage::Submitting,
            Phase::Browsing => match (&self.file, &self.quote, &self.email) {
                (None, _, _) => CheckoutStage::Idle,
                (Some(_), None, None) => CheckoutStage::Uploaded,
                (Some(_), Some(_), None) => CheckoutStage::ResolutionChosen,
                (Some(_), None, Some(_)) => CheckoutStage::EmailEntered,
                (Some(_), Some(_), Some(_)) => CheckoutStage::CheckoutReady,
            },
        }
    }

    pub fn checkout_enabled(&self) -> bool {
        self.stage() == CheckoutStage::CheckoutReady
    }
}

impl AggregateRoot for CheckoutFlow {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenSession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSession {
    pub session_id: SessionId,
    pub policy: UploadPolicy,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AttachImage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachImage {
    pub session_id: SessionId,
    pub file: UploadedFile,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveImage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveImage {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SelectResolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectResolution {
    pub session_id: SessionId,
    pub resolution: Resolution,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApplyQuote (a price lookup answered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyQuote {
    pub session_id: SessionId,
    pub sequence: u64,
    pub quote: PriceQuote,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectQuote (a price lookup failed upstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectQuote {
    pub session_id: SessionId,
    pub sequence: u64,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: EnterEmail (raw input; syntax is validated here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterEmail {
    pub session_id: SessionId,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: BeginCheckout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginCheckout {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteCheckout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteCheckout {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: FailCheckout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailCheckout {
    pub session_id: SessionId,
    pub cause: FailureCause,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Retry (after a failed submit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retry {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CloseSession (modal closed / purchase cancelled).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseSession {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutCommand {
    OpenSession(OpenSession),
    AttachImage(AttachImage),
    RemoveImage(RemoveImage),
    SelectResolution(SelectResolution),
    ApplyQuote(ApplyQuote),
    RejectQuote(RejectQuote),
    EnterEmail(EnterEmail),
    BeginCheckout(BeginCheckout),
    CompleteCheckout(CompleteCheckout),
    FailCheckout(FailCheckout),
    Retry(Retry),
    CloseSession(CloseSession),
}

/// Event: SessionOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOpened {
    pub session_id: SessionId,
    pub policy: UploadPolicy,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ImageAttached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttached {
    pub session_id: SessionId,
    pub file: UploadedFile,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ImageRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRemoved {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ResolutionSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSelected {
    pub session_id: SessionId,
    pub resolution: Resolution,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuoteRequested. Bumps the session's quote sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequested {
    pub session_id: SessionId,
    pub sequence: u64,
    pub resolution: Resolution,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuoteApplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteApplied {
    pub session_id: SessionId,
    pub sequence: u64,
    pub quote: PriceQuote,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuoteFailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteFailed {
    pub session_id: SessionId,
    pub sequence: u64,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: EmailEntered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailEntered {
    pub session_id: SessionId,
    pub email: EmailAddress,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CheckoutStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutStarted {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CheckoutSucceeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSucceeded {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CheckoutFailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFailed {
    pub session_id: SessionId,
    pub cause: FailureCause,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CheckoutRetried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRetried {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SessionClosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClosed {
    pub session_id: SessionId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutEvent {
    SessionOpened(SessionOpened),
    ImageAttached(ImageAttached),
    ImageRemoved(ImageRemoved),
    ResolutionSelected(ResolutionSelected),
    QuoteRequested(QuoteRequested),
    QuoteApplied(QuoteApplied),
    QuoteFailed(QuoteFailed),
    EmailEntered(EmailEntered),
    CheckoutStarted(CheckoutStarted),
    CheckoutSucceeded(CheckoutSucceeded),
    CheckoutFailed(CheckoutFailed),
    CheckoutRetried(CheckoutRetried),
    SessionClosed(SessionClosed),
}

impl Event for CheckoutEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CheckoutEvent::SessionOpened(_) => "checkout.session.opened",
            CheckoutEvent::ImageAttached(_) => "checkout.image.attached",
            CheckoutEvent::ImageRemoved(_) => "checkout.image.removed",
            CheckoutEvent::ResolutionSelected(_) => "checkout.resolution.selected",
            CheckoutEvent::QuoteRequested(_) => "checkout.quote.requested",
            CheckoutEvent::QuoteApplied(_) => "checkout.quote.applied",
            CheckoutEvent::QuoteFailed(_) => "checkout.quote.failed",
            CheckoutEvent::EmailEntered(_) => "checkout.email.entered",
            CheckoutEvent::CheckoutStarted(_) => "checkout.submit.started",
            CheckoutEvent::CheckoutSucceeded(_) => "checkout.submit.succeeded",
            CheckoutEvent::CheckoutFailed(_) => "checkout.submit.failed",
            CheckoutEvent::CheckoutRetried(_) => "checkout.submit.retried",
            CheckoutEvent::SessionClosed(_) => "checkout.session.closed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CheckoutEvent::SessionOpened(e) => e.occurred_at,
            CheckoutEvent::ImageAttached(e) => e.occurred_at,
            CheckoutEvent::ImageRemoved(e) => e.occurred_at,
            CheckoutEvent::ResolutionSelected(e) => e.occurred_at,
            CheckoutEvent::QuoteRequested(e) => e.occurred_at,
            CheckoutEvent::QuoteApplied(e) => e.occurred_at,
            CheckoutEvent::QuoteFailed(e) => e.occurred_at,
            CheckoutEvent::EmailEntered(e) => e.occurred_at,
            CheckoutEvent::CheckoutStarted(e) => e.occurred_at,
            CheckoutEvent::CheckoutSucceeded(e) => e.occurred_at,
            CheckoutEvent::CheckoutFailed(e) => e.occurred_at,
            CheckoutEvent::CheckoutRetried(e) => e.occurred_at,
            CheckoutEvent::SessionClosed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for CheckoutFlow {
    type Command = CheckoutCommand;
    type Event = CheckoutEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CheckoutEvent::SessionOpened(e) => {
                self.id = e.session_id;
                self.policy = e.policy;
                self.phase = Phase::Browsing;
                self.opened = true;
            }
            CheckoutEvent::ImageAttached(e) => {
                self.file = Some(e.file.clone());
                self.resolution = Resolution::default();
                self.last_error = None;
            }
            CheckoutEvent::ImageRemoved(_) => {
                self.reset_selection();
            }
            CheckoutEvent::ResolutionSelected(e) => {
                self.resolution = e.resolution;
            }
            CheckoutEvent::QuoteRequested(e) => {
                // The displayed price goes away while the lookup is in flight.
                self.quote_seq = e.sequence;
                self.quote = None;
            }
            CheckoutEvent::QuoteApplied(e) => {
                self.quote = Some(e.quote);
                self.last_error = None;
            }
            CheckoutEvent::QuoteFailed(e) => {
                self.last_error = Some((FailureCause::Upstream, e.reason.clone()));
            }
            CheckoutEvent::EmailEntered(e) => {
                self.email = Some(e.email.clone());
                self.last_error = None;
            }
            CheckoutEvent::CheckoutStarted(_) => {
                self.phase = Phase::Submitting;
                self.last_error = None;
            }
            CheckoutEvent::CheckoutSucceeded(_) => {
                self.phase = Phase::Succeeded;
            }
            CheckoutEvent::CheckoutFailed(e) => {
                self.phase = Phase::Failed(e.cause);
                self.last_error = Some((e.cause, e.reason.clone()));
            }
            CheckoutEvent::CheckoutRetried(_) => {
                self.phase = Phase::Browsing;
                self.last_error = None;
            }
            CheckoutEvent::SessionClosed(_) => {
                self.reset_selection();
                self.phase = Phase::Closed;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CheckoutCommand::OpenSession(cmd) => self.handle_open(cmd),
            CheckoutCommand::AttachImage(cmd) => self.handle_attach(cmd),
            CheckoutCommand::RemoveImage(cmd) => self.handle_remove(cmd),
            CheckoutCommand::SelectResolution(cmd) => self.handle_select_resolution(cmd),
            CheckoutCommand::ApplyQuote(cmd) => self.handle_apply_quote(cmd),
            CheckoutCommand::RejectQuote(cmd) => self.handle_reject_quote(cmd),
            CheckoutCommand::EnterEmail(cmd) => self.handle_enter_email(cmd),
            CheckoutCommand::BeginCheckout(cmd) => self.handle_begin(cmd),
            CheckoutCommand::CompleteCheckout(cmd) => self.handle_complete(cmd),
            CheckoutCommand::FailCheckout(cmd) => self.handle_fail(cmd),
            CheckoutCommand::Retry(cmd) => self.handle_retry(cmd),
            CheckoutCommand::CloseSession(cmd) => self.handle_close(cmd),
        }
    }
}

impl CheckoutFlow {
    fn reset_selection(&mut self) {
        self.file = None;
        self.resolution = Resolution::default();
        self.email = None;
        self.quote = None;
        self.last_error = None;
        self.phase = Phase::Browsing;
    }

    fn ensure_open(&self, session_id: SessionId) -> Result<(), DomainError> {
        if !self.opened {
            return Err(DomainError::not_found());
        }
        if self.id != session_id {
            return Err(DomainError::invariant("session_id mismatch"));
        }
        if self.phase == Phase::Closed {
            return Err(DomainError::conflict("session is closed"));
        }
        Ok(())
    }

    fn ensure_browsing(&self) -> Result<(), DomainError> {
        match self.phase {
            Phase::Browsing => Ok(()),
            Phase::Submitting => Err(DomainError::invariant("checkout is already submitting")),
            Phase::Succeeded => Err(DomainError::invariant("checkout already completed")),
            Phase::Failed(_) => Err(DomainError::invariant(
                "checkout failed; retry or remove the image first",
            )),
            Phase::Closed => Err(DomainError::conflict("session is closed")),
        }
    }

    fn next_quote_request(&self, occurred_at: DateTime<Utc>, resolution: Resolution) -> QuoteRequested {
        QuoteRequested {
            session_id: self.id,
            sequence: self.quote_seq + 1,
            resolution,
            occurred_at,
        }
    }

    fn handle_open(&self, cmd: &OpenSession) -> Result<Vec<CheckoutEvent>, DomainError> {
        if self.opened {
            return Err(DomainError::conflict("session already open"));
        }

        Ok(vec![CheckoutEvent::SessionOpened(SessionOpened {
            session_id: cmd.session_id,
            policy: cmd.policy,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_attach(&self, cmd: &AttachImage) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;
        self.ensure_browsing()?;

        if self.file.is_some() {
            return Err(DomainError::invariant(
                "remove the current image before uploading another",
            ));
        }

        self.policy.check(&cmd.file)?;

        // The default tier needs a price on screen too, so the lookup starts
        // with the upload.
        Ok(vec![
            CheckoutEvent::ImageAttached(ImageAttached {
                session_id: cmd.session_id,
                file: cmd.file.clone(),
                occurred_at: cmd.occurred_at,
            }),
            CheckoutEvent::QuoteRequested(
                self.next_quote_request(cmd.occurred_at, Resolution::default()),
            ),
        ])
    }

    fn handle_remove(&self, cmd: &RemoveImage) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;

        match self.phase {
            Phase::Browsing | Phase::Failed(_) => {}
            _ => return Err(DomainError::invariant("cannot remove image mid-submit")),
        }

        if self.file.is_none() {
            return Err(DomainError::invariant("no image to remove"));
        }

        Ok(vec![CheckoutEvent::ImageRemoved(ImageRemoved {
            session_id: cmd.session_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_select_resolution(
        &self,
        cmd: &SelectResolution,
    ) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;
        self.ensure_browsing()?;

        if self.file.is_none() {
            return Err(DomainError::invariant(
                "upload an image before choosing a resolution",
            ));
        }

        // Every selection re-triggers the lookup, even re-picking the same
        // tier; prices may have moved since the last quote.
        Ok(vec![
            CheckoutEvent::ResolutionSelected(ResolutionSelected {
                session_id: cmd.session_id,
                resolution: cmd.resolution,
                occurred_at: cmd.occurred_at,
            }),
            CheckoutEvent::QuoteRequested(
                self.next_quote_request(cmd.occurred_at, cmd.resolution),
            ),
        ])
    }

    fn handle_apply_quote(&self, cmd: &ApplyQuote) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;

        // Stale answer for a lookup the customer already superseded: drop it.
        if cmd.sequence != self.quote_seq || self.phase != Phase::Browsing {
            return Ok(Vec::new());
        }

        Ok(vec![CheckoutEvent::QuoteApplied(QuoteApplied {
            session_id: cmd.session_id,
            sequence: cmd.sequence,
            quote: cmd.quote,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reject_quote(&self, cmd: &RejectQuote) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;

        if cmd.sequence != self.quote_seq || self.phase != Phase::Browsing {
            return Ok(Vec::new());
        }

        Ok(vec![CheckoutEvent::QuoteFailed(QuoteFailed {
            session_id: cmd.session_id,
            sequence: cmd.sequence,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_enter_email(&self, cmd: &EnterEmail) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;
        self.ensure_browsing()?;

        if self.file.is_none() {
            return Err(DomainError::invariant(
                "upload an image before entering an email",
            ));
        }

        let email = EmailAddress::parse(&cmd.email)?;

        Ok(vec![CheckoutEvent::EmailEntered(EmailEntered {
            session_id: cmd.session_id,
            email,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_begin(&self, cmd: &BeginCheckout) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;
        self.ensure_browsing()?;

        if self.file.is_none() {
            return Err(DomainError::invariant("upload an image before checkout"));
        }
        if self.quote.is_none() {
            return Err(DomainError::invariant(
                "waiting for a price quote; checkout is not ready",
            ));
        }
        if self.email.is_none() {
            return Err(DomainError::invariant("enter an email before checkout"));
        }

        Ok(vec![CheckoutEvent::CheckoutStarted(CheckoutStarted {
            session_id: cmd.session_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(&self, cmd: &CompleteCheckout) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;

        if self.phase != Phase::Submitting {
            return Err(DomainError::invariant("no checkout in progress"));
        }

        Ok(vec![CheckoutEvent::CheckoutSucceeded(CheckoutSucceeded {
            session_id: cmd.session_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_fail(&self, cmd: &FailCheckout) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;

        if self.phase != Phase::Submitting {
            return Err(DomainError::invariant("no checkout in progress"));
        }

        Ok(vec![CheckoutEvent::CheckoutFailed(CheckoutFailed {
            session_id: cmd.session_id,
            cause: cmd.cause,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_retry(&self, cmd: &Retry) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;

        if !matches!(self.phase, Phase::Failed(_)) {
            return Err(DomainError::invariant("nothing to retry"));
        }

        // Retry keeps the entered email, tier and file; a failed submit must
        // not cost the customer their selections.
        Ok(vec![CheckoutEvent::CheckoutRetried(CheckoutRetried {
            session_id: cmd.session_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_close(&self, cmd: &CloseSession) -> Result<Vec<CheckoutEvent>, DomainError> {
        self.ensure_open(cmd.session_id)?;

        Ok(vec![CheckoutEvent::SessionClosed(SessionClosed {
            session_id: cmd.session_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelift_pricing::{FixedPricing, PricingService};

    fn test_session_id() -> SessionId {
        SessionId::new()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_file() -> UploadedFile {
        UploadedFile::new("photo.jpg", "image/jpeg", 512 * 1024)
    }

    fn quote_for(resolution: Resolution) -> PriceQuote {
        FixedPricing::default().quote(resolution).unwrap()
    }

    fn run(flow: &mut CheckoutFlow, cmd: CheckoutCommand) -> Vec<CheckoutEvent> {
        let events = flow.handle(&cmd).unwrap();
        for event in &events {
            flow.apply(event);
        }
        events
    }

    fn opened_flow(session_id: SessionId) -> CheckoutFlow {
        let mut flow = CheckoutFlow::empty(session_id);
        run(
            &mut flow,
            CheckoutCommand::OpenSession(OpenSession {
                session_id,
                policy: UploadPolicy::default(),
                occurred_at: test_time(),
            }),
        );
        flow
    }

    fn uploaded_flow(session_id: SessionId) -> CheckoutFlow {
        let mut flow = opened_flow(session_id);
        run(
            &mut flow,
            CheckoutCommand::AttachImage(AttachImage {
                session_id,
                file: test_file(),
                occurred_at: test_time(),
            }),
        );
        flow
    }

    fn ready_flow(session_id: SessionId) -> CheckoutFlow {
        let mut flow = uploaded_flow(session_id);
        let seq = flow.quote_sequence();
        let quote = quote_for(flow.resolution());
        run(
            &mut flow,
            CheckoutCommand::ApplyQuote(ApplyQuote {
                session_id,
                sequence: seq,
                quote,
                occurred_at: test_time(),
            }),
        );
        run(
            &mut flow,
            CheckoutCommand::EnterEmail(EnterEmail {
                session_id,
                email: "jane@example.com".into(),
                occurred_at: test_time(),
            }),
        );
        flow
    }

    #[test]
    fn new_session_starts_idle() {
        let flow = opened_flow(test_session_id());
        assert_eq!(flow.stage(), CheckoutStage::Idle);
        assert!(!flow.checkout_enabled());
    }

    #[test]
    fn attach_image_requests_a_quote_for_the_default_tier() {
        let session_id = test_session_id();
        let mut flow = opened_flow(session_id);

        let events = run(
            &mut flow,
            CheckoutCommand::AttachImage(AttachImage {
                session_id,
                file: test_file(),
                occurred_at: test_time(),
            }),
        );

        assert_eq!(events.len(), 2);
        match &events[1] {
            CheckoutEvent::QuoteRequested(e) => {
                assert_eq!(e.sequence, 1);
                assert_eq!(e.resolution, Resolution::FourX);
            }
            other => panic!("expected QuoteRequested, got {other:?}"),
        }

        assert_eq!(flow.stage(), CheckoutStage::Uploaded);
        assert_eq!(flow.resolution(), Resolution::FourX);
        assert!(flow.quote_pending());
    }

    #[test]
    fn wrong_file_type_is_rejected_without_touching_state() {
        let session_id = test_session_id();
        let flow = opened_flow(session_id);

        let err = flow
            .handle(&CheckoutCommand::AttachImage(AttachImage {
                session_id,
                file: UploadedFile::new("clip.gif", "image/gif", 1024),
                occurred_at: test_time(),
            }))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(flow.stage(), CheckoutStage::Idle);
    }

    #[test]
    fn oversized_file_is_rejected() {
        let session_id = test_session_id();
        let flow = opened_flow(session_id);

        let err = flow
            .handle(&CheckoutCommand::AttachImage(AttachImage {
                session_id,
                file: UploadedFile::new("huge.png", "image/png", 11 * 1024 * 1024),
                occurred_at: test_time(),
            }))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn switching_tier_clears_the_displayed_quote_while_loading() {
        let session_id = test_session_id();
        let mut flow = uploaded_flow(session_id);

        let sequence = flow.quote_sequence();
        run(
            &mut flow,
            CheckoutCommand::ApplyQuote(ApplyQuote {
                session_id,
                sequence,
                quote: quote_for(Resolution::FourX),
                occurred_at: test_time(),
            }),
        );
        assert!(flow.quote().is_some());

        run(
            &mut flow,
            CheckoutCommand::SelectResolution(SelectResolution {
                session_id,
                resolution: Resolution::EightX,
                occurred_at: test_time(),
            }),
        );

        // No stale 4x price on screen while the 8x lookup is in flight.
        assert_eq!(flow.quote(), None);
        assert!(flow.quote_pending());
        assert_eq!(flow.resolution(), Resolution::EightX);
    }

    #[test]
    fn stale_quote_response_is_ignored() {
        let session_id = test_session_id();
        let mut flow = uploaded_flow(session_id);
        let first_seq = flow.quote_sequence();

        run(
            &mut flow,
            CheckoutCommand::SelectResolution(SelectResolution {
                session_id,
                resolution: Resolution::EightX,
                occurred_at: test_time(),
            }),
        );
        let second_seq = flow.quote_sequence();
        assert!(second_seq > first_seq);

        // The slow 4x answer arrives after the customer moved to 8x.
        let events = flow
            .handle(&CheckoutCommand::ApplyQuote(ApplyQuote {
                session_id,
                sequence: first_seq,
                quote: quote_for(Resolution::FourX),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(flow.quote(), None);

        // The answer for the live lookup lands.
        run(
            &mut flow,
            CheckoutCommand::ApplyQuote(ApplyQuote {
                session_id,
                sequence: second_seq,
                quote: quote_for(Resolution::EightX),
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.quote().unwrap().resolution, Resolution::EightX);
    }

    #[test]
    fn invalid_email_is_rejected_and_nothing_changes() {
        let session_id = test_session_id();
        let mut flow = uploaded_flow(session_id);
        let before = flow.clone();

        let err = flow
            .handle(&CheckoutCommand::EnterEmail(EnterEmail {
                session_id,
                email: "not-an-email".into(),
                occurred_at: test_time(),
            }))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(flow, before);
    }

    #[test]
    fn checkout_needs_quote_and_email() {
        let session_id = test_session_id();
        let flow = uploaded_flow(session_id);

        let err = flow
            .handle(&CheckoutCommand::BeginCheckout(BeginCheckout {
                session_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn full_lifecycle_upload_to_success() {
        let session_id = test_session_id();
        let mut flow = ready_flow(session_id);
        assert_eq!(flow.stage(), CheckoutStage::CheckoutReady);
        assert!(flow.checkout_enabled());

        run(
            &mut flow,
            CheckoutCommand::BeginCheckout(BeginCheckout {
                session_id,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.stage(), CheckoutStage::Submitting);
        assert!(!flow.checkout_enabled());

        run(
            &mut flow,
            CheckoutCommand::CompleteCheckout(CompleteCheckout {
                session_id,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.stage(), CheckoutStage::Succeeded);
    }

    #[test]
    fn upstream_failure_keeps_selections_and_retry_recovers() {
        let session_id = test_session_id();
        let mut flow = ready_flow(session_id);

        run(
            &mut flow,
            CheckoutCommand::BeginCheckout(BeginCheckout {
                session_id,
                occurred_at: test_time(),
            }),
        );
        run(
            &mut flow,
            CheckoutCommand::FailCheckout(FailCheckout {
                session_id,
                cause: FailureCause::Upstream,
                reason: "payment gateway timeout".into(),
                occurred_at: test_time(),
            }),
        );

        assert_eq!(flow.stage(), CheckoutStage::Failed);
        let (cause, msg) = flow.last_error().unwrap();
        assert_eq!(cause, FailureCause::Upstream);
        assert!(msg.contains("timeout"));

        // Entered state survives the failure.
        assert!(flow.file().is_some());
        assert_eq!(flow.email().unwrap().as_str(), "jane@example.com");
        assert!(flow.quote().is_some());

        run(
            &mut flow,
            CheckoutCommand::Retry(Retry {
                session_id,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.stage(), CheckoutStage::CheckoutReady);
        assert_eq!(flow.last_error(), None);
    }

    #[test]
    fn quote_failure_surfaces_error_and_reselect_recovers() {
        let session_id = test_session_id();
        let mut flow = uploaded_flow(session_id);

        let sequence = flow.quote_sequence();
        run(
            &mut flow,
            CheckoutCommand::RejectQuote(RejectQuote {
                session_id,
                sequence,
                reason: "pricing source unavailable".into(),
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.last_error().unwrap().0, FailureCause::Upstream);

        run(
            &mut flow,
            CheckoutCommand::SelectResolution(SelectResolution {
                session_id,
                resolution: Resolution::FourX,
                occurred_at: test_time(),
            }),
        );
        let seq = flow.quote_sequence();
        run(
            &mut flow,
            CheckoutCommand::ApplyQuote(ApplyQuote {
                session_id,
                sequence: seq,
                quote: quote_for(Resolution::FourX),
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.last_error(), None);
        assert!(flow.quote().is_some());
    }

    #[test]
    fn removing_image_discards_all_selection_state() {
        let session_id = test_session_id();
        let mut flow = ready_flow(session_id);

        run(
            &mut flow,
            CheckoutCommand::RemoveImage(RemoveImage {
                session_id,
                occurred_at: test_time(),
            }),
        );

        assert_eq!(flow.stage(), CheckoutStage::Idle);
        assert_eq!(flow.file(), None);
        assert_eq!(flow.email(), None);
        assert_eq!(flow.quote(), None);
        assert_eq!(flow.resolution(), Resolution::FourX);
    }

    #[test]
    fn closing_discards_state_and_rejects_late_responses() {
        let session_id = test_session_id();
        let mut flow = uploaded_flow(session_id);
        let in_flight_seq = flow.quote_sequence();

        run(
            &mut flow,
            CheckoutCommand::CloseSession(CloseSession {
                session_id,
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.stage(), CheckoutStage::Closed);
        assert_eq!(flow.file(), None);
        assert_eq!(flow.email(), None);

        // The quote that was in flight when the modal closed is rejected.
        let err = flow
            .handle(&CheckoutCommand::ApplyQuote(ApplyQuote {
                session_id,
                sequence: in_flight_seq,
                quote: quote_for(Resolution::FourX),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn commands_against_unopened_session_are_not_found() {
        let session_id = test_session_id();
        let flow = CheckoutFlow::empty(session_id);

        let err = flow
            .handle(&CheckoutCommand::AttachImage(AttachImage {
                session_id,
                file: test_file(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::not_found());
    }

    #[test]
    fn session_id_mismatch_is_an_invariant_violation() {
        let flow = opened_flow(test_session_id());

        let err = flow
            .handle(&CheckoutCommand::RemoveImage(RemoveImage {
                session_id: test_session_id(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let session_id = test_session_id();
        let flow = uploaded_flow(session_id);
        let before = flow.clone();

        let cmd = CheckoutCommand::SelectResolution(SelectResolution {
            session_id,
            resolution: Resolution::EightX,
            occurred_at: test_time(),
        });

        let events1 = flow.handle(&cmd).unwrap();
        let events2 = flow.handle(&cmd).unwrap();

        assert_eq!(flow, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn version_increments_on_apply() {
        let session_id = test_session_id();
        let mut flow = CheckoutFlow::empty(session_id);
        assert_eq!(flow.version(), 0);

        run(
            &mut flow,
            CheckoutCommand::OpenSession(OpenSession {
                session_id,
                policy: UploadPolicy::default(),
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.version(), 1);

        // Attach emits two events (image + quote request).
        run(
            &mut flow,
            CheckoutCommand::AttachImage(AttachImage {
                session_id,
                file: test_file(),
                occurred_at: test_time(),
            }),
        );
        assert_eq!(flow.version(), 3);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: apply is deterministic; replaying the same events
            /// from the same empty session yields identical state.
            #[test]
            fn replay_is_deterministic(
                size in 1u64..(10 * 1024 * 1024),
                eight_x in proptest::bool::ANY,
            ) {
                let session_id = SessionId::new();
                let tier = if eight_x { Resolution::EightX } else { Resolution::FourX };
                let occurred_at = Utc::now();

                let mut source = CheckoutFlow::empty(session_id);
                let mut log = Vec::new();
                for cmd in [
                    CheckoutCommand::OpenSession(OpenSession {
                        session_id,
                        policy: UploadPolicy::default(),
                        occurred_at,
                    }),
                    CheckoutCommand::AttachImage(AttachImage {
                        session_id,
                        file: UploadedFile::new("p.webp", "image/webp", size),
                        occurred_at,
                    }),
                    CheckoutCommand::SelectResolution(SelectResolution {
                        session_id,
                        resolution: tier,
                        occurred_at,
                    }),
                ] {
                    let events = source.handle(&cmd).unwrap();
                    for event in &events {
                        source.apply(event);
                    }
                    log.extend(events);
                }

                let mut replayed = CheckoutFlow::empty(session_id);
                for event in &log {
                    replayed.apply(event);
                }

                prop_assert_eq!(source, replayed);
            }

            /// Property: a quote answer only lands when its sequence is the
            /// latest requested one.
            #[test]
            fn only_latest_sequence_lands(offset in 0u64..5) {
                let session_id = SessionId::new();
                let mut flow = CheckoutFlow::empty(session_id);
                let occurred_at = Utc::now();

                for cmd in [
                    CheckoutCommand::OpenSession(OpenSession {
                        session_id,
                        policy: UploadPolicy::default(),
                        occurred_at,
                    }),
                    CheckoutCommand::AttachImage(AttachImage {
                        session_id,
                        file: UploadedFile::new("p.png", "image/png", 1024),
                        occurred_at,
                    }),
                ] {
                    let events = flow.handle(&cmd).unwrap();
                    for event in &events {
                        flow.apply(event);
                    }
                }

                let latest = flow.quote_sequence();
                let answered = latest.saturating_sub(offset);
                let events = flow
                    .handle(&CheckoutCommand::ApplyQuote(ApplyQuote {
                        session_id,
                        sequence: answered,
                        quote: PriceQuote::new(Resolution::FourX, 500),
                        occurred_at,
                    }))
                    .unwrap();

                prop_assert_eq!(events.is_empty(), answered != latest);
            }
        }
    }
}
