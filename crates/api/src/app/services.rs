//! In-memory session service backing the checkout routes.
//!
//! Sessions are ephemeral (created on modal open, discarded on close), so the
//! store is a process-local map. Quote lookups
//! triggered by the flow are fulfilled inline against the configured
//! `PricingService`, flowing back through the aggregate as commands so the
//! staleness guard stays the single authority.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use pixelift_checkout::{
    ApplyQuote, CheckoutCommand, CheckoutEvent, CheckoutFlow, OpenSession, QuoteRequested,
    RejectQuote, UploadPolicy,
};
use pixelift_core::{Aggregate, AggregateRoot, DomainError, DomainResult, Event, ExpectedVersion, SessionId};
use pixelift_pricing::{FixedPricing, PricingService};
use pixelift_render::{InMemoryOptions, TERMS_URL_OPTION};

struct SessionRecord {
    flow: CheckoutFlow,
    log: Vec<CheckoutEvent>,
}

pub struct AppServices {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
    pricing: Arc<dyn PricingService>,
    options: InMemoryOptions,
}

impl AppServices {
    pub fn new(terms_url: Option<String>) -> Self {
        let mut options = InMemoryOptions::new();
        if let Some(url) = terms_url.filter(|u| !u.trim().is_empty()) {
            options = options.with(TERMS_URL_OPTION, url);
        }

        Self {
            sessions: RwLock::new(HashMap::new()),
            pricing: Arc::new(FixedPricing::default()),
            options,
        }
    }

    pub fn options(&self) -> &InMemoryOptions {
        &self.options
    }

    /// Open a fresh session and return its initial state.
    pub fn open_session(&self, policy: UploadPolicy) -> DomainResult<CheckoutFlow> {
        let session_id = SessionId::new();
        let mut flow = CheckoutFlow::empty(session_id);

        let events = flow.handle(&CheckoutCommand::OpenSession(OpenSession {
            session_id,
            policy,
            occurred_at: Utc::now(),
        }))?;
        for event in &events {
            flow.apply(event);
        }

        let mut sessions = self.sessions.write().expect("session lock poisoned");
        sessions.insert(
            session_id,
            SessionRecord {
                flow: flow.clone(),
                log: events,
            },
        );

        tracing::debug!(session = %session_id, "checkout session opened");
        Ok(flow)
    }

    /// Run one command against a session, then fulfil any quote lookup the
    /// flow requested. Returns the state after everything applied.
    pub fn execute(
        &self,
        session_id: SessionId,
        expected: ExpectedVersion,
        command: CheckoutCommand,
    ) -> DomainResult<CheckoutFlow> {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        let record = sessions.get_mut(&session_id).ok_or(DomainError::NotFound)?;

        expected.check(record.flow.version())?;

        let events = record.flow.handle(&command)?;
        let requests: Vec<QuoteRequested> = events
            .iter()
            .filter_map(|e| match e {
                CheckoutEvent::QuoteRequested(req) => Some(req.clone()),
                _ => None,
            })
            .collect();
        for event in events {
            record.flow.apply(&event);
            record.log.push(event);
        }

        for request in requests {
            let follow_up = match self.pricing.quote(request.resolution) {
                Ok(quote) => CheckoutCommand::ApplyQuote(ApplyQuote {
                    session_id,
                    sequence: request.sequence,
                    quote,
                    occurred_at: Utc::now(),
                }),
                Err(e) => CheckoutCommand::RejectQuote(RejectQuote {
                    session_id,
                    sequence: request.sequence,
                    reason: e.to_string(),
                    occurred_at: Utc::now(),
                }),
            };

            for event in record.flow.handle(&follow_up)? {
                record.flow.apply(&event);
                record.log.push(event);
            }
        }

        tracing::debug!(
            session = %session_id,
            version = record.flow.version(),
            stage = ?record.flow.stage(),
            "checkout command applied"
        );
        Ok(record.flow.clone())
    }

    pub fn snapshot(&self, session_id: SessionId) -> DomainResult<CheckoutFlow> {
        let sessions = self.sessions.read().expect("session lock poisoned");
        sessions
            .get(&session_id)
            .map(|r| r.flow.clone())
            .ok_or(DomainError::NotFound)
    }

    /// Event-type names applied to the session so far, in order.
    pub fn event_log(&self, session_id: SessionId) -> DomainResult<Vec<&'static str>> {
        let sessions = self.sessions.read().expect("session lock poisoned");
        sessions
            .get(&session_id)
            .map(|r| r.log.iter().map(|e| e.event_type()).collect())
            .ok_or(DomainError::NotFound)
    }
}
