//! State core of an order session, free of any I/O.
//!
//! ```text
//! Idle ──begin_fetch──► Loading ──fetch ok──► Active ──close──► Closed
//!                          │                    │
//!                     fetch failed      subscription failed
//!                          ▼                    ▼
//!                        Error ◄────────────────┘
//!                          │
//!                          └──begin_fetch (manual retry)──► Loading
//! ```
//!
//! Once closed, every input is ignored. A fetch answer is only accepted for
//! the latest ticket handed out by [`OrderSession::begin_fetch`].

use crate::errors::{GatewayError, SessionError};
use crate::gateway::MutationOutcome;
use common::lifecycle::merger::{MergeDecision, decide, merge};
use common::lifecycle::presenter::{OrderPresentation, present};
use common::lifecycle::status_machine::{validate_take, validate_transition};
use common::types::dtos::{OrderDTO, OrderId};
use common::types::order_status::OrderStatus;
use common::types::user_role::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Active,
    Error,
    Closed,
}

/// Identifies one initial fetch. Answers carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Snapshot stored. The caller must open the live subscription.
    Activated,
    Failed,
    /// Session closed or ticket stale, nothing changed.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    Discarded(MergeDecision),
    /// Session not active, nothing changed.
    Ignored,
}

/// Everything the UI needs to render one order page.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub order_id: OrderId,
    pub role: UserRole,
    pub state: SessionState,
    pub snapshot: Option<OrderDTO>,
    pub presentation: Option<OrderPresentation>,
    pub last_error: Option<SessionError>,
}

#[derive(Debug)]
pub struct OrderSession {
    order_id: OrderId,
    role: UserRole,
    state: SessionState,
    snapshot: Option<OrderDTO>,
    last_error: Option<SessionError>,
    fetch_seq: u64,
}

impl OrderSession {
    pub fn new(order_id: OrderId, role: UserRole) -> Self {
        Self {
            order_id,
            role,
            state: SessionState::Idle,
            snapshot: None,
            last_error: None,
            fetch_seq: 0,
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn snapshot(&self) -> Option<&OrderDTO> {
        self.snapshot.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Enters `Loading`. Allowed on mount (`Idle`) and as a manual retry
    /// from `Error`.
    pub fn begin_fetch(&mut self) -> Result<FetchTicket, SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Error => {
                self.fetch_seq += 1;
                self.state = SessionState::Loading;
                self.last_error = None;
                Ok(FetchTicket(self.fetch_seq))
            }
            other => Err(SessionError::NotActive(other)),
        }
    }

    pub fn on_fetch_result(
        &mut self,
        ticket: FetchTicket,
        result: Result<OrderDTO, GatewayError>,
    ) -> FetchOutcome {
        if self.state != SessionState::Loading || ticket.0 != self.fetch_seq {
            return FetchOutcome::Ignored;
        }
        match result {
            Ok(order) if order.id == self.order_id => {
                // After a retry, a stale read must not move the order backwards.
                let order = match &self.snapshot {
                    Some(previous) => merge(previous, Some(&order)),
                    None => order,
                };
                self.snapshot = Some(order);
                self.state = SessionState::Active;
                FetchOutcome::Activated
            }
            Ok(order) => {
                self.fail(SessionError::FetchFailed(format!(
                    "asked for order {} but received order {}",
                    self.order_id, order.id
                )));
                FetchOutcome::Failed
            }
            Err(e) => {
                self.fail(SessionError::FetchFailed(e.to_string()));
                FetchOutcome::Failed
            }
        }
    }

    /// Runs one live-update event through the merger.
    pub fn on_live_update(&mut self, event: Option<OrderDTO>) -> UpdateOutcome {
        if self.state != SessionState::Active {
            return UpdateOutcome::Ignored;
        }
        let Some(previous) = self.snapshot.as_ref() else {
            return UpdateOutcome::Ignored;
        };
        match decide(previous, event.as_ref()) {
            MergeDecision::Replace => {
                self.snapshot = event;
                UpdateOutcome::Applied
            }
            kept => UpdateOutcome::Discarded(kept),
        }
    }

    /// Returns `true` when the failure moved the session to `Error`.
    pub fn on_subscription_failed(&mut self, reason: impl Into<String>) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        self.fail(SessionError::SubscriptionFailed(reason.into()));
        true
    }

    /// Checks a transition before the mutation is dispatched.
    pub fn authorize_transition(&self, target: OrderStatus) -> Result<OrderStatus, SessionError> {
        let snapshot = self.active_snapshot()?;
        Ok(validate_transition(snapshot.status, target, self.role)?)
    }

    pub fn authorize_take(&self) -> Result<(), SessionError> {
        let snapshot = self.active_snapshot()?;
        Ok(validate_take(snapshot, self.role)?)
    }

    /// Records the answer of a dispatched mutation. The snapshot is never
    /// touched here; the live update carries the new state.
    pub fn on_mutation_outcome(
        &mut self,
        result: Result<MutationOutcome, GatewayError>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Active {
            return Ok(());
        }
        let rejection = match result {
            Ok(outcome) if outcome.ok => {
                self.last_error = None;
                return Ok(());
            }
            Ok(outcome) => outcome
                .error
                .unwrap_or_else(|| "the request was refused".to_string()),
            Err(e) => e.to_string(),
        };
        let err = SessionError::TransitionRejected(rejection);
        self.last_error = Some(err.clone());
        Err(err)
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            order_id: self.order_id,
            role: self.role,
            state: self.state,
            snapshot: self.snapshot.clone(),
            presentation: self.snapshot.as_ref().map(|o| present(o, self.role)),
            last_error: self.last_error.clone(),
        }
    }

    fn active_snapshot(&self) -> Result<&OrderDTO, SessionError> {
        match (self.state, self.snapshot.as_ref()) {
            (SessionState::Active, Some(snapshot)) => Ok(snapshot),
            (state, _) => Err(SessionError::NotActive(state)),
        }
    }

    fn fail(&mut self, err: SessionError) {
        self.state = SessionState::Error;
        self.last_error = Some(err);
    }
}
