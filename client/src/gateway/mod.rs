//! The GraphQL API as seen by an order session.
//!
//! The trait is the seam between the session and whatever transport runs
//! the queries. [`in_memory`] provides a GraphQL-shaped backend used by the
//! binary and by the tests.

pub mod in_memory;

use crate::errors::GatewayError;
use common::types::dtos::{OrderDTO, OrderId};
use common::types::order_status::OrderStatus;
use std::future::Future;
use std::pin::Pin;
use tokio_stream::Stream;

pub type GatewayFuture<T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send>>;

pub type LiveUpdateStream = Pin<Box<dyn Stream<Item = LiveUpdate> + Send>>;

/// One item of the `orderUpdates` subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveUpdate {
    /// Full current state of the order. `None` when the payload was empty.
    Event(Option<OrderDTO>),
    /// The stream dropped. No more items follow.
    Failed(String),
}

/// Answer of `editOrder` / `takeOrder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub ok: bool,
    pub error: Option<String>,
}

impl MutationOutcome {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// Releases a live subscription. Closing is idempotent and also happens on
/// drop, so a handle that goes out of scope never leaks the subscription.
pub struct SubscriptionHandle {
    closer: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionHandle {
    pub fn new(closer: impl FnOnce() + Send + 'static) -> Self {
        Self {
            closer: Some(Box::new(closer)),
        }
    }

    pub fn close(&mut self) {
        if let Some(closer) = self.closer.take() {
            closer();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closer.is_none()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

pub struct OrderSubscription {
    pub events: LiveUpdateStream,
    pub handle: SubscriptionHandle,
}

pub trait OrderGateway: Send + Sync + 'static {
    /// `getOrder(input: { id })`
    fn fetch_order(&self, id: OrderId) -> GatewayFuture<OrderDTO>;

    /// `orderUpdates(input: { id })`
    fn subscribe_order_updates(&self, id: OrderId) -> Result<OrderSubscription, GatewayError>;

    /// `editOrder(input: { id, status })`
    fn submit_status_transition(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> GatewayFuture<MutationOutcome>;

    /// `takeOrder(input: { id })`
    fn take_order(&self, id: OrderId) -> GatewayFuture<MutationOutcome>;
}
