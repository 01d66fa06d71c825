use crate::session::SessionState;
use common::errors::{AuthError, TransitionError};
use common::types::dtos::OrderId;

/// Failures of the GraphQL collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("request sent without a login token")]
    Unauthenticated,

    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered with `ok: false`.
    #[error("api error: {0}")]
    Remote(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("order {0} not found")]
    NotFound(OrderId),
}

impl From<AuthError> for GatewayError {
    fn from(_: AuthError) -> Self {
        GatewayError::Unauthenticated
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Malformed(err.to_string())
    }
}

/// Errors surfaced by an order session to its UI.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("could not load the order: {0}")]
    FetchFailed(String),

    #[error("live updates stopped: {0}")]
    SubscriptionFailed(String),

    /// The mutation went through but the API refused it. The snapshot is
    /// left alone until the next live update.
    #[error("the order could not be updated: {0}")]
    TransitionRejected(String),

    /// The UI asked for something the status machine forbids.
    #[error("illegal transition requested: {0}")]
    IllegalTransitionRequested(#[from] TransitionError),

    #[error("session is {0:?}, the request needs another state")]
    NotActive(SessionState),

    #[error("no user is logged in")]
    NotAuthenticated,
}

impl From<AuthError> for SessionError {
    fn from(_: AuthError) -> Self {
        SessionError::NotAuthenticated
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("usage: {program} <order_id> <Client|Owner|Delivery> [email]")]
    Usage { program: String },

    #[error("invalid order id '{0}'")]
    InvalidOrderId(String),

    #[error("{0}")]
    InvalidRole(String),

    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: String, value: String },
}
