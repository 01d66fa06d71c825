use crate::types::order_status::OrderStatus;
use crate::types::user_role::UserRole;

/// Why a requested status transition cannot be offered or submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("order is already {0}, no further transitions exist")]
    Terminal(OrderStatus),

    #[error("{role} may not move an order from {from} to {to}")]
    NotPermitted {
        role: UserRole,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("{role} may not take an order that is {status} (driver assigned: {has_driver})")]
    TakeNotPermitted {
        role: UserRole,
        status: OrderStatus,
        has_driver: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("login returned an empty token")]
    EmptyToken,

    #[error("no user is logged in")]
    NotLoggedIn,
}
