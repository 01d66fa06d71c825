use crate::errors::SessionError;
use crate::session::SessionView;
use actix::Message;
use common::types::order_status::OrderStatus;

/// Ask the session to move the order to `target`.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), SessionError>")]
pub struct RequestTransition {
    pub target: OrderStatus,
}

/// Driver takes the order.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), SessionError>")]
pub struct TakeOrder;

/// Manual retry after a fetch or subscription failure.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), SessionError>")]
pub struct Retry;

/// Teardown of the order page.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Close;

#[derive(Message, Debug, Clone)]
#[rtype(result = "SessionView")]
pub struct GetSessionView;

/// Pushed to the UI after every change of the session.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SessionUpdate {
    pub view: SessionView,
}

/// Commands the UIHandler receives from the terminal.
#[derive(Message, Debug, Clone, PartialEq)]
#[rtype(result = "()")]
pub enum UserCommand {
    Advance(OrderStatus),
    Take,
    Retry,
    Show,
    Quit,
}
