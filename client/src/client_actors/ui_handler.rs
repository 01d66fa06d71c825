use crate::client_actors::order_session::OrderSessionActor;
use crate::errors::SessionError;
use crate::messages::internal_messages::{
    Close, GetSessionView, RequestTransition, Retry, SessionUpdate, TakeOrder, UserCommand,
};
use crate::session::{SessionState, SessionView};
use actix::prelude::*;
use common::logger::Logger;

/// Actor UIHandler: terminal interface of the order page.
pub struct UIHandler {
    /// Channel to the order session.
    pub session: Addr<OrderSessionActor>,
    pub logger: Logger,
}

impl UIHandler {
    pub fn new(session: Addr<OrderSessionActor>, logger: Logger) -> Self {
        UIHandler { session, logger }
    }
}

/// Prints one session view.
fn render(logger: &Logger, view: &SessionView) {
    match view.state {
        SessionState::Idle | SessionState::Loading => {
            logger.info(format!("Order #{}: loading...", view.order_id));
        }
        SessionState::Closed => {
            logger.info(format!("Order #{}: closed", view.order_id));
        }
        SessionState::Error => {
            let reason = view
                .last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();
            logger.error(format!(
                "Order #{}: {}. Type 'retry' to try again.",
                view.order_id, reason
            ));
        }
        SessionState::Active => {
            let Some(presentation) = &view.presentation else {
                return;
            };
            logger.info(format!(
                "Order #{} | {} | total {} | driver: {}",
                presentation.order_id,
                presentation.restaurant_label,
                presentation.total_label,
                presentation.driver_label
            ));
            logger.info(format!("Progress: {}", presentation.progress_label));
            for action in &presentation.available_actions {
                logger.info(format!("  → advance {}", action));
            }
            if presentation.can_take {
                logger.info("  → take");
            }
            if let Some(SessionError::TransitionRejected(reason)) = &view.last_error {
                logger.warn(format!("Last request was refused: {}", reason));
            }
        }
    }
}

fn report(logger: &Logger, result: Result<Result<(), SessionError>, MailboxError>) {
    match result {
        Ok(Ok(())) => logger.debug("Request sent"),
        Ok(Err(e)) => logger.warn(e.to_string()),
        Err(e) => logger.error(format!("Session unreachable: {}", e)),
    }
}

/// Parses one line typed by the user.
pub fn parse_command(line: &str) -> Option<UserCommand> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();
    let argument = words.next();
    match (command.as_str(), argument) {
        ("advance", Some(status)) => status.parse().ok().map(UserCommand::Advance),
        ("take", None) => Some(UserCommand::Take),
        ("retry", None) => Some(UserCommand::Retry),
        ("show", None) => Some(UserCommand::Show),
        ("quit" | "exit", None) => Some(UserCommand::Quit),
        _ => None,
    }
}

impl Actor for UIHandler {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger
            .info("UIHandler started. Commands: advance <status>, take, retry, show, quit");
    }
}

impl Handler<SessionUpdate> for UIHandler {
    type Result = ();

    fn handle(&mut self, msg: SessionUpdate, _ctx: &mut Self::Context) {
        render(&self.logger, &msg.view);
    }
}

impl Handler<UserCommand> for UIHandler {
    type Result = ResponseFuture<()>;

    fn handle(&mut self, msg: UserCommand, _ctx: &mut Self::Context) -> Self::Result {
        let logger = self.logger.clone();
        match msg {
            UserCommand::Advance(target) => {
                let request = self.session.send(RequestTransition { target });
                Box::pin(async move { report(&logger, request.await) })
            }
            UserCommand::Take => {
                let request = self.session.send(TakeOrder);
                Box::pin(async move { report(&logger, request.await) })
            }
            UserCommand::Retry => {
                let request = self.session.send(Retry);
                Box::pin(async move { report(&logger, request.await) })
            }
            UserCommand::Show => {
                let request = self.session.send(GetSessionView);
                Box::pin(async move {
                    match request.await {
                        Ok(view) => render(&logger, &view),
                        Err(e) => logger.error(format!("Session unreachable: {}", e)),
                    }
                })
            }
            UserCommand::Quit => {
                logger.info("Closing the order page...");
                let request = self.session.send(Close);
                Box::pin(async move {
                    if let Err(e) = request.await {
                        logger.warn(format!("Session already gone: {}", e));
                    }
                })
            }
        }
    }
}
