use crate::errors::{GatewayError, SessionError};
use crate::gateway::{
    GatewayFuture, LiveUpdate, MutationOutcome, OrderGateway, OrderSubscription,
    SubscriptionHandle,
};
use crate::messages::internal_messages::{
    Close, GetSessionView, RequestTransition, Retry, SessionUpdate, TakeOrder,
};
use crate::session::{FetchOutcome, FetchTicket, OrderSession, SessionState, UpdateOutcome};
use actix::prelude::*;
use colored::Color;
use common::auth::AuthContext;
use common::logger::Logger;
use common::types::dtos::{OrderDTO, OrderId};
use std::sync::Arc;
use tokio_stream::StreamExt;

/// Item of the live-update stream, tagged with the subscription it came
/// from. `update` is `None` once that subscription's stream has ended.
pub struct TaggedUpdate {
    subscription: u64,
    update: Option<LiveUpdate>,
}

/// Actor OrderSession: observes and operates a single order from the moment
/// the page mounts until it closes.
pub struct OrderSessionActor {
    /// Pure session state.
    session: OrderSession,
    /// API GraphQL.
    gateway: Arc<dyn OrderGateway>,
    /// Open `orderUpdates` subscription, if any.
    subscription: Option<SubscriptionHandle>,
    subscription_seq: u64,
    /// Channel to the UI.
    observer: Option<Recipient<SessionUpdate>>,
    logger: Logger,
}

impl OrderSessionActor {
    /// Builds a session for `order_id`, taking the viewer's role from `auth`.
    pub fn new(
        order_id: OrderId,
        auth: &AuthContext,
        gateway: Arc<dyn OrderGateway>,
        observer: Option<Recipient<SessionUpdate>>,
    ) -> Result<Self, SessionError> {
        let viewer = auth.viewer()?;
        let logger = Logger::new(format!("Order {} ({})", order_id, viewer.role), Color::Cyan);
        Ok(Self {
            session: OrderSession::new(order_id, viewer.role),
            gateway,
            subscription: None,
            subscription_seq: 0,
            observer,
            logger,
        })
    }

    /// Sets the UI that receives a [`SessionUpdate`] after every change.
    pub fn with_observer(mut self, observer: Recipient<SessionUpdate>) -> Self {
        self.observer = Some(observer);
        self
    }

    fn publish(&self) {
        if let Some(observer) = &self.observer {
            observer.do_send(SessionUpdate {
                view: self.session.view(),
            });
        }
    }

    fn start_fetch(&mut self, ctx: &mut Context<Self>) -> Result<(), SessionError> {
        let ticket = self.session.begin_fetch()?;
        self.logger.info("Loading order...");
        self.publish();
        let fetch = self.gateway.fetch_order(self.session.order_id());
        ctx.spawn(
            fetch
                .into_actor(self)
                .map(move |result, act: &mut Self, ctx| {
                    act.handle_fetch_result(ticket, result, ctx)
                }),
        );
        Ok(())
    }

    fn handle_fetch_result(
        &mut self,
        ticket: FetchTicket,
        result: Result<OrderDTO, GatewayError>,
        ctx: &mut Context<Self>,
    ) {
        match self.session.on_fetch_result(ticket, result) {
            FetchOutcome::Ignored => {
                self.logger.debug("Discarding a stale fetch answer");
                return;
            }
            FetchOutcome::Failed => {
                self.logger.error(format!(
                    "Fetch failed: {}",
                    describe(self.session.view().last_error)
                ));
            }
            FetchOutcome::Activated => {
                self.logger.info("Order loaded, subscribing to live updates");
                self.open_subscription(ctx);
            }
        }
        self.publish();
    }

    fn open_subscription(&mut self, ctx: &mut Context<Self>) {
        match self.gateway.subscribe_order_updates(self.session.order_id()) {
            Ok(OrderSubscription { events, handle }) => {
                self.subscription_seq += 1;
                let seq = self.subscription_seq;
                self.subscription = Some(handle);
                let tagged = events
                    .map(move |update| TaggedUpdate {
                        subscription: seq,
                        update: Some(update),
                    })
                    .chain(tokio_stream::once(TaggedUpdate {
                        subscription: seq,
                        update: None,
                    }));
                ctx.add_stream(tagged);
            }
            Err(e) => {
                self.session.on_subscription_failed(e.to_string());
                self.logger.error(format!("Could not subscribe: {}", e));
            }
        }
    }

    fn release_subscription(&mut self) {
        if let Some(mut handle) = self.subscription.take() {
            handle.close();
            self.logger.debug("Live updates released");
        }
    }

    fn dispatch_mutation(
        &mut self,
        action: String,
        mutation: GatewayFuture<MutationOutcome>,
        ctx: &mut Context<Self>,
    ) {
        self.logger.info(format!("Dispatching {}", action));
        ctx.spawn(
            mutation
                .into_actor(self)
                .map(move |result, act: &mut Self, _ctx| {
                    act.handle_mutation_result(&action, result)
                }),
        );
    }

    fn handle_mutation_result(&mut self, action: &str, result: Result<MutationOutcome, GatewayError>) {
        if self.session.is_closed() {
            return;
        }
        match self.session.on_mutation_outcome(result) {
            Ok(()) => self
                .logger
                .info(format!("{} accepted, waiting for the live update", action)),
            Err(e) => self.logger.warn(format!("{}: {}", action, e)),
        }
        self.publish();
    }

    fn refuse(&self, err: SessionError) -> Result<(), SessionError> {
        match &err {
            SessionError::IllegalTransitionRequested(_) => {
                self.logger.error(format!("Refusing request: {}", err))
            }
            _ => self.logger.warn(format!("Refusing request: {}", err)),
        }
        Err(err)
    }
}

fn describe(err: Option<SessionError>) -> String {
    err.map(|e| e.to_string()).unwrap_or_default()
}

impl Actor for OrderSessionActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        if let Err(e) = self.start_fetch(ctx) {
            self.logger.error(format!("Could not start the session: {}", e));
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.session.close();
        self.release_subscription();
        self.logger.info("Session closed");
    }
}

impl StreamHandler<TaggedUpdate> for OrderSessionActor {
    fn handle(&mut self, item: TaggedUpdate, _ctx: &mut Self::Context) {
        if item.subscription != self.subscription_seq || self.subscription.is_none() {
            return;
        }
        match item.update {
            Some(LiveUpdate::Event(event)) => match self.session.on_live_update(event) {
                UpdateOutcome::Applied => {
                    if let Some(order) = self.session.snapshot() {
                        self.logger.info(format!("Order is now {}", order.status));
                    }
                    self.publish();
                }
                UpdateOutcome::Discarded(decision) => {
                    self.logger
                        .warn(format!("Live update discarded: {:?}", decision));
                }
                UpdateOutcome::Ignored => {}
            },
            Some(LiveUpdate::Failed(reason)) => {
                if self.session.on_subscription_failed(reason.clone()) {
                    self.logger.error(format!("Live updates failed: {}", reason));
                }
                self.release_subscription();
                self.publish();
            }
            None => {
                if self.session.on_subscription_failed("the server ended the subscription") {
                    self.logger.error("Live updates ended unexpectedly");
                }
                self.release_subscription();
                self.publish();
            }
        }
    }

    // Ending a stream must not stop the session.
    fn finished(&mut self, _ctx: &mut Self::Context) {}
}

impl Handler<RequestTransition> for OrderSessionActor {
    type Result = Result<(), SessionError>;

    fn handle(&mut self, msg: RequestTransition, ctx: &mut Self::Context) -> Self::Result {
        let target = match self.session.authorize_transition(msg.target) {
            Ok(target) => target,
            Err(e) => return self.refuse(e),
        };
        let mutation = self
            .gateway
            .submit_status_transition(self.session.order_id(), target);
        self.dispatch_mutation(format!("transition to {}", target), mutation, ctx);
        Ok(())
    }
}

impl Handler<TakeOrder> for OrderSessionActor {
    type Result = Result<(), SessionError>;

    fn handle(&mut self, _msg: TakeOrder, ctx: &mut Self::Context) -> Self::Result {
        if let Err(e) = self.session.authorize_take() {
            return self.refuse(e);
        }
        let mutation = self.gateway.take_order(self.session.order_id());
        self.dispatch_mutation("take order".to_string(), mutation, ctx);
        Ok(())
    }
}

impl Handler<Retry> for OrderSessionActor {
    type Result = Result<(), SessionError>;

    fn handle(&mut self, _msg: Retry, ctx: &mut Self::Context) -> Self::Result {
        if self.session.state() != SessionState::Error {
            return self.refuse(SessionError::NotActive(self.session.state()));
        }
        self.release_subscription();
        self.start_fetch(ctx)
    }
}

impl Handler<Close> for OrderSessionActor {
    type Result = ();

    fn handle(&mut self, _msg: Close, ctx: &mut Self::Context) -> Self::Result {
        self.session.close();
        self.release_subscription();
        self.publish();
        ctx.stop();
    }
}

impl Handler<GetSessionView> for OrderSessionActor {
    type Result = MessageResult<GetSessionView>;

    fn handle(&mut self, _msg: GetSessionView, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.session.view())
    }
}
