use crate::errors::GatewayError;
use crate::gateway::{
    GatewayFuture, LiveUpdate, MutationOutcome, OrderGateway, OrderSubscription,
    SubscriptionHandle,
};
use common::auth::{AuthContext, Viewer};
use common::constants::LATENCY_JITTER_MILLIS;
use common::lifecycle::status_machine::{validate_take, validate_transition};
use common::types::dtos::{OrderDTO, OrderId, UserRefDTO};
use common::types::graphql::{
    EditOrderInput, EditOrderResponse, GetOrderInput, GetOrderOutput, GetOrderResponse,
    MutationOutput, OrderUpdatesInput, OrderUpdatesPayload, TakeOrderInput, TakeOrderResponse,
};
use common::types::order_status::OrderStatus;
use common::types::user_role::UserRole;
use rand::Rng;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

/// Raw subscription item: a `data` document or a transport failure.
type RawUpdate = Result<Value, String>;

#[derive(Default)]
struct BackendState {
    orders: HashMap<OrderId, OrderDTO>,
    users: HashMap<String, Viewer>,
    subscribers: HashMap<OrderId, HashMap<Uuid, UnboundedSender<RawUpdate>>>,
}

/// GraphQL-shaped order API kept in memory. Every operation answers with the
/// JSON document the real schema would return.
#[derive(Clone, Default)]
pub struct InMemoryOrderBackend {
    state: Arc<Mutex<BackendState>>,
    latency: Duration,
}

impl InMemoryOrderBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every query and mutation by `latency` plus a small random jitter.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: Arc::default(),
            latency,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn delay(&self) -> Duration {
        if self.latency.is_zero() {
            return Duration::ZERO;
        }
        let jitter = rand::thread_rng().gen_range(0..=LATENCY_JITTER_MILLIS);
        self.latency + Duration::from_millis(jitter)
    }

    pub fn register_user(&self, token: impl Into<String>, viewer: Viewer) {
        self.lock().users.insert(token.into(), viewer);
    }

    pub fn insert_order(&self, order: OrderDTO) {
        self.lock().orders.insert(order.id, order);
    }

    pub fn order(&self, id: OrderId) -> Option<OrderDTO> {
        self.lock().orders.get(&id).cloned()
    }

    pub fn subscriber_count(&self, id: OrderId) -> usize {
        self.lock().subscribers.get(&id).map_or(0, HashMap::len)
    }

    /// Sends `data` as is to every subscriber of order `id`.
    pub fn push_raw(&self, id: OrderId, data: Value) {
        let mut state = self.lock();
        broadcast(&mut state, id, Ok(data));
    }

    /// Drops every subscription of order `id` with a transport failure.
    pub fn fail_subscriptions(&self, id: OrderId, reason: &str) {
        let mut state = self.lock();
        if let Some(subscribers) = state.subscribers.remove(&id) {
            for sender in subscribers.into_values() {
                let _ = sender.send(Err(reason.to_string()));
            }
        }
    }

    /// Updates an order as another party would (kitchen, driver) and
    /// publishes the result to subscribers.
    pub fn set_status(&self, id: OrderId, status: OrderStatus) {
        let mut state = self.lock();
        if let Some(order) = state.orders.get_mut(&id) {
            order.status = status;
            let order = order.clone();
            publish(&mut state, &order);
        }
    }

    pub fn connect(&self, auth: AuthContext) -> InMemoryGateway {
        InMemoryGateway {
            backend: self.clone(),
            auth,
        }
    }

    /// `query getOrder`
    pub fn get_order(&self, token: &str, input: GetOrderInput) -> Value {
        let state = self.lock();
        let output = match state.users.get(token) {
            None => get_order_failure("Invalid token"),
            Some(_) => match state.orders.get(&input.id) {
                None => get_order_failure("Order not found"),
                Some(order) => GetOrderOutput {
                    ok: true,
                    error: None,
                    order: Some(order.clone()),
                },
            },
        };
        json!({ "getOrder": output })
    }

    /// `mutation editOrder`
    pub fn edit_order(&self, token: &str, input: EditOrderInput) -> Value {
        let mut state = self.lock();
        let result = match state.users.get(token).cloned() {
            None => Err("Invalid token".to_string()),
            Some(viewer) => match state.orders.get_mut(&input.id) {
                None => Err("Order not found".to_string()),
                Some(order) => assigned_to_caller(order, &viewer)
                    .and_then(|()| {
                        validate_transition(order.status, input.status, viewer.role)
                            .map_err(|e| e.to_string())
                    })
                    .map(|next| {
                        order.status = next;
                        order.clone()
                    }),
            },
        };
        if let Ok(order) = &result {
            publish(&mut state, order);
        }
        json!({ "editOrder": mutation_output(result) })
    }

    /// `mutation takeOrder`
    pub fn take_order(&self, token: &str, input: TakeOrderInput) -> Value {
        let mut state = self.lock();
        let result = match state.users.get(token).cloned() {
            None => Err("Invalid token".to_string()),
            Some(viewer) => match state.orders.get_mut(&input.id) {
                None => Err("Order not found".to_string()),
                Some(order) => validate_take(order, viewer.role)
                    .map(|_| {
                        order.driver = Some(UserRefDTO {
                            id: viewer.id,
                            email: viewer.email.clone(),
                        });
                        order.clone()
                    })
                    .map_err(|e| e.to_string()),
            },
        };
        if let Ok(order) = &result {
            publish(&mut state, order);
        }
        json!({ "takeOrder": mutation_output(result) })
    }

    /// `subscription orderUpdates`
    fn subscribe(
        &self,
        token: &str,
        input: OrderUpdatesInput,
    ) -> Result<(Uuid, UnboundedReceiver<RawUpdate>), String> {
        let mut state = self.lock();
        if !state.users.contains_key(token) {
            return Err("Invalid token".to_string());
        }
        if !state.orders.contains_key(&input.id) {
            return Err("Order not found".to_string());
        }
        let (sender, receiver) = unbounded_channel();
        let subscription_id = Uuid::new_v4();
        state
            .subscribers
            .entry(input.id)
            .or_default()
            .insert(subscription_id, sender);
        Ok((subscription_id, receiver))
    }

    fn unsubscribe(&self, id: OrderId, subscription_id: Uuid) {
        let mut state = self.lock();
        if let Some(subscribers) = state.subscribers.get_mut(&id) {
            subscribers.remove(&subscription_id);
            if subscribers.is_empty() {
                state.subscribers.remove(&id);
            }
        }
    }
}

/// A driver may only advance an order no other driver has taken.
fn assigned_to_caller(order: &OrderDTO, viewer: &Viewer) -> Result<(), String> {
    match &order.driver {
        Some(driver) if viewer.role == UserRole::Delivery && driver.id != viewer.id => {
            Err("This order is assigned to another driver".to_string())
        }
        _ => Ok(()),
    }
}

fn get_order_failure(error: &str) -> GetOrderOutput {
    GetOrderOutput {
        ok: false,
        error: Some(error.to_string()),
        order: None,
    }
}

fn mutation_output(result: Result<OrderDTO, String>) -> MutationOutput {
    match result {
        Ok(_) => MutationOutput {
            ok: true,
            error: None,
        },
        Err(error) => MutationOutput {
            ok: false,
            error: Some(error),
        },
    }
}

fn publish(state: &mut BackendState, order: &OrderDTO) {
    let payload = OrderUpdatesPayload {
        order_updates: Some(order.clone()),
    };
    match serde_json::to_value(&payload) {
        Ok(data) => broadcast(state, order.id, Ok(data)),
        Err(e) => broadcast(state, order.id, Err(e.to_string())),
    }
}

fn broadcast(state: &mut BackendState, id: OrderId, item: RawUpdate) {
    if let Some(subscribers) = state.subscribers.get_mut(&id) {
        subscribers.retain(|_, sender| sender.send(item.clone()).is_ok());
    }
}

/// Client side of [`InMemoryOrderBackend`]: attaches the login token and
/// decodes the JSON documents.
#[derive(Clone)]
pub struct InMemoryGateway {
    backend: InMemoryOrderBackend,
    auth: AuthContext,
}

impl OrderGateway for InMemoryGateway {
    fn fetch_order(&self, id: OrderId) -> GatewayFuture<OrderDTO> {
        let token = self.auth.token();
        let backend = self.backend.clone();
        let delay = backend.delay();
        Box::pin(async move {
            let token = token?;
            tokio::time::sleep(delay).await;
            decode_get_order(backend.get_order(&token, GetOrderInput { id }), id)
        })
    }

    fn subscribe_order_updates(&self, id: OrderId) -> Result<OrderSubscription, GatewayError> {
        let token = self.auth.token()?;
        let (subscription_id, receiver) = self
            .backend
            .subscribe(&token, OrderUpdatesInput { id })
            .map_err(GatewayError::Remote)?;
        let backend = self.backend.clone();
        Ok(OrderSubscription {
            events: Box::pin(UnboundedReceiverStream::new(receiver).map(decode_live_update)),
            handle: SubscriptionHandle::new(move || backend.unsubscribe(id, subscription_id)),
        })
    }

    fn submit_status_transition(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> GatewayFuture<MutationOutcome> {
        let token = self.auth.token();
        let backend = self.backend.clone();
        let delay = backend.delay();
        Box::pin(async move {
            let token = token?;
            tokio::time::sleep(delay).await;
            let doc = backend.edit_order(&token, EditOrderInput { id, status });
            let response: EditOrderResponse = serde_json::from_value(doc)?;
            Ok(outcome(response.edit_order))
        })
    }

    fn take_order(&self, id: OrderId) -> GatewayFuture<MutationOutcome> {
        let token = self.auth.token();
        let backend = self.backend.clone();
        let delay = backend.delay();
        Box::pin(async move {
            let token = token?;
            tokio::time::sleep(delay).await;
            let doc = backend.take_order(&token, TakeOrderInput { id });
            let response: TakeOrderResponse = serde_json::from_value(doc)?;
            Ok(outcome(response.take_order))
        })
    }
}

fn outcome(output: MutationOutput) -> MutationOutcome {
    MutationOutcome {
        ok: output.ok,
        error: output.error,
    }
}

fn decode_get_order(doc: Value, id: OrderId) -> Result<OrderDTO, GatewayError> {
    let response: GetOrderResponse = serde_json::from_value(doc)?;
    let output = response.get_order;
    if !output.ok {
        return match output.error {
            Some(error) if error == "Order not found" => Err(GatewayError::NotFound(id)),
            Some(error) => Err(GatewayError::Remote(error)),
            None => Err(GatewayError::Remote("request refused".to_string())),
        };
    }
    let order = output
        .order
        .ok_or_else(|| GatewayError::Malformed("getOrder is ok but carries no order".into()))?;
    order.validate().map_err(GatewayError::Malformed)?;
    Ok(order)
}

fn decode_live_update(item: RawUpdate) -> LiveUpdate {
    let data = match item {
        Ok(data) => data,
        Err(reason) => return LiveUpdate::Failed(reason),
    };
    match serde_json::from_value::<OrderUpdatesPayload>(data) {
        Ok(payload) => match payload.order_updates {
            Some(order) => match order.validate() {
                Ok(()) => LiveUpdate::Event(Some(order)),
                Err(reason) => LiveUpdate::Failed(format!("malformed payload: {}", reason)),
            },
            None => LiveUpdate::Event(None),
        },
        Err(e) => LiveUpdate::Failed(format!("malformed payload: {}", e)),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[actix_rt::test]
    async fn fetch_decodes_the_get_order_document() {
        let backend = backend_with(OrderStatus::Pending);
        let gateway = backend.connect(logged_in(UserRole::Client));
        let order = gateway.fetch_order(ORDER_ID).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            gateway.fetch_order(7).await,
            Err(GatewayError::NotFound(7))
        );
    }

    #[actix_rt::test]
    async fn requests_without_login_are_refused() {
        let backend = backend_with(OrderStatus::Pending);
        let gateway = backend.connect(AuthContext::new());
        assert_eq!(
            gateway.fetch_order(ORDER_ID).await,
            Err(GatewayError::Unauthenticated)
        );
        assert!(matches!(
            gateway.subscribe_order_updates(ORDER_ID),
            Err(GatewayError::Unauthenticated)
        ));
    }

    #[actix_rt::test]
    async fn logout_takes_effect_on_later_requests() {
        let backend = backend_with(OrderStatus::Pending);
        let auth = logged_in(UserRole::Owner);
        let gateway = backend.connect(auth.clone());
        assert!(gateway.fetch_order(ORDER_ID).await.is_ok());
        auth.logout();
        assert_eq!(
            gateway.fetch_order(ORDER_ID).await,
            Err(GatewayError::Unauthenticated)
        );
    }

    #[actix_rt::test]
    async fn edit_order_enforces_the_status_machine_server_side() {
        let backend = backend_with(OrderStatus::Pending);
        let owner = backend.connect(logged_in(UserRole::Owner));
        let skipped = owner
            .submit_status_transition(ORDER_ID, OrderStatus::Delivered)
            .await
            .unwrap();
        assert!(!skipped.ok);
        assert!(skipped.error.is_some());
        assert_eq!(backend.order(ORDER_ID).unwrap().status, OrderStatus::Pending);

        let accepted = owner
            .submit_status_transition(ORDER_ID, OrderStatus::Cooking)
            .await
            .unwrap();
        assert_eq!(accepted, MutationOutcome::accepted());
        assert_eq!(backend.order(ORDER_ID).unwrap().status, OrderStatus::Cooking);
    }

    #[actix_rt::test]
    async fn only_the_assigned_driver_advances_a_taken_order() {
        let backend = backend_with(OrderStatus::Cooked);
        let driver = backend.connect(logged_in(UserRole::Delivery));
        assert!(driver.take_order(ORDER_ID).await.unwrap().ok);

        let other = Viewer {
            id: 9,
            email: "other@food.dev".to_string(),
            role: UserRole::Delivery,
        };
        backend.register_user("jwt-other-driver", other);
        let refused = backend.edit_order(
            "jwt-other-driver",
            EditOrderInput {
                id: ORDER_ID,
                status: OrderStatus::PickedUp,
            },
        );
        assert_eq!(refused["editOrder"]["ok"], json!(false));
        assert_eq!(backend.order(ORDER_ID).unwrap().status, OrderStatus::Cooked);

        let accepted = driver
            .submit_status_transition(ORDER_ID, OrderStatus::PickedUp)
            .await
            .unwrap();
        assert_eq!(accepted, MutationOutcome::accepted());
        assert_eq!(backend.order(ORDER_ID).unwrap().status, OrderStatus::PickedUp);
    }

    #[actix_rt::test]
    async fn subscribers_receive_full_order_on_every_change() {
        let backend = backend_with(OrderStatus::Cooked);
        let driver = backend.connect(logged_in(UserRole::Delivery));
        let mut subscription = driver.subscribe_order_updates(ORDER_ID).unwrap();
        assert_eq!(backend.subscriber_count(ORDER_ID), 1);

        let taken = driver.take_order(ORDER_ID).await.unwrap();
        assert!(taken.ok);
        match subscription.events.next().await {
            Some(LiveUpdate::Event(Some(order))) => {
                assert_eq!(order.driver.unwrap().email, "driver@food.dev");
                assert_eq!(order.status, OrderStatus::Cooked);
            }
            other => panic!("unexpected item {:?}", other),
        }

        let again = driver.take_order(ORDER_ID).await.unwrap();
        assert!(!again.ok);
    }

    #[actix_rt::test]
    async fn closing_the_handle_unsubscribes_and_ends_the_stream() {
        let backend = backend_with(OrderStatus::Pending);
        let gateway = backend.connect(logged_in(UserRole::Client));
        let mut subscription = gateway.subscribe_order_updates(ORDER_ID).unwrap();
        subscription.handle.close();
        subscription.handle.close();
        assert_eq!(backend.subscriber_count(ORDER_ID), 0);
        assert_eq!(subscription.events.next().await, None);
    }

    #[actix_rt::test]
    async fn empty_and_failed_payloads_are_decoded() {
        let backend = backend_with(OrderStatus::Pending);
        let gateway = backend.connect(logged_in(UserRole::Client));
        let mut subscription = gateway.subscribe_order_updates(ORDER_ID).unwrap();

        backend.push_raw(ORDER_ID, json!({ "orderUpdates": null }));
        assert_eq!(
            subscription.events.next().await,
            Some(LiveUpdate::Event(None))
        );

        backend.fail_subscriptions(ORDER_ID, "socket closed");
        assert_eq!(
            subscription.events.next().await,
            Some(LiveUpdate::Failed("socket closed".to_string()))
        );
        assert_eq!(subscription.events.next().await, None);
    }

    #[actix_rt::test]
    async fn negative_total_is_malformed() {
        let backend = backend_with(OrderStatus::Pending);
        let mut broken = order(OrderStatus::Pending);
        broken.total = Some(-5.0);
        backend.insert_order(broken);
        let gateway = backend.connect(logged_in(UserRole::Client));
        assert!(matches!(
            gateway.fetch_order(ORDER_ID).await,
            Err(GatewayError::Malformed(_))
        ));
    }
}
