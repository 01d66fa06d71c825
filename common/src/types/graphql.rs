//! Document shapes of the GraphQL operations the client consumes.
//!
//! Field names follow the schema, so `serde_json` documents produced by the
//! API decode straight into these types.

use crate::types::dtos::{OrderDTO, OrderId};
use crate::types::order_status::OrderStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetOrderInput {
    pub id: OrderId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditOrderInput {
    pub id: OrderId,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TakeOrderInput {
    pub id: OrderId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderUpdatesInput {
    pub id: OrderId,
}

/// `getOrder(input) { ok error order { ...FullOrderParts } }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetOrderOutput {
    pub ok: bool,
    pub error: Option<String>,
    pub order: Option<OrderDTO>,
}

/// Output shared by `editOrder` and `takeOrder`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationOutput {
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetOrderResponse {
    pub get_order: GetOrderOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditOrderResponse {
    pub edit_order: MutationOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TakeOrderResponse {
    pub take_order: MutationOutput,
}

/// Payload of one `orderUpdates` subscription event. The transport may
/// deliver it with no order at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdatesPayload {
    #[serde(default)]
    pub order_updates: Option<OrderDTO>,
}
