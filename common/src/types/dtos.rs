use crate::types::order_status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type OrderId = u64;

/// Reference to a user account (customer or driver).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRefDTO {
    pub id: u64,
    pub email: String,
}

/// Reference to the restaurant that cooks the order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestaurantRefDTO {
    pub id: u64,
    pub name: String,
}

/// Full state of one order, as carried by `getOrder` and `orderUpdates`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDTO {
    /// Order ID.
    pub id: OrderId,
    /// Current status of the order.
    pub status: OrderStatus,
    /// Total a pagar, puede faltar.
    pub total: Option<f64>,
    /// Customer who placed the order.
    pub customer: Option<UserRefDTO>,
    /// Assigned driver. Absent until a driver takes the order.
    pub driver: Option<UserRefDTO>,
    /// Restaurant preparing the order.
    pub restaurant: Option<RestaurantRefDTO>,
    pub created_at: DateTime<Utc>,
}

impl OrderDTO {
    /// Checks the field constraints that the type system cannot express.
    pub fn validate(&self) -> Result<(), String> {
        match self.total {
            Some(total) if total.is_nan() || total < 0.0 => Err(format!(
                "order {} carries an invalid total {}",
                self.id, total
            )),
            _ => Ok(()),
        }
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }
}
