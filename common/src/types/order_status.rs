use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of an order. The sequence is linear and `Delivered` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    Pending,   // Placed by the client, waiting for the restaurant
    Cooking,   // Accepted by the restaurant
    Cooked,    // Ready to be picked up
    PickedUp,  // In the hands of the driver
    Delivered, // Handed to the client
}

impl OrderStatus {
    /// Every status in lifecycle order.
    pub const SEQUENCE: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Cooking,
        OrderStatus::Cooked,
        OrderStatus::PickedUp,
        OrderStatus::Delivered,
    ];

    /// Position of the status inside [`OrderStatus::SEQUENCE`].
    pub fn rank(self) -> usize {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Cooking => 1,
            OrderStatus::Cooked => 2,
            OrderStatus::PickedUp => 3,
            OrderStatus::Delivered => 4,
        }
    }

    /// The status that immediately follows this one, if any.
    pub fn successor(self) -> Option<OrderStatus> {
        Self::SEQUENCE.get(self.rank() + 1).copied()
    }

    /// Returns `true` when `self` comes strictly before `other`.
    pub fn precedes(self, other: OrderStatus) -> bool {
        self.rank() < other.rank()
    }

    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Delivered
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Cooking => write!(f, "Cooking"),
            OrderStatus::Cooked => write!(f, "Cooked"),
            OrderStatus::PickedUp => write!(f, "PickedUp"),
            OrderStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SEQUENCE
            .into_iter()
            .find(|status| status.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown order status '{}'", s))
    }
}
