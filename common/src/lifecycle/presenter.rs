use crate::constants::{NO_DRIVER_LABEL, NO_RESTAURANT_LABEL};
use crate::lifecycle::status_machine::{can_take_order, next_allowed_status};
use crate::types::dtos::{OrderDTO, OrderId};
use crate::types::order_status::OrderStatus;
use crate::types::user_role::UserRole;
use crate::utils::format_total;

/// What the order page shows for one snapshot and one viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPresentation {
    pub order_id: OrderId,
    pub progress_label: String,
    pub driver_label: String,
    pub restaurant_label: String,
    pub total_label: String,
    /// Statuses the viewer may move the order to. At most one today.
    pub available_actions: Vec<OrderStatus>,
    /// The viewer is a driver and may take this order.
    pub can_take: bool,
    pub is_finished: bool,
}

/// Derives the presentation of `order` for `role`. Pure, recomputed on every
/// snapshot change.
pub fn present(order: &OrderDTO, role: UserRole) -> OrderPresentation {
    OrderPresentation {
        order_id: order.id,
        progress_label: progress_label(order.status, role).to_string(),
        driver_label: order
            .driver
            .as_ref()
            .map(|d| d.email.clone())
            .unwrap_or_else(|| NO_DRIVER_LABEL.to_string()),
        restaurant_label: order
            .restaurant
            .as_ref()
            .map(|r| r.name.clone())
            .unwrap_or_else(|| NO_RESTAURANT_LABEL.to_string()),
        total_label: format_total(order.total),
        available_actions: next_allowed_status(order.status, role).into_iter().collect(),
        can_take: can_take_order(order, role),
        is_finished: order.status.is_terminal(),
    }
}

/// Human readable progress of an order, worded for the viewer's role.
pub fn progress_label(status: OrderStatus, role: UserRole) -> &'static str {
    match (role, status) {
        (UserRole::Client, OrderStatus::Pending) => "Waiting for the restaurant to accept",
        (UserRole::Client, OrderStatus::Cooking) => "Cooking",
        (UserRole::Client, OrderStatus::Cooked) => "Cooked, waiting for a driver",
        (UserRole::Client, OrderStatus::PickedUp) => "Picked up, on the way to you",

        (UserRole::Owner, OrderStatus::Pending) => "New order, waiting for your approval",
        (UserRole::Owner, OrderStatus::Cooking) => "Cooking in your kitchen",
        (UserRole::Owner, OrderStatus::Cooked) => "Cooked, waiting for pickup",
        (UserRole::Owner, OrderStatus::PickedUp) => "Picked up by the driver",

        (UserRole::Delivery, OrderStatus::Pending) => "Waiting for the restaurant",
        (UserRole::Delivery, OrderStatus::Cooking) => "Being cooked",
        (UserRole::Delivery, OrderStatus::Cooked) => "Ready for pickup",
        (UserRole::Delivery, OrderStatus::PickedUp) => "On the way to the customer",

        (_, OrderStatus::Delivered) => "Delivered. Thank you for ordering!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dtos::fixtures::{driver, order};

    #[test]
    fn owner_sees_cooking_action_on_pending_order() {
        let view = present(&order(1, OrderStatus::Pending), UserRole::Owner);
        assert_eq!(view.available_actions, vec![OrderStatus::Cooking]);
        assert_eq!(view.driver_label, NO_DRIVER_LABEL);
        assert!(!view.can_take);
        assert!(!view.is_finished);
    }

    #[test]
    fn driver_and_client_on_cooked_order() {
        let cooked = order(1, OrderStatus::Cooked);
        let driver_view = present(&cooked, UserRole::Delivery);
        assert_eq!(driver_view.available_actions, vec![OrderStatus::PickedUp]);
        assert!(driver_view.can_take);

        let client_view = present(&cooked, UserRole::Client);
        assert!(client_view.available_actions.is_empty());
        assert!(!client_view.can_take);
    }

    #[test]
    fn labels_are_worded_per_role() {
        for status in OrderStatus::SEQUENCE {
            let labels: Vec<_> = UserRole::ALL
                .into_iter()
                .map(|role| progress_label(status, role))
                .collect();
            assert!(labels.iter().all(|l| !l.is_empty()));
        }
        assert_ne!(
            progress_label(OrderStatus::Pending, UserRole::Owner),
            progress_label(OrderStatus::Pending, UserRole::Client)
        );
    }

    #[test]
    fn assigned_driver_and_delivered_order() {
        let mut delivered = order(9, OrderStatus::Delivered);
        delivered.driver = Some(driver());
        delivered.total = None;
        let view = present(&delivered, UserRole::Client);
        assert_eq!(view.driver_label, "driver@food.dev");
        assert_eq!(view.total_label, "0 ₩");
        assert_eq!(view.restaurant_label, "Kimbap House");
        assert!(view.is_finished);
        assert!(view.available_actions.is_empty());
    }
}
