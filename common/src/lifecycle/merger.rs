use crate::types::dtos::{OrderDTO, OrderId};
use crate::types::order_status::OrderStatus;

/// Outcome of comparing an inbound live-update event with the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDecision {
    /// The event is the new authoritative state.
    Replace,
    /// The transport delivered no order.
    KeepEmpty,
    /// The event would move the status backwards.
    KeepRegression { from: OrderStatus, to: OrderStatus },
    /// The event would unassign the driver.
    KeepDriverRemoved,
    /// The event belongs to another order.
    KeepForeign { expected: OrderId, received: OrderId },
}

impl MergeDecision {
    pub fn replaces(&self) -> bool {
        matches!(self, MergeDecision::Replace)
    }
}

/// Decides whether `incoming` replaces `previous`.
pub fn decide(previous: &OrderDTO, incoming: Option<&OrderDTO>) -> MergeDecision {
    let Some(incoming) = incoming else {
        return MergeDecision::KeepEmpty;
    };
    if incoming.id != previous.id {
        return MergeDecision::KeepForeign {
            expected: previous.id,
            received: incoming.id,
        };
    }
    if incoming.status.precedes(previous.status) {
        return MergeDecision::KeepRegression {
            from: previous.status,
            to: incoming.status,
        };
    }
    if previous.has_driver() && !incoming.has_driver() {
        return MergeDecision::KeepDriverRemoved;
    }
    MergeDecision::Replace
}

/// Applies one live-update event to the snapshot. Events carry the full
/// order, so an accepted event replaces every field.
pub fn merge(previous: &OrderDTO, incoming: Option<&OrderDTO>) -> OrderDTO {
    match (decide(previous, incoming), incoming) {
        (MergeDecision::Replace, Some(incoming)) => incoming.clone(),
        _ => previous.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dtos::fixtures::{driver, order};

    fn all_orders() -> Vec<OrderDTO> {
        let mut orders = Vec::new();
        for status in OrderStatus::SEQUENCE {
            let plain = order(1, status);
            let mut with_driver = plain.clone();
            with_driver.driver = Some(driver());
            orders.push(plain);
            orders.push(with_driver);
        }
        orders
    }

    #[test]
    fn merging_the_same_event_twice_is_idempotent() {
        for snapshot in all_orders() {
            for event in all_orders() {
                let once = merge(&snapshot, Some(&event));
                let twice = merge(&once, Some(&event));
                assert_eq!(once, twice, "{:?} <- {:?}", snapshot.status, event.status);
            }
        }
    }

    #[test]
    fn status_never_moves_backwards() {
        for snapshot in all_orders() {
            for event in all_orders() {
                if event.status.precedes(snapshot.status) {
                    assert_eq!(merge(&snapshot, Some(&event)), snapshot);
                }
            }
        }
    }

    #[test]
    fn empty_event_keeps_snapshot() {
        let snapshot = order(1, OrderStatus::Cooking);
        assert_eq!(decide(&snapshot, None), MergeDecision::KeepEmpty);
        assert_eq!(merge(&snapshot, None), snapshot);
    }

    #[test]
    fn event_replaces_every_field() {
        let snapshot = order(1, OrderStatus::Pending);
        let mut event = order(1, OrderStatus::Cooking);
        event.total = Some(9900.0);
        event.restaurant = None;
        assert_eq!(merge(&snapshot, Some(&event)), event);
    }

    #[test]
    fn late_cooking_event_after_cooked_is_discarded() {
        let snapshot = order(1, OrderStatus::Cooked);
        let late = order(1, OrderStatus::Cooking);
        assert_eq!(
            decide(&snapshot, Some(&late)),
            MergeDecision::KeepRegression {
                from: OrderStatus::Cooked,
                to: OrderStatus::Cooking,
            }
        );
        assert_eq!(merge(&snapshot, Some(&late)).status, OrderStatus::Cooked);
    }

    #[test]
    fn same_status_with_new_driver_is_accepted() {
        let snapshot = order(1, OrderStatus::Cooked);
        let mut taken = snapshot.clone();
        taken.driver = Some(driver());
        assert!(decide(&snapshot, Some(&taken)).replaces());
        assert!(merge(&snapshot, Some(&taken)).has_driver());
    }

    #[test]
    fn driver_is_never_unassigned() {
        let mut snapshot = order(1, OrderStatus::PickedUp);
        snapshot.driver = Some(driver());
        let event = order(1, OrderStatus::Delivered);
        assert_eq!(decide(&snapshot, Some(&event)), MergeDecision::KeepDriverRemoved);
        assert_eq!(merge(&snapshot, Some(&event)), snapshot);
    }

    #[test]
    fn events_for_other_orders_are_ignored() {
        let snapshot = order(1, OrderStatus::Pending);
        let other = order(2, OrderStatus::Cooking);
        assert_eq!(
            decide(&snapshot, Some(&other)),
            MergeDecision::KeepForeign {
                expected: 1,
                received: 2,
            }
        );
        assert_eq!(merge(&snapshot, Some(&other)), snapshot);
    }
}
