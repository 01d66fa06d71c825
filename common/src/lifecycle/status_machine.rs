use crate::errors::TransitionError;
use crate::types::dtos::OrderDTO;
use crate::types::order_status::OrderStatus;
use crate::types::user_role::UserRole;

/// Returns the only status `role` may move an order in `current` to, if any.
///
/// Owners cook (`Pending → Cooking → Cooked`), drivers deliver
/// (`Cooked → PickedUp → Delivered`), clients only watch.
pub fn next_allowed_status(current: OrderStatus, role: UserRole) -> Option<OrderStatus> {
    match (role, current) {
        (UserRole::Owner, OrderStatus::Pending) => Some(OrderStatus::Cooking),
        (UserRole::Owner, OrderStatus::Cooking) => Some(OrderStatus::Cooked),
        (UserRole::Delivery, OrderStatus::Cooked) => Some(OrderStatus::PickedUp),
        (UserRole::Delivery, OrderStatus::PickedUp) => Some(OrderStatus::Delivered),
        _ => None,
    }
}

/// Checks a requested transition. Anything other than the single allowed
/// next step is refused, including skips like `Pending → Delivered`.
pub fn validate_transition(
    current: OrderStatus,
    target: OrderStatus,
    role: UserRole,
) -> Result<OrderStatus, TransitionError> {
    if current.is_terminal() {
        return Err(TransitionError::Terminal(current));
    }
    match next_allowed_status(current, role) {
        Some(next) if next == target => Ok(next),
        _ => Err(TransitionError::NotPermitted {
            role,
            from: current,
            to: target,
        }),
    }
}

/// A driver may take a cooked order nobody has taken yet.
pub fn can_take_order(order: &OrderDTO, role: UserRole) -> bool {
    role == UserRole::Delivery && order.status == OrderStatus::Cooked && !order.has_driver()
}

pub fn validate_take(order: &OrderDTO, role: UserRole) -> Result<(), TransitionError> {
    if can_take_order(order, role) {
        Ok(())
    } else {
        Err(TransitionError::TakeNotPermitted {
            role,
            status: order.status,
            has_driver: order.has_driver(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dtos::fixtures::{driver, order};

    const LEGAL: [(UserRole, OrderStatus, OrderStatus); 4] = [
        (UserRole::Owner, OrderStatus::Pending, OrderStatus::Cooking),
        (UserRole::Owner, OrderStatus::Cooking, OrderStatus::Cooked),
        (UserRole::Delivery, OrderStatus::Cooked, OrderStatus::PickedUp),
        (UserRole::Delivery, OrderStatus::PickedUp, OrderStatus::Delivered),
    ];

    #[test]
    fn only_the_legal_pairs_have_a_next_status() {
        for role in UserRole::ALL {
            for status in OrderStatus::SEQUENCE {
                let expected = LEGAL
                    .iter()
                    .find(|(r, from, _)| *r == role && *from == status)
                    .map(|(_, _, to)| *to);
                assert_eq!(
                    next_allowed_status(status, role),
                    expected,
                    "{} at {}",
                    role,
                    status
                );
            }
        }
    }

    #[test]
    fn allowed_step_is_always_the_immediate_successor() {
        for (role, from, to) in LEGAL {
            assert_eq!(from.successor(), Some(to));
            assert_eq!(validate_transition(from, to, role), Ok(to));
        }
    }

    #[test]
    fn client_can_never_advance() {
        for status in OrderStatus::SEQUENCE {
            assert_eq!(next_allowed_status(status, UserRole::Client), None);
        }
    }

    #[test]
    fn skipping_ahead_is_rejected() {
        assert_eq!(
            validate_transition(OrderStatus::Pending, OrderStatus::Delivered, UserRole::Owner),
            Err(TransitionError::NotPermitted {
                role: UserRole::Owner,
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            })
        );
        assert!(
            validate_transition(OrderStatus::Cooked, OrderStatus::Delivered, UserRole::Delivery)
                .is_err()
        );
    }

    #[test]
    fn moving_backwards_or_staying_is_rejected() {
        assert!(
            validate_transition(OrderStatus::Cooking, OrderStatus::Pending, UserRole::Owner)
                .is_err()
        );
        assert!(
            validate_transition(OrderStatus::Cooking, OrderStatus::Cooking, UserRole::Owner)
                .is_err()
        );
    }

    #[test]
    fn delivered_is_terminal_for_everyone() {
        for role in UserRole::ALL {
            for target in OrderStatus::SEQUENCE {
                assert_eq!(
                    validate_transition(OrderStatus::Delivered, target, role),
                    Err(TransitionError::Terminal(OrderStatus::Delivered))
                );
            }
        }
    }

    #[test]
    fn wrong_role_cannot_do_the_other_roles_step() {
        assert!(
            validate_transition(OrderStatus::Cooked, OrderStatus::PickedUp, UserRole::Owner)
                .is_err()
        );
        assert!(
            validate_transition(OrderStatus::Pending, OrderStatus::Cooking, UserRole::Delivery)
                .is_err()
        );
    }

    #[test]
    fn only_drivers_take_cooked_orders_without_driver() {
        let cooked = order(1, OrderStatus::Cooked);
        assert!(can_take_order(&cooked, UserRole::Delivery));
        assert!(!can_take_order(&cooked, UserRole::Owner));
        assert!(!can_take_order(&order(1, OrderStatus::Cooking), UserRole::Delivery));

        let mut taken = cooked.clone();
        taken.driver = Some(driver());
        assert_eq!(
            validate_take(&taken, UserRole::Delivery),
            Err(TransitionError::TakeNotPermitted {
                role: UserRole::Delivery,
                status: OrderStatus::Cooked,
                has_driver: true,
            })
        );
    }
}
