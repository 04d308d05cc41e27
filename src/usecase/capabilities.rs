//! Role capability tables, built once and consulted everywhere a handler or
//! usecase needs to scope data by the caller's role.

use crate::domain::notification::NotificationType;

/// What a role is allowed to see out of some set of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility<T: 'static> {
    All,
    Only(&'static [T]),
    None,
}

const MANAGER_NOTIFICATION_TYPES: &[NotificationType] = &[
    NotificationType::OrderStatusChange,
    NotificationType::LowStockAlert,
    NotificationType::StockReplenishmentNeeded,
    NotificationType::PurchaseOrderCreated,
];

const STAFF_NOTIFICATION_TYPES: &[NotificationType] = &[
    NotificationType::TaskAssigned,
    NotificationType::TaskCompleted,
    NotificationType::OrderAssigned,
];

/// View-layer allow-list of notification types per role. This is advisory
/// display policy, not an access-control boundary: the caller's notifications
/// are fetched in full and narrowed afterwards.
pub fn visible_notification_types(role: &str) -> Visibility<NotificationType> {
    match role {
        "admin" => Visibility::All,
        "manager" => Visibility::Only(MANAGER_NOTIFICATION_TYPES),
        "staff" => Visibility::Only(STAFF_NOTIFICATION_TYPES),
        _ => Visibility::None,
    }
}

const NON_ADMIN_VISIBLE_ROLES: &[&str] = &["staff", "manager"];

/// Which user roles a caller may list from the user directory.
pub fn visible_user_roles(role: &str) -> Visibility<&'static str> {
    match role {
        "admin" => Visibility::All,
        "manager" | "staff" => Visibility::Only(NON_ADMIN_VISIBLE_ROLES),
        _ => Visibility::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_sees_all_notification_types() {
        assert_eq!(visible_notification_types("admin"), Visibility::All);
    }

    #[test]
    fn test_manager_allow_list() {
        match visible_notification_types("manager") {
            Visibility::Only(types) => {
                assert!(types.contains(&NotificationType::LowStockAlert));
                assert!(types.contains(&NotificationType::OrderStatusChange));
                assert!(!types.contains(&NotificationType::TaskAssigned));
            }
            other => panic!("expected allow-list, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_role_sees_nothing() {
        assert_eq!(visible_notification_types("auditor"), Visibility::None);
        assert_eq!(visible_user_roles("auditor"), Visibility::None);
    }

    #[test]
    fn test_staff_cannot_list_admins() {
        match visible_user_roles("staff") {
            Visibility::Only(roles) => assert!(!roles.contains(&"admin")),
            other => panic!("expected allow-list, got {:?}", other),
        }
    }
}
