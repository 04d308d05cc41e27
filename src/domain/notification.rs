use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of notification categories. The wire representation is the
/// snake_case string stored in the database and exchanged with clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    OrderStatusChange,
    OrderAssigned,
    OrderCreated,
    OrderCompleted,
    LowStockAlert,
    StockReplenishmentNeeded,
    ProductOutOfStock,
    TaskAssigned,
    TaskCompleted,
    TaskOverdue,
    PurchaseOrderCreated,
    PurchaseOrderApproved,
    PurchaseOrderReceived,
    UserAccountCreated,
    UserRoleChanged,
    SystemMaintenance,
    SecurityAlert,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::OrderStatusChange => "order_status_change",
            NotificationType::OrderAssigned => "order_assigned",
            NotificationType::OrderCreated => "order_created",
            NotificationType::OrderCompleted => "order_completed",
            NotificationType::LowStockAlert => "low_stock_alert",
            NotificationType::StockReplenishmentNeeded => "stock_replenishment_needed",
            NotificationType::ProductOutOfStock => "product_out_of_stock",
            NotificationType::TaskAssigned => "task_assigned",
            NotificationType::TaskCompleted => "task_completed",
            NotificationType::TaskOverdue => "task_overdue",
            NotificationType::PurchaseOrderCreated => "purchase_order_created",
            NotificationType::PurchaseOrderApproved => "purchase_order_approved",
            NotificationType::PurchaseOrderReceived => "purchase_order_received",
            NotificationType::UserAccountCreated => "user_account_created",
            NotificationType::UserRoleChanged => "user_role_changed",
            NotificationType::SystemMaintenance => "system_maintenance",
            NotificationType::SecurityAlert => "security_alert",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order_status_change" => Ok(NotificationType::OrderStatusChange),
            "order_assigned" => Ok(NotificationType::OrderAssigned),
            "order_created" => Ok(NotificationType::OrderCreated),
            "order_completed" => Ok(NotificationType::OrderCompleted),
            "low_stock_alert" => Ok(NotificationType::LowStockAlert),
            "stock_replenishment_needed" => Ok(NotificationType::StockReplenishmentNeeded),
            "product_out_of_stock" => Ok(NotificationType::ProductOutOfStock),
            "task_assigned" => Ok(NotificationType::TaskAssigned),
            "task_completed" => Ok(NotificationType::TaskCompleted),
            "task_overdue" => Ok(NotificationType::TaskOverdue),
            "purchase_order_created" => Ok(NotificationType::PurchaseOrderCreated),
            "purchase_order_approved" => Ok(NotificationType::PurchaseOrderApproved),
            "purchase_order_received" => Ok(NotificationType::PurchaseOrderReceived),
            "user_account_created" => Ok(NotificationType::UserAccountCreated),
            "user_role_changed" => Ok(NotificationType::UserRoleChanged),
            "system_maintenance" => Ok(NotificationType::SystemMaintenance),
            "security_alert" => Ok(NotificationType::SecurityAlert),
            other => Err(format!("unknown notification type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Order,
    Product,
    PurchaseOrder,
    User,
    Task,
}

/// Tagged reference attached to a notification for client-side linking.
/// The service never dereferences it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Uuid,
    pub notification_type: NotificationType,
    pub content: String,
    pub severity: Severity,
    pub related_entity: Option<RelatedEntity>,
    pub metadata: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: Uuid,
        notification_type: NotificationType,
        content: String,
        severity: Severity,
        related_entity: Option<RelatedEntity>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            notification_type,
            content,
            severity,
            related_entity,
            metadata,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_starts_unread() {
        let notification = Notification::new(
            Uuid::new_v4(),
            NotificationType::LowStockAlert,
            "Laptop inventory below 10 units".to_string(),
            Severity::High,
            None,
            serde_json::json!({}),
        );

        assert!(!notification.is_read);
        assert_eq!(notification.severity, Severity::High);
    }

    #[test]
    fn test_severity_defaults_to_low() {
        assert_eq!(Severity::default(), Severity::Low);
    }

    #[test]
    fn test_notification_type_wire_strings() {
        assert_eq!(NotificationType::OrderStatusChange.as_str(), "order_status_change");
        assert_eq!(
            "purchase_order_created".parse::<NotificationType>().unwrap(),
            NotificationType::PurchaseOrderCreated
        );
        assert!("not_a_type".parse::<NotificationType>().is_err());
    }
}
