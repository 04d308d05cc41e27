use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    #[serde(rename = "Half-Paid")]
    HalfPaid,
    #[default]
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::HalfPaid => "Half-Paid",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Paid" => Ok(PaymentStatus::Paid),
            "Half-Paid" => Ok(PaymentStatus::HalfPaid),
            "Unpaid" => Ok(PaymentStatus::Unpaid),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub manager_id: Uuid,
    pub assigned_to: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        customer_name: String,
        total_amount: f64,
        payment_status: PaymentStatus,
        manager_id: Uuid,
        assigned_to: Uuid,
    ) -> Self {
        let now = Utc::now();
        // Timestamp alone collides for orders created in the same millisecond;
        // a random suffix keeps the unique constraint from rejecting them.
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: Uuid::new_v4(),
            order_number: format!("ORD-{}-{}", now.timestamp_millis(), &suffix[..6]),
            customer_name,
            total_amount,
            status: OrderStatus::Pending,
            payment_status,
            manager_id,
            assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only the assigned staff member or the order's manager may report a
    /// status change on the order.
    pub fn can_update_status(&self, user_id: Uuid) -> bool {
        self.assigned_to == user_id || self.manager_id == user_id
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_is_pending() {
        let order = Order::new(
            "Acme Corp".to_string(),
            199.99,
            PaymentStatus::Unpaid,
            Uuid::new_v4(),
            Uuid::new_v4(),
        );

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_number.starts_with("ORD-"));
    }

    #[test]
    fn test_order_numbers_do_not_collide_within_a_millisecond() {
        let manager_id = Uuid::new_v4();
        let staff_id = Uuid::new_v4();

        let a = Order::new("Acme".to_string(), 10.0, PaymentStatus::Unpaid, manager_id, staff_id);
        let b = Order::new("Acme".to_string(), 10.0, PaymentStatus::Unpaid, manager_id, staff_id);

        assert_ne!(a.order_number, b.order_number);
    }

    #[test]
    fn test_can_update_status() {
        let manager_id = Uuid::new_v4();
        let staff_id = Uuid::new_v4();
        let order = Order::new(
            "Acme Corp".to_string(),
            50.0,
            PaymentStatus::Paid,
            manager_id,
            staff_id,
        );

        assert!(order.can_update_status(manager_id));
        assert!(order.can_update_status(staff_id));
        assert!(!order.can_update_status(Uuid::new_v4()));
    }
}
