use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub reorder_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, sku: String, quantity: i32, reorder_level: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            sku,
            quantity,
            reorder_level,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a stock delta, never going below zero. Saturates on overflow
    /// since the delta is caller-supplied.
    pub fn adjust_quantity(&mut self, delta: i32) {
        self.quantity = self.quantity.saturating_add(delta).max(0);
        self.updated_at = Utc::now();
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity > 0 && self.quantity <= self.reorder_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_quantity_saturates_at_zero() {
        let mut product = Product::new("Laptop".to_string(), "SKU-1".to_string(), 3, 10);

        product.adjust_quantity(-5);

        assert_eq!(product.quantity, 0);
        assert!(product.is_out_of_stock());
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_adjust_quantity_saturates_on_huge_delta() {
        let mut product = Product::new("Laptop".to_string(), "SKU-1".to_string(), 1, 10);

        product.adjust_quantity(i32::MAX);

        assert_eq!(product.quantity, i32::MAX);
        assert!(!product.is_out_of_stock());

        product.adjust_quantity(i32::MIN);
        assert_eq!(product.quantity, 0);
    }

    #[test]
    fn test_low_stock_threshold() {
        let mut product = Product::new("Laptop".to_string(), "SKU-1".to_string(), 20, 10);
        assert!(!product.is_low_stock());

        product.adjust_quantity(-10);
        assert!(product.is_low_stock());
    }
}
