use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus, PaymentStatus};
use crate::usecase::contracts::OrderRepository;
use crate::usecase::error::UsecaseError;

pub struct OrdersUseCase<O>
where
    O: OrderRepository,
{
    order_repository: O,
}

impl<O> OrdersUseCase<O>
where
    O: OrderRepository,
{
    pub fn new(order_repository: O) -> Self {
        Self { order_repository }
    }

    #[tracing::instrument(skip(self, customer_name), fields(manager_id = %manager_id, assigned_to = %assigned_to))]
    pub async fn create_order(
        &self,
        customer_name: String,
        total_amount: f64,
        payment_status: PaymentStatus,
        manager_id: Uuid,
        assigned_to: Uuid,
    ) -> Result<Order, UsecaseError> {
        tracing::debug!("creating order");

        if customer_name.trim().is_empty() {
            return Err(UsecaseError::Validation(
                "Customer name is required".to_string(),
            ));
        }
        if !total_amount.is_finite() || total_amount < 0.0 {
            return Err(UsecaseError::Validation(
                "Total amount must be a valid non-negative number".to_string(),
            ));
        }

        let order = Order::new(customer_name, total_amount, payment_status, manager_id, assigned_to);
        self.order_repository.create(&order).await?;

        tracing::info!(order_id = %order.id, order_number = %order.order_number, "order created");
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, UsecaseError> {
        tracing::debug!("listing orders");

        let orders = self.order_repository.find_all().await?;

        tracing::debug!(count = orders.len(), "retrieved orders");
        Ok(orders)
    }

    /// Staff may only list their own assigned orders; managers and admins may
    /// list anyone's.
    #[tracing::instrument(skip(self), fields(requester_id = %requester_id, %requester_role, staff_id = %staff_id))]
    pub async fn list_staff_orders(
        &self,
        requester_id: Uuid,
        requester_role: &str,
        staff_id: Uuid,
    ) -> Result<Vec<Order>, UsecaseError> {
        tracing::debug!("listing staff orders");

        if requester_role == "staff" && requester_id != staff_id {
            tracing::warn!("staff attempted to access another staff member's orders");
            return Err(UsecaseError::Forbidden(
                "You can only access your own orders".to_string(),
            ));
        }

        let orders = self.order_repository.find_by_assignee(staff_id).await?;

        tracing::debug!(count = orders.len(), "retrieved staff orders");
        Ok(orders)
    }

    #[tracing::instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: Uuid) -> Result<Order, UsecaseError> {
        let order = self
            .order_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Order".to_string()))?;

        Ok(order)
    }

    #[tracing::instrument(skip(self, customer_name), fields(order_id = %id))]
    pub async fn update_order(
        &self,
        id: Uuid,
        customer_name: Option<String>,
        total_amount: Option<f64>,
        payment_status: Option<PaymentStatus>,
        assigned_to: Option<Uuid>,
    ) -> Result<Order, UsecaseError> {
        tracing::debug!("updating order");

        let mut order = self
            .order_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Order".to_string()))?;

        if let Some(amount) = total_amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(UsecaseError::Validation(
                    "Total amount must be a valid non-negative number".to_string(),
                ));
            }
            order.total_amount = amount;
        }
        if let Some(customer_name) = customer_name {
            order.customer_name = customer_name;
        }
        if let Some(payment_status) = payment_status {
            order.payment_status = payment_status;
        }
        if let Some(assigned_to) = assigned_to {
            order.assigned_to = assigned_to;
        }
        order.updated_at = chrono::Utc::now();

        self.order_repository.update(&order).await?;

        tracing::info!(order_id = %order.id, "order updated");
        Ok(order)
    }

    #[tracing::instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: Uuid) -> Result<(), UsecaseError> {
        tracing::debug!("deleting order");

        match self.order_repository.delete(id).await {
            Ok(()) => {
                tracing::info!(order_id = %id, "order deleted");
                Ok(())
            }
            Err(crate::repository::errors::RepositoryError::NotFound) => {
                Err(UsecaseError::NotFound("Order".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Records a status change reported by the assigned staff member or the
    /// order's manager. Returns the previous status alongside the updated
    /// order so the caller can describe the transition.
    #[tracing::instrument(skip(self), fields(actor_id = %actor_id, order_id = %id, %status))]
    pub async fn update_status(
        &self,
        actor_id: Uuid,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(Order, OrderStatus), UsecaseError> {
        tracing::debug!("updating order status");

        let mut order = self
            .order_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Order".to_string()))?;

        if !order.can_update_status(actor_id) {
            tracing::warn!("unauthorized order status update attempt");
            return Err(UsecaseError::Forbidden(
                "You are not authorized to update this order".to_string(),
            ));
        }

        let previous = order.status;
        order.set_status(status);
        self.order_repository.update(&order).await?;

        tracing::info!(order_id = %order.id, %previous, new = %status, "order status updated");
        Ok((order, previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::contracts::MockOrderRepository;

    fn sample_order(manager_id: Uuid, assigned_to: Uuid) -> Order {
        Order::new(
            "Acme Corp".to_string(),
            120.0,
            PaymentStatus::Unpaid,
            manager_id,
            assigned_to,
        )
    }

    #[tokio::test]
    async fn test_create_order_rejects_negative_amount() {
        let order_repo = MockOrderRepository::new();

        let usecase = OrdersUseCase::new(order_repo);
        let result = usecase
            .create_order(
                "Acme".to_string(),
                -1.0,
                PaymentStatus::Unpaid,
                Uuid::new_v4(),
                Uuid::new_v4(),
            )
            .await;

        assert!(matches!(result, Err(UsecaseError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_status_by_assigned_staff() {
        let mut order_repo = MockOrderRepository::new();
        let manager_id = Uuid::new_v4();
        let staff_id = Uuid::new_v4();
        let order = sample_order(manager_id, staff_id);
        let order_id = order.id;

        order_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(order.clone())));
        order_repo.expect_update().times(1).returning(|_| Ok(()));

        let usecase = OrdersUseCase::new(order_repo);
        let (updated, previous) = usecase
            .update_status(staff_id, order_id, OrderStatus::Processing)
            .await
            .unwrap();

        assert_eq!(previous, OrderStatus::Pending);
        assert_eq!(updated.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_update_status_by_unrelated_user_is_forbidden() {
        let mut order_repo = MockOrderRepository::new();
        let order = sample_order(Uuid::new_v4(), Uuid::new_v4());
        let order_id = order.id;

        order_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(order.clone())));

        let usecase = OrdersUseCase::new(order_repo);
        let result = usecase
            .update_status(Uuid::new_v4(), order_id, OrderStatus::Completed)
            .await;

        assert!(matches!(result, Err(UsecaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_staff_cannot_list_other_staff_orders() {
        let order_repo = MockOrderRepository::new();

        let usecase = OrdersUseCase::new(order_repo);
        let result = usecase
            .list_staff_orders(Uuid::new_v4(), "staff", Uuid::new_v4())
            .await;

        assert!(matches!(result, Err(UsecaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_manager_can_list_any_staff_orders() {
        let mut order_repo = MockOrderRepository::new();

        order_repo
            .expect_find_by_assignee()
            .times(1)
            .returning(|_| Ok(vec![]));

        let usecase = OrdersUseCase::new(order_repo);
        let result = usecase
            .list_staff_orders(Uuid::new_v4(), "manager", Uuid::new_v4())
            .await;

        assert!(result.is_ok());
    }
}
