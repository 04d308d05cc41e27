use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::delivery::http::v1::middleware::AuthenticatedUser;
use crate::domain::notification::{EntityType, NotificationType, RelatedEntity, Severity};
use crate::domain::order::{Order, OrderStatus, PaymentStatus};
use crate::usecase::error::UsecaseError;
use crate::usecase::notifications::CreateNotificationParams;

#[derive(Serialize)]
pub struct OrderResponse {
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

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            order_number: o.order_number,
            customer_name: o.customer_name,
            total_amount: o.total_amount,
            status: o.status,
            payment_status: o.payment_status,
            manager_id: o.manager_id,
            assigned_to: o.assigned_to,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct OrdersListResponse {
    pub results: usize,
    pub orders: Vec<OrderResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub total_amount: f64,
    pub payment_status: Option<PaymentStatus>,
    pub manager_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub customer_name: Option<String>,
    pub total_amount: Option<f64>,
    pub payment_status: Option<PaymentStatus>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[validate(length(min = 1, message = "Status and message are required"))]
    pub message: String,
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("listing orders");

    let orders = state.orders_usecase.list_orders().await?;
    let orders: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();

    tracing::debug!(count = orders.len(), "orders listed");
    Ok((
        StatusCode::OK,
        Json(OrdersListResponse { results: orders.len(), orders }),
    ))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, staff_id = %staff_id))]
pub async fn list_staff_orders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(staff_id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("listing staff orders");

    let orders = state
        .orders_usecase
        .list_staff_orders(user.user_id, &user.role, staff_id)
        .await?;
    let orders: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();

    tracing::debug!(count = orders.len(), "staff orders listed");
    Ok((
        StatusCode::OK,
        Json(OrdersListResponse { results: orders.len(), orders }),
    ))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, order_id = %id))]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let order = state.orders_usecase.get_order(id).await?;
    Ok((StatusCode::OK, Json(OrderResponse::from(order))))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("creating order");

    // Unassigned orders fall back to the caller, matching how managers enter
    // their own orders.
    let order = state
        .orders_usecase
        .create_order(
            payload.customer_name,
            payload.total_amount,
            payload.payment_status.unwrap_or_default(),
            payload.manager_id.unwrap_or(user.user_id),
            payload.assigned_to.unwrap_or(user.user_id),
        )
        .await?;

    tracing::info!(order_id = %order.id, "order created");
    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id, order_id = %id))]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("updating order");

    let order = state
        .orders_usecase
        .update_order(
            id,
            payload.customer_name,
            payload.total_amount,
            payload.payment_status,
            payload.assigned_to,
        )
        .await?;

    Ok((StatusCode::OK, Json(OrderResponse::from(order))))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, order_id = %id))]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    state.orders_usecase.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Status change reported by the assigned staff member or the manager. The
/// manager notification is fire-and-forget: its failure never fails the
/// order update.
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id, order_id = %id))]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    payload
        .validate()
        .map_err(|e| UsecaseError::Validation(e.to_string()))?;

    tracing::debug!(status = %payload.status, "updating order status");

    let (order, previous) = state
        .orders_usecase
        .update_status(user.user_id, id, payload.status)
        .await?;

    if order.manager_id != user.user_id {
        let content = format!(
            "Order {} status changed from {} to {} by {}. Message: {}",
            order.order_number, previous, order.status, user.email, payload.message
        );
        let params = CreateNotificationParams::new(NotificationType::OrderStatusChange, content)
            .severity(Severity::Medium)
            .recipients(vec![order.manager_id])
            .related_entity(RelatedEntity {
                entity_type: EntityType::Order,
                entity_id: order.id,
            });
        state.notifications_usecase.notify_best_effort(params).await;
    }

    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");
    Ok((StatusCode::OK, Json(OrderResponse::from(order))))
}
