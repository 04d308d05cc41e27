use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::delivery::http::v1::middleware::AuthenticatedUser;
use crate::domain::notification::{EntityType, NotificationType, RelatedEntity, Severity};
use crate::domain::product::Product;
use crate::usecase::error::UsecaseError;
use crate::usecase::notifications::CreateNotificationParams;
use crate::usecase::products::StockLevel;

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i32,
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("listing products");

    let products = state.products_usecase.list_products().await?;

    tracing::debug!(count = products.len(), "products listed");
    Ok((
        StatusCode::OK,
        Json(json!({ "results": products.len(), "products": products })),
    ))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, product_id = %id))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let product = state.products_usecase.get_product(id).await?;
    Ok((StatusCode::OK, Json(product)))
}

/// Applies a stock delta and, when the product crosses into low or zero
/// stock, alerts managers. The alert is fire-and-forget: its failure never
/// fails the adjustment.
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id, product_id = %id))]
pub async fn adjust_stock(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!(delta = payload.delta, "adjusting stock");

    let (product, level) = state.products_usecase.adjust_stock(id, payload.delta).await?;

    match level {
        StockLevel::Low => {
            state
                .notifications_usecase
                .notify_best_effort(stock_alert(
                    &product,
                    NotificationType::LowStockAlert,
                    Severity::High,
                    format!(
                        "Product {} ({}) is low on stock: {} remaining, reorder level is {}",
                        product.name, product.sku, product.quantity, product.reorder_level
                    ),
                ))
                .await;
        }
        StockLevel::OutOfStock => {
            state
                .notifications_usecase
                .notify_best_effort(stock_alert(
                    &product,
                    NotificationType::ProductOutOfStock,
                    Severity::Critical,
                    format!("Product {} ({}) is out of stock", product.name, product.sku),
                ))
                .await;
        }
        StockLevel::Ok => {}
    }

    Ok((StatusCode::OK, Json(product)))
}

fn stock_alert(
    product: &Product,
    notification_type: NotificationType,
    severity: Severity,
    content: String,
) -> CreateNotificationParams {
    CreateNotificationParams::new(notification_type, content)
        .severity(severity)
        .roles(vec!["manager".to_string()])
        .related_entity(RelatedEntity {
            entity_type: EntityType::Product,
            entity_id: product.id,
        })
}
