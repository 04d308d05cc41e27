use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::delivery::http::v1::middleware::{AuthenticatedUser, require_admin};
use crate::domain::notification::{Notification, NotificationType, RelatedEntity, Severity};
use crate::usecase::error::UsecaseError;
use crate::usecase::notifications::{
    CreateNotificationParams, NotificationQuery, filter_notifications_by_role,
};

#[derive(Debug, Deserialize)]
pub struct NotificationListParams {
    pub limit: Option<i64>,
    pub page: Option<i64>,
    pub unread_only: Option<bool>,
    /// Comma-separated list of notification type strings.
    pub types: Option<String>,
}

#[derive(Serialize)]
pub struct NotificationResponse {
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

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            recipient: n.recipient,
            notification_type: n.notification_type,
            content: n.content,
            severity: n.severity,
            related_entity: n.related_entity,
            metadata: n.metadata,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct NotificationsListResponse {
    pub results: usize,
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    #[serde(default)]
    pub notification_ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    pub notification_type: NotificationType,
    #[validate(length(min = 1, message = "Notification must have content"))]
    pub content: String,
    pub severity: Option<Severity>,
    #[serde(default)]
    pub recipients: Vec<Uuid>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub related_entity: Option<RelatedEntity>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct CreatedNotificationsResponse {
    pub notifications: Vec<NotificationResponse>,
}

fn parse_types(raw: Option<&str>) -> Result<Vec<NotificationType>, UsecaseError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse().map_err(UsecaseError::Validation))
            .collect(),
    }
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, role = %user.role))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(params): Query<NotificationListParams>,
) -> Result<impl IntoResponse, UsecaseError> {
    let query = NotificationQuery {
        limit: params.limit.unwrap_or(20).min(100),
        page: params.page.unwrap_or(1),
        unread_only: params.unread_only.unwrap_or(false),
        types: parse_types(params.types.as_deref())?,
    };
    tracing::debug!(limit = query.limit, page = query.page, unread_only = query.unread_only, "listing notifications");

    let notifications = state
        .notifications_usecase
        .list_notifications(user.user_id, query)
        .await?;

    let visible = filter_notifications_by_role(notifications, &user.role);

    // The unread badge counts the user's full unread set, independent of the
    // role filter and pagination above, so it can disagree with the number of
    // unread items visible in this response.
    let unread_count = state.notifications_usecase.count_unread(user.user_id).await?;

    let notifications: Vec<NotificationResponse> =
        visible.into_iter().map(NotificationResponse::from).collect();

    tracing::debug!(count = notifications.len(), unread_count, "notifications listed");
    Ok((
        StatusCode::OK,
        Json(NotificationsListResponse {
            results: notifications.len(),
            notifications,
            unread_count,
        }),
    ))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn mark_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!(id_count = payload.notification_ids.len(), "marking notifications as read");

    if let Some(first) = payload.notification_ids.first() {
        if state.notifications_usecase.find_owned(user.user_id, *first).await?.is_none() {
            tracing::warn!(notification_id = %first, "notification not found for caller");
            return Err(UsecaseError::NotFound("Notification".to_string()));
        }
    }

    let updated = state
        .notifications_usecase
        .mark_notifications_read(user.user_id, payload.notification_ids)
        .await?;

    tracing::debug!(updated, "notifications marked as read");
    Ok((StatusCode::OK, Json(MarkReadResponse { updated })))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn clear_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    tracing::debug!("clearing notifications");

    let deleted = state.notifications_usecase.clear_all(user.user_id).await?;

    tracing::debug!(deleted, "notifications cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Direct creation endpoint; the only entry point that accepts `roles` for
/// fan-out, restricted to admins.
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    payload
        .validate()
        .map_err(|e| UsecaseError::Validation(e.to_string()))?;

    tracing::debug!(
        notification_type = %payload.notification_type,
        recipient_count = payload.recipients.len(),
        role_count = payload.roles.len(),
        "creating notification"
    );

    let params = CreateNotificationParams {
        notification_type: payload.notification_type,
        content: payload.content,
        severity: payload.severity,
        recipients: payload.recipients,
        roles: payload.roles,
        related_entity: payload.related_entity,
        metadata: payload.metadata,
    };

    let created = state.notifications_usecase.create_notification(params).await?;

    let notifications: Vec<NotificationResponse> =
        created.into_iter().map(NotificationResponse::from).collect();

    tracing::info!(count = notifications.len(), "notifications created via admin endpoint");
    Ok((
        StatusCode::CREATED,
        Json(CreatedNotificationsResponse { notifications }),
    ))
}
