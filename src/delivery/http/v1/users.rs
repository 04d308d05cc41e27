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
use validator::Validate;

use crate::AppState;
use crate::delivery::http::v1::middleware::{AuthenticatedUser, require_admin};
use crate::domain::notification::{EntityType, NotificationType, RelatedEntity, Severity};
use crate::usecase::error::UsecaseError;
use crate::usecase::notifications::CreateNotificationParams;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Please provide name"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, role = %user.role))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    let users = state.users_usecase.list_users(&user.role).await?;

    tracing::debug!(count = users.len(), "users listed");
    Ok((
        StatusCode::OK,
        Json(json!({ "results": users.len(), "users": users })),
    ))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, target_id = %id))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    let target = state.users_usecase.get_user(id).await?;
    Ok((StatusCode::OK, Json(target)))
}

/// Admin-only. Announces the new account to the admin role; the announcement
/// is fire-and-forget.
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    payload
        .validate()
        .map_err(|e| UsecaseError::Validation(e.to_string()))?;

    tracing::debug!(role = %payload.role, "creating user");

    let created = state
        .users_usecase
        .create_user(payload.name, payload.email, payload.role)
        .await?;

    let params = CreateNotificationParams::new(
        NotificationType::UserAccountCreated,
        format!("New {} account created for {}", created.role, created.email),
    )
    .severity(Severity::Low)
    .roles(vec!["admin".to_string()])
    .related_entity(RelatedEntity {
        entity_type: EntityType::User,
        entity_id: created.id,
    });
    state.notifications_usecase.notify_best_effort(params).await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Admin-only. When the role actually changes, the affected user is told; the
/// notification is fire-and-forget.
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id, target_id = %id))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    tracing::debug!("updating user");

    let (updated, role_changed) = state
        .users_usecase
        .update_user(id, payload.name, payload.email, payload.role)
        .await?;

    if role_changed {
        let params = CreateNotificationParams::new(
            NotificationType::UserRoleChanged,
            format!("Your role has been changed to {}", updated.role),
        )
        .severity(Severity::Medium)
        .recipients(vec![updated.id])
        .related_entity(RelatedEntity {
            entity_type: EntityType::User,
            entity_id: updated.id,
        });
        state.notifications_usecase.notify_best_effort(params).await;
    }

    Ok((StatusCode::OK, Json(updated)))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id, target_id = %id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    state.users_usecase.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
