use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::AppState;
use crate::delivery::http::v1::middleware::{AuthenticatedUser, require_admin};
use crate::usecase::error::UsecaseError;
use crate::usecase::settings::SystemSettingsUpdate;

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    let settings = state.settings_usecase.get_settings().await?;
    Ok((StatusCode::OK, Json(settings)))
}

#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<SystemSettingsUpdate>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    tracing::debug!("updating system settings");

    let settings = state.settings_usecase.update_settings(payload).await?;
    Ok((StatusCode::OK, Json(settings)))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn reset_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, UsecaseError> {
    require_admin(&user)?;

    tracing::debug!("resetting system settings");

    let settings = state.settings_usecase.reset_settings().await?;
    Ok((StatusCode::OK, Json(settings)))
}
