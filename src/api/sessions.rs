use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{ApiResult, AppState};
use crate::domain::session::SessionSummary;
use crate::remote::RemoteTransport;
use crate::store::Fields;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<SessionSummary>>> {
    Ok(Json(state.client.list_sessions().await?))
}

pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SessionSummary>> {
    Ok(Json(state.client.get_session(&id).await?))
}

/// Create-or-update keyed on the optional id, matching the transport's
/// `save_session` semantics.
pub async fn save(
    State(state): State<AppState>,
    Json(summary): Json<SessionSummary>,
) -> ApiResult<(StatusCode, Json<SessionSummary>)> {
    let status = if summary.id.is_none() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let saved = state.client.save_session(&summary).await?;
    Ok((status, Json(saved)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut fields): Json<Fields>,
) -> ApiResult<Json<SessionSummary>> {
    fields.remove("id");
    Ok(Json(state.client.update_session(&id, fields).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.client.delete_session(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
