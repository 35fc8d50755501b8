use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{ApiResult, AppState};
use crate::domain::purchase::{PurchaseDraft, PurchaseRecord};
use crate::remote::RemoteTransport;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PurchaseRecord>>> {
    Ok(Json(state.client.list_purchases().await?))
}

pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseRecord>> {
    Ok(Json(state.client.get_purchase(&id).await?))
}

pub async fn by_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<PurchaseRecord>>> {
    Ok(Json(state.client.purchases_for_session(&session_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<PurchaseDraft>,
) -> ApiResult<(StatusCode, Json<PurchaseRecord>)> {
    let record = state.client.add_purchase(&draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.client.delete_purchase(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
