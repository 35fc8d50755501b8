//! The REST relay: the same operations the store client exposes, spoken
//! over HTTP for frontends that cannot reach the document store directly.

pub mod products;
pub mod purchases;
pub mod sessions;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::PosError;
use crate::remote::StoreClient;

#[derive(Clone)]
pub struct AppState {
    pub client: StoreClient,
}

pub fn router(client: StoreClient) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route(
            "/products",
            get(products::list).post(products::create),
        )
        .route("/products/batch", post(products::create_batch))
        .route("/products/find/update", put(products::find_update))
        .route("/products/category/:category", get(products::by_category))
        .route(
            "/products/:id",
            get(products::fetch)
                .put(products::update)
                .delete(products::remove),
        )
        .route(
            "/purchases",
            get(purchases::list).post(purchases::create),
        )
        .route("/purchases/session/:session_id", get(purchases::by_session))
        .route(
            "/purchases/:id",
            get(purchases::fetch).delete(purchases::remove),
        )
        .route("/sessions", get(sessions::list).post(sessions::save))
        .route(
            "/sessions/:id",
            get(sessions::fetch)
                .put(sessions::update)
                .delete(sessions::remove),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { client })
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "service": "sari-pos-relay"}))
}

/// Maps the error taxonomy onto HTTP statuses with an `{error}` body.
pub struct ApiError(PosError);

impl From<PosError> for ApiError {
    fn from(err: PosError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PosError::Validation(_) => StatusCode::BAD_REQUEST,
            PosError::NotFound(_) => StatusCode::NOT_FOUND,
            PosError::Conflict(_) => StatusCode::CONFLICT,
            PosError::Transport { .. } => StatusCode::BAD_GATEWAY,
            PosError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
