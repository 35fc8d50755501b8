use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::api::{ApiResult, AppState};
use crate::domain::category::Category;
use crate::domain::product::{Product, ProductDraft, ProductPatch};
use crate::error::PosError;
use crate::remote::RemoteTransport;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub category: Category,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

impl CreateProductRequest {
    fn into_draft(self) -> ApiResult<ProductDraft> {
        self.validate()
            .map_err(|e| PosError::Validation(e.to_string()))?;
        Ok(ProductDraft {
            name: self.name,
            category: self.category,
            price: self.price,
            image: self.image,
        })
    }
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.client.list_products().await?))
}

pub async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.client.get_product(&id).await?))
}

pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Product>>> {
    let category = Category::from(category.as_str());
    Ok(Json(state.client.products_by_category(&category).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.client.add_product(&request.into_draft()?).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Seed several products at once; used by the catalog migration script.
pub async fn create_batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<CreateProductRequest>>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let drafts = requests
        .into_iter()
        .map(CreateProductRequest::into_draft)
        .collect::<ApiResult<Vec<_>>>()?;
    let count = state.client.add_products_batch(&drafts).await?;
    Ok((StatusCode::CREATED, Json(json!({"count": count}))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.client.update_product(&id, &patch).await?))
}

/// Composite-key update: `name` and `category` address the record, the
/// remaining fields are the patch. A miss never creates a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindUpdateRequest {
    pub name: Option<String>,
    pub category: Option<Category>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
}

pub async fn find_update(
    State(state): State<AppState>,
    Json(request): Json<FindUpdateRequest>,
) -> ApiResult<Json<Product>> {
    let (Some(name), Some(category)) = (request.name, request.category) else {
        return Err(PosError::Validation(
            "name and category are required to locate the product".into(),
        )
        .into());
    };
    let patch = ProductPatch {
        name: None,
        category: None,
        price: request.price,
        image: request.image,
    };
    let product = state
        .client
        .update_product_by_lookup(&name, &category, &patch)
        .await?;
    Ok(Json(product))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.client.delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
