use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_auth_types::bearer::BearerToken;
use storefront_domain::pagination::PageRequest;

use crate::domain::types::{Product, ProductFilter};
use crate::error::CatalogServiceError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::product::{
    CreateProductInput, CreateProductUseCase, DeleteProductUseCase, GetProductUseCase,
    ListOwnProductsUseCase, ListProductsUseCase, SearchProductsUseCase, UpdateProductInput,
    UpdateProductUseCase,
};

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub is_available: bool,
    #[serde(serialize_with = "storefront_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "storefront_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            owner_id: product.owner_id.to_string(),
            name: product.name,
            description: product.description,
            price: product.price,
            is_available: product.is_available,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    fn to_page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(25),
        }
        .clamped()
    }
}

// ── GET /products ────────────────────────────────────────────────────────────

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ProductResponse>>, CatalogServiceError> {
    let usecase = ListProductsUseCase {
        products: state.product_repo(),
    };
    let products = usecase.execute(query.to_page_request()).await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

// ── GET /products/search ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_available: Option<bool>,
    pub owner_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub products: Vec<ProductResponse>,
    pub total_count: u64,
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, CatalogServiceError> {
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(25),
    }
    .clamped();
    let filter = ProductFilter {
        term: query.term,
        min_price: query.min_price,
        max_price: query.max_price,
        is_available: query.is_available,
        owner_id: query.owner_id,
    };

    let usecase = SearchProductsUseCase {
        products: state.product_repo(),
    };
    let (products, total_count) = usecase.execute(filter, page).await?;
    Ok(Json(SearchResponse {
        products: products.into_iter().map(ProductResponse::from).collect(),
        total_count,
    }))
}

// ── GET /products/mine ───────────────────────────────────────────────────────

pub async fn list_own_products(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Vec<ProductResponse>>, CatalogServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    let usecase = ListOwnProductsUseCase {
        products: state.product_repo(),
    };
    let products = usecase.execute(info.user_id).await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

// ── GET /products/{id} ───────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, CatalogServiceError> {
    let usecase = GetProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase.execute(id).await?;
    Ok(Json(ProductResponse::from(product)))
}

// ── POST /products ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

pub async fn create_product(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), CatalogServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    let usecase = CreateProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase
        .execute(
            info.user_id,
            CreateProductInput {
                name: body.name,
                description: body.description,
                price: body.price,
                is_available: body.is_available,
            },
        )
        .await?;
    tracing::info!(product_id = %product.id, owner_id = %product.owner_id, "product created");
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

// ── PUT /products/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_available: Option<bool>,
}

pub async fn update_product(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, CatalogServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    let usecase = UpdateProductUseCase {
        products: state.product_repo(),
    };
    let product = usecase
        .execute(
            id,
            info.user_id,
            UpdateProductInput {
                name: body.name,
                description: body.description,
                price: body.price,
                is_available: body.is_available,
            },
        )
        .await?;
    Ok(Json(ProductResponse::from(product)))
}

// ── DELETE /products/{id} ────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CatalogServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    let usecase = DeleteProductUseCase {
        products: state.product_repo(),
    };
    usecase.execute(id, info.user_id).await?;
    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
