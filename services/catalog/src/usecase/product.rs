//! Product CRUD with ownership checks.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use storefront_domain::pagination::PageRequest;

use crate::domain::repository::ProductRepository;
use crate::domain::types::{Product, ProductFilter};
use crate::error::CatalogServiceError;

fn check_price(price: Decimal) -> Result<(), CatalogServiceError> {
    if price < Decimal::ZERO {
        return Err(CatalogServiceError::InvalidPrice);
    }
    Ok(())
}

// ── CreateProduct ────────────────────────────────────────────────────────────

pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub is_available: bool,
}

pub struct CreateProductUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> CreateProductUseCase<R> {
    pub async fn execute(
        &self,
        owner_id: Uuid,
        input: CreateProductInput,
    ) -> Result<Product, CatalogServiceError> {
        if input.name.trim().is_empty() {
            return Err(CatalogServiceError::Validation(
                "product name is required".into(),
            ));
        }
        check_price(input.price)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            owner_id,
            name: input.name,
            description: input.description,
            price: input.price,
            is_available: input.is_available,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        self.products.create(&product).await?;
        Ok(product)
    }
}

// ── GetProduct ───────────────────────────────────────────────────────────────

pub struct GetProductUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> GetProductUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<Product, CatalogServiceError> {
        self.products
            .find_by_id(id, false)
            .await?
            .ok_or(CatalogServiceError::ProductNotFound)
    }
}

// ── ListProducts ─────────────────────────────────────────────────────────────

pub struct ListProductsUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> ListProductsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Product>, CatalogServiceError> {
        self.products.list(page).await
    }
}

// ── ListOwnProducts ──────────────────────────────────────────────────────────

pub struct ListOwnProductsUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> ListOwnProductsUseCase<R> {
    pub async fn execute(&self, owner_id: Uuid) -> Result<Vec<Product>, CatalogServiceError> {
        self.products.list_by_owner(owner_id).await
    }
}

// ── SearchProducts ───────────────────────────────────────────────────────────

pub struct SearchProductsUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> SearchProductsUseCase<R> {
    pub async fn execute(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), CatalogServiceError> {
        self.products.search(&filter, page).await
    }
}

// ── UpdateProduct ────────────────────────────────────────────────────────────

pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_available: Option<bool>,
}

pub struct UpdateProductUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> UpdateProductUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        caller_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<Product, CatalogServiceError> {
        let Some(mut product) = self.products.find_by_id(id, false).await? else {
            return Err(CatalogServiceError::ProductNotFound);
        };
        if product.owner_id != caller_id {
            return Err(CatalogServiceError::ForbiddenOwnership);
        }

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(CatalogServiceError::Validation(
                    "product name is required".into(),
                ));
            }
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = description;
        }
        if let Some(price) = input.price {
            check_price(price)?;
            product.price = price;
        }
        if let Some(is_available) = input.is_available {
            product.is_available = is_available;
        }
        product.updated_at = Utc::now();
        self.products.update(&product).await?;
        Ok(product)
    }
}

// ── DeleteProduct ────────────────────────────────────────────────────────────

pub struct DeleteProductUseCase<R: ProductRepository> {
    pub products: R,
}

impl<R: ProductRepository> DeleteProductUseCase<R> {
    pub async fn execute(&self, id: Uuid, caller_id: Uuid) -> Result<(), CatalogServiceError> {
        let Some(product) = self.products.find_by_id(id, false).await? else {
            return Err(CatalogServiceError::ProductNotFound);
        };
        if product.owner_id != caller_id {
            return Err(CatalogServiceError::ForbiddenOwnership);
        }
        self.products.delete(product.id).await
    }
}
