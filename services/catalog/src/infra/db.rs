use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use storefront_catalog_schema::products;
use storefront_domain::pagination::PageRequest;

use crate::domain::repository::ProductRepository;
use crate::domain::types::{Product, ProductFilter};
use crate::error::CatalogServiceError;

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

fn visible() -> Condition {
    Condition::all().add(products::Column::IsDeleted.eq(false))
}

fn search_condition(filter: &ProductFilter) -> Condition {
    let mut cond = visible();
    if let Some(term) = filter.term.as_deref() {
        let pattern = format!("%{term}%");
        cond = cond.add(
            Condition::any()
                .add(Expr::col(products::Column::Name).ilike(pattern.clone()))
                .add(Expr::col(products::Column::Description).ilike(pattern)),
        );
    }
    if let Some(min) = filter.min_price {
        cond = cond.add(products::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        cond = cond.add(products::Column::Price.lte(max));
    }
    if let Some(available) = filter.is_available {
        cond = cond.add(products::Column::IsAvailable.eq(available));
    }
    if let Some(owner_id) = filter.owner_id {
        cond = cond.add(products::Column::OwnerId.eq(owner_id));
    }
    cond
}

impl ProductRepository for DbProductRepository {
    async fn find_by_id(
        &self,
        id: Uuid,
        include_deleted: bool,
    ) -> Result<Option<Product>, CatalogServiceError> {
        let mut query = products::Entity::find_by_id(id);
        if !include_deleted {
            query = query.filter(products::Column::IsDeleted.eq(false));
        }
        let model = query.one(&self.db).await.context("find product by id")?;
        Ok(model.map(product_from_model))
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Product>, CatalogServiceError> {
        let page = page.clamped();
        let models = products::Entity::find()
            .filter(visible())
            .order_by_desc(products::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list products")?;
        Ok(models.into_iter().map(product_from_model).collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Product>, CatalogServiceError> {
        let models = products::Entity::find()
            .filter(visible())
            .filter(products::Column::OwnerId.eq(owner_id))
            .order_by_desc(products::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list products by owner")?;
        Ok(models.into_iter().map(product_from_model).collect())
    }

    async fn search(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), CatalogServiceError> {
        let page = page.clamped();
        let cond = search_condition(filter);

        let total = products::Entity::find()
            .filter(cond.clone())
            .count(&self.db)
            .await
            .context("count search results")?;

        let models = products::Entity::find()
            .filter(cond)
            .order_by_desc(products::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("search products")?;

        Ok((models.into_iter().map(product_from_model).collect(), total))
    }

    async fn create(&self, product: &Product) -> Result<(), CatalogServiceError> {
        active_model(product)
            .insert(&self.db)
            .await
            .context("create product")?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), CatalogServiceError> {
        active_model(product)
            .update(&self.db)
            .await
            .context("update product")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), CatalogServiceError> {
        products::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete product")?;
        Ok(())
    }

    async fn soft_delete_by_owner(
        &self,
        owner_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64, CatalogServiceError> {
        // Single UPDATE: all rows for the owner flip together or not at all.
        let result = products::Entity::update_many()
            .col_expr(products::Column::IsDeleted, Expr::value(true))
            .col_expr(products::Column::DeletedAt, Expr::value(Some(deleted_at)))
            .col_expr(products::Column::UpdatedAt, Expr::value(deleted_at))
            .filter(products::Column::OwnerId.eq(owner_id))
            .filter(products::Column::IsDeleted.eq(false))
            .exec(&self.db)
            .await
            .context("soft delete products by owner")?;
        Ok(result.rows_affected)
    }

    async fn restore_by_owner(&self, owner_id: Uuid) -> Result<u64, CatalogServiceError> {
        let result = products::Entity::update_many()
            .col_expr(products::Column::IsDeleted, Expr::value(false))
            .col_expr(
                products::Column::DeletedAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(products::Column::OwnerId.eq(owner_id))
            .filter(products::Column::IsDeleted.eq(true))
            .exec(&self.db)
            .await
            .context("restore products by owner")?;
        Ok(result.rows_affected)
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<u64, CatalogServiceError> {
        let result = products::Entity::delete_many()
            .filter(products::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await
            .context("delete products by owner")?;
        Ok(result.rows_affected)
    }
}

fn active_model(product: &Product) -> products::ActiveModel {
    products::ActiveModel {
        id: Set(product.id),
        owner_id: Set(product.owner_id),
        name: Set(product.name.clone()),
        description: Set(product.description.clone()),
        price: Set(product.price),
        is_available: Set(product.is_available),
        is_deleted: Set(product.is_deleted),
        deleted_at: Set(product.deleted_at),
        created_at: Set(product.created_at),
        updated_at: Set(product.updated_at),
    }
}

fn product_from_model(model: products::Model) -> Product {
    Product {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        description: model.description,
        price: model.price,
        is_available: model.is_available,
        is_deleted: model.is_deleted,
        deleted_at: model.deleted_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
