use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Product listing owned by the catalog service.
///
/// `owner_id` references a user in the identity service's store; the two
/// services do not share a database, so there is no foreign key behind it.
/// Soft-deleted rows (`is_deleted = true`) are kept until the owner is
/// deleted for good.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub is_available: bool,
    pub is_deleted: bool,
    #[sea_orm(nullable)]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
