use sea_orm::entity::prelude::*;

/// User account record owned by the identity service.
///
/// At most one outstanding confirmation token and one outstanding reset
/// token exist per user; both columns are nullable and cleared on use.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: i16,
    pub is_active: bool,
    pub is_email_confirmed: bool,
    #[sea_orm(nullable)]
    pub email_confirmation_token: Option<String>,
    #[sea_orm(nullable)]
    pub password_reset_token: Option<String>,
    #[sea_orm(nullable)]
    pub password_reset_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
