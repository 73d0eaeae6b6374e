use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use storefront_domain::user::UserRole;
use storefront_identity_schema::users;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::IdentityServiceError;

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, IdentityServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_confirmation_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, IdentityServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::EmailConfirmationToken.eq(token))
            .one(&self.db)
            .await
            .context("find user by confirmation token")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, IdentityServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::PasswordResetToken.eq(token))
            .one(&self.db)
            .await
            .context("find user by reset token")?;
        model.map(user_from_model).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, IdentityServiceError> {
        let models = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list users")?;
        models.into_iter().map(user_from_model).collect()
    }

    async fn create(&self, user: &User) -> Result<(), IdentityServiceError> {
        active_model(user)
            .insert(&self.db)
            .await
            .context("create user")?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), IdentityServiceError> {
        active_model(user)
            .update(&self.db)
            .await
            .context("update user")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), IdentityServiceError> {
        users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(())
    }
}

fn active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id),
        full_name: Set(user.full_name.clone()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        role: Set(i16::from(user.role.as_u8())),
        is_active: Set(user.is_active),
        is_email_confirmed: Set(user.is_email_confirmed),
        email_confirmation_token: Set(user.email_confirmation_token.clone()),
        password_reset_token: Set(user.password_reset_token.clone()),
        password_reset_expires_at: Set(user.password_reset_expires_at),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
}

fn user_from_model(model: users::Model) -> Result<User, IdentityServiceError> {
    let role = UserRole::from_u8(model.role as u8)
        .ok_or_else(|| anyhow::anyhow!("unknown role value {} for user {}", model.role, model.id))?;
    Ok(User {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        password_hash: model.password_hash,
        role,
        is_active: model.is_active,
        is_email_confirmed: model.is_email_confirmed,
        email_confirmation_token: model.email_confirmation_token,
        password_reset_token: model.password_reset_token,
        password_reset_expires_at: model.password_reset_expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
