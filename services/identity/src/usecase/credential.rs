//! Credential state machine: registration, login, email confirmation and
//! password recovery.

use chrono::{Duration, Utc};
use uuid::Uuid;

use storefront_domain::user::UserRole;

use crate::domain::repository::{Mailer, UserRepository};
use crate::domain::types::{RESET_TOKEN_TTL_SECS, User};
use crate::error::IdentityServiceError;
use crate::usecase::password::{hash_password, verify_password};
use crate::usecase::token::{issue_access_token, issue_refresh_token, opaque_token};

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

fn check_password_strength(password: &str) -> Result<(), IdentityServiceError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(IdentityServiceError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub users: R,
    pub mailer: M,
}

impl<R, M> RegisterUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<User, IdentityServiceError> {
        if input.full_name.trim().is_empty() || input.email.trim().is_empty() {
            return Err(IdentityServiceError::Validation(
                "full name and email are required".into(),
            ));
        }
        check_password_strength(&input.password)?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(IdentityServiceError::AlreadyExists);
        }

        let now = Utc::now();
        let confirmation_token = opaque_token();
        let user = User {
            id: Uuid::new_v4(),
            full_name: input.full_name,
            email: input.email,
            password_hash: hash_password(&input.password)?,
            role: UserRole::User,
            is_active: true,
            is_email_confirmed: false,
            email_confirmation_token: Some(confirmation_token.clone()),
            password_reset_token: None,
            password_reset_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;

        // Fire-and-forget: a lost mail leaves the account resendable, it must
        // not fail the registration.
        if let Err(e) = self
            .mailer
            .send_confirmation(&user.email, &user.full_name, &confirmation_token)
            .await
        {
            tracing::warn!(error = %e, email = %user.email, "confirmation mail failed");
        }

        Ok(user)
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

pub struct LoginUseCase<R: UserRepository> {
    pub users: R,
    pub jwt_secret: String,
}

impl<R: UserRepository> LoginUseCase<R> {
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, IdentityServiceError> {
        let Some(user) = self.users.find_by_email(&input.email).await? else {
            // Burn hashing effort on the unknown-email path so response
            // timing does not reveal whether the account exists.
            let _ = hash_password(&input.password);
            return Err(IdentityServiceError::InvalidCredentials);
        };

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(IdentityServiceError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(IdentityServiceError::Deactivated);
        }
        if !user.is_email_confirmed {
            return Err(IdentityServiceError::EmailNotConfirmed);
        }

        let (access_token, access_token_exp) = issue_access_token(&user, &self.jwt_secret)?;
        let refresh_token = issue_refresh_token();

        Ok(LoginOutput {
            user,
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}

// ── ConfirmEmail ─────────────────────────────────────────────────────────────

pub struct ConfirmEmailUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub users: R,
    pub mailer: M,
}

impl<R, M> ConfirmEmailUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub async fn execute(&self, token: &str) -> Result<(), IdentityServiceError> {
        // A consumed token no longer matches any row, so a second confirm
        // with the same token fails here instead of silently succeeding.
        let Some(mut user) = self.users.find_by_confirmation_token(token).await? else {
            return Err(IdentityServiceError::InvalidToken);
        };

        user.is_email_confirmed = true;
        user.email_confirmation_token = None;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        if let Err(e) = self.mailer.send_welcome(&user.email, &user.full_name).await {
            tracing::warn!(error = %e, email = %user.email, "welcome mail failed");
        }

        Ok(())
    }
}

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    pub users: R,
    pub mailer: M,
}

impl<R, M> ForgotPasswordUseCase<R, M>
where
    R: UserRepository,
    M: Mailer,
{
    /// Always succeeds; an unknown email is indistinguishable from a known
    /// one so the endpoint cannot be used to enumerate accounts.
    pub async fn execute(&self, email: &str) -> Result<(), IdentityServiceError> {
        let Some(mut user) = self.users.find_by_email(email).await? else {
            return Ok(());
        };

        let reset_token = opaque_token();
        user.password_reset_token = Some(reset_token.clone());
        user.password_reset_expires_at = Some(Utc::now() + Duration::seconds(RESET_TOKEN_TTL_SECS));
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        if let Err(e) = self
            .mailer
            .send_password_reset(&user.email, &user.full_name, &reset_token)
            .await
        {
            tracing::warn!(error = %e, email = %user.email, "password reset mail failed");
        }

        Ok(())
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> ResetPasswordUseCase<R> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), IdentityServiceError> {
        check_password_strength(&input.new_password)?;

        let Some(mut user) = self.users.find_by_reset_token(&input.token).await? else {
            return Err(IdentityServiceError::InvalidToken);
        };
        if !user.reset_token_valid(Utc::now()) {
            return Err(IdentityServiceError::InvalidToken);
        }

        user.password_hash = hash_password(&input.new_password)?;
        user.password_reset_token = None;
        user.password_reset_expires_at = None;
        user.updated_at = Utc::now();
        self.users.update(&user).await
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<R: UserRepository> {
    pub users: R,
}

impl<R: UserRepository> ChangePasswordUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> Result<(), IdentityServiceError> {
        check_password_strength(&input.new_password)?;

        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(IdentityServiceError::UserNotFound);
        };
        if !verify_password(&input.current_password, &user.password_hash)? {
            return Err(IdentityServiceError::InvalidCredentials);
        }

        user.password_hash = hash_password(&input.new_password)?;
        user.updated_at = Utc::now();
        self.users.update(&user).await
    }
}
