use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use storefront_auth_types::bearer::BearerToken;

use crate::domain::types::User;
use crate::error::IdentityServiceError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::account::GetUserUseCase;
use crate::usecase::credential::{
    ChangePasswordInput, ChangePasswordUseCase, ConfirmEmailUseCase, ForgotPasswordUseCase,
    LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, ResetPasswordInput,
    ResetPasswordUseCase,
};

/// Public projection of a user account.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub is_email_confirmed: bool,
    #[serde(serialize_with = "storefront_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "storefront_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            full_name: user.full_name,
            email: user.email,
            role: user.role.as_str().to_owned(),
            is_active: user.is_active,
            is_email_confirmed: user.is_email_confirmed,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, IdentityServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        mailer: state.mailer(),
    };
    let user = usecase
        .execute(RegisterInput {
            full_name: body.full_name,
            email: body.email,
            password: body.password,
        })
        .await?;
    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: UserResponse,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, IdentityServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse {
        token: out.access_token,
        refresh_token: out.refresh_token,
        user: UserResponse::from(out.user),
    }))
}

// ── POST /auth/confirm-email ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ConfirmEmailRequest {
    pub token: String,
}

pub async fn confirm_email(
    State(state): State<AppState>,
    Json(body): Json<ConfirmEmailRequest>,
) -> Result<Json<serde_json::Value>, IdentityServiceError> {
    let usecase = ConfirmEmailUseCase {
        users: state.user_repo(),
        mailer: state.mailer(),
    };
    usecase.execute(&body.token).await?;
    Ok(Json(
        serde_json::json!({ "message": "email confirmed successfully" }),
    ))
}

// ── POST /auth/forgot-password ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, IdentityServiceError> {
    let usecase = ForgotPasswordUseCase {
        users: state.user_repo(),
        mailer: state.mailer(),
    };
    usecase.execute(&body.email).await?;
    // Same response whether or not the account exists.
    Ok(Json(serde_json::json!({
        "message": "if the email exists, a reset token has been sent"
    })))
}

// ── POST /auth/reset-password ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, IdentityServiceError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(ResetPasswordInput {
            token: body.token,
            new_password: body.new_password,
        })
        .await?;
    Ok(Json(
        serde_json::json!({ "message": "password reset successfully" }),
    ))
}

// ── POST /auth/change-password ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            info.user_id,
            ChangePasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    tracing::info!(user_id = %info.user_id, "password changed");
    Ok(Json(
        serde_json::json!({ "message": "password changed successfully" }),
    ))
}

// ── GET /auth/me ─────────────────────────────────────────────────────────────

pub async fn me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<UserResponse>, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(info.user_id).await?;
    Ok(Json(UserResponse::from(user)))
}
