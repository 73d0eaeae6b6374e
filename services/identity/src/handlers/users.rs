use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use storefront_auth_types::bearer::BearerToken;
use storefront_domain::user::UserRole;

use crate::error::IdentityServiceError;
use crate::handlers::auth::UserResponse;
use crate::handlers::{authenticate, require_admin};
use crate::state::AppState;
use crate::usecase::account::{
    ActivateUserUseCase, DeactivateUserUseCase, DeleteUserUseCase, GetUserUseCase,
    ListUsersUseCase, UpdateRoleUseCase, UpdateUserInput, UpdateUserUseCase,
};

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn list_users(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Vec<UserResponse>>, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    require_admin(&info)?;

    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    if info.user_id != id {
        require_admin(&info)?;
    }

    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(id).await?;
    Ok(Json(UserResponse::from(user)))
}

// ── PUT /users/{id} ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

pub async fn update_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    if info.user_id != id {
        require_admin(&info)?;
    }

    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(
            id,
            UpdateUserInput {
                full_name: body.full_name,
                email: body.email,
            },
        )
        .await?;
    tracing::info!(user_id = %id, "user updated");
    Ok(Json(UserResponse::from(user)))
}

// ── PATCH /users/{id}/activate ───────────────────────────────────────────────

pub async fn activate_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    require_admin(&info)?;

    let usecase = ActivateUserUseCase {
        users: state.user_repo(),
        events: state.event_publisher(),
    };
    usecase.execute(id).await?;
    tracing::info!(user_id = %id, "user activated");
    Ok(Json(
        serde_json::json!({ "message": "user activated successfully" }),
    ))
}

// ── PATCH /users/{id}/deactivate ─────────────────────────────────────────────

pub async fn deactivate_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    require_admin(&info)?;

    let usecase = DeactivateUserUseCase {
        users: state.user_repo(),
        events: state.event_publisher(),
    };
    usecase.execute(id).await?;
    tracing::info!(user_id = %id, "user deactivated");
    Ok(Json(
        serde_json::json!({ "message": "user deactivated successfully" }),
    ))
}

// ── PATCH /users/{id}/role ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

pub async fn update_role(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<serde_json::Value>, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    require_admin(&info)?;

    let role = UserRole::from_str(&body.role).ok_or_else(|| {
        IdentityServiceError::Validation(format!("unknown role: {}", body.role))
    })?;
    let usecase = UpdateRoleUseCase {
        users: state.user_repo(),
    };
    usecase.execute(id, role).await?;
    tracing::info!(user_id = %id, role = role.as_str(), "user role updated");
    Ok(Json(
        serde_json::json!({ "message": format!("user role updated to {}", role.as_str()) }),
    ))
}

// ── DELETE /users/{id} ───────────────────────────────────────────────────────

pub async fn delete_user(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, IdentityServiceError> {
    let info = authenticate(&token, &state.jwt_secret)?;
    require_admin(&info)?;

    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
        events: state.event_publisher(),
    };
    usecase.execute(id).await?;
    tracing::info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
