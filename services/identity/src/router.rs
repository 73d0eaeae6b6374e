use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use tower_http::trace::TraceLayer;

use storefront_core::health::{healthz, readyz};
use storefront_core::middleware::request_id_layer;

use crate::handlers::auth::{
    change_password, confirm_email, forgot_password, login, me, register, reset_password,
};
use crate::handlers::users::{
    activate_user, deactivate_user, delete_user, get_user, list_users, update_role, update_user,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Credentials
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/confirm-email", post(confirm_email))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/change-password", post(change_password))
        .route("/auth/me", get(me))
        // Accounts (administrative)
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}", put(update_user))
        .route("/users/{id}", delete(delete_user))
        .route("/users/{id}/activate", patch(activate_user))
        .route("/users/{id}/deactivate", patch(deactivate_user))
        .route("/users/{id}/role", patch(update_role))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
