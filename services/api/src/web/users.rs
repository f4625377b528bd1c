//! services/api/src/web/users.rs
//!
//! Sign-in resolution and admin management of user accounts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::{identity, users, ExternalIdentity, Role, ServiceError, User};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    middleware::Caller,
    rest::{gate_admin, HttpError, JsonBody, MessageResponse},
    state::AppState,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// The profile returned by the identity provider after sign-in.
#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ResolveUserRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SetRoleRequest {
    /// Identity of the user to change.
    #[serde(default)]
    pub subject: String,
    /// `student` or `admin`.
    pub role: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub subject: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            subject: user.subject,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /users/resolve - Map a signed-in identity to a local user
#[utoipa::path(
    post,
    path = "/users/resolve",
    request_body = ResolveUserRequest,
    responses(
        (status = 200, description = "Existing user", body = UserResponse),
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing subject, name or email"),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn resolve_user_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ResolveUserRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let (user, created) = identity::resolve(
        state.db.as_ref(),
        ExternalIdentity {
            subject: req.subject,
            name: req.name,
            email: req.email,
            avatar_url: req.avatar_url,
        },
    )
    .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(UserResponse::from(user))))
}

/// GET /users - List every user (admin only)
#[utoipa::path(
    get,
    path = "/users",
    params(("admin_uid" = Option<String>, Query, description = "Caller identity")),
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, HttpError> {
    let users = users::list(state.db.as_ref(), caller.as_deref()).await?;
    Ok(Json(
        users.into_iter().map(UserResponse::from).collect::<Vec<_>>(),
    ))
}

/// PATCH /users/role - Change another user's role (admin only)
#[utoipa::path(
    patch,
    path = "/users/role",
    request_body = SetRoleRequest,
    params(("admin_uid" = Option<String>, Query, description = "Caller identity")),
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Unknown role or missing subject"),
        (status = 403, description = "Caller is not an admin, or targets themselves"),
        (status = 404, description = "No such user")
    )
)]
pub async fn set_role_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Result<JsonBody<SetRoleRequest>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    gate_admin(&state, &caller).await?;
    let JsonBody(req) = body?;
    let role = req
        .role
        .parse::<Role>()
        .map_err(|e| HttpError::from(ServiceError::Validation(e)))?;

    let user = users::set_role(state.db.as_ref(), caller.as_deref(), &req.subject, role).await?;
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /users/{id} - Delete another user (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "Record id of the user to delete"),
        ("admin_uid" = Option<String>, Query, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Caller is not an admin, or targets themselves"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    users::delete(state.db.as_ref(), caller.as_deref(), user_id).await?;
    Ok(MessageResponse::new("Deleted successfully"))
}
