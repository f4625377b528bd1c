//! services/api/src/web/channels.rs
//!
//! Payment channels: the receiving accounts payers send money to.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::{catalog, PaymentChannel};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    middleware::Caller,
    rest::{gate_admin, CreatedResponse, HttpError, JsonBody, MessageResponse},
    state::AppState,
};

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ChannelRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChannelResponse {
    pub id: Uuid,
    pub name: String,
    pub number: String,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentChannel> for ChannelResponse {
    fn from(channel: PaymentChannel) -> Self {
        Self {
            id: channel.id,
            name: channel.name,
            number: channel.number,
            created_at: channel.created_at,
        }
    }
}

/// GET /payment-channels - List receiving accounts
#[utoipa::path(
    get,
    path = "/payment-channels",
    responses((status = 200, description = "All channels", body = [ChannelResponse]))
)]
pub async fn list_channels_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let channels = catalog::list_channels(state.db.as_ref()).await?;
    Ok(Json(
        channels
            .into_iter()
            .map(ChannelResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /payment-channels - Add a receiving account (admin only)
#[utoipa::path(
    post,
    path = "/payment-channels",
    request_body = ChannelRequest,
    params(("admin_uid" = Option<String>, Query, description = "Caller identity")),
    responses(
        (status = 201, description = "Channel added", body = CreatedResponse),
        (status = 400, description = "Name and number are required"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create_channel_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Result<JsonBody<ChannelRequest>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    gate_admin(&state, &caller).await?;
    let JsonBody(req) = body?;
    let channel =
        catalog::create_channel(state.db.as_ref(), caller.as_deref(), &req.name, &req.number)
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Payment method added".to_string(),
            id: channel.id,
        }),
    ))
}

/// PATCH /payment-channels/{id} - Edit a receiving account (admin only)
#[utoipa::path(
    patch,
    path = "/payment-channels/{id}",
    request_body = ChannelRequest,
    params(
        ("id" = Uuid, Path, description = "Channel id"),
        ("admin_uid" = Option<String>, Query, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Channel updated", body = ChannelResponse),
        (status = 400, description = "Name and number are required"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such channel")
    )
)]
pub async fn update_channel_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(channel_id): Path<Uuid>,
    body: Result<JsonBody<ChannelRequest>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    gate_admin(&state, &caller).await?;
    let JsonBody(req) = body?;
    let channel = catalog::update_channel(
        state.db.as_ref(),
        caller.as_deref(),
        channel_id,
        &req.name,
        &req.number,
    )
    .await?;
    Ok(Json(ChannelResponse::from(channel)))
}

/// DELETE /payment-channels/{id} - Remove a receiving account (admin only)
#[utoipa::path(
    delete,
    path = "/payment-channels/{id}",
    params(
        ("id" = Uuid, Path, description = "Channel id"),
        ("admin_uid" = Option<String>, Query, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Channel deleted", body = MessageResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such channel")
    )
)]
pub async fn delete_channel_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(channel_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    catalog::delete_channel(state.db.as_ref(), caller.as_deref(), channel_id).await?;
    Ok(MessageResponse::new("Deleted successfully"))
}
