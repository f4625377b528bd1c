//! services/api/src/web/rest.rs
//!
//! Shared pieces of the REST surface: the master OpenAPI
//! document, the error response, and a JSON extractor that reports malformed
//! bodies as 400.

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use storefront_core::{authz, ServiceError};
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::{
    admin, channels, courses, middleware::Caller, payments, state::AppState, uploads, users,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        users::resolve_user_handler,
        users::list_users_handler,
        users::set_role_handler,
        users::delete_user_handler,
        courses::list_courses_handler,
        courses::get_course_handler,
        courses::list_admin_courses_handler,
        courses::create_course_handler,
        courses::update_course_handler,
        courses::delete_course_handler,
        channels::list_channels_handler,
        channels::create_channel_handler,
        channels::update_channel_handler,
        channels::delete_channel_handler,
        payments::submit_payment_handler,
        payments::list_payments_handler,
        payments::payment_history_handler,
        payments::decide_payment_handler,
        payments::delete_payment_handler,
        uploads::upload_image_handler,
        admin::overview_handler,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            CreatedResponse,
            users::ResolveUserRequest,
            users::SetRoleRequest,
            users::UserResponse,
            courses::CourseRequest,
            courses::CourseUpdateRequest,
            courses::CourseResponse,
            courses::AdminCourseResponse,
            channels::ChannelRequest,
            channels::ChannelResponse,
            payments::SubmitPaymentRequest,
            payments::DecisionRequest,
            payments::PaymentResponse,
            payments::DecisionResponse,
            uploads::UploadForm,
            uploads::UploadResponse,
            admin::OverviewResponse,
        )
    ),
    tags(
        (name = "Storefront API", description = "Course catalog, manual payments and the admin back office.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct CreatedResponse {
    pub message: String,
    pub id: Uuid,
}

//=========================================================================================
// Errors
//=========================================================================================

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum HttpError {
    Service(ServiceError),
    /// The request could not be parsed at all.
    BadRequest(String),
    /// A collaborator the route depends on is not configured.
    Unavailable(String),
    /// A collaborator call failed.
    Upstream(String),
}

impl From<ServiceError> for HttpError {
    fn from(e: ServiceError) -> Self {
        HttpError::Service(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Service(ServiceError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Service(ServiceError::Forbidden) => {
                (StatusCode::FORBIDDEN, "Forbidden".to_string())
            }
            HttpError::Service(ServiceError::NotFound(what)) => (StatusCode::NOT_FOUND, what),
            HttpError::Service(e @ ServiceError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            HttpError::Service(ServiceError::StoreUnavailable(e)) => {
                error!(error = %e, "Store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            HttpError::Upstream(e) => {
                error!(error = %e, "Upstream failure");
                (StatusCode::BAD_GATEWAY, "Upstream service failed".to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

//=========================================================================================
// Extractors
//=========================================================================================

/// Like `Json<T>`, but any rejection (bad syntax, wrong types, unknown fields)
/// answers 400 with the standard error body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(HttpError::BadRequest(rejection.body_text())),
        }
    }
}

//=========================================================================================
// Admin Gate
//=========================================================================================

/// Runs the admin gate before a privileged handler looks at its input, so a
/// non-admin is answered 403 whatever the request contains.
///
/// Handlers take their body as `Result<JsonBody<T>, HttpError>` and only unwrap
/// it after this check.
pub async fn gate_admin(state: &AppState, caller: &Caller) -> Result<(), HttpError> {
    authz::require_admin(state.db.as_ref(), caller.as_deref()).await?;
    Ok(())
}
