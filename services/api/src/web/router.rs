//! services/api/src/web/router.rs
//!
//! Assembles the REST routes and the layers shared by all of them.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ConfigError;
use crate::web::{
    admin, channels, courses,
    middleware::{extract_caller, ADMIN_HEADER},
    payments,
    state::AppState,
    uploads, users,
};

/// Builds the application router.
///
/// The caller identity is extracted on every route; public handlers ignore it.
pub fn router(state: Arc<AppState>) -> Result<Router, ConfigError> {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string()))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT, HeaderName::from_static(ADMIN_HEADER)]);

    // Handlers for privileged routes run the caller through the admin gate;
    // the rest are open to anyone.
    let routes = Router::new()
        .route("/users/resolve", post(users::resolve_user_handler))
        .route("/users", get(users::list_users_handler))
        .route("/users/role", patch(users::set_role_handler))
        .route("/users/{id}", delete(users::delete_user_handler))
        .route(
            "/courses",
            get(courses::list_courses_handler).post(courses::create_course_handler),
        )
        .route(
            "/courses/{id}",
            get(courses::get_course_handler)
                .patch(courses::update_course_handler)
                .delete(courses::delete_course_handler),
        )
        .route(
            "/payment-channels",
            get(channels::list_channels_handler).post(channels::create_channel_handler),
        )
        .route(
            "/payment-channels/{id}",
            patch(channels::update_channel_handler).delete(channels::delete_channel_handler),
        )
        .route(
            "/payments",
            get(payments::list_payments_handler).post(payments::submit_payment_handler),
        )
        .route("/payments/history", get(payments::payment_history_handler))
        .route("/payments/{id}", delete(payments::delete_payment_handler))
        .route(
            "/payments/{id}/decision",
            patch(payments::decide_payment_handler),
        )
        .route("/uploads", post(uploads::upload_image_handler))
        .route("/admin/courses", get(courses::list_admin_courses_handler))
        .route("/admin/overview", get(admin::overview_handler));

    Ok(routes
        .layer(axum_middleware::from_fn(extract_caller))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}
