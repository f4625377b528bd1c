//! services/api/src/web/admin.rs

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use serde::Serialize;
use std::sync::Arc;
use storefront_core::{overview, Overview};
use utoipa::ToSchema;

use crate::web::{middleware::Caller, rest::HttpError, state::AppState};

/// Dashboard counters.
#[derive(Serialize, ToSchema)]
pub struct OverviewResponse {
    pub total_users: usize,
    pub total_courses: usize,
    pub total_payments: usize,
    pub pending_payments: usize,
    /// Sum of the prices of approved payments.
    pub revenue: f64,
}

impl From<Overview> for OverviewResponse {
    fn from(o: Overview) -> Self {
        Self {
            total_users: o.total_users,
            total_courses: o.total_courses,
            total_payments: o.total_payments,
            pending_payments: o.pending_payments,
            revenue: o.revenue,
        }
    }
}

/// GET /admin/overview - Dashboard counters (admin only)
#[utoipa::path(
    get,
    path = "/admin/overview",
    params(("admin_uid" = Option<String>, Query, description = "Caller identity")),
    responses(
        (status = 200, description = "Counters", body = OverviewResponse),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn overview_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, HttpError> {
    let overview = overview::overview(state.db.as_ref(), caller.as_deref()).await?;
    Ok(Json(OverviewResponse::from(overview)))
}
