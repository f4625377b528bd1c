//! services/api/src/web/courses.rs
//!
//! The public course catalog and its admin management.
//!
//! Public reads never include the delivery link; it only reaches payers through
//! the approval email.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::{catalog, Course, CoursePatch, NewCourse};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    middleware::Caller,
    rest::{gate_admin, CreatedResponse, HttpError, JsonBody, MessageResponse},
    state::AppState,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CourseRequest {
    #[serde(default)]
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sales: i64,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub delivery_link: String,
}

/// Every field is optional; absent fields are left as they are.
#[derive(Deserialize, ToSchema, Default)]
#[serde(deny_unknown_fields)]
pub struct CourseUpdateRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub sales: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub delivery_link: Option<String>,
}

/// A course as shown in the storefront.
#[derive(Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub description: String,
    pub sales: i64,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            price: course.price,
            rating: course.rating,
            description: course.description,
            sales: course.sales,
            thumbnail_url: course.thumbnail_url,
            created_at: course.created_at,
        }
    }
}

/// A course as seen by admins, including the private delivery link.
#[derive(Serialize, ToSchema)]
pub struct AdminCourseResponse {
    #[serde(flatten)]
    pub course: CourseResponse,
    pub delivery_link: String,
}

impl From<Course> for AdminCourseResponse {
    fn from(course: Course) -> Self {
        let delivery_link = course.delivery_link.clone();
        Self {
            course: CourseResponse::from(course),
            delivery_link,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /courses - List courses, newest first
#[utoipa::path(
    get,
    path = "/courses",
    responses((status = 200, description = "All courses", body = [CourseResponse]))
)]
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let courses = catalog::list_courses(state.db.as_ref()).await?;
    Ok(Json(
        courses
            .into_iter()
            .map(CourseResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /courses/{id} - Fetch one course
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "The course", body = CourseResponse),
        (status = 404, description = "No such course")
    )
)]
pub async fn get_course_handler(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let course = catalog::get_course(state.db.as_ref(), course_id).await?;
    Ok(Json(CourseResponse::from(course)))
}

/// GET /admin/courses - List courses with their delivery links (admin only)
#[utoipa::path(
    get,
    path = "/admin/courses",
    params(("admin_uid" = Option<String>, Query, description = "Caller identity")),
    responses(
        (status = 200, description = "All courses", body = [AdminCourseResponse]),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_admin_courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, HttpError> {
    let courses = catalog::list_courses_for_admin(state.db.as_ref(), caller.as_deref()).await?;
    Ok(Json(
        courses
            .into_iter()
            .map(AdminCourseResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /courses - Add a course (admin only)
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CourseRequest,
    params(("admin_uid" = Option<String>, Query, description = "Caller identity")),
    responses(
        (status = 201, description = "Course added", body = CreatedResponse),
        (status = 400, description = "Invalid course"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    body: Result<JsonBody<CourseRequest>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    gate_admin(&state, &caller).await?;
    let JsonBody(req) = body?;
    let course = catalog::create_course(
        state.db.as_ref(),
        caller.as_deref(),
        NewCourse {
            name: req.name,
            price: req.price,
            rating: req.rating,
            description: req.description,
            sales: req.sales,
            thumbnail_url: req.thumbnail_url,
            delivery_link: req.delivery_link,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Course added successfully".to_string(),
            id: course.id,
        }),
    ))
}

/// PATCH /courses/{id} - Update a course (admin only)
#[utoipa::path(
    patch,
    path = "/courses/{id}",
    request_body = CourseUpdateRequest,
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("admin_uid" = Option<String>, Query, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Course updated", body = AdminCourseResponse),
        (status = 400, description = "Invalid update"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such course")
    )
)]
pub async fn update_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(course_id): Path<Uuid>,
    body: Result<JsonBody<CourseUpdateRequest>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    gate_admin(&state, &caller).await?;
    let JsonBody(req) = body?;
    let course = catalog::update_course(
        state.db.as_ref(),
        caller.as_deref(),
        course_id,
        CoursePatch {
            name: req.name,
            price: req.price,
            rating: req.rating,
            description: req.description,
            sales: req.sales,
            thumbnail_url: req.thumbnail_url,
            delivery_link: req.delivery_link,
        },
    )
    .await?;
    Ok(Json(AdminCourseResponse::from(course)))
}

/// DELETE /courses/{id} - Remove a course (admin only)
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("admin_uid" = Option<String>, Query, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such course")
    )
)]
pub async fn delete_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    catalog::delete_course(state.db.as_ref(), caller.as_deref(), course_id).await?;
    Ok(MessageResponse::new("Course deleted successfully"))
}
