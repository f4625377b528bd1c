//! crates/storefront_core/src/catalog.rs
//!
//! Courses and payment channels. Anyone can read them; only admins change them.

use tracing::info;
use uuid::Uuid;

use crate::authz;
use crate::domain::{clamp_rating, Course, CoursePatch, NewCourse, PaymentChannel};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::DatabaseService;
use crate::validation;

//=========================================================================================
// Courses
//=========================================================================================

pub async fn list_courses(db: &dyn DatabaseService) -> ServiceResult<Vec<Course>> {
    Ok(db.list_courses().await?)
}

pub async fn get_course(db: &dyn DatabaseService, course_id: Uuid) -> ServiceResult<Course> {
    Ok(db.get_course_by_id(course_id).await?)
}

/// Every course including its delivery link. Admin only.
pub async fn list_courses_for_admin(
    db: &dyn DatabaseService,
    caller: Option<&str>,
) -> ServiceResult<Vec<Course>> {
    authz::require_admin(db, caller).await?;
    Ok(db.list_courses().await?)
}

pub async fn create_course(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    course: NewCourse,
) -> ServiceResult<Course> {
    authz::require_admin(db, caller).await?;

    let course = NewCourse {
        name: validation::required("course_name", &course.name)?,
        price: validation::non_negative_price(course.price)?,
        rating: clamp_rating(course.rating),
        description: course.description.trim().to_string(),
        sales: validation::non_negative_count("course_sell", course.sales)?,
        thumbnail_url: validation::optional(course.thumbnail_url),
        delivery_link: validation::required("drive_link", &course.delivery_link)?,
    };

    let course = db.create_course(course).await?;
    info!(course_id = %course.id, name = %course.name, "Course created");
    Ok(course)
}

pub async fn update_course(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    course_id: Uuid,
    patch: CoursePatch,
) -> ServiceResult<Course> {
    authz::require_admin(db, caller).await?;
    if patch.is_empty() {
        return Err(ServiceError::Validation("nothing to update".to_string()));
    }

    let patch = CoursePatch {
        name: patch
            .name
            .map(|n| validation::required("course_name", &n))
            .transpose()?,
        price: patch.price.map(validation::non_negative_price).transpose()?,
        rating: patch.rating.map(clamp_rating),
        description: patch.description.map(|d| d.trim().to_string()),
        sales: patch
            .sales
            .map(|s| validation::non_negative_count("course_sell", s))
            .transpose()?,
        thumbnail_url: validation::optional(patch.thumbnail_url),
        delivery_link: patch
            .delivery_link
            .map(|l| validation::required("drive_link", &l))
            .transpose()?,
    };

    let course = db.update_course(course_id, patch).await?;
    info!(course_id = %course.id, "Course updated");
    Ok(course)
}

pub async fn delete_course(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    course_id: Uuid,
) -> ServiceResult<()> {
    authz::require_admin(db, caller).await?;
    db.delete_course(course_id).await?;
    info!(course_id = %course_id, "Course deleted");
    Ok(())
}

//=========================================================================================
// Payment channels
//=========================================================================================

pub async fn list_channels(db: &dyn DatabaseService) -> ServiceResult<Vec<PaymentChannel>> {
    Ok(db.list_payment_channels().await?)
}

pub async fn create_channel(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    name: &str,
    number: &str,
) -> ServiceResult<PaymentChannel> {
    authz::require_admin(db, caller).await?;
    let name = validation::required("name", name)?;
    let number = validation::required("number", number)?;

    let channel = db.create_payment_channel(&name, &number).await?;
    info!(channel_id = %channel.id, name = %channel.name, "Payment channel added");
    Ok(channel)
}

pub async fn update_channel(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    channel_id: Uuid,
    name: &str,
    number: &str,
) -> ServiceResult<PaymentChannel> {
    authz::require_admin(db, caller).await?;
    let name = validation::required("name", name)?;
    let number = validation::required("number", number)?;

    Ok(db.update_payment_channel(channel_id, &name, &number).await?)
}

pub async fn delete_channel(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    channel_id: Uuid,
) -> ServiceResult<()> {
    authz::require_admin(db, caller).await?;
    db.delete_payment_channel(channel_id).await?;
    info!(channel_id = %channel_id, "Payment channel deleted");
    Ok(())
}
