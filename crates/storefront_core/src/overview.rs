//! Dashboard counters for admins.

use crate::authz;
use crate::domain::{Overview, PaymentStatus};
use crate::error::ServiceResult;
use crate::ports::{DatabaseService, PaymentFilter};

pub async fn overview(db: &dyn DatabaseService, caller: Option<&str>) -> ServiceResult<Overview> {
    authz::require_admin(db, caller).await?;

    let (users, courses, payments) = tokio::try_join!(
        db.list_users(),
        db.list_courses(),
        db.list_payments(PaymentFilter::default()),
    )?;

    let pending_payments = payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Pending)
        .count();
    // Revenue only counts what was actually approved.
    let revenue = payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Approved)
        .map(|p| p.course_price)
        .sum();

    Ok(Overview {
        total_users: users.len(),
        total_courses: courses.len(),
        total_payments: payments.len(),
        pending_payments,
        revenue,
    })
}
