//! crates/storefront_core/src/payments.rs
//!
//! The payment lifecycle: submission, admin review and archival cleanup.
//!
//! A payment starts `pending` and can leave that state exactly once, to either
//! `approved` or `rejected`. Both are terminal.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::authz;
use crate::delivery::DeliveryNotifier;
use crate::domain::{Decision, NewPayment, Payment, PaymentStatus, PaymentSubmission};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, PaymentFilter, PortError};
use crate::validation;

/// The result of a successful decision.
#[derive(Debug)]
pub struct DecideOutcome {
    pub payment: Payment,
    /// The background delivery email, present only for approvals.
    pub delivery: Option<JoinHandle<()>>,
}

/// Stores a new `pending` payment. Open to anyone.
///
/// The course name, price and delivery link are copied from the course record,
/// so later edits to the course never rewrite a historical payment.
pub async fn submit(db: &dyn DatabaseService, submission: PaymentSubmission) -> ServiceResult<Payment> {
    let payer_name = validation::required("name", &submission.payer_name)?;
    let payer_email = validation::email("email", &submission.payer_email)?;
    let receiver_account = validation::required("receive_number", &submission.receiver_account)?;
    let sender_account = validation::required("sender_number", &submission.sender_account)?;
    let transaction_ref = validation::required("transaction_id", &submission.transaction_ref)?;
    let course_id = submission
        .course_id
        .ok_or_else(|| ServiceError::Validation("course_id is required".to_string()))?;

    let course = match db.get_course_by_id(course_id).await {
        Ok(course) => course,
        Err(PortError::NotFound(_)) => {
            return Err(ServiceError::Validation(format!(
                "course {} does not exist",
                course_id
            )))
        }
        Err(e) => return Err(e.into()),
    };

    let payment = db
        .create_payment(NewPayment {
            payer_name,
            payer_email,
            payer_phone: validation::optional(submission.payer_phone),
            sender_account,
            receiver_account,
            transaction_ref,
            evidence_url: validation::optional(submission.evidence_url),
            course_id: course.id,
            course_name: course.name,
            course_price: course.price,
            delivery_link: course.delivery_link,
        })
        .await?;

    info!(payment_id = %payment.id, course_id = %payment.course_id, "Payment submitted");
    Ok(payment)
}

/// Every payment, newest first, optionally narrowed to one status. Admin only.
pub async fn list(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    status: Option<PaymentStatus>,
) -> ServiceResult<Vec<Payment>> {
    authz::require_admin(db, caller).await?;
    Ok(db
        .list_payments(PaymentFilter {
            status,
            payer_email: None,
        })
        .await?)
}

/// The payer's own payments, newest first. Needs only the payer's email.
pub async fn history(db: &dyn DatabaseService, email: &str) -> ServiceResult<Vec<Payment>> {
    let email = validation::email("email", email)?;
    Ok(db
        .list_payments(PaymentFilter {
            status: None,
            payer_email: Some(email),
        })
        .await?)
}

/// Approves or rejects a pending payment. Admin only.
///
/// The check that the payment is still `pending` and the status write happen in a
/// single conditional update, so two concurrent decisions cannot both succeed.
/// An approval bumps the course's sales counter and dispatches the delivery
/// email; neither side effect can fail the decision.
pub async fn decide(
    db: &dyn DatabaseService,
    delivery: &Arc<DeliveryNotifier>,
    caller: Option<&str>,
    payment_id: Uuid,
    decision: Decision,
) -> ServiceResult<DecideOutcome> {
    let admin = authz::require_admin(db, caller).await?;
    let target = PaymentStatus::from(decision);

    let payment = match db
        .transition_payment(payment_id, PaymentStatus::Pending, target)
        .await?
    {
        Some(payment) => payment,
        None => {
            let current = db.get_payment_by_id(payment_id).await?;
            return Err(ServiceError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }
    };

    info!(
        payment_id = %payment.id,
        status = %payment.status,
        admin = %admin.subject,
        "Payment decided"
    );

    if target != PaymentStatus::Approved {
        return Ok(DecideOutcome {
            payment,
            delivery: None,
        });
    }

    if let Err(e) = db.increment_course_sales(payment.course_id).await {
        warn!(course_id = %payment.course_id, error = %e, "Could not update course sales");
    }

    let handle = delivery.dispatch(&payment);
    Ok(DecideOutcome {
        payment,
        delivery: Some(handle),
    })
}

/// Removes a payment regardless of its status. Admin only.
pub async fn archive_delete(
    db: &dyn DatabaseService,
    caller: Option<&str>,
    payment_id: Uuid,
) -> ServiceResult<()> {
    authz::require_admin(db, caller).await?;
    db.delete_payment(payment_id).await?;
    info!(payment_id = %payment_id, "Payment deleted");
    Ok(())
}
