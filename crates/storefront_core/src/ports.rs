//! crates/storefront_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the storefront's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or mail relays.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Course, CoursePatch, ExternalIdentity, NewCourse, NewPayment, Payment, PaymentChannel,
    PaymentStatus, Role, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Narrows the listing of payments. Empty filter means every payment.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub payer_email: Option<String>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        self.status.map_or(true, |s| payment.status == s)
            && self
                .payer_email
                .as_deref()
                .map_or(true, |e| payment.payer_email == e)
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---

    /// Inserts the user unless one with the same subject exists, then returns the
    /// stored record. The flag is `true` when this call created it.
    async fn get_or_create_user(&self, identity: &ExternalIdentity) -> PortResult<(User, bool)>;

    async fn get_user_by_subject(&self, subject: &str) -> PortResult<User>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn update_user_role(&self, subject: &str, role: Role) -> PortResult<User>;

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()>;

    // --- Courses ---

    /// Newest first.
    async fn list_courses(&self) -> PortResult<Vec<Course>>;

    async fn get_course_by_id(&self, course_id: Uuid) -> PortResult<Course>;

    async fn create_course(&self, course: NewCourse) -> PortResult<Course>;

    async fn update_course(&self, course_id: Uuid, patch: CoursePatch) -> PortResult<Course>;

    async fn delete_course(&self, course_id: Uuid) -> PortResult<()>;

    async fn increment_course_sales(&self, course_id: Uuid) -> PortResult<()>;

    // --- Payment channels ---

    async fn list_payment_channels(&self) -> PortResult<Vec<PaymentChannel>>;

    async fn create_payment_channel(&self, name: &str, number: &str) -> PortResult<PaymentChannel>;

    async fn update_payment_channel(
        &self,
        channel_id: Uuid,
        name: &str,
        number: &str,
    ) -> PortResult<PaymentChannel>;

    async fn delete_payment_channel(&self, channel_id: Uuid) -> PortResult<()>;

    // --- Payments ---

    /// Stores a new payment with status `pending`.
    async fn create_payment(&self, payment: NewPayment) -> PortResult<Payment>;

    async fn get_payment_by_id(&self, payment_id: Uuid) -> PortResult<Payment>;

    /// Newest first.
    async fn list_payments(&self, filter: PaymentFilter) -> PortResult<Vec<Payment>>;

    /// Atomically sets the status to `to` only if the payment currently has status
    /// `from`. Returns `None` when nothing matched (absent, or not in `from`).
    async fn transition_payment(
        &self,
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> PortResult<Option<Payment>>;

    async fn delete_payment(&self, payment_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Sends an HTML email to a single recipient.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> PortResult<()>;
}

#[async_trait]
pub trait ImageStorageService: Send + Sync {
    /// Uploads an image and returns a publicly fetchable URL.
    async fn upload(&self, file_name: &str, data: &[u8]) -> PortResult<String>;
}
