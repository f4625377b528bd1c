//! crates/storefront_core/src/domain.rs
//!
//! Defines the pure, core data structures for the storefront.
//! These structs are independent of any database or wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Users
//=========================================================================================

/// The privilege level of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A local user record, correlated with the identity provider by `subject`.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub subject: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The profile handed over by the identity provider after sign-in.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub subject: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

//=========================================================================================
// Courses
//=========================================================================================

/// A course offered in the storefront.
#[derive(Debug, Clone)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub description: String,
    pub sales: i64,
    pub thumbnail_url: Option<String>,
    /// Private link to the course material. Only sent to approved payers.
    pub delivery_link: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub description: String,
    pub sales: i64,
    pub thumbnail_url: Option<String>,
    pub delivery_link: String,
}

/// A partial update of a course. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub sales: Option<i64>,
    pub thumbnail_url: Option<String>,
    pub delivery_link: Option<String>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.rating.is_none()
            && self.description.is_none()
            && self.sales.is_none()
            && self.thumbnail_url.is_none()
            && self.delivery_link.is_none()
    }

    /// Applies the patch onto an existing course.
    pub fn apply(self, course: &mut Course) {
        if let Some(name) = self.name {
            course.name = name;
        }
        if let Some(price) = self.price {
            course.price = price;
        }
        if let Some(rating) = self.rating {
            course.rating = rating;
        }
        if let Some(description) = self.description {
            course.description = description;
        }
        if let Some(sales) = self.sales {
            course.sales = sales;
        }
        if let Some(thumbnail_url) = self.thumbnail_url {
            course.thumbnail_url = Some(thumbnail_url);
        }
        if let Some(delivery_link) = self.delivery_link {
            course.delivery_link = delivery_link;
        }
    }
}

/// Ratings are kept within [0, 5].
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        return 0.0;
    }
    rating.clamp(0.0, 5.0)
}

//=========================================================================================
// Payments
//=========================================================================================

/// Where a payment sits in its review lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
        }
    }

    /// `approved` and `rejected` admit no further transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        *self == PaymentStatus::Pending && next.is_terminal()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "approved" => Ok(PaymentStatus::Approved),
            "rejected" => Ok(PaymentStatus::Rejected),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

/// The decision an admin can take on a pending payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for PaymentStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => PaymentStatus::Approved,
            Decision::Rejected => PaymentStatus::Rejected,
        }
    }
}

/// A manual payment submitted by a payer, together with the course snapshot
/// captured at submission time.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub payer_name: String,
    pub payer_email: String,
    pub payer_phone: Option<String>,
    pub sender_account: String,
    pub receiver_account: String,
    pub transaction_ref: String,
    pub evidence_url: Option<String>,
    pub course_id: Uuid,
    pub course_name: String,
    pub course_price: f64,
    pub delivery_link: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// What a payer supplies when submitting a payment.
#[derive(Debug, Clone, Default)]
pub struct PaymentSubmission {
    pub payer_name: String,
    pub payer_email: String,
    pub payer_phone: Option<String>,
    pub sender_account: String,
    pub receiver_account: String,
    pub transaction_ref: String,
    pub evidence_url: Option<String>,
    pub course_id: Option<Uuid>,
}

/// A fully validated payment ready to be stored as `pending`.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub payer_name: String,
    pub payer_email: String,
    pub payer_phone: Option<String>,
    pub sender_account: String,
    pub receiver_account: String,
    pub transaction_ref: String,
    pub evidence_url: Option<String>,
    pub course_id: Uuid,
    pub course_name: String,
    pub course_price: f64,
    pub delivery_link: String,
}

//=========================================================================================
// Payment channels
//=========================================================================================

/// A receiving account shown to payers, e.g. a mobile wallet number.
#[derive(Debug, Clone)]
pub struct PaymentChannel {
    pub id: Uuid,
    pub name: String,
    pub number: String,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Overview
//=========================================================================================

/// Counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub total_users: usize,
    pub total_courses: usize,
    pub total_payments: usize,
    pub pending_payments: usize,
    pub revenue: f64,
}
