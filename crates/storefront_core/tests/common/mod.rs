//! Shared fixtures for the storefront integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use storefront_core::domain::{NewCourse, NewPayment};
use storefront_core::{
    users, Course, CoursePatch, DatabaseService, DeliveryNotifier, ExternalIdentity,
    InMemoryDatabase, NotificationService, Payment, PaymentChannel, PaymentFilter,
    PaymentStatus, PaymentSubmission, PortError, PortResult, Role, User,
};
use tokio::sync::Mutex;
use uuid::Uuid;

/// One captured `send` call.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Records every email instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> PortResult<()> {
        self.sent.lock().await.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// A mail relay that is always down.
pub struct FailingNotifier;

#[async_trait]
impl NotificationService for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> PortResult<()> {
        Err(PortError::Unexpected("SMTP relay refused connection".to_string()))
    }
}

/// A mail relay that never answers.
pub struct HangingNotifier;

#[async_trait]
impl NotificationService for HangingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> PortResult<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// A store whose every call fails.
pub struct UnreachableDatabase;

fn down<T>() -> PortResult<T> {
    Err(PortError::Unexpected("connection refused".to_string()))
}

#[async_trait]
impl DatabaseService for UnreachableDatabase {
    async fn get_or_create_user(&self, _: &ExternalIdentity) -> PortResult<(User, bool)> {
        down()
    }
    async fn get_user_by_subject(&self, _: &str) -> PortResult<User> {
        down()
    }
    async fn list_users(&self) -> PortResult<Vec<User>> {
        down()
    }
    async fn update_user_role(&self, _: &str, _: Role) -> PortResult<User> {
        down()
    }
    async fn delete_user(&self, _: Uuid) -> PortResult<()> {
        down()
    }
    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        down()
    }
    async fn get_course_by_id(&self, _: Uuid) -> PortResult<Course> {
        down()
    }
    async fn create_course(&self, _: NewCourse) -> PortResult<Course> {
        down()
    }
    async fn update_course(&self, _: Uuid, _: CoursePatch) -> PortResult<Course> {
        down()
    }
    async fn delete_course(&self, _: Uuid) -> PortResult<()> {
        down()
    }
    async fn increment_course_sales(&self, _: Uuid) -> PortResult<()> {
        down()
    }
    async fn list_payment_channels(&self) -> PortResult<Vec<PaymentChannel>> {
        down()
    }
    async fn create_payment_channel(&self, _: &str, _: &str) -> PortResult<PaymentChannel> {
        down()
    }
    async fn update_payment_channel(&self, _: Uuid, _: &str, _: &str) -> PortResult<PaymentChannel> {
        down()
    }
    async fn delete_payment_channel(&self, _: Uuid) -> PortResult<()> {
        down()
    }
    async fn create_payment(&self, _: NewPayment) -> PortResult<Payment> {
        down()
    }
    async fn get_payment_by_id(&self, _: Uuid) -> PortResult<Payment> {
        down()
    }
    async fn list_payments(&self, _: PaymentFilter) -> PortResult<Vec<Payment>> {
        down()
    }
    async fn transition_payment(
        &self,
        _: Uuid,
        _: PaymentStatus,
        _: PaymentStatus,
    ) -> PortResult<Option<Payment>> {
        down()
    }
    async fn delete_payment(&self, _: Uuid) -> PortResult<()> {
        down()
    }
}

pub const ADMIN: &str = "firebase-admin-1";
pub const STUDENT: &str = "firebase-student-1";

pub fn identity(subject: &str, email: &str) -> ExternalIdentity {
    ExternalIdentity {
        subject: subject.to_string(),
        name: format!("User {}", subject),
        email: email.to_string(),
        avatar_url: None,
    }
}

/// A store with one admin, one student and the course "X" priced 500.
pub async fn seeded() -> (InMemoryDatabase, User, User, Course) {
    let db = InMemoryDatabase::new();
    let admin = users::bootstrap_admin(&db, identity(ADMIN, "admin@example.com"))
        .await
        .unwrap();
    let (student, _) = db
        .get_or_create_user(&identity(STUDENT, "student@example.com"))
        .await
        .unwrap();
    let course = db
        .create_course(NewCourse {
            name: "X".to_string(),
            price: 500.0,
            rating: 4.5,
            description: "Course X".to_string(),
            sales: 0,
            thumbnail_url: None,
            delivery_link: "https://drive.example.com/folders/x".to_string(),
        })
        .await
        .unwrap();
    (db, admin, student, course)
}

pub fn submission(course_id: Uuid) -> PaymentSubmission {
    PaymentSubmission {
        payer_name: "Rahim".to_string(),
        payer_email: "rahim@example.com".to_string(),
        payer_phone: None,
        sender_account: "01811111111".to_string(),
        receiver_account: "Bkash:01700000000".to_string(),
        transaction_ref: "TRX1".to_string(),
        evidence_url: None,
        course_id: Some(course_id),
    }
}

pub fn delivery(notifier: Arc<dyn NotificationService>) -> Arc<DeliveryNotifier> {
    Arc::new(DeliveryNotifier::new(notifier, Duration::from_millis(200)))
}
