//! crates/storefront_core/src/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port.
//!
//! Every operation takes the single lock for its whole duration, which gives the
//! same single-record atomicity the SQL adapter gets from conditional updates.
//! Used for local runs without PostgreSQL and in tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Course, CoursePatch, ExternalIdentity, NewCourse, NewPayment, Payment, PaymentChannel,
    PaymentStatus, Role, User,
};
use crate::ports::{DatabaseService, PaymentFilter, PortError, PortResult};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    courses: Vec<Course>,
    channels: Vec<PaymentChannel>,
    payments: Vec<Payment>,
}

#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; records created in the same instant keep reverse insertion order.
fn newest_first<T: Clone>(rows: &[T], created_at: impl Fn(&T) -> chrono::DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    out
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("{} {} not found", kind, id))
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn get_or_create_user(&self, identity: &ExternalIdentity) -> PortResult<(User, bool)> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.users.iter().find(|u| u.subject == identity.subject) {
            return Ok((existing.clone(), false));
        }

        let user = User {
            id: Uuid::new_v4(),
            subject: identity.subject.clone(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            avatar_url: identity.avatar_url.clone(),
            role: Role::Student,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok((user, true))
    }

    async fn get_user_by_subject(&self, subject: &str) -> PortResult<User> {
        let tables = self.tables.lock().await;
        tables
            .users
            .iter()
            .find(|u| u.subject == subject)
            .cloned()
            .ok_or_else(|| not_found("User", subject))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.clone())
    }

    async fn update_user_role(&self, subject: &str, role: Role) -> PortResult<User> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.subject == subject)
            .ok_or_else(|| not_found("User", subject))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != user_id);
        if tables.users.len() == before {
            return Err(not_found("User", user_id));
        }
        Ok(())
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(&tables.courses, |c| c.created_at))
    }

    async fn get_course_by_id(&self, course_id: Uuid) -> PortResult<Course> {
        let tables = self.tables.lock().await;
        tables
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or_else(|| not_found("Course", course_id))
    }

    async fn create_course(&self, course: NewCourse) -> PortResult<Course> {
        let mut tables = self.tables.lock().await;
        let course = Course {
            id: Uuid::new_v4(),
            name: course.name,
            price: course.price,
            rating: course.rating,
            description: course.description,
            sales: course.sales,
            thumbnail_url: course.thumbnail_url,
            delivery_link: course.delivery_link,
            created_at: Utc::now(),
        };
        tables.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, course_id: Uuid, patch: CoursePatch) -> PortResult<Course> {
        let mut tables = self.tables.lock().await;
        let course = tables
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| not_found("Course", course_id))?;
        patch.apply(course);
        Ok(course.clone())
    }

    async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.courses.len();
        tables.courses.retain(|c| c.id != course_id);
        if tables.courses.len() == before {
            return Err(not_found("Course", course_id));
        }
        Ok(())
    }

    async fn increment_course_sales(&self, course_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        let course = tables
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| not_found("Course", course_id))?;
        course.sales += 1;
        Ok(())
    }

    async fn list_payment_channels(&self) -> PortResult<Vec<PaymentChannel>> {
        let tables = self.tables.lock().await;
        Ok(tables.channels.clone())
    }

    async fn create_payment_channel(&self, name: &str, number: &str) -> PortResult<PaymentChannel> {
        let mut tables = self.tables.lock().await;
        let channel = PaymentChannel {
            id: Uuid::new_v4(),
            name: name.to_string(),
            number: number.to_string(),
            created_at: Utc::now(),
        };
        tables.channels.push(channel.clone());
        Ok(channel)
    }

    async fn update_payment_channel(
        &self,
        channel_id: Uuid,
        name: &str,
        number: &str,
    ) -> PortResult<PaymentChannel> {
        let mut tables = self.tables.lock().await;
        let channel = tables
            .channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| not_found("Payment channel", channel_id))?;
        channel.name = name.to_string();
        channel.number = number.to_string();
        Ok(channel.clone())
    }

    async fn delete_payment_channel(&self, channel_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.channels.len();
        tables.channels.retain(|c| c.id != channel_id);
        if tables.channels.len() == before {
            return Err(not_found("Payment channel", channel_id));
        }
        Ok(())
    }

    async fn create_payment(&self, payment: NewPayment) -> PortResult<Payment> {
        let mut tables = self.tables.lock().await;
        let payment = Payment {
            id: Uuid::new_v4(),
            payer_name: payment.payer_name,
            payer_email: payment.payer_email,
            payer_phone: payment.payer_phone,
            sender_account: payment.sender_account,
            receiver_account: payment.receiver_account,
            transaction_ref: payment.transaction_ref,
            evidence_url: payment.evidence_url,
            course_id: payment.course_id,
            course_name: payment.course_name,
            course_price: payment.course_price,
            delivery_link: payment.delivery_link,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        };
        tables.payments.push(payment.clone());
        Ok(payment)
    }

    async fn get_payment_by_id(&self, payment_id: Uuid) -> PortResult<Payment> {
        let tables = self.tables.lock().await;
        tables
            .payments
            .iter()
            .find(|p| p.id == payment_id)
            .cloned()
            .ok_or_else(|| not_found("Payment", payment_id))
    }

    async fn list_payments(&self, filter: PaymentFilter) -> PortResult<Vec<Payment>> {
        let tables = self.tables.lock().await;
        let matching: Vec<Payment> = tables
            .payments
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |p| p.created_at))
    }

    async fn transition_payment(
        &self,
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> PortResult<Option<Payment>> {
        let mut tables = self.tables.lock().await;
        let payment = tables
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id && p.status == from);
        Ok(payment.map(|p| {
            p.status = to;
            p.clone()
        }))
    }

    async fn delete_payment(&self, payment_id: Uuid) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        let before = tables.payments.len();
        tables.payments.retain(|p| p.id != payment_id);
        if tables.payments.len() == before {
            return Err(not_found("Payment", payment_id));
        }
        Ok(())
    }
}
