//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use storefront_core::domain::{
    Course, CoursePatch, ExternalIdentity, NewCourse, NewPayment, Payment, PaymentChannel,
    PaymentStatus, Role, User,
};
use storefront_core::ports::{DatabaseService, PaymentFilter, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("{} {} not found", kind, id))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "id, subject, name, email, avatar_url, role, created_at";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    subject: String,
    name: String,
    email: String,
    avatar_url: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            subject: self.subject,
            name: self.name,
            email: self.email,
            avatar_url: self.avatar_url,
            role: self.role.parse::<Role>().map_err(PortError::Unexpected)?,
            created_at: self.created_at,
        })
    }
}

const COURSE_COLUMNS: &str =
    "id, name, price, rating, description, sales, thumbnail_url, delivery_link, created_at";

#[derive(FromRow)]
struct CourseRecord {
    id: Uuid,
    name: String,
    price: f64,
    rating: f64,
    description: String,
    sales: i64,
    thumbnail_url: Option<String>,
    delivery_link: String,
    created_at: DateTime<Utc>,
}
impl CourseRecord {
    fn to_domain(self) -> Course {
        Course {
            id: self.id,
            name: self.name,
            price: self.price,
            rating: self.rating,
            description: self.description,
            sales: self.sales,
            thumbnail_url: self.thumbnail_url,
            delivery_link: self.delivery_link,
            created_at: self.created_at,
        }
    }
}

const CHANNEL_COLUMNS: &str = "id, name, number, created_at";

#[derive(FromRow)]
struct ChannelRecord {
    id: Uuid,
    name: String,
    number: String,
    created_at: DateTime<Utc>,
}
impl ChannelRecord {
    fn to_domain(self) -> PaymentChannel {
        PaymentChannel {
            id: self.id,
            name: self.name,
            number: self.number,
            created_at: self.created_at,
        }
    }
}

const PAYMENT_COLUMNS: &str = "id, payer_name, payer_email, payer_phone, sender_account, \
     receiver_account, transaction_ref, evidence_url, course_id, course_name, course_price, \
     delivery_link, status, created_at";

#[derive(FromRow)]
struct PaymentRecord {
    id: Uuid,
    payer_name: String,
    payer_email: String,
    payer_phone: Option<String>,
    sender_account: String,
    receiver_account: String,
    transaction_ref: String,
    evidence_url: Option<String>,
    course_id: Uuid,
    course_name: String,
    course_price: f64,
    delivery_link: String,
    status: String,
    created_at: DateTime<Utc>,
}
impl PaymentRecord {
    fn to_domain(self) -> PortResult<Payment> {
        Ok(Payment {
            id: self.id,
            payer_name: self.payer_name,
            payer_email: self.payer_email,
            payer_phone: self.payer_phone,
            sender_account: self.sender_account,
            receiver_account: self.receiver_account,
            transaction_ref: self.transaction_ref,
            evidence_url: self.evidence_url,
            course_id: self.course_id,
            course_name: self.course_name,
            course_price: self.course_price,
            delivery_link: self.delivery_link,
            status: self
                .status
                .parse::<PaymentStatus>()
                .map_err(PortError::Unexpected)?,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_or_create_user(&self, identity: &ExternalIdentity) -> PortResult<(User, bool)> {
        let inserted = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, subject, name, email, avatar_url, role) \
             VALUES ($1, $2, $3, $4, $5, 'student') \
             ON CONFLICT (subject) DO NOTHING RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&identity.subject)
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        if let Some(record) = inserted {
            return Ok((record.to_domain()?, true));
        }

        let existing = self.get_user_by_subject(&identity.subject).await?;
        Ok((existing, false))
    }

    async fn get_user_by_subject(&self, subject: &str) -> PortResult<User> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE subject = $1",
            USER_COLUMNS
        ))
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| not_found("User", subject))?
        .to_domain()
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_user_role(&self, subject: &str, role: Role) -> PortResult<User> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET role = $1 WHERE subject = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| not_found("User", subject))?
        .to_domain()
    }

    async fn delete_user(&self, user_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(not_found("User", user_id));
        }
        Ok(())
    }

    async fn list_courses(&self) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {} FROM courses ORDER BY created_at DESC",
            COURSE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_course_by_id(&self, course_id: Uuid) -> PortResult<Course> {
        let record = sqlx::query_as::<_, CourseRecord>(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| not_found("Course", course_id))?;
        Ok(record.to_domain())
    }

    async fn create_course(&self, course: NewCourse) -> PortResult<Course> {
        let record = sqlx::query_as::<_, CourseRecord>(&format!(
            "INSERT INTO courses (id, name, price, rating, description, sales, thumbnail_url, delivery_link) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&course.name)
        .bind(course.price)
        .bind(course.rating)
        .bind(&course.description)
        .bind(course.sales)
        .bind(&course.thumbnail_url)
        .bind(&course.delivery_link)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_course(&self, course_id: Uuid, patch: CoursePatch) -> PortResult<Course> {
        let record = sqlx::query_as::<_, CourseRecord>(&format!(
            "UPDATE courses SET \
               name = COALESCE($2, name), \
               price = COALESCE($3, price), \
               rating = COALESCE($4, rating), \
               description = COALESCE($5, description), \
               sales = COALESCE($6, sales), \
               thumbnail_url = COALESCE($7, thumbnail_url), \
               delivery_link = COALESCE($8, delivery_link) \
             WHERE id = $1 RETURNING {}",
            COURSE_COLUMNS
        ))
        .bind(course_id)
        .bind(patch.name)
        .bind(patch.price)
        .bind(patch.rating)
        .bind(patch.description)
        .bind(patch.sales)
        .bind(patch.thumbnail_url)
        .bind(patch.delivery_link)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| not_found("Course", course_id))?;
        Ok(record.to_domain())
    }

    async fn delete_course(&self, course_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(not_found("Course", course_id));
        }
        Ok(())
    }

    async fn increment_course_sales(&self, course_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("UPDATE courses SET sales = sales + 1 WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(not_found("Course", course_id));
        }
        Ok(())
    }

    async fn list_payment_channels(&self) -> PortResult<Vec<PaymentChannel>> {
        let records = sqlx::query_as::<_, ChannelRecord>(&format!(
            "SELECT {} FROM payment_channels ORDER BY created_at ASC",
            CHANNEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_payment_channel(&self, name: &str, number: &str) -> PortResult<PaymentChannel> {
        let record = sqlx::query_as::<_, ChannelRecord>(&format!(
            "INSERT INTO payment_channels (id, name, number) VALUES ($1, $2, $3) RETURNING {}",
            CHANNEL_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(number)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_payment_channel(
        &self,
        channel_id: Uuid,
        name: &str,
        number: &str,
    ) -> PortResult<PaymentChannel> {
        let record = sqlx::query_as::<_, ChannelRecord>(&format!(
            "UPDATE payment_channels SET name = $2, number = $3 WHERE id = $1 RETURNING {}",
            CHANNEL_COLUMNS
        ))
        .bind(channel_id)
        .bind(name)
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| not_found("Payment channel", channel_id))?;
        Ok(record.to_domain())
    }

    async fn delete_payment_channel(&self, channel_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM payment_channels WHERE id = $1")
            .bind(channel_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(not_found("Payment channel", channel_id));
        }
        Ok(())
    }

    async fn create_payment(&self, payment: NewPayment) -> PortResult<Payment> {
        sqlx::query_as::<_, PaymentRecord>(&format!(
            "INSERT INTO payments (id, payer_name, payer_email, payer_phone, sender_account, \
               receiver_account, transaction_ref, evidence_url, course_id, course_name, \
               course_price, delivery_link, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending') RETURNING {}",
            PAYMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&payment.payer_name)
        .bind(&payment.payer_email)
        .bind(&payment.payer_phone)
        .bind(&payment.sender_account)
        .bind(&payment.receiver_account)
        .bind(&payment.transaction_ref)
        .bind(&payment.evidence_url)
        .bind(payment.course_id)
        .bind(&payment.course_name)
        .bind(payment.course_price)
        .bind(&payment.delivery_link)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?
        .to_domain()
    }

    async fn get_payment_by_id(&self, payment_id: Uuid) -> PortResult<Payment> {
        sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {} FROM payments WHERE id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| not_found("Payment", payment_id))?
        .to_domain()
    }

    async fn list_payments(&self, filter: PaymentFilter) -> PortResult<Vec<Payment>> {
        let records = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {} FROM payments \
             WHERE ($1::TEXT IS NULL OR status = $1) \
               AND ($2::TEXT IS NULL OR payer_email = $2) \
             ORDER BY created_at DESC",
            PAYMENT_COLUMNS
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.payer_email)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn transition_payment(
        &self,
        payment_id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> PortResult<Option<Payment>> {
        // Matching on the current status makes check-and-set one statement.
        let record = sqlx::query_as::<_, PaymentRecord>(&format!(
            "UPDATE payments SET status = $3 WHERE id = $1 AND status = $2 RETURNING {}",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(|r| r.to_domain()).transpose()
    }

    async fn delete_payment(&self, payment_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(not_found("Payment", payment_id));
        }
        Ok(())
    }
}
