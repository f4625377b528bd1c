//! crates/storefront_core/src/delivery.rs
//!
//! Sends the course delivery email once a payment is approved.
//!
//! Delivery is best-effort: the send runs on its own task under a timeout, and any
//! failure is logged and dropped. The decision that triggered it has already been
//! stored by the time the email goes out.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::Payment;
use crate::ports::NotificationService;

/// A composed email, ready to hand to the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

pub struct DeliveryNotifier {
    notifier: Arc<dyn NotificationService>,
    timeout: Duration,
}

impl DeliveryNotifier {
    pub fn new(notifier: Arc<dyn NotificationService>, timeout: Duration) -> Self {
        Self { notifier, timeout }
    }

    /// Sends the approval email. Never fails from the caller's point of view.
    pub async fn notify_approved(
        &self,
        email: &str,
        course_name: &str,
        delivery_link: &str,
        payer_name: &str,
    ) {
        let message = compose_approval_email(email, course_name, delivery_link, payer_name);

        match tokio::time::timeout(
            self.timeout,
            self.notifier
                .send(&message.to, &message.subject, &message.html_body),
        )
        .await
        {
            Ok(Ok(())) => info!(to = %message.to, course = %course_name, "Delivery email sent"),
            Ok(Err(e)) => error!(to = %message.to, error = %e, "Failed to send delivery email"),
            Err(_) => warn!(
                to = %message.to,
                timeout_secs = self.timeout.as_secs(),
                "Delivery email timed out"
            ),
        }
    }

    /// Hands the approval email for `payment` off to a background task.
    pub fn dispatch(self: &Arc<Self>, payment: &Payment) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let email = payment.payer_email.clone();
        let course_name = payment.course_name.clone();
        let delivery_link = payment.delivery_link.clone();
        let payer_name = payment.payer_name.clone();

        tokio::spawn(async move {
            this.notify_approved(&email, &course_name, &delivery_link, &payer_name)
                .await;
        })
    }
}

/// Builds the approval email from the fixed template.
pub fn compose_approval_email(
    email: &str,
    course_name: &str,
    delivery_link: &str,
    payer_name: &str,
) -> DeliveryEmail {
    let subject = format!(
        "Your Payment Approved! Get Access to {}",
        course_name
    );

    let html_body = format!(
        r#"<div style="font-family: sans-serif; padding: 20px; color: #333;">
  <h2>Hello {name},</h2>
  <p>Great news! Your payment for the course <b>{course}</b> has been approved.</p>
  <p>You can now access your course materials using the link below:</p>
  <div style="margin: 20px 0;">
    <a href="{link}" style="background: #2563eb; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px;">Access Course Link</a>
  </div>
  <p>If you have any issues, feel free to contact us.</p>
  <p>Happy Learning!</p>
</div>"#,
        name = escape_html(payer_name),
        course = escape_html(course_name),
        link = escape_html(delivery_link),
    );

    DeliveryEmail {
        to: email.to_string(),
        subject,
        html_body,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
