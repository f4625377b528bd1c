//! Drives the full router against the in-memory store.

use api_lib::{
    config::{Config, MailConfig},
    web::{router, AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storefront_core::{
    users, DeliveryNotifier, ExternalIdentity, InMemoryDatabase, NotificationService, PortResult,
    User,
};
use tower::ServiceExt;

const ADMIN: &str = "admin-subject";
const STUDENT: &str = "student-subject";

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(String, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> PortResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html_body.to_string()));
        Ok(())
    }
}

struct TestApp {
    app: Router,
    admin: User,
    mail: Arc<RecordingNotifier>,
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "memory://".to_string(),
        log_level: tracing::Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        mail: MailConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_tls: true,
            from_address: None,
            from_name: "Course Success".to_string(),
        },
        notify_timeout: Duration::from_millis(200),
        image_upload_url: "http://127.0.0.1:9/upload".to_string(),
        image_api_key: None,
        max_upload_bytes: 1024 * 1024,
        bootstrap_admin: None,
    }
}

async fn test_app() -> TestApp {
    let db = Arc::new(InMemoryDatabase::new());
    let admin = users::bootstrap_admin(
        db.as_ref(),
        ExternalIdentity {
            subject: ADMIN.to_string(),
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            avatar_url: None,
        },
    )
    .await
    .unwrap();

    let mail = Arc::new(RecordingNotifier::default());
    let state = Arc::new(AppState {
        db,
        config: Arc::new(test_config()),
        delivery: Arc::new(DeliveryNotifier::new(mail.clone(), Duration::from_millis(200))),
        images: None,
    });

    TestApp {
        app: router(state).unwrap(),
        admin,
        mail,
    }
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn create_course(&self) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                &format!("/courses?admin_uid={}", ADMIN),
                Some(json!({
                    "name": "Rust From Scratch",
                    "price": 500,
                    "description": "Ownership to async",
                    "delivery_link": "https://drive.example.com/rust"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    async fn submit_payment(&self, course_id: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/payments",
                Some(json!({
                    "name": "Rahim",
                    "email": "rahim@example.com",
                    "sender_number": "01811111111",
                    "receive_number": "Bkash:01700000000",
                    "transaction_id": "TRX1",
                    "course_id": course_id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    async fn wait_for_mail(&self) -> Vec<(String, String, String)> {
        for _ in 0..50 {
            let sent = self.mail.sent();
            if !sent.is_empty() {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.mail.sent()
    }
}

#[tokio::test]
async fn submitted_payment_is_pending_whatever_the_client_says() {
    let app = test_app().await;
    let course_id = app.create_course().await;
    let claimed = [
        json!("approved"),
        json!(1),
        json!(true),
        json!({ "v": "approved" }),
        Value::Null,
    ];

    for status in &claimed {
        let (code, body) = app
            .call(
                Method::POST,
                "/payments",
                Some(json!({
                    "name": "Rahim",
                    "email": "rahim@example.com",
                    "sender_number": "01811111111",
                    "receive_number": "Bkash:01700000000",
                    "transaction_id": "TRX1",
                    "course_id": course_id,
                    "status": status
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "status {} gave {}", status, body);
    }

    let (code, body) = app
        .call(Method::GET, &format!("/payments?admin_uid={}", ADMIN), None)
        .await;
    assert_eq!(code, StatusCode::OK);
    let payments = body.as_array().unwrap();
    assert_eq!(payments.len(), claimed.len());
    for payment in payments {
        assert_eq!(payment["status"], "pending");
        assert_eq!(payment["course_name"], "Rust From Scratch");
        assert_eq!(payment["price"], 500.0);
    }
}

#[tokio::test]
async fn malformed_submissions_are_rejected() {
    let app = test_app().await;
    let course_id = app.create_course().await;

    let (status, _) = app
        .call(
            Method::POST,
            "/payments",
            Some(json!({
                "name": "Rahim",
                "email": "rahim@example.com",
                "sender_number": "01811111111",
                "receive_number": "Bkash:01700000000",
                "transaction_id": "TRX1",
                "course_id": course_id,
                "discount": 100
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::POST,
            "/payments",
            Some(json!({ "name": "Rahim", "email": "rahim@example.com", "course_id": course_id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("is required"));

    let (status, _) = app
        .call(
            Method::POST,
            "/payments",
            Some(json!({
                "name": "Rahim",
                "email": "not-an-email",
                "sender_number": "01811111111",
                "receive_number": "Bkash:01700000000",
                "transaction_id": "TRX1",
                "course_id": course_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn decision_requires_an_admin() {
    let app = test_app().await;
    let course_id = app.create_course().await;
    let payment_id = app.submit_payment(&course_id).await;
    app.call(
        Method::POST,
        "/users/resolve",
        Some(json!({ "subject": STUDENT, "name": "Student", "email": "student@example.com" })),
    )
    .await;

    let decision = json!({ "status": "approved" });
    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/payments/{}/decision", payment_id),
            Some(decision.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/payments/{}/decision?admin_uid={}", payment_id, STUDENT),
            Some(decision),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.mail.sent().is_empty());
}

#[tokio::test]
async fn approval_emails_the_payer_once_and_cannot_be_repeated() {
    let app = test_app().await;
    let course_id = app.create_course().await;
    let payment_id = app.submit_payment(&course_id).await;
    let uri = format!("/payments/{}/decision?admin_uid={}", payment_id, ADMIN);

    let (status, body) = app
        .call(Method::PATCH, &uri, Some(json!({ "status": "approved" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["payment"]["status"], "approved");

    let sent = app.wait_for_mail().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "rahim@example.com");
    assert!(sent[0].1.contains("Rust From Scratch"));
    assert!(sent[0].2.contains("https://drive.example.com/rust"));

    let (status, _) = app
        .call(Method::PATCH, &uri, Some(json!({ "status": "rejected" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(app.mail.sent().len(), 1);
}

#[tokio::test]
async fn decision_accepts_only_terminal_statuses() {
    let app = test_app().await;
    let course_id = app.create_course().await;
    let payment_id = app.submit_payment(&course_id).await;

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/payments/{}/decision?admin_uid={}", payment_id, ADMIN),
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_payment_is_not_found() {
    let app = test_app().await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/payments/{}/decision?admin_uid={}", missing, ADMIN),
            Some(json!({ "status": "approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/payments/{}?admin_uid={}", missing, ADMIN),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn caller_identity_can_come_from_the_header() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/admin/overview")
        .header("x-admin-uid", ADMIN)
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 1);
}

#[tokio::test]
async fn admins_cannot_demote_or_delete_themselves() {
    let app = test_app().await;

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/users/role?admin_uid={}", ADMIN),
            Some(json!({ "subject": ADMIN, "role": "student" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/users/{}?admin_uid={}", app.admin.id, ADMIN),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(Method::GET, &format!("/users?admin_uid={}", ADMIN), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["role"], "admin");
}

#[tokio::test]
async fn admin_can_promote_and_delete_other_users() {
    let app = test_app().await;
    let (status, student) = app
        .call(
            Method::POST,
            "/users/resolve",
            Some(json!({ "subject": STUDENT, "name": "Student", "email": "student@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(student["role"], "student");

    let (status, _) = app
        .call(
            Method::POST,
            "/users/resolve",
            Some(json!({ "subject": STUDENT, "name": "Student", "email": "student@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/users/role?admin_uid={}", ADMIN),
            Some(json!({ "subject": STUDENT, "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    let delete_uri = format!("/users/{}?admin_uid={}", student["id"].as_str().unwrap(), ADMIN);
    let (status, _) = app.call(Method::DELETE, &delete_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call(Method::DELETE, &delete_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delivery_link_stays_private() {
    let app = test_app().await;
    let course_id = app.create_course().await;

    let (status, body) = app.call(Method::GET, "/courses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Rust From Scratch");
    assert!(body[0].get("delivery_link").is_none());

    let (_, body) = app
        .call(Method::GET, &format!("/courses/{}", course_id), None)
        .await;
    assert!(body.get("delivery_link").is_none());

    let (status, body) = app
        .call(Method::GET, &format!("/admin/courses?admin_uid={}", ADMIN), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["delivery_link"], "https://drive.example.com/rust");

    let (status, _) = app.call(Method::GET, "/admin/courses", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn history_reveals_the_link_only_after_approval() {
    let app = test_app().await;
    let course_id = app.create_course().await;
    let payment_id = app.submit_payment(&course_id).await;
    let history_uri = "/payments/history?email=rahim@example.com";

    let (status, body) = app.call(Method::GET, history_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "pending");
    assert!(body[0].get("delivery_link").is_none());

    app.call(
        Method::PATCH,
        &format!("/payments/{}/decision?admin_uid={}", payment_id, ADMIN),
        Some(json!({ "status": "approved" })),
    )
    .await;

    let (_, body) = app.call(Method::GET, history_uri, None).await;
    assert_eq!(body[0]["status"], "approved");
    assert_eq!(body[0]["delivery_link"], "https://drive.example.com/rust");

    let (status, _) = app.call(Method::GET, "/payments/history", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uploads_are_unavailable_without_an_image_host() {
    let app = test_app().await;
    let boundary = "X-BOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"proof.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/uploads")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn channel_management_is_gated() {
    let app = test_app().await;
    let channel = json!({ "name": "Bkash", "number": "01700000000" });

    let (status, _) = app
        .call(Method::POST, "/payment-channels", Some(channel.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/payment-channels?admin_uid={}", ADMIN),
            Some(channel),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (_, body) = app.call(Method::GET, "/payment-channels", None).await;
    assert_eq!(body[0]["number"], "01700000000");

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/payment-channels/{}?admin_uid={}", id, ADMIN),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_admins_are_refused_before_their_input_is_read() {
    let app = test_app().await;
    let course_id = app.create_course().await;
    let payment_id = app.submit_payment(&course_id).await;
    app.call(
        Method::POST,
        "/users/resolve",
        Some(json!({ "subject": STUDENT, "name": "Student", "email": "student@example.com" })),
    )
    .await;

    let attempts = [
        (
            Method::PATCH,
            format!("/payments/{}/decision?admin_uid={}", payment_id, STUDENT),
            json!({ "status": "bogus" }),
        ),
        (
            Method::PATCH,
            format!("/payments/{}/decision?admin_uid={}", payment_id, STUDENT),
            json!({ "unexpected": true }),
        ),
        (
            Method::PATCH,
            format!("/users/role?admin_uid={}", STUDENT),
            json!({ "subject": ADMIN, "role": "superuser" }),
        ),
        (
            Method::POST,
            format!("/payment-channels?admin_uid={}", STUDENT),
            json!({ "name": "", "number": "" }),
        ),
        (
            Method::POST,
            format!("/courses?admin_uid={}", STUDENT),
            json!({ "name": "" }),
        ),
    ];

    for (method, uri, body) in attempts {
        let (status, _) = app.call(method, &uri, Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
    }

    let (status, _) = app
        .call(
            Method::GET,
            &format!("/payments?status=bogus&admin_uid={}", STUDENT),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/payments/{}/decision?admin_uid={}", payment_id, ADMIN),
            Some(json!({ "status": "bogus" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_header_does_not_hide_the_query_identity() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/admin/overview?admin_uid={}", ADMIN))
        .header("x-admin-uid", " ")
        .body(Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
}
