//! HTTP contract tests: routing, JWT auth, role gating, validation and the
//! checklist/approval workflow, backed by the in-memory stores.

use std::sync::Arc;

use axum::body::Body;
use gradtrack_core::memory::{MemoryStores, StudentProfile};
use gradtrack_core::service::{RegistrarService, RegistrarServiceImpl};
use gradtrack_core::types::AccountStatus;
use gradtrack_server::middleware::jwt::JwtConfig;
use gradtrack_server::router::build_router;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

// ── Test JWT helpers ───────────────────────────────────────────

const TEST_JWT_SECRET: &[u8] = b"test-secret-for-http-contract";
const PASSWORD: &str = "registrar-pass";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TestClaims {
    user_id: Uuid,
    role: String,
    iat: i64,
    exp: i64,
}

fn make_jwt(user_id: Uuid, role: &str, secret: &[u8], exp_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = TestClaims {
        user_id,
        role: role.into(),
        iat: now,
        exp: now + exp_offset,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .expect("failed to encode test JWT")
}

// ── Test app ───────────────────────────────────────────────────

struct TestApp {
    app: axum::Router,
    admin_id: Uuid,
    docs: Vec<Uuid>,
    student_id: Uuid,
}

impl TestApp {
    fn new() -> Self {
        let stores = MemoryStores::new();
        let hash = bcrypt::hash(PASSWORD, 4).unwrap();
        let admin_id = stores.add_user("registrar", &hash, "ADMIN", AccountStatus::Active);
        stores.add_user("dormant", &hash, "ADMIN", AccountStatus::Inactive);
        let docs = (0..10)
            .map(|i| stores.add_document_type(&format!("D{i}"), &format!("Document {i:02}"), true))
            .collect();
        let student_id = stores.add_student(StudentProfile {
            student_number: "202312263".into(),
            first_name: "Maria".into(),
            last_name: "Santos".into(),
            email: "maria@example.edu".into(),
            program_name: Some("BS Information Technology".into()),
            awards: vec!["Dean's Lister".into()],
            ..Default::default()
        });

        let s = Arc::new(stores);
        let service: Arc<dyn RegistrarService> =
            Arc::new(RegistrarServiceImpl::new(s.clone(), s.clone(), s.clone(), s));
        let app = build_router(service, JwtConfig::from_secret(TEST_JWT_SECRET), "*");
        Self {
            app,
            admin_id,
            docs,
            student_id,
        }
    }

    fn admin_jwt(&self) -> String {
        make_jwt(self.admin_id, "ADMIN", TEST_JWT_SECRET, 3600)
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .unwrap();
        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        (status, body_json(resp).await)
    }
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }))
}

// ── Public routes ───────────────────────────────────────────────

#[tokio::test]
async fn health_needs_no_auth() {
    let t = TestApp::new();
    let (status, body) = t.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn login_then_me() {
    let t = TestApp::new();
    let (status, body) = t
        .call(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "  registrar ", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = t.call("GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        me,
        json!({ "userId": t.admin_id, "username": "registrar", "role": "ADMIN" })
    );
}

#[tokio::test]
async fn login_failures() {
    let t = TestApp::new();
    let (status, body) = t
        .call(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "registrar", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = t
        .call(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": "dormant", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = t
        .call(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": " ", "password": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let paths: Vec<_> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["path"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(paths, vec!["username", "password"]);
}

#[tokio::test]
async fn malformed_body_is_a_400() {
    let t = TestApp::new();
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Auth gating ─────────────────────────────────────────────────

#[tokio::test]
async fn registrar_routes_require_token_and_role() {
    let t = TestApp::new();
    let uri = format!("/students/{}/checklist", t.student_id);

    let (status, body) = t.call("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized");

    let forged = make_jwt(t.admin_id, "ADMIN", b"other-secret", 3600);
    let (status, body) = t.call("GET", &uri, Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let expired = make_jwt(t.admin_id, "ADMIN", TEST_JWT_SECRET, -60);
    let (status, _) = t.call("GET", &uri, Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let viewer = make_jwt(Uuid::new_v4(), "VIEWER", TEST_JWT_SECRET, 3600);
    let (status, body) = t.call("GET", &uri, Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");

    // Any valid token may read its own account, but an unknown id is a 404.
    let (status, body) = t.call("GET", "/auth/me", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

// ── Students ────────────────────────────────────────────────────

#[tokio::test]
async fn overview_and_details_alias() {
    let t = TestApp::new();
    let token = t.admin_jwt();

    let (status, overview) = t
        .call("GET", "/students/202312263/overview", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["firstName"], "Maria");
    assert_eq!(overview["awards"], json!(["Dean's Lister"]));
    assert_eq!(overview["approvalStatus"], Value::Null);

    let (_, details) = t
        .call("GET", "/students/202312263/details", Some(&token), None)
        .await;
    assert_eq!(details, overview);

    let (status, _) = t
        .call("GET", "/students/12345/overview", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = t
        .call("GET", "/students/999999999/overview", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Student not found");
}

// ── Checklist workflow ──────────────────────────────────────────

#[tokio::test]
async fn checklist_update_and_summary() {
    let t = TestApp::new();
    let token = t.admin_jwt();
    let uri = format!("/students/{}/checklist", t.student_id);

    let (status, items) = t.call("GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 10);
    assert!(items
        .as_array()
        .unwrap()
        .iter()
        .all(|i| i["status"] == "PENDING" && i["studentDocumentId"].is_null()));

    let updates: Vec<_> = t
        .docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let status = match i {
                0..=2 => "SUBMITTED",
                3..=5 => "APPROVED",
                _ => "PENDING",
            };
            json!({ "documentTypeId": doc, "status": status, "remarks": "  " })
        })
        .collect();
    let (status, updated) = t
        .call("PATCH", &uri, Some(&token), Some(json!({ "items": updates })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let updated = updated.as_array().unwrap();
    assert_eq!(updated.len(), 10);
    let first = updated
        .iter()
        .find(|i| i["documentTypeId"] == json!(t.docs[0]))
        .unwrap();
    assert_eq!(first["status"], "SUBMITTED");
    assert!(!first["submittedAt"].is_null());
    assert!(first["verifiedAt"].is_null());
    assert_eq!(first["remarks"], Value::Null);

    let (status, summary) = t
        .call("GET", &format!("{uri}/summary"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        summary,
        json!({
            "totalRequirements": 10,
            "completedRequirements": 6,
            "completionRate": 60.0,
            "status": "incomplete"
        })
    );
}

#[tokio::test]
async fn reverting_to_pending_clears_timestamps() {
    let t = TestApp::new();
    let token = t.admin_jwt();
    let uri = format!("/students/{}/checklist", t.student_id);
    let doc = t.docs[0];
    let item = |items: &Value| {
        items
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["documentTypeId"] == json!(doc))
            .cloned()
            .unwrap()
    };

    let (status, items) = t
        .call(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "items": [{ "documentTypeId": doc, "status": "APPROVED" }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let approved = item(&items);
    assert!(!approved["submittedAt"].is_null());
    assert!(!approved["verifiedAt"].is_null());

    let (status, items) = t
        .call(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "items": [{ "documentTypeId": doc, "status": "PENDING" }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let pending = item(&items);
    assert_eq!(pending["status"], "PENDING");
    assert!(pending["submittedAt"].is_null());
    assert!(pending["verifiedAt"].is_null());
    assert_eq!(pending["studentDocumentId"], approved["studentDocumentId"]);
}

#[tokio::test]
async fn checklist_validation_errors_write_nothing() {
    let t = TestApp::new();
    let token = t.admin_jwt();
    let uri = format!("/students/{}/checklist", t.student_id);

    let (status, _) = t
        .call("GET", "/students/not-a-uuid/checklist", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = t
        .call("PATCH", &uri, Some(&token), Some(json!({ "items": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["issues"][0]["path"], "items");

    let (status, body) = t
        .call(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "items": [
                { "documentTypeId": t.docs[0], "status": "APPROVED" },
                { "documentTypeId": t.docs[1], "status": "LOST" }
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["issues"][0]["path"], "items.1.status");

    // Unknown document type fails in the store and rolls back the batch.
    let (status, body) = t
        .call(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "items": [
                { "documentTypeId": t.docs[0], "status": "APPROVED" },
                { "documentTypeId": Uuid::new_v4(), "status": "SUBMITTED" }
            ]})),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "message": "Internal server error" }));

    let (_, items) = t.call("GET", &uri, Some(&token), None).await;
    assert!(items
        .as_array()
        .unwrap()
        .iter()
        .all(|i| i["status"] == "PENDING"));
}

// ── Approval ────────────────────────────────────────────────────

#[tokio::test]
async fn approval_upsert_and_summary_status() {
    let t = TestApp::new();
    let token = t.admin_jwt();
    let uri = format!("/students/{}/status", t.student_id);

    let (status, first) = t
        .call(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({
                "approvalStatus": "APPROVED",
                "vpaaApproved": true,
                "finalApproved": false,
                "remarks": " cleared "
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!first["vpaaApprovedAt"].is_null());
    assert!(first["finalApprovedAt"].is_null());
    assert_eq!(first["remarks"], "cleared");

    let (_, second) = t
        .call(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({
                "approvalStatus": "APPROVED",
                "vpaaApproved": false,
                "finalApproved": true
            })),
        )
        .await;
    assert_eq!(second["approvalId"], first["approvalId"]);
    assert!(second["vpaaApprovedAt"].is_null());
    assert!(!second["finalApprovedAt"].is_null());

    // Approved flag alone never lifts an incomplete checklist.
    let summary_uri = format!("/students/{}/checklist/summary", t.student_id);
    let (_, summary) = t.call("GET", &summary_uri, Some(&token), None).await;
    assert_eq!(summary["status"], "incomplete");

    let all: Vec<_> = t
        .docs
        .iter()
        .map(|doc| json!({ "documentTypeId": doc, "status": "APPROVED" }))
        .collect();
    t.call(
        "PATCH",
        &format!("/students/{}/checklist", t.student_id),
        Some(&token),
        Some(json!({ "items": all })),
    )
    .await;
    let (_, summary) = t.call("GET", &summary_uri, Some(&token), None).await;
    assert_eq!(summary["status"], "approved");

    let (status, body) = t
        .call(
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({ "approvalStatus": "MAYBE", "vpaaApproved": "yes" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["issues"].as_array().unwrap().len() >= 3);

    let (_, overview) = t
        .call("GET", "/students/202312263/overview", Some(&token), None)
        .await;
    assert_eq!(overview["approvalStatus"], "APPROVED");
    assert_eq!(overview["finalApproved"], true);
}
