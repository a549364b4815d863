//! Router-level tests for humn-admin
//!
//! Each test builds the full router over an in-memory store with fake
//! third-party collaborators and drives it with `oneshot`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use humn_admin::services::{AudioClip, EmailSender, Extractor, OutgoingEmail, Services, Transcriber, Unavailable};
use humn_admin::store::{DocumentStore, Fields, SqliteStore};
use humn_admin::{build_router, AppState, Result};
use humn_common::api::SessionSigner;
use humn_common::config::TomlConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "correct horse";
const BOUNDARY: &str = "humn-test-boundary";

struct FakeTranscriber(String);

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, _clip: AudioClip) -> Result<String> {
        Ok(self.0.clone())
    }
}

struct FakeExtractor(String);

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, _transcript: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(email);
        Ok(format!("email-{}", sent.len()))
    }
}

struct Harness {
    app: Router,
    store: Arc<SqliteStore>,
    mailer: Arc<RecordingMailer>,
}

fn config() -> TomlConfig {
    let mut config = TomlConfig::default();
    config.admin.email = Some(ADMIN_EMAIL.to_string());
    config.admin.password = Some(ADMIN_PASSWORD.to_string());
    config.admin.allowed_ids = vec!["uid-admin".to_string()];
    config.integrations.email_from = "hello@example.com".to_string();
    config.integrations.email_cc = Some("johnny@example.com".to_string());
    config
}

async fn harness_with(transcript: &str, extraction_reply: &str) -> Harness {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let mailer = Arc::new(RecordingMailer::default());
    let services = Services {
        transcriber: Arc::new(FakeTranscriber(transcript.to_string())),
        extractor: Arc::new(FakeExtractor(extraction_reply.to_string())),
        mailer: mailer.clone(),
    };
    let state = AppState::new(
        store.clone(),
        SessionSigner::with_secret([9u8; 32]),
        config(),
        services,
    );

    Harness {
        app: build_router(state),
        store,
        mailer,
    }
}

async fn harness() -> Harness {
    harness_with("", "{}").await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, headers, body)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn voice_note_request(cookie: &str, person_id: Option<&str>, audio: Option<&[u8]>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(person_id) = person_id {
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"personId\"\r\n\r\n{id}\r\n",
                b = BOUNDARY,
                id = person_id
            )
            .as_bytes(),
        );
    }
    if let Some(audio) = audio {
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"note.webm\"\r\nContent-Type: audio/webm\r\n\r\n",
                b = BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(audio);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/admin/voice-notes")
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Sign in and return the `name=value` cookie pair
async fn login(app: &Router) -> String {
    let (status, headers, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/login",
            None,
            json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=86400"));
    set_cookie.split(';').next().unwrap().to_string()
}

async fn add_person(store: &SqliteStore, id: &str, fields: Value) {
    let fields: Fields = fields.as_object().cloned().unwrap();
    store.put_person(id, fields).await.unwrap();
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;
    let (status, _, body) = send(&h.app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "humn-admin");
}

#[tokio::test]
async fn test_admin_api_requires_session() {
    let h = harness().await;
    let (status, _, body) = send(&h.app, get("/api/admin/people", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Unauthorized"}));
}

#[tokio::test]
async fn test_admin_page_redirects_to_login() {
    let h = harness().await;
    let (status, headers, _) = send(&h.app, get("/admin", None)).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/login");

    let (status, _, _) = send(&h.app, get("/login", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forged_cookie_rejected() {
    let h = harness().await;
    let forged = format!("humn_admin=9999999999.{}", "0".repeat(64));
    let (status, _, _) = send(&h.app, get("/api/admin/people", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&h.app, get("/api/admin/people", Some("humn_admin=true"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_forbidden() {
    let h = harness().await;
    let (status, headers, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/api/login",
            None,
            json!({"email": ADMIN_EMAIL, "password": "nope"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"success": false}));
    assert!(headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_missing_field_forbidden() {
    let h = harness().await;
    let (status, headers, body) = send(
        &h.app,
        json_request(Method::POST, "/api/login", None, json!({"email": ADMIN_EMAIL})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"success": false}));
    assert!(headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_login_malformed_body_forbidden() {
    let h = harness().await;
    let requests = [
        Request::builder()
            .method(Method::POST)
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
        Request::builder()
            .method(Method::POST)
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("email=admin"))
            .unwrap(),
    ];

    for request in requests {
        let (status, _, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"success": false}));
    }
}

#[tokio::test]
async fn test_login_opens_admin_area() {
    let h = harness().await;
    let cookie = login(&h.app).await;

    let (status, _, body) = send(&h.app, get("/api/admin/people", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _, _) = send(&h.app, get("/admin", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let h = harness().await;
    let (status, headers, _) = send(
        &h.app,
        Request::builder()
            .method(Method::POST)
            .uri("/api/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("humn_admin=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_is_admin() {
    let h = harness().await;
    let (_, _, body) = send(&h.app, get("/api/is-admin?uid=uid-admin", None)).await;
    assert_eq!(body, json!({"isAdmin": true}));

    let (_, _, body) = send(&h.app, get("/api/is-admin?uid=someone", None)).await;
    assert_eq!(body, json!({"isAdmin": false}));

    let (_, _, body) = send(&h.app, get("/api/is-admin", None)).await;
    assert_eq!(body, json!({"isAdmin": false}));
}

#[tokio::test]
async fn test_story_for_visitor() {
    let h = harness().await;
    let (status, _, body) = send(&h.app, get("/api/story?visitor=Ada%20Lovelace", None)).await;
    assert_eq!(status, StatusCode::OK);

    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 7);
    assert_eq!(sections[0]["id"], "awakening");
    assert!(sections[0]["content"].as_str().unwrap().starts_with("Hey Ada,"));
    assert_eq!(sections[3]["type"], "call_to_action");
}

#[tokio::test]
async fn test_story_for_member_has_no_calls_to_action() {
    let h = harness().await;
    let (_, _, body) = send(&h.app, get("/api/story?member=Grace%20Hopper", None)).await;

    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 5);
    assert!(sections.iter().all(|s| s["type"] == "narration"));
    assert!(sections[0]["content"].as_str().unwrap().starts_with("Hey Grace,"));
}

#[tokio::test]
async fn test_register_creates_pending_person() {
    let h = harness().await;
    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/api/register",
            None,
            json!({
                "name": "Ada Lovelace",
                "phone": "+1 (424) 555-0100",
                "uid": "uid-ada",
                "referrerId": "uid-johnny",
                "email": ""
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "uid-ada");

    let person = h.store.get_person("uid-ada").await.unwrap().unwrap();
    assert_eq!(person.field_str("phone"), Some("+14245550100"));
    assert_eq!(person.field_str("status"), Some("pending"));
    assert_eq!(person.referrer_id(), Some("uid-johnny"));
    assert!(!person.fields.contains_key("email"));
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_register_sends_welcome_email() {
    let h = harness().await;
    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/api/register",
            None,
            json!({"name": "Ada", "phone": "4245550100", "email": "ada@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["id"].as_str().unwrap().is_empty());

    let mut sent = Vec::new();
    for _ in 0..100 {
        sent = h.mailer.sent();
        if !sent.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert_eq!(sent[0].subject, "Welcome to HUM人N, Ada!");
}

#[tokio::test]
async fn test_register_validation() {
    let h = harness().await;

    let (status, _, body) = send(
        &h.app,
        json_request(Method::POST, "/api/register", None, json!({"name": "Ada"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and phone are required");

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/api/register",
            None,
            json!({"name": "Ada", "phone": "555-0100"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Phone number looks incomplete");
}

#[tokio::test]
async fn test_send_welcome_email() {
    let h = harness().await;

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/api/send-welcome-email",
            None,
            json!({"name": "Ada"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name and email are required");

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/api/send-welcome-email",
            None,
            json!({"name": "Ada", "email": "ada@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "email-1"}));

    let sent = h.mailer.sent();
    assert_eq!(sent[0].cc.as_deref(), Some("johnny@example.com"));
    assert_eq!(sent[0].reply_to.as_deref(), Some("johnny@example.com"));
    assert_eq!(sent[0].from, "hello@example.com");
}

#[tokio::test]
async fn test_send_welcome_email_without_provider() {
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    let services = Services {
        mailer: Arc::new(Unavailable { service: "Resend" }),
        ..Services::unavailable()
    };
    let app = build_router(AppState::new(
        store,
        SessionSigner::with_secret([9u8; 32]),
        config(),
        services,
    ));

    let (status, _, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/send-welcome-email",
            None,
            json!({"name": "Ada", "email": "ada@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Resend request failed");
}

#[tokio::test]
async fn test_people_newest_first_and_patch() {
    let h = harness().await;
    add_person(&h.store, "p1", json!({"name": "First"})).await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    add_person(&h.store, "p2", json!({"name": "Second"})).await;
    let cookie = login(&h.app).await;

    let (_, _, body) = send(&h.app, get("/api/admin/people", Some(&cookie))).await;
    let ids: Vec<_> = body.as_array().unwrap().iter().map(|p| p["id"].clone()).collect();
    assert_eq!(ids, vec![json!("p2"), json!("p1")]);

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::PATCH,
            "/api/admin/people/p1",
            Some(&cookie),
            json!({"status": "active", "interests": ["music"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "First");
    assert_eq!(body["status"], "active");
    assert_eq!(body["interests"], json!(["music"]));

    let (status, _, _) = send(
        &h.app,
        json_request(
            Method::PATCH,
            "/api/admin/people/missing",
            Some(&cookie),
            json!({"status": "active"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_text_notes() {
    let h = harness().await;
    add_person(&h.store, "p1", json!({"name": "Ada"})).await;
    let cookie = login(&h.app).await;

    let (status, _, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/api/admin/people/p1/notes",
            Some(&cookie),
            json!({"content": "Loves poetry"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], "Loves poetry");
    assert_eq!(body["isFromVoice"], false);

    let (_, _, body) = send(&h.app, get("/api/admin/people/p1/notes", Some(&cookie))).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _, _) = send(
        &h.app,
        json_request(
            Method::POST,
            "/api/admin/people/p1/notes",
            Some(&cookie),
            json!({"content": "   "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&h.app, get("/api/admin/people/nobody/notes", Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_voice_note_enriches_person() {
    let reply = "```json\n{\"occupation\": \"Nurse\", \"location\": \"\", \"meetingDetails\": \"Met at the park\", \"birthday\": \"1990-04-12\", \"otherInfo\": \"Two kids\"}\n```";
    let h = harness_with("Met Ada at the park. She is a nurse.", reply).await;
    add_person(&h.store, "p1", json!({"name": "Ada"})).await;
    let cookie = login(&h.app).await;

    let (status, _, body) = send(
        &h.app,
        voice_note_request(&cookie, Some("p1"), Some(b"fake audio")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["transcript"], "Met Ada at the park. She is a nurse.");
    assert_eq!(body["extractedData"]["occupation"], "Nurse");
    assert!(!body["noteId"].as_str().unwrap().is_empty());

    let person = h.store.get_person("p1").await.unwrap().unwrap();
    assert_eq!(person.field_str("occupation"), Some("Nurse"));
    assert_eq!(person.field_str("meetingPlace"), Some("Met at the park"));
    assert_eq!(person.field_str("birthday"), Some("1990-04-12"));
    assert_eq!(person.field_str("location"), None);

    let notes = h.store.list_notes("p1").await.unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].body.is_from_voice);
    assert_eq!(
        notes[0].body.extracted_data.as_ref().unwrap().other_info,
        "Two kids"
    );
}

#[tokio::test]
async fn test_voice_note_with_unparseable_extraction() {
    let h = harness_with("Just a thought.", "I could not find anything.").await;
    add_person(&h.store, "p1", json!({"name": "Ada"})).await;
    let cookie = login(&h.app).await;

    let (status, _, body) = send(
        &h.app,
        voice_note_request(&cookie, Some("p1"), Some(b"fake audio")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extractedData"]["occupation"], "");

    let person = h.store.get_person("p1").await.unwrap().unwrap();
    assert_eq!(person.fields.len(), 1);
}

#[tokio::test]
async fn test_voice_note_requires_audio_and_person() {
    let h = harness_with("text", "{}").await;
    let cookie = login(&h.app).await;

    for request in [
        voice_note_request(&cookie, None, Some(b"fake audio")),
        voice_note_request(&cookie, Some("p1"), None),
    ] {
        let (status, _, body) = send(&h.app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Audio file and person ID are required");
    }
}

#[tokio::test]
async fn test_voice_note_empty_transcript() {
    let h = harness_with("   ", "{}").await;
    add_person(&h.store, "p1", json!({"name": "Ada"})).await;
    let cookie = login(&h.app).await;

    let (status, _, body) = send(
        &h.app,
        voice_note_request(&cookie, Some("p1"), Some(b"silence")),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Whisper request failed");
    assert!(h.store.list_notes("p1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_referrals_job() {
    let h = harness().await;
    add_person(&h.store, "a", json!({"name": "A"})).await;
    add_person(&h.store, "b", json!({"name": "B", "referrerId": "a"})).await;
    add_person(&h.store, "c", json!({"name": "C", "referrerId": "a"})).await;

    let (status, _, body) = send(&h.app, get("/api/cron/update-referrals", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["usersProcessed"], 3);
    assert_eq!(body["message"], "Referral counts updated successfully");

    let a = h.store.get_person("a").await.unwrap().unwrap();
    let b = h.store.get_person("b").await.unwrap().unwrap();
    assert_eq!(a.fields["referralCount"], 2);
    assert_eq!(b.fields["referralCount"], 0);

    let cookie = login(&h.app).await;
    let (_, _, logs) = send(&h.app, get("/api/admin/cron-logs", Some(&cookie))).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["operation"], "update-referrals");
    assert_eq!(logs[0]["success"], true);
    assert_eq!(logs[0]["usersProcessed"], 3);
}
