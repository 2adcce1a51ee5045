use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::Router;
use chrono::{Duration, Utc};
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use clubhouse_backend::models::{GalleryCategory, GalleryImage};
use clubhouse_backend::test_util::{create_test_state, insert_test_admin, TEST_PASSWORD};
use clubhouse_backend::{build_router, AppState};

const BOUNDARY: &str = "x-test-boundary-4feac9b1";

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((field, filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send_multipart_with(
    app: &Router,
    method: Method,
    uri: &str,
    token: &str,
    body: Vec<u8>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_multipart(
    app: &Router,
    uri: &str,
    token: &str,
    body: Vec<u8>,
) -> (StatusCode, Value) {
    send_multipart_with(app, Method::POST, uri, token, body).await
}

async fn register(app: &Router, name: &str, email: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/auth/register",
        token,
        Some(json!({ "name": name, "email": email, "password": "hunter22" })),
    )
    .await
}

fn token_for(state: &AppState, admin_id: &str) -> String {
    state.token_keys.issue(admin_id).unwrap()
}

#[tokio::test]
async fn first_registered_admin_becomes_super() {
    let state = create_test_state();
    let app = build_router(state.clone());

    let (status, body) = register(&app, "Jane", "jane@club.test", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["superAdmin"], true);
    assert_eq!(body["role"], "admin");
    assert!(body["token"].is_string());
    assert_eq!(body["remainingSlots"], 2);

    let (status, body) = send(&app, Method::GET, "/api/auth/admin-status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["superAdminExists"], true);
    assert_eq!(body["adminCount"], 1);
    assert_eq!(body["registrationOpen"], true);
}

#[tokio::test]
async fn later_registrations_need_a_super_admin_token() {
    let state = create_test_state();
    let app = build_router(state.clone());

    let (_, first) = register(&app, "Jane", "jane@club.test", None).await;
    let super_token = first["token"].as_str().unwrap().to_string();

    // No token at all.
    let (status, body) = register(&app, "Bob", "bob@club.test", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Super admin authorization required to register admins"
    );

    // Garbage token.
    let (status, body) = register(&app, "Bob", "bob@club.test", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token provided");

    // Super admin token works; the new account is a plain admin.
    let (status, body) = register(&app, "Bob", "bob@club.test", Some(&super_token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["superAdmin"], false);
    let plain_token = body["token"].as_str().unwrap().to_string();

    // A plain admin token does not.
    let (status, body) = register(&app, "Eve", "eve@club.test", Some(&plain_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only super admins can register new admins");
}

#[tokio::test]
async fn duplicate_email_and_registration_limit() {
    let state = create_test_state();
    let app = build_router(state.clone());

    let (_, first) = register(&app, "Jane", "jane@club.test", None).await;
    let super_token = first["token"].as_str().unwrap().to_string();

    let (status, body) = register(&app, "Jane Again", "JANE@club.test", Some(&super_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Admin already exists");

    register(&app, "Bob", "bob@club.test", Some(&super_token)).await;
    let (status, body) = register(&app, "Cara", "cara@club.test", Some(&super_token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["registrationOpen"], false);
    assert_eq!(body["remainingSlots"], 0);

    // Test config caps accounts at 3.
    let (status, body) = register(&app, "Dan", "dan@club.test", Some(&super_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin registration limit reached");
    assert_eq!(body["registrationOpen"], false);
    assert_eq!(body["remainingSlots"], 0);
}

#[tokio::test]
async fn register_validates_fields() {
    let state = create_test_state();
    let app = build_router(state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "", "email": "nope", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
}

#[tokio::test]
async fn login_checks_credentials() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "jane@club.test", true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "jane@club.test", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], admin.id.as_str());
    assert_eq!(body["superAdmin"], true);
    assert!(body["token"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "jane@club.test", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ghost@club.test", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_reject_missing_tokens() {
    let state = create_test_state();
    let app = build_router(state);

    for uri in [
        "/api/auth/me",
        "/api/applications",
        "/api/contact",
        "/api/notifications/all",
        "/api/gallery/upload-limit",
        "/api/users/me",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "expected 401 for {uri}");
        assert_eq!(body["message"], "Not authorized, no token");
    }
}

#[tokio::test]
async fn idle_session_is_rejected_even_with_a_valid_token() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "idle@club.test", false);
    state
        .db
        .update_last_active(&admin.id, Utc::now() - Duration::minutes(61))
        .unwrap();

    let token = token_for(&state, &admin.id);
    let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["expired"], true);
    assert_eq!(
        body["message"],
        "Session expired due to inactivity. Please log in again."
    );
}

#[tokio::test]
async fn ping_always_refreshes_activity() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "busy@club.test", false);
    let stale = Utc::now() - Duration::minutes(30);
    state.db.update_last_active(&admin.id, stale).unwrap();

    let token = token_for(&state, &admin.id);
    let (status, body) = send(&app, Method::POST, "/api/auth/ping", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], true);
    assert!(body["minutesRemaining"].as_f64().unwrap() > 0.0);

    let stored = state.db.find_admin_by_id(&admin.id).unwrap().unwrap();
    assert!(stored.last_active_at > stale);
}

#[tokio::test]
async fn event_lifecycle_with_public_registration() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "events@club.test", false);
    let token = token_for(&state, &admin.id);

    // Admin gate first.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/events",
        None,
        Some(json!({ "title": "Hike", "category": "trip", "start": "2026-09-01T08:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, event) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&token),
        Some(json!({
            "title": "Hike",
            "category": "trip",
            "start": "2026-09-01T08:00:00Z",
            "location": "Ngong Hills"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["attendees"].as_array().unwrap().len(), 0);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&token),
        Some(json!({ "title": "Bad", "category": "trip", "start": "tomorrow" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid start date format");

    // Public list sees it.
    let (status, listed) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Anyone can register as an attendee, once per admission number.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/events/{event_id}/register"),
        None,
        Some(json!({ "name": "Student A", "admissionNumber": "ADM-001" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendees"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/events/{event_id}/register"),
        None,
        Some(json!({ "name": "Student A Again", "admissionNumber": "ADM-001" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Student with this admission number is already registered"
    );

    // Partial update leaves the rest alone.
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/events/{event_id}"),
        Some(&token),
        Some(json!({ "featured": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["featured"], true);
    assert_eq!(body["title"], "Hike");
    assert_eq!(body["location"], "Ngong Hills");
    assert_eq!(body["attendees"].as_array().unwrap().len(), 1);

    // A provided title must not be blanked out on update.
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/events/{event_id}"),
        Some(&token),
        Some(json!({ "title": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "title");

    let (_, listed) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(listed[0]["title"], "Hike");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/events/{event_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event removed");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/events/{event_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");
}

#[tokio::test]
async fn application_review_flow() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "reviewer@club.test", false);
    let token = token_for(&state, &admin.id);

    let (status, application) = send(
        &app,
        Method::POST,
        "/api/applications",
        None,
        Some(json!({
            "fullName": "Jane Doe",
            "email": "jane@example.com",
            "phone": "0712345678",
            "course": "BSc Computer Science"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["status"], "pending");
    let application_id = application["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/applications",
        None,
        Some(json!({ "fullName": "", "email": "bad", "phone": "", "course": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 4);

    let (status, listed) = send(&app, Method::GET, "/api/applications", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/applications/{application_id}/status"),
        Some(&token),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"][0]["message"],
        "Status is required (approved/rejected)"
    );

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/applications/{application_id}/status"),
        Some(&token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["reviewedBy"], "reviewer");
    assert!(body["reviewedAt"].is_string());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/applications/missing/status",
        Some(&token),
        Some(json!({ "status": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Application not found");
}

#[tokio::test]
async fn contact_message_flow() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "secretary@club.test", false);
    let token = token_for(&state, &admin.id);

    let (status, contact) = send(
        &app,
        Method::POST,
        "/api/contact",
        None,
        Some(json!({
            "name": "Visitor",
            "email": "visitor@example.com",
            "subject": "Meeting times",
            "message": "When do you meet?"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(contact["responded"], false);
    let contact_id = contact["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/contact/{contact_id}/respond"),
        Some(&token),
        Some(json!({ "message": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Response message is required");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/contact/{contact_id}/respond"),
        Some(&token),
        Some(json!({ "message": "Fridays at 4pm" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["responded"], true);
    assert_eq!(body["responseMessage"], "Fridays at 4pm");
    assert_eq!(body["respondedBy"], "secretary");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/contact/missing/respond",
        Some(&token),
        Some(json!({ "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Message not found");
}

#[tokio::test]
async fn content_blocks_upsert_and_read() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "editor@club.test", false);
    let token = token_for(&state, &admin.id);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/admin/content/About",
        None,
        Some(json!({ "value": "We hike." })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/admin/content/About",
        Some(&token),
        Some(json!({ "value": "  We hike.  " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "about");
    assert_eq!(body["value"], "We hike.");
    assert_eq!(body["updatedBy"], "editor");

    // Upsert replaces in place.
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/admin/content/about",
        Some(&token),
        Some(json!({ "value": "We hike monthly." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "We hike monthly.");

    let (status, map) = send(&app, Method::GET, "/api/admin/content", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(map["about"], "We hike monthly.");

    let (status, body) = send(&app, Method::GET, "/api/admin/content/ABOUT", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "We hike monthly.");

    let (status, body) = send(&app, Method::GET, "/api/admin/content/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Content not found");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/admin/content/about",
        Some(&token),
        Some(json!({ "value": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "value");
}

#[tokio::test]
async fn notification_feed_hides_inactive_and_expired() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "notifier@club.test", false);
    let token = token_for(&state, &admin.id);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/notifications",
        Some(&token),
        Some(json!({ "title": "Meeting", "message": "Friday 4pm" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "info");
    assert_eq!(created["priority"], "medium");
    assert_eq!(created["isActive"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notifications",
        Some(&token),
        Some(json!({ "title": "Bad", "message": "x", "type": "loud" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Invalid notification type");

    // Public feed carries the trimmed shape.
    let (status, feed) = send(&app, Method::GET, "/api/notifications", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert!(feed[0].get("createdBy").is_none());
    assert_eq!(feed[0]["type"], "info");

    // Deactivation drops it from the public feed but not the admin list.
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/notifications/{id}"),
        Some(&token),
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["isActive"], false);
    assert!(updated["updatedAt"].is_string());

    let (_, feed) = send(&app, Method::GET, "/api/notifications", None, None).await;
    assert_eq!(feed.as_array().unwrap().len(), 0);

    let (_, all) = send(&app, Method::GET, "/api/notifications/all", Some(&token), None).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/notifications/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Notification deleted successfully");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/notifications/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gallery_upload_stores_file_and_counts_against_the_daily_limit() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "photographer@club.test", false);
    let token = token_for(&state, &admin.id);

    let body = multipart_body(
        &[
            ("title", "Summit"),
            ("category", "adventure"),
            ("description", "Sunrise from the peak"),
        ],
        Some(("image", "summit.jpg", "image/jpeg", b"jpegdata")),
    );
    let (status, uploaded) = send_multipart(&app, "/api/gallery/upload", &token, body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploaded["category"], "adventure");
    assert_eq!(uploaded["description"], "Sunrise from the peak");
    let image_url = uploaded["imageUrl"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/gallery/adventure/"));
    assert_eq!(uploaded["uploadLimit"]["count"], 1);
    assert_eq!(uploaded["uploadLimit"]["remaining"], 4);

    // The stored file really exists under the uploads root.
    let relative = image_url.trim_start_matches("/uploads/");
    assert!(Path::new(&state.config.uploads.path).join(relative).exists());

    let (status, limit) = send(
        &app,
        Method::GET,
        "/api/gallery/upload-limit",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(limit["count"], 1);
    assert_eq!(limit["remaining"], 4);
    assert_eq!(limit["limit"], 5);
}

#[tokio::test]
async fn gallery_rejects_bad_uploads_without_leaving_files() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "photographer@club.test", false);
    let token = token_for(&state, &admin.id);

    // Wrong MIME type.
    let body = multipart_body(
        &[("title", "Nope"), ("category", "adventure")],
        Some(("image", "nope.txt", "text/plain", b"not an image")),
    );
    let (status, body_json) = send_multipart(&app, "/api/gallery/upload", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body_json["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid file type"));

    // Missing file.
    let body = multipart_body(&[("title", "Nope"), ("category", "adventure")], None);
    let (status, body_json) = send_multipart(&app, "/api/gallery/upload", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json["message"], "No image file uploaded");

    // Bad category never reaches the filesystem either.
    let body = multipart_body(
        &[("title", "Nope"), ("category", "sports")],
        Some(("image", "ok.jpg", "image/jpeg", b"jpegdata")),
    );
    let (status, body_json) = send_multipart(&app, "/api/gallery/upload", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body_json["errors"][0]["field"], "category");

    // No gallery directory was ever created.
    assert!(!Path::new(&state.config.uploads.path).join("gallery").exists());
}

#[tokio::test]
async fn sixth_gallery_upload_of_the_day_is_rejected() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "prolific@club.test", false);
    let token = token_for(&state, &admin.id);

    for n in 0..5 {
        let image = GalleryImage {
            id: format!("seed-{n}"),
            title: format!("Photo {n}"),
            description: None,
            category: GalleryCategory::Service,
            filename: format!("photo-{n}.jpg"),
            file_path: format!("/uploads/gallery/service/photo-{n}.jpg"),
            file_size: 10,
            uploaded_by: admin.name.clone(),
            uploaded_by_id: admin.id.clone(),
            created_at: Utc::now(),
        };
        state.db.insert_gallery_image(&image).unwrap();
    }

    let body = multipart_body(
        &[("title", "One too many"), ("category", "service")],
        Some(("image", "extra.jpg", "image/jpeg", b"jpegdata")),
    );
    let (status, body_json) = send_multipart(&app, "/api/gallery/upload", &token, body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body_json["message"],
        "Daily upload limit reached. Maximum 5 uploads per day."
    );
    assert_eq!(body_json["count"], 5);
    assert_eq!(body_json["remaining"], 0);

    // Another admin still has a fresh allowance.
    let other = insert_test_admin(&state, "other@club.test", false);
    let other_token = token_for(&state, &other.id);
    let (_, limit) = send(
        &app,
        Method::GET,
        "/api/gallery/upload-limit",
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(limit["count"], 0);
    assert_eq!(limit["remaining"], 5);
}

#[tokio::test]
async fn gallery_pagination_and_category_filter() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "curator@club.test", false);

    for n in 0..3 {
        let category = if n == 0 {
            GalleryCategory::Training
        } else {
            GalleryCategory::Service
        };
        let image = GalleryImage {
            id: format!("img-{n}"),
            title: format!("Photo {n}"),
            description: None,
            category,
            filename: format!("photo-{n}.jpg"),
            file_path: format!("/uploads/gallery/{}/photo-{n}.jpg", category.as_str()),
            file_size: 10,
            uploaded_by: admin.name.clone(),
            uploaded_by_id: admin.id.clone(),
            created_at: Utc::now() - Duration::minutes(10 - n),
        };
        state.db.insert_gallery_image(&image).unwrap();
    }

    let (status, page) = send(&app, Method::GET, "/api/gallery?limit=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["images"].as_array().unwrap().len(), 2);
    assert_eq!(page["pagination"]["total"], 3);
    assert_eq!(page["pagination"]["pages"], 2);

    let (_, page2) = send(&app, Method::GET, "/api/gallery?limit=2&page=2", None, None).await;
    assert_eq!(page2["images"].as_array().unwrap().len(), 1);

    // Hostile page numbers clamp instead of overflowing.
    let (status, zero) = send(&app, Method::GET, "/api/gallery?page=0&limit=2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(zero["images"].as_array().unwrap().len(), 2);
    assert_eq!(zero["pagination"]["page"], 1);

    let (status, huge) = send(
        &app,
        Method::GET,
        "/api/gallery?page=4294967295&limit=1000",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(huge["images"].as_array().unwrap().len(), 0);

    let (_, filtered) = send(
        &app,
        Method::GET,
        "/api/gallery?category=training",
        None,
        None,
    )
    .await;
    assert_eq!(filtered["images"].as_array().unwrap().len(), 1);
    assert_eq!(filtered["pagination"]["total"], 1);

    // Unknown categories match nothing.
    let (_, unknown) = send(
        &app,
        Method::GET,
        "/api/gallery?category=sports",
        None,
        None,
    )
    .await;
    assert_eq!(unknown["images"].as_array().unwrap().len(), 0);
    assert_eq!(unknown["pagination"]["total"], 0);

    let (_, latest) = send(&app, Method::GET, "/api/gallery/latest", None, None).await;
    assert_eq!(latest.as_array().unwrap().len(), 3);
    // Newest first.
    assert_eq!(latest[0]["id"], "img-2");
}

#[tokio::test]
async fn document_upload_list_and_guarded_delete() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let owner = insert_test_admin(&state, "owner@club.test", false);
    let owner_token = token_for(&state, &owner.id);

    let body = multipart_body(
        &[("title", "Constitution")],
        Some(("document", "constitution.pdf", "application/pdf", b"%PDF-1.4 data")),
    );
    let (status, uploaded) = send_multipart(&app, "/api/documents/upload", &owner_token, body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(uploaded["title"], "Constitution");
    let document_id = uploaded["id"].as_str().unwrap().to_string();
    assert!(uploaded["filePath"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/documents/"));

    // Untitled uploads fall back to the original filename.
    let body = multipart_body(
        &[],
        Some(("document", "minutes.pdf", "application/pdf", b"%PDF-1.4 data")),
    );
    let (status, untitled) = send_multipart(&app, "/api/documents/upload", &owner_token, body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(untitled["title"], "minutes.pdf");

    let body = multipart_body(
        &[("title", "Nope")],
        Some(("document", "virus.exe", "application/octet-stream", b"MZ")),
    );
    let (status, rejected) = send_multipart(&app, "/api/documents/upload", &owner_token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(rejected["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid file type"));

    let (status, listed) = send(&app, Method::GET, "/api/documents", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0]["downloadUrl"].is_string());

    // A different plain admin cannot delete someone else's document.
    let rival = insert_test_admin(&state, "rival@club.test", false);
    let rival_token = token_for(&state, &rival.id);
    let (status, body_json) = send(
        &app,
        Method::DELETE,
        &format!("/api/documents/{document_id}"),
        Some(&rival_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body_json["message"], "Not authorized to delete this document");

    // A super admin can.
    let boss = insert_test_admin(&state, "boss@club.test", true);
    let boss_token = token_for(&state, &boss.id);
    let (status, body_json) = send(
        &app,
        Method::DELETE,
        &format!("/api/documents/{document_id}"),
        Some(&boss_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body_json["message"], "Document deleted successfully");
}

#[tokio::test]
async fn avatar_upload_replace_and_remove() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "face@club.test", false);
    let token = token_for(&state, &admin.id);

    let body = multipart_body(
        &[],
        Some(("avatar", "face.png", "image/png", b"pngdata")),
    );
    let (status, first) =
        send_multipart_with(&app, Method::PUT, "/api/users/avatar", &token, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Avatar updated successfully");
    let first_avatar = first["avatar"].as_str().unwrap().to_string();
    let first_disk = Path::new(&state.config.uploads.path)
        .join(first_avatar.trim_start_matches("/uploads/"));
    assert!(first_disk.exists());

    // A rejected replacement leaves the current avatar untouched.
    let body = multipart_body(
        &[],
        Some(("avatar", "resume.pdf", "application/pdf", b"%PDF-1.4")),
    );
    let (status, _) =
        send_multipart_with(&app, Method::PUT, "/api/users/avatar", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(first_disk.exists());
    let (_, profile) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(profile["avatar"].as_str().unwrap(), first_avatar);

    // Replacing removes the previous file.
    let body = multipart_body(
        &[],
        Some(("avatar", "face2.png", "image/png", b"pngdata2")),
    );
    let (status, second) =
        send_multipart_with(&app, Method::PUT, "/api/users/avatar", &token, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(second["avatar"], first["avatar"]);
    assert!(!first_disk.exists());

    let (_, profile) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(profile["avatar"], second["avatar"]);

    let (status, removed) = send(&app, Method::DELETE, "/api/users/avatar", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["message"], "Avatar removed successfully");

    let (_, profile) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert!(profile["avatar"].is_null());
}

#[tokio::test]
async fn profile_update_rejects_taken_email() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let admin = insert_test_admin(&state, "me@club.test", false);
    insert_test_admin(&state, "taken@club.test", false);
    let token = token_for(&state, &admin.id);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "name": "New Name", "email": "taken@club.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already in use");

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/users/profile",
        Some(&token),
        Some(json!({ "name": "New Name", "email": "Renamed@club.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "New Name");
    assert_eq!(body["email"], "renamed@club.test");
}

#[tokio::test]
async fn admin_deletion_rules() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let boss = insert_test_admin(&state, "boss@club.test", true);
    let plain = insert_test_admin(&state, "plain@club.test", false);
    let boss_token = token_for(&state, &boss.id);
    let plain_token = token_for(&state, &plain.id);

    // Account management is super admin territory.
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", boss.id),
        Some(&plain_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized. Super admin access required.");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", boss.id),
        Some(&boss_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete your own account");

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/users/missing",
        Some(&boss_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Admin not found");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", plain.id),
        Some(&boss_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Admin deleted successfully");

    // The same rules apply on the auth router's alias.
    let second_super = insert_test_admin(&state, "second@club.test", true);
    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/auth/admins/{}", second_super.id),
        Some(&boss_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Admin deleted successfully");
    assert_eq!(state.db.count_super_admins().unwrap(), 1);
}

#[tokio::test]
async fn admin_listing_visibility() {
    let state = create_test_state();
    let app = build_router(state.clone());
    let boss = insert_test_admin(&state, "boss@club.test", true);
    let plain = insert_test_admin(&state, "plain@club.test", false);
    let boss_token = token_for(&state, &boss.id);
    let plain_token = token_for(&state, &plain.id);

    // Any admin can see the roster on the auth router.
    let (status, listed) = send(&app, Method::GET, "/api/auth/admins", Some(&plain_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].get("passwordHash").is_none());

    // The account-management listing is super admin only.
    let (status, _) = send(&app, Method::GET, "/api/users", Some(&plain_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = send(&app, Method::GET, "/api/users", Some(&boss_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_routes_fall_through_to_404() {
    let state = create_test_state();
    let app = build_router(state);

    let (status, body) = send(&app, Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn health_banner_is_public() {
    let state = create_test_state();
    let app = build_router(state);

    for uri in ["/", "/health"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Clubhouse API is running...");
    }
}
