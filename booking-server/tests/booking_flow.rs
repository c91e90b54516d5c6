//! 预订全流程集成测试
//!
//! 使用 ServerState::initialize 完整初始化，通过 oneshot 直接调用路由，
//! 覆盖 占座 → 发起支付 → 确认 → 出票 的完整工作流。

use axum::body::Body;
use booking_server::auth::JwtConfig;
use booking_server::routes::{self, OneshotRouter};
use booking_server::{Config, ServerState};
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};

const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";
const WEBHOOK_SECRET: &str = "test-hook-secret";

async fn setup() -> (ServerState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp work dir");
    let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    config.jwt = JwtConfig {
        secret: TEST_SECRET.to_string(),
        expiration_minutes: 60,
        issuer: "booking-server".to_string(),
        audience: "booking-clients".to_string(),
    };
    config.webhook_secret = Some(WEBHOOK_SECRET.to_string());

    let state = ServerState::initialize(&config).await;
    (state, dir)
}

fn token_for(state: &ServerState, user_id: i64, username: &str, role: &str) -> String {
    state
        .jwt_service
        .generate_token(user_id, username, role)
        .expect("Failed to mint test token")
}

async fn call(
    state: &ServerState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let mut app = routes::build_app(state);
    let response = app.oneshot(state, request).await.expect("oneshot failed");
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn publish_trip(state: &ServerState, admin_token: &str) -> i64 {
    let (status, body) = call(
        state,
        "POST",
        "/api/trips",
        Some(admin_token),
        Some(json!({
            "bus_name": "Coaster 12",
            "plate_number": "RAB 123 C",
            "total_seats": 30,
            "price": 5000.0,
            "departure_city": "Kigali",
            "destination_city": "Huye",
            "departure_time": shared::util::now_millis() + 86_400_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "trip publish failed: {}", body);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let (state, _dir) = setup().await;

    let (status, body) = call(&state, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_full_booking_flow() {
    let (state, _dir) = setup().await;
    let admin = token_for(&state, 1, "admin", "admin");
    let passenger = token_for(&state, 7, "alice", "user");

    let trip_id = publish_trip(&state, &admin).await;

    // Trip catalog is public
    let (status, body) = call(&state, "GET", &format!("/api/trips/{}", trip_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available_seats"], 30);

    // Reserve seat B3 - created response carries the trip for display
    let (status, body) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&passenger),
        Some(json!({ "trip_id": trip_id, "selected_seat": "B3" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "reserve failed: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["selected_seat"], "B3");
    assert_eq!(body["data"]["trip"]["destination_city"], "Huye");
    assert_eq!(body["data"]["trip"]["bus"]["plate_number"], "RAB 123 C");
    let reservation_id = body["data"]["id"].as_i64().unwrap();

    // Initiate payment - amount comes from the trip
    let (status, body) = call(
        &state,
        "POST",
        "/api/payments/initiate",
        Some(&passenger),
        Some(json!({ "reservation_id": reservation_id, "method": "card" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "initiate failed: {}", body);
    assert_eq!(body["data"]["payment"]["amount"], 5000.0);
    let transaction_id = body["data"]["payment"]["transaction_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Verify is public (transaction ID is the capability)
    let (status, body) = call(
        &state,
        "POST",
        "/api/payments/verify",
        None,
        Some(json!({ "transaction_id": transaction_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verify failed: {}", body);
    assert_eq!(body["data"]["reservation"]["status"], "confirmed");
    let ticket_number = body["data"]["ticket"]["ticket_number"].as_str().unwrap();
    assert!(ticket_number.starts_with("TKT"));

    // Repeated verify returns the same ticket
    let (status, body) = call(
        &state,
        "POST",
        "/api/payments/verify",
        None,
        Some(json!({ "transaction_id": transaction_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ticket"]["ticket_number"], ticket_number);

    // Reservation detail carries trip, payment and ticket
    let (status, body) = call(
        &state,
        "GET",
        &format!("/api/reservations/{}", reservation_id),
        Some(&passenger),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment"]["status"], "completed");
    assert_eq!(body["data"]["ticket"]["status"], "valid");

    // Seat shows as occupied in the catalog
    let (status, body) = call(&state, "GET", &format!("/api/trips/{}", trip_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["occupied_seats"], json!(["B3"]));
    assert_eq!(body["data"]["available_seats"], 29);
}

#[tokio::test]
async fn test_double_booking_rejected() {
    let (state, _dir) = setup().await;
    let admin = token_for(&state, 1, "admin", "admin");
    let alice = token_for(&state, 7, "alice", "user");
    let bob = token_for(&state, 8, "bob", "user");

    let trip_id = publish_trip(&state, &admin).await;

    let (status, _) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&alice),
        Some(json!({ "trip_id": trip_id, "selected_seat": "B1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&bob),
        Some(json!({ "trip_id": trip_id, "selected_seat": "B1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_cancel_frees_seat_for_rebooking() {
    let (state, _dir) = setup().await;
    let admin = token_for(&state, 1, "admin", "admin");
    let alice = token_for(&state, 7, "alice", "user");
    let bob = token_for(&state, 8, "bob", "user");

    let trip_id = publish_trip(&state, &admin).await;

    let (_, body) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&alice),
        Some(json!({ "trip_id": trip_id, "selected_seat": "A3" })),
    )
    .await;
    let reservation_id = body["data"]["id"].as_i64().unwrap();

    // Bob cannot cancel Alice's hold
    let (status, _) = call(
        &state,
        "POST",
        &format!("/api/reservations/{}/cancel", reservation_id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice cancels, Bob takes the seat
    let (status, body) = call(
        &state,
        "POST",
        &format!("/api/reservations/{}/cancel", reservation_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "cancel failed: {}", body);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, _) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&bob),
        Some(json!({ "trip_id": trip_id, "selected_seat": "A3" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_reservations_require_auth() {
    let (state, _dir) = setup().await;

    let (status, _) = call(
        &state,
        "POST",
        "/api/reservations",
        None,
        Some(json!({ "trip_id": 1, "selected_seat": "A1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&state, "GET", "/api/reservations/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_trip_publish_requires_admin() {
    let (state, _dir) = setup().await;
    let passenger = token_for(&state, 7, "alice", "user");

    let (status, _) = call(
        &state,
        "POST",
        "/api/trips",
        Some(&passenger),
        Some(json!({
            "bus_name": "Coaster 12",
            "plate_number": "RAB 123 C",
            "total_seats": 30,
            "price": 5000.0,
            "departure_city": "Kigali",
            "destination_city": "Huye",
            "departure_time": shared::util::now_millis() + 86_400_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_can_view_other_users_reservations() {
    let (state, _dir) = setup().await;
    let admin = token_for(&state, 1, "admin", "admin");
    let alice = token_for(&state, 7, "alice", "user");
    let bob = token_for(&state, 8, "bob", "user");

    let trip_id = publish_trip(&state, &admin).await;
    call(
        &state,
        "POST",
        "/api/reservations",
        Some(&alice),
        Some(json!({ "trip_id": trip_id, "selected_seat": "A1" })),
    )
    .await;

    // Admin may list Alice's reservations, Bob may not
    let (status, body) = call(&state, "GET", "/api/reservations/user/7", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = call(&state, "GET", "/api/reservations/user/7", Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_seat_validation_errors() {
    let (state, _dir) = setup().await;
    let admin = token_for(&state, 1, "admin", "admin");
    let alice = token_for(&state, 7, "alice", "user");

    let trip_id = publish_trip(&state, &admin).await;

    // Empty seat label fails request validation
    let (status, _) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&alice),
        Some(json!({ "trip_id": trip_id, "selected_seat": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Seat outside the bus plan fails domain validation
    let (status, _) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&alice),
        Some(json!({ "trip_id": trip_id, "selected_seat": "Z9" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_mobile_money_needs_phone() {
    let (state, _dir) = setup().await;
    let admin = token_for(&state, 1, "admin", "admin");
    let alice = token_for(&state, 7, "alice", "user");

    let trip_id = publish_trip(&state, &admin).await;
    let (_, body) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&alice),
        Some(json!({ "trip_id": trip_id, "selected_seat": "A1" })),
    )
    .await;
    let reservation_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = call(
        &state,
        "POST",
        "/api/payments/initiate",
        Some(&alice),
        Some(json!({ "reservation_id": reservation_id, "method": "mtn_momo" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &state,
        "POST",
        "/api/payments/initiate",
        Some(&alice),
        Some(json!({
            "reservation_id": reservation_id,
            "method": "mtn_momo",
            "phone_number": "0788123456",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_webhook_flow() {
    let (state, _dir) = setup().await;
    let admin = token_for(&state, 1, "admin", "admin");
    let alice = token_for(&state, 7, "alice", "user");

    let trip_id = publish_trip(&state, &admin).await;
    let (_, body) = call(
        &state,
        "POST",
        "/api/reservations",
        Some(&alice),
        Some(json!({ "trip_id": trip_id, "selected_seat": "A1" })),
    )
    .await;
    let reservation_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = call(
        &state,
        "POST",
        "/api/payments/initiate",
        Some(&alice),
        Some(json!({ "reservation_id": reservation_id, "method": "card" })),
    )
    .await;
    let transaction_id = body["data"]["payment"]["transaction_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Webhook without the shared secret is rejected
    let (status, _) = call(
        &state,
        "POST",
        "/api/payments/webhook",
        None,
        Some(json!({ "transaction_id": transaction_id, "status": "successful" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // With the secret, a failure notification lands on the payment
    let request = Request::builder()
        .method("POST")
        .uri("/api/payments/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-webhook-secret", WEBHOOK_SECRET)
        .body(Body::from(
            json!({ "transaction_id": transaction_id, "status": "failed" }).to_string(),
        ))
        .unwrap();
    let mut app = routes::build_app(&state);
    let response = app.oneshot(&state, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Reservation stays pending, retry succeeds via a fresh payment
    let (_, body) = call(
        &state,
        "GET",
        &format!("/api/reservations/{}", reservation_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(body["data"]["status"], "pending");

    let (_, body) = call(
        &state,
        "POST",
        "/api/payments/initiate",
        Some(&alice),
        Some(json!({ "reservation_id": reservation_id, "method": "card" })),
    )
    .await;
    let retry_tx = body["data"]["payment"]["transaction_id"]
        .as_str()
        .unwrap()
        .to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/api/payments/webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-webhook-secret", WEBHOOK_SECRET)
        .body(Body::from(
            json!({ "transaction_id": retry_tx, "status": "successful" }).to_string(),
        ))
        .unwrap();
    let mut app = routes::build_app(&state);
    let response = app.oneshot(&state, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = call(
        &state,
        "GET",
        &format!("/api/reservations/{}", reservation_id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["ticket"]["status"], "valid");
}
