// tests/api_tests.rs
//
// Integration tests against a real server on a random port. Requires a
// running Postgres (DATABASE_URL) and redis (REDIS_URL, defaults to
// localhost) plus the migrations in ./migrations.

use saheli_backend::{
    config::Config, error::AppError, routes, state::AppState, utils::otp::OtpStore,
    utils::sms::SmsSender,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::{Arc, Mutex};

/// A spawned test server plus the handles tests need to observe it.
struct TestApp {
    address: String,
    upload_dir: String,
    /// (email, code) pairs captured from the SMS seam.
    sent_codes: Arc<Mutex<Vec<(String, String)>>>,
}

/// Test double for the SMS seam that records every dispatched reset code.
struct RecordingSender {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait::async_trait]
impl SmsSender for RecordingSender {
    async fn send_reset_code(&self, email: &str, code: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

/// Helper function to spawn the app on a random port for testing.
/// The base URL is in `TestApp::address` (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> TestApp {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    // 1. Create a pool
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let upload_dir = std::env::temp_dir()
        .join(format!("saheli-test-uploads-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .expect("Failed to create test upload dir");

    let config = Config {
        database_url: database_url.clone(),
        redis_url: redis_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        upload_dir: upload_dir.clone(),
        port: 0,
        rust_log: "error".to_string(),
    };

    let otp = OtpStore::connect(&redis_url)
        .await
        .expect("Failed to connect to redis for testing. Make sure REDIS_URL is set.");

    let sent_codes = Arc::new(Mutex::new(Vec::new()));
    let state = AppState {
        pool,
        config,
        otp,
        sms: Arc::new(RecordingSender {
            sent: sent_codes.clone(),
        }),
    };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        upload_dir,
        sent_codes,
    }
}

fn unique_email() -> String {
    format!("u_{}@test.local", &uuid::Uuid::new_v4().to_string()[..8])
}

/// Registers a fresh user and logs in. Returns (token, user_id, email).
async fn register_and_login(
    client: &reqwest::Client,
    address: &str,
    password: &str,
) -> (String, i64, String) {
    let email = unique_email();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": email,
            "username": "testuser",
            "password": password
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    let token = login["token"].as_str().expect("Token not found").to_string();
    let user_id = login["user_id"].as_i64().expect("user_id not found");
    (token, user_id, email)
}

#[tokio::test]
async fn health_check_404() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();

    // Not a valid email address
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "username": "someone",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();
    let email = unique_email();

    for expected in [201, 409] {
        let response = client
            .post(format!("{}/api/auth/register", address))
            .json(&serde_json::json!({
                "email": email,
                "username": "someone",
                "password": "password123"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), expected);
    }
}

#[tokio::test]
async fn change_password_requires_old_password() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();
    let (token, _, email) = register_and_login(&client, &address, "password123").await;

    // Wrong old password is rejected
    let response = client
        .post(format!("{}/api/auth/change-password", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "old_password": "wrong",
            "new_password": "newpassword"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // Correct old password works, and the new one logs in
    let response = client
        .post(format!("{}/api/auth/change-password", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "old_password": "password123",
            "new_password": "newpassword"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "email": email, "password": "newpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn role_enrolment_is_idempotent() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();
    let (token, user_id, _) = register_and_login(&client, &address, "password123").await;

    let mut driver_ids = Vec::new();
    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/roles/driver", address))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
        let driver: serde_json::Value = response.json().await.unwrap();
        driver_ids.push(driver["id"].as_i64().unwrap());
        assert_eq!(driver["status"], "pending");
    }
    // Double enrolment must not create a second driver row
    assert_eq!(driver_ids[0], driver_ids[1]);

    let driver: serde_json::Value = client
        .get(format!("{}/api/roles/driver/user/{}", address, user_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(driver["id"].as_i64().unwrap(), driver_ids[0]);

    // last_role was updated in the same transaction
    let user: serde_json::Value = client
        .get(format!("{}/api/users/{}", address, user_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(user["last_role"], "driver");
}

#[tokio::test]
async fn complaint_target_validation() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();
    let (token, _, _) = register_and_login(&client, &address, "password123").await;

    let cases = [
        serde_json::json!({ "driver_id": 1, "passenger_id": 2, "description": "rude" }),
        serde_json::json!({ "description": "rude" }),
        serde_json::json!({ "driver_id": 1, "description": "   " }),
    ];

    for body in cases {
        let response = client
            .post(format!("{}/api/complaints", address))
            .header("Authorization", format!("Bearer {}", token))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "body: {}", body);
    }
}

#[tokio::test]
async fn fare_quote_enforces_floor_and_seats() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();

    let quote: serde_json::Value = client
        .get(format!(
            "{}/api/carpool/fare?distance_km=0.5&seats=2&pickup_time=12:00:00",
            address
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Tiny trip: per-seat fare sits on the minimum, total scales with seats
    let per_seat = quote["final_fare_per_seat"].as_f64().unwrap();
    let total = quote["total_fare"].as_f64().unwrap();
    assert_eq!(per_seat, 100.0);
    assert_eq!(total, 200.0);

    let response = client
        .get(format!(
            "{}/api/carpool/fare?distance_km=10&seats=0&pickup_time=12:00:00",
            address
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn offer_request_match_accept_flow() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();

    // Driver side
    let (driver_token, _, _) = register_and_login(&client, &address, "password123").await;
    let driver: serde_json::Value = client
        .post(format!("{}/api/roles/driver", address))
        .header("Authorization", format!("Bearer {}", driver_token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let driver_id = driver["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/api/carpool/offers", address))
        .header("Authorization", format!("Bearer {}", driver_token))
        .json(&serde_json::json!({
            "pickup_location": "G-9",
            "dropoff_location": "F-10",
            "pickup_time": "09:00:00",
            "seats": 3,
            "route_type": "One Way",
            "recurring_days": "Monday,Wednesday"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // Passenger side
    let (passenger_token, passenger_user_id, _) =
        register_and_login(&client, &address, "password123").await;
    client
        .post(format!("{}/api/roles/passenger", address))
        .header("Authorization", format!("Bearer {}", passenger_token))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/carpool/requests", address))
        .header("Authorization", format!("Bearer {}", passenger_token))
        .json(&serde_json::json!({
            "pickup_location": "G-9 Islamabad",
            "dropoff_location": "F-10 Markaz",
            "pickup_time": "09:20:00",
            "date": "2025-06-02",
            "seats": 1,
            "route_type": "One Way",
            "recurring_days": "Monday",
            "distance_km": 8.5
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let request: serde_json::Value = response.json().await.unwrap();
    let request_id = request["id"].as_i64().unwrap();
    // Server computed a fare from distance_km
    assert!(request["fare"].as_f64().unwrap() >= 100.0);

    // The request shows up in the driver's match set
    let matches: Vec<serde_json::Value> = client
        .get(format!("{}/api/carpool/matches/driver/{}", address, driver_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        matches.iter().any(|m| m["id"].as_i64() == Some(request_id)),
        "expected request {} in match set",
        request_id
    );

    // Driver accepts; a second accept conflicts
    let response = client
        .put(format!("{}/api/carpool/requests/{}/accept", address, request_id))
        .header("Authorization", format!("Bearer {}", driver_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let accepted: serde_json::Value = response.json().await.unwrap();
    assert_eq!(accepted["status"], "accepted");
    assert_eq!(accepted["driver_id"].as_i64(), Some(driver_id));

    let response = client
        .put(format!("{}/api/carpool/requests/{}/accept", address, request_id))
        .header("Authorization", format!("Bearer {}", driver_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // Acceptance left a notification in the passenger's inbox
    let notifications: Vec<serde_json::Value> = client
        .get(format!(
            "{}/api/notifications/user/{}",
            address, passenger_user_id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!notifications.is_empty());
    assert_eq!(notifications[0]["kind"], "ride_update");

    // Complete the ride
    let response = client
        .put(format!(
            "{}/api/carpool/requests/{}/complete",
            address, request_id
        ))
        .header("Authorization", format!("Bearer {}", driver_token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let completed: serde_json::Value = response.json().await.unwrap();
    assert_eq!(completed["status"], "completed");
}

#[tokio::test]
async fn vehicle_endpoints_converge_on_one_row() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();
    let (token, _, _) = register_and_login(&client, &address, "password123").await;

    let driver: serde_json::Value = client
        .post(format!("{}/api/roles/driver", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let driver_id = driver["id"].as_i64().unwrap();

    // No vehicle yet
    let response = client
        .get(format!("{}/api/vehicles/{}", address, driver_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // License photo arrives before the details
    let form = reqwest::multipart::Form::new().part(
        "front",
        reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF])
            .file_name("front.jpg"),
    );
    let response = client
        .post(format!("{}/api/vehicles/{}/license", address, driver_id))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Details arrive afterwards and must not clobber the license URL
    let response = client
        .put(format!("{}/api/vehicles/{}", address, driver_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "model": "Suzuki Alto",
            "vehicle_type": "Hatchback",
            "color": "White",
            "capacity": 4,
            "plate_number": "ABC-123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let vehicle: serde_json::Value = client
        .get(format!("{}/api/vehicles/{}", address, driver_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(vehicle["model"], "Suzuki Alto");
    assert!(vehicle["license_front_url"].as_str().is_some());
    assert!(vehicle["license_back_url"].is_null());

    // Extension whitelist rejects non-image uploads
    let form = reqwest::multipart::Form::new().part(
        "photo",
        reqwest::multipart::Part::bytes(b"not an image".to_vec()).file_name("car.exe"),
    );
    let response = client
        .post(format!("{}/api/vehicles/{}/photo", address, driver_id))
        .header("Authorization", format!("Bearer {}", token))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let address = spawn_app().await.address;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/roles/driver", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .post(format!("{}/api/carpool/requests", address))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn password_reset_codes_are_single_use() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_token, _, email) = register_and_login(&client, &app.address, "password123").await;

    // Unknown accounts get the same 200 and no code is dispatched
    let response = client
        .post(format!("{}/api/auth/forgot-password", app.address))
        .json(&serde_json::json!({ "email": "nobody@test.local" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(app.sent_codes.lock().unwrap().is_empty());

    let request_code = |client: reqwest::Client, address: String, email: String| async move {
        let response = client
            .post(format!("{}/api/auth/forgot-password", address))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    };

    request_code(client.clone(), app.address.clone(), email.clone()).await;
    let first_code = {
        let sent = app.sent_codes.lock().unwrap();
        let (to, code) = sent.last().expect("no reset code captured").clone();
        assert_eq!(to, email);
        code
    };

    // A wrong guess is rejected and burns the stored code with it
    let response = client
        .post(format!("{}/api/auth/reset-password", app.address))
        .json(&serde_json::json!({
            "email": email,
            "code": "000000",
            "new_password": "hijacked123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .post(format!("{}/api/auth/reset-password", app.address))
        .json(&serde_json::json!({
            "email": email,
            "code": first_code,
            "new_password": "hijacked123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // A fresh code redeems exactly once
    request_code(client.clone(), app.address.clone(), email.clone()).await;
    let second_code = app.sent_codes.lock().unwrap().last().unwrap().1.clone();

    let response = client
        .post(format!("{}/api/auth/reset-password", app.address))
        .json(&serde_json::json!({
            "email": email,
            "code": second_code,
            "new_password": "newpassword456"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/api/auth/reset-password", app.address))
        .json(&serde_json::json!({
            "email": email,
            "code": second_code,
            "new_password": "replayed789"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // Only the new password logs in
    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({ "email": email, "password": "newpassword456" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn replacing_a_photo_removes_the_old_file() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (token, _, _) = register_and_login(&client, &app.address, "password123").await;

    let driver: serde_json::Value = client
        .post(format!("{}/api/roles/driver", app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let driver_id = driver["id"].as_i64().unwrap();

    let upload_photo = |bytes: Vec<u8>| {
        let client = client.clone();
        let address = app.address.clone();
        let token = token.clone();
        async move {
            let form = reqwest::multipart::Form::new().part(
                "photo",
                reqwest::multipart::Part::bytes(bytes).file_name("car.jpg"),
            );
            let response = client
                .post(format!("{}/api/vehicles/{}/photo", address, driver_id))
                .header("Authorization", format!("Bearer {}", token))
                .multipart(form)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status().as_u16(), 200);
            let body: serde_json::Value = response.json().await.unwrap();
            body["vehicle_url"].as_str().unwrap().to_string()
        }
    };

    let first_url = upload_photo(vec![0xFF, 0xD8, 0xFF, 0x01]).await;
    let second_url = upload_photo(vec![0xFF, 0xD8, 0xFF, 0x02]).await;
    assert_ne!(first_url, second_url);

    let stored_path = |url: &str| {
        std::path::Path::new(&app.upload_dir)
            .join(url.strip_prefix("/uploads/").expect("unexpected URL prefix"))
    };
    assert!(
        !stored_path(&first_url).exists(),
        "replaced photo was left on disk"
    );
    assert!(stored_path(&second_url).exists());

    // The row holds only the replacement URL
    let vehicle: serde_json::Value = client
        .get(format!("{}/api/vehicles/{}", app.address, driver_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(vehicle["vehicle_url"].as_str().unwrap(), second_url);
}
