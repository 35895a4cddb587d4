// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    config::MAX_UPLOAD_BYTES,
    handlers::{
        auth, complaint, fare, feedback, matching, notification, offer, profile, request, role,
        vehicle,
    },
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, users, roles, vehicles, carpool, ...).
/// * Applies global middleware (Trace, CORS) and serves uploaded images.
/// * Injects global state (pool, config, OTP store, SMS seam).
pub fn create_router(state: AppState) -> Router {
    // Clients are native apps; CORS only matters for browser-based tooling.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let require_auth = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    let uploads_service = ServeDir::new(&state.config.upload_dir);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .merge(
            Router::new()
                .route("/change-password", post(auth::change_password))
                .layer(require_auth()),
        );

    let user_routes = Router::new()
        .route("/{id}", get(profile::get_user))
        .merge(
            Router::new()
                .route("/me", put(profile::update_me))
                .route(
                    "/me/photo",
                    post(profile::upload_photo).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
                )
                .layer(require_auth()),
        );

    let role_routes = Router::new()
        .route("/driver/user/{user_id}", get(role::get_driver_by_user))
        .route(
            "/passenger/user/{user_id}",
            get(role::get_passenger_by_user),
        )
        .merge(
            Router::new()
                .route("/driver", post(role::become_driver))
                .route("/passenger", post(role::become_passenger))
                .route("/driver/push-token", put(role::set_driver_push_token))
                .route("/passenger/push-token", put(role::set_passenger_push_token))
                .route("/driver/{driver_id}/status", put(role::set_driver_status))
                .layer(require_auth()),
        );

    let vehicle_routes = Router::new()
        .route("/{driver_id}", get(vehicle::get_vehicle))
        .merge(
            Router::new()
                .route("/{driver_id}", put(vehicle::save_details))
                .route(
                    "/{driver_id}/photo",
                    post(vehicle::upload_vehicle_photo)
                        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
                )
                .route(
                    "/{driver_id}/license",
                    post(vehicle::upload_license)
                        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
                )
                .layer(require_auth()),
        );

    let carpool_routes = Router::new()
        .route("/offers/driver/{driver_id}", get(offer::list_driver_offers))
        .route(
            "/requests/passenger/{passenger_id}",
            get(request::list_passenger_requests),
        )
        .route("/requests/pending", get(request::list_pending_requests))
        .route(
            "/matches/driver/{driver_id}",
            get(matching::matches_for_driver),
        )
        .route("/fare", get(fare::quote_fare))
        .route("/profiles/{rider_id}", get(request::get_ride_profile))
        .merge(
            Router::new()
                .route("/offers", post(offer::create_offer))
                .route("/offers/{id}", delete(offer::delete_offer))
                .route("/requests", post(request::create_request))
                .route("/requests/{id}/accept", put(request::accept_request))
                .route("/requests/{id}/reject", put(request::reject_request))
                .route("/requests/{id}/join", put(request::join_request))
                .route("/requests/{id}/complete", put(request::complete_request))
                .route("/profiles", post(request::save_ride_profile))
                .layer(require_auth()),
        );

    let notification_routes = Router::new()
        .route(
            "/user/{user_id}",
            get(notification::list_user_notifications),
        )
        .merge(
            Router::new()
                .route("/", post(notification::create_notification))
                .route("/{id}/read", put(notification::mark_read))
                .layer(require_auth()),
        );

    let complaint_routes = Router::new()
        .route(
            "/",
            post(complaint::create_complaint).get(complaint::list_complaints),
        )
        .layer(require_auth());

    let feedback_routes = Router::new()
        .route("/", post(feedback::create_app_feedback))
        .route("/ride", post(feedback::create_ride_feedback))
        .layer(require_auth());

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/roles", role_routes)
        .nest("/api/vehicles", vehicle_routes)
        .nest("/api/carpool", carpool_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/complaints", complaint_routes)
        .nest("/api/feedback", feedback_routes)
        .nest_service("/uploads", uploads_service)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
