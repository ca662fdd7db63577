// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, survey},
    state::AppState,
    utils::jwt::admin_middleware,
};

/// Assembles the main application router.
///
/// * Public survey routes (catalog, submission).
/// * Admin login/session routes, and the dashboard routes behind `admin_middleware`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let survey_routes = Router::new()
        .route("/questions", get(survey::list_questions))
        .route("/responses", post(survey::submit_response));

    let dashboard_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route("/summary", get(admin::get_summary))
        .route(
            "/responses",
            get(admin::list_responses).delete(admin::wipe_responses),
        )
        .route("/charts", get(admin::get_charts))
        .route("/table", get(admin::get_table))
        .route("/export.csv", get(admin::export_csv))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ));

    let admin_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/session", get(auth::session_status))
        .merge(dashboard_routes);

    Router::new()
        .nest("/api/survey", survey_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
