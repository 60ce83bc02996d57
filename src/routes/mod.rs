use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::state::AppState;

pub mod admin;
pub mod applications;
pub mod auth;
pub mod health;
pub mod jobs;
pub mod profiles;

/// Uploads are bounded well above the 5MB per-file limit so oversized CVs
/// reach validation instead of dying at the transport.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub(crate) fn to_iso(timestamp: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(timestamp, Utc).to_rfc3339()
}

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        let allow_origin = AllowOrigin::list(headers);

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    let jobs_routes = Router::new()
        .route("/", get(jobs::list_jobs))
        .route("/:id", get(jobs::job_detail))
        .route("/:id/apply", post(applications::apply_job));

    let profile_routes = Router::new()
        .route("/", get(profiles::profile_overview))
        .route("/applicant", put(profiles::upsert_applicant_profile))
        .route("/employer", put(profiles::upsert_employer_profile));

    let applicant_routes = Router::new()
        .route("/dashboard", get(applications::applicant_dashboard))
        .route("/applications", get(applications::application_history));

    let employer_routes = Router::new()
        .route("/jobs", get(jobs::manage_jobs).post(jobs::post_job))
        .route(
            "/jobs/:id/applications",
            get(applications::view_applicants),
        );

    let applications_routes = Router::new()
        .route(
            "/:id/status",
            patch(applications::update_application_status),
        )
        .route("/:id/cv", get(applications::download_application_cv));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/stats", get(admin::system_stats))
        .route("/users", get(admin::list_users))
        .route(
            "/users/:id",
            get(admin::user_detail).patch(admin::update_user),
        )
        .route("/users/:id/toggle-active", post(admin::toggle_user_active))
        .route("/jobs", get(admin::list_jobs_admin))
        .route("/jobs/:id/status", patch(admin::set_job_status))
        .route("/jobs/:id/toggle-active", post(admin::toggle_job_active))
        .route("/applications", get(admin::list_applications_admin));

    Router::new()
        .route("/api/home", get(jobs::home))
        .nest("/api/auth", auth_routes)
        .nest("/api/jobs", jobs_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/applicant", applicant_routes)
        .nest("/api/employer", employer_routes)
        .nest("/api/applications", applications_routes)
        .nest("/api/admin", admin_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
