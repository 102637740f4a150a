pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ingest::handlers::{self as resumes, UPLOAD_BODY_LIMIT};
use crate::notify::handlers as contact;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume ingestion
        .route("/api/v1/resumes/parse", post(resumes::handle_parse_resume))
        .route("/api/v1/resumes/text", post(resumes::handle_extract_text))
        .route("/api/v1/resumes/fields", post(resumes::handle_extract_fields))
        // Contact forms
        .route("/api/v1/requests/demo", post(contact::handle_demo_request))
        .route("/api/v1/requests/hiring", post(contact::handle_hiring_request))
        .route("/api/v1/referrals", post(contact::handle_referral))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(state)
}
