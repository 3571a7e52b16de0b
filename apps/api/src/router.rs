use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use patient_form_cell::create_patient_form_router;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Patient Form API is running!" }))
        .nest("/forms", create_patient_form_router(state))
}
