use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use shared_config::AppConfig;

use crate::handlers::*;

pub fn create_patient_form_router(config: Arc<AppConfig>) -> Router {
    let state = Arc::new(PatientFormState::new(&config));

    Router::new()
        .route("/", post(create_form))
        .route("/address-types", get(list_address_types))
        .route("/{id}", get(get_form).delete(delete_form))
        .route("/{id}/inputs", put(apply_inputs))
        .route("/{id}/fields", patch(set_patient_fields))
        .route("/{id}/addresses", post(add_address))
        .route("/{id}/addresses/{index}", patch(update_address).delete(remove_address))
        .route("/{id}/addresses/{index}/privileged", get(address_privileged))
        .route("/{id}/adult-status", post(evaluate_adult_status))
        .route("/{id}/edit", post(enter_edit_mode))
        .route("/{id}/submit", post(submit_form))
        .route("/{id}/doctors", get(filter_doctors))
        .with_state(state)
}
