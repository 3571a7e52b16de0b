use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    address_type_options, AddressField, AddressRecord, DoctorFilterQuery, FormActionResponse,
    FormError, InputChanges, PatientField, SetPatientFieldsRequest, SubmitRequest,
};
use crate::services::{FormSession, FormSessionStore, FormSettings};

pub struct PatientFormState {
    pub store: FormSessionStore,
}

impl PatientFormState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: FormSessionStore::new(FormSettings::from(config)),
        }
    }
}

fn form_error(error: FormError) -> AppError {
    match error {
        FormError::Locked => AppError::Conflict(error.to_string()),
        FormError::AddressIndexOutOfRange { .. } => AppError::NotFound(error.to_string()),
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Form session {} not found", id))
}

/// Runs a fallible controller operation and answers with the session's
/// state and emitted events.
async fn run<F>(state: &PatientFormState, id: Uuid, op: F) -> Result<Json<Value>, AppError>
where
    F: FnOnce(&mut FormSession) -> Result<(), FormError>,
{
    let response = state
        .store
        .with_session(id, |session| -> Result<FormActionResponse, FormError> {
            op(session)?;
            Ok(session.respond())
        })
        .await
        .ok_or_else(|| session_not_found(id))?
        .map_err(form_error)?;

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn create_form(
    State(state): State<Arc<PatientFormState>>,
    Json(request): Json<InputChanges>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let response = state.store.create(request).await;
    info!("Patient form session {} opened", response.state.id);

    Ok((StatusCode::CREATED, Json(json!(response))))
}

#[axum::debug_handler]
pub async fn get_form(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let form_state = state
        .store
        .state(id)
        .await
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(json!(form_state)))
}

#[axum::debug_handler]
pub async fn delete_form(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.store.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

#[axum::debug_handler]
pub async fn apply_inputs(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<InputChanges>,
) -> Result<Json<Value>, AppError> {
    run(&state, id, |session| {
        session.controller.apply_inputs(request);
        Ok(())
    })
    .await
}

#[axum::debug_handler]
pub async fn set_patient_fields(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetPatientFieldsRequest>,
) -> Result<Json<Value>, AppError> {
    run(&state, id, |session| {
        let controller = &mut session.controller;
        let text_fields = [
            (PatientField::FirstName, request.first_name),
            (PatientField::LastName, request.last_name),
            (PatientField::VatCode, request.vat_code),
            (PatientField::Doctor, request.doctor),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                controller.set_field(field, value)?;
            }
        }
        if let Some(birth_date) = request.birth_date {
            controller.set_birth_date(Some(birth_date))?;
        }
        Ok(())
    })
    .await
}

#[axum::debug_handler]
pub async fn add_address(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    run(&state, id, |session| session.controller.add_address().map(|_| ())).await
}

#[axum::debug_handler]
pub async fn remove_address(
    State(state): State<Arc<PatientFormState>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<Value>, AppError> {
    run(&state, id, |session| session.controller.remove_address(index)).await
}

#[axum::debug_handler]
pub async fn update_address(
    State(state): State<Arc<PatientFormState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(request): Json<AddressRecord>,
) -> Result<Json<Value>, AppError> {
    run(&state, id, |session| {
        let controller = &mut session.controller;
        if let Some(address_type) = request.address_type {
            controller.set_address_type(index, address_type)?;
        }
        let text_fields = [
            (AddressField::Name, request.name),
            (AddressField::Street, request.street),
            (AddressField::Phone, request.phone),
            (AddressField::Email, request.email),
            (AddressField::City, request.city),
            (AddressField::Country, request.country),
            (AddressField::Zipcode, request.zipcode),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                controller.set_address_field(index, field, value)?;
            }
        }
        Ok(())
    })
    .await
}

#[axum::debug_handler]
pub async fn address_privileged(
    State(state): State<Arc<PatientFormState>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<Value>, AppError> {
    let privileged = state
        .store
        .with_session(id, |session| session.controller.is_privileged_address_type(index))
        .await
        .ok_or_else(|| session_not_found(id))?
        .map_err(form_error)?;

    Ok(Json(json!({
        "index": index,
        "privileged": privileged
    })))
}

#[axum::debug_handler]
pub async fn evaluate_adult_status(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let (age, response) = state
        .store
        .with_session(id, |session| {
            let age = session.controller.evaluate_adult_status();
            (age, session.respond())
        })
        .await
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(json!({
        "age": age,
        "state": response.state,
        "events": response.events
    })))
}

#[axum::debug_handler]
pub async fn enter_edit_mode(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    run(&state, id, |session| {
        session.controller.enter_edit_mode();
        Ok(())
    })
    .await
}

#[axum::debug_handler]
pub async fn submit_form(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<Value>, AppError> {
    run(&state, id, |session| {
        session.controller.submit_action(request.mode);
        Ok(())
    })
    .await
}

#[axum::debug_handler]
pub async fn filter_doctors(
    State(state): State<Arc<PatientFormState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DoctorFilterQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = state
        .store
        .with_session(id, |session| {
            session
                .controller
                .filter_doctors(query.q.as_deref().unwrap_or_default())
                .to_vec()
        })
        .await
        .ok_or_else(|| session_not_found(id))?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn list_address_types() -> Json<Value> {
    Json(json!(address_type_options()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_form_error_status() {
        let locked = form_error(FormError::Locked).into_response();
        assert_eq!(locked.status(), StatusCode::CONFLICT);

        let missing = form_error(FormError::AddressIndexOutOfRange { index: 3, len: 1 });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_state_builds_store_from_config() {
        let state = PatientFormState::new(&AppConfig::default());
        assert!(state.store.is_empty().await);
    }
}
