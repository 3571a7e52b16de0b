// =====================================================================================
// PATIENT FORM ROUTER TESTS - SESSION LIFECYCLE OVER HTTP
// =====================================================================================

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use patient_form_cell::create_patient_form_router;
use shared_config::AppConfig;

fn setup_router() -> Router {
    create_patient_form_router(Arc::new(AppConfig::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn view_inputs() -> Value {
    json!({
        "title": "Patient",
        "mode": "view",
        "patient": {
            "id": 42,
            "firstName": "Mario",
            "lastName": "Verdi",
            "birthDate": "1980-04-12",
            "vatCode": "VRDMRA80D12F205X",
            "doctor": 1,
            "addresses": [{
                "type": "RELATIVE",
                "street": "Via Roma 1",
                "phone": "+39 02 1234 5678",
                "email": "mario.verdi@example.it",
                "city": "Milano",
                "country": "Italia",
                "zipcode": "20121"
            }]
        },
        "doctors": [
            { "id": 1, "firstName": "Anna", "lastName": "Rossi", "title": "Dr." },
            { "id": 2, "firstName": "Marco", "lastName": "Bianchi", "title": "Prof." }
        ]
    })
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/", Some(json!({ "title": "New Patient", "mode": "create" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["state"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_session_returns_empty_form() {
    let app = setup_router();
    let (status, body) = send(&app, "POST", "/", Some(json!({ "title": "New Patient" }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"]["title"], "New Patient");
    assert_eq!(body["state"]["mode"], "create");
    assert_eq!(body["state"]["access"], "editable");
    assert_eq!(body["state"]["valid"], false);
    assert_eq!(body["state"]["value"]["addresses"][0]["type"], "HOME");
    assert_eq!(body["state"]["value"]["addresses"][0]["phone"], "+39");
    assert_eq!(body["events"], json!([]));
}

#[tokio::test]
async fn test_view_then_edit_then_submit() {
    let app = setup_router();
    let id = create_session(&app).await;

    let (status, body) = send(&app, "PUT", &format!("/{}/inputs", id), Some(view_inputs())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["access"], "locked");
    assert_eq!(body["state"]["value"]["doctor"], "Anna Rossi, Dr.");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/{}/fields", id),
        Some(json!({ "firstName": "Luigi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", &format!("/{}/edit", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["mode"], "edit");
    assert_eq!(body["state"]["title"], "Edit Patient");
    assert_eq!(body["events"], json!([{ "event": "scrollToTop" }]));

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/{}/fields", id),
        Some(json!({ "firstName": "Luigi" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["value"]["firstName"], "Luigi");

    let (status, body) = send(&app, "POST", &format!("/{}/submit", id), Some(json!({ "mode": "save" }))).await;
    assert_eq!(status, StatusCode::OK);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events[0], json!({ "event": "actionMode", "payload": "edit" }));
    assert_eq!(events[1]["event"], "patient");
    assert_eq!(events[1]["payload"]["id"], 42);
    assert_eq!(events[1]["payload"]["addresses"][0]["phone"], "+390212345678");
}

#[tokio::test]
async fn test_address_endpoints() {
    let app = setup_router();
    let id = create_session(&app).await;

    let (status, body) = send(&app, "POST", &format!("/{}/addresses", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["value"]["addresses"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/{}/addresses/1", id),
        Some(json!({ "type": "WORK", "city": "Torino" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["value"]["addresses"][1]["city"], "Torino");

    let (status, body) = send(&app, "GET", &format!("/{}/addresses/1/privileged", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["privileged"], true);

    let (status, _) = send(&app, "DELETE", &format!("/{}/addresses/9", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", &format!("/{}/addresses/0", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["value"]["addresses"][0]["city"], "Torino");
}

#[tokio::test]
async fn test_adult_status_endpoint() {
    let app = setup_router();
    let id = create_session(&app).await;

    send(
        &app,
        "PATCH",
        &format!("/{}/fields", id),
        Some(json!({ "birthDate": "1970-01-01", "vatCode": "ABC" })),
    )
    .await;

    let (status, body) = send(&app, "POST", &format!("/{}/adult-status", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["age"].as_i64().unwrap() >= 56);

    let vat_errors = body["state"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["field"] == "vatCode")
        .cloned()
        .unwrap();
    assert_eq!(vat_errors["errors"][0]["kind"], "age");
}

#[tokio::test]
async fn test_doctor_filter_endpoint() {
    let app = setup_router();
    let id = create_session(&app).await;
    send(&app, "PUT", &format!("/{}/inputs", id), Some(view_inputs())).await;

    let (status, body) = send(&app, "GET", &format!("/{}/doctors?q=ros", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["doctors"][0]["lastName"], "Rossi");

    let (_, body) = send(&app, "GET", &format!("/{}/doctors", id), None).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_address_types_endpoint() {
    let app = setup_router();
    let (status, body) = send(&app, "GET", "/address-types", None).await;

    assert_eq!(status, StatusCode::OK);
    let types = body.as_array().unwrap();
    assert_eq!(types.len(), 5);
    assert_eq!(types[1], json!({ "title": "Second Home", "value": "SECOND_HOME" }));
}

#[tokio::test]
async fn test_unknown_and_discarded_sessions() {
    let app = setup_router();
    let missing = "00000000-0000-4000-8000-000000000000";

    let (status, body) = send(&app, "GET", &format!("/{}", missing), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(missing));

    let id = create_session(&app).await;
    let (status, _) = send(&app, "DELETE", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
