pub mod events;
pub mod form;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use events::{FormEvent, FormEventSink};
pub use form::{FieldErrors, PatientForm, ValidationError};
pub use models::*;
pub use router::create_patient_form_router;
pub use services::{FormBuilder, FormSettings, PatientFormController};
