use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::FormEvent;
use crate::form::FieldErrors;

pub type DoctorId = i64;
pub type PatientId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressType {
    #[default]
    Home,
    SecondHome,
    Work,
    Holiday,
    Relative,
}

impl AddressType {
    pub const ALL: [AddressType; 5] = [
        AddressType::Home,
        AddressType::SecondHome,
        AddressType::Work,
        AddressType::Holiday,
        AddressType::Relative,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AddressType::Home => "Home",
            AddressType::SecondHome => "Second Home",
            AddressType::Work => "Work",
            AddressType::Holiday => "Holiday",
            AddressType::Relative => "Relative",
        }
    }

    /// Work and relative addresses get their own treatment in the UI.
    pub fn is_privileged(&self) -> bool {
        matches!(self, AddressType::Work | AddressType::Relative)
    }
}

/// Select-box entry for an address type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressTypeOption {
    pub title: String,
    pub value: AddressType,
}

pub fn address_type_options() -> Vec<AddressTypeOption> {
    AddressType::ALL
        .iter()
        .map(|t| AddressTypeOption {
            title: t.title().to_string(),
            value: *t,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    #[default]
    Create,
    Edit,
    View,
}

/// Mode requested by (and reported after) a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionMode {
    Save,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormAccess {
    #[default]
    Editable,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRef {
    pub id: DoctorId,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
}

impl DoctorRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn display_label(&self) -> String {
        format!("{} {}, {}", self.first_name, self.last_name, self.title)
    }
}

/// Address as supplied by the host. Absent fields leave the form untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRecord {
    #[serde(rename = "type", default)]
    pub address_type: Option<AddressType>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
}

/// Patient as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PatientId>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub vat_code: Option<String>,
    #[serde(default)]
    pub doctor: Option<DoctorId>,
    #[serde(default)]
    pub addresses: Option<Vec<AddressRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressEntry {
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub name: String,
    pub street: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub zipcode: String,
}

/// Snapshot of every field in the form at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFormValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PatientId>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub vat_code: String,
    pub doctor: String,
    pub addresses: Vec<AddressEntry>,
}

/// Text fields at patient level that the UI may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatientField {
    FirstName,
    LastName,
    VatCode,
    Doctor,
}

/// Text fields inside an address block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    Name,
    Street,
    Phone,
    Email,
    City,
    Country,
    Zipcode,
}

/// Host inputs that changed in one notification. `None` means unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub mode: Option<FormMode>,
    #[serde(default)]
    pub patient: Option<PatientRecord>,
    #[serde(default)]
    pub doctors: Option<Vec<DoctorRef>>,
}

// =====================================================================================
// HTTP REQUESTS & RESPONSES
// =====================================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPatientFieldsRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub vat_code: Option<String>,
    #[serde(default)]
    pub doctor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub mode: ActionMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorFilterQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub id: Uuid,
    pub title: String,
    pub mode: FormMode,
    pub access: FormAccess,
    pub valid: bool,
    pub value: PatientFormValue,
    pub errors: Vec<FieldErrors>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormActionResponse {
    pub state: FormState,
    pub events: Vec<FormEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FormError {
    #[error("Form is locked")]
    Locked,

    #[error("Address index {index} out of range for {len} address(es)")]
    AddressIndexOutOfRange { index: usize, len: usize },
}
