// =====================================================================================
// FORM MODEL - TYPED CONTROLS, VALIDATORS & THE LOCKABLE PATIENT FORM
// =====================================================================================

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{
    AddressEntry, AddressField, AddressRecord, AddressType, FormAccess, FormError,
    PatientField, PatientFormValue, PatientId, PatientRecord,
};

pub static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s]+$").expect("phone pattern compiles"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

const MAX_EMAIL_LENGTH: usize = 254;
const MAX_EMAIL_LOCAL_LENGTH: usize = 64;

pub fn is_valid_email(email: &str) -> bool {
    let local_len = email.split('@').next().map(str::len).unwrap_or(0);
    email.len() <= MAX_EMAIL_LENGTH
        && local_len <= MAX_EMAIL_LOCAL_LENGTH
        && EMAIL_PATTERN.is_match(email)
}

// =====================================================================================
// VALIDATION
// =====================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationError {
    Required,
    Pattern { pattern: String },
    MinLength { required: usize, actual: usize },
    Email,
    MaxDate { max: NaiveDate },
    /// Informational marker carrying the patient's age.
    Age { age: i32 },
}

impl ValidationError {
    /// Blocking errors make the form invalid; informational ones do not.
    pub fn is_blocking(&self) -> bool {
        !matches!(self, ValidationError::Age { .. })
    }
}

#[derive(Debug, Clone)]
pub enum Validator {
    Required,
    Pattern(Regex),
    MinLength(usize),
    Email,
    MaxDate(NaiveDate),
}

impl Validator {
    /// Only `Required` fires on an empty value.
    pub fn check<T: FieldValue>(&self, value: &T) -> Option<ValidationError> {
        match self {
            Validator::Required => value.is_empty_value().then_some(ValidationError::Required),
            Validator::Pattern(pattern) => value
                .as_text()
                .filter(|text| !text.is_empty() && !pattern.is_match(text))
                .map(|_| ValidationError::Pattern {
                    pattern: pattern.as_str().to_string(),
                }),
            Validator::MinLength(required) => value
                .as_text()
                .filter(|text| !text.is_empty())
                .map(|text| text.chars().count())
                .filter(|actual| actual < required)
                .map(|actual| ValidationError::MinLength {
                    required: *required,
                    actual,
                }),
            Validator::Email => value
                .as_text()
                .filter(|text| !text.is_empty() && !is_valid_email(text))
                .map(|_| ValidationError::Email),
            Validator::MaxDate(max) => value
                .as_date()
                .filter(|date| date > max)
                .map(|_| ValidationError::MaxDate { max: *max }),
        }
    }
}

pub trait FieldValue: Clone + Default {
    fn is_empty_value(&self) -> bool;

    fn as_text(&self) -> Option<&str> {
        None
    }

    fn as_date(&self) -> Option<NaiveDate> {
        None
    }
}

impl FieldValue for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl FieldValue for Option<NaiveDate> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }

    fn as_date(&self) -> Option<NaiveDate> {
        *self
    }
}

impl FieldValue for AddressType {
    fn is_empty_value(&self) -> bool {
        false
    }
}

// =====================================================================================
// CONTROLS
// =====================================================================================

#[derive(Debug, Clone)]
pub struct FormControl<T> {
    value: T,
    validators: Vec<Validator>,
    custom_error: Option<ValidationError>,
    touched: bool,
    dirty: bool,
}

impl<T: FieldValue> FormControl<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            validators: Vec::new(),
            custom_error: None,
            touched: false,
            dirty: false,
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// User edit: marks the control dirty and drops any custom error.
    pub(crate) fn set_value(&mut self, value: T) {
        self.value = value;
        self.dirty = true;
        self.custom_error = None;
    }

    /// Programmatic write from host data; does not count as a user edit.
    pub(crate) fn patch_value(&mut self, value: T) {
        self.value = value;
        self.custom_error = None;
    }

    pub(crate) fn reset(&mut self) {
        self.value = T::default();
        self.touched = false;
        self.dirty = false;
        self.custom_error = None;
    }

    pub(crate) fn mark_as_touched(&mut self) {
        self.touched = true;
    }

    pub(crate) fn set_custom_error(&mut self, error: Option<ValidationError>) {
        self.custom_error = error;
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.validators
            .iter()
            .filter_map(|validator| validator.check(&self.value))
            .chain(self.custom_error.clone())
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.errors().iter().all(|error| !error.is_blocking())
    }
}

/// Errors attached to one field, addressed by its path in the form
/// (`firstName`, `addresses.1.phone`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    pub field: String,
    pub errors: Vec<ValidationError>,
}

fn collect_errors<T: FieldValue>(out: &mut Vec<FieldErrors>, field: String, control: &FormControl<T>) {
    let errors = control.errors();
    if !errors.is_empty() {
        out.push(FieldErrors { field, errors });
    }
}

// =====================================================================================
// ADDRESS GROUP
// =====================================================================================

#[derive(Debug, Clone)]
pub struct AddressGroup {
    pub(crate) address_type: FormControl<AddressType>,
    pub(crate) name: FormControl<String>,
    pub(crate) street: FormControl<String>,
    pub(crate) phone: FormControl<String>,
    pub(crate) email: FormControl<String>,
    pub(crate) city: FormControl<String>,
    pub(crate) country: FormControl<String>,
    pub(crate) zipcode: FormControl<String>,
}

impl AddressGroup {
    pub fn address_type(&self) -> &FormControl<AddressType> {
        &self.address_type
    }

    pub fn control(&self, field: AddressField) -> &FormControl<String> {
        match field {
            AddressField::Name => &self.name,
            AddressField::Street => &self.street,
            AddressField::Phone => &self.phone,
            AddressField::Email => &self.email,
            AddressField::City => &self.city,
            AddressField::Country => &self.country,
            AddressField::Zipcode => &self.zipcode,
        }
    }

    fn control_mut(&mut self, field: AddressField) -> &mut FormControl<String> {
        match field {
            AddressField::Name => &mut self.name,
            AddressField::Street => &mut self.street,
            AddressField::Phone => &mut self.phone,
            AddressField::Email => &mut self.email,
            AddressField::City => &mut self.city,
            AddressField::Country => &mut self.country,
            AddressField::Zipcode => &mut self.zipcode,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.address_type.value().is_privileged()
    }

    pub fn value(&self) -> AddressEntry {
        AddressEntry {
            address_type: *self.address_type.value(),
            name: self.name.value().clone(),
            street: self.street.value().clone(),
            phone: self.phone.value().clone(),
            email: self.email.value().clone(),
            city: self.city.value().clone(),
            country: self.country.value().clone(),
            zipcode: self.zipcode.value().clone(),
        }
    }

    pub(crate) fn patch(&mut self, record: &AddressRecord) {
        if let Some(address_type) = record.address_type {
            self.address_type.patch_value(address_type);
        }
        let text_fields = [
            (AddressField::Name, &record.name),
            (AddressField::Street, &record.street),
            (AddressField::Phone, &record.phone),
            (AddressField::Email, &record.email),
            (AddressField::City, &record.city),
            (AddressField::Country, &record.country),
            (AddressField::Zipcode, &record.zipcode),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                self.control_mut(field).patch_value(value.clone());
            }
        }
    }

    fn collect_errors(&self, index: usize, out: &mut Vec<FieldErrors>) {
        collect_errors(out, format!("addresses.{}.type", index), &self.address_type);
        for field in ADDRESS_TEXT_FIELDS {
            collect_errors(
                out,
                format!("addresses.{}.{}", index, address_field_name(field)),
                self.control(field),
            );
        }
    }

    pub fn is_valid(&self) -> bool {
        self.address_type.is_valid() && ADDRESS_TEXT_FIELDS.iter().all(|f| self.control(*f).is_valid())
    }
}

const ADDRESS_TEXT_FIELDS: [AddressField; 7] = [
    AddressField::Name,
    AddressField::Street,
    AddressField::Phone,
    AddressField::Email,
    AddressField::City,
    AddressField::Country,
    AddressField::Zipcode,
];

fn address_field_name(field: AddressField) -> &'static str {
    match field {
        AddressField::Name => "name",
        AddressField::Street => "street",
        AddressField::Phone => "phone",
        AddressField::Email => "email",
        AddressField::City => "city",
        AddressField::Country => "country",
        AddressField::Zipcode => "zipcode",
    }
}

// =====================================================================================
// PATIENT FORM
// =====================================================================================

/// Working copy of a patient record with the doctor rendered as display text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPatch {
    pub id: Option<PatientId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub vat_code: Option<String>,
    pub doctor: Option<String>,
    pub addresses: Option<Vec<AddressRecord>>,
}

impl From<PatientRecord> for PatientPatch {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            birth_date: record.birth_date,
            vat_code: record.vat_code,
            doctor: record.doctor.map(|id| id.to_string()),
            addresses: record.addresses,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatientForm {
    access: FormAccess,
    /// `Some` once submission attached an id control, even if its value is empty.
    attached_id: Option<Option<PatientId>>,
    pub(crate) first_name: FormControl<String>,
    pub(crate) last_name: FormControl<String>,
    pub(crate) birth_date: FormControl<Option<NaiveDate>>,
    pub(crate) vat_code: FormControl<String>,
    pub(crate) doctor: FormControl<String>,
    pub(crate) addresses: Vec<AddressGroup>,
}

impl PatientForm {
    pub(crate) fn new(
        first_name: FormControl<String>,
        last_name: FormControl<String>,
        birth_date: FormControl<Option<NaiveDate>>,
        vat_code: FormControl<String>,
        doctor: FormControl<String>,
        addresses: Vec<AddressGroup>,
    ) -> Self {
        Self {
            access: FormAccess::Editable,
            attached_id: None,
            first_name,
            last_name,
            birth_date,
            vat_code,
            doctor,
            addresses,
        }
    }

    pub fn access(&self) -> FormAccess {
        self.access
    }

    pub fn is_locked(&self) -> bool {
        self.access == FormAccess::Locked
    }

    pub(crate) fn lock(&mut self) {
        self.access = FormAccess::Locked;
    }

    pub(crate) fn unlock(&mut self) {
        self.access = FormAccess::Editable;
    }

    fn ensure_editable(&self) -> Result<(), FormError> {
        match self.access {
            FormAccess::Editable => Ok(()),
            FormAccess::Locked => Err(FormError::Locked),
        }
    }

    pub fn control(&self, field: PatientField) -> &FormControl<String> {
        match field {
            PatientField::FirstName => &self.first_name,
            PatientField::LastName => &self.last_name,
            PatientField::VatCode => &self.vat_code,
            PatientField::Doctor => &self.doctor,
        }
    }

    fn control_mut(&mut self, field: PatientField) -> &mut FormControl<String> {
        match field {
            PatientField::FirstName => &mut self.first_name,
            PatientField::LastName => &mut self.last_name,
            PatientField::VatCode => &mut self.vat_code,
            PatientField::Doctor => &mut self.doctor,
        }
    }

    pub fn birth_date(&self) -> &FormControl<Option<NaiveDate>> {
        &self.birth_date
    }

    pub fn vat_code(&self) -> &FormControl<String> {
        &self.vat_code
    }

    pub fn addresses(&self) -> &[AddressGroup] {
        &self.addresses
    }

    pub fn address(&self, index: usize) -> Result<&AddressGroup, FormError> {
        self.addresses.get(index).ok_or(FormError::AddressIndexOutOfRange {
            index,
            len: self.addresses.len(),
        })
    }

    fn address_mut(&mut self, index: usize) -> Result<&mut AddressGroup, FormError> {
        let len = self.addresses.len();
        self.addresses
            .get_mut(index)
            .ok_or(FormError::AddressIndexOutOfRange { index, len })
    }

    pub fn set_field(&mut self, field: PatientField, value: String) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.control_mut(field).set_value(value);
        Ok(())
    }

    pub fn set_birth_date(&mut self, value: Option<NaiveDate>) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.birth_date.set_value(value);
        Ok(())
    }

    pub fn set_address_field(
        &mut self,
        index: usize,
        field: AddressField,
        value: String,
    ) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.address_mut(index)?.control_mut(field).set_value(value);
        Ok(())
    }

    pub fn set_address_type(&mut self, index: usize, value: AddressType) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.address_mut(index)?.address_type.set_value(value);
        Ok(())
    }

    /// Appends a group and returns the new address count.
    pub(crate) fn push_address(&mut self, group: AddressGroup) -> Result<usize, FormError> {
        self.ensure_editable()?;
        self.addresses.push(group);
        Ok(self.addresses.len())
    }

    pub(crate) fn remove_address(&mut self, index: usize) -> Result<AddressGroup, FormError> {
        self.ensure_editable()?;
        if index >= self.addresses.len() {
            return Err(FormError::AddressIndexOutOfRange {
                index,
                len: self.addresses.len(),
            });
        }
        Ok(self.addresses.remove(index))
    }

    /// Merge-patch: absent fields keep their state, addresses patch by
    /// position and entries past the current count are dropped. An id only
    /// lands once submission has attached the id control.
    pub(crate) fn patch(&mut self, patch: &PatientPatch) {
        if let (Some(attached), Some(id)) = (self.attached_id.as_mut(), patch.id) {
            *attached = Some(id);
        }
        if let Some(value) = &patch.first_name {
            self.first_name.patch_value(value.clone());
        }
        if let Some(value) = &patch.last_name {
            self.last_name.patch_value(value.clone());
        }
        if let Some(value) = patch.birth_date {
            self.birth_date.patch_value(Some(value));
        }
        if let Some(value) = &patch.vat_code {
            self.vat_code.patch_value(value.clone());
        }
        if let Some(value) = &patch.doctor {
            self.doctor.patch_value(value.clone());
        }
        if let Some(records) = &patch.addresses {
            for (group, record) in self.addresses.iter_mut().zip(records) {
                group.patch(record);
            }
        }
    }

    /// Adds the id control on first call; later calls keep its current value,
    /// which `patch` updates when a new patient arrives.
    pub(crate) fn attach_id(&mut self, id: Option<PatientId>) {
        if self.attached_id.is_none() {
            self.attached_id = Some(id);
        }
    }

    pub fn value(&self) -> PatientFormValue {
        PatientFormValue {
            id: self.attached_id.flatten(),
            first_name: self.first_name.value().clone(),
            last_name: self.last_name.value().clone(),
            birth_date: *self.birth_date.value(),
            vat_code: self.vat_code.value().clone(),
            doctor: self.doctor.value().clone(),
            addresses: self.addresses.iter().map(AddressGroup::value).collect(),
        }
    }

    pub fn errors(&self) -> Vec<FieldErrors> {
        let mut out = Vec::new();
        collect_errors(&mut out, "firstName".to_string(), &self.first_name);
        collect_errors(&mut out, "lastName".to_string(), &self.last_name);
        collect_errors(&mut out, "birthDate".to_string(), &self.birth_date);
        collect_errors(&mut out, "vatCode".to_string(), &self.vat_code);
        collect_errors(&mut out, "doctor".to_string(), &self.doctor);
        for (index, group) in self.addresses.iter().enumerate() {
            group.collect_errors(index, &mut out);
        }
        out
    }

    pub fn is_valid(&self) -> bool {
        self.first_name.is_valid()
            && self.last_name.is_valid()
            && self.birth_date.is_valid()
            && self.vat_code.is_valid()
            && self.doctor.is_valid()
            && self.addresses.iter().all(AddressGroup::is_valid)
    }
}
