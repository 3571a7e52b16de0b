// =====================================================================================
// PATIENT FORM CONTROLLER - ONE PATIENT, MANY ADDRESSES, VIEW/EDIT LIFECYCLE
// =====================================================================================

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::events::{FormEvent, FormEventSink};
use crate::form::{FieldErrors, PatientForm, PatientPatch, ValidationError};
use crate::models::{
    ActionMode, AddressField, AddressType, DoctorRef, FormAccess, FormError, FormMode,
    InputChanges, PatientField, PatientFormValue, PatientRecord,
};
use crate::services::age::{age_on, is_adult};
use crate::services::builder::{FormBuilder, FormSettings};
use crate::services::doctors::{filter_doctors, resolve_doctor_label};

pub const EDIT_TITLE: &str = "Edit Patient";

pub struct PatientFormController {
    builder: FormBuilder,
    sink: Box<dyn FormEventSink>,
    form: PatientForm,
    title: String,
    mode: FormMode,
    patient: Option<PatientRecord>,
    doctors: Option<Vec<DoctorRef>>,
    filtered_doctors: Vec<DoctorRef>,
}

impl PatientFormController {
    /// Creates a controller with an initialized, empty form.
    pub fn new(settings: FormSettings, sink: Box<dyn FormEventSink>) -> Self {
        let builder = FormBuilder::new(settings);
        let form = builder.patient_form(current_date());
        Self {
            builder,
            sink,
            form,
            title: String::new(),
            mode: FormMode::default(),
            patient: None,
            doctors: None,
            filtered_doctors: Vec::new(),
        }
    }

    /// Rebuilds the empty form: required names, birth date and doctor, an
    /// optional VAT code, and one default address.
    #[instrument(skip(self))]
    pub fn initialize(&mut self) {
        self.form = self.builder.patient_form(current_date());
        debug!("Patient form initialized with one default address");
    }

    pub fn apply_inputs(&mut self, changes: InputChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(mode) = changes.mode {
            self.mode = mode;
        }
        if let Some(patient) = changes.patient {
            self.patient = Some(patient);
        }
        if let Some(doctors) = changes.doctors {
            self.doctors = Some(doctors);
        }
        self.on_inputs_changed();
    }

    /// Refreshes the form from the current host inputs. With both a patient
    /// and a doctor list present, the patient is patched in and the whole
    /// form is locked until `enter_edit_mode`.
    #[instrument(skip(self))]
    pub fn on_inputs_changed(&mut self) {
        self.filtered_doctors = self.doctors.clone().unwrap_or_default();

        let (Some(patient), Some(doctors)) = (&self.patient, &self.doctors) else {
            return;
        };

        let mut working_copy = PatientPatch::from(patient.clone());
        if let Some(doctor_id) = patient.doctor {
            match resolve_doctor_label(doctors, doctor_id) {
                Some(label) => working_copy.doctor = Some(label),
                None => debug!("Doctor {} not in list, keeping raw id", doctor_id),
            }
        }

        self.form.patch(&working_copy);
        self.form.lock();
        debug!("Patient {:?} applied to form, form locked", patient.id);
    }

    /// Appends a default address and returns the new count.
    #[instrument(skip(self))]
    pub fn add_address(&mut self) -> Result<usize, FormError> {
        let group = self.builder.address_group();
        let count = self.form.push_address(group)?;
        debug!("Address added, {} address(es) now", count);
        Ok(count)
    }

    /// Removes the address at `index`. Nothing stops the last one going.
    #[instrument(skip(self))]
    pub fn remove_address(&mut self, index: usize) -> Result<(), FormError> {
        self.form.remove_address(index)?;
        debug!("Address {} removed, {} left", index, self.form.addresses().len());
        Ok(())
    }

    pub fn is_privileged_address_type(&self, index: usize) -> Result<bool, FormError> {
        Ok(self.form.address(index)?.is_privileged())
    }

    pub fn set_field(&mut self, field: PatientField, value: String) -> Result<(), FormError> {
        self.form.set_field(field, value)
    }

    pub fn set_birth_date(&mut self, value: Option<NaiveDate>) -> Result<(), FormError> {
        self.form.set_birth_date(value)
    }

    pub fn set_address_field(
        &mut self,
        index: usize,
        field: AddressField,
        value: String,
    ) -> Result<(), FormError> {
        self.form.set_address_field(index, field, value)
    }

    pub fn set_address_type(&mut self, index: usize, value: AddressType) -> Result<(), FormError> {
        self.form.set_address_type(index, value)
    }

    pub fn evaluate_adult_status(&mut self) -> Option<i32> {
        self.evaluate_adult_status_on(current_date())
    }

    /// Adults get the VAT code touched and flagged with an informational age
    /// marker; minors (or a missing birth date) get it cleared.
    #[instrument(skip(self))]
    pub fn evaluate_adult_status_on(&mut self, today: NaiveDate) -> Option<i32> {
        let birth_date = *self.form.birth_date.value();
        let age = birth_date.map(|birth_date| age_on(birth_date, today));

        match age {
            Some(age) if is_adult(age, self.builder.settings().adult_age) => {
                self.form.vat_code.mark_as_touched();
                self.form.vat_code.set_custom_error(Some(ValidationError::Age { age }));
                debug!("Patient is an adult ({}), VAT code flagged", age);
            }
            _ => {
                self.form.vat_code.reset();
                self.form.vat_code.set_custom_error(None);
                debug!("Patient is not an adult ({:?}), VAT code cleared", age);
            }
        }

        age
    }

    #[instrument(skip(self))]
    pub fn enter_edit_mode(&mut self) {
        self.mode = FormMode::Edit;
        self.title = EDIT_TITLE.to_string();
        self.form.unlock();
        self.sink.emit(FormEvent::ScrollToTop);
        debug!("Form switched to edit mode");
    }

    /// Emits the resolved mode and then the form snapshot, returning the
    /// snapshot. Validity is not checked here.
    #[instrument(skip(self))]
    pub fn submit_action(&mut self, requested: ActionMode) -> PatientFormValue {
        let resolved = if self.mode == FormMode::Edit {
            ActionMode::Edit
        } else {
            requested
        };
        self.sink.emit(FormEvent::ActionMode(resolved));

        if resolved != ActionMode::Save {
            let id = self.patient.as_ref().and_then(|patient| patient.id);
            self.form.attach_id(id);
        }

        let mut value = self.form.value();
        if resolved != ActionMode::Delete {
            for address in &mut value.addresses {
                address.phone = strip_whitespace(&address.phone);
            }
        }

        info!(
            "Submitting patient form: requested {:?}, resolved {:?}, {} address(es)",
            requested,
            resolved,
            value.addresses.len()
        );
        self.sink.emit(FormEvent::Patient(value.clone()));
        value
    }

    /// Narrows the displayed doctor list; the full list is left alone.
    pub fn filter_doctors(&mut self, query: &str) -> &[DoctorRef] {
        let doctors = self.doctors.as_deref().unwrap_or_default();
        self.filtered_doctors = filter_doctors(doctors, query);
        &self.filtered_doctors
    }

    pub fn form(&self) -> &PatientForm {
        &self.form
    }

    pub fn value(&self) -> PatientFormValue {
        self.form.value()
    }

    pub fn errors(&self) -> Vec<FieldErrors> {
        self.form.errors()
    }

    pub fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    pub fn access(&self) -> FormAccess {
        self.form.access()
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn patient(&self) -> Option<&PatientRecord> {
        self.patient.as_ref()
    }

    pub fn doctors(&self) -> &[DoctorRef] {
        self.doctors.as_deref().unwrap_or_default()
    }

    pub fn filtered_doctors(&self) -> &[DoctorRef] {
        &self.filtered_doctors
    }
}

fn current_date() -> NaiveDate {
    Utc::now().date_naive()
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_whitespace() {
        assert_eq!(strip_whitespace("+39 333 12\t34 567"), "+393331234567");
        assert_eq!(strip_whitespace(""), "");
    }
}
