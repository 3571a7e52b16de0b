use chrono::NaiveDate;

use shared_config::AppConfig;

use crate::form::{AddressGroup, FormControl, PatientForm, Validator, PHONE_PATTERN};
use crate::models::AddressType;

#[derive(Debug, Clone)]
pub struct FormSettings {
    pub default_phone_prefix: String,
    pub min_phone_length: usize,
    pub adult_age: i32,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FormSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_phone_prefix: config.default_phone_prefix.clone(),
            min_phone_length: config.min_phone_length,
            adult_age: config.adult_age,
        }
    }
}

/// Builds the nested patient form and its address blocks.
#[derive(Debug, Clone)]
pub struct FormBuilder {
    settings: FormSettings,
}

impl FormBuilder {
    pub fn new(settings: FormSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// Empty patient form with a single default address. Birth dates after
    /// `today` are rejected.
    pub fn patient_form(&self, today: NaiveDate) -> PatientForm {
        PatientForm::new(
            required_text(),
            required_text(),
            FormControl::<Option<NaiveDate>>::new(None)
                .with_validator(Validator::Required)
                .with_validator(Validator::MaxDate(today)),
            FormControl::new(String::new()),
            required_text(),
            vec![self.address_group()],
        )
    }

    pub fn address_group(&self) -> AddressGroup {
        AddressGroup {
            address_type: FormControl::new(AddressType::Home).with_validator(Validator::Required),
            name: FormControl::new(String::new()),
            street: required_text(),
            phone: FormControl::new(self.settings.default_phone_prefix.clone())
                .with_validator(Validator::Required)
                .with_validator(Validator::Pattern(PHONE_PATTERN.clone()))
                .with_validator(Validator::MinLength(self.settings.min_phone_length)),
            email: required_text().with_validator(Validator::Email),
            city: required_text(),
            country: required_text(),
            zipcode: required_text(),
        }
    }
}

fn required_text() -> FormControl<String> {
    FormControl::new(String::new()).with_validator(Validator::Required)
}
