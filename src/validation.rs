//! validation.rs
//!
//! Pure input validation for the plain-text checkout fields.
//!
//! `validate()` maps a snapshot of [`FormInputs`] to a [`ValidationErrors`]
//! map. A field that is absent from the map is valid; an empty string is
//! never stored as an error message. The function does no I/O and is cheap
//! enough to run on every keystroke.

use std::collections::BTreeMap;

/// The plain-text inputs owned by the form session.
///
/// The secure card fields (number, expiry, CVC) are *not* here: those live
/// inside the external widget and are tracked in
/// [`crate::secure_fields::SecureFieldSet`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormInputs {
    pub card_holder_name: String,
    pub zip_code: String,
    pub state_code: String,
}

/// Identifies one of the plain-text fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormField {
    CardHolderName,
    ZipCode,
    StateCode,
}

impl FormInputs {
    /// Replace the value of a single field.
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::CardHolderName => self.card_holder_name = value,
            FormField::ZipCode => self.zip_code = value,
            FormField::StateCode => self.state_code = value,
        }
    }
}

/// Field-level validation errors. Absence of a key means the field is valid.
pub type ValidationErrors = BTreeMap<FormField, String>;

/// Validate a snapshot of the plain-text inputs.
pub fn validate(inputs: &FormInputs) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if inputs.card_holder_name.trim().is_empty() {
        errors.insert(
            FormField::CardHolderName,
            "Name on card is required.".to_string(),
        );
    }

    if !is_valid_zip(&inputs.zip_code) {
        errors.insert(
            FormField::ZipCode,
            "Enter a valid ZIP code (for example 90210 or 90210-1234).".to_string(),
        );
    }

    if !is_state_abbreviation(&inputs.state_code) {
        errors.insert(FormField::StateCode, "Select a state.".to_string());
    }

    errors
}

/// A 5-digit US ZIP code, optionally followed by `-` and a 4-digit suffix.
pub fn is_valid_zip(zip: &str) -> bool {
    let bytes = zip.as_bytes();
    match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[5] == b'-'
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

/// Whether `code` is one of the enumerated US state/territory abbreviations.
pub fn is_state_abbreviation(code: &str) -> bool {
    US_STATES.iter().any(|(abbr, _)| *abbr == code)
}

/// US states, the District of Columbia, and the inhabited territories, as
/// `(abbreviation, name)` pairs. Also feeds the state `<select>` options.
pub const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AS", "American Samoa"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("GU", "Guam"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("MP", "Northern Mariana Islands"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("PR", "Puerto Rico"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VI", "Virgin Islands"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];
