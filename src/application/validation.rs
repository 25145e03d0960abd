//! Field validators for incoming commands.
//!
//! Every validator is pure: it trims its input and returns the normalized
//! value or a [`DomainError::InvalidField`].

use crate::domain::DomainError;

/// Maximum length of a person or vehicle name.
const MAX_NAME_LENGTH: usize = 100;

/// Maximum length of a plate number after normalization.
const MAX_PLATE_LENGTH: usize = 20;

/// Maximum length of a phone number.
const MAX_PHONE_LENGTH: usize = 20;

fn required(field: &'static str, value: &str, max_length: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(DomainError::invalid_field(field, "is required"));
    }

    if trimmed.chars().count() > max_length {
        return Err(DomainError::invalid_field(
            field,
            format!("cannot exceed {max_length} characters"),
        ));
    }

    Ok(trimmed.to_string())
}

/// Validates a person's display name.
///
/// # Errors
///
/// Blank names or names longer than 100 characters.
pub fn validate_person_name(name: &str) -> Result<String, DomainError> {
    required("name", name, MAX_NAME_LENGTH)
}

/// Validates a vehicle's display name, e.g. "Honda City".
///
/// # Errors
///
/// Blank names or names longer than 100 characters.
pub fn validate_vehicle_name(name: &str) -> Result<String, DomainError> {
    required("vehicle_name", name, MAX_NAME_LENGTH)
}

/// Validates and normalizes a plate number to upper case.
///
/// Inner spacing is collapsed to single spaces so `"mh 02  ab 1234"` and
/// `"MH 02 AB 1234"` collide on the unique index.
///
/// # Errors
///
/// Blank plates or plates longer than 20 characters.
pub fn validate_plate_number(plate: &str) -> Result<String, DomainError> {
    let collapsed = plate.split_whitespace().collect::<Vec<_>>().join(" ");
    required("plate_number", &collapsed, MAX_PLATE_LENGTH).map(|plate| plate.to_uppercase())
}

/// Validates an email address. Only the presence of `@` with text on both
/// sides is checked.
///
/// # Errors
///
/// Blank addresses or addresses without a local part and a domain.
pub fn validate_email(email: &str) -> Result<String, DomainError> {
    let email = required("email", email, MAX_NAME_LENGTH)?;

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_lowercase())
        }
        _ => Err(DomainError::invalid_field("email", "must be a valid address")),
    }
}

/// Validates an optional phone number; blank input counts as absent.
///
/// # Errors
///
/// Numbers longer than 20 characters or containing anything but digits,
/// spaces, `+` and `-`.
pub fn validate_phone(phone: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(phone) = phone.map(str::trim).filter(|phone| !phone.is_empty()) else {
        return Ok(None);
    };

    if phone.chars().count() > MAX_PHONE_LENGTH {
        return Err(DomainError::invalid_field(
            "phone",
            format!("cannot exceed {MAX_PHONE_LENGTH} characters"),
        ));
    }

    if !phone
        .chars()
        .all(|character| character.is_ascii_digit() || matches!(character, ' ' | '+' | '-'))
    {
        return Err(DomainError::invalid_field("phone", "must contain only digits"));
    }

    Ok(Some(phone.to_string()))
}
