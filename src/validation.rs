use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::models::Urgency;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub static STATE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{2}$").unwrap());
pub static ZIP_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9][0-9-]{4,8}$").unwrap());

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn with_fields(errors: Vec<FieldError>) -> Self {
        Self {
            message: "Validation failed".to_string(),
            errors,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn from_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .clone()
                        .unwrap_or_else(|| "Invalid value".into())
                        .to_string(),
                })
            })
            .collect();

        fields.sort_by(|a, b| a.field.cmp(&b.field));
        fields
    }
}

pub trait ValidateExt {
    fn validate_request(&self) -> Result<(), AppError>;
}

impl<T: Validate> ValidateExt for T {
    fn validate_request(&self) -> Result<(), AppError> {
        self.validate().map_err(AppError::from)
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("'{}' is not a YYYY-MM-DD date", value)))
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "Field is required"));
    }
    Ok(())
}

pub fn iso_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value)
        .map(|_| ())
        .map_err(|_| invalid("date", "Date must be formatted as YYYY-MM-DD"))
}

pub fn iso_date_not_past(value: &str) -> Result<(), ValidationError> {
    iso_date(value)?;

    match parse_date(value) {
        Ok(date) if date < today() => Err(invalid("past_date", "Event date cannot be in the past")),
        _ => Ok(()),
    }
}

pub fn iso_dates(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|value| parse_date(value).is_err()) {
        return Err(invalid("date", "Every date must be formatted as YYYY-MM-DD"));
    }
    Ok(())
}

pub fn skill_names(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|skill| skill.trim().is_empty()) {
        return Err(invalid("skill", "Skills cannot be blank"));
    }
    if values.iter().any(|skill| skill.trim().chars().count() > 50) {
        return Err(invalid("skill", "Skills must be at most 50 characters"));
    }
    Ok(())
}

pub fn urgency_label(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Urgency>()
        .map(|_| ())
        .map_err(|_| invalid("urgency", "Urgency must be one of Low, Medium or High"))
}
