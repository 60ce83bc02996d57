use chrono::NaiveDate;

use crate::error::FieldError;
use crate::models::{is_valid_job_type, is_valid_registration_role};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const CV_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];
pub const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

const MIN_PASSWORD_LENGTH: usize = 8;

/// Pure field validation. Each function returns the full list of field
/// errors so callers can surface them in one response instead of failing on
/// the first.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if username.trim().is_empty() {
        errors.push(FieldError::new("username", "username must not be empty"));
    }
    if !plausible_email(email) {
        errors.push(FieldError::new("email", "enter a valid email address"));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    if !is_valid_registration_role(role) {
        errors.push(FieldError::new(
            "role",
            "role must be either applicant or employer",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub struct JobForm<'a> {
    pub title: &'a str,
    pub category: &'a str,
    pub location: &'a str,
    pub job_type: &'a str,
    pub salary_min: i64,
    pub salary_max: i64,
    pub description: &'a str,
    pub requirements: &'a str,
    pub responsibilities: &'a str,
    pub application_deadline: NaiveDate,
}

pub fn validate_job_form(form: &JobForm<'_>, today: NaiveDate) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("title", form.title),
        ("category", form.category),
        ("location", form.location),
        ("description", form.description),
        ("requirements", form.requirements),
        ("responsibilities", form.responsibilities),
    ] {
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, format!("{field} must not be empty")));
        }
    }

    if !is_valid_job_type(form.job_type) {
        errors.push(FieldError::new("job_type", "invalid job type"));
    }
    if form.salary_min < 0 {
        errors.push(FieldError::new("salary_min", "salary must not be negative"));
    }
    if form.salary_min > form.salary_max {
        errors.push(FieldError::new(
            "salary_max",
            "minimum salary cannot be greater than maximum salary",
        ));
    }
    if form.application_deadline < today {
        errors.push(FieldError::new(
            "application_deadline",
            "application deadline cannot be in the past",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_cv_upload(filename: &str, size: usize) -> Result<(), Vec<FieldError>> {
    validate_upload("cv", filename, size, CV_EXTENSIONS)
}

pub fn validate_logo_upload(filename: &str, size: usize) -> Result<(), Vec<FieldError>> {
    validate_upload("logo", filename, size, LOGO_EXTENSIONS)
}

fn validate_upload(
    field: &str,
    filename: &str,
    size: usize,
    allowed: &[&str],
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if size > MAX_UPLOAD_BYTES {
        errors.push(FieldError::new(field, "file size must be under 5MB"));
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    let allowed_extension = extension
        .as_deref()
        .map(|ext| allowed.contains(&ext))
        .unwrap_or(false);
    if !allowed_extension {
        errors.push(FieldError::new(
            field,
            format!("only {} files are allowed", allowed.join(", ").to_uppercase()),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn plausible_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
}
