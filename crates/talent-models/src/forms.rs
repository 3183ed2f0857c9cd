//! Client-side form validation.
//!
//! Forms are checked before any request is issued. Messages are the fixed
//! strings shown next to the offending field.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::job::{JobId, JobUpdate, NewJob, RatingWeights};
use crate::user::{LoginRequest, RegisterRequest, UserType};

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: u64 = 6;

/// A form failed client-side validation.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("{}", join_messages(.0))]
    Invalid(ValidationErrors),

    #[error("{message}")]
    Field {
        field: &'static str,
        message: String,
    },
}

impl FormError {
    fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Field {
            field,
            message: message.into(),
        }
    }

    /// `(field, message)` pairs, one per failing field, sorted by field name.
    pub fn messages(&self) -> Vec<(String, String)> {
        match self {
            FormError::Invalid(errors) => collect_messages(errors),
            FormError::Field { field, message } => vec![(field.to_string(), message.clone())],
        }
    }
}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

fn collect_messages(errors: &ValidationErrors) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            // First failing rule wins, mirroring one message per field.
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect();
    out.sort();
    out
}

fn join_messages(errors: &ValidationErrors) -> String {
    collect_messages(errors)
        .into_iter()
        .map(|(_, message)| message)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Auth forms
// =============================================================================

/// Login form. The username is the account e-mail.
#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Validate and convert into a wire request.
    pub fn into_request(self) -> Result<LoginRequest, FormError> {
        self.validate()?;
        Ok(LoginRequest::new(self.username, self.password))
    }
}

/// Registration form.
#[derive(Debug, Clone, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub username: String,

    #[validate(length(min = MIN_PASSWORD_LEN, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub user_type: UserType,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
}

impl RegisterForm {
    pub fn into_request(self) -> Result<RegisterRequest, FormError> {
        let form = Self {
            name: self.name.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password,
            user_type: self.user_type,
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
        };
        form.validate()?;

        Ok(RegisterRequest {
            name: form.name,
            email: form.username,
            password: form.password,
            user_type: form.user_type,
            city: form.city,
            country: form.country,
        })
    }
}

// =============================================================================
// Job forms
// =============================================================================

/// New job posting form.
#[derive(Debug, Clone, Validate)]
pub struct JobForm {
    #[validate(length(min = 1, message = "Job title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Job description is required"))]
    pub description: String,
}

impl JobForm {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            description: description.into().trim().to_string(),
        }
    }

    pub fn into_request(self) -> Result<NewJob, FormError> {
        self.validate()?;
        Ok(NewJob {
            job_title: self.title,
            job_desc: self.description,
        })
    }
}

/// Edit form. Schema and weights arrive as raw JSON text.
#[derive(Debug, Clone, Default)]
pub struct EditJobForm {
    pub job_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub schema: Option<String>,
    pub weights: Option<String>,
}

impl EditJobForm {
    /// Parse into a partial update. Blank fields count as unset.
    pub fn into_update(self) -> Result<JobUpdate, FormError> {
        let job_id = self.job_id.trim();
        if job_id.is_empty() {
            return Err(FormError::field("job_id", "Job id is required"));
        }

        let mut update = JobUpdate::new(JobId::from_string(job_id));
        update.job_title = non_blank(self.title);
        update.job_desc = non_blank(self.description);

        if let Some(text) = non_blank(self.schema) {
            match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(schema)) => update.rating_schema = Some(schema),
                _ => {
                    return Err(FormError::field(
                        "schema",
                        "The rating schema must be valid JSON.",
                    ))
                }
            }
        }

        if let Some(text) = non_blank(self.weights) {
            update.rating_schema_weights = Some(parse_weights(&text)?);
        }

        if update.is_empty() {
            return Err(FormError::field("job", "No fields to update"));
        }

        Ok(update)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_weights(text: &str) -> Result<RatingWeights, FormError> {
    let invalid = || {
        FormError::field(
            "weights",
            "The rating schema weights must be a JSON object of numbers.",
        )
    };

    let map: Map<String, Value> = serde_json::from_str(text).map_err(|_| invalid())?;
    map.into_iter()
        .map(|(k, v)| v.as_f64().map(|w| (k, w)).ok_or_else(invalid))
        .collect()
}

// =============================================================================
// Resume upload
// =============================================================================

/// A resume file accepted for upload (PDF only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    path: PathBuf,
    file_name: String,
}

impl ResumeFile {
    /// Check the file name. The backend only accepts names ending in `.pdf`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FormError::field("file", "Please upload a PDF file"))?;

        if !file_name.ends_with(".pdf") {
            return Err(FormError::field("file", "Please upload a PDF file"));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}
