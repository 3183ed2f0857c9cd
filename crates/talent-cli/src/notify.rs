//! User-facing notifications.
//!
//! Backend and transport failures never reach the user verbatim; each
//! operation has one fixed message and the cause goes to the log.

use std::fmt;
use std::io::{self, Write};

use talent_models::FormError;

/// Fixed notification texts.
pub mod messages {
    pub const JOBS_LOAD_FAILED: &str = "There was an error loading your jobs.";
    pub const MATCHES_LOAD_FAILED: &str = "There was an error loading the matches.";
    pub const JOB_CREATED: &str = "Your job has been successfully created.";
    pub const JOB_CREATE_FAILED: &str = "There was an error creating your job.";
    pub const JOB_UPDATED: &str = "Your job has been successfully updated.";
    pub const JOB_UPDATE_FAILED: &str = "There was an error updating your job.";
    pub const MATCHES_CALCULATED: &str = "The matches have been successfully calculated.";
    pub const MATCHES_CALCULATE_FAILED: &str = "There was an error calculating the matches.";
    pub const RESUME_UPLOADED: &str = "Your resume has been successfully uploaded";
    pub const RESUME_UPLOAD_FAILED: &str = "There was an error uploading your resume";
    pub const RESUME_UNREADABLE: &str = "The selected file could not be read.";
    pub const SIGN_IN_REQUIRED: &str = "Please log in to continue.";
    pub const BUSINESS_ONLY: &str = "This page is only available to business accounts.";
    pub const SEEKER_ONLY: &str = "Resume upload is only available to job seeker accounts.";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Error,
}

/// A toast-style notification: short title plus description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Success => "ok",
            Level::Info => "info",
            Level::Error => "error",
        };
        write!(f, "[{}] {}: {}", tag, self.title, self.description)
    }
}

/// Print per-field validation messages.
pub fn write_form_errors<W: Write>(out: &mut W, err: &FormError) -> io::Result<()> {
    writeln!(out, "[error] Please fix the following:")?;
    for (field, message) in err.messages() {
        writeln!(out, "  {}: {}", field, message)?;
    }
    Ok(())
}
