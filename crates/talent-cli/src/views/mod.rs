//! Presentational views.
//!
//! Each view validates its input, issues at most the commands it needs
//! through the session store or its bound client, and writes either the result
//! or a fixed notification.

pub mod auth;
pub mod business;
pub mod profile;

use std::io::{self, Write};

use talent_models::UserType;
use talent_session::Session;

use crate::notify::{messages, Notice};

/// How a view ended, for the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed)
    }
}

/// Print a notice and report failure unless the session has `role`.
pub(crate) fn require_role<W: Write>(
    session: &Session,
    role: UserType,
    out: &mut W,
) -> io::Result<Option<Outcome>> {
    if !session.is_authenticated() {
        Notice::info("Sign in required", messages::SIGN_IN_REQUIRED).write_to(out)?;
        return Ok(Some(Outcome::Failed));
    }

    if session.user_type() != Some(role) {
        let description = match role {
            UserType::Business => messages::BUSINESS_ONLY,
            UserType::User => messages::SEEKER_ONLY,
        };
        Notice::info("Not available", description).write_to(out)?;
        return Ok(Some(Outcome::Failed));
    }

    Ok(None)
}
