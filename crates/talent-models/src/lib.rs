//! Shared data models for the Talent Match client.
//!
//! This crate provides Serde-serializable types for:
//! - Accounts, credentials and user profiles
//! - Business job postings and partial job updates
//! - Server-computed candidate matches
//! - Client-side form validation

pub mod forms;
pub mod job;
pub mod matching;
pub mod user;

// Re-export common types
pub use forms::{
    EditJobForm, FormError, JobForm, LoginForm, RegisterForm, ResumeFile, MIN_PASSWORD_LEN,
};
pub use job::{Job, JobId, JobUpdate, NewJob, RatingWeights};
pub use matching::{sort_by_score, CandidateMatch};
pub use user::{Credential, LoginRequest, Profile, RegisterRequest, TokenResponse, UserType};
