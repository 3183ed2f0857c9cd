//! Terminal front-end for the Talent Match backend.
//!
//! Commands map onto the web views: sign-in and registration, resume upload
//! for job seekers, and job postings with candidate matches for businesses.

pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod notify;
pub mod views;

pub use app::App;
pub use commands::{Cli, Command};
pub use config::{CliConfig, LogFormat};
pub use views::Outcome;
