//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use talent_models::UserType;

#[derive(Debug, Parser)]
#[command(name = "talent", version, about = "Talent Match client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and sign in
    Register(RegisterArgs),

    /// Sign in with e-mail and password
    Login(LoginArgs),

    /// Forget the saved credential
    Logout,

    /// Show the signed-in profile
    Whoami,

    /// Upload a PDF resume (job seekers)
    Upload {
        /// Path to the resume
        path: PathBuf,
    },

    /// Manage job postings (businesses)
    #[command(subcommand)]
    Jobs(JobsCommand),

    /// View candidate matches (businesses)
    #[command(subcommand)]
    Matches(MatchesCommand),

    /// All jobs with their current matches
    Dashboard,
}

impl Command {
    /// Whether the saved credential should be validated before running.
    pub fn restores_session(&self) -> bool {
        !matches!(self, Command::Logout)
    }
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account e-mail
    #[arg(long, short)]
    pub username: String,

    /// Password
    #[arg(long, short, env = "TALENT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    /// Account e-mail, also used to sign in
    #[arg(long = "email", short = 'u')]
    pub username: String,

    #[arg(long, short, env = "TALENT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// `user` (job seeker) or `business`
    #[arg(long, default_value = "user", value_parser = parse_user_type)]
    pub user_type: UserType,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub country: String,
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// List your job postings
    List,

    /// Post a new job
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },

    /// Change some fields of a job; omitted fields stay as they are
    Edit {
        job_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Rating schema as a JSON object
        #[arg(long)]
        schema: Option<String>,
        /// Criterion weights as a JSON object of numbers
        #[arg(long)]
        weights: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum MatchesCommand {
    /// Stored matches for a job
    List { job_id: String },

    /// Precomputed resume matches for a job
    Resumes { job_id: String },

    /// Recalculate matches for a job
    Calculate { job_id: String },
}

fn parse_user_type(s: &str) -> Result<UserType, String> {
    s.parse()
}
