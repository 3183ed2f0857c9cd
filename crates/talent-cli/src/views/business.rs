//! Business views: job postings and candidate matches.

use std::io::{self, Write};

use futures_util::future::join_all;
use talent_client::{ApiClient, ClientResult};
use talent_models::{sort_by_score, CandidateMatch, EditJobForm, Job, JobForm, JobId, UserType};
use talent_session::SessionStore;
use tracing::{info, warn};

use crate::commands::{JobsCommand, MatchesCommand};
use crate::notify::{messages, write_form_errors, Notice};
use crate::views::{require_role, Outcome};

/// One job with its candidates, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct JobMatches {
    pub job: Job,
    pub matches: Vec<CandidateMatch>,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub jobs: Vec<JobMatches>,
}

impl Dashboard {
    /// Fetch all jobs, then every job's matches concurrently.
    ///
    /// Failing to list jobs fails the load. A job whose matches cannot be
    /// fetched is shown with none.
    pub async fn load(client: &ApiClient) -> ClientResult<Self> {
        let jobs = client.list_jobs().await?;

        let fetches = jobs.iter().map(|job| client.list_matches(&job.job_id));
        let results = join_all(fetches).await;

        let jobs = jobs
            .into_iter()
            .zip(results)
            .map(|(job, result)| {
                let mut matches = result.unwrap_or_else(|e| {
                    warn!(job_id = %job.job_id, error = %e, "Failed to load matches for job");
                    Vec::new()
                });
                sort_by_score(&mut matches);
                JobMatches { job, matches }
            })
            .collect();

        Ok(Self { jobs })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.jobs.is_empty() {
            writeln!(out, "No jobs posted yet.")?;
            return Ok(());
        }

        for (i, entry) in self.jobs.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            write_job(out, &entry.job)?;
            write_matches(out, &entry.job.criteria(), &entry.matches)?;
        }
        Ok(())
    }
}

pub async fn dashboard<W: Write>(store: &SessionStore, out: &mut W) -> io::Result<Outcome> {
    if let Some(outcome) = require_role(&store.session(), UserType::Business, out)? {
        return Ok(outcome);
    }

    match Dashboard::load(&store.client()).await {
        Ok(dashboard) => {
            dashboard.write_to(out)?;
            Ok(Outcome::Done)
        }
        Err(e) => {
            warn!(error = %e, "Failed to load jobs");
            Notice::error("Error loading jobs", messages::JOBS_LOAD_FAILED).write_to(out)?;
            Ok(Outcome::Failed)
        }
    }
}

pub async fn jobs<W: Write>(
    store: &SessionStore,
    command: JobsCommand,
    out: &mut W,
) -> io::Result<Outcome> {
    if let Some(outcome) = require_role(&store.session(), UserType::Business, out)? {
        return Ok(outcome);
    }
    let client = store.client();

    match command {
        JobsCommand::List => match client.list_jobs().await {
            Ok(jobs) if jobs.is_empty() => {
                writeln!(out, "No jobs posted yet.")?;
                Ok(Outcome::Done)
            }
            Ok(jobs) => {
                for (i, job) in jobs.iter().enumerate() {
                    if i > 0 {
                        writeln!(out)?;
                    }
                    write_job(out, job)?;
                }
                Ok(Outcome::Done)
            }
            Err(e) => {
                warn!(error = %e, "Failed to list jobs");
                Notice::error("Error loading jobs", messages::JOBS_LOAD_FAILED).write_to(out)?;
                Ok(Outcome::Failed)
            }
        },

        JobsCommand::Create { title, description } => {
            let job = match JobForm::new(title, description).into_request() {
                Ok(job) => job,
                Err(e) => {
                    write_form_errors(out, &e)?;
                    return Ok(Outcome::Failed);
                }
            };

            match client.create_job(&job).await {
                Ok(created) => {
                    info!(job_id = %created.job_id, "Job created");
                    Notice::success("Job created", messages::JOB_CREATED).write_to(out)?;
                    write_job(out, &created)?;
                    Ok(Outcome::Done)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to create job");
                    Notice::error("Error creating job", messages::JOB_CREATE_FAILED)
                        .write_to(out)?;
                    Ok(Outcome::Failed)
                }
            }
        }

        JobsCommand::Edit {
            job_id,
            title,
            description,
            schema,
            weights,
        } => {
            let form = EditJobForm {
                job_id,
                title,
                description,
                schema,
                weights,
            };
            let update = match form.into_update() {
                Ok(update) => update,
                Err(e) => {
                    write_form_errors(out, &e)?;
                    return Ok(Outcome::Failed);
                }
            };

            match client.edit_job(&update).await {
                Ok(job) => {
                    Notice::success("Job updated", messages::JOB_UPDATED).write_to(out)?;
                    write_job(out, &job)?;
                    Ok(Outcome::Done)
                }
                Err(e) => {
                    warn!(job_id = %update.job_id, error = %e, "Failed to update job");
                    Notice::error("Error updating job", messages::JOB_UPDATE_FAILED)
                        .write_to(out)?;
                    Ok(Outcome::Failed)
                }
            }
        }
    }
}

pub async fn matches<W: Write>(
    store: &SessionStore,
    command: MatchesCommand,
    out: &mut W,
) -> io::Result<Outcome> {
    if let Some(outcome) = require_role(&store.session(), UserType::Business, out)? {
        return Ok(outcome);
    }
    let client = store.client();

    let (result, calculated) = match command {
        MatchesCommand::List { job_id } => {
            (client.list_matches(&JobId::from_string(job_id)).await, false)
        }
        MatchesCommand::Resumes { job_id } => (
            client
                .list_resume_matches(&JobId::from_string(job_id))
                .await,
            false,
        ),
        MatchesCommand::Calculate { job_id } => (
            client.calculate_matches(&JobId::from_string(job_id)).await,
            true,
        ),
    };

    match result {
        Ok(mut found) => {
            sort_by_score(&mut found);
            if calculated {
                Notice::success("Matches calculated", messages::MATCHES_CALCULATED)
                    .write_to(out)?;
            }
            write_matches(out, &criteria_of(&found), &found)?;
            Ok(Outcome::Done)
        }
        Err(e) if calculated => {
            warn!(error = %e, "Failed to calculate matches");
            Notice::error("Error calculating matches", messages::MATCHES_CALCULATE_FAILED)
                .write_to(out)?;
            Ok(Outcome::Failed)
        }
        Err(e) => {
            warn!(error = %e, "Failed to load matches");
            Notice::error("Error loading matches", messages::MATCHES_LOAD_FAILED).write_to(out)?;
            Ok(Outcome::Failed)
        }
    }
}

fn write_job<W: Write>(out: &mut W, job: &Job) -> io::Result<()> {
    writeln!(out, "{} ({})", job.job_title, job.job_id)?;
    writeln!(out, "  {}", job.job_desc)?;

    let criteria = job.criteria();
    if !criteria.is_empty() {
        let weighted: Vec<String> = criteria
            .iter()
            .map(|c| match job.rating_schema_weights.as_ref().and_then(|w| w.get(c)) {
                Some(weight) => format!("{} x{}", c, weight),
                None => c.clone(),
            })
            .collect();
        writeln!(out, "  Criteria: {}", weighted.join(", "))?;
    }
    Ok(())
}

/// Union of rating keys across all matches, in first-seen order.
fn criteria_of(matches: &[CandidateMatch]) -> Vec<String> {
    let mut criteria: Vec<String> = Vec::new();
    for m in matches {
        for key in m.ratings.keys() {
            if !criteria.contains(key) {
                criteria.push(key.clone());
            }
        }
    }
    criteria
}

fn write_matches<W: Write>(
    out: &mut W,
    criteria: &[String],
    matches: &[CandidateMatch],
) -> io::Result<()> {
    if matches.is_empty() {
        writeln!(out, "  No matches yet.")?;
        return Ok(());
    }

    for (rank, m) in matches.iter().enumerate() {
        write!(out, "  {:>2}. {:<24} {:>6.2}", rank + 1, m.name, m.score)?;
        for criterion in criteria {
            match m.rating(criterion) {
                Some(r) => write!(out, "  {}={}", criterion, r)?,
                None => write!(out, "  {}=-", criterion)?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
