use std::fmt;

use tracing::info;

use crate::api_client::RecruitingApi;
use crate::errors::{ClientError, ClientResult};
use crate::models::{Job, NewJob};
use crate::screens::{mutation_failed, refetched, Loadable, LOADING};

#[derive(Debug, Default)]
pub struct JobsScreen {
    pub jobs: Loadable<Vec<Job>>,
}

impl JobsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let result = api.list_jobs().await;
        self.jobs.settle("fetching jobs", result)
    }

    pub async fn create(&mut self, api: &dyn RecruitingApi, new_job: NewJob) -> ClientResult<()> {
        validate(&new_job)?;
        let job = mutation_failed("creating job", api.create_job(&new_job).await)?;
        info!("Created job {} ({})", job.id, job.title);
        refetched(self.load(api).await)
    }
}

fn validate(new_job: &NewJob) -> ClientResult<()> {
    if new_job.title.trim().is_empty() {
        return Err(ClientError::MissingField("title"));
    }
    if new_job.department.trim().is_empty() {
        return Err(ClientError::MissingField("department"));
    }
    if new_job.positions < 1 {
        return Err(ClientError::Validation {
            message: "positions must be at least 1".to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for JobsScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Job Openings ==")?;
        let Some(jobs) = self.jobs.get() else {
            return writeln!(f, "{LOADING}");
        };
        if jobs.is_empty() {
            writeln!(f, "  No job openings yet")?;
        }
        for job in jobs {
            writeln!(
                f,
                "  #{:<4} {:<28} {:<14} positions: {:<3} {}",
                job.id,
                job.title,
                job.department,
                job.positions,
                job.status.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}
