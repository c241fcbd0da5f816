use std::fmt;

use tracing::info;

use crate::api_client::RecruitingApi;
use crate::errors::ClientResult;
use crate::models::{
    Application, ApplicationFilter, ApplicationStatus, Candidate, Job, NewApplication,
};
use crate::screens::{mutation_failed, refetched, Loadable, LOADING};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileData {
    pub applications: Vec<Application>,
    pub jobs: Vec<Job>,
}

/// One candidate as seen by HR or a manager.
#[derive(Debug)]
pub struct CandidateProfileScreen {
    candidate: Candidate,
    pub data: Loadable<ProfileData>,
}

impl CandidateProfileScreen {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            candidate,
            data: Loadable::Loading,
        }
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let filter = ApplicationFilter::for_candidate(self.candidate.id);
        let result = tokio::try_join!(api.list_applications(&filter), api.list_jobs())
            .map(|(applications, jobs)| ProfileData { applications, jobs });
        self.data.settle("fetching candidate applications", result)
    }

    /// Applies the candidate to `job_id` on their behalf.
    pub async fn apply_to_job(&mut self, api: &dyn RecruitingApi, job_id: i64) -> ClientResult<()> {
        let new_application = NewApplication {
            candidate: Some(self.candidate.id),
            job: job_id,
            status: ApplicationStatus::Received,
            cover_letter: None,
        };
        mutation_failed(
            "creating application",
            api.create_application(&new_application).await,
        )?;
        info!("Applied candidate {} to job {job_id}", self.candidate.id);
        refetched(self.load(api).await)
    }
}

impl fmt::Display for CandidateProfileScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.candidate;
        writeln!(f, "== {} ==", c.full_name())?;
        writeln!(f, "Email: {}   Phone: {}", c.email, c.phone)?;
        if let Some(bio) = &c.bio {
            writeln!(f, "{bio}")?;
        }
        let links = [
            ("LinkedIn", &c.linkedin),
            ("Portfolio", &c.portfolio),
            ("Resume", &c.resume_url),
        ];
        for (label, link) in links {
            if let Some(link) = link {
                writeln!(f, "{label}: {link}")?;
            }
        }

        let Some(data) = self.data.get() else {
            return writeln!(f, "{LOADING}");
        };
        writeln!(f, "-- Applications --")?;
        if data.applications.is_empty() {
            writeln!(f, "  No applications yet")?;
        }
        for app in &data.applications {
            writeln!(
                f,
                "  #{:<4} {} ({}) {} [{}]",
                app.id, app.job_title, app.job_department, app.application_date, app.status
            )?;
        }
        writeln!(f, "-- Jobs --")?;
        for job in &data.jobs {
            writeln!(f, "  #{:<4} {} - {}", job.id, job.title, job.department)?;
        }
        Ok(())
    }
}
