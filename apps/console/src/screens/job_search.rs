use std::collections::BTreeSet;
use std::fmt;

use tracing::info;

use crate::api_client::RecruitingApi;
use crate::errors::ClientResult;
use crate::models::{ApplicationStatus, Job, NewApplication};
use crate::saved_jobs::SavedJobs;
use crate::screens::{mutation_failed, refetched, Loadable, LOADING};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    /// Matched case-insensitively against title, description and department.
    pub search: String,
    /// Exact department name.
    pub department: Option<String>,
    /// Substring of the job location.
    pub location: Option<String>,
}

impl JobQuery {
    pub fn matches(&self, job: &Job) -> bool {
        let term = self.search.trim().to_lowercase();
        let matches_search = term.is_empty()
            || [&job.title, &job.description, &job.department]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
        let matches_department = self.department.as_deref().map_or(true, |d| job.department == d);
        let matches_location = self.location.as_deref().map_or(true, |l| {
            job.location.as_deref().is_some_and(|loc| loc.contains(l))
        });
        matches_search && matches_department && matches_location
    }
}

#[derive(Debug)]
pub struct JobSearchScreen {
    pub jobs: Loadable<Vec<Job>>,
    pub query: JobQuery,
    saved: SavedJobs,
}

impl JobSearchScreen {
    pub fn new(saved: SavedJobs) -> Self {
        Self {
            jobs: Loadable::Loading,
            query: JobQuery::default(),
            saved,
        }
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let result = api.list_jobs().await;
        self.jobs.settle("fetching jobs", result)
    }

    pub fn results(&self) -> Vec<&Job> {
        self.jobs
            .get()
            .map(|jobs| jobs.iter().filter(|j| self.query.matches(j)).collect())
            .unwrap_or_default()
    }

    pub fn departments(&self) -> Vec<&str> {
        self.distinct(|job| Some(job.department.as_str()))
    }

    pub fn locations(&self) -> Vec<&str> {
        self.distinct(|job| job.location.as_deref())
    }

    fn distinct<'a>(&'a self, field: impl Fn(&'a Job) -> Option<&'a str>) -> Vec<&'a str> {
        self.jobs
            .get()
            .into_iter()
            .flatten()
            .filter_map(field)
            .filter(|v| !v.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn clear_filters(&mut self) {
        self.query = JobQuery::default();
    }

    pub fn is_saved(&self, job_id: i64) -> bool {
        self.saved.contains(job_id)
    }

    pub async fn toggle_saved(&mut self, job_id: i64) -> ClientResult<bool> {
        mutation_failed("saving job", self.saved.toggle(job_id).await)
    }

    pub async fn apply(
        &mut self,
        api: &dyn RecruitingApi,
        job_id: i64,
        cover_letter: Option<String>,
    ) -> ClientResult<()> {
        let new_application = NewApplication {
            candidate: None,
            job: job_id,
            status: ApplicationStatus::Received,
            cover_letter: cover_letter.filter(|c| !c.trim().is_empty()),
        };
        mutation_failed(
            "submitting application",
            api.create_application(&new_application).await,
        )?;
        info!("Applied to job {job_id}");
        refetched(self.load(api).await)
    }
}

impl fmt::Display for JobSearchScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Job Search ==")?;
        let Some(jobs) = self.jobs.get() else {
            return writeln!(f, "{LOADING}");
        };
        let results = self.results();
        writeln!(f, "{} of {} jobs", results.len(), jobs.len())?;
        if !self.query.search.is_empty() {
            writeln!(f, "Search: {}", self.query.search)?;
        }
        writeln!(
            f,
            "Department: {}   Location: {}",
            self.query.department.as_deref().unwrap_or("any"),
            self.query.location.as_deref().unwrap_or("any")
        )?;
        writeln!(f, "Departments: {}", self.departments().join(", "))?;
        writeln!(f, "Locations: {}", self.locations().join(", "))?;
        if results.is_empty() {
            writeln!(f, "  No jobs found. Try adjusting your search criteria or filters")?;
        }
        for job in results {
            let saved = if self.is_saved(job.id) { "[saved] " } else { "" };
            writeln!(
                f,
                "  #{:<4} {saved}{} - {} ({}) positions: {}",
                job.id,
                job.title,
                job.department,
                job.location.as_deref().unwrap_or("Remote"),
                job.positions
            )?;
        }
        Ok(())
    }
}
