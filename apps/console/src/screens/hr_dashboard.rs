use std::collections::BTreeMap;
use std::fmt;

use crate::api_client::RecruitingApi;
use crate::errors::ClientResult;
use crate::models::application::status_counts;
use crate::models::{Application, ApplicationFilter, ApplicationStatus, Candidate, Job};
use crate::screens::{Loadable, LOADING};

const RECENT_ACTIVITY: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HrStats {
    pub total_candidates: usize,
    pub open_jobs: usize,
    pub total_applications: usize,
    pub pending_reviews: usize,
    pub interviews: usize,
    pub offers_extended: usize,
    pub by_status: BTreeMap<ApplicationStatus, usize>,
    /// Newest applications first, as the backend orders them.
    pub recent_activity: Vec<Application>,
}

impl HrStats {
    pub fn compute(candidates: &[Candidate], jobs: &[Job], applications: &[Application]) -> Self {
        let by_status = status_counts(applications);
        let count = |status: ApplicationStatus| by_status.get(&status).copied().unwrap_or(0);

        HrStats {
            total_candidates: candidates.len(),
            open_jobs: jobs.len(),
            total_applications: applications.len(),
            pending_reviews: count(ApplicationStatus::UnderReview),
            interviews: count(ApplicationStatus::Interview),
            offers_extended: count(ApplicationStatus::OfferExtended),
            recent_activity: applications.iter().take(RECENT_ACTIVITY).cloned().collect(),
            by_status,
        }
    }
}

#[derive(Debug, Default)]
pub struct HrDashboard {
    pub stats: Loadable<HrStats>,
}

impl HrDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let all = ApplicationFilter::default();
        let result = tokio::try_join!(
            api.list_candidates(),
            api.list_jobs(),
            api.list_applications(&all),
        )
        .map(|(candidates, jobs, applications)| {
            HrStats::compute(&candidates, &jobs, &applications)
        });
        self.stats.settle("fetching dashboard data", result)
    }
}

impl fmt::Display for HrDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== HR Dashboard ==")?;
        let Some(stats) = self.stats.get() else {
            return writeln!(f, "{LOADING}");
        };
        writeln!(
            f,
            "Candidates: {}   Job openings: {}   Applications: {}",
            stats.total_candidates, stats.open_jobs, stats.total_applications
        )?;
        writeln!(
            f,
            "Pending reviews: {}   Interviews: {}   Offers extended: {}",
            stats.pending_reviews, stats.interviews, stats.offers_extended
        )?;
        writeln!(f, "-- Applications by status --")?;
        for (status, count) in &stats.by_status {
            writeln!(f, "  {status:<15} {count}")?;
        }
        writeln!(f, "-- Recent activity --")?;
        if stats.recent_activity.is_empty() {
            writeln!(f, "  No recent activity")?;
        }
        for app in &stats.recent_activity {
            writeln!(
                f,
                "  {} applied for {} [{}]",
                app.candidate_name, app.job_title, app.status
            )?;
        }
        Ok(())
    }
}
