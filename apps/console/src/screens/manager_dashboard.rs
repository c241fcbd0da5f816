use std::fmt;

use crate::api_client::RecruitingApi;
use crate::errors::ClientResult;
use crate::models::application::status_counts;
use crate::models::{Application, ApplicationFilter, ApplicationStatus};
use crate::router::{Navigation, View};
use crate::screens::{Loadable, LOADING};

/// Statuses offered as quick links into the applications screen.
pub const QUICK_LINKS: [ApplicationStatus; 2] =
    [ApplicationStatus::UnderReview, ApplicationStatus::Interview];

#[derive(Debug, Default)]
pub struct ManagerDashboard {
    status_filter: Option<ApplicationStatus>,
    pub applications: Loadable<Vec<Application>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSummary {
    pub total: usize,
    pub pending_review: usize,
    pub interviews: usize,
    pub offers: usize,
}

impl ManagerDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes the server-side status filter and re-fetches.
    pub async fn set_status_filter(
        &mut self,
        api: &dyn RecruitingApi,
        status: Option<ApplicationStatus>,
    ) -> ClientResult<()> {
        self.status_filter = status;
        self.load(api).await
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let filter = ApplicationFilter {
            status: self.status_filter,
            ..Default::default()
        };
        let result = api.list_applications(&filter).await;
        self.applications.settle("fetching applications", result)
    }

    pub fn summary(&self) -> PipelineSummary {
        let apps = self.applications.get().map(Vec::as_slice).unwrap_or_default();
        let count = |status: ApplicationStatus| apps.iter().filter(|a| a.status == status).count();
        PipelineSummary {
            total: apps.len(),
            pending_review: count(ApplicationStatus::UnderReview),
            interviews: count(ApplicationStatus::Interview),
            offers: count(ApplicationStatus::OfferExtended),
        }
    }

    /// Navigation target of a quick link.
    pub fn quick_link(status: ApplicationStatus) -> (View, Navigation) {
        (View::Applications, Navigation::StatusFilter(status))
    }
}

impl fmt::Display for ManagerDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Manager Dashboard ==")?;
        let Some(apps) = self.applications.get() else {
            return writeln!(f, "{LOADING}");
        };
        let summary = self.summary();
        writeln!(
            f,
            "Applications: {}   Pending review: {}   Interviews: {}   Offers: {}",
            summary.total, summary.pending_review, summary.interviews, summary.offers
        )?;
        writeln!(
            f,
            "Status filter: {}",
            self.status_filter.map_or("all".to_string(), |s| s.to_string())
        )?;
        if apps.is_empty() {
            writeln!(f, "  No applications found")?;
        }
        for app in apps {
            writeln!(
                f,
                "  #{:<4} {} -> {} ({}) [{}]",
                app.id, app.candidate_name, app.job_title, app.job_department, app.status
            )?;
        }
        writeln!(f, "-- Pipeline --")?;
        for (status, count) in status_counts(apps) {
            writeln!(f, "  {status:<15} {count}")?;
        }
        let links: Vec<String> = QUICK_LINKS.iter().map(|s| format!("'{s}'")).collect();
        writeln!(f, "Quick links (quick <status>): {}", links.join(", "))
    }
}
