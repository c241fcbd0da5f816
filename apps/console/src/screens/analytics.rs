use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::api_client::RecruitingApi;
use crate::errors::ClientResult;
use crate::models::application::status_counts;
use crate::models::{Application, ApplicationFilter, ApplicationStatus, Job};
use crate::screens::{Loadable, LOADING};

const UNKNOWN_DEPARTMENT: &str = "Other";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentStats {
    pub applications: usize,
    pub hires: usize,
}

impl DepartmentStats {
    pub fn hire_rate(&self) -> f64 {
        percentage(self.hires, self.applications)
    }
}

/// Figures derived from the live collections. A hire is an application with
/// an offer extended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecruitingMetrics {
    pub total_candidates: usize,
    pub total_applications: usize,
    pub active_jobs: usize,
    pub hires: usize,
    pub by_department: BTreeMap<String, DepartmentStats>,
    pub by_status: BTreeMap<ApplicationStatus, usize>,
}

impl RecruitingMetrics {
    pub fn compute(total_candidates: usize, jobs: &[Job], applications: &[Application]) -> Self {
        let mut by_department: BTreeMap<String, DepartmentStats> = BTreeMap::new();
        for app in applications {
            let department = match app.job_department.as_str() {
                "" => UNKNOWN_DEPARTMENT,
                d => d,
            };
            let stats = by_department.entry(department.to_string()).or_default();
            stats.applications += 1;
            if app.status == ApplicationStatus::OfferExtended {
                stats.hires += 1;
            }
        }

        RecruitingMetrics {
            total_candidates,
            total_applications: applications.len(),
            active_jobs: jobs.iter().filter(|j| j.is_active()).count(),
            hires: by_department.values().map(|d| d.hires).sum(),
            by_department,
            by_status: status_counts(applications),
        }
    }

    pub fn hire_rate(&self) -> f64 {
        percentage(self.hires, self.total_applications)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsScope {
    /// Organisation-wide overview for HR.
    Overview,
    /// Same figures with per-department hire rates.
    Reports,
    /// One department's applications and jobs.
    Team { department: String },
}

#[derive(Debug)]
pub struct AnalyticsScreen {
    scope: AnalyticsScope,
    pub metrics: Loadable<RecruitingMetrics>,
}

impl AnalyticsScreen {
    pub fn new(scope: AnalyticsScope) -> Self {
        Self {
            scope,
            metrics: Loadable::Loading,
        }
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let all = ApplicationFilter::default();
        let result = match &self.scope {
            AnalyticsScope::Overview | AnalyticsScope::Reports => tokio::try_join!(
                api.list_candidates(),
                api.list_applications(&all),
                api.list_jobs(),
            )
            .map(|(candidates, applications, jobs)| {
                RecruitingMetrics::compute(candidates.len(), &jobs, &applications)
            }),
            AnalyticsScope::Team { department } => {
                tokio::try_join!(api.list_applications(&all), api.list_jobs()).map(
                    |(applications, jobs)| {
                        let applications: Vec<Application> = applications
                            .into_iter()
                            .filter(|a| a.job_department == *department)
                            .collect();
                        let jobs: Vec<Job> =
                            jobs.into_iter().filter(|j| j.department == *department).collect();
                        let candidates: HashSet<i64> =
                            applications.iter().filter_map(|a| a.candidate).collect();
                        RecruitingMetrics::compute(candidates.len(), &jobs, &applications)
                    },
                )
            }
        };
        self.metrics.settle("fetching analytics data", result)
    }

    fn title(&self) -> String {
        match &self.scope {
            AnalyticsScope::Overview => "Analytics".to_string(),
            AnalyticsScope::Reports => "Reports".to_string(),
            AnalyticsScope::Team { department } => format!("Team Analytics ({department})"),
        }
    }
}

impl fmt::Display for AnalyticsScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title())?;
        let Some(m) = self.metrics.get() else {
            return writeln!(f, "{LOADING}");
        };
        writeln!(
            f,
            "Candidates: {}   Applications: {}   Active jobs: {}   Hire rate: {:.1}%",
            m.total_candidates,
            m.total_applications,
            m.active_jobs,
            m.hire_rate()
        )?;

        writeln!(f, "-- By department --")?;
        for (department, stats) in &m.by_department {
            match self.scope {
                AnalyticsScope::Reports => writeln!(
                    f,
                    "  {department:<16} {:>4} applications {:>3} hires {:>6.1}%",
                    stats.applications,
                    stats.hires,
                    stats.hire_rate()
                )?,
                AnalyticsScope::Overview | AnalyticsScope::Team { .. } => writeln!(
                    f,
                    "  {department:<16} {:>4} applications {:>3} hired",
                    stats.applications, stats.hires
                )?,
            }
        }

        writeln!(f, "-- By status --")?;
        for (status, count) in &m.by_status {
            writeln!(f, "  {status:<15} {count}")?;
        }
        Ok(())
    }
}
