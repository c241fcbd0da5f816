use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::api_client::RecruitingApi;
use crate::errors::ClientResult;
use crate::models::{Application, ApplicationFilter, ApplicationStatus, Role};
use crate::screens::{Loadable, LOADING};

/// Client-side tab over the loaded applications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    All,
    Status(ApplicationStatus),
}

impl Category {
    pub const TABS: [Category; 6] = [
        Category::All,
        Category::Status(ApplicationStatus::Received),
        Category::Status(ApplicationStatus::UnderReview),
        Category::Status(ApplicationStatus::Interview),
        Category::Status(ApplicationStatus::OfferExtended),
        Category::Status(ApplicationStatus::Rejected),
    ];

    pub fn includes(self, application: &Application) -> bool {
        match self {
            Category::All => true,
            Category::Status(status) => application.status == status,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::All => f.write_str("All"),
            Category::Status(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Category::All);
        }
        let status: ApplicationStatus = s.parse()?;
        Category::TABS
            .into_iter()
            .find(|tab| *tab == Category::Status(status))
            .ok_or_else(|| format!("no tab for '{status}'"))
    }
}

#[derive(Debug)]
pub struct ApplicationsScreen {
    role: Role,
    filter: ApplicationFilter,
    category: Category,
    pub applications: Loadable<Vec<Application>>,
}

impl ApplicationsScreen {
    /// `preset` comes from a dashboard quick link.
    pub fn new(role: Role, preset: Option<ApplicationStatus>) -> Self {
        Self {
            role,
            filter: ApplicationFilter {
                status: preset,
                ..Default::default()
            },
            category: Category::All,
            applications: Loadable::Loading,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.role {
            Role::Candidate => "My Applications",
            Role::Hr | Role::Manager => "Applications",
        }
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let result = api.list_applications(&self.filter).await;
        self.applications.settle("fetching applications", result)
    }

    pub async fn set_status(
        &mut self,
        api: &dyn RecruitingApi,
        status: Option<ApplicationStatus>,
    ) -> ClientResult<()> {
        self.filter.status = status;
        self.load(api).await
    }

    pub async fn set_department(
        &mut self,
        api: &dyn RecruitingApi,
        department: Option<String>,
    ) -> ClientResult<()> {
        self.filter.department = department.filter(|d| !d.trim().is_empty());
        self.load(api).await
    }

    pub async fn clear_filters(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        self.filter = ApplicationFilter::default();
        self.category = Category::All;
        self.load(api).await
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    fn loaded(&self) -> &[Application] {
        self.applications.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Applications in the selected tab.
    pub fn displayed(&self) -> Vec<&Application> {
        self.loaded().iter().filter(|a| self.category.includes(a)).collect()
    }

    pub fn tab_counts(&self) -> Vec<(Category, usize)> {
        let apps = self.loaded();
        Category::TABS
            .into_iter()
            .map(|tab| (tab, apps.iter().filter(|a| tab.includes(a)).count()))
            .collect()
    }

    /// Distinct departments among the loaded applications, sorted.
    pub fn departments(&self) -> Vec<&str> {
        self.loaded()
            .iter()
            .map(|a| a.job_department.as_str())
            .filter(|d| !d.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl fmt::Display for ApplicationsScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title())?;
        if self.applications.is_loading() {
            return writeln!(f, "{LOADING}");
        }
        writeln!(
            f,
            "Status: {}   Department: {}",
            self.filter.status.map_or("all".to_string(), |s| s.to_string()),
            self.filter.department.as_deref().unwrap_or("all")
        )?;
        writeln!(f, "Departments: {}", self.departments().join(", "))?;
        let tabs: Vec<String> = self
            .tab_counts()
            .into_iter()
            .map(|(tab, count)| {
                if tab == self.category {
                    format!("[{tab} ({count})]")
                } else {
                    format!("{tab} ({count})")
                }
            })
            .collect();
        writeln!(f, "{}", tabs.join("  "))?;

        let shown = self.displayed();
        if shown.is_empty() {
            writeln!(f, "  No applications found")?;
        }
        for app in shown {
            match self.role {
                Role::Candidate => writeln!(
                    f,
                    "  #{:<4} {} ({}) {} [{}]",
                    app.id, app.job_title, app.job_department, app.application_date, app.status
                )?,
                Role::Hr | Role::Manager => writeln!(
                    f,
                    "  #{:<4} {:<20} {} ({}) {} [{}]",
                    app.id,
                    app.candidate_name,
                    app.job_title,
                    app.job_department,
                    app.application_date,
                    app.status
                )?,
            }
        }
        Ok(())
    }
}
