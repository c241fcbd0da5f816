//! View router: maps (session state, requested view) to the screen to render.
//!
//! Access checks here are advisory only. The backend enforces authorization on
//! every request regardless of what the console shows.

use std::fmt;
use std::str::FromStr;

use crate::models::{ApplicationStatus, Candidate, Role};
use crate::session::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Analytics,
    Jobs,
    Candidates,
    CandidateProfile,
    Applications,
    Interviews,
    Reporting,
    Settings,
    TeamAnalytics,
    Team,
    Profile,
    JobSearch,
}

impl View {
    pub const ALL: [View; 13] = [
        View::Dashboard,
        View::Analytics,
        View::Jobs,
        View::Candidates,
        View::CandidateProfile,
        View::Applications,
        View::Interviews,
        View::Reporting,
        View::Settings,
        View::TeamAnalytics,
        View::Team,
        View::Profile,
        View::JobSearch,
    ];

    pub fn id(self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Analytics => "analytics",
            View::Jobs => "jobs",
            View::Candidates => "candidates",
            View::CandidateProfile => "candidate-profile",
            View::Applications => "applications",
            View::Interviews => "interviews",
            View::Reporting => "reporting",
            View::Settings => "settings",
            View::TeamAnalytics => "team-analytics",
            View::Team => "team",
            View::Profile => "profile",
            View::JobSearch => "job-search",
        }
    }

    pub fn parse(id: &str) -> Option<View> {
        let id = id.trim();
        View::ALL.into_iter().find(|v| v.id().eq_ignore_ascii_case(id))
    }

    /// Roles allowed to open this view; `None` means any signed-in role.
    pub fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            View::Dashboard | View::Jobs | View::Applications | View::Interviews => None,
            View::Candidates | View::CandidateProfile => Some(&[Role::Hr, Role::Manager]),
            View::Analytics | View::Reporting | View::Settings => Some(&[Role::Hr]),
            View::TeamAnalytics | View::Team => Some(&[Role::Manager]),
            View::Profile | View::JobSearch => Some(&[Role::Candidate]),
        }
    }

    pub fn is_restricted(self) -> bool {
        self.allowed_roles().is_some()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::parse(s).ok_or_else(|| format!("unknown view '{}'", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub view: View,
    pub label: &'static str,
}

const fn nav(view: View, label: &'static str) -> NavItem {
    NavItem { view, label }
}

const HR_NAV: &[NavItem] = &[
    nav(View::Dashboard, "Dashboard"),
    nav(View::Analytics, "Analytics"),
    nav(View::Jobs, "Job Openings"),
    nav(View::Candidates, "Talent Pool"),
    nav(View::Applications, "Applications"),
    nav(View::Interviews, "Interviews"),
    nav(View::Reporting, "Reports"),
    nav(View::Settings, "Settings"),
];

const MANAGER_NAV: &[NavItem] = &[
    nav(View::Dashboard, "Dashboard"),
    nav(View::TeamAnalytics, "Team Analytics"),
    nav(View::Jobs, "My Openings"),
    nav(View::Applications, "Applications"),
    nav(View::Interviews, "Interviews"),
    nav(View::Team, "My Team"),
];

const CANDIDATE_NAV: &[NavItem] = &[
    nav(View::Dashboard, "Dashboard"),
    nav(View::Profile, "My Profile"),
    nav(View::JobSearch, "Job Search"),
    nav(View::Applications, "My Applications"),
    nav(View::Interviews, "Interviews"),
];

impl Role {
    /// Fixed sidebar entries for the role, dashboard first.
    pub fn navigation(self) -> &'static [NavItem] {
        match self {
            Role::Hr => HR_NAV,
            Role::Manager => MANAGER_NAV,
            Role::Candidate => CANDIDATE_NAV,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied {
    pub view: View,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "You don't have access to this section ({}).", self.view)
    }
}

impl std::error::Error for AccessDenied {}

pub fn authorize(role: Option<Role>, view: View) -> Result<(), AccessDenied> {
    match (view.allowed_roles(), role) {
        (None, Some(_)) => Ok(()),
        (Some(allowed), Some(role)) if allowed.contains(&role) => Ok(()),
        (None, None) | (Some(_), _) => Err(AccessDenied { view }),
    }
}

/// Auxiliary payload carried along with a navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    None,
    Candidate(Candidate),
    StatusFilter(ApplicationStatus),
}

/// What the main content area should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Loading,
    Login,
    AccessDenied(View),
    HrDashboard,
    ManagerDashboard,
    CandidateDashboard,
    Jobs,
    Candidates,
    CandidateProfile(Candidate),
    Applications {
        role: Role,
        preset: Option<ApplicationStatus>,
    },
    Analytics,
    Reports,
    TeamAnalytics,
    JobSearch,
    /// Screens whose data has no backend endpoint yet.
    Unavailable(View),
}

fn dashboard_for(role: Role) -> Screen {
    match role {
        Role::Hr => Screen::HrDashboard,
        Role::Manager => Screen::ManagerDashboard,
        Role::Candidate => Screen::CandidateDashboard,
    }
}

/// Currently selected view plus its optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Router {
    active: View,
    payload: Navigation,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            active: View::Dashboard,
            payload: Navigation::None,
        }
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> View {
        self.active
    }

    /// Selects a view. Opening `candidates` with a candidate goes straight to
    /// that candidate's profile.
    pub fn navigate(&mut self, view: View, payload: Navigation) {
        self.active = match (view, &payload) {
            (View::Candidates, Navigation::Candidate(_)) => View::CandidateProfile,
            _ => view,
        };
        self.payload = payload;
    }

    pub fn back_to_dashboard(&mut self) {
        self.active = View::Dashboard;
        self.payload = Navigation::None;
    }

    pub fn resolve(&self, session: &SessionState) -> Screen {
        let role = match session {
            SessionState::Loading => return Screen::Loading,
            SessionState::Anonymous if self.active.is_restricted() => {
                return Screen::AccessDenied(self.active)
            }
            SessionState::Anonymous => return Screen::Login,
            SessionState::Authenticated(user) => user.role,
        };

        if authorize(Some(role), self.active).is_err() {
            return Screen::AccessDenied(self.active);
        }

        match self.active {
            View::Dashboard => dashboard_for(role),
            View::Jobs => Screen::Jobs,
            View::Candidates => Screen::Candidates,
            View::CandidateProfile => match &self.payload {
                Navigation::Candidate(candidate) => Screen::CandidateProfile(candidate.clone()),
                Navigation::None | Navigation::StatusFilter(_) => dashboard_for(role),
            },
            View::Applications => Screen::Applications {
                role,
                preset: match self.payload {
                    Navigation::StatusFilter(status) => Some(status),
                    Navigation::None | Navigation::Candidate(_) => None,
                },
            },
            View::Analytics => Screen::Analytics,
            View::Reporting => Screen::Reports,
            View::TeamAnalytics => Screen::TeamAnalytics,
            View::JobSearch => Screen::JobSearch,
            View::Interviews | View::Settings | View::Team | View::Profile => {
                Screen::Unavailable(self.active)
            }
        }
    }
}
