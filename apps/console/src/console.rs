//! Interactive console shell.
//!
//! Reads one command per stdin line, applies it to the session, router or the
//! active screen, and prints the resulting screen. While the candidate
//! dashboard is shown it is also refreshed on a fixed period.

use std::fmt::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::api_client::RecruitingApi;
use crate::config::Config;
use crate::errors::ClientResult;
use crate::models::{
    ApplicationStatus, Credentials, NewCandidate, NewJob, ProfileUpdate, Registration,
};
use crate::router::{AccessDenied, Navigation, Router, Screen, View};
use crate::saved_jobs::SavedJobs;
use crate::screens::analytics::{AnalyticsScope, AnalyticsScreen};
use crate::screens::applications::{ApplicationsScreen, Category};
use crate::screens::candidate_dashboard::CandidateDashboard;
use crate::screens::candidate_profile::CandidateProfileScreen;
use crate::screens::candidates::CandidatesScreen;
use crate::screens::hr_dashboard::HrDashboard;
use crate::screens::job_search::JobSearchScreen;
use crate::screens::jobs::JobsScreen;
use crate::screens::manager_dashboard::ManagerDashboard;
use crate::screens::{Poller, LOADING};
use crate::session::Session;

const HELP: &str = "\
Session:     login <username> <password>
             register <username> <password> <email> <role> [candidate-id]
             logout
Navigation:  nav | go <view> | open <candidate-id> | back | refresh
Filters:     filter status|department|location <value> | filter clear
             tab <category> | search <term> | quick <status>
Actions:     apply [job-id] [cover letter] | withdraw <application-id>
             new-job <title> | <department> | <positions> [| <description>]
             new-candidate <first> | <last> | <email> [| <phone>]
             save <job-id> | read <notification-id> | read-all
             upload <path> | profile <field> <value>
Other:       help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login(Credentials),
    Register(Registration),
    Logout,
    Nav,
    Go(View),
    Open(i64),
    Back,
    Refresh,
    FilterStatus(ApplicationStatus),
    FilterDepartment(String),
    FilterLocation(String),
    FilterClear,
    Tab(Category),
    Search(String),
    /// Manager quick link into applications with a preset status.
    Quick(ApplicationStatus),
    Apply {
        job: Option<i64>,
        cover_letter: Option<String>,
    },
    Withdraw(i64),
    NewJob(NewJob),
    NewCandidate(NewCandidate),
    Save(i64),
    Read(i64),
    ReadAll,
    Upload(PathBuf),
    Profile(ProfileUpdate),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "login" => match args.as_slice() {
                [username, password] => Command::Login(Credentials {
                    username: username.to_string(),
                    password: password.to_string(),
                }),
                _ => return Err(usage("login <username> <password>")),
            },
            "register" => {
                const FORM: &str = "register <username> <password> <email> <role> [candidate-id]";
                let [username, password, email, role, extra @ ..] = args.as_slice() else {
                    return Err(usage(FORM));
                };
                let candidate_id = match extra {
                    [] => None,
                    [id] => Some(parse_id(id)?),
                    _ => return Err(usage(FORM)),
                };
                Command::Register(Registration {
                    username: username.to_string(),
                    password: password.to_string(),
                    email: email.to_string(),
                    role: role.parse()?,
                    candidate_id,
                })
            }
            "logout" => Command::Logout,
            "nav" => Command::Nav,
            "go" => Command::Go(required(rest, "go <view>")?.parse()?),
            "open" => Command::Open(parse_id(required(rest, "open <candidate-id>")?)?),
            "back" => Command::Back,
            "refresh" => Command::Refresh,
            "filter" => parse_filter(rest)?,
            "tab" => Command::Tab(required(rest, "tab <category>")?.parse()?),
            "search" => Command::Search(rest.to_string()),
            "quick" => Command::Quick(required(rest, "quick <status>")?.parse()?),
            "apply" => match args.first() {
                None => Command::Apply {
                    job: None,
                    cover_letter: None,
                },
                Some(first) => {
                    let cover = rest[first.len()..].trim();
                    Command::Apply {
                        job: Some(parse_id(first)?),
                        cover_letter: (!cover.is_empty()).then(|| cover.to_string()),
                    }
                }
            },
            "withdraw" => {
                Command::Withdraw(parse_id(required(rest, "withdraw <application-id>")?)?)
            }
            "new-job" => parse_new_job(rest)?,
            "new-candidate" => parse_new_candidate(rest)?,
            "save" => Command::Save(parse_id(required(rest, "save <job-id>")?)?),
            "read" => Command::Read(parse_id(required(rest, "read <notification-id>")?)?),
            "read-all" => Command::ReadAll,
            "upload" => Command::Upload(PathBuf::from(required(rest, "upload <path>")?)),
            "profile" => parse_profile(rest)?,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(command)
    }
}

fn usage(form: &str) -> String {
    format!("usage: {form}")
}

fn required<'a>(rest: &'a str, form: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(usage(form))
    } else {
        Ok(rest)
    }
}

fn parse_id(raw: &str) -> Result<i64, String> {
    raw.trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| format!("'{raw}' is not a valid id"))
}

/// Splits `a | b | c` into trimmed fields.
fn fields(rest: &str) -> Vec<&str> {
    rest.split('|').map(str::trim).collect()
}

fn parse_filter(rest: &str) -> Result<Command, String> {
    let (kind, value) = match rest.split_once(char::is_whitespace) {
        Some((kind, value)) => (kind, value.trim()),
        None => (rest, ""),
    };
    const FORM: &str = "filter status|department|location <value> | filter clear";
    match (kind.to_ascii_lowercase().as_str(), value) {
        ("clear", _) => Ok(Command::FilterClear),
        (_, "") => Err(usage(FORM)),
        ("status", value) => Ok(Command::FilterStatus(value.parse()?)),
        ("department", value) => Ok(Command::FilterDepartment(value.to_string())),
        ("location", value) => Ok(Command::FilterLocation(value.to_string())),
        _ => Err(usage(FORM)),
    }
}

fn parse_new_job(rest: &str) -> Result<Command, String> {
    const FORM: &str = "new-job <title> | <department> | <positions> [| <description>]";
    let (title, department, positions, description) = match fields(rest).as_slice() {
        [title, department, positions] => (*title, *department, *positions, ""),
        [title, department, positions, description] => {
            (*title, *department, *positions, *description)
        }
        _ => return Err(usage(FORM)),
    };
    let positions = positions
        .parse()
        .map_err(|_| format!("'{positions}' is not a number of positions"))?;
    Ok(Command::NewJob(NewJob {
        title: title.to_string(),
        department: department.to_string(),
        positions,
        description: description.to_string(),
    }))
}

fn parse_new_candidate(rest: &str) -> Result<Command, String> {
    let (first, last, email, phone) = match fields(rest).as_slice() {
        [first, last, email] => (*first, *last, *email, ""),
        [first, last, email, phone] => (*first, *last, *email, *phone),
        _ => return Err(usage("new-candidate <first> | <last> | <email> [| <phone>]")),
    };
    Ok(Command::NewCandidate(NewCandidate {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
    }))
}

fn parse_profile(rest: &str) -> Result<Command, String> {
    const FORM: &str = "profile first-name|last-name|phone|bio|linkedin|portfolio <value>";
    let Some((field, value)) = rest.split_once(char::is_whitespace) else {
        return Err(usage(FORM));
    };
    let value = Some(value.trim().to_string());
    let mut update = ProfileUpdate::default();
    match field.to_ascii_lowercase().as_str() {
        "first-name" => update.first_name = value,
        "last-name" => update.last_name = value,
        "phone" => update.phone = value,
        "bio" => update.bio = value,
        "linkedin" => update.linkedin = value,
        "portfolio" => update.portfolio = value,
        _ => return Err(usage(FORM)),
    }
    Ok(Command::Profile(update))
}

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Render,
    Message(String),
    Quit,
}

fn not_here(command: &str) -> Reply {
    Reply::Message(format!("'{command}' is not available on this screen"))
}

/// Console-wide settings taken from the loaded config.
#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    pub poll_interval: Duration,
    pub saved_jobs_path: PathBuf,
    pub manager_department: String,
}

impl From<&Config> for ConsoleSettings {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval,
            saved_jobs_path: config.saved_jobs_path.clone(),
            manager_department: config.manager_department.clone(),
        }
    }
}

/// The screen currently on display together with its loaded data.
#[derive(Debug)]
pub enum ActiveScreen {
    /// Screens without data of their own.
    Static(Screen),
    HrDashboard(HrDashboard),
    ManagerDashboard(ManagerDashboard),
    CandidateDashboard(CandidateDashboard),
    Jobs(JobsScreen),
    Candidates(CandidatesScreen),
    CandidateProfile(CandidateProfileScreen),
    Applications(ApplicationsScreen),
    Analytics(AnalyticsScreen),
    JobSearch(JobSearchScreen),
}

impl ActiveScreen {
    async fn open(screen: &Screen, settings: &ConsoleSettings) -> Self {
        match screen {
            Screen::HrDashboard => ActiveScreen::HrDashboard(HrDashboard::new()),
            Screen::ManagerDashboard => ActiveScreen::ManagerDashboard(ManagerDashboard::new()),
            Screen::CandidateDashboard => {
                ActiveScreen::CandidateDashboard(CandidateDashboard::new())
            }
            Screen::Jobs => ActiveScreen::Jobs(JobsScreen::new()),
            Screen::Candidates => ActiveScreen::Candidates(CandidatesScreen::new()),
            Screen::CandidateProfile(candidate) => {
                ActiveScreen::CandidateProfile(CandidateProfileScreen::new(candidate.clone()))
            }
            Screen::Applications { role, preset } => {
                ActiveScreen::Applications(ApplicationsScreen::new(*role, *preset))
            }
            Screen::Analytics => {
                ActiveScreen::Analytics(AnalyticsScreen::new(AnalyticsScope::Overview))
            }
            Screen::Reports => {
                ActiveScreen::Analytics(AnalyticsScreen::new(AnalyticsScope::Reports))
            }
            Screen::TeamAnalytics => {
                ActiveScreen::Analytics(AnalyticsScreen::new(AnalyticsScope::Team {
                    department: settings.manager_department.clone(),
                }))
            }
            Screen::JobSearch => {
                let saved = SavedJobs::load(&settings.saved_jobs_path).await;
                ActiveScreen::JobSearch(JobSearchScreen::new(saved))
            }
            Screen::Loading | Screen::Login | Screen::AccessDenied(_) | Screen::Unavailable(_) => {
                ActiveScreen::Static(screen.clone())
            }
        }
    }

    pub async fn refresh(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        match self {
            ActiveScreen::Static(_) => Ok(()),
            ActiveScreen::HrDashboard(s) => s.load(api).await,
            ActiveScreen::ManagerDashboard(s) => s.load(api).await,
            ActiveScreen::CandidateDashboard(s) => s.load(api).await,
            ActiveScreen::Jobs(s) => s.load(api).await,
            ActiveScreen::Candidates(s) => s.load(api).await,
            ActiveScreen::CandidateProfile(s) => s.load(api).await,
            ActiveScreen::Applications(s) => s.load(api).await,
            ActiveScreen::Analytics(s) => s.load(api).await,
            ActiveScreen::JobSearch(s) => s.load(api).await,
        }
    }
}

impl fmt::Display for ActiveScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveScreen::Static(Screen::Loading) => writeln!(f, "{LOADING}"),
            ActiveScreen::Static(Screen::Login) => {
                writeln!(f, "== Sign in ==")?;
                writeln!(f, "  login <username> <password>")?;
                writeln!(f, "  register <username> <password> <email> <role> [candidate-id]")
            }
            ActiveScreen::Static(Screen::AccessDenied(view)) => {
                writeln!(f, "{}", AccessDenied { view: *view })
            }
            ActiveScreen::Static(Screen::Unavailable(view)) => {
                writeln!(f, "'{view}' is not available in this console yet.")
            }
            ActiveScreen::Static(_) => Ok(()),
            ActiveScreen::HrDashboard(s) => write!(f, "{s}"),
            ActiveScreen::ManagerDashboard(s) => write!(f, "{s}"),
            ActiveScreen::CandidateDashboard(s) => write!(f, "{s}"),
            ActiveScreen::Jobs(s) => write!(f, "{s}"),
            ActiveScreen::Candidates(s) => write!(f, "{s}"),
            ActiveScreen::CandidateProfile(s) => write!(f, "{s}"),
            ActiveScreen::Applications(s) => write!(f, "{s}"),
            ActiveScreen::Analytics(s) => write!(f, "{s}"),
            ActiveScreen::JobSearch(s) => write!(f, "{s}"),
        }
    }
}

pub struct Console {
    session: Session,
    router: Router,
    settings: ConsoleSettings,
    screen: ActiveScreen,
    /// Only set while the candidate dashboard is shown.
    poller: Option<Poller>,
}

impl Console {
    pub fn new(session: Session, settings: ConsoleSettings) -> Self {
        Self {
            session,
            router: Router::new(),
            settings,
            screen: ActiveScreen::Static(Screen::Loading),
            poller: None,
        }
    }

    fn api(&self) -> Arc<dyn RecruitingApi> {
        Arc::clone(self.session.api())
    }

    /// Rebuilds the active screen from the router and session, then loads it.
    pub async fn enter(&mut self) -> ClientResult<()> {
        let screen = self.router.resolve(self.session.state());
        debug!("Entering {screen:?}");
        self.poller = matches!(screen, Screen::CandidateDashboard)
            .then(|| Poller::new(self.settings.poll_interval));
        self.screen = ActiveScreen::open(&screen, &self.settings).await;
        let api = self.api();
        self.screen.refresh(api.as_ref()).await
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(user) = self.session.user() {
            let _ = writeln!(
                out,
                "[{} | {} | {}]",
                user.display_name(),
                user.role.label(),
                self.router.active()
            );
        }
        let _ = write!(out, "{}", self.screen);
        out
    }

    pub async fn execute(&mut self, command: Command) -> ClientResult<Reply> {
        let api = self.api();
        let api = api.as_ref();

        match command {
            Command::Login(credentials) => {
                self.session.login(&credentials).await?;
                self.router.back_to_dashboard();
                self.enter().await?;
            }
            Command::Register(registration) => {
                self.session.register(&registration).await?;
                self.router.back_to_dashboard();
                self.enter().await?;
            }
            Command::Logout => {
                let result = self.session.logout().await;
                self.router.back_to_dashboard();
                self.enter().await?;
                result?;
            }
            Command::Nav => {
                let Some(role) = self.session.role() else {
                    return Ok(Reply::Message("Sign in to see your navigation.".to_string()));
                };
                let mut out = String::new();
                for item in role.navigation() {
                    let marker = if item.view == self.router.active() { '>' } else { ' ' };
                    let _ = writeln!(out, "{marker} {:<16} {}", item.view.id(), item.label);
                }
                return Ok(Reply::Message(out));
            }
            Command::Go(view) => {
                self.router.navigate(view, Navigation::None);
                self.enter().await?;
            }
            Command::Open(id) => {
                let ActiveScreen::Candidates(screen) = &self.screen else {
                    return Ok(not_here("open"));
                };
                let Some(candidate) = screen.select(id).cloned() else {
                    return Ok(Reply::Message(format!("No candidate #{id} in the talent pool")));
                };
                self.router.navigate(View::Candidates, Navigation::Candidate(candidate));
                self.enter().await?;
            }
            Command::Back => {
                self.router.back_to_dashboard();
                self.enter().await?;
            }
            Command::Refresh => self.screen.refresh(api).await?,
            Command::FilterStatus(status) => match &mut self.screen {
                ActiveScreen::Applications(s) => s.set_status(api, Some(status)).await?,
                ActiveScreen::ManagerDashboard(s) => s.set_status_filter(api, Some(status)).await?,
                _ => return Ok(not_here("filter status")),
            },
            Command::FilterDepartment(department) => match &mut self.screen {
                ActiveScreen::Applications(s) => s.set_department(api, Some(department)).await?,
                ActiveScreen::JobSearch(s) => s.query.department = Some(department),
                _ => return Ok(not_here("filter department")),
            },
            Command::FilterLocation(location) => match &mut self.screen {
                ActiveScreen::JobSearch(s) => s.query.location = Some(location),
                _ => return Ok(not_here("filter location")),
            },
            Command::FilterClear => match &mut self.screen {
                ActiveScreen::Applications(s) => s.clear_filters(api).await?,
                ActiveScreen::ManagerDashboard(s) => s.set_status_filter(api, None).await?,
                ActiveScreen::JobSearch(s) => s.clear_filters(),
                _ => return Ok(not_here("filter clear")),
            },
            Command::Tab(category) => match &mut self.screen {
                ActiveScreen::Applications(s) => s.set_category(category),
                _ => return Ok(not_here("tab")),
            },
            Command::Search(term) => match &mut self.screen {
                ActiveScreen::JobSearch(s) => s.query.search = term,
                _ => return Ok(not_here("search")),
            },
            Command::Quick(status) => {
                if !matches!(self.screen, ActiveScreen::ManagerDashboard(_)) {
                    return Ok(not_here("quick"));
                }
                let (view, payload) = ManagerDashboard::quick_link(status);
                self.router.navigate(view, payload);
                self.enter().await?;
            }
            Command::Apply { job, cover_letter } => match &mut self.screen {
                ActiveScreen::CandidateDashboard(s) => s.apply(api, job, cover_letter).await?,
                ActiveScreen::JobSearch(s) => match job {
                    Some(job) => s.apply(api, job, cover_letter).await?,
                    None => return Ok(Reply::Message(usage("apply <job-id> [cover letter]"))),
                },
                ActiveScreen::CandidateProfile(s) => match job {
                    Some(job) => s.apply_to_job(api, job).await?,
                    None => return Ok(Reply::Message(usage("apply <job-id>"))),
                },
                _ => return Ok(not_here("apply")),
            },
            Command::Withdraw(id) => match &mut self.screen {
                ActiveScreen::CandidateDashboard(s) => s.withdraw(api, id).await?,
                _ => return Ok(not_here("withdraw")),
            },
            Command::NewJob(new_job) => match &mut self.screen {
                ActiveScreen::Jobs(s) => s.create(api, new_job).await?,
                _ => return Ok(not_here("new-job")),
            },
            Command::NewCandidate(new_candidate) => match &mut self.screen {
                ActiveScreen::Candidates(s) => s.create(api, new_candidate).await?,
                _ => return Ok(not_here("new-candidate")),
            },
            Command::Save(job_id) => match &mut self.screen {
                ActiveScreen::JobSearch(s) => {
                    let text = if s.toggle_saved(job_id).await? {
                        format!("Saved job #{job_id}")
                    } else {
                        format!("Removed job #{job_id} from saved jobs")
                    };
                    return Ok(Reply::Message(text));
                }
                _ => return Ok(not_here("save")),
            },
            Command::Read(id) => match &mut self.screen {
                ActiveScreen::CandidateDashboard(s) => s.mark_read(api, id).await?,
                _ => return Ok(not_here("read")),
            },
            Command::ReadAll => match &mut self.screen {
                ActiveScreen::CandidateDashboard(s) => s.mark_all_read(api).await?,
                _ => return Ok(not_here("read-all")),
            },
            Command::Upload(path) => match &mut self.screen {
                ActiveScreen::CandidateDashboard(s) => s.upload_resume(api, &path).await?,
                _ => return Ok(not_here("upload")),
            },
            Command::Profile(update) => match &mut self.screen {
                ActiveScreen::CandidateDashboard(s) => s.update_profile(api, &update).await?,
                _ => return Ok(not_here("profile")),
            },
            Command::Help => return Ok(Reply::Message(HELP.to_string())),
            Command::Quit => return Ok(Reply::Quit),
        }
        Ok(Reply::Render)
    }

    /// Handles one input line. Returns false once the user quits.
    async fn handle_line(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return true;
        }
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                return true;
            }
        };
        match self.execute(command).await {
            Ok(Reply::Render) => print!("{}", self.render()),
            Ok(Reply::Message(message)) => println!("{message}"),
            Ok(Reply::Quit) => return false,
            Err(e) => {
                println!("Alert: {}", e.alert_message());
                print!("{}", self.render());
            }
        }
        true
    }

    /// Runs until `quit` or end of input.
    pub async fn run(mut self) -> anyhow::Result<()> {
        if let Err(e) = self.enter().await {
            println!("Alert: {}", e.alert_message());
        }
        print!("{}", self.render());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read from stdin")? else {
                        break;
                    };
                    if !self.handle_line(&line).await {
                        break;
                    }
                }
                _ = next_poll(&mut self.poller) => {
                    debug!("Refreshing candidate dashboard");
                    let api = self.api();
                    if self.screen.refresh(api.as_ref()).await.is_ok() {
                        print!("{}", self.render());
                    }
                }
            }
        }
        info!("Console closed");
        Ok(())
    }
}

async fn next_poll(poller: &mut Option<Poller>) {
    match poller {
        Some(poller) => poller.tick().await,
        None => std::future::pending().await,
    }
}
