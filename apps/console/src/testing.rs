//! In-memory `RecruitingApi` used by unit tests.
//!
//! Behaves like the real backend where the console depends on it: session-scoped
//! auth, candidates only seeing their own applications, newest applications first,
//! and `{"error": ...}`-style failures.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{NaiveDate, TimeZone, Utc};

use crate::api_client::RecruitingApi;
use crate::errors::{ClientError, ClientResult};
use crate::models::{
    Application, ApplicationFilter, ApplicationStatus, Candidate, Credentials, Job,
    NewApplication, NewCandidate, NewJob, Notification, ProfileUpdate, Registration, Role, User,
};

pub const PASSWORD: &str = "secret";

#[derive(Default)]
struct FakeState {
    users: Vec<User>,
    current: Option<i64>,
    jobs: Vec<Job>,
    candidates: Vec<Candidate>,
    applications: Vec<Application>,
    notifications: Vec<(i64, Notification)>,
    fail_next: Option<String>,
    fail_on: Option<(&'static str, String)>,
    calls: Vec<&'static str>,
    next_id: i64,
}

impl FakeState {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn current_user(&self) -> ClientResult<&User> {
        self.current
            .and_then(|id| self.users.iter().find(|u| u.id == id))
            .ok_or_else(|| ClientError::Unauthorized {
                message: "Authentication credentials were not provided.".to_string(),
            })
    }

    fn linked_candidate(&self) -> ClientResult<i64> {
        let user = self.current_user()?;
        user.candidate.ok_or_else(|| ClientError::Api {
            status: 404,
            message: "Candidate profile not found".to_string(),
        })
    }
}

pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_id: 100,
                ..Default::default()
            }),
        }
    }

    /// Three users (`hana` HR, `dana` Manager, `cleo` Candidate), three jobs,
    /// three candidates and five applications across every department.
    pub fn seeded() -> Self {
        let backend = Self::empty();
        {
            let mut s = backend.state.lock().unwrap();
            s.users = vec![
                user(1, "hana", Role::Hr, None),
                user(2, "dana", Role::Manager, None),
                user(3, "cleo", Role::Candidate, Some(1)),
            ];
            s.candidates = vec![
                candidate(1, "Cleo", "Park"),
                candidate(2, "Ada", "Lovelace"),
                candidate(3, "Alan", "Turing"),
            ];
            s.jobs = vec![
                job(1, "Backend Engineer", "Engineering", Some("Active"), Some("Remote")),
                job(2, "Data Analyst", "Finance", Some("Active"), Some("New York")),
                job(3, "Product Designer", "Design", Some("Closed"), Some("Remote")),
            ];
            s.applications = vec![
                application(1, 2, 1, ApplicationStatus::UnderReview, "2024-04-03", &s),
                application(2, 3, 2, ApplicationStatus::Interview, "2024-04-02", &s),
                application(3, 1, 2, ApplicationStatus::Received, "2024-04-01", &s),
                application(4, 2, 3, ApplicationStatus::OfferExtended, "2024-03-28", &s),
                application(5, 3, 1, ApplicationStatus::Rejected, "2024-03-20", &s),
            ];
            s.notifications = vec![
                (3, notification(1, "Application received", false)),
                (3, notification(2, "Interview scheduled", true)),
                (3, notification(3, "New job posted", false)),
            ];
        }
        backend
    }

    pub fn sign_in_as(&self, username: &str) {
        let mut s = self.state.lock().unwrap();
        s.current = s.users.iter().find(|u| u.username == username).map(|u| u.id);
    }

    pub fn current_user_id(&self) -> Option<i64> {
        self.state.lock().unwrap().current
    }

    /// The next call, whatever it is, fails with a 503 carrying `message`.
    pub fn fail_next(&self, message: &str) {
        self.state.lock().unwrap().fail_next = Some(message.to_string());
    }

    /// The next call to `name` fails with a 503 carrying `message`.
    pub fn fail_on(&self, name: &'static str, message: &str) {
        self.state.lock().unwrap().fail_on = Some((name, message.to_string()));
    }

    pub fn calls(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    pub fn application_count(&self) -> usize {
        self.state.lock().unwrap().applications.len()
    }

    pub fn candidate(&self, id: i64) -> Option<Candidate> {
        self.state
            .lock()
            .unwrap()
            .candidates
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    fn enter(&self, call: &'static str) -> ClientResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(call);
        if let Some(message) = s.fail_next.take() {
            return Err(ClientError::Api {
                status: 503,
                message,
            });
        }
        if s.fail_on.as_ref().is_some_and(|(name, _)| *name == call) {
            if let Some((_, message)) = s.fail_on.take() {
                return Err(ClientError::Api {
                    status: 503,
                    message,
                });
            }
        }
        Ok(s)
    }
}

#[async_trait]
impl RecruitingApi for FakeBackend {
    async fn current_user(&self) -> ClientResult<User> {
        let s = self.enter("current_user")?;
        s.current_user().cloned()
    }

    async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        let mut s = self.enter("login")?;
        let found = s
            .users
            .iter()
            .find(|u| u.username == credentials.username)
            .filter(|_| credentials.password == PASSWORD)
            .cloned();
        match found {
            Some(user) => {
                s.current = Some(user.id);
                Ok(user)
            }
            None => Err(ClientError::Unauthorized {
                message: "Invalid credentials".to_string(),
            }),
        }
    }

    async fn logout(&self) -> ClientResult<()> {
        let mut s = self.enter("logout")?;
        s.current = None;
        Ok(())
    }

    async fn register(&self, registration: &Registration) -> ClientResult<User> {
        let mut s = self.enter("register")?;
        if s.users.iter().any(|u| u.username == registration.username) {
            return Err(ClientError::Validation {
                message: "Username already exists".to_string(),
            });
        }
        let id = s.id();
        let new_user = User {
            id,
            username: registration.username.clone(),
            email: registration.email.clone(),
            role: registration.role,
            candidate: registration.candidate_id,
        };
        s.users.push(new_user.clone());
        s.current = Some(id);
        Ok(new_user)
    }

    async fn list_jobs(&self) -> ClientResult<Vec<Job>> {
        let s = self.enter("list_jobs")?;
        s.current_user()?;
        Ok(s.jobs.clone())
    }

    async fn create_job(&self, new_job: &NewJob) -> ClientResult<Job> {
        let mut s = self.enter("create_job")?;
        s.current_user()?;
        let id = s.id();
        let created = Job {
            id,
            title: new_job.title.clone(),
            description: new_job.description.clone(),
            positions: new_job.positions,
            department: new_job.department.clone(),
            location: None,
            status: None,
        };
        s.jobs.push(created.clone());
        Ok(created)
    }

    async fn list_candidates(&self) -> ClientResult<Vec<Candidate>> {
        let s = self.enter("list_candidates")?;
        s.current_user()?;
        Ok(s.candidates.clone())
    }

    async fn create_candidate(&self, new_candidate: &NewCandidate) -> ClientResult<Candidate> {
        let mut s = self.enter("create_candidate")?;
        s.current_user()?;
        if s.candidates.iter().any(|c| c.email == new_candidate.email) {
            return Err(ClientError::Validation {
                message: "email: candidate with this email already exists.".to_string(),
            });
        }
        let id = s.id();
        let mut created = candidate(id, &new_candidate.first_name, &new_candidate.last_name);
        created.email = new_candidate.email.clone();
        created.phone = new_candidate.phone.clone();
        s.candidates.push(created.clone());
        Ok(created)
    }

    async fn my_profile(&self) -> ClientResult<Candidate> {
        let s = self.enter("my_profile")?;
        let id = s.linked_candidate()?;
        s.candidates
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: "Candidate profile not found".to_string(),
            })
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()> {
        let mut s = self.enter("update_profile")?;
        let id = s.linked_candidate()?;
        if let Some(c) = s.candidates.iter_mut().find(|c| c.id == id) {
            apply_update(update, c);
        }
        Ok(())
    }

    async fn upload_resume(&self, file_name: &str, _contents: Bytes) -> ClientResult<()> {
        let mut s = self.enter("upload_resume")?;
        let id = s.linked_candidate()?;
        if let Some(c) = s.candidates.iter_mut().find(|c| c.id == id) {
            c.resume_url = Some(format!("/media/resumes/{file_name}"));
        }
        Ok(())
    }

    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> ClientResult<Vec<Application>> {
        let s = self.enter("list_applications")?;
        let user = s.current_user()?;
        let own = match user.role {
            Role::Candidate => user.candidate,
            Role::Hr | Role::Manager => None,
        };
        let mut apps: Vec<Application> = s
            .applications
            .iter()
            .filter(|a| own.map_or(true, |c| a.candidate == Some(c)))
            .filter(|a| filter_matches(filter, a))
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.application_date.cmp(&a.application_date));
        Ok(apps)
    }

    async fn create_application(
        &self,
        new_application: &NewApplication,
    ) -> ClientResult<Application> {
        let mut s = self.enter("create_application")?;
        let user = s.current_user()?.clone();
        let candidate_id = match user.role {
            Role::Candidate => Some(user.candidate.ok_or_else(|| ClientError::Validation {
                message: "Candidate profile not linked. Please contact administrator.".to_string(),
            })?),
            Role::Hr | Role::Manager => new_application.candidate,
        }
        .ok_or_else(|| ClientError::Validation {
            message: "Candidate ID is required".to_string(),
        })?;
        if !s.jobs.iter().any(|j| j.id == new_application.job) {
            return Err(ClientError::Validation {
                message: format!(
                    "job: Invalid pk \"{}\" - object does not exist.",
                    new_application.job
                ),
            });
        }
        let id = s.id();
        let mut created = application(
            id,
            candidate_id,
            new_application.job,
            new_application.status,
            "2024-05-01",
            &s,
        );
        created.cover_letter = new_application.cover_letter.clone();
        s.applications.push(created.clone());
        Ok(created)
    }

    async fn withdraw_application(&self, id: i64) -> ClientResult<()> {
        let mut s = self.enter("withdraw_application")?;
        s.current_user()?;
        let app = s
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: "Not found.".to_string(),
            })?;
        if !app.can_withdraw() {
            return Err(ClientError::Validation {
                message: format!("Cannot withdraw an application that is {}", app.status),
            });
        }
        app.status = ApplicationStatus::Withdrawn;
        Ok(())
    }

    async fn list_notifications(&self) -> ClientResult<Vec<Notification>> {
        let s = self.enter("list_notifications")?;
        let user_id = s.current_user()?.id;
        Ok(s.notifications
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, n)| n.clone())
            .collect())
    }

    async fn unread_count(&self) -> ClientResult<u32> {
        let s = self.enter("unread_count")?;
        let user_id = s.current_user()?.id;
        Ok(s.notifications
            .iter()
            .filter(|(owner, n)| *owner == user_id && !n.is_read)
            .count() as u32)
    }

    async fn mark_notification_read(&self, id: i64) -> ClientResult<()> {
        let mut s = self.enter("mark_notification_read")?;
        let user_id = s.current_user()?.id;
        for (owner, n) in s.notifications.iter_mut() {
            if *owner == user_id && n.id == id {
                n.is_read = true;
            }
        }
        Ok(())
    }

    async fn mark_all_notifications_read(&self) -> ClientResult<()> {
        let mut s = self.enter("mark_all_notifications_read")?;
        let user_id = s.current_user()?.id;
        for (owner, n) in s.notifications.iter_mut() {
            if *owner == user_id {
                n.is_read = true;
            }
        }
        Ok(())
    }
}

/// Server-side filtering of `GET /applications/`.
fn filter_matches(filter: &ApplicationFilter, application: &Application) -> bool {
    filter.status.map_or(true, |s| application.status == s)
        && filter
            .department
            .as_deref()
            .map_or(true, |d| application.job_department == d)
        && filter
            .candidate_id
            .map_or(true, |c| application.candidate == Some(c))
}

/// Partial update semantics of `PATCH /candidates/update_profile/`.
fn apply_update(update: &ProfileUpdate, candidate: &mut Candidate) {
    if let Some(v) = &update.first_name {
        candidate.first_name = v.clone();
    }
    if let Some(v) = &update.last_name {
        candidate.last_name = v.clone();
    }
    if let Some(v) = &update.phone {
        candidate.phone = v.clone();
    }
    if let Some(v) = &update.bio {
        candidate.bio = Some(v.clone());
    }
    if let Some(v) = &update.linkedin {
        candidate.linkedin = Some(v.clone());
    }
    if let Some(v) = &update.portfolio {
        candidate.portfolio = Some(v.clone());
    }
}

fn user(id: i64, username: &str, role: Role, candidate: Option<i64>) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        role,
        candidate,
    }
}

pub fn candidate(id: i64, first: &str, last: &str) -> Candidate {
    Candidate {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@example.com", first.to_ascii_lowercase()),
        phone: String::new(),
        bio: None,
        linkedin: None,
        portfolio: None,
        resume_url: None,
    }
}

pub fn job(
    id: i64,
    title: &str,
    department: &str,
    status: Option<&str>,
    location: Option<&str>,
) -> Job {
    Job {
        id,
        title: title.to_string(),
        description: format!("{title} role in {department}"),
        positions: 1,
        department: department.to_string(),
        location: location.map(str::to_string),
        status: status.map(str::to_string),
    }
}

fn application(
    id: i64,
    candidate_id: i64,
    job_id: i64,
    status: ApplicationStatus,
    date: &str,
    s: &FakeState,
) -> Application {
    let candidate_name = s
        .candidates
        .iter()
        .find(|c| c.id == candidate_id)
        .map(Candidate::full_name)
        .unwrap_or_default();
    let job = s.jobs.iter().find(|j| j.id == job_id);
    Application {
        id,
        application_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        status,
        cover_letter: None,
        candidate_name,
        job_title: job.map(|j| j.title.clone()).unwrap_or_default(),
        job_department: job.map(|j| j.department.clone()).unwrap_or_default(),
        candidate: Some(candidate_id),
        job: Some(job_id),
    }
}

fn notification(id: i64, title: &str, is_read: bool) -> Notification {
    Notification {
        id,
        kind: "status_update".to_string(),
        title: title.to_string(),
        message: format!("{title}."),
        job: None,
        job_title: None,
        is_read,
        created_at: Utc.with_ymd_and_hms(2024, 4, 1, 9, 30, 0).unwrap(),
    }
}
