use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::api_client::RecruitingApi;
use crate::errors::{ClientError, ClientResult};
use crate::models::application::status_counts;
use crate::models::{
    Application, ApplicationFilter, ApplicationStatus, Candidate, Job, NewApplication,
    Notification, ProfileUpdate,
};
use crate::screens::{mutation_failed, refetched, Loadable, LOADING};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateData {
    pub applications: Vec<Application>,
    pub jobs: Vec<Job>,
    pub notifications: Vec<Notification>,
    /// `None` when the account has no linked candidate record.
    pub profile: Option<Candidate>,
    pub unread: u32,
}

impl CandidateData {
    /// Jobs the candidate has not applied to yet.
    pub fn available_jobs(&self) -> Vec<&Job> {
        let applied: HashSet<i64> = self.applications.iter().filter_map(|a| a.job).collect();
        self.jobs.iter().filter(|j| !applied.contains(&j.id)).collect()
    }

    pub fn status_counts(&self) -> BTreeMap<ApplicationStatus, usize> {
        status_counts(&self.applications)
    }

    pub fn application(&self, id: i64) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == id)
    }
}

#[derive(Debug, Default)]
pub struct CandidateDashboard {
    pub data: Loadable<CandidateData>,
}

impl CandidateDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        let filter = ApplicationFilter::default();
        let (applications, jobs, notifications, profile, unread) = tokio::join!(
            api.list_applications(&filter),
            api.list_jobs(),
            api.list_notifications(),
            api.my_profile(),
            api.unread_count(),
        );

        let profile = profile
            .map_err(|e| debug!("No candidate profile: {e}"))
            .ok();
        let unread = unread.unwrap_or_else(|e| {
            warn!("Error fetching unread count: {e}");
            0
        });

        let result = match (applications, jobs, notifications) {
            (Ok(applications), Ok(jobs), Ok(notifications)) => Ok(CandidateData {
                applications,
                jobs,
                notifications,
                profile,
                unread,
            }),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => Err(e),
        };
        self.data.settle("fetching dashboard data", result)
    }

    /// Submits an application for `job`. A blank cover letter is sent as none.
    pub async fn apply(
        &mut self,
        api: &dyn RecruitingApi,
        job: Option<i64>,
        cover_letter: Option<String>,
    ) -> ClientResult<()> {
        let job = job.ok_or(ClientError::MissingField("job"))?;
        let new_application = NewApplication {
            candidate: None,
            job,
            status: ApplicationStatus::Received,
            cover_letter: cover_letter.filter(|c| !c.trim().is_empty()),
        };
        mutation_failed(
            "submitting application",
            api.create_application(&new_application).await,
        )?;
        info!("Applied to job {job}");
        refetched(self.load(api).await)
    }

    pub async fn withdraw(
        &mut self,
        api: &dyn RecruitingApi,
        application_id: i64,
    ) -> ClientResult<()> {
        let withdrawable = self
            .data
            .get()
            .and_then(|d| d.application(application_id))
            .is_some_and(Application::can_withdraw);
        if !withdrawable {
            return Err(ClientError::Validation {
                message: format!("Application {application_id} cannot be withdrawn"),
            });
        }
        mutation_failed(
            "withdrawing application",
            api.withdraw_application(application_id).await,
        )?;
        info!("Withdrew application {application_id}");
        refetched(self.load(api).await)
    }

    pub async fn update_profile(
        &mut self,
        api: &dyn RecruitingApi,
        update: &ProfileUpdate,
    ) -> ClientResult<()> {
        if update.is_empty() {
            return Ok(());
        }
        mutation_failed("updating profile", api.update_profile(update).await)?;
        refetched(self.load(api).await)
    }

    /// Uploads the file at `path` as the candidate's resume.
    pub async fn upload_resume(
        &mut self,
        api: &dyn RecruitingApi,
        path: &Path,
    ) -> ClientResult<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(ClientError::MissingField("file name"))?;
        let contents = tokio::fs::read(path).await.map_err(ClientError::from);
        let contents = mutation_failed("reading resume", contents)?;
        mutation_failed(
            "uploading resume",
            api.upload_resume(file_name, Bytes::from(contents)).await,
        )?;
        info!("Uploaded resume {file_name}");
        refetched(self.load(api).await)
    }

    pub async fn mark_read(
        &mut self,
        api: &dyn RecruitingApi,
        notification_id: i64,
    ) -> ClientResult<()> {
        mutation_failed(
            "marking notification as read",
            api.mark_notification_read(notification_id).await,
        )?;
        refetched(self.load(api).await)
    }

    pub async fn mark_all_read(&mut self, api: &dyn RecruitingApi) -> ClientResult<()> {
        mutation_failed(
            "marking all notifications as read",
            api.mark_all_notifications_read().await,
        )?;
        refetched(self.load(api).await)
    }
}

impl fmt::Display for CandidateDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== My Dashboard ==")?;
        let Some(data) = self.data.get() else {
            return writeln!(f, "{LOADING}");
        };
        if let Some(profile) = &data.profile {
            writeln!(f, "Welcome back, {}", profile.first_name)?;
            writeln!(
                f,
                "Resume: {}",
                profile.resume_url.as_deref().unwrap_or("not uploaded")
            )?;
        }

        writeln!(f, "-- My applications ({}) --", data.applications.len())?;
        for (status, count) in data.status_counts() {
            writeln!(f, "  {status:<15} {count}")?;
        }
        for app in &data.applications {
            let action = if app.can_withdraw() { "  (withdraw)" } else { "" };
            writeln!(
                f,
                "  #{:<4} {} ({}) applied {} [{}]{action}",
                app.id, app.job_title, app.job_department, app.application_date, app.status
            )?;
        }

        let available = data.available_jobs();
        writeln!(f, "-- Available jobs ({}) --", available.len())?;
        for job in available {
            writeln!(f, "  #{:<4} {} - {}", job.id, job.title, job.department)?;
        }

        writeln!(f, "-- Notifications ({} unread) --", data.unread)?;
        for n in &data.notifications {
            let marker = if n.is_read { ' ' } else { '*' };
            writeln!(
                f,
                " {marker}#{:<4} {} - {} ({})",
                n.id,
                n.title,
                n.message,
                n.created_at.format("%Y-%m-%d %H:%M")
            )?;
        }
        Ok(())
    }
}
