//! REST client: the one place the console talks to the backend.
//!
//! Screens and the session gate only see the `RecruitingApi` trait, so they can be
//! driven by `testing::FakeBackend` in unit tests. `ApiClient` is the real
//! implementation over reqwest with a cookie jar holding the backend session.
//!
//! No request is retried: a failed call is reported once and the caller decides
//! whether to show an alert.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::errors::{ClientError, ClientResult};
use crate::models::user::UserEnvelope;
use crate::models::{
    Application, ApplicationFilter, Candidate, Credentials, Job, NewApplication, NewCandidate,
    NewJob, Notification, ProfileUpdate, Registration, UnreadCount, User,
};

/// Every backend operation the console uses.
///
/// Carried around as `Arc<dyn RecruitingApi>`.
#[async_trait]
pub trait RecruitingApi: Send + Sync {
    async fn current_user(&self) -> ClientResult<User>;
    async fn login(&self, credentials: &Credentials) -> ClientResult<User>;
    async fn logout(&self) -> ClientResult<()>;
    async fn register(&self, registration: &Registration) -> ClientResult<User>;

    async fn list_jobs(&self) -> ClientResult<Vec<Job>>;
    async fn create_job(&self, job: &NewJob) -> ClientResult<Job>;

    async fn list_candidates(&self) -> ClientResult<Vec<Candidate>>;
    async fn create_candidate(&self, candidate: &NewCandidate) -> ClientResult<Candidate>;
    async fn my_profile(&self) -> ClientResult<Candidate>;
    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()>;
    async fn upload_resume(&self, file_name: &str, contents: Bytes) -> ClientResult<()>;

    async fn list_applications(&self, filter: &ApplicationFilter)
        -> ClientResult<Vec<Application>>;
    async fn create_application(&self, application: &NewApplication)
        -> ClientResult<Application>;
    async fn withdraw_application(&self, id: i64) -> ClientResult<()>;

    async fn list_notifications(&self) -> ClientResult<Vec<Notification>>;
    async fn unread_count(&self) -> ClientResult<u32>;
    async fn mark_notification_read(&self, id: i64) -> ClientResult<()>;
    async fn mark_all_notifications_read(&self) -> ClientResult<()>;
}

/// reqwest-backed client. Cloning shares the connection pool and the session cookie.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends the request and turns any non-2xx answer into a `ClientError`.
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("backend answered {status}: {body}");
            return Err(ClientError::from_response(status, &body));
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ClientError::Parse)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        debug!("GET {path}");
        self.decode(self.client.get(self.url(path))).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        debug!("POST {path}");
        self.decode(self.client.post(self.url(path)).json(body))
            .await
    }

    /// POST whose response body is not needed.
    async fn post_empty(&self, path: &str) -> ClientResult<()> {
        debug!("POST {path}");
        self.send(self.client.post(self.url(path))).await?;
        Ok(())
    }
}

#[async_trait]
impl RecruitingApi for ApiClient {
    async fn current_user(&self) -> ClientResult<User> {
        let envelope: UserEnvelope = self.get("auth/current_user/").await?;
        Ok(envelope.user)
    }

    async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        let envelope: UserEnvelope = self.post("auth/login/", credentials).await?;
        Ok(envelope.user)
    }

    async fn logout(&self) -> ClientResult<()> {
        self.post_empty("auth/logout/").await
    }

    async fn register(&self, registration: &Registration) -> ClientResult<User> {
        let envelope: UserEnvelope = self.post("auth/register/", registration).await?;
        Ok(envelope.user)
    }

    async fn list_jobs(&self) -> ClientResult<Vec<Job>> {
        self.get("jobs/").await
    }

    async fn create_job(&self, job: &NewJob) -> ClientResult<Job> {
        self.post("jobs/", job).await
    }

    async fn list_candidates(&self) -> ClientResult<Vec<Candidate>> {
        self.get("candidates/").await
    }

    async fn create_candidate(&self, candidate: &NewCandidate) -> ClientResult<Candidate> {
        self.post("candidates/", candidate).await
    }

    async fn my_profile(&self) -> ClientResult<Candidate> {
        self.get("candidates/my_profile/").await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<()> {
        debug!("PATCH candidates/update_profile/");
        self.send(
            self.client
                .patch(self.url("candidates/update_profile/"))
                .json(update),
        )
        .await?;
        Ok(())
    }

    async fn upload_resume(&self, file_name: &str, contents: Bytes) -> ClientResult<()> {
        debug!("POST candidates/upload_resume/ ({} bytes)", contents.len());
        let part = multipart::Part::bytes(contents.to_vec()).file_name(file_name.to_string());
        let form = multipart::Form::new().part("resume", part);
        self.send(
            self.client
                .post(self.url("candidates/upload_resume/"))
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    async fn list_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> ClientResult<Vec<Application>> {
        debug!("GET applications/ {filter:?}");
        self.decode(self.client.get(self.url("applications/")).query(filter))
            .await
    }

    async fn create_application(
        &self,
        application: &NewApplication,
    ) -> ClientResult<Application> {
        self.post("applications/", application).await
    }

    async fn withdraw_application(&self, id: i64) -> ClientResult<()> {
        self.post_empty(&format!("applications/{id}/withdraw/")).await
    }

    async fn list_notifications(&self) -> ClientResult<Vec<Notification>> {
        self.get("notifications/").await
    }

    async fn unread_count(&self) -> ClientResult<u32> {
        let unread: UnreadCount = self.get("notifications/unread_count/").await?;
        Ok(unread.count)
    }

    async fn mark_notification_read(&self, id: i64) -> ClientResult<()> {
        self.post_empty(&format!("notifications/{id}/mark_read/"))
            .await
    }

    async fn mark_all_notifications_read(&self) -> ClientResult<()> {
        self.post_empty("notifications/mark_all_read/").await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Multipart, Path, Query, State};
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::models::ApplicationStatus;

    const SESSION_COOKIE: &str = "sessionid=abc123";

    #[derive(Clone, Default)]
    struct MockState {
        uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
        withdrawn: Arc<Mutex<Vec<i64>>>,
    }

    fn has_session(headers: &HeaderMap) -> bool {
        headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.contains(SESSION_COOKIE))
    }

    fn user_json() -> Value {
        json!({
            "id": 1,
            "username": "hana",
            "email": "hana@example.com",
            "role": "HR",
            "candidate": null
        })
    }

    async fn login(Json(body): Json<Value>) -> impl IntoResponse {
        if body["username"] == "hana" && body["password"] == "secret" {
            (
                StatusCode::OK,
                [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
                Json(json!({ "user": user_json(), "message": "Login successful" })),
            )
                .into_response()
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response()
        }
    }

    async fn current_user(headers: HeaderMap) -> impl IntoResponse {
        if has_session(&headers) {
            Json(json!({ "user": user_json() })).into_response()
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated" })),
            )
                .into_response()
        }
    }

    async fn applications(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let all = vec![
            json!({ "id": 1, "applicationDate": "2024-04-03", "status": "Under Review",
                    "candidate": 7, "candidate_name": "Ada Lovelace", "job_title": "Engineer",
                    "job_department": "Engineering" }),
            json!({ "id": 2, "applicationDate": "2024-04-02", "status": "Received",
                    "candidate": 8, "candidate_name": "Alan Turing", "job_title": "Analyst",
                    "job_department": "Finance" }),
            json!({ "id": 3, "applicationDate": "2024-04-01", "status": "Received",
                    "candidate": 8, "candidate_name": "Alan Turing", "job_title": "Engineer",
                    "job_department": "Engineering" }),
        ];
        let param = |name: &str, a: &Value, field: &str| {
            params.get(name).map_or(true, |v| match &a[field] {
                Value::String(s) => s == v,
                other => other.to_string() == *v,
            })
        };
        let filtered = all
            .into_iter()
            .filter(|a| {
                param("status", a, "status")
                    && param("department", a, "job_department")
                    && param("candidate_id", a, "candidate")
            })
            .collect();
        Json(Value::Array(filtered))
    }

    async fn create_job(Json(body): Json<Value>) -> impl IntoResponse {
        if body["title"].as_str().unwrap_or_default().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "title": ["This field may not be blank."] })),
            )
                .into_response();
        }
        let mut created = body.clone();
        created["id"] = json!(42);
        (StatusCode::CREATED, Json(created)).into_response()
    }

    async fn withdraw(State(state): State<MockState>, Path(id): Path<i64>) -> Json<Value> {
        state.withdrawn.lock().unwrap().push(id);
        Json(json!({ "status": "Withdrawn" }))
    }

    async fn upload(State(state): State<MockState>, mut form: Multipart) -> StatusCode {
        while let Ok(Some(field)) = form.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let file = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.unwrap_or_default();
            state.uploads.lock().unwrap().push((name, file, data.len()));
        }
        StatusCode::OK
    }

    async fn unread() -> Json<Value> {
        Json(json!({ "count": 3 }))
    }

    async fn spawn_backend() -> (ApiClient, MockState) {
        let state = MockState::default();
        let api = Router::new()
            .route("/auth/login/", post(login))
            .route("/auth/current_user/", get(current_user))
            .route("/applications/", get(applications))
            .route("/applications/:id/withdraw/", post(withdraw))
            .route("/jobs/", post(create_job))
            .route("/candidates/upload_resume/", post(upload))
            .route("/notifications/unread_count/", get(unread))
            .with_state(state.clone());
        let app = Router::new().nest("/api", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client =
            ApiClient::new(&format!("http://{addr}/api/"), Duration::from_secs(5)).unwrap();
        (client, state)
    }

    #[tokio::test]
    async fn test_session_cookie_carried_after_login() {
        let (client, _) = spawn_backend().await;

        let before = client.current_user().await.unwrap_err();
        assert!(before.is_auth());

        let user = client
            .login(&Credentials {
                username: "hana".into(),
                password: "secret".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.username, "hana");

        let current = client.current_user().await.unwrap();
        assert_eq!(current, user);
    }

    #[tokio::test]
    async fn test_bad_login_reports_backend_message() {
        let (client, _) = spawn_backend().await;
        let err = client
            .login(&Credentials {
                username: "hana".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.alert_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_status_filter_sent_as_query() {
        let (client, _) = spawn_backend().await;
        let filter = ApplicationFilter {
            status: Some(ApplicationStatus::UnderReview),
            ..Default::default()
        };
        let apps = client.list_applications(&filter).await.unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].status, ApplicationStatus::UnderReview);

        let all = client
            .list_applications(&ApplicationFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    fn ids(apps: &[Application]) -> Vec<i64> {
        apps.iter().map(|a| a.id).collect()
    }

    #[tokio::test]
    async fn test_candidate_and_department_filters_sent_as_query() {
        let (client, _) = spawn_backend().await;

        let own = client
            .list_applications(&ApplicationFilter::for_candidate(8))
            .await
            .unwrap();
        assert_eq!(ids(&own), vec![2, 3]);
        assert!(own.iter().all(|a| a.candidate == Some(8)));

        let mut filter = ApplicationFilter {
            department: Some("Engineering".to_string()),
            ..Default::default()
        };
        let engineering = client.list_applications(&filter).await.unwrap();
        assert_eq!(ids(&engineering), vec![1, 3]);

        filter.candidate_id = Some(8);
        let both = client.list_applications(&filter).await.unwrap();
        assert_eq!(ids(&both), vec![3]);
    }

    #[tokio::test]
    async fn test_validation_errors_surface_generically() {
        let (client, _) = spawn_backend().await;
        let err = client
            .create_job(&NewJob {
                title: String::new(),
                department: "Engineering".into(),
                positions: 1,
                description: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
        assert_eq!(err.alert_message(), "title: This field may not be blank.");
    }

    #[tokio::test]
    async fn test_create_job_returns_backend_record() {
        let (client, _) = spawn_backend().await;
        let job = client
            .create_job(&NewJob {
                title: "Platform Engineer".into(),
                department: "Engineering".into(),
                positions: 2,
                description: "Own the build system".into(),
            })
            .await
            .unwrap();
        assert_eq!(job.id, 42);
        assert_eq!(job.positions, 2);
    }

    #[tokio::test]
    async fn test_withdraw_hits_item_route() {
        let (client, state) = spawn_backend().await;
        client.withdraw_application(17).await.unwrap();
        assert_eq!(*state.withdrawn.lock().unwrap(), vec![17]);
    }

    #[tokio::test]
    async fn test_resume_uploaded_as_multipart_field() {
        let (client, state) = spawn_backend().await;
        client
            .upload_resume("cv.pdf", Bytes::from_static(b"%PDF-1.4 test"))
            .await
            .unwrap();
        let uploads = state.uploads.lock().unwrap().clone();
        assert_eq!(uploads, vec![("resume".to_string(), "cv.pdf".to_string(), 13)]);
    }

    #[tokio::test]
    async fn test_unread_count_unwrapped() {
        let (client, _) = spawn_backend().await;
        assert_eq!(client.unread_count().await.unwrap(), 3);
    }
}
