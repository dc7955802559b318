#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::Utc;
use recruit_portal::{
    AppConfig, AppState,
    auth::issue_admin_token,
    create_router,
    models::{
        CandidateStatus, ContentItem, CreateContentItemRequest, CreateJobRequest,
        CreateServiceRequest, CreateTrainingRequest, CreateVerifiedCandidateRequest,
        JobApplication, JobPosting, NewJobApplication, NewTemplate, ServiceRequest,
        ServiceRequestStatus, Template, TrainingRequest, TrainingRequestStatus,
        UpdateContentItemRequest, UpdateJobRequest, VerifiedCandidate,
    },
    repository::{RepoResult, Repository, RepositoryState},
    storage::{MediaStorage, MemoryObjectStore},
};
use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};
use tower::ServiceExt;

// --- IN-MEMORY REPOSITORY ---

#[derive(Default)]
pub struct Tables {
    pub service_requests: Vec<ServiceRequest>,
    pub content: Vec<ContentItem>,
    pub candidates: Vec<VerifiedCandidate>,
    pub templates: Vec<Template>,
    pub jobs: Vec<JobPosting>,
    pub applications: Vec<JobApplication>,
    pub training: Vec<TrainingRequest>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Behaves like the Postgres repository over plain vectors. Every trait call is
/// counted so tests can assert that rejected requests never reached storage.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
    pub fail: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the pool were exhausted.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Direct table access for seeding and assertions (not counted).
    pub fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    fn enter(&self) -> RepoResult<MutexGuard<'_, Tables>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(self.tables.lock().unwrap())
    }

    pub fn seed_job(&self, title: &str, is_published: bool) -> i32 {
        let mut t = self.tables();
        let id = t.next_id();
        t.jobs.push(JobPosting {
            id,
            title: title.to_string(),
            company: "Acme".into(),
            location: "Lagos".into(),
            employment_type: "Full-time".into(),
            description: "Build things".into(),
            is_published,
            created_at: Utc::now(),
            ..Default::default()
        });
        id
    }

    pub fn seed_content(&self, content_type: &str, url: &str, is_published: bool) -> i32 {
        let mut t = self.tables();
        let id = t.next_id();
        t.content.push(ContentItem {
            id,
            content_type: content_type.to_string(),
            title: format!("{content_type} {id}"),
            url: url.to_string(),
            is_published,
            created_at: Utc::now(),
            ..Default::default()
        });
        id
    }

    pub fn seed_candidate(&self, name: &str, status: CandidateStatus) -> i32 {
        let mut t = self.tables();
        let id = t.next_id();
        t.candidates.push(VerifiedCandidate {
            id,
            full_name: name.to_string(),
            title: "Engineer".into(),
            bio: "Vetted".into(),
            service: "Candidate Verification".into(),
            status,
            created_at: Utc::now(),
            ..Default::default()
        });
        id
    }

    pub fn seed_template(&self, file_url: &str, is_published: bool) -> i32 {
        let mut t = self.tables();
        let id = t.next_id();
        t.templates.push(Template {
            id,
            title: "Offer letter".into(),
            filename: file_url.rsplit('/').next().unwrap_or_default().to_string(),
            file_url: file_url.to_string(),
            is_published,
            created_at: Utc::now(),
            ..Default::default()
        });
        id
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_service_request(&self, req: CreateServiceRequest) -> RepoResult<ServiceRequest> {
        let mut t = self.enter()?;
        let row = ServiceRequest {
            id: t.next_id(),
            full_name: req.full_name,
            email: req.email,
            phone: req.phone,
            company: req.company,
            service_type: req.service_type,
            message: req.message,
            status: ServiceRequestStatus::Pending,
            created_at: Utc::now(),
        };
        t.service_requests.push(row.clone());
        Ok(row)
    }

    async fn list_service_requests(&self) -> RepoResult<Vec<ServiceRequest>> {
        Ok(self.enter()?.service_requests.iter().rev().cloned().collect())
    }

    async fn get_service_request(&self, id: i32) -> RepoResult<Option<ServiceRequest>> {
        Ok(self.enter()?.service_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn update_service_request_status(
        &self,
        id: i32,
        status: ServiceRequestStatus,
    ) -> RepoResult<Option<ServiceRequest>> {
        let mut t = self.enter()?;
        Ok(t.service_requests.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status;
            r.clone()
        }))
    }

    async fn list_published_content(&self, content_type: Option<String>) -> RepoResult<Vec<ContentItem>> {
        Ok(self
            .enter()?
            .content
            .iter()
            .rev()
            .filter(|c| c.is_published)
            .filter(|c| content_type.as_ref().is_none_or(|t| &c.content_type == t))
            .cloned()
            .collect())
    }

    async fn create_content_item(&self, req: CreateContentItemRequest) -> RepoResult<ContentItem> {
        let mut t = self.enter()?;
        let row = ContentItem {
            id: t.next_id(),
            content_type: req.content_type,
            title: req.title,
            description: req.description,
            url: req.url,
            image_url: req.image_url,
            file_url: req.file_url,
            filename: req.filename,
            category: req.category,
            is_favourite: req.is_favourite,
            is_published: req.is_published,
            created_at: Utc::now(),
        };
        t.content.push(row.clone());
        Ok(row)
    }

    async fn update_content_item(
        &self,
        id: i32,
        req: UpdateContentItemRequest,
    ) -> RepoResult<Option<ContentItem>> {
        let mut t = self.enter()?;
        Ok(t.content.iter_mut().find(|c| c.id == id).map(|c| {
            if let Some(v) = req.content_type { c.content_type = v; }
            if let Some(v) = req.title { c.title = v; }
            if let Some(v) = req.description { c.description = v; }
            if let Some(v) = req.url { c.url = v; }
            if let Some(v) = req.image_url { c.image_url = v; }
            if let Some(v) = req.file_url { c.file_url = v; }
            if let Some(v) = req.category { c.category = v; }
            if let Some(v) = req.is_favourite { c.is_favourite = v; }
            if let Some(v) = req.is_published { c.is_published = v; }
            c.clone()
        }))
    }

    async fn delete_content_item(&self, id: i32) -> RepoResult<Option<ContentItem>> {
        let mut t = self.enter()?;
        let idx = t.content.iter().position(|c| c.id == id);
        Ok(idx.map(|i| t.content.remove(i)))
    }

    async fn list_approved_candidates(&self) -> RepoResult<Vec<VerifiedCandidate>> {
        Ok(self
            .enter()?
            .candidates
            .iter()
            .filter(|c| c.status == CandidateStatus::Approved)
            .cloned()
            .collect())
    }

    async fn list_all_candidates(&self) -> RepoResult<Vec<VerifiedCandidate>> {
        Ok(self.enter()?.candidates.clone())
    }

    async fn create_candidate(&self, req: CreateVerifiedCandidateRequest) -> RepoResult<VerifiedCandidate> {
        let mut t = self.enter()?;
        let row = VerifiedCandidate {
            id: t.next_id(),
            full_name: req.full_name,
            title: req.title,
            company: req.company,
            bio: req.bio,
            service: req.service,
            image_url: req.image_url,
            status: req.status,
            created_at: Utc::now(),
        };
        t.candidates.push(row.clone());
        Ok(row)
    }

    async fn update_candidate_status(
        &self,
        id: i32,
        status: CandidateStatus,
    ) -> RepoResult<Option<VerifiedCandidate>> {
        let mut t = self.enter()?;
        Ok(t.candidates.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            c.clone()
        }))
    }

    async fn list_published_templates(&self) -> RepoResult<Vec<Template>> {
        Ok(self.enter()?.templates.iter().filter(|t| t.is_published).cloned().collect())
    }

    async fn list_all_templates(&self) -> RepoResult<Vec<Template>> {
        Ok(self.enter()?.templates.clone())
    }

    async fn create_template(&self, template: NewTemplate) -> RepoResult<Template> {
        let mut t = self.enter()?;
        let row = Template {
            id: t.next_id(),
            title: template.title,
            description: template.description,
            filename: template.filename,
            file_url: template.file_url,
            file_type: template.file_type,
            is_published: template.is_published,
            created_at: Utc::now(),
        };
        t.templates.push(row.clone());
        Ok(row)
    }

    async fn set_template_published(&self, id: i32, is_published: bool) -> RepoResult<Option<Template>> {
        let mut t = self.enter()?;
        Ok(t.templates.iter_mut().find(|x| x.id == id).map(|x| {
            x.is_published = is_published;
            x.clone()
        }))
    }

    async fn delete_template(&self, id: i32) -> RepoResult<Option<Template>> {
        let mut t = self.enter()?;
        let idx = t.templates.iter().position(|x| x.id == id);
        Ok(idx.map(|i| t.templates.remove(i)))
    }

    async fn list_published_jobs(&self) -> RepoResult<Vec<JobPosting>> {
        Ok(self.enter()?.jobs.iter().filter(|j| j.is_published).cloned().collect())
    }

    async fn list_all_jobs(&self) -> RepoResult<Vec<JobPosting>> {
        Ok(self.enter()?.jobs.clone())
    }

    async fn get_job(&self, id: i32) -> RepoResult<Option<JobPosting>> {
        Ok(self.enter()?.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn create_job(&self, req: CreateJobRequest) -> RepoResult<JobPosting> {
        let mut t = self.enter()?;
        let row = JobPosting {
            id: t.next_id(),
            title: req.title,
            company: req.company,
            location: req.location,
            employment_type: req.employment_type,
            description: req.description,
            requirements: req.requirements,
            salary: req.salary,
            is_published: req.is_published,
            created_at: Utc::now(),
        };
        t.jobs.push(row.clone());
        Ok(row)
    }

    async fn set_job_published(&self, id: i32, is_published: bool) -> RepoResult<Option<JobPosting>> {
        let mut t = self.enter()?;
        Ok(t.jobs.iter_mut().find(|j| j.id == id).map(|j| {
            j.is_published = is_published;
            j.clone()
        }))
    }

    async fn update_job(&self, id: i32, req: UpdateJobRequest) -> RepoResult<Option<JobPosting>> {
        let mut t = self.enter()?;
        Ok(t.jobs.iter_mut().find(|j| j.id == id).map(|j| {
            if let Some(v) = req.title { j.title = v; }
            if let Some(v) = req.company { j.company = v; }
            if let Some(v) = req.location { j.location = v; }
            if let Some(v) = req.employment_type { j.employment_type = v; }
            if let Some(v) = req.description { j.description = v; }
            if let Some(v) = req.requirements { j.requirements = v; }
            if let Some(v) = req.salary { j.salary = v; }
            if let Some(v) = req.is_published { j.is_published = v; }
            j.clone()
        }))
    }

    async fn delete_job(&self, id: i32) -> RepoResult<bool> {
        let mut t = self.enter()?;
        let before = t.jobs.len();
        t.jobs.retain(|j| j.id != id);
        t.applications.retain(|a| a.job_id != id);
        Ok(t.jobs.len() < before)
    }

    async fn create_job_application(&self, application: NewJobApplication) -> RepoResult<JobApplication> {
        let mut t = self.enter()?;
        let row = JobApplication {
            id: t.next_id(),
            job_id: application.job_id,
            full_name: application.full_name,
            email: application.email,
            phone: application.phone,
            state: application.state,
            city: application.city,
            cv_file_name: application.cv_file_name,
            cv_url: application.cv_url,
            cover_note: application.cover_note,
            created_at: Utc::now(),
        };
        t.applications.push(row.clone());
        Ok(row)
    }

    async fn list_job_applications(&self) -> RepoResult<Vec<JobApplication>> {
        Ok(self.enter()?.applications.clone())
    }

    async fn create_training_request(&self, req: CreateTrainingRequest) -> RepoResult<TrainingRequest> {
        let mut t = self.enter()?;
        let row = TrainingRequest {
            id: t.next_id(),
            full_name: req.full_name,
            email: req.email,
            phone: req.phone,
            employment_status: req.employment_status,
            organization_name: req.organization_name,
            role: req.role,
            interested_training: req.interested_training,
            preferred_start_date: req.preferred_start_date,
            certification_required: req.certification_required,
            verified_shortlist: req.verified_shortlist,
            status: TrainingRequestStatus::New,
            created_at: Utc::now(),
        };
        t.training.push(row.clone());
        Ok(row)
    }

    async fn list_training_requests(&self) -> RepoResult<Vec<TrainingRequest>> {
        Ok(self.enter()?.training.clone())
    }

    async fn update_training_request_status(
        &self,
        id: i32,
        status: TrainingRequestStatus,
    ) -> RepoResult<Option<TrainingRequest>> {
        let mut t = self.enter()?;
        Ok(t.training.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status;
            r.clone()
        }))
    }
}

// --- APP HARNESS ---

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub store: Option<Arc<MemoryObjectStore>>,
}

impl TestApp {
    /// Router over an empty repository and a working in-memory bucket.
    pub fn new() -> Self {
        Self::build(InMemoryRepository::new(), Some(MemoryObjectStore::new()), "uploads")
    }

    /// No bucket configured.
    pub fn without_storage() -> Self {
        Self::build(InMemoryRepository::new(), None, "uploads")
    }

    pub fn build(
        repo: InMemoryRepository,
        store: Option<MemoryObjectStore>,
        legacy_dir: impl Into<PathBuf>,
    ) -> Self {
        let repo = Arc::new(repo);
        let store = store.map(Arc::new);
        let storage = match &store {
            Some(s) => MediaStorage::new(s.clone(), legacy_dir),
            None => MediaStorage::unconfigured(legacy_dir),
        };

        let state = AppState {
            repo: repo.clone() as RepositoryState,
            storage,
            config: AppConfig::default(),
        };

        Self {
            router: create_router(state),
            repo,
            store,
        }
    }

    pub fn store(&self) -> &MemoryObjectStore {
        self.store.as_deref().expect("test app has no bucket")
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "body is not JSON ({e}): {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

// --- REQUEST BUILDERS ---

pub fn admin_bearer() -> String {
    format!("Bearer {}", issue_admin_token(Utc::now().timestamp_millis()))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, admin_bearer())
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    auth: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn admin_delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, admin_bearer())
        .body(Body::empty())
        .unwrap()
}

/// Minimal `multipart/form-data` encoder.
pub struct MultipartBody {
    boundary: &'static str,
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "X-TEST-BOUNDARY-7d1f",
            buf: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str, auth: Option<&str>) -> Request<Body> {
        self.buf
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            );
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(self.buf)).unwrap()
    }
}
