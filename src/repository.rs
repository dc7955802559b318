use crate::models::{
    CandidateStatus, ContentItem, CreateContentItemRequest, CreateJobRequest,
    CreateServiceRequest, CreateTrainingRequest, CreateVerifiedCandidateRequest, JobApplication,
    JobPosting, NewJobApplication, NewTemplate, ServiceRequest, ServiceRequestStatus, Template,
    TrainingRequest, TrainingRequestStatus, UpdateContentItemRequest, UpdateJobRequest,
    VerifiedCandidate,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;

/// Result type of every persistence call. Handlers turn errors into a 500.
pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Repository Trait
///
/// Abstract contract for all persistence operations. Handlers only see this trait,
/// so tests can swap in an in-memory implementation.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum's
/// task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Service Requests ---
    async fn create_service_request(&self, req: CreateServiceRequest) -> RepoResult<ServiceRequest>;
    async fn list_service_requests(&self) -> RepoResult<Vec<ServiceRequest>>;
    async fn get_service_request(&self, id: i32) -> RepoResult<Option<ServiceRequest>>;
    async fn update_service_request_status(
        &self,
        id: i32,
        status: ServiceRequestStatus,
    ) -> RepoResult<Option<ServiceRequest>>;

    // --- Content ---
    // Public listing. Must enforce is_published = true.
    async fn list_published_content(&self, content_type: Option<String>) -> RepoResult<Vec<ContentItem>>;
    async fn create_content_item(&self, req: CreateContentItemRequest) -> RepoResult<ContentItem>;
    // Partial update: absent fields keep their value, explicit nulls clear nullable columns.
    async fn update_content_item(
        &self,
        id: i32,
        req: UpdateContentItemRequest,
    ) -> RepoResult<Option<ContentItem>>;
    // Returns the removed row so the caller can clean up its stored objects.
    async fn delete_content_item(&self, id: i32) -> RepoResult<Option<ContentItem>>;

    // --- Verified Candidates ---
    async fn list_approved_candidates(&self) -> RepoResult<Vec<VerifiedCandidate>>;
    async fn list_all_candidates(&self) -> RepoResult<Vec<VerifiedCandidate>>;
    async fn create_candidate(&self, req: CreateVerifiedCandidateRequest) -> RepoResult<VerifiedCandidate>;
    async fn update_candidate_status(
        &self,
        id: i32,
        status: CandidateStatus,
    ) -> RepoResult<Option<VerifiedCandidate>>;

    // --- Templates ---
    async fn list_published_templates(&self) -> RepoResult<Vec<Template>>;
    async fn list_all_templates(&self) -> RepoResult<Vec<Template>>;
    async fn create_template(&self, template: NewTemplate) -> RepoResult<Template>;
    async fn set_template_published(&self, id: i32, is_published: bool) -> RepoResult<Option<Template>>;
    async fn delete_template(&self, id: i32) -> RepoResult<Option<Template>>;

    // --- Jobs ---
    async fn list_published_jobs(&self) -> RepoResult<Vec<JobPosting>>;
    async fn list_all_jobs(&self) -> RepoResult<Vec<JobPosting>>;
    async fn get_job(&self, id: i32) -> RepoResult<Option<JobPosting>>;
    async fn create_job(&self, req: CreateJobRequest) -> RepoResult<JobPosting>;
    async fn set_job_published(&self, id: i32, is_published: bool) -> RepoResult<Option<JobPosting>>;
    async fn update_job(&self, id: i32, req: UpdateJobRequest) -> RepoResult<Option<JobPosting>>;
    // true when a row was removed. Applications cascade.
    async fn delete_job(&self, id: i32) -> RepoResult<bool>;

    // --- Job Applications ---
    async fn create_job_application(&self, application: NewJobApplication) -> RepoResult<JobApplication>;
    async fn list_job_applications(&self) -> RepoResult<Vec<JobApplication>>;

    // --- Training Requests ---
    async fn create_training_request(&self, req: CreateTrainingRequest) -> RepoResult<TrainingRequest>;
    async fn list_training_requests(&self) -> RepoResult<Vec<TrainingRequest>>;
    async fn update_training_request_status(
        &self,
        id: i32,
        status: TrainingRequestStatus,
    ) -> RepoResult<Option<TrainingRequest>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SERVICE_REQUEST_COLUMNS: &str =
    "id, full_name, email, phone, company, service_type, message, status, created_at";
const CONTENT_COLUMNS: &str = "id, type, title, description, url, image_url, file_url, filename, \
     category, is_favourite, is_published, created_at";
const CANDIDATE_COLUMNS: &str =
    "id, full_name, title, company, bio, service, image_url, status, created_at";
const TEMPLATE_COLUMNS: &str =
    "id, title, description, filename, file_url, file_type, is_published, created_at";
const JOB_COLUMNS: &str = "id, title, company, location, employment_type, description, \
     requirements, salary, is_published, created_at";
const APPLICATION_COLUMNS: &str = "id, job_id, full_name, email, phone, state, city, \
     cv_file_name, cv_url, cover_note, created_at";
const TRAINING_COLUMNS: &str = "id, full_name, email, phone, employment_status, \
     organization_name, role, interested_training, preferred_start_date, \
     certification_required, verified_shortlist, status, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    // --- Service Requests ---

    async fn create_service_request(&self, req: CreateServiceRequest) -> RepoResult<ServiceRequest> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            "INSERT INTO service_requests (full_name, email, phone, company, service_type, message) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {SERVICE_REQUEST_COLUMNS}"
        ))
        .bind(req.full_name)
        .bind(req.email)
        .bind(req.phone)
        .bind(req.company)
        .bind(req.service_type)
        .bind(req.message)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_service_requests(&self) -> RepoResult<Vec<ServiceRequest>> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {SERVICE_REQUEST_COLUMNS} FROM service_requests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_service_request(&self, id: i32) -> RepoResult<Option<ServiceRequest>> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {SERVICE_REQUEST_COLUMNS} FROM service_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_service_request_status(
        &self,
        id: i32,
        status: ServiceRequestStatus,
    ) -> RepoResult<Option<ServiceRequest>> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            "UPDATE service_requests SET status = $2 WHERE id = $1 RETURNING {SERVICE_REQUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Content ---

    /// list_published_content
    ///
    /// QueryBuilder keeps the optional `type` filter parameterized.
    /// **Visibility**: the base query always carries `WHERE is_published = true`.
    async fn list_published_content(&self, content_type: Option<String>) -> RepoResult<Vec<ContentItem>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTENT_COLUMNS} FROM content_items WHERE is_published = true"
        ));

        if let Some(t) = content_type {
            builder.push(" AND type = ");
            builder.push_bind(t);
        }

        builder.push(" ORDER BY created_at DESC");

        builder
            .build_query_as::<ContentItem>()
            .fetch_all(&self.pool)
            .await
    }

    async fn create_content_item(&self, req: CreateContentItemRequest) -> RepoResult<ContentItem> {
        sqlx::query_as::<_, ContentItem>(&format!(
            "INSERT INTO content_items \
                (type, title, description, url, image_url, file_url, filename, category, is_favourite, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(req.content_type)
        .bind(req.title)
        .bind(req.description)
        .bind(req.url)
        .bind(req.image_url)
        .bind(req.file_url)
        .bind(req.filename)
        .bind(req.category)
        .bind(req.is_favourite)
        .bind(req.is_published)
        .fetch_one(&self.pool)
        .await
    }

    /// update_content_item
    ///
    /// Required columns use `COALESCE($n, column)`: a NULL bind keeps the stored
    /// value. Nullable columns take a presence flag so an explicit `null` clears them.
    async fn update_content_item(
        &self,
        id: i32,
        req: UpdateContentItemRequest,
    ) -> RepoResult<Option<ContentItem>> {
        sqlx::query_as::<_, ContentItem>(&format!(
            "UPDATE content_items SET \
                type = COALESCE($2, type), \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                url = COALESCE($5, url), \
                image_url = CASE WHEN $6 THEN $7 ELSE image_url END, \
                file_url = CASE WHEN $8 THEN $9 ELSE file_url END, \
                category = CASE WHEN $10 THEN $11 ELSE category END, \
                is_favourite = COALESCE($12, is_favourite), \
                is_published = COALESCE($13, is_published) \
             WHERE id = $1 RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(id)
        .bind(req.content_type)
        .bind(req.title)
        .bind(req.description)
        .bind(req.url)
        .bind(req.image_url.is_some())
        .bind(req.image_url.flatten())
        .bind(req.file_url.is_some())
        .bind(req.file_url.flatten())
        .bind(req.category.is_some())
        .bind(req.category.flatten())
        .bind(req.is_favourite)
        .bind(req.is_published)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_content_item(&self, id: i32) -> RepoResult<Option<ContentItem>> {
        sqlx::query_as::<_, ContentItem>(&format!(
            "DELETE FROM content_items WHERE id = $1 RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Verified Candidates ---

    async fn list_approved_candidates(&self) -> RepoResult<Vec<VerifiedCandidate>> {
        sqlx::query_as::<_, VerifiedCandidate>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM verified_candidates \
             WHERE status = 'approved' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn list_all_candidates(&self) -> RepoResult<Vec<VerifiedCandidate>> {
        sqlx::query_as::<_, VerifiedCandidate>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM verified_candidates ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn create_candidate(&self, req: CreateVerifiedCandidateRequest) -> RepoResult<VerifiedCandidate> {
        sqlx::query_as::<_, VerifiedCandidate>(&format!(
            "INSERT INTO verified_candidates (full_name, title, company, bio, service, image_url, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {CANDIDATE_COLUMNS}"
        ))
        .bind(req.full_name)
        .bind(req.title)
        .bind(req.company)
        .bind(req.bio)
        .bind(req.service)
        .bind(req.image_url)
        .bind(req.status)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_candidate_status(
        &self,
        id: i32,
        status: CandidateStatus,
    ) -> RepoResult<Option<VerifiedCandidate>> {
        sqlx::query_as::<_, VerifiedCandidate>(&format!(
            "UPDATE verified_candidates SET status = $2 WHERE id = $1 RETURNING {CANDIDATE_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Templates ---

    async fn list_published_templates(&self) -> RepoResult<Vec<Template>> {
        sqlx::query_as::<_, Template>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates WHERE is_published = true ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn list_all_templates(&self) -> RepoResult<Vec<Template>> {
        sqlx::query_as::<_, Template>(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM templates ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn create_template(&self, template: NewTemplate) -> RepoResult<Template> {
        sqlx::query_as::<_, Template>(&format!(
            "INSERT INTO templates (title, description, filename, file_url, file_type, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(template.title)
        .bind(template.description)
        .bind(template.filename)
        .bind(template.file_url)
        .bind(template.file_type)
        .bind(template.is_published)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_template_published(&self, id: i32, is_published: bool) -> RepoResult<Option<Template>> {
        sqlx::query_as::<_, Template>(&format!(
            "UPDATE templates SET is_published = $2 WHERE id = $1 RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(id)
        .bind(is_published)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_template(&self, id: i32) -> RepoResult<Option<Template>> {
        sqlx::query_as::<_, Template>(&format!(
            "DELETE FROM templates WHERE id = $1 RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- Jobs ---

    async fn list_published_jobs(&self) -> RepoResult<Vec<JobPosting>> {
        sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {JOB_COLUMNS} FROM job_postings WHERE is_published = true ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn list_all_jobs(&self) -> RepoResult<Vec<JobPosting>> {
        sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {JOB_COLUMNS} FROM job_postings ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_job(&self, id: i32) -> RepoResult<Option<JobPosting>> {
        sqlx::query_as::<_, JobPosting>(&format!(
            "SELECT {JOB_COLUMNS} FROM job_postings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_job(&self, req: CreateJobRequest) -> RepoResult<JobPosting> {
        sqlx::query_as::<_, JobPosting>(&format!(
            "INSERT INTO job_postings \
                (title, company, location, employment_type, description, requirements, salary, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {JOB_COLUMNS}"
        ))
        .bind(req.title)
        .bind(req.company)
        .bind(req.location)
        .bind(req.employment_type)
        .bind(req.description)
        .bind(req.requirements)
        .bind(req.salary)
        .bind(req.is_published)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_job_published(&self, id: i32, is_published: bool) -> RepoResult<Option<JobPosting>> {
        sqlx::query_as::<_, JobPosting>(&format!(
            "UPDATE job_postings SET is_published = $2 WHERE id = $1 RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(is_published)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_job(&self, id: i32, req: UpdateJobRequest) -> RepoResult<Option<JobPosting>> {
        sqlx::query_as::<_, JobPosting>(&format!(
            "UPDATE job_postings SET \
                title = COALESCE($2, title), \
                company = COALESCE($3, company), \
                location = COALESCE($4, location), \
                employment_type = COALESCE($5, employment_type), \
                description = COALESCE($6, description), \
                requirements = CASE WHEN $7 THEN $8 ELSE requirements END, \
                salary = CASE WHEN $9 THEN $10 ELSE salary END, \
                is_published = COALESCE($11, is_published) \
             WHERE id = $1 RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.company)
        .bind(req.location)
        .bind(req.employment_type)
        .bind(req.description)
        .bind(req.requirements.is_some())
        .bind(req.requirements.flatten())
        .bind(req.salary.is_some())
        .bind(req.salary.flatten())
        .bind(req.is_published)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_job(&self, id: i32) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM job_postings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Job Applications ---

    async fn create_job_application(&self, application: NewJobApplication) -> RepoResult<JobApplication> {
        sqlx::query_as::<_, JobApplication>(&format!(
            "INSERT INTO job_applications \
                (job_id, full_name, email, phone, state, city, cv_file_name, cv_url, cover_note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(application.job_id)
        .bind(application.full_name)
        .bind(application.email)
        .bind(application.phone)
        .bind(application.state)
        .bind(application.city)
        .bind(application.cv_file_name)
        .bind(application.cv_url)
        .bind(application.cover_note)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_job_applications(&self) -> RepoResult<Vec<JobApplication>> {
        sqlx::query_as::<_, JobApplication>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    // --- Training Requests ---

    async fn create_training_request(&self, req: CreateTrainingRequest) -> RepoResult<TrainingRequest> {
        sqlx::query_as::<_, TrainingRequest>(&format!(
            "INSERT INTO training_requests \
                (full_name, email, phone, employment_status, organization_name, role, \
                 interested_training, preferred_start_date, certification_required, verified_shortlist) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {TRAINING_COLUMNS}"
        ))
        .bind(req.full_name)
        .bind(req.email)
        .bind(req.phone)
        .bind(req.employment_status)
        .bind(req.organization_name)
        .bind(req.role)
        .bind(req.interested_training)
        .bind(req.preferred_start_date)
        .bind(req.certification_required)
        .bind(req.verified_shortlist)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_training_requests(&self) -> RepoResult<Vec<TrainingRequest>> {
        sqlx::query_as::<_, TrainingRequest>(&format!(
            "SELECT {TRAINING_COLUMNS} FROM training_requests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn update_training_request_status(
        &self,
        id: i32,
        status: TrainingRequestStatus,
    ) -> RepoResult<Option<TrainingRequest>> {
        sqlx::query_as::<_, TrainingRequest>(&format!(
            "UPDATE training_requests SET status = $2 WHERE id = $1 RETURNING {TRAINING_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }
}
