use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

// --- Status & Kind Enums (Mapped to Postgres enum types) ---

/// Review state of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[sqlx(type_name = "service_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ServiceRequestStatus {
    #[default]
    Pending,
    Reviewed,
    Approved,
    Rejected,
}

/// Vetting state of a verified candidate. Only `approved` candidates are public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[sqlx(type_name = "candidate_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CandidateStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[sqlx(type_name = "template_file_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TemplateFileType {
    #[default]
    Pdf,
    Docx,
    Xlsx,
}

impl TemplateFileType {
    /// Infers the type from an uploaded file's extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::from_extension(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[sqlx(type_name = "training_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TrainingRequestStatus {
    #[default]
    New,
    Reviewed,
    Contacted,
}

// --- Core Records (Mapped to Database) ---

/// ServiceRequest
///
/// Inbound enquiry from the public contact form (`service_requests` table).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ServiceRequest {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub service_type: String,
    pub message: String,
    pub status: ServiceRequestStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ContentItem
///
/// News posts, videos and resources (`content_items` table). Only published items
/// are listed publicly.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContentItem {
    pub id: i32,
    // 'type' is a reserved keyword in Rust; the column and JSON key keep the name.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub content_type: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub file_url: Option<String>,
    // Generated object filename when the item was created through an upload.
    pub filename: Option<String>,
    pub category: Option<String>,
    pub is_favourite: bool,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// VerifiedCandidate
///
/// A vetted professional profile (`verified_candidates` table).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VerifiedCandidate {
    pub id: i32,
    pub full_name: String,
    pub title: String,
    pub company: String,
    pub bio: String,
    pub service: String,
    pub image_url: Option<String>,
    pub status: CandidateStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Template
///
/// Downloadable document template (`templates` table).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Template {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub filename: String,
    pub file_url: String,
    pub file_type: TemplateFileType,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobPosting {
    pub id: i32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub employment_type: String,
    pub description: String,
    pub requirements: Option<String>,
    pub salary: Option<String>,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// JobApplication
///
/// A CV submitted against a job posting. `job_id` is a foreign key to `job_postings`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobApplication {
    pub id: i32,
    pub job_id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub state: String,
    pub city: String,
    pub cv_file_name: String,
    pub cv_url: String,
    pub cover_note: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TrainingRequest {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub employment_status: Option<String>,
    pub organization_name: Option<String>,
    pub role: Option<String>,
    pub interested_training: String,
    pub preferred_start_date: Option<String>,
    pub certification_required: bool,
    pub verified_shortlist: bool,
    pub status: TrainingRequestStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// AdminLoginRequest
///
/// Input payload for `POST /api/admin/login`. An empty password is simply wrong,
/// not malformed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct AdminLoginRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminLoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminSessionResponse {
    pub authenticated: bool,
}

/// SubmissionResponse
///
/// Public submission acknowledgement (service and training requests). The full
/// record is only visible to admins.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SubmissionResponse {
    pub id: i32,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateServiceRequestStatus {
    pub status: ServiceRequestStatus,
}

/// CreateContentItemRequest
///
/// JSON creation of a content item whose asset is already hosted somewhere.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateContentItemRequest {
    #[serde(rename = "type", default = "default_content_type")]
    #[validate(length(min = 1, message = "Type is required"))]
    pub content_type: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(default)]
    pub is_published: bool,
}

pub fn default_content_type() -> String {
    "news".to_string()
}

/// nullable
///
/// Keeps "absent" and "null" apart on partial updates: a missing key stays `None`
/// (via `#[serde(default)]`), an explicit `null` becomes `Some(None)` and clears
/// the column.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// UpdateContentItemRequest
///
/// Partial update. Absent fields keep their stored value; `imageUrl`, `fileUrl`
/// and `category` are cleared by an explicit `null`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateContentItemRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Type cannot be empty"))]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub file_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub category: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favourite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateVerifiedCandidateRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[validate(length(min = 1, message = "Bio is required"))]
    pub bio: String,
    #[serde(default = "default_candidate_service")]
    pub service: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub status: CandidateStatus,
}

pub fn default_candidate_service() -> String {
    "Candidate Verification".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateCandidateStatus {
    pub status: CandidateStatus,
}

/// Insert shape for templates; only ever built after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub title: String,
    pub description: String,
    pub filename: String,
    pub file_url: String,
    pub file_type: TemplateFileType,
    pub is_published: bool,
}

/// TemplateUploadForm
///
/// Text fields of the multipart template upload. `file_type` falls back to the
/// uploaded file's extension.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUploadForm {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: String,
    pub file_type: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateTemplateStatus {
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "Employment type is required"))]
    pub employment_type: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// UpdateJobRequest
///
/// Partial job update. A body carrying only `isPublished` is a publish toggle.
/// `requirements` and `salary` are cleared by an explicit `null`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateJobRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub requirements: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    #[ts(optional)]
    pub salary: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl UpdateJobRequest {
    /// `Some(flag)` when the body is nothing but a publish toggle.
    pub fn publish_toggle(&self) -> Option<bool> {
        let only_flag = self.title.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.employment_type.is_none()
            && self.description.is_none()
            && self.requirements.is_none()
            && self.salary.is_none();
        if only_flag { self.is_published } else { None }
    }
}

/// JobApplicationForm
///
/// Text fields of the multipart job application, checked before the CV is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationForm {
    pub job_id: i32,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    pub cover_note: String,
}

impl JobApplicationForm {
    pub fn into_application(self, cv_file_name: String, cv_url: String) -> NewJobApplication {
        NewJobApplication {
            job_id: self.job_id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            state: self.state,
            city: self.city,
            cv_file_name,
            cv_url,
            cover_note: self.cover_note,
        }
    }
}

/// Insert shape for job applications, built after the CV is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewJobApplication {
    pub job_id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub state: String,
    pub city: String,
    pub cv_file_name: String,
    pub cv_url: String,
    pub cover_note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateTrainingRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[serde(default)]
    pub employment_status: Option<String>,
    #[serde(default)]
    pub organization_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[validate(length(min = 1, message = "Training selection is required"))]
    pub interested_training: String,
    #[serde(default)]
    pub preferred_start_date: Option<String>,
    #[serde(default)]
    pub certification_required: bool,
    #[serde(default)]
    pub verified_shortlist: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateTrainingRequestStatus {
    pub status: TrainingRequestStatus,
}
