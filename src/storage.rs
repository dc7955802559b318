use async_trait::async_trait;
use aws_sdk_s3 as s3;
use bytes::Bytes;
use chrono::Utc;
use futures::{StreamExt, stream::BoxStream};
use rand::Rng;
use s3::{
    error::{DisplayErrorContext, SdkError},
    operation::{get_object::GetObjectError, head_object::HeadObjectError},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Arc, Mutex},
};
use tokio_util::io::ReaderStream;
use ts_rs::TS;
use utoipa::ToSchema;

/// Cache directive written on every object and echoed by the read route (one year).
pub const CACHE_CONTROL: &str = "public, max-age=31536000";

/// Every bucket object this service writes lives under this key prefix.
pub const OBJECT_PREFIX: &str = "public";

/// Public path prefix served by the read route.
pub const STORAGE_ROUTE_PREFIX: &str = "/storage/";

/// Older path form still stored on some records; maps to the same object keys.
pub const LEGACY_OBJECT_PREFIX: &str = "/objects/";

/// Local-disk files from before object storage existed.
pub const LEGACY_UPLOADS_PREFIX: &str = "/uploads/";

/// Streamed object body.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// StorageError
///
/// `NotConfigured` is raised eagerly, before any network call, when no bucket is set.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object storage not configured")]
    NotConfigured,

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("provider error: {0}")]
    Provider(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Folder
///
/// The closed set of logical folders objects are grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Folder {
    Uploads,
    Content,
    Candidates,
    Templates,
    Applications,
}

impl Folder {
    pub const ALL: [Folder; 5] = [
        Folder::Uploads,
        Folder::Content,
        Folder::Candidates,
        Folder::Templates,
        Folder::Applications,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Uploads => "uploads",
            Folder::Content => "content",
            Folder::Candidates => "candidates",
            Folder::Templates => "templates",
            Folder::Applications => "applications",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Folder {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Folder::ALL
            .into_iter()
            .find(|folder| folder.as_str() == s)
            .ok_or_else(|| StorageError::NotFound(format!("unknown folder: {s}")))
    }
}

/// StoredObject
///
/// Result of a successful upload. `filename` is what owning records keep for later
/// deletion; `url` is the public serving path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoredObject {
    pub url: String,
    pub object_path: String,
    pub filename: String,
}

/// Metadata returned by `ObjectStore::head`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMeta {
    pub content_type: Option<String>,
    pub size: u64,
}

/// file_extension
///
/// The original file's extension including the leading dot, case preserved.
/// Directory components are ignored; a name without a dot has no extension.
pub fn file_extension(original_filename: &str) -> &str {
    let base = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_filename);
    base.rfind('.').map_or("", |idx| &base[idx..])
}

/// generate_filename
///
/// `<millis>-<nonce><ext>`. The random nonce keeps two uploads issued in the
/// same millisecond apart without a shared counter.
pub fn generate_filename(original_filename: &str, millis: i64, nonce: u32) -> String {
    format!("{millis}-{nonce}{}", file_extension(original_filename))
}

/// Full bucket key for a generated filename.
pub fn object_key(folder: Folder, filename: &str) -> String {
    format!("{OBJECT_PREFIX}/{folder}/{filename}")
}

/// Public serving path for a generated filename.
pub fn public_path(folder: Folder, filename: &str) -> String {
    format!("{STORAGE_ROUTE_PREFIX}{folder}/{filename}")
}

/// object_key_for_path
///
/// Rewrites either accepted public path form (`/storage/...` or `/objects/...`)
/// to its bucket key. Any other path is not a bucket object.
pub fn object_key_for_path(path: &str) -> Option<String> {
    path.strip_prefix(STORAGE_ROUTE_PREFIX)
        .or_else(|| path.strip_prefix(LEGACY_OBJECT_PREFIX))
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("{OBJECT_PREFIX}/{rest}"))
}

/// Rejects empty names and directory navigation segments.
fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

// 1. ObjectStore Contract
/// ObjectStore
///
/// Abstract contract over the bucket. `S3ObjectStore` talks to S3/MinIO;
/// `MemoryObjectStore` keeps objects in-process for tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Creates the bucket if needed. Local development convenience.
    async fn ensure_bucket_exists(&self);

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// `Ok(None)` when the object does not exist.
    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>>;

    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream>;

    async fn delete(&self, key: &str) -> StorageResult<()>;
}

// 2. The Real Implementation (S3/MinIO)
/// S3ObjectStore
///
/// `force_path_style(true)` is required for MinIO and most S3-compatible gateways.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: s3::Client,
    bucket_name: String,
}

impl S3ObjectStore {
    pub fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
        }
    }

    fn provider_error<E>(err: SdkError<E>) -> StorageError
    where
        E: std::error::Error + 'static,
    {
        StorageError::Provider(DisplayErrorContext(&err).to_string())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            // Already-owned buckets land here too.
            tracing::debug!("create_bucket({}) skipped: {}", self.bucket_name, e);
        }
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .cache_control(CACHE_CONTROL)
            .body(data.into())
            .send()
            .await
            .map_err(Self::provider_error)?;
        Ok(())
    }

    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(ObjectMeta {
                content_type: output.content_type().map(str::to_string),
                size: output.content_length().unwrap_or(0).max(0) as u64,
            })),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                Ok(None)
            }
            Err(e) => Err(Self::provider_error(e)),
        }
    }

    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) =>
            {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(Self::provider_error(e)),
        };

        // AsyncRead over the SDK body, chunked by ReaderStream; nothing is buffered whole.
        Ok(ReaderStream::new(output.body.into_async_read()).boxed())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(Self::provider_error)?;
        Ok(())
    }
}

// 3. The In-Memory Implementation (For Tests)
/// MemoryObjectStore
///
/// Keeps objects in a map. With `should_fail` every operation returns a provider error.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    pub should_fail: bool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn objects(&self) -> std::sync::MutexGuard<'_, HashMap<String, (Bytes, String)>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> StorageResult<()> {
        if self.should_fail {
            Err(StorageError::Provider(
                "Mock Storage Error: Simulation requested".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    /// Returns the stored bytes and content type for `key`.
    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn ensure_bucket_exists(&self) {}

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        self.check()?;
        self.objects()
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>> {
        self.check()?;
        Ok(self.objects().get(key).map(|(data, content_type)| ObjectMeta {
            content_type: Some(content_type.clone()),
            size: data.len() as u64,
        }))
    }

    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream> {
        self.check()?;
        let (data, _) = self
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(futures::stream::once(async move { Ok(data) }).boxed())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.objects().remove(key);
        Ok(())
    }
}

/// OpenedObject
///
/// Everything the read route needs to stream an object back.
pub struct OpenedObject {
    pub content_type: String,
    pub size: u64,
    pub body: ByteStream,
}

/// MediaStorage
///
/// The upload/read/delete adapter handlers talk to. Holds the bucket handle when
/// one is configured, plus the legacy local uploads directory.
#[derive(Clone)]
pub struct MediaStorage {
    store: Option<Arc<dyn ObjectStore>>,
    legacy_dir: PathBuf,
}

impl MediaStorage {
    pub fn new(store: Arc<dyn ObjectStore>, legacy_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Some(store),
            legacy_dir: legacy_dir.into(),
        }
    }

    /// No bucket: uploads and reads fail with `NotConfigured`, deletes are no-ops.
    pub fn unconfigured(legacy_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: None,
            legacy_dir: legacy_dir.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn legacy_dir(&self) -> &Path {
        &self.legacy_dir
    }

    fn store(&self) -> StorageResult<&Arc<dyn ObjectStore>> {
        self.store.as_ref().ok_or(StorageError::NotConfigured)
    }

    /// upload
    ///
    /// Persists `data` under `public/<folder>/<millis>-<nonce><ext>` and returns the
    /// public path, the object key and the generated filename.
    ///
    /// # Errors
    /// `NotConfigured` before any network call when no bucket is set;
    /// `Provider` when the write fails.
    pub async fn upload(
        &self,
        data: Bytes,
        original_filename: &str,
        content_type: &str,
        folder: Folder,
    ) -> StorageResult<StoredObject> {
        let store = self.store()?;

        let nonce = rand::rng().random_range(0..1_000_000_000u32);
        let filename = generate_filename(original_filename, Utc::now().timestamp_millis(), nonce);
        let key = object_key(folder, &filename);

        tracing::info!(key = %key, size = data.len(), "starting object upload");
        if let Err(e) = store.put(&key, data, content_type).await {
            tracing::error!(key = %key, error = %e, "object upload failed");
            return Err(e);
        }
        tracing::info!(key = %key, "object upload succeeded");

        Ok(StoredObject {
            url: public_path(folder, &filename),
            object_path: key,
            filename,
        })
    }

    /// open
    ///
    /// Resolves `(folder, filename)` back to its key and opens a streaming read.
    ///
    /// # Errors
    /// `NotConfigured` without a bucket; `NotFound` for unknown folders, navigation
    /// segments or missing objects; `Provider` for anything the bucket reports.
    pub async fn open(&self, folder: &str, filename: &str) -> StorageResult<OpenedObject> {
        let store = self.store()?;
        let folder: Folder = folder.parse()?;
        if !is_plain_segment(filename) {
            return Err(StorageError::NotFound(filename.to_string()));
        }

        let key = object_key(folder, filename);
        let meta = store
            .head(&key)
            .await?
            .ok_or_else(|| StorageError::NotFound(key.clone()))?;
        let body = store.get_stream(&key).await?;

        Ok(OpenedObject {
            content_type: meta
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            size: meta.size,
            body,
        })
    }

    /// delete
    ///
    /// Best-effort removal by public path. Failures are logged and swallowed; a
    /// missing bucket makes bucket paths a silent no-op.
    pub async fn delete(&self, path: &str) {
        if let Some(key) = object_key_for_path(path) {
            let Some(store) = self.store.as_ref() else {
                return;
            };
            match store.delete(&key).await {
                Ok(()) => tracing::info!(key = %key, "deleted object"),
                Err(e) => tracing::error!(key = %key, error = %e, "failed to delete object"),
            }
        } else if let Some(name) = path.strip_prefix(LEGACY_UPLOADS_PREFIX) {
            if !is_plain_segment(name) {
                tracing::warn!(path, "refusing to delete legacy upload with unsafe name");
                return;
            }
            let file = self.legacy_dir.join(name);
            match tokio::fs::remove_file(&file).await {
                Ok(()) => tracing::info!(path = %file.display(), "deleted legacy upload"),
                Err(e) => tracing::warn!(path = %file.display(), error = %e, "failed to delete legacy upload"),
            }
        } else {
            tracing::debug!(path, "path is not a stored object, nothing to delete");
        }
    }
}
