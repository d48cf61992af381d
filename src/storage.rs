use async_trait::async_trait;
use rand::Rng;
use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("invalid asset path: {0}")]
    InvalidPath(String),
    #[error("asset i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

// 1. AssetStore Contract
/// AssetStore
///
/// Defines the abstract contract for persisting uploaded images outside the database.
/// Callers only ever see paths relative to the store root (e.g. `vendors/vendors_1700000000_42.png`);
/// turning them into public URIs is the response layer's job.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Writes `bytes` under `category` with a generated, collision-resistant name
    /// (`{category}_{unix_ts}_{random}{ext}`) and returns the relative path.
    async fn store(
        &self,
        bytes: &[u8],
        category: &str,
        original_filename: &str,
    ) -> Result<String, StorageError>;

    /// Removes the asset. A path that does not exist is a `StorageError::NotFound`.
    async fn delete(&self, relative_path: &str) -> Result<(), StorageError>;

    /// Whether the relative path currently resolves to a stored asset.
    async fn exists(&self, relative_path: &str) -> bool;
}

/// StorageState
///
/// The concrete type used to share the asset store across the application state.
pub type StorageState = Arc<dyn AssetStore>;

// Attempts before giving up on finding a free file name within the same second.
const MAX_NAME_ATTEMPTS: usize = 8;

/// sanitize_key
///
/// Prevents path traversal by removing directory navigation components
/// (`..`, `.`, empty segments) from a relative path.
fn sanitize_key(key: &str) -> String {
    key.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// generate_file_name
///
/// `{category}_{unix_ts}_{0..1000}{.ext}`; the extension is taken from the client's
/// original file name and omitted when it has none.
fn generate_file_name(category: &str, original_filename: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp();
    let random: u32 = rand::rng().random_range(0..1000);
    let ext = Path::new(original_filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    format!("{category}_{timestamp}_{random}{ext}")
}

fn valid_category(category: &str) -> Result<&str, StorageError> {
    let valid = !category.is_empty()
        && category
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(category)
    } else {
        Err(StorageError::InvalidPath(category.to_string()))
    }
}

// 2. The Real Implementation (local filesystem)
/// LocalAssetStore
///
/// Stores assets as plain files under `root/{category}/`. The same root is mounted
/// read-only at `/uploads/` by the router.
#[derive(Clone, Debug)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative_path: &str) -> Result<PathBuf, StorageError> {
        let key = sanitize_key(relative_path);
        if key.is_empty() {
            return Err(StorageError::InvalidPath(relative_path.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    /// store
    ///
    /// Creates the category directory on demand. Files are opened with `create_new`,
    /// so two concurrent uploads that draw the same name never overwrite each other:
    /// the loser simply draws again.
    async fn store(
        &self,
        bytes: &[u8],
        category: &str,
        original_filename: &str,
    ) -> Result<String, StorageError> {
        let category = valid_category(category)?;
        let dir = self.root.join(category);
        fs::create_dir_all(&dir).await?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let file_name = generate_file_name(category, original_filename);
            let opened = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dir.join(&file_name))
                .await;

            let mut file = match opened {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(bytes).await?;
            file.flush().await?;

            let relative_path = format!("{category}/{file_name}");
            tracing::debug!(path = %relative_path, size = bytes.len(), "asset stored");
            return Ok(relative_path);
        }

        Err(StorageError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "could not find a free asset name",
        )))
    }

    async fn delete(&self, relative_path: &str) -> Result<(), StorageError> {
        let path = self.resolve(relative_path)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %relative_path, "asset deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(relative_path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, relative_path: &str) -> bool {
        match self.resolve(relative_path) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockAssetStore
///
/// In-memory `AssetStore` used by tests so orchestrator and handler logic can be
/// exercised without touching the filesystem.
#[derive(Clone, Default)]
pub struct MockAssetStore {
    /// When true, `store` and `delete` return a simulated failure.
    pub should_fail: bool,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Number of assets currently held.
    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn simulated_failure() -> StorageError {
        StorageError::Io(std::io::Error::other("Mock Storage Error: Simulation requested"))
    }
}

#[async_trait]
impl AssetStore for MockAssetStore {
    async fn store(
        &self,
        bytes: &[u8],
        category: &str,
        original_filename: &str,
    ) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(Self::simulated_failure());
        }
        let category = valid_category(category)?;
        let mut files = self
            .files
            .lock()
            .map_err(|_| StorageError::Io(std::io::Error::other("mock store poisoned")))?;
        let relative_path = loop {
            let candidate = format!("{category}/{}", generate_file_name(category, original_filename));
            if !files.contains_key(&candidate) {
                break candidate;
            }
        };
        files.insert(relative_path.clone(), bytes.to_vec());
        Ok(relative_path)
    }

    async fn delete(&self, relative_path: &str) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(Self::simulated_failure());
        }
        let mut files = self
            .files
            .lock()
            .map_err(|_| StorageError::Io(std::io::Error::other("mock store poisoned")))?;
        files
            .remove(&sanitize_key(relative_path))
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(relative_path.to_string()))
    }

    async fn exists(&self, relative_path: &str) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(&sanitize_key(relative_path)))
            .unwrap_or(false)
    }
}
