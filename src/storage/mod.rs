//! The project store: persisted `ProjectRecord`s behind a small async trait.
//!
//! The core only ever reads two fields out of a record: `directory_json`
//! (parsed into a tree) and `image` (run through the normalizer); everything
//! else is carried for display. The default implementation keeps all records
//! in one JSON document on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::core::ImagePayload;

/// Errors surfaced by the store. None of them are fatal to the process;
/// the app layer renders them as an inert error state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error accessing project store: {0}")]
    Io(#[from] std::io::Error),

    #[error("project store file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("no project with slug '{0}'")]
    NotFound(String),
}

/// A persisted portfolio project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: u64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: ImagePayload,
    pub link: String,
    pub slug: String,
    /// Serialized `FileNode` tree shown in the embedded explorer.
    pub directory_json: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the add-project form; id, slug and timestamp are
/// filled in by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: ImagePayload,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub directory_json: String,
}

/// Async CRUD surface of the storage collaborator.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list(&self) -> Result<Vec<ProjectRecord>, StorageError>;
    async fn get_by_slug(&self, slug: &str) -> Result<ProjectRecord, StorageError>;
    async fn insert(&self, project: NewProject) -> Result<ProjectRecord, StorageError>;
    async fn update(&self, id: u64, project: NewProject) -> Result<ProjectRecord, StorageError>;
    async fn delete(&self, id: u64) -> Result<(), StorageError>;
}

/// Derives a URL slug from a title: lowercase, alphanumerics kept,
/// whitespace runs become single hyphens.
pub fn slug_from_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    slug.trim_matches('-').to_string()
}

/// The project shown on first run, before anything was added. Its tree is
/// a minimal React app so the explorer has something browsable.
pub fn sample_project() -> NewProject {
    NewProject {
        title: "My React App".to_string(),
        description: "A sample project to explore. Add your own via the project form."
            .to_string(),
        image: ImagePayload::Text(String::new()),
        link: String::new(),
        slug: None,
        directory_json: include_str!("sample_tree.json").to_string(),
    }
}

/// A `ProjectStore` backed by a single JSON file.
///
/// Writes rewrite the whole document; fine for a personal portfolio's worth
/// of records. The in-memory copy is guarded by a tokio mutex so concurrent
/// commands serialize their read-modify-write cycles.
#[derive(Debug)]
pub struct JsonProjectStore {
    path: PathBuf,
    records: Mutex<Vec<ProjectRecord>>,
}

impl JsonProjectStore {
    /// Opens (or initializes) the store at `path`.
    pub async fn open(path: PathBuf) -> Result<Self, StorageError> {
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No project store at {:?}, starting empty", path);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    async fn persist(&self, records: &[ProjectRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for JsonProjectStore {
    async fn list(&self) -> Result<Vec<ProjectRecord>, StorageError> {
        Ok(self.records.lock().await.clone())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<ProjectRecord, StorageError> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.slug == slug)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(slug.to_string()))
    }

    async fn insert(&self, project: NewProject) -> Result<ProjectRecord, StorageError> {
        let mut records = self.records.lock().await;
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let slug = project
            .slug
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slug_from_title(&project.title));
        let record = ProjectRecord {
            id,
            title: project.title,
            description: project.description,
            image: project.image,
            link: project.link,
            slug,
            directory_json: project.directory_json,
            created_at: Utc::now(),
        };
        records.push(record.clone());
        self.persist(&records).await?;
        tracing::info!("Inserted project '{}' (id {})", record.title, record.id);
        Ok(record)
    }

    async fn update(&self, id: u64, project: NewProject) -> Result<ProjectRecord, StorageError> {
        let mut records = self.records.lock().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("id {id}")))?;
        record.title = project.title;
        record.description = project.description;
        record.image = project.image;
        record.link = project.link;
        if let Some(slug) = project.slug.filter(|s| !s.trim().is_empty()) {
            record.slug = slug;
        }
        record.directory_json = project.directory_json;
        let updated = record.clone();
        self.persist(&records).await?;
        Ok(updated)
    }

    async fn delete(&self, id: u64) -> Result<(), StorageError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Err(StorageError::NotFound(format!("id {id}")));
        }
        self.persist(&records).await?;
        tracing::info!("Deleted project id {}", id);
        Ok(())
    }
}
