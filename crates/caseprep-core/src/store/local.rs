//! Case store backed by a local libSQL file

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::CaseStore;
use crate::db::{CaseRepository, Database, LibSqlCaseRepository};
use crate::models::{Case, CaseId, FieldUpdate};
use crate::{Error, Result};

/// Thread-safe case store over a local database.
#[derive(Clone)]
pub struct LocalCaseStore {
    db: Arc<Mutex<Database>>,
}

impl LocalCaseStore {
    /// Open (or create) the database at `db_path`.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::debug!("Opening local case store at {}", db_path.display());
        let db = Database::open(&db_path).await?;
        Ok(Self::from_database(db))
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::from_database(db))
    }

    fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }
}

#[async_trait]
impl CaseStore for LocalCaseStore {
    async fn fetch(&self, id: &CaseId) -> Result<Option<Case>> {
        let db = self.db.lock().await;
        let repo = LibSqlCaseRepository::new(db.connection());
        repo.get(id).await
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Case>> {
        let db = self.db.lock().await;
        let repo = LibSqlCaseRepository::new(db.connection());
        repo.list_by_owner(owner).await
    }

    async fn create(&self, owner: &str) -> Result<Case> {
        let case = Case::new(owner);
        let db = self.db.lock().await;
        let repo = LibSqlCaseRepository::new(db.connection());
        repo.insert(&case).await?;
        // Read back so callers see the stored precision of created_at.
        repo.get(&case.id)
            .await?
            .ok_or_else(|| Error::NotFound(case.id.to_string()))
    }

    async fn update_field(&self, id: &CaseId, update: &FieldUpdate) -> Result<()> {
        let db = self.db.lock().await;
        let repo = LibSqlCaseRepository::new(db.connection());
        repo.update_field(id, update).await
    }
}
