//! Persistence clients for cases.
//!
//! Every write goes through [`CaseStore::update_field`], which replaces one
//! top-level column of one row. There is no nested patching and no version
//! check: the last write to a column wins.

mod local;
mod postgrest;

use async_trait::async_trait;

use crate::models::{Case, CaseId, FieldUpdate};
use crate::Result;

pub use local::LocalCaseStore;
pub use postgrest::SupabaseCaseStore;

/// Row-level access to the `cases` table
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Fetch one case by id
    async fn fetch(&self, id: &CaseId) -> Result<Option<Case>>;

    /// All cases owned by `owner`, newest first
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Case>>;

    /// Insert a placeholder case owned by `owner`
    async fn create(&self, owner: &str) -> Result<Case>;

    /// Replace one top-level field of the case `id`
    async fn update_field(&self, id: &CaseId, update: &FieldUpdate) -> Result<()>;
}
