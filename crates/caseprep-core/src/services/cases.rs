//! Session-gated case operations shared by every front end.

use std::sync::Arc;

use crate::auth::Identity;
use crate::models::{Case, CaseId};
use crate::store::CaseStore;
use crate::sync::Synchronizer;
use crate::{Error, Result};

/// Entry points for listing, creating and opening cases.
#[derive(Clone)]
pub struct CaseService {
    store: Arc<dyn CaseStore>,
}

impl CaseService {
    pub fn new(store: Arc<dyn CaseStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn CaseStore> {
        Arc::clone(&self.store)
    }

    /// Every case owned by `identity`, newest first
    pub async fn list_cases(&self, identity: &Identity) -> Result<Vec<Case>> {
        self.store
            .list_by_owner(&identity.user_id)
            .await
            .inspect_err(|error| tracing::error!("Failed to fetch cases: {error}"))
    }

    /// Insert a placeholder case owned by `identity`
    pub async fn create_case(&self, identity: &Identity) -> Result<Case> {
        let case = self
            .store
            .create(&identity.user_id)
            .await
            .inspect_err(|error| tracing::error!("Failed to create case: {error}"))?;
        tracing::info!(case = %case.id, "Created case");
        Ok(case)
    }

    /// Load a case and start synchronizing it
    pub async fn open_case(&self, id: &CaseId) -> Result<Synchronizer> {
        let case = self
            .store
            .fetch(id)
            .await
            .inspect_err(|error| tracing::error!(case = %id, "Failed to fetch case: {error}"))?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(Synchronizer::new(case, self.store()))
    }
}
