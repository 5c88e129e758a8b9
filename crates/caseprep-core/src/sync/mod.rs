//! Keeps a local working copy of one case in step with a [`CaseStore`].
//!
//! Two write tiers:
//! - leaf edits ([`Edit`]) change the local copy only; [`Synchronizer::blur`]
//!   writes the field if it is dirty
//! - list operations ([`Structural`]) change the local copy and write the
//!   field straight away
//!
//! Every write replaces one whole top-level field. Writes run on spawned
//! tasks and report back over a channel; call [`Synchronizer::process_outcomes`]
//! or [`Synchronizer::settle`] to apply them. A failed write produces a
//! [`Notice`] and leaves the local copy as it is.
//!
//! Each field has at most one write in flight. A flush issued meanwhile is
//! queued, replacing any older queued snapshot of that field, and goes out
//! once the running write has reported back. The store therefore sees a
//! field's writes in the order they were issued.

mod draft;
mod edit;
mod selector;
mod state;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::models::{Case, CaseField, CaseId};
use crate::notice::Notice;
use crate::store::CaseStore;

pub use draft::{Draft, Snapshot};
pub use edit::{ContentionPart, DefinitionPart, Edit, Scope, Structural};
pub use selector::{Panel, SideSelector, SlideDirection};
pub use state::{FieldState, FieldTracker};

#[derive(Debug)]
struct QueuedFlush {
    generation: u64,
    snapshot: Snapshot,
}

#[derive(Debug)]
struct FlushOutcome {
    field: CaseField,
    generation: u64,
    result: std::result::Result<(), String>,
}

pub struct Synchronizer {
    store: Arc<dyn CaseStore>,
    draft: Draft,
    fields: FieldTracker,
    outcome_tx: mpsc::UnboundedSender<FlushOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<FlushOutcome>,
    writing: HashSet<CaseField>,
    queued: HashMap<CaseField, QueuedFlush>,
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Synchronizer")
            .field("case", &self.draft.id())
            .field("dirty", &self.fields.dirty_fields())
            .field("writing", &self.writing)
            .field("queued", &self.queued.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Synchronizer {
    pub fn new(case: Case, store: Arc<dyn CaseStore>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            store,
            draft: Draft::from(case),
            fields: FieldTracker::default(),
            outcome_tx,
            outcome_rx,
            writing: HashSet::new(),
            queued: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> CaseId {
        self.draft.id()
    }

    #[must_use]
    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    #[must_use]
    pub fn case(&self) -> Case {
        self.draft.to_case()
    }

    #[must_use]
    pub const fn state(&self, field: CaseField) -> FieldState {
        self.fields.state(field)
    }

    #[must_use]
    pub fn dirty_fields(&self) -> Vec<CaseField> {
        self.fields.dirty_fields()
    }

    /// Writes issued whose outcome has not been applied yet, queued ones included
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.writing.len() + self.queued.len()
    }

    /// Apply a leaf edit locally
    pub fn set_field(&mut self, edit: Edit) -> Result<()> {
        let field = edit.field();
        self.draft.apply_edit(edit)?;
        self.fields.mark_dirty(field);
        Ok(())
    }

    /// Apply a list operation locally and write its field
    pub fn apply(&mut self, op: Structural) -> Result<()> {
        let field = op.field();
        self.draft.apply_structural(op)?;
        self.fields.mark_dirty(field);
        self.flush(field);
        Ok(())
    }

    /// Editing of `field` ended; writes it if it has unsaved edits.
    ///
    /// Returns whether a write was issued.
    pub fn blur(&mut self, field: CaseField) -> bool {
        if !self.fields.is_dirty(field) {
            return false;
        }
        self.flush(field);
        true
    }

    /// Write the current local value of `field`.
    ///
    /// Queued instead when a write of the same field is still running.
    /// Must be called from within a Tokio runtime.
    pub fn flush(&mut self, field: CaseField) {
        let generation = self.fields.generation(field);
        let snapshot = self.draft.snapshot(field);

        if self.writing.contains(&field) {
            tracing::debug!(case = %self.draft.id(), %field, generation, "Queueing flush behind running write");
            self.queued.insert(field, QueuedFlush { generation, snapshot });
            return;
        }
        self.dispatch(field, QueuedFlush { generation, snapshot });
    }

    fn dispatch(&mut self, field: CaseField, flush: QueuedFlush) {
        let id = self.draft.id();
        let QueuedFlush {
            generation,
            snapshot,
        } = flush;
        let store = Arc::clone(&self.store);
        let outcome_tx = self.outcome_tx.clone();

        tracing::debug!(case = %id, %field, generation, "Flushing field");
        self.writing.insert(field);

        tokio::spawn(async move {
            let update = snapshot.into_update();
            let result = store
                .update_field(&id, &update)
                .await
                .map_err(|error| error.to_string());
            // The receiver is gone once the synchronizer is dropped.
            outcome_tx
                .send(FlushOutcome {
                    field,
                    generation,
                    result,
                })
                .ok();
        });
    }

    /// Apply every outcome that has already arrived
    pub fn process_outcomes(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            notices.extend(self.record(outcome));
        }
        notices
    }

    /// Wait for every issued write to report back
    pub async fn settle(&mut self) -> Vec<Notice> {
        let mut notices = self.process_outcomes();
        while self.in_flight() > 0 {
            let Some(outcome) = self.outcome_rx.recv().await else {
                break;
            };
            notices.extend(self.record(outcome));
        }
        notices
    }

    fn record(&mut self, outcome: FlushOutcome) -> Option<Notice> {
        let FlushOutcome {
            field,
            generation,
            result,
        } = outcome;
        self.writing.remove(&field);

        let notice = match result {
            Ok(()) => {
                let clean = self.fields.confirm(field, generation);
                tracing::debug!(case = %self.draft.id(), %field, generation, clean, "Flush confirmed");
                None
            }
            Err(error) => {
                tracing::warn!(case = %self.draft.id(), %field, generation, "Flush failed: {error}");
                Some(Notice::flush_failed(field, error))
            }
        };

        if let Some(next) = self.queued.remove(&field) {
            self.dispatch(field, next);
        }
        notice
    }
}
