//! Per-field persistence state.

use crate::models::CaseField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Local value matches the last successful write
    Clean,
    /// Local edits not yet confirmed by the store
    Dirty,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: FieldState,
    generation: u64,
}

/// Tracks which fields hold unpersisted edits.
///
/// Every local change bumps the field's generation. A flush carries the
/// generation it was taken at, so a confirmation only cleans the field when
/// nothing changed while the write was in flight.
#[derive(Debug, Clone)]
pub struct FieldTracker {
    entries: [Entry; 5],
}

impl Default for FieldTracker {
    fn default() -> Self {
        Self {
            entries: [Entry {
                state: FieldState::Clean,
                generation: 0,
            }; 5],
        }
    }
}

impl FieldTracker {
    const fn slot(field: CaseField) -> usize {
        match field {
            CaseField::Resolved => 0,
            CaseField::Definitions => 1,
            CaseField::Contentions => 2,
            CaseField::Framework => 3,
            CaseField::Rounds => 4,
        }
    }

    #[must_use]
    pub const fn state(&self, field: CaseField) -> FieldState {
        self.entries[Self::slot(field)].state
    }

    #[must_use]
    pub const fn generation(&self, field: CaseField) -> u64 {
        self.entries[Self::slot(field)].generation
    }

    #[must_use]
    pub const fn is_dirty(&self, field: CaseField) -> bool {
        matches!(self.state(field), FieldState::Dirty)
    }

    /// Record a local change; returns the new generation
    pub fn mark_dirty(&mut self, field: CaseField) -> u64 {
        let entry = &mut self.entries[Self::slot(field)];
        entry.generation += 1;
        entry.state = FieldState::Dirty;
        entry.generation
    }

    /// Record a confirmed write of `generation`; returns whether the field is now clean
    pub fn confirm(&mut self, field: CaseField, generation: u64) -> bool {
        let entry = &mut self.entries[Self::slot(field)];
        if entry.generation == generation {
            entry.state = FieldState::Clean;
            true
        } else {
            false
        }
    }

    /// Fields with unpersisted edits, in column order
    #[must_use]
    pub fn dirty_fields(&self) -> Vec<CaseField> {
        CaseField::ALL
            .into_iter()
            .filter(|field| self.is_dirty(*field))
            .collect()
    }
}
