//! Local working copy of one case.
//!
//! Each top-level field sits behind its own `Arc`. Changing a field clones
//! only that field (and only when someone else still holds it), so untouched
//! fields keep their allocation and in-flight flush snapshots are never
//! disturbed by later edits.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::edit::{ContentionPart, DefinitionPart, Edit, Scope, Structural};
use crate::error::{Error, Result};
use crate::models::{Case, CaseField, CaseId, Contention, Definition, FieldUpdate, Round, Sided};

#[derive(Debug, Clone)]
pub struct Draft {
    id: CaseId,
    created_at: DateTime<Utc>,
    user_id: String,
    resolved: Arc<String>,
    definitions: Arc<Sided<Vec<Definition>>>,
    contentions: Arc<Sided<Vec<Contention>>>,
    framework: Arc<Sided<String>>,
    rounds: Arc<Vec<Round>>,
}

/// Shared handle on one field's value at a point in time
#[derive(Debug, Clone)]
pub enum Snapshot {
    Resolved(Arc<String>),
    Definitions(Arc<Sided<Vec<Definition>>>),
    Contentions(Arc<Sided<Vec<Contention>>>),
    Framework(Arc<Sided<String>>),
    Rounds(Arc<Vec<Round>>),
}

impl Snapshot {
    /// Owned update; clones only if the draft still shares the value
    #[must_use]
    pub fn into_update(self) -> FieldUpdate {
        match self {
            Self::Resolved(value) => FieldUpdate::Resolved(Arc::unwrap_or_clone(value)),
            Self::Definitions(value) => FieldUpdate::Definitions(Arc::unwrap_or_clone(value)),
            Self::Contentions(value) => FieldUpdate::Contentions(Arc::unwrap_or_clone(value)),
            Self::Framework(value) => FieldUpdate::Framework(Arc::unwrap_or_clone(value)),
            Self::Rounds(value) => FieldUpdate::Rounds(Arc::unwrap_or_clone(value)),
        }
    }
}

impl From<Case> for Draft {
    fn from(case: Case) -> Self {
        Self {
            id: case.id,
            created_at: case.created_at,
            user_id: case.user_id,
            resolved: Arc::new(case.resolved),
            definitions: Arc::new(case.definitions),
            contentions: Arc::new(case.contentions),
            framework: Arc::new(case.framework),
            rounds: Arc::new(case.rounds),
        }
    }
}

impl Draft {
    #[must_use]
    pub const fn id(&self) -> CaseId {
        self.id
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn resolved(&self) -> &str {
        &self.resolved
    }

    #[must_use]
    pub fn definitions(&self) -> &Sided<Vec<Definition>> {
        &self.definitions
    }

    #[must_use]
    pub fn contentions(&self) -> &Sided<Vec<Contention>> {
        &self.contentions
    }

    #[must_use]
    pub fn framework(&self) -> &Sided<String> {
        &self.framework
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Plain copy of the whole document
    #[must_use]
    pub fn to_case(&self) -> Case {
        Case {
            id: self.id,
            created_at: self.created_at,
            user_id: self.user_id.clone(),
            resolved: self.resolved.as_ref().clone(),
            definitions: self.definitions.as_ref().clone(),
            contentions: self.contentions.as_ref().clone(),
            framework: self.framework.as_ref().clone(),
            rounds: self.rounds.as_ref().clone(),
        }
    }

    #[must_use]
    pub fn snapshot(&self, field: CaseField) -> Snapshot {
        match field {
            CaseField::Resolved => Snapshot::Resolved(Arc::clone(&self.resolved)),
            CaseField::Definitions => Snapshot::Definitions(Arc::clone(&self.definitions)),
            CaseField::Contentions => Snapshot::Contentions(Arc::clone(&self.contentions)),
            CaseField::Framework => Snapshot::Framework(Arc::clone(&self.framework)),
            CaseField::Rounds => Snapshot::Rounds(Arc::clone(&self.rounds)),
        }
    }

    /// Whether `field` is the same allocation in both drafts
    #[must_use]
    pub fn shares_field(&self, other: &Self, field: CaseField) -> bool {
        match field {
            CaseField::Resolved => Arc::ptr_eq(&self.resolved, &other.resolved),
            CaseField::Definitions => Arc::ptr_eq(&self.definitions, &other.definitions),
            CaseField::Contentions => Arc::ptr_eq(&self.contentions, &other.contentions),
            CaseField::Framework => Arc::ptr_eq(&self.framework, &other.framework),
            CaseField::Rounds => Arc::ptr_eq(&self.rounds, &other.rounds),
        }
    }

    /// Definitions visible in `scope`
    pub fn definitions_in(&self, scope: Scope) -> Result<&[Definition]> {
        match scope {
            Scope::Case(side) => Ok(self.definitions.get(side)),
            Scope::Round(index) => Ok(&self.round(index)?.opponent_definitions),
        }
    }

    /// Contentions visible in `scope`
    pub fn contentions_in(&self, scope: Scope) -> Result<&[Contention]> {
        match scope {
            Scope::Case(side) => Ok(self.contentions.get(side)),
            Scope::Round(index) => Ok(&self.round(index)?.opponent_contentions),
        }
    }

    /// Framework text visible in `scope`
    pub fn framework_in(&self, scope: Scope) -> Result<&str> {
        match scope {
            Scope::Case(side) => Ok(self.framework.get(side)),
            Scope::Round(index) => Ok(&self.round(index)?.opponent_framework),
        }
    }

    pub fn round(&self, index: usize) -> Result<&Round> {
        self.rounds.get(index).ok_or(Error::IndexOutOfRange {
            what: "rounds",
            index,
            len: self.rounds.len(),
        })
    }

    /// Apply a leaf edit. Bounds are checked before anything is copied.
    pub fn apply_edit(&mut self, edit: Edit) -> Result<()> {
        match edit {
            Edit::Resolved(text) => {
                *Arc::make_mut(&mut self.resolved) = text;
            }
            Edit::Framework { scope, text } => {
                *self.framework_mut(scope)? = text;
            }
            Edit::Definition {
                scope,
                index,
                part,
                text,
            } => {
                check_index("definitions", index, self.definitions_in(scope)?.len())?;
                let definitions = self.definitions_mut(scope)?;
                let definition = entry_mut(definitions, "definitions", index)?;
                match part {
                    DefinitionPart::Term => definition.term = text,
                    DefinitionPart::Value => definition.value = text,
                }
            }
            Edit::Contention {
                scope,
                index,
                part,
                text,
            } => {
                check_index("contentions", index, self.contentions_in(scope)?.len())?;
                let contentions = self.contentions_mut(scope)?;
                let contention = entry_mut(contentions, "contentions", index)?;
                match part {
                    ContentionPart::Contention => contention.contention = text,
                    ContentionPart::Warrant => contention.warrant = text,
                    ContentionPart::Impact => contention.impact = text,
                }
            }
            Edit::RoundNotes { round, text } => {
                self.round_mut(round)?.notes = text;
            }
        }
        Ok(())
    }

    /// Apply a list operation. Bounds are checked before anything is copied.
    pub fn apply_structural(&mut self, op: Structural) -> Result<()> {
        match op {
            Structural::AppendDefinition(scope) => {
                self.definitions_mut(scope)?.push(Definition::default());
            }
            Structural::RemoveDefinition { scope, index } => {
                check_index("definitions", index, self.definitions_in(scope)?.len())?;
                self.definitions_mut(scope)?.remove(index);
            }
            Structural::AppendContention(scope) => {
                self.contentions_mut(scope)?.push(Contention::default());
            }
            Structural::RemoveContention { scope, index } => {
                check_index("contentions", index, self.contentions_in(scope)?.len())?;
                self.contentions_mut(scope)?.remove(index);
            }
            Structural::AppendRound => {
                let number = u32::try_from(self.rounds.len() + 1).map_err(|_| {
                    Error::InvalidInput("too many rounds".to_string())
                })?;
                Arc::make_mut(&mut self.rounds).push(Round::new(number));
            }
            Structural::RemoveRound(index) => {
                self.round(index)?;
                Arc::make_mut(&mut self.rounds).remove(index);
            }
            Structural::SetRoundSide { round, side } => {
                self.round_mut(round)?.side = side;
            }
        }
        Ok(())
    }

    fn round_mut(&mut self, index: usize) -> Result<&mut Round> {
        self.round(index)?;
        let len = self.rounds.len();
        Arc::make_mut(&mut self.rounds)
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange {
                what: "rounds",
                index,
                len,
            })
    }

    fn definitions_mut(&mut self, scope: Scope) -> Result<&mut Vec<Definition>> {
        match scope {
            Scope::Case(side) => Ok(Arc::make_mut(&mut self.definitions).get_mut(side)),
            Scope::Round(index) => Ok(&mut self.round_mut(index)?.opponent_definitions),
        }
    }

    fn contentions_mut(&mut self, scope: Scope) -> Result<&mut Vec<Contention>> {
        match scope {
            Scope::Case(side) => Ok(Arc::make_mut(&mut self.contentions).get_mut(side)),
            Scope::Round(index) => Ok(&mut self.round_mut(index)?.opponent_contentions),
        }
    }

    fn framework_mut(&mut self, scope: Scope) -> Result<&mut String> {
        match scope {
            Scope::Case(side) => Ok(Arc::make_mut(&mut self.framework).get_mut(side)),
            Scope::Round(index) => Ok(&mut self.round_mut(index)?.opponent_framework),
        }
    }
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { what, index, len })
    }
}

fn entry_mut<'a, T>(items: &'a mut [T], what: &'static str, index: usize) -> Result<&'a mut T> {
    let len = items.len();
    items
        .get_mut(index)
        .ok_or(Error::IndexOutOfRange { what, index, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Side;
    use pretty_assertions::assert_eq;

    fn sample() -> Draft {
        let mut case = Case::new("owner");
        case.definitions.gov = vec![Definition::new("Justice", "Fairness")];
        case.contentions.opp = vec![Contention::new("c", "w", "i")];
        case.rounds = vec![Round::new(1), Round::new(2)];
        Draft::from(case)
    }

    #[test]
    fn editing_one_field_keeps_siblings_shared() {
        let before = sample();
        let mut after = before.clone();
        after
            .apply_edit(Edit::Definition {
                scope: Scope::Case(Side::Gov),
                index: 0,
                part: DefinitionPart::Value,
                text: "Fair".to_string(),
            })
            .unwrap();

        assert!(!after.shares_field(&before, CaseField::Definitions));
        for field in [
            CaseField::Resolved,
            CaseField::Contentions,
            CaseField::Framework,
            CaseField::Rounds,
        ] {
            assert!(after.shares_field(&before, field), "{field} was copied");
        }
        assert_eq!(before.definitions().gov[0].value, "Fairness");
        assert_eq!(after.definitions().gov[0].value, "Fair");
    }

    #[test]
    fn out_of_range_edit_changes_nothing() {
        let before = sample();
        let mut after = before.clone();
        let err = after
            .apply_edit(Edit::Contention {
                scope: Scope::Case(Side::Opp),
                index: 3,
                part: ContentionPart::Impact,
                text: "x".to_string(),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            Error::IndexOutOfRange {
                what: "contentions",
                index: 3,
                len: 1
            }
        ));
        assert!(after.shares_field(&before, CaseField::Contentions));
    }

    #[test]
    fn round_scoped_edits_touch_only_rounds() {
        let before = sample();
        let mut after = before.clone();
        after
            .apply_structural(Structural::AppendDefinition(Scope::Round(1)))
            .unwrap();
        after
            .apply_edit(Edit::Framework {
                scope: Scope::Round(1),
                text: "Kant".to_string(),
            })
            .unwrap();

        assert_eq!(after.rounds()[1].opponent_definitions.len(), 1);
        assert_eq!(after.rounds()[1].opponent_framework, "Kant");
        assert!(after.shares_field(&before, CaseField::Definitions));
        assert!(after.shares_field(&before, CaseField::Framework));
        assert!(before.rounds()[1].opponent_definitions.is_empty());
    }

    #[test]
    fn append_round_numbers_from_length() {
        let mut draft = sample();
        draft.apply_structural(Structural::AppendRound).unwrap();
        let added = &draft.rounds()[2];
        assert_eq!(added.round, 3);
        assert_eq!(added.side, Side::Gov);
        assert!(added.opponent_contentions.is_empty());
        assert!(added.notes.is_empty());
    }

    #[test]
    fn remove_round_shifts_positions() {
        let mut draft = sample();
        draft.apply_structural(Structural::RemoveRound(0)).unwrap();
        assert_eq!(draft.rounds().len(), 1);
        assert_eq!(draft.rounds()[0].round, 2);
        assert!(draft.apply_structural(Structural::RemoveRound(5)).is_err());
    }

    #[test]
    fn snapshot_survives_later_edits() {
        let mut draft = sample();
        let snapshot = draft.snapshot(CaseField::Resolved);
        draft
            .apply_edit(Edit::Resolved("Changed".to_string()))
            .unwrap();

        assert_eq!(
            snapshot.into_update(),
            FieldUpdate::Resolved("Untitled Case".to_string())
        );
        assert_eq!(draft.resolved(), "Changed");
    }

    #[test]
    fn to_case_round_trips() {
        let draft = sample();
        let case = draft.to_case();
        assert_eq!(case.id, draft.id());
        assert_eq!(Draft::from(case.clone()).to_case(), case);
    }
}
