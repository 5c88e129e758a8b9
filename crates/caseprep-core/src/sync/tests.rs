use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::Semaphore;

use super::*;
use crate::error::Error;
use crate::models::{Contention, Definition, FieldUpdate, Round, Side};
use crate::store::LocalCaseStore;

/// Store that records every write and can be told to fail or hold them
#[derive(Default)]
struct RecordingStore {
    updates: Mutex<Vec<FieldUpdate>>,
    failing: Mutex<HashSet<CaseField>>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingStore {
    fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    fn fail(&self, field: CaseField) {
        self.failing.lock().unwrap().insert(field);
    }

    fn recover(&self, field: CaseField) {
        self.failing.lock().unwrap().remove(&field);
    }

    fn updates(&self) -> Vec<FieldUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaseStore for RecordingStore {
    async fn fetch(&self, _id: &CaseId) -> Result<Option<Case>> {
        Ok(None)
    }

    async fn list_by_owner(&self, _owner: &str) -> Result<Vec<Case>> {
        Ok(Vec::new())
    }

    async fn create(&self, owner: &str) -> Result<Case> {
        Ok(Case::new(owner))
    }

    async fn update_field(&self, _id: &CaseId, update: &FieldUpdate) -> Result<()> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.updates.lock().unwrap().push(update.clone());
        if self.failing.lock().unwrap().contains(&update.field()) {
            return Err(Error::Remote("service unavailable (503)".to_string()));
        }
        Ok(())
    }
}

/// Local store whose write of a one-entry opp contention list is slow
struct SlowContentionStore {
    inner: LocalCaseStore,
}

#[async_trait]
impl CaseStore for SlowContentionStore {
    async fn fetch(&self, id: &CaseId) -> Result<Option<Case>> {
        self.inner.fetch(id).await
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Case>> {
        self.inner.list_by_owner(owner).await
    }

    async fn create(&self, owner: &str) -> Result<Case> {
        self.inner.create(owner).await
    }

    async fn update_field(&self, id: &CaseId, update: &FieldUpdate) -> Result<()> {
        if matches!(update, FieldUpdate::Contentions(value) if value.opp.len() == 1) {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        self.inner.update_field(id, update).await
    }
}

fn opp_contention_counts(updates: Vec<FieldUpdate>) -> Vec<usize> {
    updates
        .into_iter()
        .map(|update| match update {
            FieldUpdate::Contentions(value) => value.opp.len(),
            other => panic!("unexpected update {other:?}"),
        })
        .collect()
}

fn synchronizer(case: Case) -> (Synchronizer, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::default());
    (Synchronizer::new(case, store.clone()), store)
}

fn with_rounds(count: u32) -> Case {
    let mut case = Case::new("owner");
    for number in 1..=count {
        let mut round = Round::new(number);
        round.notes = format!("round {number}");
        case.rounds.push(round);
    }
    case
}

#[tokio::test]
async fn leaf_edits_do_not_write_until_blur() {
    let (mut sync, store) = synchronizer(Case::new("owner"));

    sync.set_field(Edit::Resolved("This house".to_string())).unwrap();
    sync.set_field(Edit::Resolved("This house would".to_string()))
        .unwrap();
    assert!(sync.settle().await.is_empty());
    assert!(store.updates().is_empty());
    assert_eq!(sync.state(CaseField::Resolved), FieldState::Dirty);

    assert!(!sync.blur(CaseField::Framework));
    assert!(sync.blur(CaseField::Resolved));
    assert!(sync.settle().await.is_empty());

    assert_eq!(
        store.updates(),
        vec![FieldUpdate::Resolved("This house would".to_string())]
    );
    assert_eq!(sync.state(CaseField::Resolved), FieldState::Clean);
}

#[tokio::test]
async fn blur_on_clean_field_does_nothing() {
    let (mut sync, store) = synchronizer(Case::new("owner"));
    assert!(!sync.blur(CaseField::Resolved));
    sync.settle().await;
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn definition_scenario_flushes_whole_structure() {
    let (mut sync, store) = synchronizer(Case::new("owner"));
    let panel = Panel::for_case(Side::Gov);

    sync.apply(panel.add_definition()).unwrap();
    sync.set_field(panel.edit_definition(0, DefinitionPart::Term, "Justice"))
        .unwrap();
    sync.set_field(panel.edit_definition(0, DefinitionPart::Value, "Fairness"))
        .unwrap();
    sync.blur(CaseField::Definitions);
    assert!(sync.settle().await.is_empty());

    let updates = store.updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(
        serde_json::to_value(&updates[1]).unwrap(),
        json!({"definitions": {"gov": [["Justice", "Fairness"]], "opp": []}})
    );
    assert_eq!(sync.state(CaseField::Definitions), FieldState::Clean);
}

#[tokio::test]
async fn append_then_remove_flushes_each_instant() {
    let mut case = Case::new("owner");
    case.contentions.opp = vec![Contention::new("c", "w", "i")];
    let before = case.contentions.clone();
    let (mut sync, store) = synchronizer(case);
    let scope = Scope::Case(Side::Opp);

    sync.apply(Structural::AppendContention(scope)).unwrap();
    sync.apply(Structural::RemoveContention { scope, index: 1 })
        .unwrap();
    assert_eq!(sync.in_flight(), 2);
    assert!(sync.settle().await.is_empty());

    assert_eq!(sync.draft().contentions(), &before);
    assert_eq!(opp_contention_counts(store.updates()), vec![2, 1]);
    assert_eq!(sync.state(CaseField::Contentions), FieldState::Clean);
}

#[tokio::test]
async fn second_write_of_a_field_waits_for_the_first() {
    let gate = Arc::new(Semaphore::new(0));
    let store = Arc::new(RecordingStore::gated(gate.clone()));
    let mut sync = Synchronizer::new(Case::new("owner"), store.clone());
    let scope = Scope::Case(Side::Opp);

    sync.apply(Structural::AppendContention(scope)).unwrap();
    sync.apply(Structural::RemoveContention { scope, index: 0 })
        .unwrap();

    gate.add_permits(1);
    let pending = tokio::time::timeout(Duration::from_millis(50), sync.settle()).await;
    assert!(pending.is_err());
    assert_eq!(opp_contention_counts(store.updates()), vec![1]);
    assert_eq!(sync.in_flight(), 1);
    assert_eq!(sync.state(CaseField::Contentions), FieldState::Dirty);

    gate.add_permits(1);
    assert!(sync.settle().await.is_empty());
    assert_eq!(opp_contention_counts(store.updates()), vec![1, 0]);
    assert_eq!(sync.state(CaseField::Contentions), FieldState::Clean);
}

#[tokio::test]
async fn queued_flush_keeps_only_latest_value() {
    let gate = Arc::new(Semaphore::new(0));
    let store = Arc::new(RecordingStore::gated(gate.clone()));
    let mut sync = Synchronizer::new(Case::new("owner"), store.clone());

    for text in ["a", "ab", "abc"] {
        sync.set_field(Edit::Resolved(text.to_string())).unwrap();
        sync.blur(CaseField::Resolved);
    }
    assert_eq!(sync.in_flight(), 2);

    gate.add_permits(2);
    assert!(sync.settle().await.is_empty());
    assert_eq!(
        store.updates(),
        vec![
            FieldUpdate::Resolved("a".to_string()),
            FieldUpdate::Resolved("abc".to_string()),
        ]
    );
    assert_eq!(sync.state(CaseField::Resolved), FieldState::Clean);
}

#[tokio::test]
async fn slow_earlier_write_does_not_overwrite_later_one() {
    let inner = LocalCaseStore::open_in_memory().await.unwrap();
    let case = inner.create("owner").await.unwrap();
    let store = Arc::new(SlowContentionStore { inner });
    let mut sync = Synchronizer::new(case, store.clone());
    let scope = Scope::Case(Side::Opp);

    sync.apply(Structural::AppendContention(scope)).unwrap();
    sync.apply(Structural::RemoveContention { scope, index: 0 })
        .unwrap();
    assert!(sync.settle().await.is_empty());

    let stored = store.fetch(&sync.id()).await.unwrap().unwrap();
    assert!(sync.draft().contentions().opp.is_empty());
    assert_eq!(&stored.contentions, sync.draft().contentions());
    assert_eq!(sync.state(CaseField::Contentions), FieldState::Clean);
}

#[tokio::test]
async fn toggling_side_never_touches_data() {
    let mut case = Case::new("owner");
    case.definitions.gov = vec![Definition::new("a", "b")];
    case.framework.opp = "Rawls".to_string();
    let (sync, store) = synchronizer(case);
    let before = sync.draft().clone();

    let mut panel = Panel::for_case(Side::Gov);
    assert_eq!(panel.definitions(sync.draft()).unwrap().len(), 1);
    panel.toggle().unwrap();
    assert!(panel.definitions(sync.draft()).unwrap().is_empty());
    assert_eq!(panel.framework(sync.draft()).unwrap(), "Rawls");
    panel.toggle().unwrap();
    assert_eq!(
        panel.definitions(sync.draft()).unwrap(),
        &[Definition::new("a", "b")]
    );

    for field in CaseField::ALL {
        assert!(sync.draft().shares_field(&before, field));
    }
    assert!(sync.dirty_fields().is_empty());
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn failed_flush_keeps_local_value_and_later_edits_work() {
    let (mut sync, store) = synchronizer(Case::new("owner"));
    store.fail(CaseField::Framework);

    sync.set_field(Edit::Framework {
        scope: Scope::Case(Side::Gov),
        text: "Utilitarianism".to_string(),
    })
    .unwrap();
    sync.blur(CaseField::Framework);
    let notices = sync.settle().await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Error updating framework.");
    assert_eq!(sync.draft().framework().gov, "Utilitarianism");
    assert_eq!(sync.state(CaseField::Framework), FieldState::Dirty);

    sync.set_field(Edit::Resolved("Still editable".to_string()))
        .unwrap();
    sync.blur(CaseField::Resolved);
    assert!(sync.settle().await.is_empty());
    assert_eq!(sync.state(CaseField::Resolved), FieldState::Clean);

    store.recover(CaseField::Framework);
    sync.blur(CaseField::Framework);
    assert!(sync.settle().await.is_empty());
    assert_eq!(sync.state(CaseField::Framework), FieldState::Clean);
}

#[tokio::test]
async fn failed_structural_flush_reports_case_notice() {
    let (mut sync, store) = synchronizer(Case::new("owner"));
    store.fail(CaseField::Rounds);

    sync.apply(Structural::AppendRound).unwrap();
    let notices = sync.settle().await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Error updating case.");
    assert_eq!(notices[0].duration.as_millis(), 3000);
    assert_eq!(sync.draft().rounds().len(), 1);
}

#[tokio::test]
async fn edit_during_flight_keeps_field_dirty() {
    let gate = Arc::new(Semaphore::new(0));
    let store = Arc::new(RecordingStore::gated(gate.clone()));
    let mut sync = Synchronizer::new(Case::new("owner"), store.clone());

    sync.set_field(Edit::Resolved("first".to_string())).unwrap();
    sync.blur(CaseField::Resolved);
    sync.set_field(Edit::Resolved("second".to_string())).unwrap();
    assert_eq!(sync.in_flight(), 1);

    gate.add_permits(1);
    assert!(sync.settle().await.is_empty());
    assert_eq!(
        store.updates(),
        vec![FieldUpdate::Resolved("first".to_string())]
    );
    assert_eq!(sync.state(CaseField::Resolved), FieldState::Dirty);

    gate.add_permits(1);
    sync.blur(CaseField::Resolved);
    assert!(sync.settle().await.is_empty());
    assert_eq!(
        store.updates().last(),
        Some(&FieldUpdate::Resolved("second".to_string()))
    );
    assert_eq!(sync.state(CaseField::Resolved), FieldState::Clean);
}

#[tokio::test]
async fn removing_first_round_shifts_the_rest() {
    let (mut sync, store) = synchronizer(with_rounds(2));

    sync.apply(Structural::RemoveRound(0)).unwrap();
    sync.settle().await;

    assert_eq!(sync.draft().rounds().len(), 1);
    assert_eq!(sync.draft().rounds()[0].notes, "round 2");
    match store.updates().as_slice() {
        [FieldUpdate::Rounds(rounds)] => {
            assert_eq!(rounds.len(), 1);
            assert_eq!(rounds[0].notes, "round 2");
        }
        other => panic!("unexpected updates {other:?}"),
    }
}

#[tokio::test]
async fn round_side_change_flushes_rounds() {
    let (mut sync, store) = synchronizer(with_rounds(1));

    sync.apply(Structural::SetRoundSide {
        round: 0,
        side: Side::Opp,
    })
    .unwrap();
    sync.settle().await;

    match store.updates().as_slice() {
        [FieldUpdate::Rounds(rounds)] => assert_eq!(rounds[0].side, Side::Opp),
        other => panic!("unexpected updates {other:?}"),
    }
}

#[tokio::test]
async fn round_notes_wait_for_blur() {
    let (mut sync, store) = synchronizer(with_rounds(1));

    sync.set_field(Edit::RoundNotes {
        round: 0,
        text: "they dropped C2".to_string(),
    })
    .unwrap();
    sync.settle().await;
    assert!(store.updates().is_empty());

    sync.blur(CaseField::Rounds);
    sync.settle().await;
    assert_eq!(store.updates().len(), 1);
}

#[tokio::test]
async fn rejected_operation_issues_no_write() {
    let (mut sync, store) = synchronizer(Case::new("owner"));

    let err = sync
        .apply(Structural::RemoveDefinition {
            scope: Scope::Case(Side::Gov),
            index: 0,
        })
        .unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { .. }));
    assert!(sync
        .set_field(Edit::RoundNotes {
            round: 2,
            text: String::new()
        })
        .is_err());

    assert_eq!(sync.in_flight(), 0);
    assert!(sync.dirty_fields().is_empty());
    sync.settle().await;
    assert!(store.updates().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn edits_persist_through_local_store() {
    let store = Arc::new(LocalCaseStore::open_in_memory().await.unwrap());
    let case = store.create("owner").await.unwrap();
    let mut sync = Synchronizer::new(case, store.clone());

    sync.apply(Structural::AppendRound).unwrap();
    let panel = Panel::for_round(sync.draft(), 0).unwrap();
    sync.apply(panel.add_contention()).unwrap();
    sync.set_field(panel.edit_contention(0, ContentionPart::Warrant, "because"))
        .unwrap();
    sync.set_field(Edit::Resolved("THW ban zoos".to_string()))
        .unwrap();
    sync.blur(CaseField::Rounds);
    sync.blur(CaseField::Resolved);
    assert!(sync.settle().await.is_empty());

    let stored = store.fetch(&sync.id()).await.unwrap().unwrap();
    assert_eq!(stored, sync.case());
    assert_eq!(stored.rounds[0].opponent_contentions[0].warrant, "because");
}
