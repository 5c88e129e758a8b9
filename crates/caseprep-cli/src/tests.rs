use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use caseprep_core::models::{Contention, Definition, Round};
use caseprep_core::sync::{ContentionPart, DefinitionPart, Draft, Edit, Scope};
use caseprep_core::{Case, CaseField, Notice, Side};

use crate::cli::{ContentionArgs, PanelArgs, SideArg};
use crate::commands::common::{
    default_editor, edit_then_blur, finish, format_case_lines, format_notice,
    format_relative_time, match_case_prefix, normalize_case_identifier, normalize_content,
    open_case, open_local_backend, panel_for, position_to_index, render_case, text_preview,
    LOCAL_USER_ID,
};
use crate::commands::config::merge_profile;
use crate::commands::contention::contention_edits;
use crate::config_profiles::CliProfile;
use crate::error::CliError;

fn panel_args(side: SideArg, round: Option<usize>) -> PanelArgs {
    PanelArgs {
        id: "ignored".to_string(),
        side,
        round,
    }
}

fn case_with_id(id: &str) -> Case {
    let mut case = Case::new("owner");
    case.id = id.parse().unwrap();
    case
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_content_keeps_multiline_text() {
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
}

#[test]
fn text_preview_truncates_with_ellipsis() {
    let preview = text_preview("This house would abolish standardized testing", 20);
    assert_eq!(preview, "This house would ...");
    assert_eq!(text_preview("  short\nsecond line", 20), "short");
}

#[test]
fn normalize_case_identifier_rejects_empty() {
    assert!(matches!(
        normalize_case_identifier(" \n "),
        Err(CliError::EmptyCaseId)
    ));
    assert_eq!(normalize_case_identifier("  abc123  ").unwrap(), "abc123");
}

#[test]
fn positions_are_one_based() {
    assert_eq!(position_to_index(1).unwrap(), 0);
    assert!(matches!(position_to_index(0), Err(CliError::InvalidPosition)));
}

#[test]
fn match_case_prefix_resolves_unique_prefix() {
    let cases = vec![
        case_with_id("11111111-1111-7111-8111-111111111111"),
        case_with_id("22222222-2222-7222-8222-222222222222"),
    ];
    let id = match_case_prefix("2222", &cases).unwrap();
    assert_eq!(id, cases[1].id);
}

#[test]
fn match_case_prefix_rejects_ambiguous_and_missing() {
    let cases = vec![
        case_with_id("aaaaaaaa-aaaa-7aaa-8aaa-aaaaaaaaaaaa"),
        case_with_id("aaaaaaaa-aaaa-7aaa-8aaa-bbbbbbbbbbbb"),
    ];
    assert!(matches!(
        match_case_prefix("AAAAAAAA", &cases),
        Err(CliError::AmbiguousCaseId(_))
    ));
    assert!(matches!(
        match_case_prefix("ffff", &cases),
        Err(CliError::CaseNotFound(_))
    ));
}

#[test]
fn format_notice_includes_detail() {
    let notice = Notice::flush_failed(CaseField::Definitions, "HTTP 503");
    assert_eq!(format_notice(&notice), "Error updating case. (HTTP 503)");
    assert_eq!(format_notice(&Notice::signed_in()), "Signed in!");
}

#[test]
fn format_case_lines_show_round_count() {
    let mut case = Case::new("owner");
    case.rounds = vec![Round::new(1), Round::new(2)];
    let lines = format_case_lines(&[case, Case::new("owner")]);
    assert!(lines[0].contains("Untitled Case"));
    assert!(lines[0].ends_with("2 rounds"));
    assert!(lines[1].ends_with("just now"));
}

#[test]
fn render_case_limits_case_sides_but_shows_rounds() {
    let mut case = Case::new("owner");
    case.definitions.gov = vec![Definition::new("Justice", "Fairness")];
    case.contentions.opp = vec![Contention::new("Harms", "because", "lives")];
    let mut round = Round::new(1);
    round.side = Side::Opp;
    round.opponent_framework = "Rawls".to_string();
    round.notes = "they dropped C2".to_string();
    case.rounds.push(round);
    let draft = Draft::from(case);

    let gov_only = render_case(&draft, &[Side::Gov]).unwrap();
    assert!(gov_only.contains("1. Justice: Fairness"));
    assert!(!gov_only.contains("Harms"));
    assert!(gov_only.contains("== Round 1 (you: Opp) =="));
    assert!(gov_only.contains("Opponent Framework: Rawls"));
    assert!(gov_only.contains("  they dropped C2"));

    let both = render_case(&draft, &Side::ALL).unwrap();
    assert!(both.contains("warrant: because"));
}

#[test]
fn panel_for_picks_case_side_or_round() {
    let mut case = Case::new("owner");
    case.rounds.push(Round::new(1));
    let draft = Draft::from(case);

    let case_panel = panel_for(&panel_args(SideArg::Opp, None), &draft).unwrap();
    assert_eq!(case_panel.scope(), Scope::Case(Side::Opp));

    let round_panel = panel_for(&panel_args(SideArg::Gov, Some(1)), &draft).unwrap();
    assert_eq!(round_panel.scope(), Scope::Round(0));

    assert!(panel_for(&panel_args(SideArg::Gov, Some(2)), &draft).is_err());
}

#[test]
fn contention_edits_only_cover_given_parts() {
    let draft = Draft::from(Case::new("owner"));
    let panel = panel_for(&panel_args(SideArg::Gov, None), &draft).unwrap();
    let edits = contention_edits(
        &panel,
        0,
        ContentionArgs {
            contention: None,
            warrant: Some("because".to_string()),
            impact: Some("lives".to_string()),
        },
    );
    assert_eq!(
        edits,
        vec![
            Edit::Contention {
                scope: Scope::Case(Side::Gov),
                index: 0,
                part: ContentionPart::Warrant,
                text: "because".to_string(),
            },
            Edit::Contention {
                scope: Scope::Case(Side::Gov),
                index: 0,
                part: ContentionPart::Impact,
                text: "lives".to_string(),
            },
        ]
    );
}

#[test]
fn merge_profile_prefers_explicit_then_env_then_existing() {
    let existing = CliProfile {
        supabase_url: Some("https://old.supabase.co".to_string()),
        supabase_anon_key: Some("old-key".to_string()),
        table: Some("old_table".to_string()),
    };
    let merged = merge_profile(
        &existing,
        Some("https://new.supabase.co".to_string()),
        None,
        None,
        |name| (name == "SUPABASE_ANON_KEY").then(|| "env-key".to_string()),
    )
    .unwrap();

    assert_eq!(merged.supabase_url.as_deref(), Some("https://new.supabase.co"));
    assert_eq!(merged.supabase_anon_key.as_deref(), Some("env-key"));
    assert_eq!(merged.table.as_deref(), Some("old_table"));
}

#[test]
fn merge_profile_rejects_invalid_values() {
    let existing = CliProfile::default();
    assert!(merge_profile(
        &existing,
        Some("project.supabase.co".to_string()),
        None,
        None,
        |_| None
    )
    .is_err());
    assert!(merge_profile(
        &existing,
        Some("https://project.supabase.co".to_string()),
        Some("key".to_string()),
        Some("cases; drop".to_string()),
        |_| None
    )
    .is_err());
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn local_backend_round_trips_edits_by_prefix() {
    let db_path = unique_test_db_path();
    {
        let backend = open_local_backend(&db_path).await.unwrap();
        assert_eq!(backend.identity.user_id, LOCAL_USER_ID);
        let case = backend.service.create_case(&backend.identity).await.unwrap();
        let prefix = case.id.to_string().chars().take(13).collect::<String>();

        let mut sync = open_case(&backend, &prefix).await.unwrap();
        let panel = panel_for(&panel_args(SideArg::Gov, None), sync.draft()).unwrap();
        sync.apply(panel.add_definition()).unwrap();
        edit_then_blur(
            &mut sync,
            vec![
                panel.edit_definition(0, DefinitionPart::Term, "Justice"),
                panel.edit_definition(0, DefinitionPart::Value, "Fairness"),
            ],
        )
        .unwrap();
        finish(&mut sync).await.unwrap();
    }

    let backend = open_local_backend(&db_path).await.unwrap();
    let cases = backend.service.list_cases(&backend.identity).await.unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(
        cases[0].definitions.gov,
        vec![Definition::new("Justice", "Fairness")]
    );

    cleanup_db_files(&db_path);
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "current_thread")]
async fn open_case_reports_missing_id() {
    let db_path = unique_test_db_path();
    let backend = open_local_backend(&db_path).await.unwrap();

    let error = open_case(&backend, "0190f2a4-8f6e-7c3a-9d4b-2a1e5f6c7d8e")
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::CaseNotFound(_)));

    cleanup_db_files(&db_path);
}

fn unique_test_db_path() -> PathBuf {
    static NEXT_TEST_DB_ID: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let sequence = NEXT_TEST_DB_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("caseprep-cli-test-{timestamp}-{sequence}.db"))
}

fn cleanup_db_files(path: &PathBuf) {
    // On Windows, libsql can keep file handles alive briefly after drop.
    if cfg!(windows) {
        return;
    }

    std::fs::remove_file(path).ok();
    std::fs::remove_file(path.with_extension("db-shm")).ok();
    std::fs::remove_file(path.with_extension("db-wal")).ok();
}
