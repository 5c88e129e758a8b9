use std::env;
use std::fmt::Write as _;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use caseprep_core::auth::{require_identity, Identity};
use caseprep_core::services::CaseService;
use caseprep_core::store::{LocalCaseStore, SupabaseCaseStore};
use caseprep_core::sync::{Draft, Edit, Panel, Synchronizer};
use caseprep_core::{Case, CaseField, CaseId, Notice, Side};
use chrono::Utc;
use serde::Serialize;

use crate::auth::SupabaseAuthService;
use crate::cli::PanelArgs;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Owner id for cases in the local database
pub const LOCAL_USER_ID: &str = "local";

/// Global options every command runs with
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub profile: Option<String>,
    pub db_path: PathBuf,
}

/// A case service plus the identity it acts as
pub struct Backend {
    pub service: CaseService,
    pub identity: Identity,
}

impl CommandContext {
    pub fn new(profile: Option<String>, cli_db_path: Option<PathBuf>) -> Self {
        Self {
            profile,
            db_path: resolve_db_path(cli_db_path),
        }
    }

    /// Hosted backend when the profile configures one, local database otherwise
    pub async fn backend(&self) -> Result<Backend, CliError> {
        let config = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = config.resolve_profile_name(self.profile.as_deref());
        let profile = config.profile(&profile_name).cloned().unwrap_or_default();

        match profile.backend_config()? {
            Some(backend_config) => {
                tracing::debug!("Using hosted backend for profile '{}'", profile_name);
                let auth = SupabaseAuthService::new(&profile_name, &backend_config)
                    .map_err(|error| CliError::Auth(error.to_string()))?;
                let session = auth
                    .restore_session()
                    .await
                    .map_err(|error| CliError::Auth(error.to_string()))?;
                let identity = require_identity(session.as_ref())
                    .map_err(|_| CliError::SignInRequired(profile_name.clone()))?;
                let access_token = session.map(|session| session.access_token).unwrap_or_default();
                let store = SupabaseCaseStore::new(&backend_config, access_token)?;
                Ok(Backend {
                    service: CaseService::new(Arc::new(store)),
                    identity,
                })
            }
            None => open_local_backend(&self.db_path).await,
        }
    }

    /// Resolve `query` to one of the user's cases and start editing it
    pub async fn open(&self, query: &str) -> Result<Synchronizer, CliError> {
        let backend = self.backend().await?;
        open_case(&backend, query).await
    }
}

pub async fn open_local_backend(db_path: &Path) -> Result<Backend, CliError> {
    let store = LocalCaseStore::open_path(db_path).await?;
    Ok(Backend {
        service: CaseService::new(Arc::new(store)),
        identity: Identity::new(LOCAL_USER_ID),
    })
}

pub async fn open_case(backend: &Backend, query: &str) -> Result<Synchronizer, CliError> {
    let id = resolve_case_id(query, backend).await?;
    backend
        .service
        .open_case(&id)
        .await
        .map_err(|error| match error {
            caseprep_core::Error::NotFound(_) => CliError::CaseNotFound(query.trim().to_string()),
            other => CliError::Core(other),
        })
}

/// Full ids are used as given; anything else is matched as a prefix of the
/// user's own case ids.
pub async fn resolve_case_id(query: &str, backend: &Backend) -> Result<CaseId, CliError> {
    let query = normalize_case_identifier(query)?;
    if let Ok(id) = query.parse::<CaseId>() {
        return Ok(id);
    }

    let cases = list_cases(backend).await?;
    match_case_prefix(&query, &cases)
}

pub fn match_case_prefix(query: &str, cases: &[Case]) -> Result<CaseId, CliError> {
    let needle = query.to_ascii_lowercase();
    let matching = cases
        .iter()
        .filter(|case| case.id.to_string().starts_with(&needle))
        .map(|case| case.id)
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::CaseNotFound(query.to_string())),
        [id] => Ok(*id),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(short_id)
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousCaseId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub async fn list_cases(backend: &Backend) -> Result<Vec<Case>, CliError> {
    match backend.service.list_cases(&backend.identity).await {
        Ok(cases) => Ok(cases),
        Err(error) => {
            report_notices(&[Notice::fetch_failed(error.to_string())]);
            Err(error.into())
        }
    }
}

pub fn normalize_case_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyCaseId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Convert a 1-based position from the command line
pub fn position_to_index(position: usize) -> Result<usize, CliError> {
    position.checked_sub(1).ok_or(CliError::InvalidPosition)
}

pub fn panel_for(target: &PanelArgs, draft: &Draft) -> Result<Panel, CliError> {
    match target.round {
        Some(position) => Ok(Panel::for_round(draft, position_to_index(position)?)?),
        None => Ok(Panel::for_case(target.side.into())),
    }
}

/// Apply leaf edits, then end editing of every field they touched
pub fn edit_then_blur(sync: &mut Synchronizer, edits: Vec<Edit>) -> Result<(), CliError> {
    let mut fields: Vec<CaseField> = Vec::new();
    for edit in edits {
        let field = edit.field();
        sync.set_field(edit)?;
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    for field in fields {
        sync.blur(field);
    }
    Ok(())
}

/// Wait for outstanding writes and report how they went
pub async fn finish(sync: &mut Synchronizer) -> Result<(), CliError> {
    let notices = sync.settle().await;
    report_notices(&notices);
    let failed = notices.iter().filter(|notice| notice.is_error()).count();
    if failed > 0 {
        Err(CliError::FlushFailed(failed))
    } else {
        Ok(())
    }
}

pub fn report_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("{}", format_notice(notice));
    }
}

pub fn format_notice(notice: &Notice) -> String {
    match notice.detail.as_deref() {
        Some(detail) if !detail.is_empty() => format!("{} ({detail})", notice.title),
        _ => notice.title.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct CaseListItem {
    pub id: String,
    pub resolved: String,
    pub created_at: String,
    pub relative_time: String,
    pub rounds: usize,
}

pub fn case_to_list_item(case: &Case) -> CaseListItem {
    let now_ms = Utc::now().timestamp_millis();
    CaseListItem {
        id: case.id.to_string(),
        resolved: case.resolved.clone(),
        created_at: case.created_at.to_rfc3339(),
        relative_time: format_relative_time(case.created_at.timestamp_millis(), now_ms),
        rounds: case.rounds.len(),
    }
}

pub fn format_case_lines(cases: &[Case]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    cases
        .iter()
        .map(|case| {
            let short_id = short_id(&case.id);
            let preview = text_preview(&case.resolved, 40);
            let relative_time = format_relative_time(case.created_at.timestamp_millis(), now_ms);
            let rounds = match case.rounds.len() {
                0 => String::new(),
                1 => "1 round".to_string(),
                count => format!("{count} rounds"),
            };

            if rounds.is_empty() {
                format!("{short_id:<13}  {preview:<40}  {relative_time}")
            } else {
                format!("{short_id:<13}  {preview:<40}  {relative_time:<10}  {rounds}")
            }
        })
        .collect()
}

pub fn short_id(id: &CaseId) -> String {
    id.to_string().chars().take(13).collect()
}

pub fn text_preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Human-readable rendering of a case, limited to `sides`
pub fn render_case(draft: &Draft, sides: &[Side]) -> Result<String, CliError> {
    let mut out = String::new();
    writeln!(out, "{}", draft.resolved()).ok();
    writeln!(
        out,
        "id: {}  created: {}",
        draft.id(),
        draft.created_at().format("%Y-%m-%d %H:%M UTC")
    )
    .ok();

    let mut case_panel = Panel::for_case(Side::Gov);
    for side in sides {
        case_panel.select(*side)?;
        writeln!(out).ok();
        writeln!(out, "== {} ==", side.label()).ok();
        render_panel(&mut out, &case_panel, draft, "")?;
    }

    for index in 0..draft.rounds().len() {
        let panel = Panel::for_round(draft, index)?;
        let round = draft.round(index)?;
        writeln!(out).ok();
        writeln!(
            out,
            "== Round {} (you: {}) ==",
            round.round,
            panel.side().label()
        )
        .ok();
        render_panel(&mut out, &panel, draft, "Opponent ")?;
        if !round.notes.trim().is_empty() {
            writeln!(out, "Notes:").ok();
            for line in round.notes.lines() {
                writeln!(out, "  {line}").ok();
            }
        }
    }

    Ok(out)
}

fn render_panel(
    out: &mut String,
    panel: &Panel,
    draft: &Draft,
    label_prefix: &str,
) -> Result<(), CliError> {
    let framework = panel.framework(draft)?;
    if !framework.trim().is_empty() {
        writeln!(out, "{label_prefix}Framework: {framework}").ok();
    }

    let definitions = panel.definitions(draft)?;
    if !definitions.is_empty() {
        writeln!(out, "{label_prefix}Definitions:").ok();
        for (index, definition) in definitions.iter().enumerate() {
            writeln!(out, "  {}. {}: {}", index + 1, definition.term, definition.value).ok();
        }
    }

    let contentions = panel.contentions(draft)?;
    if !contentions.is_empty() {
        writeln!(out, "{label_prefix}Contentions:").ok();
        for (index, contention) in contentions.iter().enumerate() {
            writeln!(out, "  {}. {}", index + 1, contention.contention).ok();
            if !contention.warrant.is_empty() {
                writeln!(out, "     warrant: {}", contention.warrant).ok();
            }
            if !contention.impact.is_empty() {
                writeln!(out, "     impact: {}", contention.impact).ok();
            }
        }
    }
    Ok(())
}

/// Text from arguments, piped stdin, or an editor seeded with `initial`.
///
/// `None` means the editor was left empty.
pub fn resolve_text(parts: &[String], initial: &str) -> Result<Option<String>, CliError> {
    if let Some(text) = normalize_content(&parts.join(" ")) {
        return Ok(Some(text));
    }

    if let Some(text) = read_piped_stdin()? {
        return Ok(Some(text));
    }

    capture_editor_input_with_initial(initial)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_text_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file)?;
    std::fs::remove_file(&temp_file).ok();

    launch_result?;
    Ok(normalize_content(&content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_text_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("caseprep-{}-{now}.md", std::process::id()))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("CASEPREP_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("caseprep")
        .join("caseprep.db")
}
