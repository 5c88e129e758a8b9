//! Case repository implementation

use chrono::DateTime;
use libsql::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::models::{Case, CaseId, FieldUpdate};

/// Trait for case storage operations (async)
#[allow(async_fn_in_trait)]
pub trait CaseRepository {
    /// Insert a new case row
    async fn insert(&self, case: &Case) -> Result<()>;

    /// Get a case by ID
    async fn get(&self, id: &CaseId) -> Result<Option<Case>>;

    /// List an owner's cases, newest first
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Case>>;

    /// Replace one top-level column
    async fn update_field(&self, id: &CaseId, update: &FieldUpdate) -> Result<()>;
}

/// libSQL implementation of `CaseRepository`
pub struct LibSqlCaseRepository<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str =
    "SELECT id, created_at, user_id, resolved, definitions, contentions, framework, rounds FROM cases";

impl<'a> LibSqlCaseRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a case from a database row
    fn parse_case(row: &Row) -> Result<Case> {
        let id: String = row.get(0)?;
        let created_at_ms: i64 = row.get(1)?;
        let definitions: String = row.get(4)?;
        let contentions: String = row.get(5)?;
        let framework: String = row.get(6)?;
        let rounds: String = row.get(7)?;

        Ok(Case {
            id: id
                .parse()
                .map_err(|_| Error::Database(format!("invalid case id in row: {id}")))?,
            created_at: DateTime::from_timestamp_millis(created_at_ms).ok_or_else(|| {
                Error::Database(format!("invalid created_at in row: {created_at_ms}"))
            })?,
            user_id: row.get(2)?,
            resolved: row.get(3)?,
            definitions: serde_json::from_str(&definitions)?,
            contentions: serde_json::from_str(&contentions)?,
            framework: serde_json::from_str(&framework)?,
            rounds: serde_json::from_str(&rounds)?,
        })
    }
}

impl CaseRepository for LibSqlCaseRepository<'_> {
    async fn insert(&self, case: &Case) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO cases (id, created_at, user_id, resolved, definitions, contentions, framework, rounds)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    case.id.as_str(),
                    case.created_at.timestamp_millis(),
                    case.user_id.clone(),
                    case.resolved.clone(),
                    serde_json::to_string(&case.definitions)?,
                    serde_json::to_string(&case.contentions)?,
                    serde_json::to_string(&case.framework)?,
                    serde_json::to_string(&case.rounds)?
                ],
            )
            .await?;
        Ok(())
    }

    async fn get(&self, id: &CaseId) -> Result<Option<Case>> {
        let mut rows = self
            .conn
            .query(&format!("{SELECT_COLUMNS} WHERE id = ?"), [id.as_str()])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_case(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Case>> {
        let mut rows = self
            .conn
            .query(
                &format!("{SELECT_COLUMNS} WHERE user_id = ? ORDER BY created_at DESC, id DESC"),
                [owner],
            )
            .await?;

        let mut cases = Vec::new();
        while let Some(row) = rows.next().await? {
            cases.push(Self::parse_case(&row)?);
        }
        Ok(cases)
    }

    async fn update_field(&self, id: &CaseId, update: &FieldUpdate) -> Result<()> {
        // `resolved` is plain text; the nested fields are stored as JSON text
        let value = match update {
            FieldUpdate::Resolved(text) => text.clone(),
            other => serde_json::to_string(&other.value_json()?)?,
        };
        let column = update.field().column();

        let rows = self
            .conn
            .execute(
                &format!("UPDATE cases SET {column} = ? WHERE id = ?"),
                params![value, id.as_str()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}
