//! Case model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::side::{Side, Sided};

/// Title given to freshly created cases
pub const PLACEHOLDER_TITLE: &str = "Untitled Case";

/// A unique identifier for a case, using UUID v7 (time-sortable) for local rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(Uuid);

impl CaseId {
    /// Create a new unique case ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CaseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// A term and what it means.
///
/// Stored as a two-element string array (`["term", "value"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Definition {
    pub term: String,
    pub value: String,
}

impl Definition {
    pub fn new(term: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            value: value.into(),
        }
    }
}

impl From<(String, String)> for Definition {
    fn from((term, value): (String, String)) -> Self {
        Self { term, value }
    }
}

impl From<Definition> for (String, String) {
    fn from(definition: Definition) -> Self {
        (definition.term, definition.value)
    }
}

/// A claim with its warrant and impact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Contention {
    #[serde(default)]
    pub contention: String,
    #[serde(default)]
    pub warrant: String,
    #[serde(default)]
    pub impact: String,
}

impl Contention {
    pub fn new(
        contention: impl Into<String>,
        warrant: impl Into<String>,
        impact: impl Into<String>,
    ) -> Self {
        Self {
            contention: contention.into(),
            warrant: warrant.into(),
            impact: impact.into(),
        }
    }
}

/// Opponent material from one round, plus notes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Round {
    /// Ordinal shown to the user
    pub round: u32,
    /// The user's side in this round
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub opponent_contentions: Vec<Contention>,
    #[serde(default)]
    pub opponent_definitions: Vec<Definition>,
    #[serde(default)]
    pub opponent_framework: String,
    #[serde(default)]
    pub notes: String,
}

impl Round {
    /// An empty round numbered `round`, on gov
    #[must_use]
    pub fn new(round: u32) -> Self {
        Self {
            round,
            ..Self::default()
        }
    }
}

/// The root debate-prep document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub resolved: String,
    #[serde(default)]
    pub definitions: Sided<Vec<Definition>>,
    #[serde(default)]
    pub contentions: Sided<Vec<Contention>>,
    #[serde(default)]
    pub framework: Sided<String>,
    #[serde(default)]
    pub rounds: Vec<Round>,
}

impl Case {
    /// Create a placeholder case owned by `user_id`
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: CaseId::new(),
            created_at: Utc::now(),
            user_id: user_id.into(),
            resolved: PLACEHOLDER_TITLE.to_string(),
            definitions: Sided::default(),
            contentions: Sided::default(),
            framework: Sided::default(),
            rounds: Vec::new(),
        }
    }
}

/// A top-level case field; the unit of every remote write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CaseField {
    Resolved,
    Definitions,
    Contentions,
    Framework,
    Rounds,
}

impl CaseField {
    pub const ALL: [Self; 5] = [
        Self::Resolved,
        Self::Definitions,
        Self::Contentions,
        Self::Framework,
        Self::Rounds,
    ];

    /// Column name in the `cases` table
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Definitions => "definitions",
            Self::Contentions => "contentions",
            Self::Framework => "framework",
            Self::Rounds => "rounds",
        }
    }
}

impl fmt::Display for CaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Full replacement value for one top-level field.
///
/// Serializes as a single-key object, e.g. `{"framework": {"gov": "", "opp": ""}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldUpdate {
    Resolved(String),
    Definitions(Sided<Vec<Definition>>),
    Contentions(Sided<Vec<Contention>>),
    Framework(Sided<String>),
    Rounds(Vec<Round>),
}

impl FieldUpdate {
    #[must_use]
    pub const fn field(&self) -> CaseField {
        match self {
            Self::Resolved(_) => CaseField::Resolved,
            Self::Definitions(_) => CaseField::Definitions,
            Self::Contentions(_) => CaseField::Contentions,
            Self::Framework(_) => CaseField::Framework,
            Self::Rounds(_) => CaseField::Rounds,
        }
    }

    /// The value alone, as stored in the field's column
    pub fn value_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::Resolved(value) => serde_json::to_value(value),
            Self::Definitions(value) => serde_json::to_value(value),
            Self::Contentions(value) => serde_json::to_value(value),
            Self::Framework(value) => serde_json::to_value(value),
            Self::Rounds(value) => serde_json::to_value(value),
        }
    }
}
