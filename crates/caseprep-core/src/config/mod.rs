//! Hosted backend configuration.
//!
//! A `BackendConfig` names the Supabase project the client talks to: the
//! project URL, its public anon key, and the table holding cases. These are
//! safe-to-ship public values; session tokens never live here.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Table used when none is configured
pub const DEFAULT_TABLE: &str = "cases";

const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
const ENV_TABLE: &str = "CASEPREP_TABLE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl BackendConfig {
    /// Validate and normalize explicit values.
    pub fn new(
        supabase_url: impl Into<String>,
        supabase_anon_key: impl Into<String>,
        table: Option<String>,
    ) -> Result<Self> {
        let supabase_url = normalize_text_option(Some(supabase_url.into()))
            .ok_or_else(|| Error::InvalidInput("Supabase URL must not be empty".into()))?;
        if !is_http_url(&supabase_url) {
            return Err(Error::InvalidInput(
                "Supabase URL must include http:// or https://".into(),
            ));
        }
        let supabase_anon_key = normalize_text_option(Some(supabase_anon_key.into()))
            .ok_or_else(|| Error::InvalidInput("Supabase anon key must not be empty".into()))?;
        let table = normalize_text_option(table).unwrap_or_else(default_table);
        if !table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::InvalidInput(format!("invalid table name '{table}'")));
        }

        Ok(Self {
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            supabase_anon_key,
            table,
        })
    }

    /// Resolve from optional values, falling back to the environment.
    ///
    /// Returns `Ok(None)` when neither URL nor key is set anywhere, and an
    /// error when only one of them is.
    pub fn resolve(
        supabase_url: Option<String>,
        supabase_anon_key: Option<String>,
        table: Option<String>,
    ) -> Result<Option<Self>> {
        let url = normalize_text_option(supabase_url)
            .or_else(|| normalize_text_option(std::env::var(ENV_SUPABASE_URL).ok()));
        let anon_key = normalize_text_option(supabase_anon_key)
            .or_else(|| normalize_text_option(std::env::var(ENV_SUPABASE_ANON_KEY).ok()));
        let table = normalize_text_option(table)
            .or_else(|| normalize_text_option(std::env::var(ENV_TABLE).ok()));

        match (url, anon_key) {
            (None, None) => Ok(None),
            (Some(url), Some(anon_key)) => Self::new(url, anon_key, table).map(Some),
            _ => Err(Error::InvalidInput(format!(
                "both {ENV_SUPABASE_URL} and {ENV_SUPABASE_ANON_KEY} must be set"
            ))),
        }
    }

    /// PostgREST base URL (`<project>/rest/v1`)
    #[must_use]
    pub fn rest_url(&self) -> String {
        if self.supabase_url.ends_with("/rest/v1") {
            self.supabase_url.clone()
        } else {
            format!("{}/rest/v1", self.supabase_url)
        }
    }
}
