//! Case store backed by a Supabase project (PostgREST).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::CaseStore;
use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::models::{Case, CaseId, FieldUpdate, Sided, PLACEHOLDER_TITLE};
use crate::util::compact_text;

/// PostgREST client for the cases table, acting as one signed-in user.
#[derive(Clone)]
pub struct SupabaseCaseStore {
    table_url: String,
    anon_key: String,
    access_token: String,
    client: Client,
}

impl std::fmt::Debug for SupabaseCaseStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SupabaseCaseStore")
            .field("table_url", &self.table_url)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SupabaseCaseStore {
    pub fn new(config: &BackendConfig, access_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() {
            return Err(Error::InvalidInput("access token must not be empty".into()));
        }

        Ok(Self {
            table_url: format!("{}/{}", config.rest_url(), config.table),
            anon_key: config.supabase_anon_key.clone(),
            access_token,
            client: Client::builder().build()?,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
    }

    async fn send_for_rows(&self, request: RequestBuilder) -> Result<Vec<Case>> {
        let response = self.authorized(request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(parse_api_error(status, &body)));
        }
        Ok(response.json::<Vec<Case>>().await?)
    }
}

#[async_trait]
impl CaseStore for SupabaseCaseStore {
    async fn fetch(&self, id: &CaseId) -> Result<Option<Case>> {
        let request = self
            .client
            .get(&self.table_url)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]);
        let rows = self.send_for_rows(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Case>> {
        let request = self.client.get(&self.table_url).query(&[
            ("select", "*".to_string()),
            ("userId", format!("eq.{owner}")),
            ("order", "created_at.desc".to_string()),
        ]);
        self.send_for_rows(request).await
    }

    async fn create(&self, owner: &str) -> Result<Case> {
        let request = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(&insert_payload(owner));
        let rows = self.send_for_rows(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::Remote("insert returned no row".to_string()))
    }

    async fn update_field(&self, id: &CaseId, update: &FieldUpdate) -> Result<()> {
        let request = self
            .client
            .patch(&self.table_url)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(update);
        let rows = self.send_for_rows(request).await?;
        if rows.is_empty() {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Insert body for a new case; the server assigns `id` and `created_at`.
fn insert_payload(owner: &str) -> serde_json::Value {
    json!({
        "userId": owner,
        "resolved": PLACEHOLDER_TITLE,
        "definitions": Sided::<Vec<()>>::default(),
        "contentions": Sided::<Vec<()>>::default(),
        "framework": Sided::<String>::default(),
        "rounds": [],
    })
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.details).or(payload.hint) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
