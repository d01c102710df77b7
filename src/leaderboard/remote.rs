//! REST leaderboard store.
//!
//! Talks to a PostgREST-style `/rest/v1/leaderboard` resource: filters are
//! query parameters such as `name=eq.Ada`, writes ask for the stored row
//! back with `Prefer: return=representation`.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::{LeaderboardEntry, LeaderboardError, LeaderboardSync};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A stored row: the canonical entry plus the store's key.
#[derive(Debug, Deserialize)]
struct RemoteRow {
    id: i64,
    #[serde(flatten)]
    entry: LeaderboardEntry,
}

/// [`LeaderboardSync`] over HTTP.
#[derive(Debug, Clone)]
pub struct RestLeaderboard {
    resource: Url,
    api_key: String,
    client: reqwest::Client,
}

impl RestLeaderboard {
    /// Creates a client for the store at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if the URL is invalid or the HTTP
    /// client cannot be built.
    #[instrument(skip(api_key))]
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LeaderboardError> {
        let mut resource = Url::parse(base_url)
            .map_err(|e| LeaderboardError::new(format!("Invalid leaderboard URL '{}': {}", base_url, e)))?;
        resource
            .path_segments_mut()
            .map_err(|_| LeaderboardError::new(format!("Leaderboard URL cannot be a base: '{}'", base_url)))?
            .pop_if_empty()
            .extend(["rest", "v1", "leaderboard"]);

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        info!(resource = %resource, "Remote leaderboard configured");
        Ok(Self {
            resource,
            api_key: api_key.into(),
            client,
        })
    }

    fn url(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.resource.clone();
        url.query_pairs_mut().extend_pairs(params);
        url
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn rows(&self, request: reqwest::RequestBuilder) -> Result<Vec<RemoteRow>, LeaderboardError> {
        let rows = self
            .authorized(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RemoteRow>>()
            .await?;
        Ok(rows)
    }

    fn first(rows: Vec<RemoteRow>) -> Result<RemoteRow, LeaderboardError> {
        rows.into_iter()
            .next()
            .ok_or_else(|| LeaderboardError::new("Store returned no row"))
    }
}

#[async_trait::async_trait]
impl LeaderboardSync for RestLeaderboard {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let url = self.url(&[("select", "*"), ("order", "score.desc")]);
        let rows = self.rows(self.client.get(url)).await?;
        info!(count = rows.len(), "Remote leaderboard fetched");
        Ok(rows.into_iter().map(|r| r.entry).collect())
    }

    #[instrument(skip(self, entry), fields(name = %entry.name(), mode = %entry.mode(), score = entry.score()))]
    async fn upsert(&self, entry: LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
        let name = format!("eq.{}", entry.name());
        let mode = format!("eq.{}", entry.mode());
        let lookup = self.url(&[("select", "*"), ("name", &name), ("mode", &mode), ("limit", "1")]);
        let existing = self.rows(self.client.get(lookup)).await?.into_iter().next();

        let stored = match existing {
            Some(row) if entry.score() > row.entry.score() => {
                let id = format!("eq.{}", row.id);
                let url = self.url(&[("id", &id)]);
                let request = self
                    .client
                    .patch(url)
                    .header("Prefer", "return=representation")
                    .json(&entry);
                let updated = Self::first(self.rows(request).await?)?;
                info!(id = updated.id, "Remote entry improved");
                updated.entry
            }
            Some(row) => {
                debug!(id = row.id, best = row.entry.score(), "Existing remote score kept");
                row.entry
            }
            None => {
                let request = self
                    .client
                    .post(self.resource.clone())
                    .header("Prefer", "return=representation")
                    .json(&entry);
                let created = Self::first(self.rows(request).await?)?;
                info!(id = created.id, "Remote entry created");
                created.entry
            }
        };
        Ok(stored)
    }
}
