//! Client for the upstream apps service

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AppsSection;
use crate::error::{Error, Result};

/// A single analysis record returned by the apps service. The ID is the only
/// field of interest; it is handed back to the caller as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub id: String,
}

/// Wire shape of the apps service listing. Only the first entry matters.
#[derive(Debug, Deserialize)]
struct Analyses {
    #[serde(default)]
    analyses: Vec<Analysis>,
}

/// Shared client for analysis lookups against the apps service.
///
/// The base URL is kept exactly as configured and parsed on every lookup, so
/// a malformed value fails the requests that use it instead of startup.
#[derive(Debug, Clone)]
pub struct AppsClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
}

impl AppsClient {
    /// Build a client from the `[apps]` configuration section.
    pub fn new(config: &AppsSection) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if config.timeout > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout));
        }

        Ok(Self {
            client: builder.build().context("failed to build HTTP client")?,
            base_url: config.url.clone(),
            user: config.user.clone(),
        })
    }

    /// Resolve an external ID to the first analysis the apps service reports
    /// for it.
    ///
    /// The response status is not inspected: whatever the apps service
    /// answers is either a usable listing or a decode failure. An empty
    /// listing is [`Error::NotFound`].
    pub async fn resolve(&self, external_id: &str) -> Result<Analysis> {
        let url = self.lookup_url(external_id)?;
        tracing::debug!(%url, "querying apps service");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(Error::UpstreamUnreachable)?;

        let body = response.bytes().await.map_err(Error::UpstreamRead)?;
        let listing: Analyses = serde_json::from_slice(&body)?;

        listing.analyses.into_iter().next().ok_or(Error::NotFound)
    }

    /// Build `<base>/admin/analyses/by-external-id/<id>?user=<user>`.
    ///
    /// The external ID is appended as a single path segment, and trailing
    /// slashes on the configured base do not produce doubled separators.
    /// Any query carried by the configured base is replaced; the outbound
    /// query is exactly the `user` pair.
    fn lookup_url(&self, external_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| Error::InvalidUpstreamUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| Error::InvalidUpstreamUrl {
                url: self.base_url.clone(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(["admin", "analyses", "by-external-id"])
            .push(external_id);

        url.set_query(None);
        url.query_pairs_mut().append_pair("user", &self.user);

        Ok(url)
    }
}
