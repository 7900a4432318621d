use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

use crate::config::UpstreamConfig;

/// External collaborators the lookup pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamService {
    Nominatim,
    OpenCage,
    Overpass,
}

impl UpstreamService {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nominatim => "nominatim",
            Self::OpenCage => "opencage",
            Self::Overpass => "overpass",
        }
    }
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Transport, status, or payload failure from an upstream collaborator.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{service} request failed: {source}")]
    Transport {
        service: UpstreamService,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} responded with status {status}")]
    Status {
        service: UpstreamService,
        status: u16,
    },
    #[error("{service} returned an undecodable payload: {source}")]
    Decode {
        service: UpstreamService,
        #[source]
        source: serde_json::Error,
    },
}

/// Shared outbound client: one connection pool, bounded timeout, no retries.
pub fn http_client(config: &UpstreamConfig) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(30)
        .build()
        .map_err(UpstreamError::Client)
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Send `request` and decode a successful JSON body into `T`.
pub(crate) async fn fetch_json<T>(
    service: UpstreamService,
    request: reqwest::RequestBuilder,
) -> Result<T, UpstreamError>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|source| UpstreamError::Transport { service, source })?;

    let status = response.status();
    debug!(%service, %status, "upstream responded");
    if !status.is_success() {
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|source| UpstreamError::Transport { service, source })?;

    serde_json::from_str(&body).map_err(|source| UpstreamError::Decode { service, source })
}
