use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

/// Failure talking to an external collaborator (geocoder, place search, NLU).
///
/// These never reach the HTTP caller; the agent recovers from them with empty
/// results or fallback locations.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} client could not be built: {source}")]
    Client {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} endpoint `{url}` is not usable: {detail}")]
    Endpoint { service: &'static str, url: String, detail: String },
    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{service} returned an unreadable payload: {detail}")]
    Decode { service: &'static str, detail: String },
}

impl UpstreamError {
    pub fn service(&self) -> &'static str {
        match self {
            Self::Client { service, .. }
            | Self::Transport { service, .. }
            | Self::Endpoint { service, .. }
            | Self::Status { service, .. }
            | Self::Decode { service, .. } => service,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

pub(crate) fn build_client(
    service: &'static str,
    user_agent: &str,
    timeout_secs: u64,
) -> Result<Client, UpstreamError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(user_agent)
        .build()
        .map_err(|source| UpstreamError::Client { service, source })
}

pub(crate) async fn read_json<T>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, UpstreamError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status { service, status: status.as_u16() });
    }

    let body =
        response.bytes().await.map_err(|source| UpstreamError::Transport { service, source })?;
    serde_json::from_slice(&body)
        .map_err(|error| UpstreamError::Decode { service, detail: error.to_string() })
}
