//! Optional delegate to an external dialogue-understanding service.
//!
//! The service receives the raw message under the caller's session id and
//! answers with an intent plus named slots. Only the `Cuisine` and `City`
//! slots are used.

use std::collections::HashMap;

use async_trait::async_trait;
use neuralbites_core::config::NluConfig;
use neuralbites_core::domain::session::SessionId;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::upstream::{build_client, read_json, UpstreamError};

const SERVICE: &str = "nlu";

pub const CUISINE_SLOT: &str = "Cuisine";
pub const CITY_SLOT: &str = "City";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NluInterpretation {
    pub intent: Option<String>,
    pub cuisine: Option<String>,
    pub city: Option<String>,
}

#[async_trait]
pub trait NluClient: Send + Sync {
    async fn interpret(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<NluInterpretation, UpstreamError>;
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextResponse {
    #[serde(default)]
    intent: Option<IntentPayload>,
}

#[derive(Debug, Deserialize)]
struct IntentPayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    slots: HashMap<String, Option<SlotPayload>>,
}

#[derive(Debug, Deserialize)]
struct SlotPayload {
    #[serde(default)]
    value: Option<serde_json::Value>,
}

impl IntentPayload {
    /// Slot names are matched case-insensitively; blank values count as absent.
    fn slot(&self, name: &str) -> Option<String> {
        self.slots
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, slot)| slot.as_ref())
            .and_then(|slot| slot.value.as_ref())
            .and_then(|value| match value {
                serde_json::Value::String(text) => Some(text.trim().to_string()),
                serde_json::Value::Object(map) => map
                    .get("interpretedValue")
                    .or_else(|| map.get("originalValue"))
                    .and_then(serde_json::Value::as_str)
                    .map(|text| text.trim().to_string()),
                _ => None,
            })
            .filter(|text| !text.is_empty())
    }
}

pub struct HttpNluClient {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for HttpNluClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNluClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl HttpNluClient {
    /// Returns `Ok(None)` when the delegate is disabled in configuration.
    pub fn from_config(
        config: &NluConfig,
        user_agent: &str,
    ) -> Result<Option<Self>, UpstreamError> {
        if !config.enabled {
            return Ok(None);
        }
        let Some(raw_url) = config.base_url.as_deref() else {
            return Ok(None);
        };

        let base_url = Url::parse(raw_url).map_err(|error| endpoint_error(raw_url, error))?;
        if base_url.cannot_be_a_base() {
            return Err(endpoint_error(raw_url, "URL cannot carry path segments"));
        }

        let client = build_client(SERVICE, user_agent, config.timeout_secs)?;
        Ok(Some(Self { client, base_url, api_key: config.api_key.clone() }))
    }

    /// `{base}/sessions/{id}/text`, with the session id percent-encoded as one segment.
    fn text_endpoint(&self, session_id: &SessionId) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| endpoint_error(self.base_url.as_str(), "URL cannot carry path segments"))?
            .pop_if_empty()
            .extend(["sessions", session_id.as_str(), "text"]);
        Ok(url)
    }
}

fn endpoint_error(url: &str, detail: impl std::fmt::Display) -> UpstreamError {
    UpstreamError::Endpoint { service: SERVICE, url: url.to_string(), detail: detail.to_string() }
}

#[async_trait]
impl NluClient for HttpNluClient {
    async fn interpret(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<NluInterpretation, UpstreamError> {
        let mut request =
            self.client.post(self.text_endpoint(session_id)?).json(&TextRequest { text });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { service: SERVICE, source })?;
        let payload: TextResponse = read_json(SERVICE, response).await?;

        Ok(match payload.intent {
            Some(intent) => NluInterpretation {
                cuisine: intent.slot(CUISINE_SLOT),
                city: intent.slot(CITY_SLOT),
                intent: intent.name,
            },
            None => NluInterpretation::default(),
        })
    }
}
