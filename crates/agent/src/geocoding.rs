//! Location resolution through a Nominatim-compatible geocoder.

use std::sync::Arc;

use async_trait::async_trait;
use neuralbites_core::config::GeocodingConfig;
use neuralbites_core::domain::location::Location;
use neuralbites_core::intent::KeywordTable;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::upstream::{build_client, read_json, UpstreamError};

const SERVICE: &str = "nominatim";

/// Upper bound on geocoder round trips spent guessing a city from free text.
pub const MAX_FREE_TEXT_CANDIDATES: usize = 4;

const STOPWORDS: &[&str] = &[
    "food",
    "restaurant",
    "restaurants",
    "near",
    "nearby",
    "with",
    "find",
    "want",
    "some",
    "place",
    "places",
    "good",
    "best",
    "around",
    "there",
    "where",
    "what",
    "please",
    "looking",
    "something",
    "tonight",
    "today",
    "dinner",
    "lunch",
    "breakfast",
    "eat",
    "hungry",
    "show",
    "give",
    "that",
    "this",
    "from",
    "into",
    "have",
];

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the geocoder answered with no match.
    async fn geocode(&self, query: &str) -> Result<Option<Location>, UpstreamError>;
}

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, UpstreamError> {
        let client = build_client(SERVICE, &config.user_agent, config.timeout_secs)?;
        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Location>, UpstreamError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { service: SERVICE, source })?;

        let hits: Vec<NominatimHit> = read_json(SERVICE, response).await?;
        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };

        let location = Location::from_geocoder_label(
            parse_coordinate(&hit.lat)?,
            parse_coordinate(&hit.lon)?,
            &hit.display_name,
        );
        if !location.has_valid_coordinates() {
            return Err(UpstreamError::Decode {
                service: SERVICE,
                detail: format!("coordinates out of range for `{}`", hit.display_name),
            });
        }
        Ok(Some(location))
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, UpstreamError> {
    raw.trim().parse::<f64>().map_err(|_| UpstreamError::Decode {
        service: SERVICE,
        detail: format!("coordinate `{raw}` is not a number"),
    })
}

/// Turns message text or an explicit city into a [`Location`].
///
/// Upstream failures are logged and reported as "not found"; the caller owns
/// the remembered/default fallback.
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    keywords: KeywordTable,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, keywords: KeywordTable) -> Self {
        Self { geocoder, keywords }
    }

    /// Words worth sending to the geocoder, in message order: longer than three
    /// characters, not a stopword, not itself a cuisine keyword.
    pub fn candidate_tokens(&self, text: &str) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        for raw in text.split_whitespace() {
            let token = raw.trim_matches(|ch: char| !ch.is_alphanumeric());
            if token.chars().count() <= 3 {
                continue;
            }

            let lowered = token.to_lowercase();
            if STOPWORDS.contains(&lowered.as_str()) || self.keywords.contains_keyword(&lowered) {
                continue;
            }
            if candidates.iter().any(|existing| existing.to_lowercase() == lowered) {
                continue;
            }
            candidates.push(token.to_string());
        }
        candidates
    }

    /// Tries each candidate token in turn and returns the first that geocodes.
    pub async fn resolve_free_text(&self, text: &str) -> Option<Location> {
        for candidate in self.candidate_tokens(text).into_iter().take(MAX_FREE_TEXT_CANDIDATES) {
            match self.geocoder.geocode(&candidate).await {
                Ok(Some(location)) => {
                    info!(
                        event_name = "agent.geocode.hit",
                        query = %candidate,
                        location = %location.display_name,
                        "free-text token resolved to a location"
                    );
                    return Some(location);
                }
                Ok(None) => {
                    debug!(event_name = "agent.geocode.miss", query = %candidate, "no geocoder match");
                }
                Err(error) => {
                    warn!(
                        event_name = "agent.geocode.upstream_error",
                        query = %candidate,
                        timeout = error.is_timeout(),
                        error = %error,
                        "geocoder call failed; trying next candidate"
                    );
                }
            }
        }
        None
    }

    pub async fn resolve_city(&self, city: &str) -> Option<Location> {
        match self.geocoder.geocode(city).await {
            Ok(found) => {
                if found.is_none() {
                    debug!(event_name = "agent.geocode.miss", query = %city, "no geocoder match");
                }
                found
            }
            Err(error) => {
                warn!(
                    event_name = "agent.geocode.upstream_error",
                    query = %city,
                    timeout = error.is_timeout(),
                    error = %error,
                    "geocoder call failed for structured city"
                );
                None
            }
        }
    }
}
