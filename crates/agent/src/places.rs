//! Nearby eatery search through an Overpass-compatible interpreter.

use async_trait::async_trait;
use neuralbites_core::config::PlacesConfig;
use neuralbites_core::domain::cuisine::CuisineFilter;
use neuralbites_core::domain::location::Location;
use neuralbites_core::domain::place::Place;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::upstream::{build_client, read_json, UpstreamError};

const SERVICE: &str = "overpass";
const AMENITY_PATTERN: &str = "restaurant|fast_food|cafe";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Ok,
    Empty,
    Unavailable,
}

/// Outcome of one place search. Only the HTTP boundary flattens this to a list.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaceSearch {
    Found(Vec<Place>),
    Empty,
    Unavailable(String),
}

impl PlaceSearch {
    pub fn status(&self) -> SearchStatus {
        match self {
            Self::Found(_) => SearchStatus::Ok,
            Self::Empty => SearchStatus::Empty,
            Self::Unavailable(_) => SearchStatus::Unavailable,
        }
    }

    pub fn places(&self) -> &[Place] {
        match self {
            Self::Found(places) => places,
            Self::Empty | Self::Unavailable(_) => &[],
        }
    }

    pub fn into_places(self) -> Vec<Place> {
        match self {
            Self::Found(places) => places,
            Self::Empty | Self::Unavailable(_) => Vec::new(),
        }
    }

    fn from_places(places: Vec<Place>) -> Self {
        if places.is_empty() {
            Self::Empty
        } else {
            Self::Found(places)
        }
    }
}

#[async_trait]
pub trait PlaceFinder: Send + Sync {
    async fn find_places(&self, location: &Location, filter: &CuisineFilter) -> PlaceSearch;
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: Option<OverpassTags>,
}

#[derive(Debug, Default, Deserialize)]
struct OverpassTags {
    name: Option<String>,
}

pub struct OverpassPlaceFinder {
    client: Client,
    base_url: String,
    radius_meters: u32,
    max_results: usize,
    timeout_secs: u64,
}

impl OverpassPlaceFinder {
    pub fn new(config: &PlacesConfig, user_agent: &str) -> Result<Self, UpstreamError> {
        let client = build_client(SERVICE, user_agent, config.timeout_secs)?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            radius_meters: config.radius_meters,
            max_results: config.max_results,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn build_query(&self, location: &Location, filter: &CuisineFilter) -> String {
        let around =
            format!("(around:{},{},{})", self.radius_meters, location.latitude, location.longitude);

        let mut query = format!("[out:json][timeout:{}];\n(\n", self.timeout_secs);
        if !filter.is_fallback() {
            query.push_str(&format!(
                "  node[\"amenity\"~\"{AMENITY_PATTERN}\"][\"cuisine\"~\"{}\",i]{around};\n",
                filter.overpass_pattern()
            ));
        }
        query.push_str(&format!("  node[\"amenity\"~\"{AMENITY_PATTERN}\"]{around};\n"));
        query.push_str(&format!(");\nout {};", self.max_results));
        query
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Place>, UpstreamError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("data", query)])
            .send()
            .await
            .map_err(|source| UpstreamError::Transport { service: SERVICE, source })?;

        let payload: OverpassResponse = read_json(SERVICE, response).await?;
        if payload.elements.is_empty() {
            if let Some(remark) = payload.remark {
                return Err(UpstreamError::Decode { service: SERVICE, detail: remark });
            }
        }

        Ok(payload
            .elements
            .into_iter()
            .filter_map(|element| {
                let (latitude, longitude) = (element.lat?, element.lon?);
                let name = element.tags.and_then(|tags| tags.name);
                Some(Place::from_venue(name.as_deref(), latitude, longitude))
            })
            .take(self.max_results)
            .collect())
    }
}

#[async_trait]
impl PlaceFinder for OverpassPlaceFinder {
    async fn find_places(&self, location: &Location, filter: &CuisineFilter) -> PlaceSearch {
        let query = self.build_query(location, filter);
        match self.fetch(&query).await {
            Ok(places) => {
                info!(
                    event_name = "agent.places.searched",
                    cuisine = %filter,
                    location = %location.display_name,
                    count = places.len(),
                    "place search completed"
                );
                PlaceSearch::from_places(places)
            }
            Err(error) => {
                warn!(
                    event_name = "agent.places.upstream_error",
                    cuisine = %filter,
                    location = %location.display_name,
                    timeout = error.is_timeout(),
                    error = %error,
                    "place search failed"
                );
                PlaceSearch::Unavailable(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use neuralbites_core::config::PlacesConfig;
    use neuralbites_core::domain::cuisine::CuisineFilter;
    use neuralbites_core::domain::location::Location;
    use neuralbites_core::domain::place::{Place, UNKNOWN_PLACE_NAME};
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{OverpassPlaceFinder, PlaceFinder, PlaceSearch, SearchStatus};

    const USER_AGENT: &str = "NeuralBites-test/0.1";

    fn finder(base_url: String, max_results: usize) -> OverpassPlaceFinder {
        finder_with_timeout(base_url, max_results, 2)
    }

    fn finder_with_timeout(
        base_url: String,
        max_results: usize,
        timeout_secs: u64,
    ) -> OverpassPlaceFinder {
        OverpassPlaceFinder::new(
            &PlacesConfig { base_url, radius_meters: 3000, max_results, timeout_secs },
            USER_AGENT,
        )
        .expect("client")
    }

    fn paris() -> Location {
        Location::new(48.85, 2.35, "Paris")
    }

    fn element(index: usize) -> serde_json::Value {
        json!({
            "type": "node",
            "id": index,
            "lat": 48.0 + index as f64 / 100.0,
            "lon": 2.0,
            "tags": { "name": format!("Venue {index}"), "amenity": "restaurant" }
        })
    }

    #[test]
    fn query_includes_cuisine_clause_for_specific_filter() {
        let finder = finder("http://localhost/api/interpreter".to_string(), 10);

        let query = finder.build_query(&paris(), &CuisineFilter::parse("indian;mexican"));

        assert!(query.starts_with("[out:json][timeout:2];"));
        assert!(query.contains(
            "node[\"amenity\"~\"restaurant|fast_food|cafe\"][\"cuisine\"~\"indian|mexican\",i](around:3000,48.85,2.35);"
        ));
        assert!(query.contains("node[\"amenity\"~\"restaurant|fast_food|cafe\"](around:3000,48.85,2.35);"));
        assert!(query.ends_with("out 10;"));
    }

    #[test]
    fn fallback_filter_sends_only_unfiltered_clause() {
        let finder = finder("http://localhost/api/interpreter".to_string(), 5);

        let query = finder.build_query(&paris(), &CuisineFilter::fallback());

        assert!(!query.contains("cuisine"));
        assert!(query.ends_with("out 5;"));
    }

    #[test]
    fn search_status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&SearchStatus::Unavailable).expect("json"), "\"unavailable\"");
        assert_eq!(PlaceSearch::Empty.status(), SearchStatus::Empty);
        assert!(PlaceSearch::Unavailable("down".to_string()).into_places().is_empty());
    }

    #[tokio::test]
    async fn results_are_mapped_and_capped() {
        let server = MockServer::start().await;
        let elements: Vec<_> = (0..15).map(element).collect();
        Mock::given(method("GET"))
            .and(path("/api/interpreter"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": elements })))
            .mount(&server)
            .await;

        let finder = finder(format!("{}/api/interpreter", server.uri()), 10);
        let search = finder.find_places(&paris(), &CuisineFilter::parse("pizza")).await;

        assert_eq!(search.status(), SearchStatus::Ok);
        let places = search.into_places();
        assert_eq!(places.len(), 10);
        assert_eq!(places[0].name, "Venue 0");
        assert_eq!(
            places[0].external_link,
            "https://www.openstreetmap.org/?mlat=48&mlon=2#map=18/48/2"
        );
    }

    #[tokio::test]
    async fn unnamed_venues_get_placeholder_and_coordinateless_elements_are_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/interpreter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    { "type": "node", "id": 1, "lat": 21.17, "lon": 72.83 },
                    { "type": "way", "id": 2, "tags": { "name": "No Coordinates" } }
                ]
            })))
            .mount(&server)
            .await;

        let finder = finder(format!("{}/api/interpreter", server.uri()), 10);
        let places = finder.find_places(&paris(), &CuisineFilter::fallback()).await.into_places();

        assert_eq!(places, vec![Place::from_venue(None, 21.17, 72.83)]);
        assert_eq!(places[0].name, UNKNOWN_PLACE_NAME);
    }

    #[tokio::test]
    async fn empty_element_list_is_empty_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/interpreter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": [] })))
            .mount(&server)
            .await;

        let finder = finder(format!("{}/api/interpreter", server.uri()), 10);

        assert_eq!(
            finder.find_places(&paris(), &CuisineFilter::fallback()).await,
            PlaceSearch::Empty
        );
    }

    #[tokio::test]
    async fn upstream_failures_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/busy"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/remark"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [],
                "remark": "runtime error: Query timed out"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        for route in ["busy", "remark", "garbage"] {
            let finder = finder(format!("{}/{route}", server.uri()), 10);
            let search = finder.find_places(&paris(), &CuisineFilter::fallback()).await;
            assert_eq!(search.status(), SearchStatus::Unavailable, "route {route}");
        }
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/interpreter"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "elements": [element(1)] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let finder = finder_with_timeout(format!("{}/api/interpreter", server.uri()), 10, 1);
        let query = finder.build_query(&paris(), &CuisineFilter::fallback());

        let error = finder.fetch(&query).await.expect_err("request should time out");
        assert!(error.is_timeout(), "unexpected error: {error}");

        let search = finder.find_places(&paris(), &CuisineFilter::fallback()).await;
        assert_eq!(search.status(), SearchStatus::Unavailable);
        assert!(search.into_places().is_empty());
    }
}
