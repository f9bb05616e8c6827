use std::sync::Arc;

use neuralbites_core::config::AppConfig;
use neuralbites_core::domain::cuisine::CuisineFilter;
use neuralbites_core::domain::location::{Location, LocationSource};
use neuralbites_core::domain::place::Place;
use neuralbites_core::domain::session::SessionId;
use neuralbites_core::errors::ApplicationError;
use neuralbites_core::intent::IntentExtractor;
use neuralbites_db::{RepositoryError, SessionRepository};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::geocoding::{LocationResolver, NominatimGeocoder};
use crate::nlu::{HttpNluClient, NluClient};
use crate::places::{OverpassPlaceFinder, PlaceFinder, PlaceSearch, SearchStatus};
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("session memory unavailable: {0}")]
    Session(#[from] RepositoryError),
}

impl From<AgentError> for ApplicationError {
    fn from(value: AgentError) -> Self {
        match value {
            AgentError::Session(error) => ApplicationError::Persistence(error.to_string()),
        }
    }
}

/// Body of a successful `/api/ask` answer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AskResponse {
    pub reply: String,
    pub location: Location,
    pub places: Vec<Place>,
    pub search_status: SearchStatus,
    #[serde(skip)]
    pub cuisine: CuisineFilter,
    #[serde(skip)]
    pub location_source: LocationSource,
}

/// What one turn asks for, before any lookup happens.
enum TurnIntent {
    Local { cuisine: CuisineFilter },
    Structured { cuisine: CuisineFilter, city: Option<String> },
}

/// Per-message orchestration: cuisine, location with session fallback, place search, reply.
pub struct AgentRuntime {
    extractor: IntentExtractor,
    resolver: LocationResolver,
    places: Arc<dyn PlaceFinder>,
    sessions: Arc<dyn SessionRepository>,
    nlu: Option<Arc<dyn NluClient>>,
    default_location: Location,
}

impl AgentRuntime {
    pub fn new(
        extractor: IntentExtractor,
        resolver: LocationResolver,
        places: Arc<dyn PlaceFinder>,
        sessions: Arc<dyn SessionRepository>,
        default_location: Location,
    ) -> Self {
        Self { extractor, resolver, places, sessions, nlu: None, default_location }
    }

    /// Wires the HTTP collaborators described by `config` around `sessions`.
    pub fn from_config(
        config: &AppConfig,
        sessions: Arc<dyn SessionRepository>,
    ) -> Result<Self, UpstreamError> {
        let keywords = config.intent.keywords.clone();
        let user_agent = config.geocoding.user_agent.as_str();
        let runtime = Self::new(
            IntentExtractor::new(keywords.clone()),
            LocationResolver::new(Arc::new(NominatimGeocoder::new(&config.geocoding)?), keywords),
            Arc::new(OverpassPlaceFinder::new(&config.places, user_agent)?),
            sessions,
            config.search.default_location.clone(),
        );

        Ok(match HttpNluClient::from_config(&config.nlu, user_agent)? {
            Some(nlu) => runtime.with_nlu(Arc::new(nlu)),
            None => runtime,
        })
    }

    pub fn with_nlu(mut self, nlu: Arc<dyn NluClient>) -> Self {
        self.nlu = Some(nlu);
        self
    }

    pub fn nlu_enabled(&self) -> bool {
        self.nlu.is_some()
    }

    pub fn default_location(&self) -> &Location {
        &self.default_location
    }

    pub async fn handle_message(
        &self,
        session_id: &SessionId,
        message: &str,
    ) -> Result<AskResponse, AgentError> {
        let turn = self.interpret(session_id, message).await;

        let (cuisine, resolved) = match turn {
            TurnIntent::Local { cuisine } => {
                (cuisine, self.resolver.resolve_free_text(message).await)
            }
            TurnIntent::Structured { cuisine, city } => {
                let resolved = match city {
                    Some(city) => self.resolver.resolve_city(&city).await,
                    None => None,
                };
                (cuisine, resolved)
            }
        };

        let (location, location_source) = self.settle_location(session_id, resolved).await?;
        let search = self.places.find_places(&location, &cuisine).await;
        let search_status = search.status();
        let reply = compose_reply(&location, location_source, &cuisine, &search);

        info!(
            event_name = "agent.turn.completed",
            session_id = %session_id,
            cuisine = %cuisine,
            location = %location.display_name,
            location_source = location_source.as_str(),
            search_status = ?search_status,
            place_count = search.places().len(),
            "message handled"
        );

        Ok(AskResponse {
            reply,
            location,
            places: search.into_places(),
            search_status,
            cuisine,
            location_source,
        })
    }

    async fn interpret(&self, session_id: &SessionId, message: &str) -> TurnIntent {
        let Some(nlu) = &self.nlu else {
            return TurnIntent::Local { cuisine: self.extractor.extract(message) };
        };

        match nlu.interpret(session_id, message).await {
            Ok(interpretation) => {
                let cuisine = interpretation
                    .cuisine
                    .as_deref()
                    .map(|value| CuisineFilter::parse(&value.trim().to_lowercase()))
                    .unwrap_or_default();
                TurnIntent::Structured { cuisine, city: interpretation.city }
            }
            Err(error) => {
                warn!(
                    event_name = "agent.nlu.fallback",
                    session_id = %session_id,
                    timeout = error.is_timeout(),
                    error = %error,
                    "nlu delegate failed; using local extraction for this turn"
                );
                TurnIntent::Local { cuisine: self.extractor.extract(message) }
            }
        }
    }

    async fn settle_location(
        &self,
        session_id: &SessionId,
        resolved: Option<Location>,
    ) -> Result<(Location, LocationSource), AgentError> {
        if let Some(location) = resolved {
            self.sessions.remember_location(session_id, &location).await?;
            return Ok((location, LocationSource::New));
        }

        match self.sessions.last_location(session_id).await {
            Ok(Some(location)) => return Ok((location, LocationSource::Remembered)),
            Ok(None) => {}
            Err(RepositoryError::Decode(detail)) => {
                warn!(
                    event_name = "agent.session.unreadable_location",
                    session_id = %session_id,
                    detail = %detail,
                    "stored location could not be decoded; ignoring it"
                );
            }
            Err(error) => return Err(error.into()),
        }

        Ok((self.default_location.clone(), LocationSource::Default))
    }
}

fn status_line(location: &Location, source: LocationSource) -> String {
    let name = &location.display_name;
    match source {
        LocationSource::New => format!("Got it, searching around {name}."),
        LocationSource::Remembered => format!("Still searching around {name}."),
        LocationSource::Default => {
            format!("I couldn't spot a city, so I'm searching around {name}.")
        }
    }
}

fn compose_reply(
    location: &Location,
    source: LocationSource,
    cuisine: &CuisineFilter,
    search: &PlaceSearch,
) -> String {
    let summary = match search {
        PlaceSearch::Found(places) => {
            let noun = if places.len() == 1 { "place" } else { "places" };
            if cuisine.is_fallback() {
                format!("I found {} {noun} to eat nearby.", places.len())
            } else {
                format!("I found {} {noun} for {}.", places.len(), cuisine.tags().join(", "))
            }
        }
        PlaceSearch::Empty => {
            "I couldn't find anything matching nearby. Try another cuisine or city.".to_string()
        }
        PlaceSearch::Unavailable(_) => {
            "The map search isn't answering right now, so I have no places to show.".to_string()
        }
    };
    format!("{} {summary}", status_line(location, source))
}
