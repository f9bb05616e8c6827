//! Agent runtime for the restaurant chat.
//!
//! Everything that talks to the outside world for a single chat turn lives
//! here:
//! - `geocoding` turns free text or a city name into a `Location` (Nominatim)
//! - `places` searches nearby eateries for a cuisine filter (Overpass)
//! - `nlu` optionally delegates slot extraction to an external service
//! - `runtime` composes them with session memory into one reply
//!
//! Upstream failures never escape this crate. They degrade to a fallback
//! location or an empty place list; only session-memory failures are errors.

pub mod geocoding;
pub mod nlu;
pub mod places;
pub mod runtime;
pub mod upstream;

pub use geocoding::{Geocoder, LocationResolver, NominatimGeocoder};
pub use nlu::{HttpNluClient, NluClient, NluInterpretation};
pub use places::{OverpassPlaceFinder, PlaceFinder, PlaceSearch, SearchStatus};
pub use runtime::{AgentError, AgentRuntime, AskResponse};
pub use upstream::UpstreamError;
