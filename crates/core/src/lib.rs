pub mod config;
pub mod domain;
pub mod errors;
pub mod intent;

pub use domain::cuisine::{CuisineFilter, FALLBACK_CUISINE};
pub use domain::location::{Location, LocationSource};
pub use domain::place::{Place, UNKNOWN_PLACE_NAME};
pub use domain::session::{SessionId, SessionKeyError, SessionSigner};
pub use errors::{ApplicationError, InterfaceError};
pub use intent::{IntentExtractor, KeywordEntry, KeywordTable};
