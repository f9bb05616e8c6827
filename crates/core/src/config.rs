use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::location::Location;
use crate::domain::session::MIN_SESSION_KEY_BYTES;
use crate::intent::{KeywordEntry, KeywordTable};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub geocoding: GeocodingConfig,
    pub places: PlacesConfig,
    pub nlu: NluConfig,
    pub search: SearchConfig,
    pub intent: IntentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
    pub secret: Option<SecretString>,
    pub cookie_name: String,
}

#[derive(Clone, Debug)]
pub struct GeocodingConfig {
    pub base_url: String,
    /// Sent as `User-Agent` to every upstream, not only the geocoder.
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct PlacesConfig {
    pub base_url: String,
    pub radius_meters: u32,
    pub max_results: usize,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct NluConfig {
    pub enabled: bool,
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub default_location: Location,
}

#[derive(Clone, Debug, Default)]
pub struct IntentConfig {
    pub keywords: KeywordTable,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    Memory,
    Sqlite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub session_backend: Option<SessionBackend>,
    pub session_database_url: Option<String>,
    pub session_secret: Option<String>,
    pub geocoding_base_url: Option<String>,
    pub places_base_url: Option<String>,
    pub nlu_enabled: Option<bool>,
    pub nlu_base_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
            },
            session: SessionConfig {
                backend: SessionBackend::Memory,
                database_url: "sqlite://neuralbites.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
                secret: None,
                cookie_name: "nb_session".to_string(),
            },
            geocoding: GeocodingConfig {
                base_url: "https://nominatim.openstreetmap.org".to_string(),
                user_agent: "NeuralBites/1.0".to_string(),
                timeout_secs: 10,
            },
            places: PlacesConfig {
                base_url: "https://overpass-api.de/api/interpreter".to_string(),
                radius_meters: 3000,
                max_results: 10,
                timeout_secs: 10,
            },
            nlu: NluConfig { enabled: false, base_url: None, api_key: None, timeout_secs: 10 },
            search: SearchConfig { default_location: Location::new(21.1702, 72.8311, "Surat") },
            intent: IntentConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl SessionBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
        }
    }
}

impl std::str::FromStr for SessionBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::Validation(format!(
                "unsupported session backend `{other}` (expected memory|sqlite)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("neuralbites.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(session) = patch.session {
            if let Some(backend) = session.backend {
                self.session.backend = backend;
            }
            if let Some(database_url) = session.database_url {
                self.session.database_url = database_url;
            }
            if let Some(max_connections) = session.max_connections {
                self.session.max_connections = max_connections;
            }
            if let Some(timeout_secs) = session.timeout_secs {
                self.session.timeout_secs = timeout_secs;
            }
            if let Some(session_secret_value) = session.secret {
                self.session.secret = Some(secret_value(session_secret_value));
            }
            if let Some(cookie_name) = session.cookie_name {
                self.session.cookie_name = cookie_name;
            }
        }

        if let Some(geocoding) = patch.geocoding {
            if let Some(base_url) = geocoding.base_url {
                self.geocoding.base_url = base_url;
            }
            if let Some(user_agent) = geocoding.user_agent {
                self.geocoding.user_agent = user_agent;
            }
            if let Some(timeout_secs) = geocoding.timeout_secs {
                self.geocoding.timeout_secs = timeout_secs;
            }
        }

        if let Some(places) = patch.places {
            if let Some(base_url) = places.base_url {
                self.places.base_url = base_url;
            }
            if let Some(radius_meters) = places.radius_meters {
                self.places.radius_meters = radius_meters;
            }
            if let Some(max_results) = places.max_results {
                self.places.max_results = max_results;
            }
            if let Some(timeout_secs) = places.timeout_secs {
                self.places.timeout_secs = timeout_secs;
            }
        }

        if let Some(nlu) = patch.nlu {
            if let Some(enabled) = nlu.enabled {
                self.nlu.enabled = enabled;
            }
            if let Some(base_url) = nlu.base_url {
                self.nlu.base_url = Some(base_url);
            }
            if let Some(nlu_api_key_value) = nlu.api_key {
                self.nlu.api_key = Some(secret_value(nlu_api_key_value));
            }
            if let Some(timeout_secs) = nlu.timeout_secs {
                self.nlu.timeout_secs = timeout_secs;
            }
        }

        if let Some(search) = patch.search {
            if let Some(default_location) = search.default_location {
                let current = &self.search.default_location;
                self.search.default_location = Location::new(
                    default_location.lat.unwrap_or(current.latitude),
                    default_location.lon.unwrap_or(current.longitude),
                    default_location.name.unwrap_or_else(|| current.display_name.clone()),
                );
            }
        }

        if let Some(intent) = patch.intent {
            if let Some(keywords) = intent.keywords {
                self.intent.keywords = KeywordTable::new(keywords);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("NEURALBITES_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("NEURALBITES_SERVER_PORT") {
            self.server.port = parse_u16("NEURALBITES_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("NEURALBITES_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("NEURALBITES_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("NEURALBITES_SESSION_BACKEND") {
            self.session.backend = value.parse()?;
        }
        if let Some(value) = read_env("NEURALBITES_SESSION_DATABASE_URL") {
            self.session.database_url = value;
        }
        if let Some(value) = read_env("NEURALBITES_SESSION_MAX_CONNECTIONS") {
            self.session.max_connections =
                parse_u32("NEURALBITES_SESSION_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("NEURALBITES_SESSION_TIMEOUT_SECS") {
            self.session.timeout_secs = parse_u64("NEURALBITES_SESSION_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("NEURALBITES_SESSION_SECRET") {
            self.session.secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("NEURALBITES_SESSION_COOKIE_NAME") {
            self.session.cookie_name = value;
        }

        if let Some(value) = read_env("NEURALBITES_GEOCODING_BASE_URL") {
            self.geocoding.base_url = value;
        }
        if let Some(value) = read_env("NEURALBITES_GEOCODING_USER_AGENT") {
            self.geocoding.user_agent = value;
        }
        if let Some(value) = read_env("NEURALBITES_GEOCODING_TIMEOUT_SECS") {
            self.geocoding.timeout_secs = parse_u64("NEURALBITES_GEOCODING_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("NEURALBITES_PLACES_BASE_URL") {
            self.places.base_url = value;
        }
        if let Some(value) = read_env("NEURALBITES_PLACES_RADIUS_METERS") {
            self.places.radius_meters = parse_u32("NEURALBITES_PLACES_RADIUS_METERS", &value)?;
        }
        if let Some(value) = read_env("NEURALBITES_PLACES_MAX_RESULTS") {
            self.places.max_results = parse_usize("NEURALBITES_PLACES_MAX_RESULTS", &value)?;
        }
        if let Some(value) = read_env("NEURALBITES_PLACES_TIMEOUT_SECS") {
            self.places.timeout_secs = parse_u64("NEURALBITES_PLACES_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("NEURALBITES_NLU_ENABLED") {
            self.nlu.enabled = parse_bool("NEURALBITES_NLU_ENABLED", &value)?;
        }
        if let Some(value) = read_env("NEURALBITES_NLU_BASE_URL") {
            self.nlu.base_url = Some(value);
        }
        if let Some(value) = read_env("NEURALBITES_NLU_API_KEY") {
            self.nlu.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("NEURALBITES_NLU_TIMEOUT_SECS") {
            self.nlu.timeout_secs = parse_u64("NEURALBITES_NLU_TIMEOUT_SECS", &value)?;
        }

        let default_lat = read_env("NEURALBITES_SEARCH_DEFAULT_LAT");
        let default_lon = read_env("NEURALBITES_SEARCH_DEFAULT_LON");
        let default_name = read_env("NEURALBITES_SEARCH_DEFAULT_NAME");
        if default_lat.is_some() || default_lon.is_some() || default_name.is_some() {
            let current = &self.search.default_location;
            let latitude = match default_lat {
                Some(value) => parse_f64("NEURALBITES_SEARCH_DEFAULT_LAT", &value)?,
                None => current.latitude,
            };
            let longitude = match default_lon {
                Some(value) => parse_f64("NEURALBITES_SEARCH_DEFAULT_LON", &value)?,
                None => current.longitude,
            };
            let name = default_name.unwrap_or_else(|| current.display_name.clone());
            self.search.default_location = Location::new(latitude, longitude, name);
        }

        let log_level =
            read_env("NEURALBITES_LOGGING_LEVEL").or_else(|| read_env("NEURALBITES_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("NEURALBITES_LOGGING_FORMAT").or_else(|| read_env("NEURALBITES_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(backend) = overrides.session_backend {
            self.session.backend = backend;
        }
        if let Some(database_url) = overrides.session_database_url {
            self.session.database_url = database_url;
        }
        if let Some(session_secret) = overrides.session_secret {
            self.session.secret = Some(secret_value(session_secret));
        }
        if let Some(base_url) = overrides.geocoding_base_url {
            self.geocoding.base_url = base_url;
        }
        if let Some(base_url) = overrides.places_base_url {
            self.places.base_url = base_url;
        }
        if let Some(enabled) = overrides.nlu_enabled {
            self.nlu.enabled = enabled;
        }
        if let Some(base_url) = overrides.nlu_base_url {
            self.nlu.base_url = Some(base_url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_session(&self.session)?;
        validate_geocoding(&self.geocoding)?;
        validate_places(&self.places)?;
        validate_nlu(&self.nlu)?;
        validate_search(&self.search)?;
        validate_intent(&self.intent)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("neuralbites.toml"), PathBuf::from("config/neuralbites.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://")
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.backend == SessionBackend::Sqlite {
        let url = session.database_url.trim();
        let sqlite_url =
            url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
        if !sqlite_url {
            return Err(ConfigError::Validation(
                "session.database_url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                    .to_string(),
            ));
        }
    }

    if session.max_connections == 0 {
        return Err(ConfigError::Validation(
            "session.max_connections must be greater than zero".to_string(),
        ));
    }

    if session.timeout_secs == 0 || session.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "session.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if let Some(secret) = &session.secret {
        let length = secret.expose_secret().len();
        if length < MIN_SESSION_KEY_BYTES {
            return Err(ConfigError::Validation(format!(
                "session.secret must be at least {MIN_SESSION_KEY_BYTES} bytes (got {length}). Generate one with `openssl rand -hex 32`"
            )));
        }
    }

    let cookie_name = session.cookie_name.trim();
    let valid_cookie_name = !cookie_name.is_empty()
        && cookie_name.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'));
    if !valid_cookie_name {
        return Err(ConfigError::Validation(
            "session.cookie_name must be non-empty and use only [A-Za-z0-9_-]".to_string(),
        ));
    }

    Ok(())
}

fn validate_geocoding(geocoding: &GeocodingConfig) -> Result<(), ConfigError> {
    if !is_http_url(&geocoding.base_url) {
        return Err(ConfigError::Validation(
            "geocoding.base_url must start with http:// or https://".to_string(),
        ));
    }

    if geocoding.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "geocoding.user_agent is required; public Nominatim rejects anonymous clients"
                .to_string(),
        ));
    }

    if geocoding.timeout_secs == 0 || geocoding.timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "geocoding.timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    Ok(())
}

fn validate_places(places: &PlacesConfig) -> Result<(), ConfigError> {
    if !is_http_url(&places.base_url) {
        return Err(ConfigError::Validation(
            "places.base_url must start with http:// or https://".to_string(),
        ));
    }

    if !(100..=50_000).contains(&places.radius_meters) {
        return Err(ConfigError::Validation(
            "places.radius_meters must be in range 100..=50000".to_string(),
        ));
    }

    if places.max_results == 0 || places.max_results > 100 {
        return Err(ConfigError::Validation(
            "places.max_results must be in range 1..=100".to_string(),
        ));
    }

    if places.timeout_secs == 0 || places.timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "places.timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    Ok(())
}

fn validate_nlu(nlu: &NluConfig) -> Result<(), ConfigError> {
    if nlu.timeout_secs == 0 || nlu.timeout_secs > 60 {
        return Err(ConfigError::Validation("nlu.timeout_secs must be in range 1..=60".to_string()));
    }

    if nlu.enabled {
        let base_url = nlu.base_url.as_deref().unwrap_or_default();
        if !is_http_url(base_url) {
            return Err(ConfigError::Validation(
                "nlu.base_url (http:// or https://) is required when nlu.enabled is true"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    let location = &search.default_location;
    if !location.has_valid_coordinates() {
        return Err(ConfigError::Validation(
            "search.default_location lat/lon must be within -90..=90 / -180..=180".to_string(),
        ));
    }

    if location.display_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "search.default_location.name must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_intent(intent: &IntentConfig) -> Result<(), ConfigError> {
    if intent.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "intent.keywords must contain at least one keyword".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    session: Option<SessionPatch>,
    geocoding: Option<GeocodingPatch>,
    places: Option<PlacesPatch>,
    nlu: Option<NluPatch>,
    search: Option<SearchPatch>,
    intent: Option<IntentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    backend: Option<SessionBackend>,
    database_url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
    secret: Option<String>,
    cookie_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeocodingPatch {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PlacesPatch {
    base_url: Option<String>,
    radius_meters: Option<u32>,
    max_results: Option<usize>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct NluPatch {
    enabled: Option<bool>,
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    default_location: Option<LocationPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LocationPatch {
    lat: Option<f64>,
    lon: Option<f64>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IntentPatch {
    keywords: Option<Vec<KeywordEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
