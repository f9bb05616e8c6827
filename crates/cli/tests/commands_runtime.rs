use std::env;
use std::sync::{Mutex, OnceLock};

use neuralbites_cli::commands::{ask, doctor, migrate};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn doctor_reports_warning_for_default_config_without_secret() {
    with_env(&[], || {
        let report = parse_payload(&doctor::run(true));

        assert_eq!(report["overall_status"], "warn");
        assert_eq!(check(&report, "config_validation")["status"], "pass");
        assert_eq!(check(&report, "session_secret")["status"], "warn");
        assert_eq!(check(&report, "session_store")["status"], "pass");
        assert_eq!(check(&report, "nlu_delegate")["status"], "skipped");
    });
}

#[test]
fn doctor_passes_with_secret_and_sqlite_store() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let database_url = format!("sqlite://{}?mode=rwc", temp_dir.path().join("doctor.db").display());

    with_env(
        &[
            ("NEURALBITES_SESSION_SECRET", "0123456789abcdef0123456789abcdef"),
            ("NEURALBITES_SESSION_BACKEND", "sqlite"),
            ("NEURALBITES_SESSION_DATABASE_URL", &database_url),
        ],
        || {
            let report = parse_payload(&doctor::run(true));

            assert_eq!(report["overall_status"], "pass");
            assert_eq!(check(&report, "session_store")["status"], "pass");
        },
    );
}

#[test]
fn doctor_skips_dependent_checks_when_config_is_invalid() {
    with_env(&[("NEURALBITES_SERVER_PORT", "not-a-port")], || {
        let report = parse_payload(&doctor::run(true));

        assert_eq!(report["overall_status"], "fail");
        assert_eq!(check(&report, "config_validation")["status"], "fail");
        assert_eq!(check(&report, "session_store")["status"], "skipped");

        let human = doctor::run(false);
        assert!(human.starts_with("doctor: one or more readiness checks failed"));
        assert!(human.contains("- [fail] config_validation"));
    });
}

#[test]
fn migrate_returns_success_with_memory_database() {
    with_env(&[("NEURALBITES_SESSION_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_creates_session_database_file() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let database_path = temp_dir.path().join("sessions.db");
    let database_url = format!("sqlite://{}?mode=rwc", database_path.display());

    with_env(&[("NEURALBITES_SESSION_DATABASE_URL", &database_url)], || {
        let result = migrate::run();

        assert_eq!(result.exit_code, 0, "output: {}", result.output);
        assert!(database_path.exists());
    });
}

#[test]
fn migrate_returns_config_failure_for_invalid_backend() {
    with_env(&[("NEURALBITES_SESSION_BACKEND", "redis")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn ask_rejects_blank_message() {
    with_env(&[], || {
        let result = ask::run("   ", None);

        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "input_validation");
    });
}

#[test]
fn ask_searches_around_default_location() {
    let mock_runtime = tokio::runtime::Runtime::new().expect("runtime");
    let server = mock_runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/interpreter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    { "type": "node", "id": 1, "lat": 21.171, "lon": 72.832, "tags": { "name": "Pizza Point" } }
                ]
            })))
            .mount(&server)
            .await;
        server
    });
    let places_url = format!("{}/api/interpreter", server.uri());

    with_env(&[("NEURALBITES_PLACES_BASE_URL", &places_url)], || {
        let result = ask::run("pizza", None);
        assert_eq!(result.exit_code, 0, "output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["data"]["location"]["name"], "Surat");
        assert_eq!(payload["data"]["location_source"], "default");
        assert_eq!(payload["data"]["cuisine"], "pizza");
        assert_eq!(payload["data"]["search_status"], "ok");
        assert_eq!(payload["data"]["places"][0]["name"], "Pizza Point");
        assert!(payload["data"]["session_id"].as_str().is_some());
        assert!(payload["message"]
            .as_str()
            .is_some_and(|reply| reply.starts_with("I couldn't spot a city")));
    });

    drop(server);
}

#[test]
fn ask_reports_unavailable_search_when_places_service_is_down() {
    with_env(&[("NEURALBITES_PLACES_BASE_URL", "http://127.0.0.1:9/api/interpreter")], || {
        let result = ask::run("coffee", Some("operator-session".to_string()));
        assert_eq!(result.exit_code, 0, "output: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["search_status"], "unavailable");
        assert_eq!(payload["data"]["places"], json!([]));
        assert_eq!(payload["data"]["session_id"], "operator-session");
    });
}

fn check<'a>(report: &'a Value, name: &str) -> &'a Value {
    report["checks"]
        .as_array()
        .and_then(|checks| checks.iter().find(|check| check["name"] == name))
        .unwrap_or_else(|| panic!("missing doctor check `{name}`"))
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "NEURALBITES_SERVER_BIND_ADDRESS",
        "NEURALBITES_SERVER_PORT",
        "NEURALBITES_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "NEURALBITES_SESSION_BACKEND",
        "NEURALBITES_SESSION_DATABASE_URL",
        "NEURALBITES_SESSION_MAX_CONNECTIONS",
        "NEURALBITES_SESSION_TIMEOUT_SECS",
        "NEURALBITES_SESSION_SECRET",
        "NEURALBITES_SESSION_COOKIE_NAME",
        "NEURALBITES_GEOCODING_BASE_URL",
        "NEURALBITES_GEOCODING_USER_AGENT",
        "NEURALBITES_GEOCODING_TIMEOUT_SECS",
        "NEURALBITES_PLACES_BASE_URL",
        "NEURALBITES_PLACES_RADIUS_METERS",
        "NEURALBITES_PLACES_MAX_RESULTS",
        "NEURALBITES_PLACES_TIMEOUT_SECS",
        "NEURALBITES_NLU_ENABLED",
        "NEURALBITES_NLU_BASE_URL",
        "NEURALBITES_NLU_API_KEY",
        "NEURALBITES_NLU_TIMEOUT_SECS",
        "NEURALBITES_SEARCH_DEFAULT_LAT",
        "NEURALBITES_SEARCH_DEFAULT_LON",
        "NEURALBITES_SEARCH_DEFAULT_NAME",
        "NEURALBITES_LOGGING_LEVEL",
        "NEURALBITES_LOGGING_FORMAT",
        "NEURALBITES_LOG_LEVEL",
        "NEURALBITES_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
