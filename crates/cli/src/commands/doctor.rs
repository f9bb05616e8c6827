use neuralbites_core::config::{AppConfig, LoadOptions, SessionBackend};
use neuralbites_db::{connect_with_settings, ping};
use serde::Serialize;

use crate::commands::current_thread_runtime;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 4] =
    ["session_secret", "session_store", "upstream_endpoints", "nlu_delegate"];

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_session_secret(&config));
            checks.push(check_session_store(&config));
            checks.push(check_upstream_endpoints(&config));
            checks.push(check_nlu_delegate(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(DEPENDENT_CHECKS.into_iter().map(|name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
        }
    }

    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let any_warn = checks.iter().any(|check| check.status == CheckStatus::Warn);
    let (overall_status, summary) = match (any_fail, any_warn) {
        (true, _) => (CheckStatus::Fail, "doctor: one or more readiness checks failed"),
        (false, true) => (CheckStatus::Warn, "doctor: ready, with warnings"),
        (false, false) => (CheckStatus::Pass, "doctor: all readiness checks passed"),
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_session_secret(config: &AppConfig) -> DoctorCheck {
    match &config.session.secret {
        Some(_) => DoctorCheck {
            name: "session_secret",
            status: CheckStatus::Pass,
            details: "session.secret is set; cookies survive restarts".to_string(),
        },
        None => DoctorCheck {
            name: "session_secret",
            status: CheckStatus::Warn,
            details: "session.secret is unset; a random key is used and sessions reset on restart"
                .to_string(),
        },
    }
}

fn check_session_store(config: &AppConfig) -> DoctorCheck {
    if config.session.backend == SessionBackend::Memory {
        return DoctorCheck {
            name: "session_store",
            status: CheckStatus::Pass,
            details: "in-memory session store (no database needed)".to_string(),
        };
    }

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "session_store",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.session.database_url,
            config.session.max_connections,
            config.session.timeout_secs,
        )
        .await
        .map_err(|error| format!("failed to connect to session database: {error}"))?;

        let pinged = ping(&pool).await.map_err(|error| format!("session database ping failed: {error}"));
        pool.close().await;
        pinged
    });

    match result {
        Ok(()) => DoctorCheck {
            name: "session_store",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.session.database_url),
        },
        Err(error) => DoctorCheck { name: "session_store", status: CheckStatus::Fail, details: error },
    }
}

fn check_upstream_endpoints(config: &AppConfig) -> DoctorCheck {
    DoctorCheck {
        name: "upstream_endpoints",
        status: CheckStatus::Pass,
        details: format!(
            "geocoding `{}` ({}s), places `{}` ({}s, radius {}m, cap {})",
            config.geocoding.base_url,
            config.geocoding.timeout_secs,
            config.places.base_url,
            config.places.timeout_secs,
            config.places.radius_meters,
            config.places.max_results
        ),
    }
}

fn check_nlu_delegate(config: &AppConfig) -> DoctorCheck {
    match (config.nlu.enabled, config.nlu.base_url.as_deref()) {
        (false, _) => DoctorCheck {
            name: "nlu_delegate",
            status: CheckStatus::Skipped,
            details: "nlu.enabled is false; local keyword extraction is used".to_string(),
        },
        (true, Some(base_url)) => DoctorCheck {
            name: "nlu_delegate",
            status: CheckStatus::Pass,
            details: format!(
                "delegating to `{base_url}` ({})",
                if config.nlu.api_key.is_some() { "with api key" } else { "without api key" }
            ),
        },
        (true, None) => DoctorCheck {
            name: "nlu_delegate",
            status: CheckStatus::Fail,
            details: "nlu.enabled is true but nlu.base_url is missing".to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
