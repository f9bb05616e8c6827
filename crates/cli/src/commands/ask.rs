use std::sync::Arc;

use neuralbites_agent::{AgentRuntime, AskResponse};
use neuralbites_core::config::{AppConfig, LoadOptions, SessionBackend};
use neuralbites_core::domain::cuisine::CuisineFilter;
use neuralbites_core::domain::location::LocationSource;
use neuralbites_core::domain::session::SessionId;
use neuralbites_db::{InMemorySessionRepository, SessionRepository, SqlSessionRepository};
use serde::Serialize;

use crate::commands::{current_thread_runtime, migrated_session_pool, CommandResult};

#[derive(Serialize)]
struct AskOutput<'a> {
    session_id: &'a str,
    cuisine: &'a CuisineFilter,
    location_source: LocationSource,
    #[serde(flatten)]
    response: &'a AskResponse,
}

pub fn run(message: &str, session: Option<String>) -> CommandResult {
    let message = message.trim();
    if message.is_empty() {
        return CommandResult::failure("ask", "input_validation", "message must not be empty", 2);
    }

    let session_id = match session.as_deref().map(str::trim) {
        Some("") => {
            return CommandResult::failure(
                "ask",
                "input_validation",
                "--session must not be empty",
                2,
            );
        }
        Some(raw) => SessionId(raw.to_string()),
        None => SessionId::generate(),
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let sessions: Arc<dyn SessionRepository> = match config.session.backend {
            SessionBackend::Memory => Arc::new(InMemorySessionRepository::default()),
            SessionBackend::Sqlite => {
                let pool =
                    migrated_session_pool(&config).await.map_err(|(class, message)| {
                        (class, message, if class == "db_connectivity" { 4 } else { 5 })
                    })?;
                Arc::new(SqlSessionRepository::new(pool))
            }
        };

        let agent = AgentRuntime::from_config(&config, sessions)
            .map_err(|error| ("upstream_client", error.to_string(), 6u8))?;
        agent
            .handle_message(&session_id, message)
            .await
            .map_err(|error| ("session_store", error.to_string(), 7u8))
    });

    let response = match result {
        Ok(response) => response,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("ask", error_class, message, exit_code);
        }
    };

    let output = AskOutput {
        session_id: session_id.as_str(),
        cuisine: &response.cuisine,
        location_source: response.location_source,
        response: &response,
    };
    match serde_json::to_value(&output) {
        Ok(data) => CommandResult::success_with_data("ask", response.reply.clone(), Some(data)),
        Err(error) => CommandResult::failure(
            "ask",
            "serialization",
            format!("failed to serialize answer: {error}"),
            8,
        ),
    }
}
