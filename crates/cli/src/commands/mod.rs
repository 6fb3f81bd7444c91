pub mod catalog;
pub mod config;
pub mod doctor;
pub mod render;
pub mod session;

use std::future::Future;

use furnish_client::{FetchCell, ViewScope};
use furnish_core::config::ConfigError;
use furnish_core::errors::FetchError;
use furnish_core::fetch::FetchState;
use serde::Serialize;
use tokio::runtime::Runtime;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_CATALOG_UNAVAILABLE: u8 = 3;
pub const EXIT_NOT_FOUND: u8 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn json<T: Serialize>(command: &str, payload: &T) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(
                command,
                "serialization",
                error.to_string(),
                EXIT_FAILURE,
                OutputFormat::Json,
            ),
        }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        format: OutputFormat,
    ) -> Self {
        let message = message.into();
        if format == OutputFormat::Text {
            return Self { exit_code, output: message };
        }

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn config_failure(command: &str, error: &ConfigError, format: OutputFormat) -> Self {
        Self::failure(
            command,
            "config_validation",
            format!("config validation failed: {error}"),
            EXIT_CONFIG,
            format,
        )
    }

    /// Fetch failures carry the banner text, never the transport detail.
    pub fn fetch_failure(command: &str, error: &FetchError, format: OutputFormat) -> Self {
        let exit_code =
            if error.is_not_found() { EXIT_NOT_FOUND } else { EXIT_CATALOG_UNAVAILABLE };
        Self::failure(command, error.error_class(), error.user_message(), exit_code, format)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn runtime() -> Result<Runtime, std::io::Error> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}

/// Loads one page through a fetch cell bound to `scope`.
pub(crate) async fn load_view<T, F>(
    scope: &ViewScope,
    name: &'static str,
    request: F,
) -> Result<T, FetchError>
where
    T: Clone + Send + Sync,
    F: Future<Output = Result<T, FetchError>>,
{
    let cell = FetchCell::new(name);
    match cell.load(scope, request).await {
        FetchState::Success(value) => Ok(value),
        FetchState::Error(error) => Err(error),
        FetchState::Idle | FetchState::Loading => Err(FetchError::Cancelled),
    }
}
