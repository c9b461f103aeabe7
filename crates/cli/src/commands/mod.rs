pub mod catalog;
pub mod config;
pub mod doctor;
pub mod preview;

use std::path::Path;

use aseobi_core::config::{AppConfig, LoadOptions};
use aseobi_core::Catalog;
use serde::Serialize;

pub const EXIT_CONFIG_FAILURE: u8 = 2;
pub const EXIT_CATALOG_FAILURE: u8 = 3;

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
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn raw(exit_code: u8, output: impl Into<String>) -> Self {
        Self { exit_code, output: output.into() }
    }
}

/// Catalog from an explicit file, or from whatever the loaded config points at.
pub(crate) fn resolve_catalog(
    command: &str,
    path: Option<&Path>,
) -> Result<Catalog, CommandResult> {
    if let Some(path) = path {
        return Catalog::from_file(path).map_err(|error| {
            CommandResult::failure(command, "catalog_load", error.to_string(), EXIT_CATALOG_FAILURE)
        });
    }

    let config = AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG_FAILURE,
        )
    })?;

    Catalog::load(config.catalog.path.as_deref()).map_err(|error| {
        CommandResult::failure(command, "catalog_load", error.to_string(), EXIT_CATALOG_FAILURE)
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
