use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use aseobi_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG_FAILURE};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::raw(
                EXIT_CONFIG_FAILURE,
                format!("config validation failed: {error}"),
            )
        }
    };

    let sources = SourceResolver::detect();
    let whatsapp = &config.whatsapp;

    let entries = vec![
        Entry {
            key: "whatsapp.api_version",
            value: whatsapp.api_version.clone(),
            env_keys: &["ASEOBI_WHATSAPP_API_VERSION", "WHATSAPP_CLOUD_API_VERSION"],
        },
        Entry {
            key: "whatsapp.phone_number_id",
            value: or_unset(&whatsapp.phone_number_id),
            env_keys: &["ASEOBI_WHATSAPP_PHONE_NUMBER_ID", "WHATSAPP_CLOUD_API_PHONE_NUMBER_ID"],
        },
        Entry {
            key: "whatsapp.access_token",
            value: redact_secret(&whatsapp.access_token),
            env_keys: &["ASEOBI_WHATSAPP_ACCESS_TOKEN", "WHATSAPP_CLOUD_API_ACCESS_TOKEN"],
        },
        Entry {
            key: "whatsapp.verify_token",
            value: redact_secret(&whatsapp.verify_token),
            env_keys: &[
                "ASEOBI_WHATSAPP_VERIFY_TOKEN",
                "WHATSAPP_CLOUD_API_WEBHOOK_VERIFICATION_TOKEN",
            ],
        },
        Entry {
            key: "whatsapp.app_secret",
            value: whatsapp
                .app_secret
                .as_ref()
                .map(redact_secret)
                .unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["ASEOBI_WHATSAPP_APP_SECRET"],
        },
        Entry {
            key: "whatsapp.graph_base_url",
            value: whatsapp.graph_base_url.clone(),
            env_keys: &["ASEOBI_WHATSAPP_GRAPH_BASE_URL"],
        },
        Entry {
            key: "whatsapp.timeout_secs",
            value: whatsapp.timeout_secs.to_string(),
            env_keys: &["ASEOBI_WHATSAPP_TIMEOUT_SECS"],
        },
        Entry {
            key: "whatsapp.dry_run",
            value: whatsapp.dry_run.to_string(),
            env_keys: &["ASEOBI_WHATSAPP_DRY_RUN"],
        },
        Entry {
            key: "catalog.path",
            value: config
                .catalog
                .path
                .as_deref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<builtin>".to_string()),
            env_keys: &["ASEOBI_CATALOG_PATH"],
        },
        Entry {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["ASEOBI_SERVER_BIND_ADDRESS"],
        },
        Entry {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["ASEOBI_SERVER_PORT"],
        },
        Entry {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["ASEOBI_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        Entry {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["ASEOBI_LOGGING_LEVEL", "ASEOBI_LOG_LEVEL"],
        },
        Entry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["ASEOBI_LOGGING_FORMAT", "ASEOBI_LOG_FORMAT"],
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.into_iter().map(|entry| {
        render_line(entry.key, &entry.value, sources.source_of(entry.key, entry.env_keys))
    }));
    lines.push(format!("- messages endpoint = {}", config.messages_url()));

    CommandResult::raw(0, lines.join("\n"))
}

struct Entry {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

struct SourceResolver {
    file_path: Option<PathBuf>,
    file_doc: Option<Value>,
}

impl SourceResolver {
    fn detect() -> Self {
        let file_path = detect_config_path();
        let file_doc = load_config_file_doc(file_path.as_deref());
        Self { file_path, file_doc }
    }

    fn source_of(&self, key_path: &str, env_keys: &[&str]) -> String {
        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("aseobi.toml"), PathBuf::from("config/aseobi.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "<unset>".to_string()
    } else {
        value.to_string()
    }
}

/// Keeps a short prefix so operators can tell tokens apart without exposing them.
fn redact_secret(secret: &SecretString) -> String {
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if trimmed.chars().count() > 8 {
        let prefix: String = trimmed.chars().take(4).collect();
        return format!("{prefix}***");
    }

    "<redacted>".to_string()
}
