use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub whatsapp: WhatsAppConfig,
    pub catalog: CatalogConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    pub api_version: String,
    pub phone_number_id: String,
    pub access_token: SecretString,
    pub verify_token: SecretString,
    pub app_secret: Option<SecretString>,
    pub graph_base_url: String,
    pub timeout_secs: u64,
    pub dry_run: bool,
}

#[derive(Clone, Debug, Default)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
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
    pub log_level: Option<String>,
    pub whatsapp_phone_number_id: Option<String>,
    pub whatsapp_access_token: Option<String>,
    pub whatsapp_verify_token: Option<String>,
    pub whatsapp_app_secret: Option<String>,
    pub whatsapp_graph_base_url: Option<String>,
    pub whatsapp_dry_run: Option<bool>,
    pub catalog_path: Option<PathBuf>,
    pub server_port: Option<u16>,
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

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            whatsapp: WhatsAppConfig {
                api_version: "v21.0".to_string(),
                phone_number_id: String::new(),
                access_token: String::new().into(),
                verify_token: String::new().into(),
                app_secret: None,
                graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
                timeout_secs: 15,
                dry_run: false,
            },
            catalog: CatalogConfig::default(),
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                graceful_shutdown_secs: 10,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("aseobi.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Endpoint that outbound messages are posted to.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.whatsapp.graph_base_url.trim_end_matches('/'),
            self.whatsapp.api_version,
            self.whatsapp.phone_number_id
        )
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(whatsapp) = patch.whatsapp {
            if let Some(api_version) = whatsapp.api_version {
                self.whatsapp.api_version = api_version;
            }
            if let Some(phone_number_id) = whatsapp.phone_number_id {
                self.whatsapp.phone_number_id = phone_number_id;
            }
            if let Some(access_token) = whatsapp.access_token {
                self.whatsapp.access_token = secret_value(access_token);
            }
            if let Some(verify_token) = whatsapp.verify_token {
                self.whatsapp.verify_token = secret_value(verify_token);
            }
            if let Some(app_secret) = whatsapp.app_secret {
                self.whatsapp.app_secret = Some(secret_value(app_secret));
            }
            if let Some(graph_base_url) = whatsapp.graph_base_url {
                self.whatsapp.graph_base_url = graph_base_url;
            }
            if let Some(timeout_secs) = whatsapp.timeout_secs {
                self.whatsapp.timeout_secs = timeout_secs;
            }
            if let Some(dry_run) = whatsapp.dry_run {
                self.whatsapp.dry_run = dry_run;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = Some(path);
            }
        }

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
        let api_version = read_env("ASEOBI_WHATSAPP_API_VERSION")
            .or_else(|| read_env("WHATSAPP_CLOUD_API_VERSION"));
        if let Some(value) = api_version {
            self.whatsapp.api_version = value;
        }
        let phone_number_id = read_env("ASEOBI_WHATSAPP_PHONE_NUMBER_ID")
            .or_else(|| read_env("WHATSAPP_CLOUD_API_PHONE_NUMBER_ID"));
        if let Some(value) = phone_number_id {
            self.whatsapp.phone_number_id = value;
        }
        let access_token = read_env("ASEOBI_WHATSAPP_ACCESS_TOKEN")
            .or_else(|| read_env("WHATSAPP_CLOUD_API_ACCESS_TOKEN"));
        if let Some(value) = access_token {
            self.whatsapp.access_token = secret_value(value);
        }
        let verify_token = read_env("ASEOBI_WHATSAPP_VERIFY_TOKEN")
            .or_else(|| read_env("WHATSAPP_CLOUD_API_WEBHOOK_VERIFICATION_TOKEN"));
        if let Some(value) = verify_token {
            self.whatsapp.verify_token = secret_value(value);
        }
        if let Some(value) = read_env("ASEOBI_WHATSAPP_APP_SECRET") {
            self.whatsapp.app_secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("ASEOBI_WHATSAPP_GRAPH_BASE_URL") {
            self.whatsapp.graph_base_url = value;
        }
        if let Some(value) = read_env("ASEOBI_WHATSAPP_TIMEOUT_SECS") {
            self.whatsapp.timeout_secs = parse_u64("ASEOBI_WHATSAPP_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("ASEOBI_WHATSAPP_DRY_RUN") {
            self.whatsapp.dry_run = parse_bool("ASEOBI_WHATSAPP_DRY_RUN", &value)?;
        }

        if let Some(value) = read_env("ASEOBI_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("ASEOBI_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("ASEOBI_SERVER_PORT") {
            self.server.port = parse_u16("ASEOBI_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("ASEOBI_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("ASEOBI_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level = read_env("ASEOBI_LOGGING_LEVEL").or_else(|| read_env("ASEOBI_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ASEOBI_LOGGING_FORMAT").or_else(|| read_env("ASEOBI_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(phone_number_id) = overrides.whatsapp_phone_number_id {
            self.whatsapp.phone_number_id = phone_number_id;
        }
        if let Some(access_token) = overrides.whatsapp_access_token {
            self.whatsapp.access_token = secret_value(access_token);
        }
        if let Some(verify_token) = overrides.whatsapp_verify_token {
            self.whatsapp.verify_token = secret_value(verify_token);
        }
        if let Some(app_secret) = overrides.whatsapp_app_secret {
            self.whatsapp.app_secret = Some(secret_value(app_secret));
        }
        if let Some(graph_base_url) = overrides.whatsapp_graph_base_url {
            self.whatsapp.graph_base_url = graph_base_url;
        }
        if let Some(dry_run) = overrides.whatsapp_dry_run {
            self.whatsapp.dry_run = dry_run;
        }
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = Some(catalog_path);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_whatsapp(&self.whatsapp)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("aseobi.toml"), PathBuf::from("config/aseobi.toml")]
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

fn validate_whatsapp(whatsapp: &WhatsAppConfig) -> Result<(), ConfigError> {
    if !whatsapp.api_version.starts_with('v') {
        return Err(ConfigError::Validation(format!(
            "whatsapp.api_version must look like `v21.0`, got `{}`",
            whatsapp.api_version
        )));
    }

    if whatsapp.verify_token.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "whatsapp.verify_token is required. Use the value entered as the Verify Token \
             in the Meta app dashboard > WhatsApp > Configuration"
                .to_string(),
        ));
    }

    if !whatsapp.dry_run {
        if whatsapp.phone_number_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "whatsapp.phone_number_id is required unless whatsapp.dry_run is enabled. \
                 Find it under Meta app dashboard > WhatsApp > API Setup"
                    .to_string(),
            ));
        }
        if whatsapp.access_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "whatsapp.access_token is required unless whatsapp.dry_run is enabled".to_string(),
            ));
        }
    }

    let base_url = whatsapp.graph_base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "whatsapp.graph_base_url must start with http:// or https://".to_string(),
        ));
    }

    if whatsapp.timeout_secs == 0 || whatsapp.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "whatsapp.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
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

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    whatsapp: Option<WhatsAppPatch>,
    catalog: Option<CatalogPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct WhatsAppPatch {
    api_version: Option<String>,
    phone_number_id: Option<String>,
    access_token: Option<String>,
    verify_token: Option<String>,
    app_secret: Option<String>,
    graph_base_url: Option<String>,
    timeout_secs: Option<u64>,
    dry_run: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
