use std::sync::Arc;

use aseobi_core::config::AppConfig;
use aseobi_core::{Catalog, CatalogError};
use aseobi_whatsapp::gateway::{CloudApiGateway, DryRunGateway, GatewayError, MessageGateway};
use aseobi_whatsapp::processor::WebhookProcessor;
use axum::Router;
use thiserror::Error;
use tracing::info;

use crate::{health, webhook};

pub struct Application {
    pub config: AppConfig,
    pub catalog: Arc<Catalog>,
    pub processor: Arc<WebhookProcessor>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("catalog could not be loaded: {0}")]
    Catalog(#[from] CatalogError),
    #[error("message gateway could not be initialized: {0}")]
    Gateway(#[from] GatewayError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let catalog = Arc::new(Catalog::load(config.catalog.path.as_deref())?);
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        source = config
            .catalog
            .path
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "builtin".to_owned()),
        categories = catalog.len(),
        products = catalog.product_count(),
        "catalog loaded"
    );

    let gateway: Arc<dyn MessageGateway> = if config.whatsapp.dry_run {
        Arc::new(DryRunGateway::new())
    } else {
        Arc::new(CloudApiGateway::from_config(&config)?)
    };
    info!(
        event_name = "system.bootstrap.gateway_ready",
        correlation_id = "bootstrap",
        gateway_mode = gateway.mode(),
        "message gateway initialized"
    );

    let processor = Arc::new(WebhookProcessor::new(catalog.clone(), gateway));
    Ok(Application { config, catalog, processor })
}

impl Application {
    pub fn router(&self) -> Router {
        let webhook_state = webhook::WebhookState::new(
            self.processor.clone(),
            self.config.whatsapp.verify_token.clone(),
            self.config.whatsapp.app_secret.clone(),
        );

        webhook::router(webhook_state)
            .merge(health::router(self.catalog.clone(), self.processor.gateway_mode()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use aseobi_core::config::AppConfig;

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    fn dry_run_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.whatsapp.verify_token = "verify-me".to_owned().into();
        config.whatsapp.dry_run = true;
        config
    }

    #[test]
    fn dry_run_bootstrap_uses_builtin_catalog() {
        let app = bootstrap_with_config(dry_run_config()).expect("bootstrap");

        assert_eq!(app.catalog.len(), 3);
        assert_eq!(app.catalog.product_count(), 6);
        assert_eq!(app.processor.gateway_mode(), "dry_run");
    }

    #[test]
    fn live_bootstrap_selects_cloud_api_gateway() {
        let mut config = dry_run_config();
        config.whatsapp.dry_run = false;
        config.whatsapp.phone_number_id = "PN-1".to_owned();
        config.whatsapp.access_token = "EAAG-test".to_owned().into();

        let app = bootstrap_with_config(config).expect("bootstrap");
        assert_eq!(app.processor.gateway_mode(), "cloud_api");
    }

    #[test]
    fn missing_catalog_file_is_a_bootstrap_error() {
        let mut config = dry_run_config();
        config.catalog.path = Some(PathBuf::from("/nonexistent/catalog.toml"));

        let result = bootstrap_with_config(config);
        assert!(matches!(result, Err(BootstrapError::Catalog(_))));
    }
}
