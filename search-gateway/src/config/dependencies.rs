//! Dependency initialization and wiring for the search gateway.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use search_gateway_repository::{ConnectionConfig, OpenSearchProvider, SearchGateway};

use super::settings::{ConnectionMode, GatewaySettings};
use crate::GatewayStartupError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Gateway connected to a reachable cluster.
    pub gateway: SearchGateway,
    /// Settings the gateway was built from.
    pub settings: GatewaySettings,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`GatewaySettings::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Connected gateway with the configured index in place
    /// * `Err(GatewayStartupError)` - If configuration is invalid, the cluster is
    ///   unreachable in fail-fast mode, or the index cannot be created
    pub async fn new() -> Result<Self, GatewayStartupError> {
        Self::from_settings(GatewaySettings::from_env()?).await
    }

    /// Initialize dependencies from already parsed settings.
    pub async fn from_settings(settings: GatewaySettings) -> Result<Self, GatewayStartupError> {
        info!(
            search_url = %settings.url,
            index = %settings.index,
            authenticated = settings.credentials.is_some(),
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let gateway = Self::connect(
            &settings.connection_config(),
            settings.connection_mode,
            settings.retry_interval,
        )
        .await?;

        info!("Search cluster connection established");

        // Exits if the index cannot be created
        let created = gateway.ensure_index_exists(&settings.index).await?;
        info!(index = %settings.index, created, "Index ready");

        Ok(Self { gateway, settings })
    }

    /// Connect to the search cluster with retry logic based on connection mode.
    async fn connect(
        config: &ConnectionConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<SearchGateway, GatewayStartupError> {
        loop {
            match Self::try_connect(config).await {
                Ok(gateway) => return Ok(gateway),
                Err(e) => match mode {
                    ConnectionMode::FailFast => return Err(e),
                    ConnectionMode::Retry => {
                        warn!(
                            search_url = %config.url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to the search cluster, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Build the provider and require a successful connectivity check.
    async fn try_connect(config: &ConnectionConfig) -> Result<SearchGateway, GatewayStartupError> {
        let provider = OpenSearchProvider::new(config).await.map_err(|e| {
            GatewayStartupError::config(format!("Failed to create search provider: {}", e))
        })?;

        let gateway = SearchGateway::new(Arc::new(provider));
        match gateway.check_connectivity().await {
            Ok(status) if status.is_connected() => Ok(gateway),
            Ok(status) => Err(GatewayStartupError::connection(status.to_string())),
            Err(e) => Err(GatewayStartupError::connection(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail_fast_settings(url: &'static str) -> GatewaySettings {
        GatewaySettings::from_lookup(|key| match key {
            "SEARCH_URL" => Some(url.to_string()),
            "SEARCH_CONNECTION_MODE" => Some("fail-fast".to_string()),
            "SEARCH_MAX_ATTEMPTS" => Some("1".to_string()),
            "SEARCH_REQUEST_TIMEOUT_SECS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fail_fast_unreachable_cluster() {
        let result = Dependencies::from_settings(fail_fast_settings("http://127.0.0.1:1")).await;
        assert!(matches!(result, Err(GatewayStartupError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_fail_fast_invalid_url() {
        let result = Dependencies::from_settings(fail_fast_settings("not a url")).await;
        assert!(matches!(result, Err(GatewayStartupError::ConfigError(_))));
    }
}
