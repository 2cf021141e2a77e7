//! Search Gateway Main Entry Point
//!
//! Connects to the search cluster, ensures the configured index exists and
//! reports how many documents it holds.

use dotenv::dotenv;
use search_gateway::{Dependencies, GatewayStartupError};
use search_gateway_shared::{Lookup, PageRequest};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("search_gateway=info,search_gateway_repository=info")
    });

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "search-gateway",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "search-gateway",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), GatewayStartupError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting search gateway");

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let index = deps.settings.index.as_str();
    match deps
        .gateway
        .list_documents(index, PageRequest::new(1, 1))
        .await
    {
        Ok(Lookup::Found(page)) => {
            info!(index = %index, documents = page.total, "Search gateway ready");
            Ok(())
        }
        Ok(Lookup::NotFound) => {
            info!(index = %index, documents = 0, "Search gateway ready");
            Ok(())
        }
        Err(e) => {
            error!(index = %index, error = %e, "Search gateway failed");
            Err(e.into())
        }
    }
}
