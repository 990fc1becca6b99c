use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "market=debug,tower_http=debug";

/// Initialize tracing: `RUST_LOG` filter (default `market=debug,tower_http=debug`),
/// compact console output in development and JSON lines in production.
/// Safe to call more than once.
pub fn init_telemetry(environment: &str) {
    let production = matches!(environment.to_lowercase().as_str(), "production" | "prod");

    let console_fmt = (!production).then(|| {
        tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        )
    });
    let json_fmt = production.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
    });

    let result = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(console_fmt)
        .with(json_fmt)
        .try_init();

    match result {
        Ok(()) => tracing::info!(environment = %environment, "Tracing initialized"),
        Err(_) => tracing::debug!("Tracing subscriber already installed"),
    }
}
