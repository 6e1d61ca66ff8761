//! Structured logging configuration.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`. Records emitted by the bracket library
/// through the `log` facade are forwarded into the same subscriber.
///
/// # Example
///
/// ```no_run
/// use cb_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a bracket action performed by an organizer
pub fn log_bracket_event(action: &str, tournament_id: &str, detail: &str) {
    tracing::info!(
        action = action,
        tournament_id = tournament_id,
        "BRACKET: {}",
        detail
    );
}
