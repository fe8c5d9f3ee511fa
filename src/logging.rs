//! Tracing initialization
//! Configures the global subscriber from LOG_LEVEL / LOG_FORMAT before
//! configuration is parsed, so startup failures are captured too.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));

    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "plain".to_string());
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
