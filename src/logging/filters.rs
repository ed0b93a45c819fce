use tracing_subscriber::EnvFilter;

use crate::logging::config::LoggingConfig;

/// `RUST_LOG`, если задан, иначе директива из конфигурации; при
/// некорректной директиве — `info`.
pub fn build_filter_from_config(config: &LoggingConfig) -> EnvFilter {
    if let Ok(env_filter) = EnvFilter::try_from_default_env() {
        return env_filter;
    }
    filter_or_info(&config.build_filter_directive())
}

fn filter_or_info(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter directive '{directive}': {e}; falling back to 'info'");
        EnvFilter::new("info")
    })
}
