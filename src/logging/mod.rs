pub mod config;
mod filters;
mod formatter;

use std::io;

pub use config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Инициализация логирования с конфигурацией.
///
/// Устанавливает глобальный subscriber; повторный вызов возвращает ошибку.
pub fn init_logging(
    mut config: LoggingConfig
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    config.apply_env_overrides();
    config.validate()?;

    let env_filter = filters::build_filter_from_config(&config);
    let fmt_layer = formatter::build_formatter(&config, io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = %config.format,
        "Logging system initialized"
    );
    Ok(())
}
