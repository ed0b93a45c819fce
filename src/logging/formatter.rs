use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::Layer as LayerTrait,
    registry::LookupSpan,
};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Build formatter на основе конфигурации.
/// Возвращаем boxed trait-объект, чтобы стереть конкретный тип формата
/// (json/pretty/compact).
pub fn build_formatter<S, W>(
    config: &LoggingConfig,
    writer: W,
) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(config.ansi)
        .with_target(config.with_target)
        .with_line_number(config.with_line_numbers);

    match config.format {
        LogFormat::Json => Box::new(layer.json().with_current_span(true)),
        LogFormat::Pretty => Box::new(layer.pretty().with_span_events(FmtSpan::CLOSE)),
        LogFormat::Compact => Box::new(layer.compact()),
    }
}
