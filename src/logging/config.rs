use std::{env, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Формат вывода событий.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Настройки логирования.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень для событий крейта (`trace`..`error`).
    pub level: String,
    /// Уровень для всех остальных целей.
    pub default_level: String,
    pub format: LogFormat,
    pub ansi: bool,
    pub with_target: bool,
    pub with_line_numbers: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            default_level: "warn".to_string(),
            format: LogFormat::default(),
            ansi: true,
            with_target: true,
            with_line_numbers: false,
        }
    }
}

impl LoggingConfig {
    /// Применяет `ODS_LOG_LEVEL` и `ODS_LOG_FORMAT`, если они заданы.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("ODS_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(format) = env::var("ODS_LOG_FORMAT")
            .ok()
            .and_then(|f| f.parse().ok())
        {
            self.format = format;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
        for level in [&self.level, &self.default_level] {
            if !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(format!("invalid log level: {level}"));
            }
        }
        Ok(())
    }

    /// Директива `EnvFilter`, например `warn,ods=info`.
    pub fn build_filter_directive(&self) -> String {
        format!(
            "{},{}={}",
            self.default_level,
            env!("CARGO_CRATE_NAME"),
            self.level
        )
    }
}
