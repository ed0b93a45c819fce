use std::path::Path;

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::engine::ods::{
    compression::{CompressionType, DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DECOMPRESSED_LEN},
    encode::{ChildNames, DEFAULT_MAX_DEPTH},
};

/// Префикс переменных окружения: `ODS_COMPRESSION`, `ODS_MAX_DEPTH` и т.д.
pub const ENV_PREFIX: &str = "ODS";

/// Настройки хранилища ODS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdsSettings {
    /// Алгоритм сжатия файла.
    pub compression: CompressionType,
    /// Уровень сжатия gzip/zlib, 0..=9.
    pub compression_level: u32,
    /// Предел вложенности при кодировании и декодировании.
    pub max_depth: usize,
    /// Имена дочерних тегов на диске.
    pub child_names: ChildNames,
    /// Предел размера файла после распаковки, в байтах.
    pub max_decompressed_len: u64,
}

impl Default for OdsSettings {
    fn default() -> Self {
        Self {
            compression: CompressionType::None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_depth: DEFAULT_MAX_DEPTH,
            child_names: ChildNames::Preserve,
            max_decompressed_len: DEFAULT_MAX_DECOMPRESSED_LEN,
        }
    }
}

impl OdsSettings {
    /// Значения по умолчанию, переопределённые переменными `ODS_*`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(None, Environment::with_prefix(ENV_PREFIX))
    }

    /// Как [`OdsSettings::load`], но сначала читает файл (формат по
    /// расширению). Переменные окружения важнее файла.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_sources(Some(path.as_ref()), Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(
        file: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = defaults()?;
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        let settings: Self = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Message("max_depth must be positive".into()));
        }
        if self.max_decompressed_len == 0 {
            return Err(ConfigError::Message(
                "max_decompressed_len must be positive".into(),
            ));
        }
        if self.compression_level > 9 {
            return Err(ConfigError::Message(format!(
                "compression_level must be in 0..=9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }
}

fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    let defaults = OdsSettings::default();
    Config::builder()
        .set_default("compression", defaults.compression.as_str())?
        .set_default("compression_level", i64::from(defaults.compression_level))?
        .set_default("max_depth", defaults.max_depth as i64)?
        .set_default("child_names", "preserve")?
        .set_default(
            "max_decompressed_len",
            i64::try_from(defaults.max_decompressed_len).unwrap_or(i64::MAX),
        )
}
