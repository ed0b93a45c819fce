use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde_repr")]
use serde_repr::{Deserialize_repr, Serialize_repr};
#[cfg(feature = "strum")]
use strum_macros::{AsRefStr, EnumIter};

/// Коды статуса для категоризации ошибок.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных, переданных вызывающей стороной
/// - 5xxx: Хранилище и сжатие
/// - 6xxx: IO
/// - 8xxx: Ошибки бинарного формата
///
/// # Реализация:
/// - `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`.
/// - опционально: `strum` для `AsRefStr`/`EnumIter` (feature = "strum").
/// - опционально: `serde_repr` для сериализации в виде числового значения
///   (feature = "serde_repr").
#[cfg_attr(feature = "strum", derive(AsRefStr, EnumIter))]
#[cfg_attr(feature = "serde_repr", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Unknown = 1000,
    Unsupported = 1001,
    Internal = 1003,
    InvalidArgs = 1004,

    // === 2xxx: Ошибки данных ===
    NotFound = 2000,
    InvalidValue = 2004,

    // === 5xxx: Хранилище ===
    CorruptedData = 5002,
    SerializationFailed = 5003,
    CompressionFailed = 5005,

    // === 6xxx: IO ===
    Io = 6000,
    UnexpectedEof = 6007,

    // === 8xxx: Формат ===
    InvalidUtf8 = 8004,
    SizeLimit = 8007,
    DepthLimit = 8008,
    UnknownTag = 8012,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Пытается получить вариант `StatusCode` из `u32`.
    ///
    /// Использует `TryFrom<u32>` из `num_enum`; возвращает `None`, если
    /// значение не соответствует ни одному варианту.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Вернёт `true`, если переданный `code` означает успешный результат.
    pub fn is_success(code: u32) -> bool {
        Self::Success as u32 == code
    }

    /// Ошибка вызывающей стороны: неверные аргументы или значения в дереве
    /// тегов (диапазон 2xxx плюс `InvalidArgs`).
    pub fn is_client_error(&self) -> bool {
        (2000..=2999).contains(&self.code()) || matches!(self, Self::InvalidArgs)
    }

    /// Ошибка окружения: файловая система, кодек сжатия, внутренние сбои.
    pub fn is_server_error(&self) -> bool {
        matches!(self.code(), 1000..=1999 | 5000..=7999) && !self.is_client_error()
    }

    /// Повреждённый или враждебный бинарный поток (диапазон 8xxx и
    /// `CorruptedData`).
    pub fn is_format_error(&self) -> bool {
        (8000..=8999).contains(&self.code()) || matches!(self, Self::CorruptedData)
    }

    /// Требуется ли логировать как критическую ошибку.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Internal | Self::CorruptedData)
    }

    /// Рекомендуемый уровень логирования для данного кода.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Trace,
            Self::NotFound => LogLevel::Debug,
            Self::InvalidArgs | Self::InvalidValue | Self::Unsupported => LogLevel::Info,
            Self::Internal | Self::CorruptedData => LogLevel::Error,
            _ => LogLevel::Warn,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        // Если включён feature "strum", используем human-readable имя (AsRefStr).
        // Иначе — Debug-имя.
        #[cfg(feature = "strum")]
        {
            write!(f, "{} ({})", self.as_ref(), self.code())
        }
        #[cfg(not(feature = "strum"))]
        {
            write!(f, "{:?} ({})", self, self.code())
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
