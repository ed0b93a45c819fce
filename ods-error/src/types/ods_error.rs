use std::{any::Any, io, string::FromUtf8Error};

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Тип операции сжатия для контекста ошибки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionOp {
    Compress,
    Decompress,
}

/// Ошибка кодека тегов и файлового фасада.
///
/// Все ошибки данных возвращаются вызывающей стороне как отдельные варианты;
/// смещения (`offset`) абсолютные, от начала распакованного потока.
#[derive(Debug, Error)]
pub enum OdsError {
    /// Ошибка файловой системы, без изменений.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Чтение за концом буфера.
    #[error("Out of data at offset {offset}: need {needed} bytes, {remaining} remaining")]
    OutOfData {
        offset: u64,
        needed: usize,
        remaining: usize,
    },

    /// Байт идентификатора вне закрытого набора тегов.
    #[error("Unknown tag id 0x{id:02X} at offset {offset}")]
    UnknownTagId { id: u8, offset: u64 },

    /// Заявленная длина блока больше, чем осталось байт.
    #[error("Truncated block at offset {offset}: declared {declared} bytes, {available} available")]
    TruncatedBlock {
        offset: u64,
        declared: u64,
        available: usize,
    },

    /// После разбора блока остались непрочитанные байты.
    #[error("Trailing bytes in block at offset {offset}: {remaining} unread")]
    TrailingBytes { offset: u64, remaining: usize },

    /// Тег, который нельзя сериализовать (Invalid).
    #[error("Tag `{name}` with id {id} cannot be serialized")]
    UnsupportedTag { id: u8, name: String },

    /// Для алгоритма не зарегистрирован компрессор.
    #[error("No compressor registered for `{0}`")]
    UnsupportedCompression(String),

    /// Компрессор отверг данные.
    #[error("{operation:?} with `{algorithm}` failed: {source}")]
    Compression {
        operation: CompressionOp,
        algorithm: String,
        #[source]
        source: io::Error,
    },

    /// Превышена глубина вложенности составных тегов.
    #[error("Nesting depth {depth} exceeds limit {limit}")]
    MaxDepth { depth: usize, limit: usize },

    /// Имя не помещается в 2-байтовый префикс длины.
    #[error("Tag name is {len} bytes, limit is {limit}")]
    NameTooLong { len: usize, limit: usize },

    /// Блок не помещается в 4-байтовый префикс длины.
    #[error("Block of tag `{name}` is {len} bytes, limit is {limit}")]
    BlockTooLarge { name: String, len: usize, limit: u64 },

    /// Имя тега в потоке не является UTF-8.
    #[error("Tag name at offset {offset} is not valid UTF-8: {source}")]
    InvalidName {
        offset: u64,
        #[source]
        source: FromUtf8Error,
    },
}

impl OdsError {
    /// Повреждённая структура потока: неизвестный тег, обрезанный или
    /// переполненный блок, невалидное имя, слишком глубокая вложенность.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            Self::OutOfData { .. }
                | Self::UnknownTagId { .. }
                | Self::TruncatedBlock { .. }
                | Self::TrailingBytes { .. }
                | Self::InvalidName { .. }
                | Self::MaxDepth { .. }
        )
    }

    /// Абсолютное смещение в потоке, если оно известно.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::OutOfData { offset, .. }
            | Self::UnknownTagId { offset, .. }
            | Self::TruncatedBlock { offset, .. }
            | Self::TrailingBytes { offset, .. }
            | Self::InvalidName { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    /// Возвращает recovery hint для пользователя.
    pub fn recovery_hint(&self) -> Option<&'static str> {
        match self {
            Self::TruncatedBlock { .. } | Self::OutOfData { .. } => {
                Some("File may be truncated. Check file integrity")
            }
            Self::UnknownTagId { .. } | Self::TrailingBytes { .. } => {
                Some("File may be corrupted or saved with a different compression")
            }
            Self::UnsupportedCompression(_) => {
                Some("Register a compressor for this algorithm before loading")
            }
            Self::MaxDepth { .. } => Some("Increase max_depth if the nesting is legitimate"),
            _ => None,
        }
    }
}

impl ErrorExt for OdsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io(e) if e.kind() == io::ErrorKind::NotFound => StatusCode::NotFound,
            Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => StatusCode::UnexpectedEof,
            Self::Io(_) => StatusCode::Io,
            Self::OutOfData { .. } => StatusCode::UnexpectedEof,
            Self::UnknownTagId { .. } => StatusCode::UnknownTag,
            Self::TruncatedBlock { .. } | Self::TrailingBytes { .. } => StatusCode::CorruptedData,
            Self::UnsupportedTag { .. } => StatusCode::InvalidValue,
            Self::UnsupportedCompression(_) => StatusCode::Unsupported,
            Self::Compression { .. } => StatusCode::CompressionFailed,
            Self::MaxDepth { .. } => StatusCode::DepthLimit,
            Self::NameTooLong { .. } | Self::BlockTooLarge { .. } => StatusCode::SizeLimit,
            Self::InvalidName { .. } => StatusCode::InvalidUtf8,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
