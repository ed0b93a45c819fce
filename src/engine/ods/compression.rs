//! Сжатие и распаковка файла целиком.
//!
//! `none` — тождественная передача байтов, она всегда доступна. Для `gzip` и
//! `zlib` реестр по умолчанию содержит реализации на `flate2`; алгоритм без
//! зарегистрированной реализации даёт [`OdsError::UnsupportedCompression`],
//! без тихого отката на `none`.

use std::{
    borrow::Cow,
    collections::HashMap,
    fmt,
    io::{self, Read, Write},
    str::FromStr,
};

use flate2::{
    read::{GzDecoder, ZlibDecoder},
    write::{GzEncoder, ZlibEncoder},
    Compression,
};
use ods_error::{CompressionOp, OdsError, OdsResult};
use serde::{Deserialize, Serialize};

/// Уровень сжатия по умолчанию: баланс между скоростью и размером.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Предел размера распакованного файла по умолчанию (1 GiB).
pub const DEFAULT_MAX_DECOMPRESSED_LEN: u64 = 1 << 30;

/// Алгоритм сжатия файла.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    #[default]
    None,
    Gzip,
    Zlib,
}

impl CompressionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Zlib => "zlib",
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionType {
    type Err = OdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "gzip" => Ok(Self::Gzip),
            "zlib" => Ok(Self::Zlib),
            other => Err(OdsError::UnsupportedCompression(other.to_string())),
        }
    }
}

/// Реализация сжатия одного алгоритма.
pub trait Compressor: Send + Sync {
    fn algorithm(&self) -> CompressionType;

    fn compress(
        &self,
        data: &[u8],
    ) -> io::Result<Vec<u8>>;

    /// Распаковывает `data`; результат длиннее `limit` байт — ошибка
    /// `InvalidData`.
    fn decompress(
        &self,
        data: &[u8],
        limit: u64,
    ) -> io::Result<Vec<u8>>;
}

/// Читает `reader` до конца, но не больше `limit` байт.
fn read_limited<R: Read>(
    reader: R,
    limit: u64,
) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut out)?;
    if out.len() as u64 > limit {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("decompressed data exceeds {limit} bytes"),
        ));
    }
    Ok(out)
}

/// gzip на `flate2`.
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Compressor for GzipCompressor {
    fn algorithm(&self) -> CompressionType {
        CompressionType::Gzip
    }

    fn compress(
        &self,
        data: &[u8],
    ) -> io::Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(
        &self,
        data: &[u8],
        limit: u64,
    ) -> io::Result<Vec<u8>> {
        read_limited(GzDecoder::new(data), limit)
    }
}

/// zlib на `flate2`.
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    level: Compression,
}

impl ZlibCompressor {
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Compressor for ZlibCompressor {
    fn algorithm(&self) -> CompressionType {
        CompressionType::Zlib
    }

    fn compress(
        &self,
        data: &[u8],
    ) -> io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(
        &self,
        data: &[u8],
        limit: u64,
    ) -> io::Result<Vec<u8>> {
        read_limited(ZlibDecoder::new(data), limit)
    }
}

/// Реестр компрессоров по алгоритму.
pub struct CompressorRegistry {
    compressors: HashMap<CompressionType, Box<dyn Compressor>>,
    max_decompressed_len: u64,
}

impl CompressorRegistry {
    /// Пустой реестр: доступен только `none`.
    pub fn empty() -> Self {
        Self {
            compressors: HashMap::new(),
            max_decompressed_len: DEFAULT_MAX_DECOMPRESSED_LEN,
        }
    }

    /// Ограничивает размер распакованных данных.
    pub fn with_max_decompressed_len(
        mut self,
        limit: u64,
    ) -> Self {
        self.max_decompressed_len = limit;
        self
    }

    pub fn max_decompressed_len(&self) -> u64 {
        self.max_decompressed_len
    }

    /// Реестр с gzip и zlib на заданном уровне сжатия.
    pub fn with_level(level: u32) -> Self {
        let mut registry = Self::empty();
        registry.register(GzipCompressor::new(level));
        registry.register(ZlibCompressor::new(level));
        registry
    }

    /// Регистрирует реализацию, заменяя предыдущую для того же алгоритма.
    /// Реализация для `none` игнорируется: passthrough фиксирован.
    pub fn register<C: Compressor + 'static>(
        &mut self,
        compressor: C,
    ) {
        let algorithm = compressor.algorithm();
        if algorithm != CompressionType::None {
            self.compressors.insert(algorithm, Box::new(compressor));
        }
    }

    pub fn unregister(
        &mut self,
        algorithm: CompressionType,
    ) -> bool {
        self.compressors.remove(&algorithm).is_some()
    }

    pub fn supports(
        &self,
        algorithm: CompressionType,
    ) -> bool {
        algorithm == CompressionType::None || self.compressors.contains_key(&algorithm)
    }

    fn get(
        &self,
        algorithm: CompressionType,
    ) -> OdsResult<&dyn Compressor> {
        self.compressors
            .get(&algorithm)
            .map(Box::as_ref)
            .ok_or_else(|| OdsError::UnsupportedCompression(algorithm.to_string()))
    }

    /// Сжимает буфер. Для `none` возвращает те же байты без копирования.
    pub fn compress<'a>(
        &self,
        algorithm: CompressionType,
        data: &'a [u8],
    ) -> OdsResult<Cow<'a, [u8]>> {
        if algorithm == CompressionType::None {
            return Ok(Cow::Borrowed(data));
        }
        self.get(algorithm)?
            .compress(data)
            .map(Cow::Owned)
            .map_err(|source| OdsError::Compression {
                operation: CompressionOp::Compress,
                algorithm: algorithm.to_string(),
                source,
            })
    }

    /// Распаковывает буфер не длиннее `max_decompressed_len`. Для `none`
    /// возвращает вход как есть.
    pub fn decompress(
        &self,
        algorithm: CompressionType,
        data: Vec<u8>,
    ) -> OdsResult<Vec<u8>> {
        if algorithm == CompressionType::None {
            return Ok(data);
        }
        self.get(algorithm)?
            .decompress(&data, self.max_decompressed_len)
            .map_err(|source| OdsError::Compression {
                operation: CompressionOp::Decompress,
                algorithm: algorithm.to_string(),
                source,
            })
    }
}

impl Default for CompressorRegistry {
    fn default() -> Self {
        Self::with_level(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl fmt::Debug for CompressorRegistry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let mut algorithms: Vec<_> = self.compressors.keys().map(|a| a.as_str()).collect();
        algorithms.sort_unstable();
        f.debug_struct("CompressorRegistry")
            .field("algorithms", &algorithms)
            .field("max_decompressed_len", &self.max_decompressed_len)
            .finish()
    }
}
