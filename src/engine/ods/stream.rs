//! Байтовые потоки: дописываемый `BinaryWriter` и ограниченный курсор
//! `BinaryReader`.
//!
//! Числа фиксированной ширины всегда пишутся и читаются в big-endian через
//! `byteorder::BigEndian`, независимо от архитектуры хоста.

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use byteorder::{BigEndian, ByteOrder};
use ods_error::{ensure, OdsError, OdsResult};

/// Дописываемый буфер в памяти.
///
/// Без пути это чистый scratch-буфер (используется для вложенных блоков);
/// с путём содержимое записывается в файл при явном [`close`](Self::close).
#[derive(Debug, Default)]
pub struct BinaryWriter {
    bytes: Vec<u8>,
    path: Option<PathBuf>,
}

impl BinaryWriter {
    /// Создаёт scratch-буфер.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            path: None,
        }
    }

    /// Создаёт буфер, который будет записан в `path` при `close`. Файл не
    /// открывается до вызова `close`.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            bytes: Vec::new(),
            path: Some(path.into()),
        }
    }

    pub fn write_u8(
        &mut self,
        v: u8,
    ) {
        self.bytes.push(v);
    }

    pub fn write_i8(
        &mut self,
        v: i8,
    ) {
        self.bytes.push(v as u8);
    }

    pub fn write_u16(
        &mut self,
        v: u16,
    ) {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_i16(
        &mut self,
        v: i16,
    ) {
        let mut buf = [0u8; 2];
        BigEndian::write_i16(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_u32(
        &mut self,
        v: u32,
    ) {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_i32(
        &mut self,
        v: i32,
    ) {
        let mut buf = [0u8; 4];
        BigEndian::write_i32(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_i64(
        &mut self,
        v: i64,
    ) {
        let mut buf = [0u8; 8];
        BigEndian::write_i64(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_f32(
        &mut self,
        v: f32,
    ) {
        let mut buf = [0u8; 4];
        BigEndian::write_f32(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_f64(
        &mut self,
        v: f64,
    ) {
        let mut buf = [0u8; 8];
        BigEndian::write_f64(&mut buf, v);
        self.bytes.extend_from_slice(&buf);
    }

    pub fn write_bytes(
        &mut self,
        b: &[u8],
    ) {
        self.bytes.extend_from_slice(b);
    }

    /// Пишет байты строки без префикса длины.
    pub fn write_str(
        &mut self,
        s: &str,
    ) {
        self.write_bytes(s.as_bytes());
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Снимок текущего содержимого.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }

    /// Записывает содержимое в файл назначения, если он задан.
    pub fn close(self) -> OdsResult<()> {
        if let Some(path) = &self.path {
            fs::write(path, &self.bytes)?;
        }
        Ok(())
    }
}

/// Ограниченный курсор над буфером байтов.
///
/// Любое чтение за концом буфера завершается [`OdsError::OutOfData`].
/// Смещения в ошибках абсолютные: вложенный ридер помнит, с какого байта
/// родительского потока он начинается.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: Cow<'a, [u8]>,
    pos: usize,
    base: u64,
}

impl<'a> BinaryReader<'a> {
    /// Ридер над буфером вызывающей стороны.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            pos: 0,
            base: 0,
        }
    }

    /// Ридер, владеющий буфером.
    pub fn from_vec(data: Vec<u8>) -> BinaryReader<'static> {
        BinaryReader {
            data: Cow::Owned(data),
            pos: 0,
            base: 0,
        }
    }

    /// Читает файл целиком в память.
    pub fn from_path(path: impl AsRef<Path>) -> OdsResult<BinaryReader<'static>> {
        let data = fs::read(path)?;
        Ok(BinaryReader::from_vec(data))
    }

    /// Есть ли непрочитанные байты.
    pub fn has_more(&self) -> bool {
        self.pos < self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Позиция относительно начала этого ридера.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Абсолютное смещение курсора в исходном потоке.
    pub fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Забирает `n` байт, сдвигая курсор.
    fn take(
        &mut self,
        n: usize,
    ) -> OdsResult<&[u8]> {
        ensure!(
            n <= self.remaining(),
            OdsError::OutOfData {
                offset: self.offset(),
                needed: n,
                remaining: self.remaining(),
            }
        );
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..start + n])
    }

    pub fn read_u8(&mut self) -> OdsResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> OdsResult<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_u16(&mut self) -> OdsResult<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> OdsResult<i16> {
        Ok(BigEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> OdsResult<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> OdsResult<i32> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn read_i64(&mut self) -> OdsResult<i64> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> OdsResult<f32> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> OdsResult<f64> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }

    /// Читает ровно `n` байт. Длина проверяется до копирования.
    pub fn read_bytes(
        &mut self,
        n: usize,
    ) -> OdsResult<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    /// Читает `n` байт как UTF-8 строку.
    pub fn read_string(
        &mut self,
        n: usize,
    ) -> OdsResult<String> {
        let offset = self.offset();
        let bytes = self.read_bytes(n)?;
        String::from_utf8(bytes).map_err(|source| OdsError::InvalidName { offset, source })
    }

    /// Открывает вложенный ридер ровно на `len` байт и сдвигает курсор за
    /// них. Если осталось меньше `len` байт, возвращает
    /// [`OdsError::TruncatedBlock`].
    pub fn sub_reader(
        &mut self,
        len: u64,
    ) -> OdsResult<BinaryReader<'_>> {
        let available = self.remaining();
        ensure!(
            len <= available as u64,
            OdsError::TruncatedBlock {
                offset: self.offset(),
                declared: len,
                available,
            }
        );
        let base = self.offset();
        let start = self.pos;
        let end = start + len as usize;
        self.pos = end;
        Ok(BinaryReader {
            data: Cow::Borrowed(&self.data[start..end]),
            pos: 0,
            base,
        })
    }
}
