//! Десериализация тегов из конвертного формата ODS.
//!
//! Каждый тег читается через вложенный ридер ровно на длину его блока:
//! заявленная длина проверяется по оставшимся байтам до любого выделения
//! памяти, а после разбора блок должен быть прочитан полностью.

use ods_error::{bail, ensure, OdsError, OdsResult};
use tracing::trace;

use super::{
    encode::DEFAULT_MAX_DEPTH,
    stream::BinaryReader,
    tag::{Tag, TagValue},
    tags::TagId,
};

/// Декодировщик тегов с ограничением глубины.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(
        mut self,
        max_depth: usize,
    ) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Читает один тег (с поддеревом) из `r`.
    pub fn decode(
        &self,
        r: &mut BinaryReader<'_>,
    ) -> OdsResult<Tag> {
        self.decode_at(r, 0)
    }

    /// Читает теги подряд, пока в `r` остаются байты.
    pub fn decode_all(
        &self,
        r: &mut BinaryReader<'_>,
    ) -> OdsResult<Vec<Tag>> {
        let mut tags = Vec::new();
        while r.has_more() {
            tags.push(self.decode_at(r, 0)?);
        }
        Ok(tags)
    }

    /// Декодирует ровно один тег из среза; лишние байты после него —
    /// ошибка.
    pub fn decode_slice(
        &self,
        data: &[u8],
    ) -> OdsResult<Tag> {
        let mut r = BinaryReader::new(data);
        let tag = self.decode_at(&mut r, 0)?;
        ensure!(
            !r.has_more(),
            OdsError::TrailingBytes {
                offset: r.offset(),
                remaining: r.remaining(),
            }
        );
        Ok(tag)
    }

    fn decode_at(
        &self,
        r: &mut BinaryReader<'_>,
        depth: usize,
    ) -> OdsResult<Tag> {
        ensure!(
            depth <= self.max_depth,
            OdsError::MaxDepth {
                depth,
                limit: self.max_depth,
            }
        );

        let id_offset = r.offset();
        let raw_id = r.read_u8()?;
        // ID 0 в потоке не пишется никогда: это повреждение, как и
        // неизвестный ID.
        let id = match TagId::try_from(raw_id) {
            Ok(id) if id != TagId::Invalid => id,
            _ => bail!(OdsError::UnknownTagId {
                id: raw_id,
                offset: id_offset,
            }),
        };

        let block_len = r.read_u32()?;
        let mut block = r.sub_reader(u64::from(block_len))?;

        let name_len = block.read_u16()? as usize;
        let name = block.read_string(name_len)?;

        let value = match id {
            TagId::Int => TagValue::Int(block.read_i32()?),
            TagId::Float => TagValue::Float(block.read_f32()?),
            TagId::Double => TagValue::Double(block.read_f64()?),
            TagId::Long => TagValue::Long(block.read_i64()?),
            TagId::Char => TagValue::Char(block.read_u8()?),
            TagId::Byte => TagValue::Byte(block.read_i8()?),
            TagId::Vector => TagValue::Vector(self.decode_children(&mut block, depth)?),
            TagId::Object => TagValue::Object(self.decode_children(&mut block, depth)?),
            TagId::Invalid => bail!(OdsError::UnknownTagId {
                id: raw_id,
                offset: id_offset,
            }),
        };

        ensure!(
            !block.has_more(),
            OdsError::TrailingBytes {
                offset: block.offset(),
                remaining: block.remaining(),
            }
        );

        trace!(id = %id, name = %name, block_len, depth, "decoded tag");
        Ok(Tag::new(name, value))
    }

    fn decode_children(
        &self,
        block: &mut BinaryReader<'_>,
        depth: usize,
    ) -> OdsResult<Vec<Tag>> {
        let mut children = Vec::new();
        while block.has_more() {
            children.push(self.decode_at(block, depth + 1)?);
        }
        Ok(children)
    }
}

/// Читает один тег декодировщиком по умолчанию.
pub fn decode(r: &mut BinaryReader<'_>) -> OdsResult<Tag> {
    Decoder::default().decode(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ods::encode::{ChildNames, Encoder};

    fn roundtrip(tag: &Tag) -> Tag {
        let bytes = Encoder::default().encode_to_vec(tag).unwrap();
        Decoder::default().decode_slice(&bytes).unwrap()
    }

    #[test]
    fn test_decode_int_big_endian() {
        let data = [2, 0, 0, 0, 6, 0, 0, 0x01, 0x02, 0x03, 0x04];
        let tag = Decoder::default().decode_slice(&data).unwrap();
        assert_eq!(tag.as_int(), Some(0x01020304));
        assert_eq!(tag.name(), "");
    }

    #[test]
    fn test_roundtrip_scalars() {
        let tags = [
            Tag::int("meInt", 420),
            Tag::float("mefloat", 90.888_89),
            Tag::double("yeetwef", 90.564),
            Tag::long("tst", -2890),
            Tag::char("c", 0xFF),
            Tag::byte("yeet", -44),
        ];
        for tag in &tags {
            assert_eq!(&roundtrip(tag), tag);
        }
    }

    #[test]
    fn test_roundtrip_nested_preserves_names() {
        let tag = Tag::object(
            "root",
            vec![
                Tag::vector("list", vec![Tag::int("a", 1), Tag::long("b", 2)]),
                Tag::object("inner", vec![Tag::char("grade", b'A')]),
                Tag::vector("empty", vec![]),
            ],
        );
        assert_eq!(roundtrip(&tag), tag);
    }

    /// Тест проверяет поведение режима Blank: вложенные имена при чтении
    /// пустые, корневое имя и значения сохраняются.
    #[test]
    fn test_roundtrip_blank_child_names() {
        let tag = Tag::vector("Test", vec![Tag::int("x", 20), Tag::int("y", 30)]);
        let bytes = Encoder::default()
            .with_child_names(ChildNames::Blank)
            .encode_to_vec(&tag)
            .unwrap();
        let decoded = Decoder::default().decode_slice(&bytes).unwrap();

        assert_eq!(decoded.name(), "Test");
        let children = decoded.children().unwrap();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.name().is_empty()));
        assert_eq!(children[0].as_int(), Some(20));
        assert_eq!(children[1].as_int(), Some(30));
    }

    #[test]
    fn test_unknown_tag_id() {
        let data = [5, 0, 0, 0, 2, 0, 0];
        let err = Decoder::default().decode_slice(&data).unwrap_err();
        assert!(matches!(err, OdsError::UnknownTagId { id: 5, offset: 0 }));
    }

    #[test]
    fn test_invalid_tag_id_rejected() {
        let data = [0, 0, 0, 0, 2, 0, 0];
        let err = Decoder::default().decode_slice(&data).unwrap_err();
        assert!(matches!(err, OdsError::UnknownTagId { id: 0, offset: 0 }));
        assert!(err.is_corrupt_data());
    }

    /// Тест проверяет, что ID 0 внутри Object даёт смещение самого байта ID.
    #[test]
    fn test_invalid_tag_id_in_child() {
        // Object "" с одним дочерним тегом, у которого ID 0.
        let data = [11, 0, 0, 0, 9, 0, 0, 0, 0, 0, 0, 2, 0, 0];
        let err = Decoder::default().decode_slice(&data).unwrap_err();
        assert!(matches!(err, OdsError::UnknownTagId { id: 0, offset: 7 }));
    }

    #[test]
    fn test_truncated_block() {
        let mut bytes = Encoder::default()
            .encode_to_vec(&Tag::long("l", 7))
            .unwrap();
        bytes.pop();
        let err = Decoder::default().decode_slice(&bytes).unwrap_err();
        assert!(matches!(
            err,
            OdsError::TruncatedBlock {
                offset: 5,
                declared: 11,
                available: 10
            }
        ));
    }

    /// Тест проверяет, что огромная заявленная длина отвергается до
    /// выделения памяти.
    #[test]
    fn test_huge_declared_length() {
        let data = [9, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0];
        let err = Decoder::default().decode_slice(&data).unwrap_err();
        assert!(matches!(
            err,
            OdsError::TruncatedBlock {
                declared: 0xFFFF_FFFF,
                ..
            }
        ));
    }

    #[test]
    fn test_trailing_bytes_in_block() {
        // Int с блоком на 1 байт длиннее нагрузки.
        let data = [2, 0, 0, 0, 7, 0, 0, 0, 0, 0, 1, 0xAA];
        let err = Decoder::default().decode_slice(&data).unwrap_err();
        assert!(matches!(
            err,
            OdsError::TrailingBytes {
                offset: 11,
                remaining: 1
            }
        ));
    }

    #[test]
    fn test_block_too_short_for_payload() {
        // Long с блоком, в котором только 4 байта нагрузки.
        let data = [6, 0, 0, 0, 6, 0, 0, 0, 0, 0, 1];
        let err = Decoder::default().decode_slice(&data).unwrap_err();
        assert!(matches!(err, OdsError::OutOfData { needed: 8, .. }));
    }

    #[test]
    fn test_name_length_exceeds_block() {
        let data = [8, 0, 0, 0, 3, 0, 9, 1];
        let err = Decoder::default().decode_slice(&data).unwrap_err();
        assert!(matches!(
            err,
            OdsError::OutOfData {
                needed: 9,
                remaining: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_utf8_name() {
        let data = [8, 0, 0, 0, 5, 0, 2, 0xC3, 0x28, 1];
        let err = Decoder::default().decode_slice(&data).unwrap_err();
        assert!(matches!(err, OdsError::InvalidName { offset: 7, .. }));
    }

    #[test]
    fn test_max_depth_rejects_deep_nesting() {
        let mut tag = Tag::vector("", vec![]);
        for _ in 0..10 {
            tag = Tag::vector("", vec![tag]);
        }
        let bytes = Encoder::default().encode_to_vec(&tag).unwrap();

        assert!(Decoder::new().with_max_depth(10).decode_slice(&bytes).is_ok());
        let err = Decoder::new()
            .with_max_depth(9)
            .decode_slice(&bytes)
            .unwrap_err();
        assert!(matches!(err, OdsError::MaxDepth { depth: 10, limit: 9 }));
    }

    #[test]
    fn test_decode_all_roots() {
        let mut out = crate::engine::ods::stream::BinaryWriter::new();
        let encoder = Encoder::default();
        encoder.encode(&Tag::int("a", 1), &mut out).unwrap();
        encoder.encode(&Tag::byte("b", 2), &mut out).unwrap();

        let mut r = BinaryReader::new(out.as_bytes());
        let tags = Decoder::default().decode_all(&mut r).unwrap();
        assert_eq!(tags, vec![Tag::int("a", 1), Tag::byte("b", 2)]);
    }

    #[test]
    fn test_decode_slice_trailing_root_bytes() {
        let mut bytes = Encoder::default().encode_to_vec(&Tag::int("a", 1)).unwrap();
        bytes.push(0);
        assert!(matches!(
            Decoder::default().decode_slice(&bytes),
            Err(OdsError::TrailingBytes { remaining: 1, .. })
        ));
    }

    #[test]
    fn test_free_decode() {
        let bytes = Encoder::default().encode_to_vec(&Tag::char("c", b'z')).unwrap();
        let mut r = BinaryReader::new(&bytes);
        assert_eq!(decode(&mut r).unwrap(), Tag::char("c", b'z'));
    }
}
