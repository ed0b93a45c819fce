//! Сериализация тегов в конвертный формат ODS.
//!
//! ```text
//! [id: u8][block_len: u32 BE][name_len: u16 BE][name][payload]
//! ```
//!
//! Длина блока известна только после записи тела, поэтому имя и нагрузка
//! сначала пишутся во временный `BinaryWriter`, затем длина и сам блок
//! переносятся в родительский поток.

use ods_error::{bail, ensure, OdsError, OdsResult};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{
    stream::BinaryWriter,
    tag::{Tag, TagValue},
    tags::{MAX_BLOCK_LEN, MAX_NAME_LEN},
};

/// Максимальная глубина вложенности по умолчанию.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Какие имена получают дочерние теги Vector и Object на диске.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildNames {
    /// Каждый дочерний тег пишется со своим именем.
    #[default]
    Preserve,
    /// Каждый дочерний тег пишется с пустым именем (совместимо с файлами
    /// ранних версий формата). Дерево вызывающей стороны не изменяется.
    Blank,
}

/// Кодировщик тегов с ограничением глубины.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    max_depth: usize,
    child_names: ChildNames,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            child_names: ChildNames::default(),
        }
    }
}

impl Encoder {
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

    pub fn with_child_names(
        mut self,
        child_names: ChildNames,
    ) -> Self {
        self.child_names = child_names;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn child_names(&self) -> ChildNames {
        self.child_names
    }

    /// Пишет тег (и всё его поддерево) в `out`.
    ///
    /// При ошибке `out` может содержать частично записанный тег.
    pub fn encode(
        &self,
        tag: &Tag,
        out: &mut BinaryWriter,
    ) -> OdsResult<()> {
        self.encode_named(tag, tag.name(), out, 0)
    }

    /// Сериализует тег в новый буфер.
    pub fn encode_to_vec(
        &self,
        tag: &Tag,
    ) -> OdsResult<Vec<u8>> {
        let mut out = BinaryWriter::new();
        self.encode(tag, &mut out)?;
        Ok(out.into_inner())
    }

    fn encode_named(
        &self,
        tag: &Tag,
        name: &str,
        out: &mut BinaryWriter,
        depth: usize,
    ) -> OdsResult<()> {
        ensure!(
            depth <= self.max_depth,
            OdsError::MaxDepth {
                depth,
                limit: self.max_depth,
            }
        );

        let id = tag.id();
        let name_bytes = name.as_bytes();
        ensure!(
            name_bytes.len() <= MAX_NAME_LEN,
            OdsError::NameTooLong {
                len: name_bytes.len(),
                limit: MAX_NAME_LEN,
            }
        );

        let mut block = BinaryWriter::new();
        block.write_u16(name_bytes.len() as u16);
        block.write_bytes(name_bytes);

        match tag.value() {
            TagValue::Int(v) => block.write_i32(*v),
            TagValue::Float(v) => block.write_f32(*v),
            TagValue::Double(v) => block.write_f64(*v),
            TagValue::Long(v) => block.write_i64(*v),
            TagValue::Char(v) => block.write_u8(*v),
            TagValue::Byte(v) => block.write_i8(*v),
            TagValue::Vector(children) | TagValue::Object(children) => {
                for child in children {
                    let child_name = match self.child_names {
                        ChildNames::Preserve => child.name(),
                        ChildNames::Blank => "",
                    };
                    self.encode_named(child, child_name, &mut block, depth + 1)?;
                }
            }
            TagValue::Invalid(_) => bail!(OdsError::UnsupportedTag {
                id: id.as_u8(),
                name: name.to_string(),
            }),
        }

        ensure!(
            block.len() as u64 <= MAX_BLOCK_LEN,
            OdsError::BlockTooLarge {
                name: name.to_string(),
                len: block.len(),
                limit: MAX_BLOCK_LEN,
            }
        );

        trace!(id = %id, name, block_len = block.len(), depth, "encoded tag");

        out.write_u8(id.as_u8());
        out.write_u32(block.len() as u32);
        out.write_bytes(block.as_bytes());
        Ok(())
    }
}

/// Пишет тег кодировщиком по умолчанию.
pub fn encode(
    tag: &Tag,
    out: &mut BinaryWriter,
) -> OdsResult<()> {
    Encoder::default().encode(tag, out)
}
