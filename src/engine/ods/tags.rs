//! Идентификаторы тегов бинарного формата ODS.
//!
//! Каждый вариант тега помечается однобайтовым значением (wire ID).
//! Свободные номера (1, 5, 10) зарезервированы за вариантами, которые в
//! этот формат не входят (строки, short и т.п.).

use num_enum::TryFromPrimitive;

/// Максимальная длина имени тега в байтах (2-байтовый префикс длины).
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

/// Максимальная длина блока тега в байтах (4-байтовый префикс длины).
pub const MAX_BLOCK_LEN: u64 = u32::MAX as u64;

/// Wire ID варианта тега.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum TagId {
    /// Неклассифицированные данные, сериализовать нельзя.
    Invalid = 0,
    Int = 2,
    Float = 3,
    Double = 4,
    Long = 6,
    Char = 7,
    Byte = 8,
    Vector = 9,
    Object = 11,
}

impl TagId {
    /// Числовое значение на диске.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Ширина полезной нагрузки скалярного тега; `None` для составных тегов и
    /// для Invalid.
    pub const fn payload_width(self) -> Option<usize> {
        match self {
            Self::Char | Self::Byte => Some(1),
            Self::Int | Self::Float => Some(4),
            Self::Double | Self::Long => Some(8),
            Self::Invalid | Self::Vector | Self::Object => None,
        }
    }

    /// Содержит ли тег дочерние теги.
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::Vector | Self::Object)
    }

    /// Человекочитаемое имя варианта.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Long => "Long",
            Self::Char => "Char",
            Self::Byte => "Byte",
            Self::Vector => "Vector",
            Self::Object => "Object",
        }
    }
}

impl From<TagId> for u8 {
    fn from(id: TagId) -> Self {
        id.as_u8()
    }
}

impl std::fmt::Display for TagId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
