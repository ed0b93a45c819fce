//! Модель данных тега: имя плюс типизированное значение.
//!
//! Набор вариантов закрыт ([`TagValue`]), поэтому любая операция над тегом
//! разбирается исчерпывающим `match`. Составные теги (Vector, Object)
//! владеют дочерними тегами напрямую через `Vec<Tag>`; дерево не содержит
//! циклов.

use super::tags::TagId;

/// Значение тега.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// Неклассифицированные данные: хранить можно, сериализовать нельзя.
    Invalid(Vec<u8>),
    Int(i32),
    Float(f32),
    Double(f64),
    Long(i64),
    Char(u8),
    /// Байты ODS знаковые.
    Byte(i8),
    /// Упорядоченный, возможно разнородный список.
    Vector(Vec<Tag>),
    /// Упорядоченный набор членов, адресуемых по имени.
    Object(Vec<Tag>),
}

impl TagValue {
    /// Wire ID варианта.
    pub fn id(&self) -> TagId {
        match self {
            Self::Invalid(_) => TagId::Invalid,
            Self::Int(_) => TagId::Int,
            Self::Float(_) => TagId::Float,
            Self::Double(_) => TagId::Double,
            Self::Long(_) => TagId::Long,
            Self::Char(_) => TagId::Char,
            Self::Byte(_) => TagId::Byte,
            Self::Vector(_) => TagId::Vector,
            Self::Object(_) => TagId::Object,
        }
    }
}

/// Именованный типизированный узел дерева.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    name: String,
    value: TagValue,
}

impl Tag {
    pub fn new(
        name: impl Into<String>,
        value: TagValue,
    ) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn invalid(
        name: impl Into<String>,
        raw: Vec<u8>,
    ) -> Self {
        Self::new(name, TagValue::Invalid(raw))
    }

    pub fn int(
        name: impl Into<String>,
        value: i32,
    ) -> Self {
        Self::new(name, TagValue::Int(value))
    }

    pub fn float(
        name: impl Into<String>,
        value: f32,
    ) -> Self {
        Self::new(name, TagValue::Float(value))
    }

    pub fn double(
        name: impl Into<String>,
        value: f64,
    ) -> Self {
        Self::new(name, TagValue::Double(value))
    }

    pub fn long(
        name: impl Into<String>,
        value: i64,
    ) -> Self {
        Self::new(name, TagValue::Long(value))
    }

    pub fn char(
        name: impl Into<String>,
        value: u8,
    ) -> Self {
        Self::new(name, TagValue::Char(value))
    }

    pub fn byte(
        name: impl Into<String>,
        value: i8,
    ) -> Self {
        Self::new(name, TagValue::Byte(value))
    }

    pub fn vector(
        name: impl Into<String>,
        children: Vec<Tag>,
    ) -> Self {
        Self::new(name, TagValue::Vector(children))
    }

    pub fn object(
        name: impl Into<String>,
        children: Vec<Tag>,
    ) -> Self {
        Self::new(name, TagValue::Object(children))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(
        &mut self,
        name: impl Into<String>,
    ) {
        self.name = name.into();
    }

    pub fn id(&self) -> TagId {
        self.value.id()
    }

    pub fn value(&self) -> &TagValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut TagValue {
        &mut self.value
    }

    /// Заменяет значение, возвращая старое. Вариант может измениться.
    pub fn set_value(
        &mut self,
        value: TagValue,
    ) -> TagValue {
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_parts(self) -> (String, TagValue) {
        (self.name, self.value)
    }

    pub fn as_int(&self) -> Option<i32> {
        match self.value {
            TagValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self.value {
            TagValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.value {
            TagValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self.value {
            TagValue::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<u8> {
        match self.value {
            TagValue::Char(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self.value {
            TagValue::Byte(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.id().is_composite()
    }

    /// Дочерние теги Vector или Object; `None` для скаляров.
    pub fn children(&self) -> Option<&[Tag]> {
        match &self.value {
            TagValue::Vector(children) | TagValue::Object(children) => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Tag>> {
        match &mut self.value {
            TagValue::Vector(children) | TagValue::Object(children) => Some(children),
            _ => None,
        }
    }

    /// Добавляет дочерний тег в конец. Для скаляра тег возвращается обратно
    /// в `Err`.
    pub fn push(
        &mut self,
        child: Tag,
    ) -> Result<(), Tag> {
        match self.children_mut() {
            Some(children) => {
                children.push(child);
                Ok(())
            }
            None => Err(child),
        }
    }

    /// Удаляет дочерний тег по индексу.
    pub fn remove(
        &mut self,
        index: usize,
    ) -> Option<Tag> {
        let children = self.children_mut()?;
        (index < children.len()).then(|| children.remove(index))
    }

    /// Удаляет первый дочерний тег с указанным именем.
    pub fn remove_named(
        &mut self,
        name: &str,
    ) -> Option<Tag> {
        let index = self.index_of(name)?;
        self.remove(index)
    }

    /// Индекс первого дочернего тега с указанным именем.
    pub fn index_of(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.children()?.iter().position(|c| c.name == name)
    }

    /// Первый дочерний тег с указанным именем.
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Tag> {
        self.children()?.iter().find(|c| c.name == name)
    }

    pub fn get_mut(
        &mut self,
        name: &str,
    ) -> Option<&mut Tag> {
        self.children_mut()?.iter_mut().find(|c| c.name == name)
    }

    /// Удаляет все дочерние теги.
    pub fn clear(&mut self) {
        if let Some(children) = self.children_mut() {
            children.clear();
        }
    }

    /// Количество дочерних тегов (0 для скаляров).
    pub fn len(&self) -> usize {
        self.children().map_or(0, <[Tag]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Глубина дерева: 0 для скаляра или пустого составного тега.
    pub fn depth(&self) -> usize {
        self.children()
            .and_then(|children| children.iter().map(|c| c.depth() + 1).max())
            .unwrap_or(0)
    }
}
