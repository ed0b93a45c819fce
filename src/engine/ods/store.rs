//! Файловый фасад ODS.
//!
//! Файл — это (возможно сжатая) конкатенация корневых тегов без заголовка,
//! версии и счётчика. Каждая операция фасада — один цикл
//! «прочитать файл целиком → изменить → записать целиком»; блокировок нет,
//! побеждает последний писатель.
//!
//! Ключ — путь из имён через точку (`"player.stats.hp"`): первый сегмент
//! ищется среди корневых тегов, остальные спускаются по членам Object.
//! При одинаковых именах промежуточный сегмент берёт первый Object с этим
//! именем (необъектные теги пропускаются), последний сегмент берёт первый
//! тег с этим именем любого типа.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use ods_error::{OdsError, OdsResult};
use tracing::{debug, warn};

use super::{
    compression::{CompressionType, CompressorRegistry},
    decode::Decoder,
    encode::Encoder,
    stream::{BinaryReader, BinaryWriter},
    tag::{Tag, TagValue},
    tags::TagId,
};
use crate::config::OdsSettings;

/// Разделитель сегментов в пути ключа.
pub const KEY_SEPARATOR: char = '.';

/// Хранилище тегов, привязанное к одному файлу.
#[derive(Debug)]
pub struct ObjectDataStructure {
    path: PathBuf,
    compression: CompressionType,
    compressors: CompressorRegistry,
    encoder: Encoder,
    decoder: Decoder,
}

impl ObjectDataStructure {
    pub fn new(
        path: impl Into<PathBuf>,
        compression: CompressionType,
    ) -> Self {
        Self {
            path: path.into(),
            compression,
            compressors: CompressorRegistry::default(),
            encoder: Encoder::default(),
            decoder: Decoder::default(),
        }
    }

    /// Хранилище с алгоритмом, уровнем сжатия и параметрами кодека из
    /// настроек.
    pub fn with_settings(
        path: impl Into<PathBuf>,
        settings: &OdsSettings,
    ) -> Self {
        Self {
            path: path.into(),
            compression: settings.compression,
            compressors: CompressorRegistry::with_level(settings.compression_level)
                .with_max_decompressed_len(settings.max_decompressed_len),
            encoder: Encoder::new()
                .with_max_depth(settings.max_depth)
                .with_child_names(settings.child_names),
            decoder: Decoder::new().with_max_depth(settings.max_depth),
        }
    }

    pub fn with_compressors(
        mut self,
        compressors: CompressorRegistry,
    ) -> Self {
        self.compressors = compressors;
        self
    }

    pub fn with_encoder(
        mut self,
        encoder: Encoder,
    ) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_decoder(
        mut self,
        decoder: Decoder,
    ) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    pub fn compressors_mut(&mut self) -> &mut CompressorRegistry {
        &mut self.compressors
    }

    /// Кодирует корни по порядку и сжимает результат.
    pub fn save_to_bytes(
        &self,
        tags: &[Tag],
    ) -> OdsResult<Vec<u8>> {
        let mut out = BinaryWriter::new();
        for tag in tags {
            self.encoder.encode(tag, &mut out)?;
        }
        let raw = out.into_inner();
        let packed = self.compressors.compress(self.compression, &raw)?;
        debug!(
            roots = tags.len(),
            raw_bytes = raw.len(),
            packed_bytes = packed.len(),
            compression = %self.compression,
            "encoded ODS roots"
        );
        Ok(packed.into_owned())
    }

    /// Распаковывает буфер и читает корни, пока есть байты.
    pub fn load_from_bytes(
        &self,
        data: Vec<u8>,
    ) -> OdsResult<Vec<Tag>> {
        let packed_bytes = data.len();
        let result = self
            .compressors
            .decompress(self.compression, data)
            .and_then(|raw| {
                let mut r = BinaryReader::from_vec(raw);
                self.decoder.decode_all(&mut r)
            });
        match result {
            Ok(tags) => {
                debug!(
                    roots = tags.len(),
                    packed_bytes,
                    compression = %self.compression,
                    "decoded ODS roots"
                );
                Ok(tags)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    offset = ?err.offset(),
                    hint = ?err.recovery_hint(),
                    "failed to decode ODS data"
                );
                Err(err)
            }
        }
    }

    /// Перезаписывает файл указанными корнями.
    pub fn save(
        &self,
        tags: &[Tag],
    ) -> OdsResult<()> {
        let bytes = self.save_to_bytes(tags)?;
        let mut file = BinaryWriter::create(&self.path);
        file.write_bytes(&bytes);
        file.close()?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "saved ODS file");
        Ok(())
    }

    /// Читает все корневые теги файла.
    pub fn load(&self) -> OdsResult<Vec<Tag>> {
        let data = fs::read(&self.path)?;
        debug!(path = %self.path.display(), bytes = data.len(), "read ODS file");
        self.load_from_bytes(data)
    }

    pub fn get_all(&self) -> OdsResult<Vec<Tag>> {
        self.load()
    }

    /// Тег по пути ключа.
    pub fn get(
        &self,
        key: &str,
    ) -> OdsResult<Option<Tag>> {
        let roots = self.load()?;
        Ok(lookup(&roots, key).cloned())
    }

    pub fn find(
        &self,
        key: &str,
    ) -> OdsResult<bool> {
        let roots = self.load()?;
        Ok(lookup(&roots, key).is_some())
    }

    /// Добавляет корневой тег в конец файла, создавая файл при отсутствии.
    pub fn append(
        &self,
        tag: Tag,
    ) -> OdsResult<()> {
        self.append_all(vec![tag])
    }

    pub fn append_all(
        &self,
        tags: Vec<Tag>,
    ) -> OdsResult<()> {
        let mut roots = self.load_or_empty()?;
        roots.extend(tags);
        self.save(&roots)
    }

    /// Удаляет тег по пути ключа. `false`, если тега нет.
    pub fn delete(
        &self,
        key: &str,
    ) -> OdsResult<bool> {
        let mut roots = self.load()?;
        if remove(&mut roots, key).is_none() {
            return Ok(false);
        }
        self.save(&roots)?;
        Ok(true)
    }

    /// Заменяет тег по пути ключа целиком, включая имя. `false`, если тега
    /// нет.
    pub fn replace_data(
        &self,
        key: &str,
        tag: Tag,
    ) -> OdsResult<bool> {
        let mut roots = self.load()?;
        match lookup_mut(&mut roots, key) {
            Some(slot) => *slot = tag,
            None => return Ok(false),
        }
        self.save(&roots)?;
        Ok(true)
    }

    /// Заменяет, вставляет или удаляет тег по пути ключа.
    ///
    /// `Some(tag)` заменяет существующий тег, а если его нет — добавляет
    /// `tag` под последним сегментом ключа в родительский Object (или в
    /// корни для ключа из одного сегмента). `None` удаляет тег. Возвращает
    /// `false`, если файл не изменился.
    pub fn set(
        &self,
        key: &str,
        tag: Option<Tag>,
    ) -> OdsResult<bool> {
        let mut roots = self.load_or_empty()?;
        let changed = match tag {
            None => remove(&mut roots, key).is_some(),
            Some(tag) => upsert(&mut roots, key, tag),
        };
        if changed {
            self.save(&roots)?;
        }
        Ok(changed)
    }

    fn load_or_empty(&self) -> OdsResult<Vec<Tag>> {
        match self.load() {
            Ok(tags) => Ok(tags),
            Err(OdsError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }
}

/// Записывает корни в файл.
pub fn save(
    tags: &[Tag],
    path: impl AsRef<Path>,
    compression: CompressionType,
) -> OdsResult<()> {
    ObjectDataStructure::new(path.as_ref(), compression).save(tags)
}

/// Читает все корни файла.
pub fn load(
    path: impl AsRef<Path>,
    compression: CompressionType,
) -> OdsResult<Vec<Tag>> {
    ObjectDataStructure::new(path.as_ref(), compression).load()
}

fn object_members(tag: &Tag) -> Option<&[Tag]> {
    match tag.value() {
        TagValue::Object(members) => Some(members.as_slice()),
        _ => None,
    }
}

fn object_members_mut(tag: &mut Tag) -> Option<&mut Vec<Tag>> {
    match tag.value_mut() {
        TagValue::Object(members) => Some(members),
        _ => None,
    }
}

/// Делит ключ на сегменты родителей и последний сегмент.
fn split_key(key: &str) -> (Vec<&str>, &str) {
    match key.rsplit_once(KEY_SEPARATOR) {
        Some((parent, last)) => (parent.split(KEY_SEPARATOR).collect(), last),
        None => (Vec::new(), key),
    }
}

/// Промежуточный сегмент выбирает первый Object с таким именем, последний
/// сегмент выбирает первый тег любого типа.
fn lookup<'a>(
    roots: &'a [Tag],
    key: &str,
) -> Option<&'a Tag> {
    let (parents, last) = split_key(key);
    let mut scope = roots;
    for name in parents {
        let parent = scope
            .iter()
            .find(|t| t.name() == name && t.id() == TagId::Object)?;
        scope = object_members(parent)?;
    }
    scope.iter().find(|t| t.name() == last)
}

/// Список, в котором живёт последний сегмент ключа: корни для ключа из
/// одного сегмента, иначе члены родительского Object.
fn parent_members_mut<'a>(
    roots: &'a mut Vec<Tag>,
    parents: &[&str],
) -> Option<&'a mut Vec<Tag>> {
    let mut scope = roots;
    for name in parents {
        let current = scope;
        let parent = current
            .iter_mut()
            .find(|t| t.name() == *name && t.id() == TagId::Object)?;
        scope = object_members_mut(parent)?;
    }
    Some(scope)
}

fn lookup_mut<'a>(
    roots: &'a mut Vec<Tag>,
    key: &str,
) -> Option<&'a mut Tag> {
    let (parents, last) = split_key(key);
    parent_members_mut(roots, &parents)?
        .iter_mut()
        .find(|t| t.name() == last)
}

fn remove(
    roots: &mut Vec<Tag>,
    key: &str,
) -> Option<Tag> {
    let (parents, last) = split_key(key);
    let members = parent_members_mut(roots, &parents)?;
    let index = members.iter().position(|t| t.name() == last)?;
    Some(members.remove(index))
}

fn upsert(
    roots: &mut Vec<Tag>,
    key: &str,
    mut tag: Tag,
) -> bool {
    if let Some(slot) = lookup_mut(roots, key) {
        *slot = tag;
        return true;
    }
    let (parents, last) = split_key(key);
    match parent_members_mut(roots, &parents) {
        Some(members) => {
            tag.set_name(last);
            members.push(tag);
            true
        }
        None => false,
    }
}
