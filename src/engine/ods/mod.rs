//! Формат ODS: дерево именованных типизированных тегов в бинарном виде.
//!
//! ## Пример
//!
//! ```no_run
//! use ods::{CompressionType, ObjectDataStructure, Tag};
//!
//! let store = ObjectDataStructure::new("save.ods", CompressionType::Gzip);
//! store.save(&[
//!     Tag::int("meInt", 420),
//!     Tag::object("player", vec![Tag::long("xp", 2890)]),
//! ])?;
//!
//! let xp = store.get("player.xp")?.and_then(|t| t.as_long());
//! assert_eq!(xp, Some(2890));
//! # Ok::<(), ods::OdsError>(())
//! ```
//!
//! ## Модули
//!
//! - [`tags`] — wire ID вариантов и пределы формата
//! - [`tag`] — модель данных `Tag` / `TagValue`
//! - [`stream`] — big-endian буферы чтения и записи
//! - [`encode`] — сериализация тегов
//! - [`decode`] — десериализация с проверкой границ блоков
//! - [`compression`] — сжатие файла целиком
//! - [`store`] — файловый фасад и операции по пути ключа

pub mod compression;
pub mod decode;
pub mod encode;
pub mod store;
pub mod stream;
pub mod tag;
pub mod tags;

pub use compression::*;
pub use decode::*;
pub use encode::*;
pub use store::*;
pub use stream::*;
pub use tag::*;
pub use tags::*;
