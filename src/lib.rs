/// Settings loading (defaults, file, `ODS_` environment).
pub mod config;
/// ODS codec: tags, byte streams, encode/decode, compression, file facade.
pub mod engine;
/// Tracing subscriber setup (filters, formats).
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// config
pub use self::config::OdsSettings;
/// Tag model, codec and file facade.
pub use engine::{
    decode, encode, load, save, BinaryReader, BinaryWriter, ChildNames, CompressionType,
    Compressor, CompressorRegistry, Decoder, Encoder, GzipCompressor, ObjectDataStructure, Tag,
    TagId, TagValue, ZlibCompressor,
};
/// Error types.
pub use ods_error::{ErrorExt, OdsError, OdsResult, StatusCode};
