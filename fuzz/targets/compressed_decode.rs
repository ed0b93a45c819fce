#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ods::{CompressionType, ObjectDataStructure};

#[derive(Debug, Arbitrary)]
enum FuzzCompression {
    None,
    Gzip,
    Zlib,
}

#[derive(Debug, Arbitrary)]
struct CompressedFuzzInput {
    /// Повреждённые сжатые данные
    data: Vec<u8>,
    compression: FuzzCompression,
}

fuzz_target!(|input: CompressedFuzzInput| {
    let compression = match input.compression {
        FuzzCompression::None => CompressionType::None,
        FuzzCompression::Gzip => CompressionType::Gzip,
        FuzzCompression::Zlib => CompressionType::Zlib,
    };
    let store = ObjectDataStructure::new("fuzz.ods", compression);
    let _ = store.load_from_bytes(input.data);
});
