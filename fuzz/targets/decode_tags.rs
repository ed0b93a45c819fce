#![no_main]

use libfuzzer_sys::fuzz_target;
use ods::{BinaryReader, Decoder, Encoder};

// Произвольные байты: декодер обязан вернуть ошибку, но не паниковать, а
// всё, что он принял, должно кодироваться обратно в те же байты.
fuzz_target!(|data: &[u8]| {
    let mut r = BinaryReader::new(data);
    if let Ok(tags) = Decoder::new().with_max_depth(64).decode_all(&mut r) {
        let mut out = Vec::with_capacity(data.len());
        for tag in &tags {
            out.extend(Encoder::default().encode_to_vec(tag).unwrap());
        }
        assert_eq!(out, data);
    }
});
