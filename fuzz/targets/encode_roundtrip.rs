#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use ods::{Decoder, Encoder, Tag, TagValue};

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Int(i32),
    Float(f32),
    Double(f64),
    Long(i64),
    Char(u8),
    Byte(i8),
    Vector(Vec<FuzzTag>),
    Object(Vec<FuzzTag>),
}

#[derive(Debug, Arbitrary)]
struct FuzzTag {
    name: String,
    value: FuzzValue,
}

impl From<FuzzTag> for Tag {
    fn from(t: FuzzTag) -> Self {
        let value = match t.value {
            FuzzValue::Int(v) => TagValue::Int(v),
            FuzzValue::Float(v) => TagValue::Float(v),
            FuzzValue::Double(v) => TagValue::Double(v),
            FuzzValue::Long(v) => TagValue::Long(v),
            FuzzValue::Char(v) => TagValue::Char(v),
            FuzzValue::Byte(v) => TagValue::Byte(v),
            FuzzValue::Vector(c) => TagValue::Vector(c.into_iter().map(Tag::from).collect()),
            FuzzValue::Object(c) => TagValue::Object(c.into_iter().map(Tag::from).collect()),
        };
        Tag::new(t.name, value)
    }
}

fuzz_target!(|input: FuzzTag| {
    let tag = Tag::from(input);
    let Ok(bytes) = Encoder::default().encode_to_vec(&tag) else {
        return;
    };
    let decoded = Decoder::default()
        .decode_slice(&bytes)
        .expect("encoder output must decode");
    // Сравнение по байтам: NaN != NaN при сравнении значений.
    assert_eq!(Encoder::default().encode_to_vec(&decoded).unwrap(), bytes);
});
