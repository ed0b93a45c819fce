//! Property-based tests для кодека ODS
//!
//! Случайные деревья тегов проверяются на round-trip, детерминизм,
//! корректность длин и устойчивость декодера к повреждённым данным.

use proptest::prelude::*;
use ods::{ChildNames, CompressionType, Decoder, Encoder, ObjectDataStructure, Tag};

use generators::*;

const PROPTEST_CASES: u32 = 256;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: PROPTEST_CASES,
        .. ProptestConfig::default()
    })]

    /// decode(encode(tag)) воспроизводит дерево, включая имена.
    #[test]
    fn prop_roundtrip_preserves_tree(tag in tag_strategy()) {
        let bytes = Encoder::default().encode_to_vec(&tag).unwrap();
        let decoded = Decoder::default().decode_slice(&bytes).unwrap();
        prop_assert!(tag_deep_eq(&tag, &decoded), "{:?} != {:?}", tag, decoded);
    }

    /// В режиме Blank вложенные имена пустые, остальное совпадает.
    #[test]
    fn prop_roundtrip_blank_child_names(tag in tag_strategy()) {
        let bytes = Encoder::new()
            .with_child_names(ChildNames::Blank)
            .encode_to_vec(&tag)
            .unwrap();
        let decoded = Decoder::default().decode_slice(&bytes).unwrap();
        prop_assert!(tag_deep_eq(&blank_child_names(&tag), &decoded));
    }

    #[test]
    fn prop_encoding_is_deterministic(tag in tag_strategy()) {
        let encoder = Encoder::default();
        let first = encoder.encode_to_vec(&tag).unwrap();
        let second = encoder.encode_to_vec(&tag).unwrap();
        prop_assert_eq!(&first, &second);

        let reencoded = encoder
            .encode_to_vec(&Decoder::default().decode_slice(&first).unwrap())
            .unwrap();
        prop_assert_eq!(first, reencoded);
    }

    #[test]
    fn prop_encoded_length(tag in tag_strategy()) {
        let bytes = Encoder::default().encode_to_vec(&tag).unwrap();
        prop_assert_eq!(bytes.len(), expected_encoded_len(&tag));
        let block_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
        prop_assert_eq!(block_len + 5, bytes.len());
    }

    /// Любой строгий префикс кодирования отвергается как повреждённые данные.
    #[test]
    fn prop_truncation_detected(tag in tag_strategy(), cut in any::<prop::sample::Index>()) {
        let bytes = Encoder::default().encode_to_vec(&tag).unwrap();
        let len = cut.index(bytes.len());
        let err = Decoder::default().decode_slice(&bytes[..len]).unwrap_err();
        prop_assert!(err.is_corrupt_data(), "unexpected error: {err}");
    }

    /// Декодер не паникует на произвольных байтах.
    #[test]
    fn prop_arbitrary_bytes_do_not_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut r = ods::BinaryReader::new(&data);
        let _ = Decoder::default().decode_all(&mut r);
    }

    #[test]
    fn prop_roots_roundtrip_with_compression(
        roots in roots_strategy(),
        compression in prop_oneof![
            Just(CompressionType::None),
            Just(CompressionType::Gzip),
            Just(CompressionType::Zlib),
        ],
    ) {
        let store = ObjectDataStructure::new("unused.ods", compression);
        let bytes = store.save_to_bytes(&roots).unwrap();
        let loaded: Vec<Tag> = store.load_from_bytes(bytes).unwrap();
        prop_assert_eq!(loaded.len(), roots.len());
        for (a, b) in roots.iter().zip(&loaded) {
            prop_assert!(tag_deep_eq(a, b));
        }
    }
}
