//! Property-based tests for the codecs and match finders.

use gamepack::compression::dictionary::{RingDictionary, WindowDictionary};
use gamepack::{CompressionConfiguration, CompressionFormat};
use proptest::prelude::*;

/// Bytes drawn from a small alphabet so matches actually occur.
fn repetitive_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', 0u8]), 0..max_len)
}

fn any_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_len)
}

fn format_strategy() -> impl Strategy<Value = CompressionFormat> {
    prop::sample::select(CompressionFormat::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_repetitive(format in format_strategy(), data in repetitive_bytes(3000)) {
        let packed = format.compress(&data).unwrap();
        prop_assert!(format.identify(&packed));
        prop_assert_eq!(format.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn prop_round_trip_arbitrary(format in format_strategy(), data in any_bytes(1500)) {
        let packed = format.compress(&data).unwrap();
        prop_assert_eq!(format.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn prop_lz00_any_seed(seed in any::<u32>(), data in repetitive_bytes(800)) {
        let config = CompressionConfiguration::default().with_key_seed(seed);
        let packed = CompressionFormat::Lz00.compress_with(&data, &config).unwrap();
        prop_assert_eq!(CompressionFormat::Lz00.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn prop_decoders_never_panic(format in format_strategy(), data in any_bytes(256)) {
        let _ = format.decompress(&data);
        let _ = format.identify(&data);
    }

    #[test]
    fn prop_window_matches_are_within_bounds(data in repetitive_bytes(600)) {
        let mut dictionary = WindowDictionary::new(64, 3, 18);
        for position in 0..data.len() {
            let found = dictionary.search(&data, position, data.len());
            if found.is_found() {
                prop_assert!(found.distance >= 1 && found.distance <= 64);
                prop_assert!(found.distance <= position);
                prop_assert!(found.length >= 3 && found.length <= 18);
                prop_assert!(position + found.length <= data.len());
                for k in 0..found.length {
                    prop_assert_eq!(data[position + k], data[position + k - found.distance]);
                }
            }
            dictionary.add_entry(&data, position);
        }
    }

    #[test]
    fn prop_ring_matches_are_within_bounds(data in repetitive_bytes(600)) {
        let mut dictionary = RingDictionary::new(128, 0x70, 3, 18);
        for position in 0..data.len() {
            let found = dictionary.search(&data, position, data.len());
            if found.is_found() {
                prop_assert!(found.distance >= 1);
                prop_assert!(found.distance <= dictionary.max_distance());
                prop_assert!(found.distance <= position);
                prop_assert!(found.length >= 3 && found.length <= 18);
                prop_assert!(position + found.length <= data.len());
                let slot = dictionary.ring_position(position, found.distance);
                prop_assert!(slot < dictionary.buffer_size());
                for k in 0..found.length {
                    prop_assert_eq!(data[position + k], data[position + k - found.distance]);
                }
            }
            dictionary.add_entry(&data, position);
        }
    }
}
