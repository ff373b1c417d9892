//! Format recognition: each codec accepts its own output and only its own.

mod common;

use common::{mixed_sample, random_bytes, text_sample};
use gamepack::CompressionFormat;

#[test]
fn test_identify_cross_matrix() {
    for data in [text_sample(), mixed_sample()] {
        for producer in CompressionFormat::ALL {
            let packed = producer.compress(&data).unwrap();
            for probe in CompressionFormat::ALL {
                assert_eq!(
                    probe.identify(&packed),
                    probe == producer,
                    "{} output probed as {}",
                    producer,
                    probe
                );
            }
        }
    }
}

#[test]
fn test_detect_names_the_producer() {
    let data = mixed_sample();
    for format in CompressionFormat::ALL {
        let packed = format.compress(&data).unwrap();
        assert_eq!(CompressionFormat::detect(&packed), Some(format));
        let (found, unpacked) = CompressionFormat::detect_and_decompress(&packed)
            .unwrap()
            .unwrap();
        assert_eq!(found, format);
        assert_eq!(unpacked, data);
    }
}

#[test]
fn test_raw_data_is_not_identified() {
    assert_eq!(CompressionFormat::detect(&text_sample()), None);
    assert_eq!(CompressionFormat::detect(b"CXLZ"), None);
    assert_eq!(CompressionFormat::detect(b"LZ01 but far too short"), None);
    // a random buffer that does not end in the PRS terminator
    let mut noise = random_bytes(512, 99);
    noise.push(0xFF);
    assert_eq!(CompressionFormat::detect(&noise), None);
}

#[test]
fn test_damaged_headers_are_not_identified() {
    let data = text_sample();
    for format in [
        CompressionFormat::Cxlz,
        CompressionFormat::Cmpr,
        CompressionFormat::Onz,
        CompressionFormat::Lz01,
        CompressionFormat::Lz00,
        CompressionFormat::Cnx,
    ] {
        let mut packed = format.compress(&data).unwrap();
        packed[0] ^= 0x20;
        assert!(!format.identify(&packed), "{} accepted a bad magic", format);
    }
}

#[test]
fn test_length_mismatch_is_not_identified() {
    let data = text_sample();
    for format in [
        CompressionFormat::Lz01,
        CompressionFormat::Lz00,
        CompressionFormat::Cnx,
    ] {
        let mut packed = format.compress(&data).unwrap();
        packed.push(0);
        assert!(!format.identify(&packed), "{} accepted a trailing byte", format);
    }
}

#[test]
fn test_window_streams_tolerate_alignment_padding() {
    let data = mixed_sample();
    for format in [CompressionFormat::Lz10, CompressionFormat::Lz11] {
        let mut packed = format.compress(&data).unwrap();
        packed.extend_from_slice(&[0, 0, 0]);
        assert!(format.identify(&packed));
        packed.push(0);
        assert!(!format.identify(&packed));
    }
}
