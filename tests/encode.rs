extern crate icomaker;

use icomaker::{Error, IconContainer, IconEncoder};
use image::{DynamicImage, Rgba, RgbaImage};

//===========================================================================//

fn gradient(width: u32, height: u32, alpha: u8) -> DynamicImage {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 0x80, alpha])
    });
    DynamicImage::ImageRgba8(image)
}

//===========================================================================//

#[test]
fn round_trip_keeps_order_and_sizes() {
    let source = gradient(64, 64, 0xff);
    let bytes = IconEncoder::new().encode(&source, &[16, 32, 48]).unwrap();
    let container = IconContainer::decode(&bytes).unwrap();
    assert_eq!(container.header().entry_count, 3);
    assert!(container.rejected().is_empty());
    let widths: Vec<u32> =
        container.entries().iter().map(|e| e.width()).collect();
    assert_eq!(widths, vec![16, 32, 48]);
    for entry in container.entries() {
        assert!(entry.is_png());
        assert_eq!(entry.height(), entry.width());
        assert_eq!(
            entry.payload_dimensions().unwrap(),
            (entry.width(), entry.height())
        );
    }
}

#[test]
fn descending_order_is_preserved() {
    let source = gradient(48, 48, 0xff);
    let bytes = IconEncoder::new().encode(&source, &[48, 32, 16]).unwrap();
    let container = IconContainer::decode(&bytes).unwrap();
    let widths: Vec<u32> =
        container.entries().iter().map(|e| e.width()).collect();
    assert_eq!(widths, vec![48, 32, 16]);
}

#[test]
fn oversized_resolutions_are_dropped() {
    let source = gradient(40, 40, 0xff);
    let bytes =
        IconEncoder::new().encode(&source, &[256, 128, 40, 24]).unwrap();
    let container = IconContainer::decode(&bytes).unwrap();
    let widths: Vec<u32> =
        container.entries().iter().map(|e| e.width()).collect();
    assert_eq!(widths, vec![40, 24]);
}

#[test]
fn only_oversized_resolutions_is_empty_set() {
    let source = gradient(256, 256, 0xff);
    let result = IconEncoder::new().encode(&source, &[512]);
    assert!(matches!(result, Err(Error::EmptyResolutionSet)));
}

#[test]
fn size_256_is_written_as_zero_byte() {
    let source = gradient(256, 256, 0xff);
    let bytes = IconEncoder::new().encode(&source, &[256]).unwrap();
    // The first directory entry starts right after the 6-byte header.
    assert_eq!(bytes[6], 0);
    assert_eq!(bytes[7], 0);
    let container = IconContainer::decode(&bytes).unwrap();
    assert_eq!(container.entries()[0].width(), 256);
    assert_eq!(container.entries()[0].height(), 256);
}

#[test]
fn offsets_point_at_payloads() {
    let source = gradient(32, 32, 0xff);
    let bytes = IconEncoder::new().encode(&source, &[32, 16]).unwrap();
    let container = IconContainer::decode(&bytes).unwrap();
    let first = container.entries()[0].directory();
    let second = container.entries()[1].directory();
    assert_eq!(first.data_offset, 6 + 2 * 16);
    assert_eq!(second.data_offset, first.data_offset + first.data_size);
    assert_eq!((second.data_offset + second.data_size) as usize, bytes.len());
}

#[test]
fn opaque_and_translucent_bit_depths() {
    let opaque = gradient(16, 16, 0xff);
    let bytes = IconEncoder::new().encode(&opaque, &[16]).unwrap();
    let container = IconContainer::decode(&bytes).unwrap();
    assert_eq!(container.entries()[0].directory().bits_per_pixel, 24);

    let translucent = gradient(16, 16, 0x80);
    let bytes = IconEncoder::new().encode(&translucent, &[16]).unwrap();
    let container = IconContainer::decode(&bytes).unwrap();
    assert_eq!(container.entries()[0].directory().bits_per_pixel, 32);
}

#[test]
fn non_square_source_keeps_aspect_ratio() {
    let source = gradient(64, 32, 0xff);
    let bytes = IconEncoder::new().encode(&source, &[32, 16]).unwrap();
    let container = IconContainer::decode(&bytes).unwrap();
    let sizes: Vec<(u32, u32)> = container
        .entries()
        .iter()
        .map(|e| (e.width(), e.height()))
        .collect();
    assert_eq!(sizes, vec![(32, 16), (16, 8)]);
}

#[test]
fn encode_to_path_persists_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ico");
    let source = gradient(32, 32, 0xff);
    let bytes = IconEncoder::new()
        .encode_to_path(&source, &[32, 16], &path)
        .unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}

#[test]
fn failed_encode_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ico");
    let source = gradient(16, 16, 0xff);
    let result = IconEncoder::new().encode_to_path(&source, &[32], &path);
    assert!(matches!(result, Err(Error::EmptyResolutionSet)));
    assert!(!path.exists());
}

//===========================================================================//
