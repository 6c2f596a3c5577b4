//! Tests for the TIFF types module

use crate::io::byte_order::ByteOrder;
use crate::tiff::errors::TiffError;
use crate::tiff::types::TIFF;
use crate::tiff::ifd::{IFD, IFDEntry};

#[test]
fn test_tiff_creation() {
    let tiff = TIFF::new(false, ByteOrder::LittleEndian);
    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 0);
    assert!(tiff.main_ifd().is_none());
    assert!(matches!(tiff.require_main_ifd(), Err(TiffError::NoImageDirectory)));
}

#[test]
fn test_tiff_with_ifds() {
    let mut tiff = TIFF::new(true, ByteOrder::BigEndian);

    let mut main_ifd = IFD::new(0, 16);
    main_ifd.add_entry(IFDEntry::new(256, 4, 1, 1024));
    main_ifd.add_entry(IFDEntry::new(257, 4, 1, 768));
    main_ifd.add_entry(IFDEntry::new(322, 3, 1, 256));
    main_ifd.add_entry(IFDEntry::new(323, 3, 1, 256));
    tiff.ifds.push(main_ifd);

    assert!(tiff.is_big_tiff);
    assert_eq!(tiff.ifd_count(), 1);

    let ifd = tiff.require_main_ifd().unwrap();
    assert_eq!(ifd.get_dimensions(), Some((1024, 768)));
    assert_eq!(ifd.get_samples_per_pixel(), 1);
    assert!(ifd.is_tiled());
}

#[test]
fn test_inline_detection_depends_on_format() {
    // Two LONGs fit inline only in BigTIFF
    let entry = IFDEntry::new(273, 4, 2, 0);
    assert_eq!(entry.value_size(), 8);
    assert!(!entry.is_value_inline(false));
    assert!(entry.is_value_inline(true));
}

#[test]
fn test_overflowing_value_size_saturates() {
    let entry = IFDEntry::new(273, 16, u64::MAX / 2, 0);
    assert_eq!(entry.checked_value_size(), None);
    assert_eq!(entry.value_size(), usize::MAX);
    assert!(!entry.is_value_inline(true));
}
