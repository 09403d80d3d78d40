mod common;

use std::io::Cursor;

use pclm_convert::raster::{ColorSpace, RasterReader, RasterSource};

use common::PageSpec;

// ============================================================
// 1. Header parsing
// ============================================================

#[test]
fn test_read_single_page_header() {
    let stream = common::raster_stream(&[PageSpec::gray8(100, 32, 0x40)]);
    let mut reader = RasterReader::new(Cursor::new(stream)).expect("open stream");

    let header = reader
        .next_page()
        .expect("read header")
        .expect("one page present");

    assert_eq!(header.width, 100);
    assert_eq!(header.height, 32);
    assert_eq!(header.bits_per_color, 8);
    assert_eq!(header.bits_per_pixel, 8);
    assert_eq!(header.bytes_per_line, 100);
    assert_eq!(header.color_space, ColorSpace::Black);
    assert_eq!(header.render_intent, "Relative");
    assert_eq!(header.hw_resolution, (600, 600));
}

#[test]
fn test_read_rgb_page_header() {
    let stream = common::raster_stream(&[PageSpec::rgb8(10, 4, 0)]);
    let mut reader = RasterReader::new(Cursor::new(stream)).expect("open stream");

    let header = reader.next_page().expect("read header").expect("one page");
    assert_eq!(header.color_space, ColorSpace::Srgb);
    assert_eq!(header.bits_per_pixel, 24);
    assert_eq!(header.bytes_per_line, 30);
}

#[test]
fn test_little_endian_stream() {
    let mut stream = common::raster_stream(&[PageSpec::gray8(5, 2, 1)]);
    // Rewrite as the little-endian flavor: flip the sync word and every
    // header integer the reader consumes.
    stream[0..4].copy_from_slice(b"3SaR");
    for &off in &[276usize, 280, 372, 376, 384, 388, 392, 400] {
        let pos = 4 + off;
        stream[pos..pos + 4].reverse();
    }

    let mut reader = RasterReader::new(Cursor::new(stream)).expect("open stream");
    let header = reader.next_page().expect("read header").expect("one page");
    assert_eq!(header.width, 5);
    assert_eq!(header.height, 2);
}

// ============================================================
// 2. Row reads and page sequencing
// ============================================================

#[test]
fn test_rows_then_end_of_stream() {
    let stream = common::raster_stream(&[PageSpec::gray8(8, 3, 0xAA)]);
    let mut reader = RasterReader::new(Cursor::new(stream)).expect("open stream");

    let header = reader.next_page().expect("header").expect("page");
    let mut row = vec![0u8; header.bytes_per_line as usize];
    for _ in 0..header.height {
        reader.read_row(&mut row).expect("row read");
        assert!(row.iter().all(|&b| b == 0xAA));
    }

    assert!(reader.next_page().expect("end of stream").is_none());
}

#[test]
fn test_two_pages() {
    let stream = common::raster_stream(&[PageSpec::gray8(4, 2, 1), PageSpec::rgb8(6, 5, 2)]);
    let mut reader = RasterReader::new(Cursor::new(stream)).expect("open stream");

    let first = reader.next_page().expect("header").expect("first page");
    let mut row = vec![0u8; first.bytes_per_line as usize];
    for _ in 0..first.height {
        reader.read_row(&mut row).expect("row");
    }

    let second = reader.next_page().expect("header").expect("second page");
    assert_eq!(second.width, 6);
    assert_eq!(second.color_space, ColorSpace::Srgb);
}

// ============================================================
// 3. Malformed streams
// ============================================================

#[test]
fn test_bad_sync_word() {
    let result = RasterReader::new(Cursor::new(b"NOPE".to_vec()));
    assert!(result.is_err(), "unknown sync word should be rejected");
}

#[test]
fn test_encoded_stream_rejected() {
    let result = RasterReader::new(Cursor::new(b"RaS2".to_vec()));
    assert!(result.is_err(), "v2 encoded streams are not supported");
}

#[test]
fn test_truncated_header_is_error() {
    let mut stream = common::raster_stream(&[PageSpec::gray8(4, 2, 0)]);
    stream.truncate(4 + 100); // sync word plus a partial header
    let mut reader = RasterReader::new(Cursor::new(stream)).expect("open stream");
    assert!(reader.next_page().is_err(), "partial header must not be EOF");
}

#[test]
fn test_unsupported_color_space_tag() {
    let mut page = PageSpec::gray8(4, 2, 0);
    page.cspace_tag = 15; // CIE XYZ, outside the supported set
    let stream = common::raster_stream(&[page]);
    let mut reader = RasterReader::new(Cursor::new(stream)).expect("open stream");
    assert!(reader.next_page().is_err());
}

#[test]
fn test_zero_height_rejected() {
    let stream = common::raster_stream(&[PageSpec::gray8(4, 0, 0)]);
    let mut reader = RasterReader::new(Cursor::new(stream)).expect("open stream");
    assert!(reader.next_page().is_err());
}
