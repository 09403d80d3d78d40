//! Shared fixture builder: serializes synthetic raster streams in the
//! version-3 on-wire layout the reader consumes.
#![allow(dead_code)]

pub const CSPACE_RGB: u32 = 1;
pub const CSPACE_BLACK: u32 = 3;
pub const CSPACE_CMYK: u32 = 6;
pub const CSPACE_SW: u32 = 18;
pub const CSPACE_SRGB: u32 = 19;

pub const PAGE_HEADER_BYTES: usize = 1796;

/// One synthetic raster page.
pub struct PageSpec {
    pub width: u32,
    pub height: u32,
    pub bits_per_color: u32,
    pub cspace_tag: u32,
    pub channels: u32,
    pub dpi: u32,
    /// Every pixel byte of every row takes this value.
    pub fill: u8,
}

impl PageSpec {
    pub fn gray8(width: u32, height: u32, fill: u8) -> Self {
        PageSpec {
            width,
            height,
            bits_per_color: 8,
            cspace_tag: CSPACE_BLACK,
            channels: 1,
            dpi: 600,
            fill,
        }
    }

    pub fn rgb8(width: u32, height: u32, fill: u8) -> Self {
        PageSpec {
            width,
            height,
            bits_per_color: 8,
            cspace_tag: CSPACE_SRGB,
            channels: 3,
            dpi: 600,
            fill,
        }
    }

    pub fn cmyk8(width: u32, height: u32, fill: u8) -> Self {
        PageSpec {
            width,
            height,
            bits_per_color: 8,
            cspace_tag: CSPACE_CMYK,
            channels: 4,
            dpi: 600,
            fill,
        }
    }

    pub fn bytes_per_line(&self) -> u32 {
        self.width * self.channels * self.bits_per_color / 8
    }
}

fn put_u32(block: &mut [u8], offset: usize, value: u32) {
    block[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
}

/// Serialize one big-endian page header block.
pub fn header_block(page: &PageSpec) -> Vec<u8> {
    let mut block = vec![0u8; PAGE_HEADER_BYTES];
    put_u32(&mut block, 276, page.dpi); // horizontal resolution
    put_u32(&mut block, 280, page.dpi); // vertical resolution
    put_u32(&mut block, 372, page.width);
    put_u32(&mut block, 376, page.height);
    put_u32(&mut block, 384, page.bits_per_color);
    put_u32(&mut block, 388, page.bits_per_color * page.channels);
    put_u32(&mut block, 392, page.bytes_per_line());
    put_u32(&mut block, 400, page.cspace_tag);
    block[1668..1676].copy_from_slice(b"Relative");
    block
}

/// Serialize a whole raster stream: sync word, then header + rows per page.
pub fn raster_stream(pages: &[PageSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"RaS3");
    for page in pages {
        out.extend_from_slice(&header_block(page));
        let row = vec![page.fill; page.bytes_per_line() as usize];
        for _ in 0..page.height {
            out.extend_from_slice(&row);
        }
    }
    out
}

/// A stream with the sync word but zero pages.
pub fn empty_raster_stream() -> Vec<u8> {
    b"RaS3".to_vec()
}
