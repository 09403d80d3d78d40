use std::io::Read;

use crate::error::PclmError;
use crate::raster::{ColorSpace, PageHeader};

/// Size of one serialized page header on the wire.
const PAGE_HEADER_BYTES: usize = 1796;

// Field offsets within the serialized page header.
const OFF_HW_RESOLUTION: usize = 276;
const OFF_WIDTH: usize = 372;
const OFF_HEIGHT: usize = 376;
const OFF_BITS_PER_COLOR: usize = 384;
const OFF_BITS_PER_PIXEL: usize = 388;
const OFF_BYTES_PER_LINE: usize = 392;
const OFF_COLOR_SPACE: usize = 400;
const OFF_RENDER_INTENT: usize = 1668;

/// Sequential source of raster pages: a header per page followed by exactly
/// `height` rows of `bytes_per_line` bytes, top to bottom. End of stream is
/// signaled by `next_page` returning `None`.
pub trait RasterSource {
    fn next_page(&mut self) -> crate::error::Result<Option<PageHeader>>;
    fn read_row(&mut self, buf: &mut [u8]) -> crate::error::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Big,
    Little,
}

/// Reader for version-3 (unencoded) raster streams.
///
/// The stream starts with a 4-byte sync word selecting the header byte
/// order, then carries one fixed-size page header per page followed by the
/// page's raw rows. Multi-byte pixel samples are big-endian on the wire
/// regardless of the header byte order; swapping them is the ingest path's
/// concern, not the reader's.
pub struct RasterReader<R: Read> {
    inner: R,
    order: ByteOrder,
}

impl<R: Read> RasterReader<R> {
    /// Open a raster stream, consuming and validating the sync word.
    pub fn new(mut inner: R) -> crate::error::Result<Self> {
        let mut magic = [0u8; 4];
        inner
            .read_exact(&mut magic)
            .map_err(|e| PclmError::raster_read(format!("cannot read stream sync word: {e}")))?;

        let order = match &magic {
            b"RaS3" => ByteOrder::Big,
            b"3SaR" => ByteOrder::Little,
            b"RaSt" | b"tSaR" | b"RaS2" | b"2SaR" => {
                return Err(PclmError::raster_read(
                    "encoded raster streams (v1/v2) are not supported",
                ));
            }
            _ => {
                return Err(PclmError::raster_read(format!(
                    "not a raster stream (sync word {:02x?})",
                    magic
                )));
            }
        };

        Ok(RasterReader { inner, order })
    }

    fn field_u32(&self, header: &[u8], offset: usize) -> u32 {
        let bytes: [u8; 4] = header[offset..offset + 4].try_into().unwrap();
        match self.order {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        }
    }

    fn field_cstring(&self, header: &[u8], offset: usize, len: usize) -> String {
        let raw = &header[offset..offset + len];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(len);
        String::from_utf8_lossy(&raw[..end]).into_owned()
    }

    /// Read one page header block. `Ok(None)` only on a clean end of stream
    /// (EOF exactly at a page boundary); a partial header is an error.
    fn read_header_block(&mut self) -> crate::error::Result<Option<[u8; PAGE_HEADER_BYTES]>> {
        let mut buf = [0u8; PAGE_HEADER_BYTES];
        let mut filled = 0;
        while filled < PAGE_HEADER_BYTES {
            let n = self.inner.read(&mut buf[filled..])?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(PclmError::raster_read(format!(
                    "truncated page header ({filled} of {PAGE_HEADER_BYTES} bytes)"
                )));
            }
            filled += n;
        }
        Ok(Some(buf))
    }
}

impl<R: Read> RasterSource for RasterReader<R> {
    fn next_page(&mut self) -> crate::error::Result<Option<PageHeader>> {
        let Some(block) = self.read_header_block()? else {
            return Ok(None);
        };

        let width = self.field_u32(&block, OFF_WIDTH);
        let height = self.field_u32(&block, OFF_HEIGHT);
        let bits_per_color = self.field_u32(&block, OFF_BITS_PER_COLOR);
        let bits_per_pixel = self.field_u32(&block, OFF_BITS_PER_PIXEL);
        let bytes_per_line = self.field_u32(&block, OFF_BYTES_PER_LINE);
        let cs_tag = self.field_u32(&block, OFF_COLOR_SPACE);
        let render_intent = self.field_cstring(&block, OFF_RENDER_INTENT, 64);
        let hw_resolution = (
            self.field_u32(&block, OFF_HW_RESOLUTION),
            self.field_u32(&block, OFF_HW_RESOLUTION + 4),
        );

        if width == 0 || height == 0 || bytes_per_line == 0 {
            return Err(PclmError::raster_read(format!(
                "invalid page dimensions {width}x{height} ({bytes_per_line} bytes per line)"
            )));
        }
        if bits_per_color != 8 && bits_per_color != 16 {
            return Err(PclmError::raster_read(format!(
                "unsupported bit depth: {bits_per_color} bits per color"
            )));
        }
        let color_space = ColorSpace::from_tag(cs_tag).ok_or_else(|| {
            PclmError::raster_read(format!("unsupported raster color space tag {cs_tag}"))
        })?;
        if bits_per_pixel != bits_per_color * color_space.channels() {
            return Err(PclmError::raster_read(format!(
                "inconsistent pixel layout: {bits_per_pixel} bpp, {bits_per_color} bpc, {} channels",
                color_space.channels()
            )));
        }
        if (bytes_per_line as u64) * 8 < (width as u64) * (bits_per_pixel as u64) {
            return Err(PclmError::raster_read(format!(
                "{bytes_per_line} bytes per line cannot hold {width} pixels at {bits_per_pixel} bpp"
            )));
        }
        if hw_resolution.0 == 0 || hw_resolution.1 == 0 {
            return Err(PclmError::raster_read(format!(
                "invalid hardware resolution {}x{}",
                hw_resolution.0, hw_resolution.1
            )));
        }

        Ok(Some(PageHeader {
            width,
            height,
            bits_per_color,
            bits_per_pixel,
            bytes_per_line,
            color_space,
            render_intent,
            hw_resolution,
        }))
    }

    fn read_row(&mut self, buf: &mut [u8]) -> crate::error::Result<()> {
        self.inner
            .read_exact(buf)
            .map_err(|e| PclmError::raster_read(format!("truncated row data: {e}")))
    }
}
