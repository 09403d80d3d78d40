use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::warn;

use crate::color::ColorPolicy;
use crate::error::PclmError;
use crate::pclm::strip::Strip;
use crate::raster::ColorSpace;

/// Compression methods a device may request for strip streams, ordered by
/// selection priority: when several are requested, the highest wins and is
/// used for every strip of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompressionMethod {
    Rle,
    Flate,
    Jpeg,
}

impl CompressionMethod {
    /// Pick the method for the run from the device's requested set.
    /// An empty set falls back to flate with a warning.
    pub fn select(requested: &[CompressionMethod]) -> CompressionMethod {
        match requested.iter().max() {
            Some(&method) => method,
            None => {
                warn!("no usable compression method requested, using flate for image streams");
                CompressionMethod::Flate
            }
        }
    }

    /// PDF stream filter name for this method.
    pub fn filter_name(&self) -> &'static str {
        match self {
            CompressionMethod::Rle => "RunLengthDecode",
            CompressionMethod::Flate => "FlateDecode",
            CompressionMethod::Jpeg => "DCTDecode",
        }
    }
}

/// One compressed strip, carrying everything needed to register it as an
/// image resource. Immutable once produced.
#[derive(Debug)]
pub struct EncodedStrip {
    pub method: CompressionMethod,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub bits_per_color: u32,
    pub color_space: ColorSpace,
}

/// Compress every strip of a page with the selected method.
///
/// Strips are encoded independently, in order. Any backend failure aborts
/// the run; a partially encoded page is never emitted.
pub fn encode_strips(
    strips: Vec<Strip>,
    method: CompressionMethod,
    width: u32,
    policy: &ColorPolicy,
) -> crate::error::Result<Vec<EncodedStrip>> {
    let mut encoded = Vec::with_capacity(strips.len());
    for strip in strips {
        let data = match method {
            CompressionMethod::Flate => encode_flate(&strip.data)?,
            CompressionMethod::Rle => encode_rle(&strip.data),
            CompressionMethod::Jpeg => encode_jpeg(&strip.data, width, strip.height, policy)?,
        };
        encoded.push(EncodedStrip {
            method,
            data,
            width,
            height: strip.height,
            bits_per_color: policy.bits_per_color,
            color_space: policy.color_space,
        });
    }
    Ok(encoded)
}

fn encode_flate(raw: &[u8]) -> crate::error::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(raw)
        .map_err(|e| PclmError::strip_encode(format!("flate: {e}")))?;
    encoder
        .finish()
        .map_err(|e| PclmError::strip_encode(format!("flate: {e}")))
}

/// JPEG needs the strip geometry and channel layout; only 8-bit gray and
/// RGB strips have a JPEG representation.
fn encode_jpeg(
    raw: &[u8],
    width: u32,
    height: u32,
    policy: &ColorPolicy,
) -> crate::error::Result<Vec<u8>> {
    let color_type = if policy.color_space.is_gray() {
        ExtendedColorType::L8
    } else if policy.color_space.is_rgb() {
        ExtendedColorType::Rgb8
    } else {
        return Err(PclmError::strip_encode(format!(
            "jpeg cannot encode {:?} strips",
            policy.color_space
        )));
    };
    if policy.bits_per_color != 8 {
        return Err(PclmError::strip_encode(format!(
            "jpeg cannot encode {}-bit samples",
            policy.bits_per_color
        )));
    }

    let mut out = Vec::new();
    let encoder = JpegEncoder::new(&mut out);
    encoder
        .write_image(raw, width, height, color_type)
        .map_err(|e| PclmError::strip_encode(format!("jpeg: {e}")))?;
    Ok(out)
}

/// Run-length encoding per the PDF `RunLengthDecode` filter: a length byte
/// 0..=127 introduces `length + 1` literal bytes, 129..=255 repeats the next
/// byte `257 - length` times, 128 terminates the stream.
fn encode_rle(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() / 2 + 2);
    let mut i = 0;

    while i < raw.len() {
        // Measure the run starting here, capped at the filter's maximum.
        let byte = raw[i];
        let mut run = 1;
        while run < 128 && i + run < raw.len() && raw[i + run] == byte {
            run += 1;
        }

        if run >= 2 {
            out.push((257 - run) as u8);
            out.push(byte);
            i += run;
            continue;
        }

        // Literal stretch: extend until the next run of >= 2 or the cap.
        let start = i;
        i += 1;
        while i < raw.len() && i - start < 128 {
            if i + 1 < raw.len() && raw[i] == raw[i + 1] {
                break;
            }
            i += 1;
        }
        out.push((i - start - 1) as u8);
        out.extend_from_slice(&raw[start..i]);
    }

    out.push(128);
    out
}
