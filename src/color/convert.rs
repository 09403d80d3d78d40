use crate::error::PclmError;
use crate::raster::ColorSpace;

/// Bit-polarity transform applied to a raw row before color conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitFn {
    None,
    /// Flip every sample byte. Black-ink gray (0 = no ink) becomes
    /// luminance gray (0 = black) and vice versa.
    Invert,
}

impl BitFn {
    pub fn apply(&self, row: &mut [u8]) {
        match self {
            BitFn::None => {}
            BitFn::Invert => {
                for b in row.iter_mut() {
                    *b = !*b;
                }
            }
        }
    }
}

/// Pure per-row color-channel remapping between 8-bit color spaces.
///
/// Closed set of conversions keyed by (source, target) pair; resolved once
/// per page by the color policy, applied to every row. The luminance
/// weights (31/61/8 percent) match the classic print-image conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertFn {
    Identity,
    GrayToRgb,
    GrayToCmyk,
    RgbToGray,
    RgbToCmyk,
    CmykToGray,
    CmykToRgb,
}

impl ConvertFn {
    /// Look up the conversion for a (source, target) pair.
    ///
    /// Same-family pairs resolve to `Identity`. Pairs outside the supported
    /// gray/RGB/CMYK set are a configuration error, never approximated.
    pub fn between(source: ColorSpace, target: ColorSpace) -> crate::error::Result<Self> {
        let fns = match (source, target) {
            (s, t) if s.is_gray() && t.is_gray() => ConvertFn::Identity,
            (s, t) if s.is_rgb() && t.is_rgb() => ConvertFn::Identity,
            (ColorSpace::Cmyk, ColorSpace::Cmyk) => ConvertFn::Identity,
            (s, t) if s.is_gray() && t.is_rgb() => ConvertFn::GrayToRgb,
            (s, ColorSpace::Cmyk) if s.is_gray() => ConvertFn::GrayToCmyk,
            (s, t) if s.is_rgb() && t.is_gray() => ConvertFn::RgbToGray,
            (s, ColorSpace::Cmyk) if s.is_rgb() => ConvertFn::RgbToCmyk,
            (ColorSpace::Cmyk, t) if t.is_gray() => ConvertFn::CmykToGray,
            (ColorSpace::Cmyk, t) if t.is_rgb() => ConvertFn::CmykToRgb,
            (s, t) => {
                return Err(PclmError::color_convert(format!(
                    "no conversion from {s:?} to {t:?}"
                )));
            }
        };
        Ok(fns)
    }

    /// Number of output bytes per pixel.
    pub fn output_channels(&self, source_channels: u32) -> u32 {
        match self {
            ConvertFn::Identity => source_channels,
            ConvertFn::RgbToGray | ConvertFn::CmykToGray => 1,
            ConvertFn::GrayToRgb | ConvertFn::CmykToRgb => 3,
            ConvertFn::GrayToCmyk | ConvertFn::RgbToCmyk => 4,
        }
    }

    /// Convert `pixels` pixels from `src` into `scratch`, returning the
    /// converted row. `Identity` borrows `src` directly and leaves the
    /// scratch buffer untouched.
    pub fn apply<'a>(
        &self,
        src: &'a [u8],
        scratch: &'a mut Vec<u8>,
        pixels: usize,
    ) -> &'a [u8] {
        match self {
            ConvertFn::Identity => return src,
            ConvertFn::GrayToRgb => {
                scratch.clear();
                for &w in &src[..pixels] {
                    scratch.extend_from_slice(&[w, w, w]);
                }
            }
            ConvertFn::GrayToCmyk => {
                scratch.clear();
                for &w in &src[..pixels] {
                    scratch.extend_from_slice(&[0, 0, 0, 255 - w]);
                }
            }
            ConvertFn::RgbToGray => {
                scratch.clear();
                for px in src[..pixels * 3].chunks_exact(3) {
                    scratch.push(luminance(px[0], px[1], px[2]));
                }
            }
            ConvertFn::RgbToCmyk => {
                scratch.clear();
                for px in src[..pixels * 3].chunks_exact(3) {
                    let c = 255 - px[0];
                    let m = 255 - px[1];
                    let y = 255 - px[2];
                    let k = c.min(m).min(y);
                    scratch.extend_from_slice(&[c - k, m - k, y - k, k]);
                }
            }
            ConvertFn::CmykToGray => {
                scratch.clear();
                for px in src[..pixels * 4].chunks_exact(4) {
                    let ink = luminance(px[0], px[1], px[2]) as u32 + px[3] as u32;
                    scratch.push(255 - ink.min(255) as u8);
                }
            }
            ConvertFn::CmykToRgb => {
                scratch.clear();
                for px in src[..pixels * 4].chunks_exact(4) {
                    let k = px[3] as u32;
                    scratch.push(255 - (px[0] as u32 + k).min(255) as u8);
                    scratch.push(255 - (px[1] as u32 + k).min(255) as u8);
                    scratch.push(255 - (px[2] as u32 + k).min(255) as u8);
                }
            }
        }
        scratch
    }
}

/// Weighted channel mix used by every to-gray conversion.
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((31 * r as u32 + 61 * g as u32 + 8 * b as u32) / 100) as u8
}
