pub mod reader;

pub use reader::{RasterReader, RasterSource};

/// Color space of raster pixel data, as declared by the page header.
///
/// Only the spaces the converter can normalize are representable; anything
/// else is rejected when the page header is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Single channel, black-ink convention (0 = no ink).
    Black,
    /// Single channel, luminance convention (0 = black).
    Sw,
    Rgb,
    Srgb,
    AdobeRgb,
    Cmyk,
}

impl ColorSpace {
    /// Map a raster header color-space tag to a supported space.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(ColorSpace::Rgb),
            3 => Some(ColorSpace::Black),
            6 => Some(ColorSpace::Cmyk),
            18 => Some(ColorSpace::Sw),
            19 => Some(ColorSpace::Srgb),
            20 => Some(ColorSpace::AdobeRgb),
            _ => None,
        }
    }

    /// Number of color channels per pixel.
    pub fn channels(&self) -> u32 {
        match self {
            ColorSpace::Black | ColorSpace::Sw => 1,
            ColorSpace::Rgb | ColorSpace::Srgb | ColorSpace::AdobeRgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }

    /// True for the single-channel gray family.
    pub fn is_gray(&self) -> bool {
        matches!(self, ColorSpace::Black | ColorSpace::Sw)
    }

    /// True for the three-channel RGB family.
    pub fn is_rgb(&self) -> bool {
        matches!(self, ColorSpace::Rgb | ColorSpace::Srgb | ColorSpace::AdobeRgb)
    }
}

/// Per-page facts read from the raster transport. Immutable once read.
#[derive(Debug, Clone)]
pub struct PageHeader {
    pub width: u32,
    pub height: u32,
    pub bits_per_color: u32,
    pub bits_per_pixel: u32,
    pub bytes_per_line: u32,
    pub color_space: ColorSpace,
    pub render_intent: String,
    /// Horizontal and vertical hardware resolution in dpi.
    pub hw_resolution: (u32, u32),
}
