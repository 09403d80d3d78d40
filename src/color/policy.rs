use tracing::warn;

use crate::color::convert::{BitFn, ConvertFn};
use crate::error::PclmError;
use crate::raster::{ColorSpace, PageHeader};

/// Declared data color space of a color-management profile.
///
/// Only the first three are actionable; the rest disable color management
/// with a diagnostic when encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSignature {
    Gray,
    Rgb,
    Cmyk,
    Luv,
    Lab,
    YCbCr,
    Yxy,
    Hsv,
    Hls,
    Xyz,
    NColor,
}

impl ProfileSignature {
    /// Read the data color space field from a raw ICC profile.
    ///
    /// Only the four-byte signature at offset 16 is inspected; full profile
    /// parsing is someone else's job.
    pub fn from_icc_bytes(data: &[u8]) -> crate::error::Result<Self> {
        if data.len() < 20 {
            return Err(PclmError::config(format!(
                "color profile too short ({} bytes)",
                data.len()
            )));
        }
        let sig = match &data[16..20] {
            b"GRAY" => ProfileSignature::Gray,
            b"RGB " => ProfileSignature::Rgb,
            b"CMYK" => ProfileSignature::Cmyk,
            b"Luv " => ProfileSignature::Luv,
            b"Lab " => ProfileSignature::Lab,
            b"YCbr" => ProfileSignature::YCbCr,
            b"Yxy " => ProfileSignature::Yxy,
            b"HSV " => ProfileSignature::Hsv,
            b"HLS " => ProfileSignature::Hls,
            b"XYZ " => ProfileSignature::Xyz,
            _ => ProfileSignature::NColor,
        };
        Ok(sig)
    }

    /// Whether the policy resolver can act on this signature.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            ProfileSignature::Gray | ProfileSignature::Rgb | ProfileSignature::Cmyk
        )
    }
}

/// Per-page normalization decision: what the ingested rows are converted to
/// before strip segmentation.
///
/// Invariant: `bits_per_pixel` is `bits_per_color` times the channel count
/// of `color_space`.
#[derive(Debug, Clone, Copy)]
pub struct ColorPolicy {
    pub bits_per_pixel: u32,
    pub bits_per_color: u32,
    pub convert: ConvertFn,
    pub bits: BitFn,
    /// Declared color space of the normalized output.
    pub color_space: ColorSpace,
}

/// Outcome of policy resolution. When `color_management_disabled` is set the
/// caller must drop the profile for the remainder of the run; the returned
/// policy is already the profile-less one.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedPolicy {
    pub policy: ColorPolicy,
    pub color_management_disabled: bool,
}

impl ColorPolicy {
    /// Decide the normalization for one page, before any row is ingested.
    ///
    /// Without a profile, black-ink gray rasters get an invert-only policy
    /// (sample polarity flipped to luminance convention, bit depth
    /// preserved) and everything else passes through unchanged. With a
    /// profile, the profile's space wins and the matching conversion is
    /// selected from the registry.
    pub fn resolve(header: &PageHeader, profile: Option<ProfileSignature>) -> ResolvedPolicy {
        let identity = ColorPolicy {
            bits_per_pixel: header.bits_per_pixel,
            bits_per_color: header.bits_per_color,
            convert: ConvertFn::Identity,
            bits: if header.color_space == ColorSpace::Black {
                BitFn::Invert
            } else {
                BitFn::None
            },
            color_space: header.color_space,
        };

        let Some(signature) = profile else {
            return ResolvedPolicy {
                policy: identity,
                color_management_disabled: false,
            };
        };

        let target = match signature {
            ProfileSignature::Gray => ColorSpace::Black,
            ProfileSignature::Rgb => ColorSpace::Rgb,
            ProfileSignature::Cmyk => ColorSpace::Cmyk,
            other => {
                warn!(
                    ?other,
                    "unsupported color profile signature, disabling color management"
                );
                return ResolvedPolicy {
                    policy: identity,
                    color_management_disabled: true,
                };
            }
        };

        let convert = match ConvertFn::between(header.color_space, target) {
            Ok(f) => f,
            Err(e) => {
                warn!("{e}, disabling color management");
                return ResolvedPolicy {
                    policy: identity,
                    color_management_disabled: true,
                };
            }
        };

        if convert != ConvertFn::Identity && header.bits_per_color != 8 {
            warn!(
                bits_per_color = header.bits_per_color,
                "color conversion requires 8-bit samples, disabling color management"
            );
            return ResolvedPolicy {
                policy: identity,
                color_management_disabled: true,
            };
        }

        // Black-ink sources are flipped to luminance convention before any
        // channel remapping; identity targets keep the profile-less polarity.
        let bits = if header.color_space == ColorSpace::Black {
            BitFn::Invert
        } else {
            BitFn::None
        };

        let (bits_per_pixel, bits_per_color) = if convert == ConvertFn::Identity {
            (header.bits_per_pixel, header.bits_per_color)
        } else {
            let channels = convert.output_channels(header.color_space.channels());
            (8 * channels, 8)
        };

        let color_space = if convert == ConvertFn::Identity {
            header.color_space
        } else {
            target
        };

        ResolvedPolicy {
            policy: ColorPolicy {
                bits_per_pixel,
                bits_per_color,
                convert,
                bits,
                color_space,
            },
            color_management_disabled: false,
        }
    }

    /// Bytes per normalized row for a page of the given pixel width.
    pub fn line_bytes(&self, width: u32) -> usize {
        width as usize * (self.bits_per_pixel as usize / 8)
    }
}
