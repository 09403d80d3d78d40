use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::pclm::encoder::CompressionMethod;

/// Built-in strip height used whenever the device declares nothing usable.
pub const DEFAULT_STRIP_HEIGHT: u32 = 16;

/// Fallback source resolution when the device token cannot be parsed.
pub const DEFAULT_SOURCE_RESOLUTION: u32 = 600;

/// Device capabilities for PCLm output.
///
/// Mirrors the attribute set a printer description declares: strip geometry,
/// source resolutions, duplex back-side handling and the compression methods
/// the device accepts. List-valued attributes arrive as comma-separated
/// strings and are parsed lazily with per-attribute fallbacks, so one
/// malformed attribute never takes down the run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub strip_height_preferred: u32,
    pub strip_height_supported: String,
    pub source_resolution_default: String,
    pub source_resolution_supported: String,
    pub raster_back_side: String,
    pub compression_method_preferred: String,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        DeviceProfile {
            strip_height_preferred: DEFAULT_STRIP_HEIGHT,
            strip_height_supported: DEFAULT_STRIP_HEIGHT.to_string(),
            source_resolution_default: format!("{DEFAULT_SOURCE_RESOLUTION}dpi"),
            source_resolution_supported: format!("{DEFAULT_SOURCE_RESOLUTION}dpi"),
            raster_back_side: String::from("normal"),
            compression_method_preferred: String::from("flate"),
        }
    }
}

impl DeviceProfile {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::PclmError::config(format!("Failed to parse device profile YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Strip heights the device claims to support. Used for validation only;
    /// an unparseable list falls back to the built-in default.
    pub fn supported_strip_heights(&self) -> Vec<u32> {
        let parsed: Option<Vec<u32>> = split_list(&self.strip_height_supported)
            .map(|tok| tok.parse::<u32>().ok().filter(|&h| h > 0))
            .collect();
        match parsed {
            Some(heights) if !heights.is_empty() => heights,
            _ => {
                warn!(
                    value = %self.strip_height_supported,
                    "unparseable supported strip heights, using default {DEFAULT_STRIP_HEIGHT}"
                );
                vec![DEFAULT_STRIP_HEIGHT]
            }
        }
    }

    /// Strip height to plan pages with. Zero is treated as undeclared; a
    /// preferred height missing from the supported set is only worth a
    /// warning.
    pub fn effective_strip_height(&self) -> u32 {
        if self.strip_height_preferred == 0 {
            warn!("device declares no preferred strip height, using {DEFAULT_STRIP_HEIGHT}");
            return DEFAULT_STRIP_HEIGHT;
        }
        let supported = self.supported_strip_heights();
        if !supported.contains(&self.strip_height_preferred) {
            warn!(
                preferred = self.strip_height_preferred,
                ?supported,
                "preferred strip height not in supported set"
            );
        }
        self.strip_height_preferred
    }

    /// Default source resolution in dpi, parsed from a "<int>dpi" token.
    pub fn default_source_resolution(&self) -> u32 {
        match parse_dpi_token(&self.source_resolution_default) {
            Some(dpi) => dpi,
            None => {
                warn!(
                    value = %self.source_resolution_default,
                    "unparseable default source resolution, using {DEFAULT_SOURCE_RESOLUTION}dpi"
                );
                DEFAULT_SOURCE_RESOLUTION
            }
        }
    }

    /// Source resolutions the device supports, in dpi. Tokens that do not
    /// parse are skipped.
    pub fn supported_source_resolutions(&self) -> Vec<u32> {
        split_list(&self.source_resolution_supported)
            .filter_map(parse_dpi_token)
            .collect()
    }

    /// Compression methods the device requests, in declaration order.
    /// Unknown tokens are skipped with a warning; selection among the
    /// surviving methods is the encoder's call.
    pub fn compression_methods(&self) -> Vec<CompressionMethod> {
        let mut methods = Vec::new();
        for token in split_list(&self.compression_method_preferred) {
            match token.to_ascii_lowercase().as_str() {
                "jpeg" => methods.push(CompressionMethod::Jpeg),
                "flate" => methods.push(CompressionMethod::Flate),
                "rle" => methods.push(CompressionMethod::Rle),
                other => warn!(method = other, "unknown compression method token"),
            }
        }
        methods
    }
}

/// Split a comma-separated attribute value, dropping empty entries.
fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Parse a "<int>dpi" attribute token.
fn parse_dpi_token(token: &str) -> Option<u32> {
    token
        .trim()
        .strip_suffix("dpi")
        .and_then(|n| n.trim().parse::<u32>().ok())
        .filter(|&dpi| dpi > 0)
}
