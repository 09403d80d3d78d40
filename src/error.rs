use thiserror::Error;

#[derive(Debug, Error)]
pub enum PclmError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Raster read error: {0}")]
    RasterReadError(String),

    #[error("Color conversion error: {0}")]
    ColorConvertError(String),

    #[error("Strip encode error: {0}")]
    StripEncodeError(String),

    #[error("Document write error: {0}")]
    DocumentWriteError(String),

    #[error("Page too big: {0}")]
    PageTooBig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`PclmError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl PclmError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create a raster read error.
    raster_read => RasterReadError,
    /// Create a color conversion error.
    color_convert => ColorConvertError,
    /// Create a strip encode error.
    strip_encode => StripEncodeError,
    /// Create a document write error.
    document_write => DocumentWriteError,
    /// Create a page-too-big error.
    page_too_big => PageTooBig,
}

impl From<lopdf::Error> for PclmError {
    fn from(e: lopdf::Error) -> Self {
        Self::DocumentWriteError(e.to_string())
    }
}

impl From<serde_yml::Error> for PclmError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<image::ImageError> for PclmError {
    fn from(e: image::ImageError) -> Self {
        Self::StripEncodeError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PclmError>;
