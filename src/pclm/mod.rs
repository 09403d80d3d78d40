pub mod encoder;
pub mod strip;
pub mod writer;

pub use encoder::{CompressionMethod, EncodedStrip, encode_strips};
pub use strip::{PageStrips, Strip, StripPlan};
pub use writer::PclmWriter;
