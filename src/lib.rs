//! Convert a page-raster stream into a PCLm document: per-page color
//! normalization, strip segmentation, strip compression and incremental
//! assembly of the output page/object graph.

pub mod color;
pub mod config;
pub mod error;
pub mod pclm;
pub mod pipeline;
pub mod raster;
