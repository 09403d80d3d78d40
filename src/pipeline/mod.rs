pub mod driver;

pub use driver::{RunConfig, RunSummary, run};
