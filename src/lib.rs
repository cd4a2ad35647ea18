pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod monitor;
pub mod output;
pub mod scoring;
pub mod spatial;

pub use error::{Error, Result};
