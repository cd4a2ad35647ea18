use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::types::BinWidth;

/// Settings for a build run.
///
/// Stored as a JSON object on disk; omitted keys take their defaults:
/// ```json
/// {
///   "bin_minutes": 30,
///   "concurrency": 4
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Width of each time bin in minutes
    pub bin_minutes: i64,
    /// Maximum number of ports aggregated at once
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bin_minutes: BinWidth::DEFAULT_MINUTES,
            concurrency: 4,
        }
    }
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, bin_minutes: Option<i64>, concurrency: Option<usize>) -> Self {
        if let Some(m) = bin_minutes {
            self.bin_minutes = m;
        }
        if let Some(c) = concurrency {
            self.concurrency = c;
        }
        self
    }

    pub fn bin_width(&self) -> Result<BinWidth> {
        BinWidth::from_minutes(self.bin_minutes)
    }
}
