//! Reloadable in-memory copy of the port time-series table.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use crate::features::types::PortTimeSeriesRow;
use crate::output::read_table;

/// File identity used to detect changes: modification time and length.
type Stamp = (SystemTime, u64);

/// Holds the table loaded from `path` and reloads it when the file changes.
///
/// Owned by the caller and passed where needed; nothing is cached globally.
pub struct TableCache {
    path: PathBuf,
    loaded: Option<(Stamp, Arc<Vec<PortTimeSeriesRow>>)>,
}

impl TableCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: None,
        }
    }

    /// Returns the cached table, reading the file again if its modification
    /// time or size differs from the cached copy.
    pub fn get(&mut self) -> Result<Arc<Vec<PortTimeSeriesRow>>> {
        let meta = std::fs::metadata(&self.path)?;
        let stamp = (meta.modified()?, meta.len());

        if let Some((cached, table)) = &self.loaded {
            if *cached == stamp {
                return Ok(table.clone());
            }
        }

        debug!(path = %self.path.display(), "Loading port time series");
        let table = Arc::new(read_table(&self.path)?);
        self.loaded = Some((stamp, table.clone()));
        Ok(table)
    }

    /// Drops the cached copy so the next [`get`](Self::get) reads the file.
    pub fn invalidate(&mut self) {
        self.loaded = None;
    }
}
