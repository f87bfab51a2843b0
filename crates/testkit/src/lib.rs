#![warn(missing_docs)]
//! Deterministic testing surfaces: material fixtures, buffer snapshots,
//! update event logs and metrics reports.

mod fixtures;
mod metrics;
mod snapshot;

use anyhow::Result;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tilelight_core::LightChannel;

pub use fixtures::*;
pub use metrics::*;
pub use snapshot::*;

/// One incremental light update, as recorded by workload runs.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateEvent {
    /// Position of the update in the workload.
    pub step: u64,
    /// Updated column.
    pub col: usize,
    /// Updated row.
    pub row: usize,
    /// Updated channel.
    pub channel: LightChannel,
    /// New source value.
    pub light: i64,
    /// Walks processed by the update.
    pub walks: usize,
    /// Directional inputs rewritten by the update.
    pub cells_written: usize,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write<T: Serialize>(&mut self, event: &T) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}
