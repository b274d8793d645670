//! JSON-lines stats sink
//!
//! Each finished game appends one line per side, stamped with the time it
//! was recorded.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use hexfront_core::{StatsRecorder, StatsReport};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsLine<'a> {
    recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a StatsReport,
}

/// Appends reports to a `.jsonl` file
pub struct JsonlRecorder {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlRecorder {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open stats file: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }
}

impl StatsRecorder for JsonlRecorder {
    fn record_result(&mut self, report: &StatsReport) -> Result<()> {
        let line = StatsLine {
            recorded_at: Utc::now(),
            report,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.writer
            .flush()
            .with_context(|| format!("Failed to write stats file: {}", self.path.display()))?;
        Ok(())
    }
}
