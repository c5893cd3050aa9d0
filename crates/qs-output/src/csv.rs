//! CSV output.
//!
//! - `lane_stats-NNN.csv`: one [`LaneStatsRow`] per lane, written once per
//!   run by [`write_lane_stats_file`].
//! - `runs.csv`: one [`RunRow`] per run, appended through [`RunsWriter`].
//!
//! Header rows are written when the file is created, so an empty file still
//! names its columns.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::{LaneStatsRow, OutputResult, RunRow};

pub const LANE_STATS_HEADER: [&str; 12] = [
    "run", "lane", "broken", "generated", "arrived", "completed", "detected", "missed",
    "transferred", "queued", "mean_wait", "profile_counts",
];

pub const RUNS_HEADER: [&str; 10] = [
    "run", "seed", "policy", "end_time", "arrivals", "queued", "done", "caught", "missed",
    "detection_rate",
];

fn headed_writer<W: Write>(out: W, header: &[&str]) -> OutputResult<Writer<W>> {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(out);
    w.write_record(header)?;
    Ok(w)
}

/// Write `rows` (normally one run's lanes, in lane order) to `path`.
pub fn write_lane_stats_file(path: &Path, rows: &[LaneStatsRow]) -> OutputResult<()> {
    write_lane_stats(File::create(path)?, rows)
}

pub fn write_lane_stats<W: Write>(out: W, rows: &[LaneStatsRow]) -> OutputResult<()> {
    let mut w = headed_writer(out, &LANE_STATS_HEADER)?;
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

/// Appends run summaries to `runs.csv`.
pub struct RunsWriter {
    runs:     Writer<File>,
    finished: bool,
}

impl RunsWriter {
    /// Create (or truncate) `runs.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let runs = headed_writer(File::create(dir.join("runs.csv"))?, &RUNS_HEADER)?;
        Ok(Self { runs, finished: false })
    }

    pub fn write_run(&mut self, row: &RunRow) -> OutputResult<()> {
        self.runs.serialize(row)?;
        Ok(())
    }

    /// Flush the file.  Idempotent.
    pub fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.runs.flush()?;
        Ok(())
    }
}
