//! Arrival schedule writer.
//!
//! Merges the per-lane lists into one chronological stream (ties go to the
//! lower-numbered lane) so the file reads like a log of the run's arrivals.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;

use crate::{ArrivalRecord, ScheduleResult};

/// Write `lanes` (one record list per lane, each chronological) to `path`.
pub fn write_schedules_file(path: &Path, lanes: &[Vec<ArrivalRecord>]) -> ScheduleResult<()> {
    let file = BufWriter::new(File::create(path)?);
    write_schedules(file, lanes)
}

/// Like [`write_schedules_file`] but accepts any `Write` sink.
pub fn write_schedules<W: Write>(mut out: W, lanes: &[Vec<ArrivalRecord>]) -> ScheduleResult<()> {
    let per_lane = lanes.first().map_or(0, Vec::len);
    writeln!(out, "# This file contains customer arrival times. Each line is in the format")?;
    writeln!(out, "# t j threat")?;
    writeln!(out, "# where t is the time, j is the (1-based) lane number, threat=0 or 1")?;
    writeln!(out, "# The data are for L={} lanes, with {per_lane} customers in each one", lanes.len())?;

    let mut w = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(out);

    let mut cursors = vec![0usize; lanes.len()];
    loop {
        // Earliest head across lanes; strict `<` keeps the lowest lane on ties.
        let mut best: Option<(usize, ArrivalRecord)> = None;
        for (j, list) in lanes.iter().enumerate() {
            let Some(&rec) = list.get(cursors[j]) else { continue };
            if best.is_none_or(|(_, b)| rec.time < b.time) {
                best = Some((j, rec));
            }
        }
        let Some((j, rec)) = best else { break };
        cursors[j] += 1;
        w.write_record(&[
            rec.time.0.to_string(),
            (j + 1).to_string(),
            (rec.threat as u8).to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
