//! Whitespace-separated queue-length log.
//!
//! ```text
//! 0 2
//! 5 3
//! 12 1
//! caught={1: 4, 2: 3} missed={1: 0, 2: 1}
//! ```
//!
//! One `time count` line per distinct time, then a trailer with every lane's
//! caught and missed threat counts (1-based lane numbers).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;

use qs_core::SimTime;
use qs_lane::Lane;

use crate::OutputResult;

/// Write the log and trailer to `path`, replacing any existing file.
pub fn write_queue_log_file(
    path:  &Path,
    log:   &[(SimTime, usize)],
    lanes: &[Lane],
) -> OutputResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_queue_log(&mut out, log, lanes)?;
    out.flush()?;
    Ok(())
}

/// Write the log and trailer to any writer.
///
/// Consecutive entries with the same time are collapsed; the last count wins.
pub fn write_queue_log<W: Write>(
    mut out: W,
    log:     &[(SimTime, usize)],
    lanes:   &[Lane],
) -> OutputResult<()> {
    let mut rows = WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_writer(&mut out);
    for (i, &(t, count)) in log.iter().enumerate() {
        if log.get(i + 1).is_some_and(|next| next.0 == t) {
            continue;
        }
        rows.serialize((t.0, count))?;
    }
    rows.flush()?;
    drop(rows);

    writeln!(
        out,
        "caught={} missed={}",
        per_lane(lanes, |l| l.counters().detected),
        per_lane(lanes, |l| l.counters().missed),
    )?;
    Ok(())
}

fn per_lane(lanes: &[Lane], value: impl Fn(&Lane) -> u32) -> String {
    let body: Vec<String> = lanes
        .iter()
        .map(|l| format!("{}: {}", l.id().number(), value(l)))
        .collect();
    format!("{{{}}}", body.join(", "))
}
