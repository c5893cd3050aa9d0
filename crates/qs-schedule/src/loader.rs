//! Arrival schedule loader.
//!
//! Reads the merged multi-lane format produced by [`crate::writer`]:
//!
//! ```text
//! # t<TAB>lane<TAB>threat
//! 12	1	0
//! 15	2	1
//! ```
//!
//! Rows may interleave lanes freely; each lane's rows must be in
//! chronological order.  Lanes absent from the file get an empty schedule.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

use crate::{ArrivalRecord, ArrivalSchedule, ScheduleError, ScheduleResult};

// ── Row ───────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ScheduleRow {
    time:   i64,
    lane:   i64,
    threat: i64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load one [`ArrivalSchedule`] per lane from a schedule file.
///
/// Returns a `Vec` of length `lane_count`, indexed by lane position.
pub fn load_schedules_file(path: &Path, lane_count: usize) -> ScheduleResult<Vec<ArrivalSchedule>> {
    let file = std::fs::File::open(path)?;
    load_schedules_reader(file, lane_count)
}

/// Like [`load_schedules_file`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_schedules_reader<R: Read>(
    reader: R,
    lane_count: usize,
) -> ScheduleResult<Vec<ArrivalSchedule>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(reader);

    let mut lanes: Vec<Vec<ArrivalRecord>> = vec![Vec::new(); lane_count];
    let mut record = StringRecord::new();

    loop {
        let more = rdr.read_record(&mut record).map_err(|e| ScheduleError::Parse {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            msg:  format!("cannot parse line: {e}"),
        })?;
        if !more {
            break;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: ScheduleRow = record.deserialize(None).map_err(|e| ScheduleError::Parse {
            line,
            msg: format!("cannot parse line {:?}: {e}", record.iter().collect::<Vec<_>>().join(" ")),
        })?;

        if row.time < 0 {
            return Err(ScheduleError::Parse { line, msg: format!("negative time t={}", row.time) });
        }
        if row.lane < 1 || row.lane as usize > lane_count {
            return Err(ScheduleError::Parse {
                line,
                msg: format!("lane number out of range ({}), expected 1..={lane_count}", row.lane),
            });
        }
        if !(0..=1).contains(&row.threat) {
            return Err(ScheduleError::Parse {
                line,
                msg: format!("threat must be 0 or 1 (found {})", row.threat),
            });
        }

        let list = &mut lanes[row.lane as usize - 1];
        let rec = ArrivalRecord::new(row.time as u64, row.threat == 1);
        if list.last().is_some_and(|prev| prev.time > rec.time) {
            return Err(ScheduleError::Parse {
                line,
                msg: format!("arrival times for lane {} are not in chronological order", row.lane),
            });
        }
        list.push(rec);
    }

    Ok(lanes.into_iter().map(ArrivalSchedule::new).collect())
}
