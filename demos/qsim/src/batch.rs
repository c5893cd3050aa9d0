//! Independent runs on the rayon pool, and schedule generation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, trace};

use qs_core::{SimParams, SimRng, SimTime};
use qs_output::{write_lane_stats_file, write_queue_log_file, LaneStatsRow, RunRow, RunsWriter};
use qs_schedule::{load_schedules_file, write_schedules_file};
use qs_sim::{RunSummary, SimBuilder, SimObserver};

pub fn arrivals_file(dir: &Path, run: u32) -> PathBuf {
    dir.join(format!("arrivals-{run:03}.dat"))
}

/// Per-tick aggregate counters at `trace` level.
struct TickTrace {
    run: u32,
}

impl SimObserver for TickTrace {
    fn on_summary(&mut self, now: SimTime, summary: &RunSummary) {
        trace!(run = self.run, t = now.0, "{summary}");
    }
}

pub struct Batch {
    pub params:   SimParams,
    pub runs:     u32,
    pub seed:     u64,
    pub stop:     Option<u64>,
    pub arrivals: Option<PathBuf>,
    pub out:      PathBuf,
}

impl Batch {
    /// Execute every run in parallel, then write `runs.csv` in run order.
    pub fn run(&self) -> Result<()> {
        let started = Instant::now();
        let rows: Vec<RunRow> = (0..self.runs)
            .into_par_iter()
            .map(|run| self.run_one(run))
            .collect::<Result<_>>()?;

        let mut writer = RunsWriter::new(&self.out).context("creating runs.csv")?;
        for row in &rows {
            writer.write_run(row)?;
        }
        writer.finish()?;
        info!(
            runs = self.runs,
            elapsed_ms = started.elapsed().as_millis() as u64,
            out = %self.out.display(),
            "batch finished"
        );
        Ok(())
    }

    fn run_one(&self, run: u32) -> Result<RunRow> {
        let seed = SimRng::run_seed(self.seed, run);
        let mut builder = SimBuilder::new(self.params.clone(), SimRng::new(seed));
        if let Some(dir) = &self.arrivals {
            let path = arrivals_file(dir, run);
            let schedules = load_schedules_file(&path, self.params.lanes)
                .with_context(|| format!("loading {}", path.display()))?;
            builder = builder.schedules(schedules);
        }
        let mut sim = builder.build().with_context(|| format!("setting up run {run}"))?;

        let end = sim
            .simulate(self.stop.map(SimTime), &mut TickTrace { run })
            .with_context(|| format!("run {run}"))?;
        let summary = sim.summary();
        info!(run, seed, end = end.0, "{summary}");

        let queue = self.out.join(format!("queue-{run:03}.dat"));
        write_queue_log_file(&queue, sim.queue_log(), sim.lanes())
            .with_context(|| format!("writing {}", queue.display()))?;

        let stats = self.out.join(format!("lane_stats-{run:03}.csv"));
        let rows: Vec<LaneStatsRow> =
            sim.lanes().iter().map(|l| LaneStatsRow::from_lane(run, l)).collect();
        write_lane_stats_file(&stats, &rows)
            .with_context(|| format!("writing {}", stats.display()))?;

        Ok(RunRow::new(run, seed, self.params.policy, &summary))
    }
}

/// Write one `arrivals-NNN.dat` per run, drawing with the same per-run seeds
/// as [`Batch::run`].
pub fn generate_arrivals(params: &SimParams, runs: u32, seed: u64, out: &Path) -> Result<()> {
    for run in 0..runs {
        let mut sim = SimBuilder::new(params.clone(), SimRng::for_run(seed, run))
            .build()
            .context("setting up the generator")?;
        let lanes = sim
            .generate_arrival_schedules()
            .context("generating arrival schedules")?;
        let path = arrivals_file(out, run);
        write_schedules_file(&path, &lanes)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(run, path = %path.display(), per_lane = params.n_gen_max, "arrivals written");
    }
    Ok(())
}
