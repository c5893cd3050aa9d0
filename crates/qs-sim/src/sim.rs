//! The `Simulator` struct and its event loop.

use std::fmt::Write as _;

use tracing::{debug, info, warn, Level};

use qs_core::{LaneId, QsError, SimParams, SimRng, SimTime};
use qs_lane::{borrow_from_neighbors, Lane};
use qs_policy::{LaneTable, Policy};
use qs_schedule::{ArrivalGenerator, ArrivalRecord};

use crate::{RunSummary, SimControl, SimError, SimObserver, SimResult};

/// Simulated time between periodic status dumps at `debug` level.
const STATUS_INTERVAL: u64 = 100;

// ── Simulator ─────────────────────────────────────────────────────────────────

/// Owns every lane and the active policy, and drives the event loop.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulator {
    params:    SimParams,

    /// Position is identity: `lanes[j].id() == LaneId(j)`.
    lanes:     Vec<Lane>,

    policy:    Policy,

    /// The run's single random source: arrivals, service times, detection.
    rng:       SimRng,

    now:       SimTime,

    /// `(time, customers queued over all lanes)`, one entry per distinct time.
    queue_log: Vec<(SimTime, usize)>,

    control:   SimControl,
}

impl Simulator {
    pub(crate) fn from_parts(
        params:  SimParams,
        lanes:   Vec<Lane>,
        policy:  Policy,
        rng:     SimRng,
        now:     SimTime,
        control: SimControl,
    ) -> Self {
        Self { params, lanes, policy, rng, now, queue_log: Vec::new(), control }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    #[inline]
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    #[inline]
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.get(id.index())
    }

    #[inline]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// A handle for stopping the run, requesting attention or toggling
    /// lanes from another thread.
    pub fn control(&self) -> SimControl {
        self.control.clone()
    }

    /// The accumulated `(time, queued)` series.
    #[inline]
    pub fn queue_log(&self) -> &[(SimTime, usize)] {
        &self.queue_log
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_lanes(self.now, &self.lanes)
    }

    /// Mark `lane` broken or working.  Use [`SimControl::set_broken`] while
    /// `simulate` is running.
    pub fn set_broken(&mut self, lane: LaneId, broken: bool) -> SimResult<()> {
        let n = self.lanes.len();
        let l = self.lanes.get_mut(lane.index()).ok_or_else(|| {
            QsError::Config(format!("lane {} does not exist ({n} lanes)", lane.number()))
        })?;
        if l.is_broken() != broken {
            info!(lane = lane.number(), broken, now = self.now.0, "lane status changed");
        }
        l.set_broken(broken);
        Ok(())
    }

    // ── Text ──────────────────────────────────────────────────────────────

    /// One line per lane listing its profiles.
    pub fn describe_profiles(&self) -> String {
        let mut out = String::new();
        for lane in &self.lanes {
            let _ = write!(out, "Lane[{}] profiles:", lane.id().number());
            for p in lane.profiles().profiles() {
                let _ = write!(out, " {p}");
            }
            out.push('\n');
        }
        out
    }

    /// Every lane's status line followed by the policy report.
    pub fn describe(&self) -> SimResult<String> {
        let mut out = String::new();
        for (j, lane) in self.lanes.iter().enumerate() {
            let _ = writeln!(out, "{j}\t{}", lane.describe());
        }
        out.push_str(&self.policy_report()?);
        Ok(out)
    }

    pub fn policy_report(&self) -> SimResult<String> {
        let table = LaneTable::new(&self.lanes, self.now, self.params.count_in_service);
        Ok(self.policy.report(&table)?)
    }

    // ── Arrival schedules ─────────────────────────────────────────────────

    /// Draw `n_gen_max` arrivals for `lane`, starting at time 0, for saving
    /// to a schedule file.  Uses this simulator's random source.
    pub fn generate_arrival_schedule(&mut self, lane: LaneId) -> SimResult<Vec<ArrivalRecord>> {
        if lane.index() >= self.lanes.len() {
            return Err(QsError::Config(format!(
                "lane {} does not exist ({} lanes)",
                lane.number(),
                self.lanes.len()
            ))
            .into());
        }
        let generator = ArrivalGenerator::new(self.params.lambda, self.params.frac_bad);
        Ok(generator.generate(self.params.n_gen_max, &mut self.rng)?)
    }

    /// [`generate_arrival_schedule`][Self::generate_arrival_schedule] for
    /// every lane, in lane order.
    pub fn generate_arrival_schedules(&mut self) -> SimResult<Vec<Vec<ArrivalRecord>>> {
        (0..self.lanes.len())
            .map(|j| self.generate_arrival_schedule(LaneId(j as u32)))
            .collect()
    }

    // ── Event loop ────────────────────────────────────────────────────────

    /// Run until `stop` (inclusive), or until no lane has anything left to
    /// do when `stop` is `None`.  Returns the final time.
    ///
    /// A stop request ends the run before the next tick; the state stays
    /// consistent and can be inspected or resumed with another call.
    ///
    /// # Errors
    ///
    /// [`SimError::Unbounded`] if `stop` is `None` while a lane draws
    /// arrivals without a limit; any consistency error from the lanes.
    pub fn simulate<O: SimObserver>(
        &mut self,
        stop:     Option<SimTime>,
        observer: &mut O,
    ) -> SimResult<SimTime> {
        if stop.is_none() && self.lanes.iter().any(Lane::generation_unbounded) {
            return Err(SimError::Unbounded);
        }
        self.control.take_stop();
        info!(now = self.now.0, stop = ?stop.map(|t| t.0), "simulation started");

        let mut last_status = self.now;
        loop {
            if stop.is_some_and(|t| self.now > t) {
                break;
            }
            if self.control.take_stop() {
                info!(now = self.now.0, "stop requested");
                break;
            }
            self.control.take_attention();
            self.apply_commands();

            let touched = self.tick()?;
            self.report(observer, &touched)?;

            if self.now.0 / STATUS_INTERVAL > last_status.0 / STATUS_INTERVAL {
                if tracing::enabled!(Level::DEBUG) {
                    let status = self.describe()?;
                    debug!("At t={}\n{status}", self.now.0);
                }
                last_status = self.now;
            }

            if stop.is_some_and(|t| self.now >= t) {
                break;
            }
            // A toggle arrived during the tick: look at the current time again.
            if self.control.take_attention() {
                continue;
            }
            let Some(next) = self.next_activity_time() else {
                info!(now = self.now.0, "no one is being processed or arriving anymore");
                break;
            };
            self.now = match stop {
                Some(t) if next > t => t,
                _ => next,
            };
        }

        let summary = self.summary();
        info!(now = self.now.0, %summary, "simulation ended");
        if tracing::enabled!(Level::DEBUG) {
            let status = self.describe()?;
            debug!("END: At t={}\n{status}", self.now.0);
        }
        observer.on_sim_end(self.now, &summary);
        Ok(self.now)
    }

    /// Earliest pending arrival or completion over all lanes.
    pub fn next_activity_time(&self) -> Option<SimTime> {
        self.lanes.iter().filter_map(Lane::next_activity_time).min()
    }

    fn apply_commands(&mut self) {
        for cmd in self.control.drain_commands() {
            if let Err(e) = self.set_broken(cmd.lane, cmd.broken) {
                warn!(error = %e, "ignoring lane command");
            }
        }
    }

    /// One tick at `self.now`.  Returns which lanes changed (broken lanes
    /// always count as changed).
    fn tick(&mut self) -> SimResult<Vec<bool>> {
        let now = self.now;
        let mode = self.params.count_in_service;
        let mut touched: Vec<bool> = self.lanes.iter().map(Lane::is_broken).collect();

        // ── Phase 1: arrivals ─────────────────────────────────────────────
        for (j, lane) in self.lanes.iter_mut().enumerate() {
            if lane.handle_arrival(now, &mut self.rng)? {
                touched[j] = true;
            }
        }

        // ── Phase 2: completions ──────────────────────────────────────────
        for (j, lane) in self.lanes.iter_mut().enumerate() {
            if lane.handle_completion(now, &mut self.rng)? {
                touched[j] = true;
            }
        }

        // ── Phase 3: idle dispatch ────────────────────────────────────────
        //
        // Borrowing happens first so a customer taken from a broken
        // neighbour is screened next.
        for j in 0..self.lanes.len() {
            if self.lanes[j].is_broken() {
                continue;
            }
            if borrow_from_neighbors(&mut self.lanes, j) {
                touched[j] = true;
            }
            if !self.lanes[j].awaiting_service() {
                continue;
            }
            let table = LaneTable::new(&self.lanes, now, mode);
            let slot = self.policy.choose_profile(LaneId(j as u32), &table)?;
            self.lanes[j].start_service(slot, now, &mut self.rng)?;
            touched[j] = true;
        }

        // ── Phase 4: log ──────────────────────────────────────────────────
        let queued = self.lanes.iter().map(|l| l.waiting().len()).sum();
        match self.queue_log.last_mut() {
            Some(last) if last.0 == now => last.1 = queued,
            _ => self.queue_log.push((now, queued)),
        }
        Ok(touched)
    }

    fn report<O: SimObserver>(&self, observer: &mut O, touched: &[bool]) -> SimResult<()> {
        for (lane, _) in self.lanes.iter().zip(touched).filter(|(_, t)| **t) {
            observer.on_lane(lane);
        }
        observer.on_summary(self.now, &self.summary());
        if observer.wants_policy_report() {
            observer.on_policy_report(&self.policy_report()?);
        }
        Ok(())
    }
}
