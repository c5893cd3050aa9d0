//! Fluent builder for constructing a [`Simulator`].

use tracing::info;

use qs_core::{LaneId, SimParams, SimRng, SimTime};
use qs_lane::{ArrivalSource, Lane};
use qs_policy::Policy;
use qs_schedule::{ArrivalGenerator, ArrivalSchedule};

use crate::{SimControl, SimError, SimResult, Simulator};

/// Fluent builder for [`Simulator`].
///
/// # Required inputs
///
/// - [`SimParams`]: lanes, profiles, policy, rates, …
/// - [`SimRng`]: the run's random source (see [`SimRng::for_run`])
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                  |
/// |-------------------|------------------------------------------|
/// | `.schedules(v)`   | Arrivals generated on the fly            |
/// | `.start_time(t)`  | `SimTime::ZERO`                          |
/// | `.control(c)`     | A fresh `SimControl`                     |
///
/// # Example
///
/// ```rust,ignore
/// let schedules = load_schedules_file(&path, params.lanes)?;
/// let mut sim = SimBuilder::new(params, SimRng::for_run(seed, run))
///     .schedules(schedules)
///     .build()?;
/// sim.simulate(None, &mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    params:    SimParams,
    rng:       SimRng,
    schedules: Option<Vec<ArrivalSchedule>>,
    start:     SimTime,
    control:   Option<SimControl>,
}

impl SimBuilder {
    pub fn new(params: SimParams, rng: SimRng) -> Self {
        Self { params, rng, schedules: None, start: SimTime::ZERO, control: None }
    }

    /// Read arrivals from pre-generated schedules (one per lane) instead of
    /// drawing them.
    pub fn schedules(mut self, schedules: Vec<ArrivalSchedule>) -> Self {
        self.schedules = Some(schedules);
        self
    }

    pub fn start_time(mut self, t: SimTime) -> Self {
        self.start = t;
        self
    }

    /// Share an existing control handle (e.g. one a front end already holds).
    pub fn control(mut self, control: SimControl) -> Self {
        self.control = Some(control);
        self
    }

    /// Validate the parameters, create the lanes (each draws its first
    /// pending customer, in lane order) and construct the policy.
    pub fn build(self) -> SimResult<Simulator> {
        let params = self.params;
        let mut rng = self.rng;
        let sets = params.profile_sets()?;

        let sources: Vec<ArrivalSource> = match self.schedules {
            Some(s) => {
                if s.len() != params.lanes {
                    return Err(SimError::ScheduleCountMismatch {
                        expected: params.lanes,
                        got:      s.len(),
                    });
                }
                s.into_iter().map(ArrivalSource::Scheduled).collect()
            }
            None => {
                let generator = ArrivalGenerator::new(params.lambda, params.frac_bad);
                vec![ArrivalSource::Generated(generator); params.lanes]
            }
        };

        let cap = params.generation_cap();
        let mut lanes = Vec::with_capacity(params.lanes);
        for (j, (set, source)) in sets.into_iter().zip(sources).enumerate() {
            lanes.push(Lane::new(LaneId(j as u32), set, source, cap, self.start, &mut rng)?);
        }

        let policy = Policy::new(params.policy, &lanes, params.d_acceptable);
        let sim = Simulator::from_parts(
            params,
            lanes,
            policy,
            rng,
            self.start,
            self.control.unwrap_or_default(),
        );
        info!(policy = %sim.policy().kind(), lanes = sim.lanes().len(), "simulator ready");
        for line in sim.describe_profiles().lines() {
            info!("{line}");
        }
        Ok(sim)
    }
}
