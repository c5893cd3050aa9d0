//! Unit tests for qs-sim.

use qs_core::{LaneId, PolicyKind, Profile, QsError, SimParams, SimRng, SimTime};
use qs_lane::Lane;
use qs_schedule::{ArrivalGenerator, ArrivalRecord, ArrivalSchedule};

use crate::{
    NoopObserver, RunSummary, SimBuilder, SimControl, SimError, SimObserver, Simulator,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn params(lanes: usize, profiles: Vec<Profile>) -> SimParams {
    SimParams { lanes, profiles, ..SimParams::default() }
}

fn build(p: SimParams, seed: u64) -> Simulator {
    SimBuilder::new(p, SimRng::new(seed)).build().unwrap()
}

/// `n` clean customers arriving at time 0.
fn burst(n: usize) -> ArrivalSchedule {
    ArrivalSchedule::new(vec![ArrivalRecord::new(0, false); n])
}

fn build_scheduled(p: SimParams, schedules: Vec<ArrivalSchedule>) -> Simulator {
    SimBuilder::new(p, SimRng::new(0)).schedules(schedules).build().unwrap()
}

fn total_completed(lanes: &[Lane]) -> u32 {
    lanes.iter().map(|l| l.counters().completed).sum()
}

/// Counts callbacks; optionally acts on the control handle after a given
/// number of ticks.
#[derive(Default)]
struct Recorder {
    ticks:        usize,
    lane_reports: Vec<LaneId>,
    reports:      usize,
    want_reports: bool,
    ended:        Option<(SimTime, RunSummary)>,
    stop_after:   Option<(usize, SimControl)>,
    break_after:  Option<(usize, SimControl, LaneId)>,
}

impl SimObserver for Recorder {
    fn on_lane(&mut self, lane: &Lane) {
        self.lane_reports.push(lane.id());
    }

    fn on_summary(&mut self, _now: SimTime, _summary: &RunSummary) {
        self.ticks += 1;
        if let Some((n, control)) = &self.stop_after {
            if self.ticks == *n {
                control.request_stop();
            }
        }
        if let Some((n, control, lane)) = &self.break_after {
            if self.ticks == *n {
                control.set_broken(*lane, true);
            }
        }
    }

    fn wants_policy_report(&self) -> bool {
        self.want_reports
    }

    fn on_policy_report(&mut self, report: &str) {
        assert!(report.starts_with("Profile assignment policy"));
        self.reports += 1;
    }

    fn on_sim_end(&mut self, now: SimTime, summary: &RunSummary) {
        self.ended = Some((now, *summary));
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;

    #[test]
    fn schedule_count_must_match_lanes() {
        let p = params(2, vec![Profile::uniform(5, 5, 1.0)]);
        let err = SimBuilder::new(p, SimRng::new(0))
            .schedules(vec![burst(1)])
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::ScheduleCountMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let err = SimBuilder::new(params(1, Vec::new()), SimRng::new(0)).build().err().unwrap();
        assert!(matches!(err, SimError::Core(QsError::EmptyProfiles)));
    }

    #[test]
    fn lanes_start_with_a_pending_customer() {
        let mut p = params(3, vec![Profile::uniform(5, 10, 0.5)]);
        p.n_gen_max = 4;
        let sim = build(p, 1);
        assert_eq!(sim.lanes().len(), 3);
        for (j, lane) in sim.lanes().iter().enumerate() {
            assert_eq!(lane.id(), LaneId(j as u32));
            assert!(lane.pending().is_some());
            assert_eq!(lane.counters().generated, 1);
        }
    }

    #[test]
    fn start_time_offsets_the_clock() {
        let sim = SimBuilder::new(params(1, vec![Profile::uniform(5, 5, 1.0)]), SimRng::new(0))
            .start_time(SimTime(50))
            .build()
            .unwrap();
        assert_eq!(sim.now(), SimTime(50));
        assert!(sim.lanes()[0].pending().unwrap().arrival >= SimTime(50));
    }

    #[test]
    fn profile_description_lists_every_lane() {
        let mut p = params(2, vec![Profile::uniform(5, 5, 0.5), Profile::uniform(9, 9, 0.9)]);
        p.lane_profiles = vec![Some(vec![1])];
        let sim = build(p, 0);
        assert_eq!(
            sim.describe_profiles(),
            "Lane[1] profiles: (Cost 9:9, d=0.9)\n\
             Lane[2] profiles: (Cost 5:5, d=0.5) (Cost 9:9, d=0.9)\n"
        );
    }
}

// ── End-to-end scenarios ──────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn single_lane_screens_every_arrival() {
        let mut p = params(1, vec![Profile::uniform(5, 15, 1.0)]);
        p.n_gen_max = 10;
        p.frac_bad = 0.5;
        let mut sim = build(p, 42);
        sim.simulate(None, &mut NoopObserver).unwrap();

        let lane = &sim.lanes()[0];
        assert_eq!(lane.counters().completed, 10);
        let threats = lane.completed().iter().filter(|c| c.threat).count() as u32;
        assert_eq!(lane.counters().detected, threats);
        assert_eq!(lane.counters().missed, 0);
        assert!(lane.waiting().is_empty());
        assert!(lane.pending().is_none());
    }

    #[test]
    fn working_lane_relieves_broken_neighbour() {
        let p = params(2, vec![Profile::uniform(5, 5, 1.0)]);
        let mut sim = build_scheduled(p, vec![burst(4), burst(4)]);
        sim.set_broken(LaneId(1), true).unwrap();
        let end = sim.simulate(None, &mut NoopObserver).unwrap();

        assert_eq!(end, SimTime(40));
        assert!(sim.lanes()[1].waiting().is_empty());
        assert_eq!(sim.lanes()[1].counters().completed, 0);

        // b = borrowed, c = own: b c c b c c b b
        let order: Vec<bool> =
            sim.lanes()[0].completed().iter().map(|c| c.transferred).collect();
        assert_eq!(order, [true, false, false, true, false, false, true, true]);
    }

    #[test]
    fn zero_target_greedy_always_uses_cheapest() {
        let mut p = params(3, vec![
            Profile::uniform(5, 10, 0.3),
            Profile::uniform(10, 20, 0.6),
            Profile::triangular(20, 25, 40, 0.9),
        ]);
        p.n_gen_max = 20;
        p.policy = PolicyKind::P0;
        let mut sim = build(p, 9);
        sim.simulate(None, &mut NoopObserver).unwrap();

        assert_eq!(total_completed(sim.lanes()), 60);
        for lane in sim.lanes() {
            assert_eq!(lane.counters().by_profile[0], 20);
            assert!(lane.completed().iter().all(|c| c.service.is_some_and(|s| s.slot == 0)));
        }
    }

    #[test]
    fn identical_schedules_give_identical_logs() {
        let pool = vec![Profile::uniform(5, 5, 0.0), Profile::uniform(9, 9, 1.0)];
        let mut rng = SimRng::new(7);
        let g = ArrivalGenerator::new(0.15, 0.3);
        let records: Vec<Vec<ArrivalRecord>> =
            (0..3).map(|_| g.generate(30, &mut rng).unwrap()).collect();

        for policy in [PolicyKind::P0, PolicyKind::P1, PolicyKind::P2, PolicyKind::P3] {
            let run = |seed: u64| {
                let mut p = params(3, pool.clone());
                p.policy = policy;
                p.d_acceptable = 0.5;
                let schedules = records.iter().cloned().map(ArrivalSchedule::new).collect();
                let mut sim = SimBuilder::new(p, SimRng::new(seed))
                    .schedules(schedules)
                    .build()
                    .unwrap();
                sim.simulate(None, &mut NoopObserver).unwrap();
                sim
            };
            let (a, b) = (run(1), run(2));
            assert_eq!(a.queue_log(), b.queue_log(), "{policy}");
            assert_eq!(a.summary(), b.summary(), "{policy}");
            assert_eq!(a.summary().done, 90);
        }
    }
}

// ── Event loop ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod event_loop {
    use super::*;

    #[test]
    fn unbounded_generation_needs_a_stop_time() {
        let mut sim = build(params(2, vec![Profile::uniform(5, 5, 1.0)]), 0);
        assert!(matches!(sim.simulate(None, &mut NoopObserver), Err(SimError::Unbounded)));
    }

    #[test]
    fn stop_time_is_inclusive_and_resumable() {
        let mut sim = build(params(2, vec![Profile::uniform(5, 15, 1.0)]), 3);
        let end = sim.simulate(Some(SimTime(500)), &mut NoopObserver).unwrap();
        assert_eq!(end, SimTime(500));
        assert_eq!(sim.now(), SimTime(500));
        assert!(sim.queue_log().iter().all(|&(t, _)| t <= SimTime(500)));
        assert_eq!(sim.queue_log().last().map(|e| e.0), Some(SimTime(500)));

        let arrived = sim.summary().arrivals;
        let end = sim.simulate(Some(SimTime(1000)), &mut NoopObserver).unwrap();
        assert_eq!(end, SimTime(1000));
        assert!(sim.summary().arrivals > arrived);
    }

    #[test]
    fn queue_log_has_one_entry_per_time() {
        let mut p = params(3, vec![Profile::uniform(2, 30, 1.0)]);
        p.n_gen_max = 25;
        p.lambda = 0.3;
        let mut sim = build(p, 5);
        sim.simulate(None, &mut NoopObserver).unwrap();

        let log = sim.queue_log();
        assert!(!log.is_empty());
        assert!(log.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(log.last().map(|e| e.1), Some(0));
    }

    #[test]
    fn broken_lane_alone_ends_the_run() {
        let p = params(1, vec![Profile::uniform(5, 5, 1.0)]);
        let mut sim = build_scheduled(p, vec![burst(3)]);
        sim.set_broken(LaneId(0), true).unwrap();
        let end = sim.simulate(None, &mut NoopObserver).unwrap();

        assert_eq!(end, SimTime(0));
        assert_eq!(sim.lanes()[0].waiting().len(), 3);
        assert_eq!(sim.lanes()[0].counters().completed, 0);
        assert_eq!(sim.queue_log(), &[(SimTime(0), 3)]);
    }

    #[test]
    fn stop_request_ends_before_the_next_tick() {
        let mut p = params(2, vec![Profile::uniform(5, 15, 1.0)]);
        p.n_gen_max = 30;
        let mut sim = build(p, 11);
        let mut obs = Recorder { stop_after: Some((5, sim.control())), ..Recorder::default() };
        let stopped = sim.simulate(None, &mut obs).unwrap();

        assert_eq!(obs.ticks, 5);
        assert_eq!(obs.ended.map(|e| e.0), Some(stopped));
        assert!(total_completed(sim.lanes()) < 60);

        // The run picks up where it left off.
        sim.simulate(None, &mut NoopObserver).unwrap();
        assert_eq!(total_completed(sim.lanes()), 60);
    }

    #[test]
    fn control_toggles_are_applied_between_ticks() {
        let p = params(2, vec![Profile::uniform(5, 5, 1.0)]);
        let mut sim = build_scheduled(p, vec![burst(4), burst(4)]);
        let mut obs = Recorder {
            break_after: Some((1, sim.control(), LaneId(1))),
            ..Recorder::default()
        };
        sim.simulate(None, &mut obs).unwrap();

        assert!(sim.lanes()[1].is_broken());
        assert_eq!(total_completed(sim.lanes()), 8);
        assert!(sim.lanes()[0].completed().iter().any(|c| c.transferred));
    }

    #[test]
    fn unknown_lane_in_command_is_skipped() {
        let p = params(1, vec![Profile::uniform(5, 5, 1.0)]);
        let mut sim = build_scheduled(p, vec![burst(2)]);
        sim.control().set_broken(LaneId(7), true);
        sim.simulate(None, &mut NoopObserver).unwrap();
        assert_eq!(sim.lanes()[0].counters().completed, 2);
    }

    #[test]
    fn set_broken_rejects_unknown_lane() {
        let mut sim = build_scheduled(params(1, vec![Profile::uniform(5, 5, 1.0)]), vec![burst(1)]);
        assert!(matches!(
            sim.set_broken(LaneId(1), true),
            Err(SimError::Core(QsError::Config(_)))
        ));
    }

    #[test]
    fn observer_sees_changed_and_broken_lanes() {
        let p = params(2, vec![Profile::uniform(5, 5, 1.0)]);
        let mut sim = build_scheduled(p, vec![burst(1), burst(0)]);
        sim.set_broken(LaneId(1), true).unwrap();
        let mut obs = Recorder { want_reports: true, ..Recorder::default() };
        let end = sim.simulate(None, &mut obs).unwrap();

        assert_eq!(end, SimTime(5));
        // t=0: lane 1 (arrival) and lane 2 (broken); t=5: both again.
        assert_eq!(obs.ticks, 2);
        assert_eq!(obs.lane_reports, [LaneId(0), LaneId(1), LaneId(0), LaneId(1)]);
        assert_eq!(obs.reports, 2);
        let (t, summary) = obs.ended.unwrap();
        assert_eq!(t, SimTime(5));
        assert_eq!(summary.done, 1);
    }
}

// ── Text and schedules ────────────────────────────────────────────────────────

#[cfg(test)]
mod reporting {
    use super::*;

    #[test]
    fn summary_line() {
        let p = params(2, vec![Profile::uniform(5, 5, 1.0)]);
        let mut sim = build_scheduled(p, vec![burst(3), burst(2)]);
        sim.simulate(Some(SimTime(5)), &mut NoopObserver).unwrap();
        assert_eq!(
            sim.summary().to_string(),
            "Arrivals 5; Queued 3, done 2, caught 0, missed 0"
        );
    }

    #[test]
    fn describe_lists_lanes_then_policy() {
        let p = params(2, vec![Profile::uniform(5, 5, 1.0)]);
        let sim = build_scheduled(p, vec![burst(1), burst(1)]);
        let text = sim.describe().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("0\tGen=1; Arv=0; Done 0"));
        assert!(lines[1].starts_with("1\tGen=1; Arv=0; Done 0"));
        assert_eq!(lines[2], "Profile assignment policy P0");
    }

    #[test]
    fn generated_schedules_have_requested_length() {
        let mut p = params(2, vec![Profile::uniform(5, 5, 1.0)]);
        p.n_gen_max = 6;
        let mut sim = build(p, 4);
        let all = sim.generate_arrival_schedules().unwrap();
        assert_eq!(all.len(), 2);
        for recs in &all {
            assert_eq!(recs.len(), 6);
            assert!(recs.windows(2).all(|w| w[0].time <= w[1].time));
        }
        assert!(matches!(
            sim.generate_arrival_schedule(LaneId(2)),
            Err(SimError::Core(QsError::Config(_)))
        ));
    }

    #[test]
    fn generating_without_a_count_fails() {
        let mut sim = build(params(1, vec![Profile::uniform(5, 5, 1.0)]), 0);
        assert!(matches!(
            sim.generate_arrival_schedule(LaneId(0)),
            Err(SimError::Core(QsError::Config(_)))
        ));
    }
}
