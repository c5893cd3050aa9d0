//! Unit tests for qs-policy.

use qs_core::{CountInService, LaneId, PolicyKind, Profile, SimParams, SimRng, SimTime};
use qs_lane::{ArrivalSource, Lane};
use qs_schedule::{ArrivalRecord, ArrivalSchedule};

use crate::{Fixed, Greedy, Groups, LaneTable, Policy, Target, TICKETS_PER_BATCH};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn three_pool() -> Vec<Profile> {
    vec![
        Profile::uniform(5, 5, 0.5),
        Profile::uniform(10, 10, 0.8),
        Profile::uniform(20, 20, 0.95),
    ]
}

fn two_pool() -> Vec<Profile> {
    vec![Profile::uniform(5, 5, 0.5), Profile::uniform(10, 10, 1.0)]
}

fn params(profiles: Vec<Profile>, d_acceptable: f64, lanes: usize) -> SimParams {
    SimParams { lanes, d_acceptable, profiles, ..SimParams::default() }
}

/// Lanes for `p`; lane `j` receives `queued[j]` customers at time 0 (none
/// for lanes beyond the slice).
fn lanes_with_queues(p: &SimParams, queued: &[usize]) -> Vec<Lane> {
    let mut rng = SimRng::new(0);
    let sets = p.profile_sets().unwrap();
    sets.into_iter()
        .enumerate()
        .map(|(j, set)| {
            let n = queued.get(j).copied().unwrap_or(0);
            let recs = vec![ArrivalRecord::new(0, false); n];
            let mut lane = Lane::new(
                LaneId(j as u32),
                set,
                ArrivalSource::Scheduled(ArrivalSchedule::new(recs)),
                None,
                SimTime::ZERO,
                &mut rng,
            )
            .unwrap();
            while lane.handle_arrival(SimTime::ZERO, &mut rng).unwrap() {}
            lane
        })
        .collect()
}

fn table(lanes: &[Lane]) -> LaneTable<'_> {
    LaneTable::new(lanes, SimTime::ZERO, CountInService::Yes)
}

fn mean_d(p: &SimParams, lanes: &[Lane], fixed: &Fixed) -> f64 {
    let sum: f64 = fixed
        .assignment()
        .iter()
        .enumerate()
        .map(|(j, &slot)| lanes[j].profiles().profiles()[slot].d)
        .sum();
    sum / p.lanes as f64
}

// ── P0 ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod greedy {
    use super::*;

    #[test]
    fn zero_target_always_picks_cheapest() {
        let p = params(three_pool(), 0.0, 1);
        let lanes = lanes_with_queues(&p, &[1]);
        assert_eq!(Greedy::new(0.0).choose(&lanes[0]), 0);
    }

    #[test]
    fn running_average_drives_choice() {
        let p = params(two_pool(), 0.75, 1);
        let mut lanes = lanes_with_queues(&p, &[2]);
        let g = Greedy::new(0.75);
        assert_eq!(g.choose(&lanes[0]), 1);

        let mut rng = SimRng::new(3);
        lanes[0].start_service(1, SimTime(0), &mut rng).unwrap();
        assert!(lanes[0].handle_completion(SimTime(10), &mut rng).unwrap());
        // (1.0 + 0.5) / 2 reaches the target exactly.
        assert_eq!(g.choose(&lanes[0]), 0);
    }

    #[test]
    fn unreachable_target_picks_last() {
        let p = params(three_pool(), 0.99, 1);
        let lanes = lanes_with_queues(&p, &[]);
        assert_eq!(Greedy::new(0.99).choose(&lanes[0]), 2);
    }
}

// ── P1 ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod fixed {
    use super::*;

    #[test]
    fn feasible_targets_are_met_on_average() {
        for target in [0.0, 0.3, 0.6, 0.7, 0.85, 0.9, 0.95] {
            let p = params(three_pool(), target, 3);
            let lanes = lanes_with_queues(&p, &[]);
            let f = Fixed::new(&lanes, target);
            assert_eq!(f.assignment().len(), 3);
            assert!(f.assignment().iter().all(|&s| s < 3));
            assert!(mean_d(&p, &lanes, &f) >= target - 1e-9, "target {target}");
        }
    }

    #[test]
    fn zero_target_uses_cheapest_everywhere() {
        let p = params(three_pool(), 0.0, 4);
        let lanes = lanes_with_queues(&p, &[]);
        assert_eq!(Fixed::new(&lanes, 0.0).assignment(), &[0, 0, 0, 0]);
    }

    #[test]
    fn infeasible_target_uses_highest_d() {
        let p = params(three_pool(), 1.0, 2);
        let lanes = lanes_with_queues(&p, &[]);
        assert_eq!(Fixed::new(&lanes, 1.0).assignment(), &[2, 2]);
    }

    #[test]
    fn mixed_target_splits_lanes() {
        // 0.65 average over two lanes: one at 0.8, one at 0.5.
        let p = params(three_pool(), 0.65, 2);
        let lanes = lanes_with_queues(&p, &[]);
        let f = Fixed::new(&lanes, 0.65);
        let mut slots = f.assignment().to_vec();
        slots.sort_unstable();
        assert_eq!(slots, vec![0, 1]);
        assert_eq!(f.choose(0), f.assignment()[0]);
    }

    #[test]
    fn lane_subsets_are_respected() {
        let mut p = params(three_pool(), 0.9, 2);
        p.lane_profiles = vec![Some(vec![0, 1]), None];
        let lanes = lanes_with_queues(&p, &[]);
        let f = Fixed::new(&lanes, 0.9);
        // Lane 1 can reach 0.95; lane 0 tops out at 0.8 and gets it.
        assert_eq!(f.assignment(), &[1, 2]);
    }
}

// ── Grouping ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod grouping {
    use super::*;

    #[test]
    fn identical_lists_share_a_group() {
        let mut p = params(three_pool(), 0.6, 4);
        p.lane_profiles = vec![None, Some(vec![0, 2]), Some(vec![0, 1, 2]), Some(vec![0, 2])];
        let lanes = lanes_with_queues(&p, &[]);
        let g = Groups::new(&lanes, 0.6, false);

        assert_eq!(g.groups().len(), 2);
        let id = |j| g.group_of(LaneId(j)).unwrap().set_id();
        assert_eq!(id(0), id(2));
        assert_eq!(id(1), id(3));
        assert_ne!(id(0), id(1));
        assert_eq!(g.groups()[0].lanes(), &[LaneId(0), LaneId(2)]);
    }

    #[test]
    fn different_lengths_never_share() {
        let mut p = params(three_pool(), 0.6, 2);
        p.lane_profiles = vec![Some(vec![0, 1]), None];
        let lanes = lanes_with_queues(&p, &[]);
        let g = Groups::new(&lanes, 0.6, false);
        assert_ne!(
            g.group_of(LaneId(0)).unwrap().set_id(),
            g.group_of(LaneId(1)).unwrap().set_id()
        );
    }

    #[test]
    fn bracket_location() {
        let p = params(three_pool(), 0.6, 1);
        let lanes = lanes_with_queues(&p, &[]);
        let set = lanes[0].profiles();

        match Target::for_set(set, 0.6) {
            Target::Bracket { fast, frac_slow } => {
                assert_eq!(fast, 0);
                assert!((frac_slow - 1.0 / 3.0).abs() < 1e-9);
            }
            t => panic!("unexpected target {t:?}"),
        }
        assert_eq!(Target::for_set(set, 0.4), Target::Lowest);
        assert_eq!(Target::for_set(set, 0.95), Target::Highest);
        assert_eq!(Target::for_set(set, 1.0), Target::Highest);
        assert_eq!(Target::for_set(set, 0.8), Target::Bracket { fast: 1, frac_slow: 0.0 });
    }
}

// ── P2 ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod grouped {
    use super::*;

    #[test]
    fn shortest_queues_get_slow_profile() {
        // frac_slow = 0.5 → 2 of 4 lanes run slow.
        let p = params(two_pool(), 0.75, 4);
        let lanes = lanes_with_queues(&p, &[3, 1, 1, 0]);
        let mut policy = Policy::new(PolicyKind::P2, &lanes, 0.75);
        let t = table(&lanes);

        let picks: Vec<usize> =
            (0..4).map(|j| policy.choose_profile(LaneId(j), &t).unwrap()).collect();
        // Ranks: lane 3 (0), lane 1 (1, wins the tie), lane 2 (2), lane 0 (3).
        assert_eq!(picks, vec![0, 1, 0, 1]);
    }

    #[test]
    fn broken_lanes_leave_the_ranking() {
        let p = params(two_pool(), 0.75, 4);
        let mut lanes = lanes_with_queues(&p, &[3, 1, 1, 0]);
        lanes[3].set_broken(true);
        let mut policy = Policy::new(PolicyKind::P2, &lanes, 0.75);
        let t = table(&lanes);
        // 3 working lanes, round(1.5) = 2 slow: lanes 1 and 2.
        assert_eq!(policy.choose_profile(LaneId(1), &t).unwrap(), 1);
        assert_eq!(policy.choose_profile(LaneId(2), &t).unwrap(), 1);
        assert_eq!(policy.choose_profile(LaneId(0), &t).unwrap(), 0);
    }

    #[test]
    fn pinned_groups_ignore_queues() {
        let p = params(three_pool(), 0.3, 2);
        let lanes = lanes_with_queues(&p, &[4, 0]);
        let mut low = Policy::new(PolicyKind::P2, &lanes, 0.3);
        let mut high = Policy::new(PolicyKind::P2, &lanes, 0.99);
        let t = table(&lanes);
        for j in 0..2 {
            assert_eq!(low.choose_profile(LaneId(j), &t).unwrap(), 0);
            assert_eq!(high.choose_profile(LaneId(j), &t).unwrap(), 2);
        }
    }

    #[test]
    fn groups_decide_independently() {
        let mut p = params(three_pool(), 0.65, 3);
        p.lane_profiles = vec![Some(vec![0, 1]), Some(vec![0, 1]), Some(vec![1, 2])];
        let lanes = lanes_with_queues(&p, &[2, 0, 5]);
        let mut policy = Policy::new(PolicyKind::P2, &lanes, 0.65);
        let t = table(&lanes);
        // Group {0, 1}: frac 0.5 → one slow lane, the shorter lane 1.
        assert_eq!(policy.choose_profile(LaneId(1), &t).unwrap(), 1);
        assert_eq!(policy.choose_profile(LaneId(0), &t).unwrap(), 0);
        // Group {2}: every profile is above 0.65, so the first.
        assert_eq!(policy.choose_profile(LaneId(2), &t).unwrap(), 0);
    }

    #[test]
    fn report_lists_groups() {
        let p = params(two_pool(), 0.75, 4);
        let lanes = lanes_with_queues(&p, &[3, 1, 1, 0]);
        let policy = Policy::new(PolicyKind::P2, &lanes, 0.75);
        let text = policy.report(&table(&lanes)).unwrap();
        assert!(text.starts_with("Profile assignment policy P2. Target rate 0.750\n"));
        assert!(text.contains("Group 1 (4 lanes); Screened { F:0 S:0}.Avg actual rate -"));
        assert!(text.contains("Avg queue length = 1.250 +- "));
    }
}

// ── P3 ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tickets {
    use super::*;

    fn slow_picks(policy: &mut Policy, lanes: &[Lane], n: usize) -> usize {
        let t = table(lanes);
        (0..n)
            .filter(|i| {
                let lane = LaneId((i % lanes.len()) as u32);
                policy.choose_profile(lane, &t).unwrap() == 1
            })
            .count()
    }

    fn remaining(policy: &Policy) -> (u32, u32) {
        policy.groups().unwrap().groups()[0].tickets().unwrap().remaining()
    }

    #[test]
    fn each_batch_spends_its_slow_tickets_exactly() {
        // frac_slow = 1/3 → 33 slow tickets per batch.
        let p = params(vec![Profile::uniform(5, 5, 0.5), Profile::uniform(10, 10, 0.8)], 0.6, 3);
        let lanes = lanes_with_queues(&p, &[0, 2, 1]);
        let mut policy = Policy::new(PolicyKind::P3, &lanes, 0.6);

        for _ in 0..3 {
            assert_eq!(slow_picks(&mut policy, &lanes, TICKETS_PER_BATCH as usize), 33);
            assert_eq!(remaining(&policy), (0, 0));
        }
    }

    #[test]
    fn tickets_never_run_negative_mid_batch() {
        let p = params(two_pool(), 0.9, 2);
        let lanes = lanes_with_queues(&p, &[5, 0]);
        let mut policy = Policy::new(PolicyKind::P3, &lanes, 0.9);
        let t = table(&lanes);
        for _ in 0..250 {
            policy.choose_profile(LaneId(0), &t).unwrap();
            let (f, s) = remaining(&policy);
            assert!(f + s < TICKETS_PER_BATCH);
        }
    }

    #[test]
    fn first_refill_matches_rounded_fraction() {
        let p = params(two_pool(), 0.6, 2);
        let lanes = lanes_with_queues(&p, &[]);
        let mut policy = Policy::new(PolicyKind::P3, &lanes, 0.6);
        policy.choose_profile(LaneId(0), &table(&lanes)).unwrap();
        let (f, s) = remaining(&policy);
        // 20 slow, 80 fast, one of them already used.
        assert_eq!(f + s, 99);
        assert!((f, s) == (79, 20) || (f, s) == (80, 19));
    }

    #[test]
    fn report_shows_remaining_tickets() {
        let p = params(two_pool(), 0.6, 2);
        let lanes = lanes_with_queues(&p, &[]);
        let mut policy = Policy::new(PolicyKind::P3, &lanes, 0.6);
        policy.choose_profile(LaneId(0), &table(&lanes)).unwrap();
        let text = policy.report(&table(&lanes)).unwrap();
        assert!(text.starts_with("Profile assignment policy P3"));
        assert!(text.contains("Tickets left {"));
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reports {
    use super::*;

    #[test]
    fn p0_report_is_the_header() {
        let p = params(two_pool(), 0.5, 1);
        let lanes = lanes_with_queues(&p, &[]);
        let policy = Policy::new(PolicyKind::P0, &lanes, 0.5);
        assert_eq!(policy.report(&table(&lanes)).unwrap(), "Profile assignment policy P0");
    }

    #[test]
    fn p1_report_lists_assignment() {
        let p = params(three_pool(), 0.0, 2);
        let lanes = lanes_with_queues(&p, &[]);
        let policy = Policy::new(PolicyKind::P1, &lanes, 0.0);
        assert_eq!(
            policy.report(&table(&lanes)).unwrap(),
            "Profile assignment policy P1. Fixed profiles { 1:P1 2:P1 }"
        );
    }
}
