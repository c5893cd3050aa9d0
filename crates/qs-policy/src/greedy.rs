//! P0: each lane keeps its own running detection average at the target.

use qs_lane::Lane;

/// Greedy running-average threshold.
///
/// Looks only at the deciding lane's history: the first profile (in order of
/// increasing `d`) that would keep the lane's average `d` at or above the
/// target after one more customer wins.  If none does, the last profile.
#[derive(Clone, Debug)]
pub struct Greedy {
    pub d_acceptable: f64,
}

impl Greedy {
    pub fn new(d_acceptable: f64) -> Self {
        Self { d_acceptable }
    }

    pub fn choose(&self, lane: &Lane) -> usize {
        let profiles = lane.profiles().profiles();
        let done = &lane.counters().by_profile;

        let (sum_d, sum_n) = profiles
            .iter()
            .zip(done)
            .fold((0.0, 0u64), |(d, n), (p, &k)| (d + p.d * k as f64, n + k as u64));

        profiles
            .iter()
            .position(|p| (sum_d + p.d) / (sum_n + 1) as f64 >= self.d_acceptable)
            .unwrap_or(profiles.len().saturating_sub(1))
    }
}
