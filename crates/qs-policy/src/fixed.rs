//! P1: a static profile per lane, solved once.

use tracing::info;

use qs_core::Profile;
use qs_lane::Lane;

/// Fixed assignment.
///
/// At construction, lanes are assigned one at a time.  With `n` lanes left
/// and `required` the detection mass still to cover, the target is
/// `required / n`; the unassigned lane offering the cheapest profile with
/// `d >= target` takes it.  If no lane can reach the target, the lane with
/// the highest available `d` takes that profile instead.  Ties go to the
/// lower lane.
#[derive(Clone, Debug)]
pub struct Fixed {
    /// Profile slot per lane.
    chosen: Vec<usize>,
}

impl Fixed {
    pub fn new(lanes: &[Lane], d_acceptable: f64) -> Self {
        let l = lanes.len();
        let mut chosen = vec![0usize; l];
        let mut done = vec![false; l];
        let mut required = l as f64 * d_acceptable;

        for n in (1..=l).rev() {
            let target = required / n as f64;

            let cheapest = lanes
                .iter()
                .enumerate()
                .filter(|(i, _)| !done[*i])
                .filter_map(|(i, lane)| {
                    cheapest_reaching(lane.profiles().profiles(), target)
                        .map(|k| (i, k, lane.profiles().profiles()[k].average_cost()))
                })
                .fold(None, |best: Option<(usize, usize, f64)>, cur| match best {
                    Some(b) if b.2 <= cur.2 => Some(b),
                    _ => Some(cur),
                });

            let (lane, slot) = match cheapest {
                Some((i, k, cost)) => {
                    info!(lanes_left = n, d_target = target, lane = i + 1, slot = k + 1, cost, "P1 assignment");
                    (i, k)
                }
                None => {
                    let Some((i, k, d)) = lanes
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| !done[*i])
                        .filter_map(|(i, lane)| {
                            highest_d(lane.profiles().profiles())
                                .map(|k| (i, k, lane.profiles().profiles()[k].d))
                        })
                        .fold(None, |best: Option<(usize, usize, f64)>, cur| match best {
                            Some(b) if b.2 >= cur.2 => Some(b),
                            _ => Some(cur),
                        })
                    else {
                        break;
                    };
                    info!(lanes_left = n, d_target = target, lane = i + 1, slot = k + 1, d, "P1 assignment below target");
                    (i, k)
                }
            };

            chosen[lane] = slot;
            done[lane] = true;
            required -= lanes[lane].profiles().profiles()[slot].d;
        }
        Self { chosen }
    }

    #[inline]
    pub fn choose(&self, lane: usize) -> usize {
        self.chosen.get(lane).copied().unwrap_or(0)
    }

    /// Slot assigned to each lane.
    pub fn assignment(&self) -> &[usize] {
        &self.chosen
    }
}

/// Slot of the cheapest profile with `d >= d_min`.
fn cheapest_reaching(profiles: &[Profile], d_min: f64) -> Option<usize> {
    profiles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.d >= d_min)
        .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
            Some(b) if b.1 <= p.average_cost() => Some(b),
            _ => Some((i, p.average_cost())),
        })
        .map(|(i, _)| i)
}

fn highest_d(profiles: &[Profile]) -> Option<usize> {
    profiles
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
            Some(b) if b.1 >= p.d => Some(b),
            _ => Some((i, p.d)),
        })
        .map(|(i, _)| i)
}
