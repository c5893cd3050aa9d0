//! Working lanes taking customers from broken neighbours.
//!
//! A run of broken lanes between two working lanes is split at its midpoint:
//! each working lane looks after the broken lanes on its half, and when the
//! run has odd length both look after the middle one.  A broken run at the
//! end of the array belongs entirely to its single working neighbour.

use tracing::debug;

use crate::Lane;

/// How many lanes in direction `dir` (`+1` or `-1`) the working lane at
/// `pos` is responsible for.
pub fn lanes_to_help(lanes: &[Lane], pos: usize, dir: isize) -> usize {
    let mut n = 0usize;
    loop {
        let k = pos as isize + (n as isize + 1) * dir;
        if k < 0 || k as usize >= lanes.len() {
            return n;
        }
        if !lanes[k as usize].is_broken() {
            return (n + 1) / 2;
        }
        n += 1;
    }
}

/// Offsets from `pos` to try, in order.
///
/// Continues outward in the direction of `last_delta` past the lane last
/// borrowed from, then covers the other side, then wraps back to the lanes
/// skipped at the start.
pub fn search_order(lanes: &[Lane], pos: usize, last_delta: isize) -> Vec<isize> {
    let dir: isize = if last_delta >= 0 { 1 } else { -1 };
    let ahead = lanes_to_help(lanes, pos, dir) as isize;
    let behind = lanes_to_help(lanes, pos, -dir) as isize;
    let skipped = last_delta.abs();

    let mut out = Vec::with_capacity((ahead + behind) as usize);
    out.extend((skipped + 1..=ahead).map(|j| j * dir));
    out.extend((1..=behind).map(|j| -j * dir));
    out.extend((1..=skipped.min(ahead)).map(|j| j * dir));
    out
}

/// Let the lane at `pos` take the head customer of a broken neighbour.
///
/// Returns `true` if a customer was moved; it becomes the new head of
/// `lanes[pos]`.
pub fn borrow_from_neighbors(lanes: &mut [Lane], pos: usize) -> bool {
    if !lanes[pos].can_borrow() {
        return false;
    }
    for delta in search_order(lanes, pos, lanes[pos].last_borrow_delta()) {
        let from = (pos as isize + delta) as usize;
        if let Some(c) = lanes[from].give_head() {
            debug!(
                lane = lanes[pos].id().number(),
                from = lanes[from].id().number(),
                customer = %c,
                "taking customer from broken lane"
            );
            lanes[pos].accept_borrowed(c, delta);
            return true;
        }
    }
    false
}
