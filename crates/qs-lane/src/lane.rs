//! The per-lane event state machine.

use std::collections::VecDeque;

use qs_core::{CountInService, LaneId, ProfileSet, QsError, QsResult, SimRng, SimTime};
use qs_schedule::{ArrivalGenerator, ArrivalSchedule};

use crate::{Customer, Service};

/// How many of its own customers a lane must finish after taking one from a
/// broken neighbour before it may take another (unless its own queue is
/// empty).
pub const OWN_BETWEEN_BORROWS: u32 = 2;

// ── Arrival source ────────────────────────────────────────────────────────────

/// Where a lane's future customers come from.
#[derive(Clone, Debug)]
pub enum ArrivalSource {
    /// Drawn on the fly from the shared random source.
    Generated(ArrivalGenerator),
    /// Read in order from a pre-generated list.
    Scheduled(ArrivalSchedule),
}

// ── Counters ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaneCounters {
    /// Customers drawn from the arrival source (including the pending one).
    pub generated:  u32,
    pub arrived:    u32,
    pub completed:  u32,
    pub detected:   u32,
    pub missed:     u32,
    /// Completions per profile slot; sums to `completed`.
    pub by_profile: Vec<u32>,
}

// ── Lane ──────────────────────────────────────────────────────────────────────

/// One screening lane.
///
/// The front of `waiting` is the only customer that can be in service.
#[derive(Clone, Debug)]
pub struct Lane {
    id:                LaneId,
    profiles:          ProfileSet,
    waiting:           VecDeque<Customer>,
    completed:         Vec<Customer>,
    /// The next customer, drawn but not yet arrived.
    pending:           Option<Customer>,
    source:            ArrivalSource,
    cap:               Option<u32>,
    broken:            bool,
    counters:          LaneCounters,
    own_quota:         u32,
    last_borrow_delta: isize,
    current_slot:      usize,
}

impl Lane {
    /// Create a lane at time `now` and draw its first pending customer.
    ///
    /// `cap` limits how many customers the lane ever draws.  A scheduled
    /// source without a cap is read until it runs out; with a cap, running
    /// out early is a [`QsError::ScheduleExhausted`].
    pub fn new(
        id:       LaneId,
        profiles: ProfileSet,
        source:   ArrivalSource,
        cap:      Option<u32>,
        now:      SimTime,
        rng:      &mut SimRng,
    ) -> QsResult<Self> {
        let counters = LaneCounters {
            by_profile: vec![0; profiles.len()],
            ..LaneCounters::default()
        };
        let mut lane = Self {
            id,
            profiles,
            waiting: VecDeque::new(),
            completed: Vec::new(),
            pending: None,
            source,
            cap,
            broken: false,
            counters,
            own_quota: 0,
            last_borrow_delta: 0,
            current_slot: 0,
        };
        lane.pending = lane.draw(now, rng)?;
        Ok(lane)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> LaneId {
        self.id
    }

    #[inline]
    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    #[inline]
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn set_broken(&mut self, broken: bool) {
        self.broken = broken;
    }

    #[inline]
    pub fn counters(&self) -> &LaneCounters {
        &self.counters
    }

    /// Queued customers, head first.  The head may be in service.
    #[inline]
    pub fn waiting(&self) -> &VecDeque<Customer> {
        &self.waiting
    }

    /// Customers whose screening has finished, in completion order.
    #[inline]
    pub fn completed(&self) -> &[Customer] {
        &self.completed
    }

    #[inline]
    pub fn pending(&self) -> Option<&Customer> {
        self.pending.as_ref()
    }

    /// Own customers still to serve before the next borrow.
    #[inline]
    pub fn own_quota(&self) -> u32 {
        self.own_quota
    }

    /// Profile slot of the most recent screening (0 before the first).
    #[inline]
    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    /// Offset of the neighbour the last borrowed customer came from.
    #[inline]
    pub fn last_borrow_delta(&self) -> isize {
        self.last_borrow_delta
    }

    /// Draws arrivals forever: dynamic generation with no cap.
    pub fn generation_unbounded(&self) -> bool {
        matches!(self.source, ArrivalSource::Generated(_)) && self.cap.is_none()
    }

    // ── Arrival source ────────────────────────────────────────────────────

    fn finished_generation(&self) -> bool {
        if self.cap.is_some_and(|cap| self.counters.generated >= cap) {
            return true;
        }
        match &self.source {
            ArrivalSource::Generated(_)  => false,
            ArrivalSource::Scheduled(s)  => self.cap.is_none() && !s.has_next(),
        }
    }

    /// The next customer from the source, or `None` once generation is over.
    fn draw(&mut self, now: SimTime, rng: &mut SimRng) -> QsResult<Option<Customer>> {
        if self.finished_generation() {
            return Ok(None);
        }
        let rec = match &mut self.source {
            ArrivalSource::Generated(g) => g.next_arrival(now, rng),
            ArrivalSource::Scheduled(s) => s.next_arrival(self.id)?,
        };
        self.counters.generated += 1;
        Ok(Some(Customer::new(rec.threat, rec.time)))
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Move the pending customer into the queue if it arrives at `now`.
    ///
    /// Returns `true` if an arrival took place.
    pub fn handle_arrival(&mut self, now: SimTime, rng: &mut SimRng) -> QsResult<bool> {
        let Some(due) = self.pending.as_ref().map(|c| c.arrival) else {
            return Ok(false);
        };
        if now < due {
            return Ok(false);
        }
        if now > due {
            return Err(QsError::MissedEvent { time: now, lane: self.id, event: "arrival", due: due.0 });
        }
        if let Some(c) = self.pending.take() {
            self.waiting.push_back(c);
        }
        self.counters.arrived += 1;
        self.pending = self.draw(now, rng)?;
        Ok(true)
    }

    /// Finish the head's screening if it ends at `now`.
    ///
    /// Returns `true` if a screening completed.
    pub fn handle_completion(&mut self, now: SimTime, rng: &mut SimRng) -> QsResult<bool> {
        let Some(end) = self.waiting.front().and_then(|c| c.service).map(|s| s.end) else {
            return Ok(false);
        };
        if end > now {
            return Ok(false);
        }
        if end < now {
            return Err(QsError::MissedEvent {
                time:  now,
                lane:  self.id,
                event: "service completion",
                due:   end.0,
            });
        }
        if let Some(c) = self.waiting.pop_front() {
            self.complete(c, rng);
        }
        Ok(true)
    }

    fn complete(&mut self, mut c: Customer, rng: &mut SimRng) {
        let Some(service) = c.service else { return };
        self.counters.completed += 1;
        if let Some(n) = self.counters.by_profile.get_mut(service.slot) {
            *n += 1;
        }
        if c.threat {
            // A broken device cannot detect anything.
            c.detected = !self.broken
                && self.profiles.get(service.slot).is_some_and(|p| p.detects(rng));
            if c.detected {
                self.counters.detected += 1;
            } else {
                self.counters.missed += 1;
            }
        }
        if !c.transferred {
            self.own_quota = self.own_quota.saturating_sub(1);
        }
        self.completed.push(c);
    }

    /// Working, with a queued head that is not yet being screened.
    pub fn awaiting_service(&self) -> bool {
        !self.broken && self.waiting.front().is_some_and(|c| !c.in_service())
    }

    /// Begin screening the head with the profile at `slot`.
    ///
    /// A broken lane, or one with nothing to start, is left unchanged.
    pub fn start_service(&mut self, slot: usize, now: SimTime, rng: &mut SimRng) -> QsResult<()> {
        if !self.awaiting_service() {
            return Ok(());
        }
        let (Some(&profile), Some(member)) = (self.profiles.get(slot), self.profiles.member(slot))
        else {
            return Err(QsError::InvalidProfileChoice {
                time:      now,
                lane:      self.id,
                slot,
                available: self.profiles.len(),
            });
        };
        let duration = profile.service_time(rng) as u64;
        self.current_slot = slot;
        if let Some(head) = self.waiting.front_mut() {
            head.service = Some(Service {
                slot,
                profile:  member,
                start:    now,
                end:      now + duration,
                max_cost: profile.high,
            });
        }
        Ok(())
    }

    /// Nobody is being screened right now.
    pub fn is_idle(&self) -> bool {
        self.waiting.front().is_none_or(|c| !c.in_service())
    }

    /// Earliest time at which this lane has something to do: the current
    /// screening's end or the pending arrival.  `None` if neither exists.
    pub fn next_activity_time(&self) -> Option<SimTime> {
        let end = self.waiting.front().and_then(|c| c.service).map(|s| s.end);
        let arrival = self.pending.as_ref().map(|c| c.arrival);
        match (end, arrival) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Relief ────────────────────────────────────────────────────────────

    /// May this lane take a customer from a broken neighbour right now?
    ///
    /// It must be working and idle, and must have served its quota of own
    /// customers since the last borrow unless it has none waiting.
    pub fn can_borrow(&self) -> bool {
        !self.broken && self.is_idle() && (self.waiting.is_empty() || self.own_quota == 0)
    }

    /// Hand over the head customer, if this lane is broken and the head is
    /// not already being screened here.
    pub fn give_head(&mut self) -> Option<Customer> {
        if !self.broken || self.waiting.front().is_none_or(Customer::in_service) {
            return None;
        }
        self.waiting.pop_front()
    }

    /// Put a customer taken from the neighbour at offset `delta` at the head
    /// of this lane's queue.
    pub fn accept_borrowed(&mut self, mut c: Customer, delta: isize) {
        c.transferred = true;
        self.waiting.push_front(c);
        self.last_borrow_delta = delta;
        self.own_quota = OWN_BETWEEN_BORROWS;
    }

    // ── Queue metrics and text ────────────────────────────────────────────

    /// The queue length as seen by length-ranking policies.
    ///
    /// The head counts fully, not at all, or by the unelapsed fraction of
    /// its maximum screening time, depending on `mode`.
    pub fn queue_length(&self, mode: CountInService, now: SimTime) -> QsResult<f64> {
        let w = self.waiting.len() as f64;
        let Some(service) = self.waiting.front().and_then(|c| c.service) else {
            return Ok(w);
        };
        match mode {
            CountInService::Yes => Ok(w),
            CountInService::No  => Ok(w - 1.0),
            CountInService::Partially => {
                let fraction = service.elapsed_fraction(now);
                if !(0.0..=1.0).contains(&fraction) {
                    return Err(QsError::ElapsedOutOfRange { time: now, lane: self.id, fraction });
                }
                Ok(w - fraction)
            }
        }
    }

    /// `X` if broken, else `P<k>` for the 1-based current profile.
    pub fn status_label(&self) -> String {
        if self.broken {
            "X".to_string()
        } else {
            format!("P{}", self.current_slot + 1)
        }
    }

    /// Status label, own quota and one glyph per queued customer.
    pub fn queue_picture(&self) -> String {
        let mut s = format!("{}:{} ", self.status_label(), self.own_quota);
        s.extend(self.waiting.iter().map(Customer::label));
        s
    }

    /// One-line status: counters, then a tab and the queue picture.
    pub fn describe(&self) -> String {
        let c = &self.counters;
        format!(
            "Gen={}; Arv={}; Done {}, detected={} missed={}\t{}",
            c.generated,
            c.arrived,
            c.completed,
            c.detected,
            c.missed,
            self.queue_picture()
        )
    }
}
