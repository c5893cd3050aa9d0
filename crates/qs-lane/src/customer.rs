//! Customers and their screening records.

use std::fmt;

use qs_core::{ProfileId, SimTime};

/// The record attached to a customer once screening starts.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Service {
    /// Position of the profile in the serving lane's profile list.
    pub slot:     usize,
    /// The same profile, as an id into the global pool.
    pub profile:  ProfileId,
    pub start:    SimTime,
    pub end:      SimTime,
    /// Upper bound of the profile's service time (`high`).
    pub max_cost: u64,
}

impl Service {
    /// Elapsed screening time at `now` as a fraction of `max_cost`.
    ///
    /// A profile with `high == 0` finishes instantly, so its customers count
    /// as fully screened.
    pub fn elapsed_fraction(&self, now: SimTime) -> f64 {
        if self.max_cost == 0 {
            return 1.0;
        }
        (now.0 as f64 - self.start.0 as f64) / self.max_cost as f64
    }
}

/// One arriving person.
#[derive(Clone, PartialEq, Debug)]
pub struct Customer {
    pub threat:      bool,
    pub arrival:     SimTime,
    /// `Some` from the moment screening starts.
    pub service:     Option<Service>,
    /// Only meaningful for threats whose screening has completed.
    pub detected:    bool,
    /// Set once the customer has been moved to another lane.
    pub transferred: bool,
}

impl Customer {
    pub fn new(threat: bool, arrival: SimTime) -> Self {
        Self { threat, arrival, service: None, detected: false, transferred: false }
    }

    #[inline]
    pub fn in_service(&self) -> bool {
        self.service.is_some()
    }

    /// One-character picture: `x` threat, `o` clean; upper case once
    /// transferred.
    pub fn label(&self) -> char {
        match (self.transferred, self.threat) {
            (true, true)   => 'X',
            (true, false)  => 'O',
            (false, true)  => 'x',
            (false, false) => 'o',
        }
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] arrives at {}", self.label(), self.arrival.0)?;
        match &self.service {
            None    => write!(f, ", never screened"),
            Some(s) => write!(f, ", screened at [{} : {}]", s.start.0, s.end.0),
        }
    }
}
