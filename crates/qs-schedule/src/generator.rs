//! Dynamic arrival generation.

use qs_core::{QsError, QsResult, SimRng, SimTime};

use crate::ArrivalRecord;

/// Poisson arrivals with rate `lambda` per lane; each arrival is a threat
/// with probability `frac_bad`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ArrivalGenerator {
    pub lambda:   f64,
    pub frac_bad: f64,
}

impl ArrivalGenerator {
    pub fn new(lambda: f64, frac_bad: f64) -> Self {
        Self { lambda, frac_bad }
    }

    /// Arrival time of the next customer after one arriving at `now`.
    ///
    /// The exponential gap `-ln(1-p)/lambda` is truncated to whole time
    /// units, so consecutive customers may share an arrival time.
    pub fn next_time(&self, now: SimTime, rng: &mut SimRng) -> SimTime {
        let p = rng.unit();
        let gap = -(1.0 - p).ln() / self.lambda;
        now + gap as u64
    }

    #[inline]
    pub fn threat(&self, rng: &mut SimRng) -> bool {
        rng.gen_bool(self.frac_bad)
    }

    /// Draw the next arrival after `now`.  Time is drawn before the threat
    /// flag.
    pub fn next_arrival(&self, now: SimTime, rng: &mut SimRng) -> ArrivalRecord {
        let time = self.next_time(now, rng);
        let threat = self.threat(rng);
        ArrivalRecord { time, threat }
    }

    /// Pre-generate `count` arrivals starting from time 0, for persistence.
    pub fn generate(&self, count: u32, rng: &mut SimRng) -> QsResult<Vec<ArrivalRecord>> {
        if count == 0 {
            return Err(QsError::Config(
                "generating an arrival schedule needs a positive customer count (n_gen_max)".into(),
            ));
        }
        let mut t = SimTime::ZERO;
        let mut out = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let rec = self.next_arrival(t, rng);
            t = rec.time;
            out.push(rec);
        }
        Ok(out)
    }
}
