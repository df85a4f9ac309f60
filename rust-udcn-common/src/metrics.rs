//! Metrics collection and reporting for μDCN.
//!
//! Counters are observability only; no forwarding decision reads them.

use std::sync::atomic::{AtomicU64, Ordering};

/* ---------------------------------------------------------------- *
 * Simple Counter
 * ---------------------------------------------------------------- */

#[derive(Debug)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.value.store(0, Ordering::Relaxed);
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        let c = Counter::new();
        c.value.store(self.value.load(Ordering::Relaxed), Ordering::Relaxed);
        c
    }
}

/* ---------------------------------------------------------------- *
 * Gauge
 * ---------------------------------------------------------------- */

#[derive(Debug)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Gauge {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Gauge {
    fn clone(&self) -> Self {
        let g = Gauge::new();
        g.value.store(self.value.load(Ordering::Relaxed), Ordering::Relaxed);
        g
    }
}

/* ---------------------------------------------------------------- *
 * Aggregate forwarder counters
 * ---------------------------------------------------------------- */

#[derive(Debug, Default, Clone)]
pub struct ForwarderCounters {
    // Packets in and out, per type
    pub n_in_interests: Counter,
    pub n_out_interests: Counter,
    pub n_in_data: Counter,
    pub n_out_data: Counter,
    pub n_in_nacks: Counter,
    pub n_out_nacks: Counter,

    // PIT outcomes
    pub n_satisfied_interests: Counter,
    pub n_unsatisfied_interests: Counter,

    // Cache metrics
    pub cs_hits: Counter,
    pub cs_misses: Counter,

    pub pit_size: Gauge,
    pub cs_size: Gauge,
}

impl ForwarderCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every packet and outcome counter. Table-size gauges are kept.
    pub fn reset(&self) {
        for counter in [
            &self.n_in_interests,
            &self.n_out_interests,
            &self.n_in_data,
            &self.n_out_data,
            &self.n_in_nacks,
            &self.n_out_nacks,
            &self.n_satisfied_interests,
            &self.n_unsatisfied_interests,
            &self.cs_hits,
            &self.cs_misses,
        ] {
            counter.reset();
        }
    }
}
