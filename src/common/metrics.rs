//! Write outcome counters
//!
//! Counts settled writes per consistency level and outcome, and renders them
//! in the Prometheus text format for the `/metrics` route.

use crate::common::{ConsistencyLevel, Result};
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

const LEVELS: [ConsistencyLevel; 5] = [
    ConsistencyLevel::Any,
    ConsistencyLevel::One,
    ConsistencyLevel::Quorum,
    ConsistencyLevel::Owner,
    ConsistencyLevel::All,
];

/// Monotonic counter
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Outcomes recorded for one consistency level
#[derive(Debug, Default)]
pub struct LevelCounters {
    pub succeeded: Counter,
    pub failed: Counter,
    pub timed_out: Counter,
}

#[derive(Debug, Default)]
pub struct WriteMetrics {
    levels: [LevelCounters; 5],
}

impl WriteMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, level: ConsistencyLevel) -> &LevelCounters {
        let index = match level {
            ConsistencyLevel::Any => 0,
            ConsistencyLevel::One => 1,
            ConsistencyLevel::Quorum => 2,
            ConsistencyLevel::Owner => 3,
            ConsistencyLevel::All => 4,
        };
        &self.levels[index]
    }

    /// Count one settled write. Timeouts are kept apart from failures
    /// since their outcome is unknown.
    pub fn record(&self, level: ConsistencyLevel, result: &Result<()>) {
        let counters = self.level(level);
        match result {
            Ok(()) => counters.succeeded.inc(),
            Err(e) if e.is_timeout() => counters.timed_out.inc(),
            Err(_) => counters.failed.inc(),
        }
    }

    pub fn to_prometheus(&self) -> String {
        let mut out = String::new();
        out.push_str("# HELP minits_writes_total Settled writes by consistency level and outcome\n");
        out.push_str("# TYPE minits_writes_total counter\n");
        for level in LEVELS {
            let counters = self.level(level);
            for (outcome, counter) in [
                ("succeeded", &counters.succeeded),
                ("failed", &counters.failed),
                ("timed_out", &counters.timed_out),
            ] {
                let _ = writeln!(
                    out,
                    "minits_writes_total{{level=\"{}\",outcome=\"{}\"}} {}",
                    level,
                    outcome,
                    counter.get()
                );
            }
        }
        out
    }
}
