// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Timing state and parameters for running a model

use serde::{Deserialize, Serialize};

/// Time contains the timing state and parameter information for running a model.
/// A standard alpha trial is 4 quarters of 25 cycles each; the final quarter
/// (index 3) is the plus phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Time {
    /// accumulated simulation time, in seconds
    pub time: f32,
    /// cycle counter within the current alpha trial, typically 0-99
    pub cycle: i32,
    /// total cycle count since last reset
    pub cycle_tot: i32,
    /// current quarter of the alpha trial, 0-3
    pub quarter: i32,
    /// true in the plus phase (final quarter = 3), else minus phase
    pub plus_phase: bool,

    /// amount of time to increment per cycle
    pub time_per_cyc: f32,
    /// number of cycles per quarter to run; 25 = standard 100 msec alpha trial
    pub cyc_per_qtr: i32,
}

impl Default for Time {
    fn default() -> Self {
        Time {
            time: 0.0,
            cycle: 0,
            cycle_tot: 0,
            quarter: 0,
            plus_phase: false,
            time_per_cyc: 0.001,
            cyc_per_qtr: 25,
        }
    }
}

impl Time {
    pub fn new() -> Time {
        Time::default()
    }

    /// Reset resets all counters back to zero
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.cycle = 0;
        self.cycle_tot = 0;
        self.quarter = 0;
        self.plus_phase = false;
    }

    /// TrialStart starts a new alpha trial (set of 4 quarters)
    pub fn trial_start(&mut self) {
        self.cycle = 0;
        self.quarter = 0;
        self.plus_phase = false;
    }

    /// CycleInc increments at the cycle level
    pub fn cycle_inc(&mut self) {
        self.cycle += 1;
        self.cycle_tot += 1;
        self.time += self.time_per_cyc;
    }

    /// QuarterInc increments at the quarter level, updating quarter and plus_phase
    pub fn quarter_inc(&mut self) {
        self.quarter += 1;
        self.plus_phase = self.quarter == 3;
    }

    /// Quarters flag for the current quarter
    pub fn quarters(&self) -> Quarters {
        Quarters::from_quarter(self.quarter)
    }
}

/// Bit flags for the alpha trial quarters, for timing parameters that
/// apply only in certain quarters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quarters(u32);

impl Quarters {
    /// first quarter, quarter index 0
    pub const Q1: Quarters = Quarters(1 << 0);
    pub const Q2: Quarters = Quarters(1 << 1);
    pub const Q3: Quarters = Quarters(1 << 2);
    /// fourth quarter, the plus phase
    pub const Q4: Quarters = Quarters(1 << 3);

    /// flag for the given 0-based quarter index
    pub fn from_quarter(q: i32) -> Quarters {
        Quarters(1 << q as u32)
    }

    pub fn has(self, q: Quarters) -> bool {
        self.0 & q.0 != 0
    }

    pub fn set(&mut self, q: Quarters) {
        self.0 |= q.0;
    }

    pub fn clear(&mut self, q: Quarters) {
        self.0 &= !q.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarters_and_phases() {
        let mut tm = Time::new();
        for q in 0..4 {
            assert_eq!(tm.quarter, q);
            assert_eq!(tm.plus_phase, q == 3);
            for _ in 0..tm.cyc_per_qtr {
                tm.cycle_inc();
            }
            tm.quarter_inc();
        }
        assert_eq!(tm.cycle, 100);
        assert!((tm.time - 0.1).abs() < 1e-6);
        tm.trial_start();
        assert_eq!(tm.cycle, 0);
        assert_eq!(tm.quarter, 0);
        assert!(!tm.plus_phase);
        assert_eq!(tm.cycle_tot, 100);
    }

    #[test]
    fn quarter_flags() {
        let mut tm = Time::new();
        assert_eq!(tm.quarters(), Quarters::Q1);
        tm.quarter = 3;
        assert_eq!(tm.quarters(), Quarters::Q4);

        let mut qs = Quarters::default();
        qs.set(Quarters::Q2);
        qs.set(Quarters::Q4);
        assert!(qs.has(Quarters::Q2));
        assert!(!qs.has(Quarters::Q1));
        assert!(qs.has(tm.quarters()));
        qs.clear(Quarters::Q4);
        assert!(!qs.has(Quarters::Q4));
    }
}
