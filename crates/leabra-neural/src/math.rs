// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Small math helpers: min/max ranges and running average/max stats

use serde::{Deserialize, Serialize};

/// MinMax is a simple min / max range
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f32,
    pub max: f32,
}

impl MinMax {
    pub fn new(min: f32, max: f32) -> MinMax {
        MinMax { min, max }
    }

    /// Clip clips the given value within the range
    pub fn clip(&self, val: f32) -> f32 {
        val.clamp(self.min, self.max)
    }
}

/// AvgMax holds a running average and max statistic over a set of values
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AvgMax {
    pub avg: f32,
    pub max: f32,
    /// sum for computing average
    pub sum: f32,
    /// index of max item
    pub max_idx: i32,
    /// number of items in sum
    pub n: i32,
}

impl AvgMax {
    pub fn init(&mut self) {
        self.avg = 0.0;
        self.sum = 0.0;
        self.n = 0;
        self.max = f32::MIN;
        self.max_idx = -1;
    }

    /// UpdateVal updates stats from given value and index
    pub fn update_val(&mut self, val: f32, idx: i32) {
        self.sum += val;
        self.n += 1;
        if val > self.max {
            self.max = val;
            self.max_idx = idx;
        }
    }

    /// CalcAvg computes the average given the current sum and n
    pub fn calc_avg(&mut self) {
        if self.n > 0 {
            self.avg = self.sum / self.n as f32;
        } else {
            self.avg = self.sum;
            self.max = 0.0; // prevent leakage of MIN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avg_max() {
        let mut am = AvgMax::default();
        am.init();
        for (i, v) in [0.1f32, 0.5, 0.3].iter().enumerate() {
            am.update_val(*v, i as i32);
        }
        am.calc_avg();
        assert!((am.avg - 0.3).abs() < 1e-6);
        assert_eq!(am.max, 0.5);
        assert_eq!(am.max_idx, 1);

        am.init();
        am.calc_avg();
        assert_eq!(am.avg, 0.0);
        assert_eq!(am.max, 0.0);
    }

    #[test]
    fn min_max_clip() {
        let mm = MinMax::new(0.0, 0.95);
        assert_eq!(mm.clip(-0.2), 0.0);
        assert_eq!(mm.clip(0.5), 0.5);
        assert_eq!(mm.clip(1.2), 0.95);
    }
}
