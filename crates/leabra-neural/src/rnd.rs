// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Parameterized random value generation for weight init and activation noise

use rand::Rng;
use serde::{Deserialize, Serialize};

/// RndDist is the type of random distribution to generate from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RndDist {
    /// always returns the mean
    #[default]
    None,
    /// uniform within mean +/- var
    Uniform,
    /// gaussian with var = standard deviation
    Gaussian,
}

/// RndParams specifies a random distribution with mean and spread
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RndParams {
    pub dist: RndDist,
    pub mean: f32,
    /// spread: range for uniform, stddev for gaussian
    pub var: f32,
}

impl Default for RndParams {
    fn default() -> Self {
        RndParams {
            dist: RndDist::Uniform,
            mean: 0.5,
            var: 0.25,
        }
    }
}

impl RndParams {
    /// Gen generates a random value according to the distribution parameters
    pub fn gen<R: Rng>(&self, rng: &mut R) -> f32 {
        match self.dist {
            RndDist::None => self.mean,
            RndDist::Uniform => {
                if self.var == 0.0 {
                    self.mean
                } else {
                    rng.gen_range((self.mean - self.var)..(self.mean + self.var))
                }
            }
            RndDist::Gaussian => {
                // Box-Muller transform
                let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
                let u2: f32 = rng.gen_range(0.0..1.0);
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
                self.mean + self.var * z
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn uniform_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let rp = RndParams::default();
        for _ in 0..100 {
            let v = rp.gen(&mut rng);
            assert!(v >= 0.25 && v < 0.75);
        }
    }

    #[test]
    fn none_returns_mean() {
        let mut rng = StdRng::seed_from_u64(1);
        let rp = RndParams {
            dist: RndDist::None,
            mean: 0.3,
            var: 0.1,
        };
        assert_eq!(rp.gen(&mut rng), 0.3);
    }
}
