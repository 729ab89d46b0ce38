// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Row-major tensor shapes for layer unit geometry

use serde::{Deserialize, Serialize};

/// Shape describes the unit geometry of a layer, in row-major order.
/// 2D shapes are `[y, x]`; 4D shapes are `[pool_y, pool_x, y, x]` where the
/// outer two dimensions index inhibitory sub-pools (unit groups) and the
/// inner two index units within each pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: &[usize]) -> Shape {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// 2D shape: y rows of x units
    pub fn d2(y: usize, x: usize) -> Shape {
        Shape::new(&[y, x])
    }

    /// 4D shape: pool_y x pool_x sub-pools, each y x x units
    pub fn d4(pool_y: usize, pool_x: usize, y: usize, x: usize) -> Shape {
        Shape::new(&[pool_y, pool_x, y, x])
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    /// total number of units
    pub fn len(&self) -> usize {
        if self.dims.is_empty() {
            return 0;
        }
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// number of inhibitory sub-pools: pool_y * pool_x for 4D shapes, 0 otherwise
    pub fn n_pools(&self) -> usize {
        if self.dims.len() == 4 {
            self.dims[0] * self.dims[1]
        } else {
            0
        }
    }

    /// number of units per sub-pool, for 4D shapes
    pub fn units_per_pool(&self) -> usize {
        if self.dims.len() == 4 {
            self.dims[2] * self.dims[3]
        } else {
            self.len()
        }
    }

    /// flat row-major offset of the given index, which must have num_dims entries
    pub fn offset(&self, idx: &[usize]) -> usize {
        debug_assert_eq!(idx.len(), self.dims.len());
        let mut off = 0;
        for (i, &d) in self.dims.iter().enumerate() {
            off = off * d + idx[i];
        }
        off
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_and_pools() {
        let s2 = Shape::d2(3, 4);
        assert_eq!(s2.len(), 12);
        assert_eq!(s2.n_pools(), 0);
        assert_eq!(s2.units_per_pool(), 12);

        let s4 = Shape::d4(2, 3, 4, 5);
        assert_eq!(s4.len(), 120);
        assert_eq!(s4.n_pools(), 6);
        assert_eq!(s4.units_per_pool(), 20);
    }

    #[test]
    fn row_major_offset() {
        let s2 = Shape::d2(3, 4);
        assert_eq!(s2.offset(&[0, 0]), 0);
        assert_eq!(s2.offset(&[1, 0]), 4);
        assert_eq!(s2.offset(&[2, 3]), 11);

        let s4 = Shape::d4(2, 3, 4, 5);
        assert_eq!(s4.offset(&[0, 1, 0, 0]), 20);
        assert_eq!(s4.offset(&[1, 0, 0, 0]), 60);
    }
}
