// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Connectivity patterns for connecting two layers

use ndarray::Array2;

use crate::shape::Shape;

/// Connectivity is the result of a [`Pattern`] connecting two layers:
/// per-unit connection counts on each side, plus the full boolean
/// connectivity matrix indexed `[recv, send]`.
#[derive(Debug, Clone)]
pub struct Connectivity {
    /// number of connections each sending unit makes
    pub send_n: Vec<i32>,
    /// number of connections each receiving unit has
    pub recv_n: Vec<i32>,
    /// cons[[ri, si]] is true when receiving unit ri connects to sending unit si
    pub cons: Array2<bool>,
}

impl Connectivity {
    pub fn new(send_len: usize, recv_len: usize) -> Connectivity {
        Connectivity {
            send_n: vec![0; send_len],
            recv_n: vec![0; recv_len],
            cons: Array2::default((recv_len, send_len)),
        }
    }
}

/// Pattern generates the connectivity between a sending and receiving layer.
/// `same` is true when the two layers are the same layer (a lateral,
/// self-projection).
pub trait Pattern {
    fn name(&self) -> &'static str;

    fn connect(&self, send: &Shape, recv: &Shape, same: bool) -> Connectivity;
}

/// Full connects every sending unit to every receiving unit
#[derive(Debug, Clone, Copy, Default)]
pub struct Full {
    /// include self-connections when connecting a layer to itself
    pub self_con: bool,
}

impl Full {
    pub fn new() -> Full {
        Full::default()
    }
}

impl Pattern for Full {
    fn name(&self) -> &'static str {
        "Full"
    }

    fn connect(&self, send: &Shape, recv: &Shape, same: bool) -> Connectivity {
        let (ns, nr) = (send.len(), recv.len());
        let mut cn = Connectivity::new(ns, nr);
        cn.cons.fill(true);
        cn.send_n.fill(nr as i32);
        cn.recv_n.fill(ns as i32);
        if same && !self.self_con {
            for i in 0..ns.min(nr) {
                cn.cons[[i, i]] = false;
                cn.send_n[i] -= 1;
                cn.recv_n[i] -= 1;
            }
        }
        cn
    }
}

/// OneToOne connects sending unit i to receiving unit i
#[derive(Debug, Clone, Copy, Default)]
pub struct OneToOne {
    /// number of connections to make; 0 means make as many as possible
    pub n_cons: usize,
    /// starting unit index on the receiving side
    pub recv_start: usize,
    /// starting unit index on the sending side
    pub send_start: usize,
}

impl OneToOne {
    pub fn new() -> OneToOne {
        OneToOne::default()
    }
}

impl Pattern for OneToOne {
    fn name(&self) -> &'static str {
        "OneToOne"
    }

    fn connect(&self, send: &Shape, recv: &Shape, _same: bool) -> Connectivity {
        let (ns, nr) = (send.len(), recv.len());
        let mut cn = Connectivity::new(ns, nr);
        let ncon = if self.n_cons > 0 {
            self.n_cons.min(nr)
        } else {
            nr
        };
        for i in 0..ncon {
            let ri = self.recv_start + i;
            let si = self.send_start + i;
            if ri >= nr || si >= ns {
                break;
            }
            cn.cons[[ri, si]] = true;
            cn.recv_n[ri] = 1;
            cn.send_n[si] = 1;
        }
        cn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_counts() {
        let ssh = Shape::d2(2, 3);
        let rsh = Shape::d2(2, 2);
        let cn = Full::new().connect(&ssh, &rsh, false);
        assert_eq!(cn.send_n, vec![4; 6]);
        assert_eq!(cn.recv_n, vec![6; 4]);
        assert_eq!(cn.cons.iter().filter(|&&c| c).count(), 24);
    }

    #[test]
    fn full_lateral_excludes_self() {
        let sh = Shape::d2(1, 4);
        let cn = Full::new().connect(&sh, &sh, true);
        assert_eq!(cn.send_n, vec![3; 4]);
        assert_eq!(cn.recv_n, vec![3; 4]);
        for i in 0..4 {
            assert!(!cn.cons[[i, i]]);
        }

        let cn = Full { self_con: true }.connect(&sh, &sh, true);
        assert_eq!(cn.send_n, vec![4; 4]);
        assert!(cn.cons[[2, 2]]);
    }

    #[test]
    fn one_to_one_offsets() {
        let ssh = Shape::d2(1, 5);
        let rsh = Shape::d2(1, 4);
        let pat = OneToOne {
            n_cons: 2,
            recv_start: 1,
            send_start: 2,
        };
        let cn = pat.connect(&ssh, &rsh, false);
        assert!(cn.cons[[1, 2]]);
        assert!(cn.cons[[2, 3]]);
        assert_eq!(cn.recv_n, vec![0, 1, 1, 0]);
        assert_eq!(cn.send_n, vec![0, 0, 1, 1, 0]);
    }
}
