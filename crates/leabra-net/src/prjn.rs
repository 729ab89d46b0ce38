// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Projections: synaptic pathways between two layers

use serde::{Deserialize, Serialize};
use tracing::error;

use leabra_neural::{AvgMax, LearnSynParams, Neuron, Synapse, WtBalRecv, WtScaleParams};
use rand::rngs::StdRng;

use crate::error::{NetError, Result};
use crate::pattern::Pattern;
use crate::shape::Shape;

/// PrjnType is the functional type of a projection, which determines how
/// its conductances are received (excitatory vs inhibitory) and how it is
/// grouped for netinput scaling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrjnType {
    /// feedforward, from lower to higher layers
    #[default]
    Forward,
    /// feedback, from higher to lower layers
    Back,
    /// lateral, within the same or laterally-organized layers
    Lateral,
    /// drives inhibitory (GABA) conductances instead of excitatory
    Inhib,
}

/// ConIdxs is one side of the compressed connection structure for a
/// projection: per-unit connection counts, starting offsets into the
/// shared index arena, and the arena itself holding the other side's
/// unit index for each connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConIdxs {
    /// number of connections for each unit on this side
    pub n: Vec<i32>,
    /// starting offset of each unit's connections in idx
    pub idx_st: Vec<i32>,
    /// unit index on the other side, for each connection
    pub idx: Vec<i32>,
    /// average and max of n, for netinput scaling
    pub n_avg_max: AvgMax,
}

impl ConIdxs {
    /// set the per-unit counts and compute starting offsets, returning the
    /// total number of connections
    pub fn set_n(&mut self, ns: &[i32]) -> i32 {
        self.n = ns.to_vec();
        self.idx_st = vec![0; ns.len()];
        self.n_avg_max.init();
        let mut idx = 0;
        for (i, &nv) in ns.iter().enumerate() {
            self.idx_st[i] = idx;
            idx += nv;
            self.n_avg_max.update_val(nv as f32, i as i32);
        }
        self.n_avg_max.calc_avg();
        idx
    }

    /// range of connection indices for the given unit
    pub fn range(&self, ui: usize) -> std::ops::Range<usize> {
        let st = self.idx_st[ui] as usize;
        st..st + self.n[ui] as usize
    }
}

/// Projection connects a sending layer to a receiving layer with a bank of
/// synapses generated by a connectivity [`Pattern`]. Layers are referenced
/// by index into the owning network's layer list. Synapses are stored in
/// sender order; the receiver side indexes into them via `r_syn_idx`.
pub struct Projection {
    /// inactivate this projection, excluding it from all computation
    pub off: bool,
    /// index of the sending layer in the network
    pub send_lay: usize,
    /// index of the receiving layer in the network
    pub recv_lay: usize,
    /// name of the sending layer, for display and weights files
    pub send_nm: String,
    /// name of the receiving layer
    pub recv_nm: String,
    /// connectivity pattern generating the synapse structure
    pub pat: Box<dyn Pattern + Send + Sync>,
    /// functional type of the projection
    pub typ: PrjnType,

    /// scaling of the overall conductance received from this projection
    pub wt_scale: WtScaleParams,
    /// synaptic learning parameters
    pub learn: LearnSynParams,

    /// receiver-side connection structure
    pub recv_con: ConIdxs,
    /// synapse index (into syns) for each receiver-side connection
    pub r_syn_idx: Vec<i32>,
    /// sender-side connection structure; syns share its ordering
    pub send_con: ConIdxs,
    /// all synapses, in sender order
    pub syns: Vec<Synapse>,

    /// computed conductance scaling factor, from wt_scale and sending
    /// layer activity, set at trial start
    pub g_scale: f32,
    /// per-receiving-unit accumulated conductance deltas
    pub g_inc: Vec<f32>,
    /// per-receiving-unit weight balance factors
    pub wb_recv: Vec<WtBalRecv>,
}

impl Projection {
    pub fn new(
        send_lay: usize,
        recv_lay: usize,
        pat: Box<dyn Pattern + Send + Sync>,
        typ: PrjnType,
    ) -> Projection {
        Projection {
            off: false,
            send_lay,
            recv_lay,
            send_nm: String::new(),
            recv_nm: String::new(),
            pat,
            typ,
            wt_scale: WtScaleParams::default(),
            learn: LearnSynParams::default(),
            recv_con: ConIdxs::default(),
            r_syn_idx: Vec::new(),
            send_con: ConIdxs::default(),
            syns: Vec::new(),
            g_scale: 1.0,
            g_inc: Vec::new(),
            wb_recv: Vec::new(),
        }
    }

    /// projection name: SendToRecv
    pub fn name(&self) -> String {
        format!("{}To{}", self.send_nm, self.recv_nm)
    }

    pub fn update_params(&mut self) {
        self.learn.update();
    }

    /// build constructs the full connection structure and synapse bank from
    /// the pattern, given the two layer shapes. `same` is true for a
    /// self-projection.
    pub fn build(&mut self, ssh: &Shape, rsh: &Shape, same: bool) -> Result<()> {
        if self.off {
            return Ok(());
        }
        if ssh.is_empty() || rsh.is_empty() {
            return Err(NetError::Build(format!(
                "projection {}: layer shape has no units",
                self.name()
            )));
        }
        let cn = self.pat.connect(ssh, rsh, same);
        let tcons = self.send_con.set_n(&cn.send_n);
        let tconr = self.recv_con.set_n(&cn.recv_n);
        if tconr != tcons {
            error!(
                prjn = %self.name(),
                tconr,
                tcons,
                "total receiving and sending connection counts do not match"
            );
        }
        self.recv_con.idx = vec![0; tconr as usize];
        self.r_syn_idx = vec![0; tconr as usize];
        self.send_con.idx = vec![0; tcons as usize];

        let slen = ssh.len();
        // running count of sender connections filled so far
        let mut sci = vec![0usize; slen];
        for ri in 0..rsh.len() {
            let rst = self.recv_con.idx_st[ri] as usize;
            let mut rci = 0usize;
            for si in 0..slen {
                if !cn.cons[[ri, si]] {
                    continue;
                }
                if rci >= self.recv_con.n[ri] as usize {
                    error!(prjn = %self.name(), ri, "receiving connection count overflow");
                    break;
                }
                self.recv_con.idx[rst + rci] = si as i32;
                if sci[si] >= self.send_con.n[si] as usize {
                    error!(prjn = %self.name(), si, "sending connection count overflow");
                    rci += 1;
                    continue;
                }
                let syi = self.send_con.idx_st[si] as usize + sci[si];
                self.send_con.idx[syi] = ri as i32;
                self.r_syn_idx[rst + rci] = syi as i32;
                sci[si] += 1;
                rci += 1;
            }
        }

        self.syns = vec![Synapse::default(); tcons as usize];
        self.g_inc = vec![0.0; rsh.len()];
        self.wb_recv = vec![WtBalRecv::default(); rsh.len()];
        Ok(())
    }

    /// initialize weights from the random distribution, and reset all
    /// learning state
    pub fn init_wts(&mut self, rng: &mut StdRng) {
        for sy in self.syns.iter_mut() {
            self.learn.init_wts(sy, rng);
        }
        for wb in self.wb_recv.iter_mut() {
            wb.init();
        }
        self.init_g_inc();
    }

    pub fn init_g_inc(&mut self) {
        for g in self.g_inc.iter_mut() {
            *g = 0.0;
        }
    }

    /// copy weights from this projection into the reciprocal projection
    /// rpj (which sends from our receiving layer back to our sending
    /// layer), making the two symmetric
    pub fn init_wt_sym(&self, rpj: &mut Projection) {
        if rpj.send_con.n.is_empty() {
            return;
        }
        for si in 0..self.send_con.n.len() {
            for syi in self.send_con.range(si) {
                let sy = &self.syns[syi];
                let ri = self.send_con.idx[syi] as usize;
                // find the synapse in rpj sending from ri back to si
                let rrng = rpj.send_con.range(ri);
                if rrng.is_empty() {
                    continue;
                }
                // indexes are ordered, so reject quickly on the block bounds
                let rist = rpj.send_con.idx[rrng.start] as usize;
                let ried = rpj.send_con.idx[rrng.end - 1] as usize;
                if si < rist || si > ried {
                    continue;
                }
                for rsyi in rrng {
                    if rpj.send_con.idx[rsyi] as usize == si {
                        let rsy = &mut rpj.syns[rsyi];
                        rsy.wt = sy.wt;
                        rsy.l_wt = sy.l_wt;
                        break;
                    }
                }
            }
        }
    }

    /// send the activation delta from sending unit si to all receiving
    /// units, accumulating into g_inc
    pub fn send_g_delta(&mut self, si: usize, delta: f32) {
        let scdel = delta * self.g_scale;
        for syi in self.send_con.range(si) {
            let ri = self.send_con.idx[syi] as usize;
            self.g_inc[ri] += scdel * self.syns[syi].wt;
        }
    }

    /// transfer accumulated conductance increments to the receiving
    /// neurons, into Gi for inhibitory projections and Ge otherwise
    pub fn recv_g_inc(&mut self, neurons: &mut [Neuron]) {
        if self.typ == PrjnType::Inhib {
            for (ri, nrn) in neurons.iter_mut().enumerate() {
                nrn.gi_inc += self.g_inc[ri];
                self.g_inc[ri] = 0.0;
            }
        } else {
            for (ri, nrn) in neurons.iter_mut().enumerate() {
                nrn.ge_inc += self.g_inc[ri];
                self.g_inc[ri] = 0.0;
            }
        }
    }

    /// compute weight changes from the XCAL checkmark rule, given the
    /// sending and receiving layer neurons
    pub fn dwt(&mut self, snrns: &[Neuron], rnrns: &[Neuron]) {
        if !self.learn.learn {
            return;
        }
        for (si, sn) in snrns.iter().enumerate() {
            if sn.avg_s < self.learn.x_cal.lrn_thr && sn.avg_m < self.learn.x_cal.lrn_thr {
                continue;
            }
            let rng = self.send_con.range(si);
            for syi in rng.clone() {
                let ri = self.send_con.idx[syi] as usize;
                let rn = &rnrns[ri];
                let sy = &mut self.syns[syi];
                let (mut err, mut bcm) = self.learn.chl_dwt(
                    sn.avg_s_lrn,
                    sn.avg_m,
                    rn.avg_s_lrn,
                    rn.avg_m,
                    rn.avg_l,
                );
                bcm *= self.learn.x_cal.long_lrate(rn.avg_l_lrn);
                err *= self.learn.x_cal.m_lrn;
                let mut dwt = bcm + err;
                let mut norm = 1.0;
                if self.learn.norm.on {
                    norm = self.learn.norm.norm_from_abs_dwt(&mut sy.norm, dwt.abs());
                }
                if self.learn.momentum.on {
                    dwt = norm * self.learn.momentum.moment_from_dwt(&mut sy.moment, dwt);
                } else {
                    dwt *= norm;
                }
                sy.d_wt += self.learn.lrate * dwt;
            }
            // propagate the max norm factor across the sending unit's
            // connections, preventing a few large changes from dominating
            if self.learn.norm.on {
                let mut max_norm = 0.0f32;
                for syi in rng.clone() {
                    max_norm = max_norm.max(self.syns[syi].norm);
                }
                for syi in rng {
                    self.syns[syi].norm = max_norm;
                }
            }
        }
    }

    /// update weights from accumulated weight changes, with soft bounding
    /// and optional weight balance
    pub fn wt_from_dwt(&mut self) {
        if !self.learn.learn {
            return;
        }
        let Projection {
            learn,
            syns,
            send_con,
            wb_recv,
            ..
        } = self;
        if learn.wt_bal.on {
            for (syi, sy) in syns.iter_mut().enumerate() {
                let ri = send_con.idx[syi] as usize;
                let wb = &wb_recv[ri];
                learn.wt_from_dwt(wb.inc, wb.dec, &mut sy.d_wt, &mut sy.wt, &mut sy.l_wt);
            }
        } else {
            for sy in syns.iter_mut() {
                learn.wt_from_dwt(1.0, 1.0, &mut sy.d_wt, &mut sy.wt, &mut sy.l_wt);
            }
        }
    }

    /// update the per-receiving-unit weight balance factors from the
    /// average receiving weights. rlay_targ is true when the receiving
    /// layer is a target layer, which is excluded.
    pub fn wt_bal_from_wt(&mut self, rlay_targ: bool, rnrns: &[Neuron]) {
        if !self.learn.learn || !self.learn.wt_bal.on || rlay_targ {
            return;
        }
        for (ri, rn) in rnrns.iter().enumerate() {
            // single-connection receivers have no balance to restore
            let nc = self.recv_con.n[ri];
            if nc <= 1 {
                continue;
            }
            if rn.flags.has(leabra_neural::NeurFlags::HAS_TARG) {
                continue;
            }
            let mut sum_wt = 0.0f32;
            let mut sum_n = 0;
            for rci in self.recv_con.range(ri) {
                let sy = &self.syns[self.r_syn_idx[rci] as usize];
                if sy.wt >= self.learn.wt_bal.avg_thr {
                    sum_wt += sy.wt;
                    sum_n += 1;
                }
            }
            if sum_n > 0 {
                sum_wt /= sum_n as f32;
            } else {
                sum_wt = 0.0;
            }
            let wb = &mut self.wb_recv[ri];
            wb.avg = sum_wt;
            let (fact, inc, dec) = self.learn.wt_bal.wt_bal(sum_wt, rn.act_avg);
            wb.fact = fact;
            wb.inc = inc;
            wb.dec = dec;
        }
    }

    /// index into syns for the synapse from sending unit sidx to receiving
    /// unit ridx
    pub fn syn_idx(&self, sidx: usize, ridx: usize) -> Result<usize> {
        if sidx >= self.send_con.n.len() {
            return Err(NetError::SendIdxRange {
                idx: sidx,
                size: self.send_con.n.len(),
            });
        }
        if ridx >= self.recv_con.n.len() {
            return Err(NetError::RecvIdxRange {
                idx: ridx,
                size: self.recv_con.n.len(),
            });
        }
        for rci in self.recv_con.range(ridx) {
            if self.recv_con.idx[rci] as usize == sidx {
                return Ok(self.r_syn_idx[rci] as usize);
            }
        }
        Err(NetError::NotConnected {
            send: sidx,
            recv: ridx,
        })
    }

    /// value of the named synapse variable (e.g. "Wt") for the connection
    /// from sending unit sidx to receiving unit ridx
    pub fn syn_val(&self, var: &str, sidx: usize, ridx: usize) -> Result<f32> {
        let syi = self.syn_idx(sidx, ridx)?;
        Ok(self.syns[syi].var_by_name(var)?)
    }

    /// set the named synapse variable; setting "Wt" also updates the
    /// linear weight to match
    pub fn set_syn_val(&mut self, var: &str, sidx: usize, ridx: usize, val: f32) -> Result<()> {
        let syi = self.syn_idx(sidx, ridx)?;
        let sy = &mut self.syns[syi];
        sy.set_var_by_name(var, val)?;
        if var == "Wt" {
            self.learn.l_wt_from_wt(sy);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Full, OneToOne};
    use rand::SeedableRng;

    fn build_prjn(pat: Box<dyn Pattern + Send + Sync>, ssh: &Shape, rsh: &Shape) -> Projection {
        let mut pj = Projection::new(0, 1, pat, PrjnType::Forward);
        pj.send_nm = "Send".to_string();
        pj.recv_nm = "Recv".to_string();
        pj.build(ssh, rsh, false).unwrap();
        pj
    }

    #[test]
    fn build_full_invariants() {
        let ssh = Shape::d2(2, 3);
        let rsh = Shape::d2(2, 2);
        let pj = build_prjn(Box::new(Full::new()), &ssh, &rsh);

        let tot_r: i32 = pj.recv_con.n.iter().sum();
        let tot_s: i32 = pj.send_con.n.iter().sum();
        assert_eq!(tot_r, tot_s);
        assert_eq!(pj.syns.len(), tot_s as usize);
        assert_eq!(pj.g_inc.len(), rsh.len());
        assert_eq!(pj.wb_recv.len(), rsh.len());

        // each receiver-side entry maps to a synapse whose sender-side
        // entry points back at the same receiving unit
        for ri in 0..rsh.len() {
            for rci in pj.recv_con.range(ri) {
                let syi = pj.r_syn_idx[rci] as usize;
                assert_eq!(pj.send_con.idx[syi] as usize, ri);
            }
        }

        // every synapse is indexed exactly once from the receiver side
        let mut seen = vec![false; pj.syns.len()];
        for &rsi in pj.r_syn_idx.iter() {
            assert!(!seen[rsi as usize]);
            seen[rsi as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn syn_val_access() {
        let ssh = Shape::d2(1, 4);
        let rsh = Shape::d2(1, 4);
        let pat = OneToOne::new();
        let mut pj = build_prjn(Box::new(pat), &ssh, &rsh);
        let mut rng = StdRng::seed_from_u64(7);
        pj.init_wts(&mut rng);

        pj.set_syn_val("Wt", 2, 2, 0.8).unwrap();
        assert!((pj.syn_val("Wt", 2, 2).unwrap() - 0.8).abs() < 1e-6);
        // setting Wt also re-derives the linear weight
        let lwt = pj.syn_val("LWt", 2, 2).unwrap();
        let exp = pj.learn.wt_sig.lin_from_sig_wt(0.8);
        assert!((lwt - exp).abs() < 1e-6);

        assert!(matches!(
            pj.syn_val("Wt", 2, 3),
            Err(NetError::NotConnected { send: 2, recv: 3 })
        ));
        assert!(matches!(
            pj.syn_val("Wt", 9, 0),
            Err(NetError::SendIdxRange { idx: 9, size: 4 })
        ));
    }

    #[test]
    fn send_and_recv_g_inc() {
        let ssh = Shape::d2(1, 2);
        let rsh = Shape::d2(1, 3);
        let mut pj = build_prjn(Box::new(Full::new()), &ssh, &rsh);
        for sy in pj.syns.iter_mut() {
            sy.wt = 0.5;
        }
        pj.g_scale = 2.0;
        pj.send_g_delta(0, 0.1);
        for ri in 0..3 {
            assert!((pj.g_inc[ri] - 0.1).abs() < 1e-6);
        }

        let mut nrns = vec![Neuron::default(); 3];
        pj.recv_g_inc(&mut nrns);
        for nrn in nrns.iter() {
            assert!((nrn.ge_inc - 0.1).abs() < 1e-6);
            assert_eq!(nrn.gi_inc, 0.0);
        }
        assert!(pj.g_inc.iter().all(|&g| g == 0.0));

        // inhibitory projections drive gi instead
        pj.typ = PrjnType::Inhib;
        pj.send_g_delta(1, 0.1);
        pj.recv_g_inc(&mut nrns);
        for nrn in nrns.iter() {
            assert!((nrn.gi_inc - 0.1).abs() < 1e-6);
        }
    }

    #[test]
    fn wt_bal_skips_single_connection_receivers() {
        let sh = Shape::d2(1, 4);
        let mut pj = build_prjn(Box::new(OneToOne::new()), &sh, &sh);
        pj.learn.wt_bal.on = true;
        for sy in pj.syns.iter_mut() {
            sy.wt = 0.8;
        }
        let nrns = vec![Neuron::default(); 4];
        pj.wt_bal_from_wt(false, &nrns);
        // each receiver has one connection, so the factors stay neutral
        for wb in pj.wb_recv.iter() {
            assert_eq!(wb.inc, 1.0);
            assert_eq!(wb.dec, 1.0);
            assert_eq!(wb.avg, 0.0);
        }

        // with multiple connections the high average engages the balance
        let mut pj = build_prjn(Box::new(Full::new()), &sh, &sh);
        pj.learn.wt_bal.on = true;
        for sy in pj.syns.iter_mut() {
            sy.wt = 0.8;
        }
        pj.wt_bal_from_wt(false, &nrns);
        for wb in pj.wb_recv.iter() {
            assert!((wb.avg - 0.8).abs() < 1e-6);
            assert!(wb.inc < 1.0);
            assert!(wb.dec > 1.0);
        }
    }

    #[test]
    fn wt_sym_copies_reciprocal() {
        let sh = Shape::d2(1, 3);
        let mut fwd = build_prjn(Box::new(Full::new()), &sh, &sh);
        let mut bck = build_prjn(Box::new(Full::new()), &sh, &sh);
        let mut rng = StdRng::seed_from_u64(3);
        fwd.init_wts(&mut rng);
        bck.init_wts(&mut rng);

        fwd.init_wt_sym(&mut bck);
        for si in 0..3 {
            for ri in 0..3 {
                let w = fwd.syn_val("Wt", si, ri).unwrap();
                let rw = bck.syn_val("Wt", ri, si).unwrap();
                assert_eq!(w, rw);
            }
        }
    }
}
