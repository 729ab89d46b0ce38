// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Layers: groups of neurons with pooled inhibition and phase statistics

use serde::{Deserialize, Serialize};

use leabra_neural::{
    ActNoiseType, ActParams, CosDiffStats, InhibParams, LearnNeurParams, NeurFlags, Neuron,
    RndDist, Time,
};
use rand::rngs::StdRng;

use crate::error::{NetError, Result};
use crate::pool::Pool;
use crate::shape::Shape;

/// LayerType is the functional role of a layer, which determines how
/// external inputs are applied and whether error-modulated learning
/// statistics are computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerType {
    /// sensory input, hard-clamped to external values
    Input,
    /// interior computation, full learning dynamics
    #[default]
    Hidden,
    /// target values driving the plus phase
    Target,
    /// comparison values, for error statistics only
    Compare,
}

/// Layer is a group of neurons with shared inhibition and activation
/// parameters. Projections are referenced by index into the owning
/// network's projection list.
pub struct Layer {
    /// layer name, unique within the network
    pub name: String,
    /// free-form class label for grouping related layers
    pub class: String,
    /// inactivate this layer, excluding it from all computation
    pub off: bool,
    /// unit geometry: 2D `[y, x]` or 4D `[pool_y, pool_x, y, x]`
    pub shape: Shape,
    /// functional role of the layer
    pub typ: LayerType,
    /// position of the layer in the network's layer list; weight symmetry
    /// initializes higher-index layers from lower ones
    pub index: usize,

    /// indices of projections received by this layer
    pub recv_prjns: Vec<usize>,
    /// indices of projections sent by this layer
    pub send_prjns: Vec<usize>,

    /// activation dynamics parameters
    pub act: ActParams,
    /// inhibition parameters, layer and pool level
    pub inhib: InhibParams,
    /// neuron-level learning parameters
    pub learn: LearnNeurParams,

    /// all neurons in the layer, in row-major shape order
    pub neurons: Vec<Neuron>,
    /// statistics pools: pool 0 is the whole layer, then one per unit
    /// group for 4D layers with pool inhibition on
    pub pools: Vec<Pool>,
    /// cosine difference between plus and minus phase activations
    pub cos_diff: CosDiffStats,
}

impl Layer {
    pub fn new(name: &str, shape: Shape, typ: LayerType) -> Layer {
        Layer {
            name: name.to_string(),
            class: String::new(),
            off: false,
            shape,
            typ,
            index: 0,
            recv_prjns: Vec::new(),
            send_prjns: Vec::new(),
            act: ActParams::default(),
            inhib: InhibParams::default(),
            learn: LearnNeurParams::default(),
            neurons: Vec::new(),
            pools: Vec::new(),
            cos_diff: CosDiffStats::default(),
        }
    }

    pub fn update_params(&mut self) {
        self.act.update();
        self.inhib.update();
        self.learn.update();
    }

    /// number of inhibitory sub-pools from the shape, 0 for 2D layers
    pub fn n_pools(&self) -> usize {
        self.shape.n_pools()
    }

    /// allocate neurons and pools from the shape
    pub fn build(&mut self) -> Result<()> {
        let nu = self.shape.len();
        if nu == 0 {
            return Err(NetError::Build(format!(
                "layer {}: shape has no units",
                self.name
            )));
        }
        self.neurons = vec![Neuron::default(); nu];
        self.build_pools(nu);
        Ok(())
    }

    fn build_pools(&mut self, nu: usize) {
        let mut np = 1;
        if self.inhib.pool.on {
            np += self.n_pools();
        }
        self.pools = vec![Pool::default(); np];
        self.pools[0].st_idx = 0;
        self.pools[0].ed_idx = nu;
        if np > 1 {
            let upp = self.shape.units_per_pool();
            for pi in 1..np {
                let pl = &mut self.pools[pi];
                pl.st_idx = (pi - 1) * upp;
                pl.ed_idx = pi * upp;
            }
        }
    }

    /// initialize the running-average activations used in learning
    pub fn init_act_avg(&mut self) {
        let Layer { learn, neurons, .. } = self;
        for nrn in neurons.iter_mut() {
            learn.init_act_avg(nrn);
        }
    }

    /// initialize activation state, which also resets pool statistics
    pub fn init_acts(&mut self) {
        let Layer {
            act,
            neurons,
            pools,
            ..
        } = self;
        for nrn in neurons.iter_mut() {
            act.init_acts(nrn);
        }
        for pl in pools.iter_mut() {
            pl.init();
        }
    }

    /// clear external input and target values and flags
    pub fn init_ext(&mut self) {
        for nrn in self.neurons.iter_mut() {
            nrn.ext = 0.0;
            nrn.targ = 0.0;
            nrn.flags.clear(NeurFlags::EXT_MASK);
        }
    }

    /// apply external input values: Ext for input layers, Targ for target
    /// and compare layers, with the matching flags set
    pub fn apply_ext(&mut self, ext: &[f32]) {
        let mx = ext.len().min(self.neurons.len());
        let (set_msk, to_targ) = match self.typ {
            LayerType::Target => (NeurFlags::HAS_TARG, true),
            LayerType::Compare => (NeurFlags::HAS_CMPR, true),
            _ => (NeurFlags::HAS_EXT, false),
        };
        for ni in 0..mx {
            let nrn = &mut self.neurons[ni];
            if to_targ {
                nrn.targ = ext[ni];
            } else {
                nrn.ext = ext[ni];
            }
            nrn.flags.clear(NeurFlags::EXT_MASK);
            nrn.flags.set(set_msk);
        }
    }

    /// update the long-term floating threshold AvgL from AvgM, at trial
    /// start, optionally modulated by the layer's average error
    pub fn avg_l_from_avg_m(&mut self) {
        let Layer {
            learn,
            neurons,
            cos_diff,
            ..
        } = self;
        for nrn in neurons.iter_mut() {
            learn.avg_l_from_avg_m(nrn);
            if learn.avg_l.err_mod {
                nrn.avg_l_lrn *= cos_diff.mod_avg_l_lrn;
            }
        }
    }

    /// update the pool running-average activations from the phase
    /// statistics, at trial start
    pub fn avgs_from_acts(&mut self) {
        let aa = &self.inhib.act_avg;
        for pl in self.pools.iter_mut() {
            aa.avg_from_act(&mut pl.act_avg.act_m_avg, pl.act_m.avg);
            aa.avg_from_act(&mut pl.act_avg.act_p_avg, pl.act_p.avg);
            aa.eff_from_avg(&mut pl.act_avg.act_p_avg_eff, pl.act_avg.act_p_avg);
        }
    }

    /// whether trial-fixed noise should be generated for this layer
    pub fn needs_gen_noise(&self) -> bool {
        self.act.noise.typ != ActNoiseType::NoNoise
            && self.act.noise.fixed
            && self.act.noise.dist.dist != RndDist::None
    }

    /// generate new fixed noise values for the trial
    pub fn gen_noise(&mut self, rng: &mut StdRng) {
        let Layer { act, neurons, .. } = self;
        for nrn in neurons.iter_mut() {
            nrn.noise = act.noise.gen(rng);
        }
    }

    /// decay activation state by the given proportion toward initial values
    pub fn decay_state(&mut self, decay: f32) {
        let Layer {
            act,
            neurons,
            pools,
            ..
        } = self;
        for nrn in neurons.iter_mut() {
            act.decay_state(nrn, decay);
        }
        for pl in pools.iter_mut() {
            pl.inhib.ffi -= decay * pl.inhib.ffi;
            pl.inhib.fbi -= decay * pl.inhib.fbi;
            pl.inhib.gi -= decay * pl.inhib.gi;
            pl.act.avg -= decay * pl.act.avg;
            pl.act.max -= decay * pl.act.max;
        }
    }

    /// hard-clamp activations directly to the external inputs
    pub fn hard_clamp(&mut self) {
        let Layer { act, neurons, .. } = self;
        for nrn in neurons.iter_mut() {
            act.hard_clamp(nrn);
        }
    }

    /// zero the neuron-level conductance increment accumulators
    pub fn init_g_inc(&mut self) {
        for nrn in self.neurons.iter_mut() {
            nrn.ge_inc = 0.0;
            nrn.gi_inc = 0.0;
        }
    }

    /// integrate received conductance increments into Ge and Gi
    pub fn ge_gi_from_inc(&mut self) {
        let Layer { act, neurons, .. } = self;
        for nrn in neurons.iter_mut() {
            act.ge_gi_from_inc(nrn);
        }
    }

    /// update the pool average and max Ge statistics
    pub fn avg_max_ge(&mut self) {
        let Layer { neurons, pools, .. } = self;
        for pl in pools.iter_mut() {
            pl.ge.init();
            for ni in pl.st_idx..pl.ed_idx {
                pl.ge.update_val(neurons[ni].ge, ni as i32);
            }
            pl.ge.calc_avg();
        }
    }

    /// compute FFFB inhibition at the layer level and, for 4D layers, at
    /// the pool level taking the max of the two, then set the neuron Gi
    pub fn inhib_from_ge_act(&mut self) {
        let Layer {
            inhib,
            neurons,
            pools,
            ..
        } = self;
        let (lpl, subs) = pools.split_at_mut(1);
        let lpl = &mut lpl[0];
        inhib
            .layer
            .inhib(lpl.ge.avg, lpl.ge.max, lpl.act.avg, &mut lpl.inhib);
        if !subs.is_empty() {
            for pl in subs.iter_mut() {
                inhib
                    .pool
                    .inhib(pl.ge.avg, pl.ge.max, pl.act.avg, &mut pl.inhib);
                pl.inhib.lay_gi = lpl.inhib.gi;
                pl.inhib.gi = pl.inhib.gi.max(lpl.inhib.gi);
                for ni in pl.st_idx..pl.ed_idx {
                    let nrn = &mut neurons[ni];
                    inhib.self_inhib.inhib(&mut nrn.gi_self, nrn.act);
                    nrn.gi = pl.inhib.gi + nrn.gi_self + nrn.gi_syn;
                }
            }
        } else {
            for ni in lpl.st_idx..lpl.ed_idx {
                let nrn = &mut neurons[ni];
                inhib.self_inhib.inhib(&mut nrn.gi_self, nrn.act);
                nrn.gi = lpl.inhib.gi + nrn.gi_self + nrn.gi_syn;
            }
        }
    }

    /// update Vm and Act from conductances, and the learning averages
    pub fn act_from_g(&mut self) {
        let Layer {
            act,
            learn,
            neurons,
            ..
        } = self;
        for nrn in neurons.iter_mut() {
            act.vm_from_g(nrn);
            act.act_from_g(nrn);
            learn.avgs_from_act(nrn);
        }
    }

    /// update the pool average and max activation statistics
    pub fn avg_max_act(&mut self) {
        let Layer { neurons, pools, .. } = self;
        for pl in pools.iter_mut() {
            pl.act.init();
            for ni in pl.st_idx..pl.ed_idx {
                pl.act.update_val(neurons[ni].act, ni as i32);
            }
            pl.act.calc_avg();
        }
    }

    /// record phase activations at the end of a quarter: the minus phase
    /// at the end of quarter 2 (when targets also become inputs), the
    /// plus phase at the end of quarter 3
    pub fn quarter_final(&mut self, time: &Time) {
        for pl in self.pools.iter_mut() {
            match time.quarter {
                2 => pl.act_m = pl.act,
                3 => pl.act_p = pl.act,
                _ => {}
            }
        }
        let avg_dt = self.act.dt.avg_dt;
        for nrn in self.neurons.iter_mut() {
            match time.quarter {
                2 => {
                    nrn.act_m = nrn.act;
                    if nrn.flags.has(NeurFlags::HAS_TARG) {
                        nrn.ext = nrn.targ;
                        nrn.flags.set(NeurFlags::HAS_EXT);
                    }
                }
                3 => {
                    nrn.act_p = nrn.act;
                    nrn.act_dif = nrn.act_p - nrn.act_m;
                    nrn.act_avg += avg_dt * (nrn.act - nrn.act_avg);
                }
                _ => {}
            }
        }
        if time.quarter == 3 {
            self.cos_diff_from_acts();
        }
    }

    /// cosine difference between plus and minus phase activation patterns,
    /// in zero-mean (centered correlation) form, driving error-modulated
    /// hebbian learning for hidden layers
    pub fn cos_diff_from_acts(&mut self) {
        let lpl = &self.pools[0];
        let avg_m = lpl.act_m.avg;
        let avg_p = lpl.act_p.avg;
        let mut cosv = 0.0f32;
        let mut ssm = 0.0f32;
        let mut ssp = 0.0f32;
        for nrn in self.neurons.iter() {
            let ap = nrn.act_p - avg_p;
            let am = nrn.act_m - avg_m;
            cosv += ap * am;
            ssm += am * am;
            ssp += ap * ap;
        }
        let dist = (ssm * ssp).sqrt();
        if dist != 0.0 {
            cosv /= dist;
        }
        self.cos_diff.cos = cosv;
        self.learn.cos_diff.avg_var_from_cos(
            &mut self.cos_diff.avg,
            &mut self.cos_diff.var,
            self.cos_diff.cos,
        );
        if self.typ != LayerType::Hidden {
            self.cos_diff.avg_lrn = 0.0;
            self.cos_diff.mod_avg_l_lrn = 0.0;
        } else {
            self.cos_diff.avg_lrn = 1.0 - self.cos_diff.avg;
            self.cos_diff.mod_avg_l_lrn = self
                .learn
                .avg_l
                .err_mod_from_lay_err(self.cos_diff.avg_lrn);
        }
    }

    /// sum squared error between plus and minus phase activations, with
    /// differences below tol ignored; returns (sse, mean per unit)
    pub fn sse(&self, tol: f32) -> (f32, f32) {
        let nn = self.neurons.len();
        if nn == 0 {
            return (0.0, 0.0);
        }
        let mut sse = 0.0f32;
        for nrn in self.neurons.iter() {
            let d = nrn.act_p - nrn.act_m;
            if d.abs() < tol {
                continue;
            }
            sse += d * d;
        }
        (sse, sse / nn as f32)
    }

    /// values of the named neuron variable for all units, in shape order
    pub fn unit_vals(&self, var: &str) -> Result<Vec<f32>> {
        let mut vals = Vec::with_capacity(self.neurons.len());
        for nrn in self.neurons.iter() {
            vals.push(nrn.var_by_name(var)?);
        }
        Ok(vals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_pools_4d() {
        let mut lay = Layer::new("Hid", Shape::d4(2, 2, 3, 3), LayerType::Hidden);
        lay.inhib.pool.on = true;
        lay.build().unwrap();
        assert_eq!(lay.neurons.len(), 36);
        assert_eq!(lay.pools.len(), 5);
        assert_eq!(lay.pools[0].st_idx, 0);
        assert_eq!(lay.pools[0].ed_idx, 36);
        assert_eq!(lay.pools[2].st_idx, 9);
        assert_eq!(lay.pools[2].ed_idx, 18);

        // 2D layers and 4D layers without pool inhibition get one pool
        let mut lay2 = Layer::new("In", Shape::d2(4, 4), LayerType::Input);
        lay2.build().unwrap();
        assert_eq!(lay2.pools.len(), 1);
    }

    #[test]
    fn apply_ext_flags() {
        let mut inp = Layer::new("In", Shape::d2(1, 3), LayerType::Input);
        inp.build().unwrap();
        inp.apply_ext(&[0.1, 0.9, 0.5]);
        assert_eq!(inp.neurons[1].ext, 0.9);
        assert!(inp.neurons[1].flags.has(NeurFlags::HAS_EXT));
        assert!(!inp.neurons[1].flags.has(NeurFlags::HAS_TARG));

        let mut out = Layer::new("Out", Shape::d2(1, 3), LayerType::Target);
        out.build().unwrap();
        out.apply_ext(&[0.0, 1.0, 0.0]);
        assert_eq!(out.neurons[1].targ, 1.0);
        assert_eq!(out.neurons[1].ext, 0.0);
        assert!(out.neurons[1].flags.has(NeurFlags::HAS_TARG));
        assert!(!out.neurons[1].flags.has(NeurFlags::HAS_EXT));

        out.init_ext();
        assert_eq!(out.neurons[1].targ, 0.0);
        assert!(!out.neurons[1].flags.has(NeurFlags::HAS_TARG));
    }

    #[test]
    fn target_ext_at_minus_phase_end() {
        let mut out = Layer::new("Out", Shape::d2(1, 2), LayerType::Target);
        out.build().unwrap();
        out.apply_ext(&[0.0, 1.0]);
        let mut tm = Time::new();
        tm.quarter = 2;
        out.quarter_final(&tm);
        assert_eq!(out.neurons[1].ext, 1.0);
        assert!(out.neurons[1].flags.has(NeurFlags::HAS_EXT));
    }

    #[test]
    fn decay_state_leaves_pool_ge_stats() {
        let mut lay = Layer::new("Hid", Shape::d2(1, 3), LayerType::Hidden);
        lay.build().unwrap();
        {
            let pl = &mut lay.pools[0];
            pl.inhib.gi = 0.6;
            pl.act.avg = 0.4;
            pl.ge.avg = 0.3;
            pl.ge.max = 0.5;
        }
        lay.decay_state(0.5);
        let pl = &lay.pools[0];
        assert!((pl.inhib.gi - 0.3).abs() < 1e-6);
        assert!((pl.act.avg - 0.2).abs() < 1e-6);
        // ge stats are recomputed from scratch every cycle, not decayed
        assert_eq!(pl.ge.avg, 0.3);
        assert_eq!(pl.ge.max, 0.5);
    }

    #[test]
    fn sse_with_tolerance() {
        let mut lay = Layer::new("Out", Shape::d2(1, 2), LayerType::Target);
        lay.build().unwrap();
        lay.neurons[0].act_m = 0.2;
        lay.neurons[0].act_p = 0.8;
        lay.neurons[1].act_m = 0.5;
        lay.neurons[1].act_p = 0.52;
        let (sse, avg) = lay.sse(0.5);
        assert!((sse - 0.36).abs() < 1e-6);
        assert!((avg - 0.18).abs() < 1e-6);
        let (sse, _) = lay.sse(0.01);
        assert!((sse - (0.36 + 0.0004)).abs() < 1e-6);
    }
}
