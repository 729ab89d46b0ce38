// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Network: the owning container of layers and projections, and the
//! top-level alpha-trial update loop

use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use leabra_neural::Time;

use crate::error::{NetError, Result};
use crate::layer::{Layer, LayerType};
use crate::pattern::Pattern;
use crate::prjn::{Projection, PrjnType};
use crate::shape::Shape;

/// Network owns all layers and projections in two parallel arenas; layers
/// and projections refer to each other by index. The standard update
/// sequence for one alpha trial is:
///
/// ```text
/// trial_init()
/// for each of 4 quarters:
///     for each of time.cyc_per_qtr cycles: cycle(); time.cycle_inc()
///     quarter_final(&time); time.quarter_inc()
/// dwt(); wt_from_dwt()
/// ```
pub struct Network {
    /// network name, written to weights files
    pub name: String,
    /// all layers, in the order added
    pub layers: Vec<Layer>,
    /// all projections, in the order connected
    pub prjns: Vec<Projection>,
    /// how often to update the weight balance factors, in weight updates
    pub wt_bal_interval: usize,

    lay_map: AHashMap<String, usize>,
    wt_bal_ctr: usize,
    rng: StdRng,
}

impl Network {
    pub fn new(name: &str) -> Network {
        Network::with_seed(name, rand::random())
    }

    /// construct with a fixed random seed, for reproducible runs
    pub fn with_seed(name: &str, seed: u64) -> Network {
        Network {
            name: name.to_string(),
            layers: Vec::new(),
            prjns: Vec::new(),
            wt_bal_interval: 10,
            lay_map: AHashMap::new(),
            wt_bal_ctr: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// add a layer with the given shape, returning its index
    pub fn add_layer(&mut self, name: &str, shape: Shape, typ: LayerType) -> usize {
        let li = self.layers.len();
        let mut lay = Layer::new(name, shape, typ);
        lay.index = li;
        self.lay_map.insert(name.to_string(), li);
        self.layers.push(lay);
        li
    }

    /// add a 2D layer of y rows by x units
    pub fn add_layer_2d(&mut self, name: &str, y: usize, x: usize, typ: LayerType) -> usize {
        self.add_layer(name, Shape::d2(y, x), typ)
    }

    /// add a 4D layer of pool_y x pool_x sub-pools, each y x x units
    pub fn add_layer_4d(
        &mut self,
        name: &str,
        pool_y: usize,
        pool_x: usize,
        y: usize,
        x: usize,
        typ: LayerType,
    ) -> usize {
        self.add_layer(name, Shape::d4(pool_y, pool_x, y, x), typ)
    }

    /// index of the layer with the given name
    pub fn layer_idx(&self, name: &str) -> Result<usize> {
        self.lay_map
            .get(name)
            .copied()
            .ok_or_else(|| NetError::UnknownLayer(name.to_string()))
    }

    pub fn layer(&self, name: &str) -> Result<&Layer> {
        Ok(&self.layers[self.layer_idx(name)?])
    }

    pub fn layer_mut(&mut self, name: &str) -> Result<&mut Layer> {
        let li = self.layer_idx(name)?;
        Ok(&mut self.layers[li])
    }

    /// connect two layers by name with the given pattern and projection
    /// type, returning the projection index
    pub fn connect_layers(
        &mut self,
        send: &str,
        recv: &str,
        pat: Box<dyn Pattern + Send + Sync>,
        typ: PrjnType,
    ) -> Result<usize> {
        let si = self.layer_idx(send)?;
        let ri = self.layer_idx(recv)?;
        let pi = self.prjns.len();
        let mut pj = Projection::new(si, ri, pat, typ);
        pj.send_nm = send.to_string();
        pj.recv_nm = recv.to_string();
        self.prjns.push(pj);
        self.layers[si].send_prjns.push(pi);
        self.layers[ri].recv_prjns.push(pi);
        Ok(pi)
    }

    /// recompute all derived parameters after parameter changes
    pub fn update_params(&mut self) {
        for lay in self.layers.iter_mut() {
            lay.update_params();
        }
        for pj in self.prjns.iter_mut() {
            pj.update_params();
        }
    }

    /// build constructs all neurons, pools, and synapses from the layer
    /// shapes and projection patterns; must be called before init_wts
    pub fn build(&mut self) -> Result<()> {
        let Network { layers, prjns, .. } = self;
        for (li, lay) in layers.iter_mut().enumerate() {
            lay.index = li;
            if lay.off {
                continue;
            }
            lay.build()?;
        }
        for pj in prjns.iter_mut() {
            if layers[pj.send_lay].off || layers[pj.recv_lay].off {
                continue;
            }
            let same = pj.send_lay == pj.recv_lay;
            let ssh = layers[pj.send_lay].shape.clone();
            let rsh = layers[pj.recv_lay].shape.clone();
            pj.build(&ssh, &rsh, same)?;
        }
        info!(
            network = %self.name,
            layers = self.layers.len(),
            prjns = self.prjns.len(),
            "built network"
        );
        Ok(())
    }

    fn prjn_off(&self, pi: usize) -> bool {
        let pj = &self.prjns[pi];
        pj.off || self.layers[pj.send_lay].off || self.layers[pj.recv_lay].off
    }

    /// initialize all weights and activation state, starting a new run
    pub fn init_wts(&mut self) {
        self.wt_bal_ctr = 0;
        let Network { layers, prjns, rng, .. } = self;
        for pj in prjns.iter_mut() {
            if pj.off || layers[pj.send_lay].off || layers[pj.recv_lay].off {
                continue;
            }
            pj.init_wts(rng);
        }
        for lay in layers.iter_mut().filter(|l| !l.off) {
            let init = lay.inhib.act_avg.init;
            let eff = lay.inhib.act_avg.eff_init();
            for pl in lay.pools.iter_mut() {
                pl.act_avg.act_m_avg = init;
                pl.act_avg.act_p_avg = init;
                pl.act_avg.act_p_avg_eff = eff;
            }
            lay.init_act_avg();
            lay.init_acts();
            lay.cos_diff.init();
        }
        self.init_wt_sym();
    }

    /// make reciprocal projections symmetric, copying weights from the
    /// projection whose sending layer has the lower index
    fn init_wt_sym(&mut self) {
        let Network { layers, prjns, .. } = self;
        for pi in 0..prjns.len() {
            let (s, r, off) = {
                let pj = &prjns[pi];
                (pj.send_lay, pj.recv_lay, pj.off)
            };
            if off || layers[s].off || layers[r].off {
                continue;
            }
            // only copy upward, so each pair is initialized once
            if layers[r].index < layers[s].index {
                continue;
            }
            let qi = layers[s]
                .recv_prjns
                .iter()
                .copied()
                .find(|&qi| !prjns[qi].off && prjns[qi].send_lay == r);
            let Some(qi) = qi else {
                continue;
            };
            // a self-projection is its own reciprocal
            if qi == pi {
                continue;
            }
            let (pp, qq) = two_mut(prjns, pi, qi);
            pp.init_wt_sym(qq);
        }
    }

    /// initialize all activation state
    pub fn init_acts(&mut self) {
        for lay in self.layers.iter_mut().filter(|l| !l.off) {
            lay.init_acts();
        }
    }

    /// clear all external inputs and targets
    pub fn init_ext(&mut self) {
        for lay in self.layers.iter_mut().filter(|l| !l.off) {
            lay.init_ext();
        }
    }

    /// apply external input values to the named layer
    pub fn apply_ext(&mut self, lay_nm: &str, ext: &[f32]) -> Result<()> {
        let li = self.layer_idx(lay_nm)?;
        self.layers[li].apply_ext(ext);
        Ok(())
    }

    /// trial_init handles all at-trial-start state updates: the AvgL
    /// floating thresholds, running-average activity and the netinput
    /// scaling derived from it, trial-fixed noise, state decay, and hard
    /// clamping of input layers
    pub fn trial_init(&mut self) {
        let Network { layers, prjns, rng, .. } = self;
        for lay in layers.iter_mut().filter(|l| !l.off) {
            lay.avg_l_from_avg_m();
            lay.avgs_from_acts();
        }
        // netinput scaling, normalized by relative scale totals per
        // receiving layer, separately for excitatory and inhibitory inputs
        for li in 0..layers.len() {
            if layers[li].off {
                continue;
            }
            let mut tot_ge_rel = 0.0f32;
            let mut tot_gi_rel = 0.0f32;
            for &pi in layers[li].recv_prjns.iter() {
                let s = prjns[pi].send_lay;
                if prjns[pi].off || layers[s].off {
                    continue;
                }
                let savg = layers[s].pools[0].act_avg.act_p_avg_eff;
                let snu = layers[s].neurons.len() as f32;
                let pj = &mut prjns[pi];
                let ncon = pj.recv_con.n_avg_max.avg;
                pj.g_scale = pj.wt_scale.full_scale(savg, snu, ncon);
                if pj.typ == PrjnType::Inhib {
                    tot_gi_rel += pj.wt_scale.rel;
                } else {
                    tot_ge_rel += pj.wt_scale.rel;
                }
            }
            for &pi in layers[li].recv_prjns.iter() {
                if prjns[pi].off || layers[prjns[pi].send_lay].off {
                    continue;
                }
                let pj = &mut prjns[pi];
                if pj.typ == PrjnType::Inhib {
                    if tot_gi_rel > 0.0 {
                        pj.g_scale /= tot_gi_rel;
                    }
                } else if tot_ge_rel > 0.0 {
                    pj.g_scale /= tot_ge_rel;
                }
            }
        }
        for lay in layers.iter_mut().filter(|l| !l.off) {
            if lay.needs_gen_noise() {
                lay.gen_noise(rng);
            }
            let decay = lay.act.init.decay;
            lay.decay_state(decay);
            if lay.act.clamp.hard && lay.typ == LayerType::Input {
                lay.hard_clamp();
            }
        }
    }

    /// cycle runs one cycle of activation updating: delta-sending of
    /// netinput, conductance integration, pool statistics, FFFB
    /// inhibition, and activation from conductances
    pub fn cycle(&mut self) {
        self.send_g_delta();
        self.g_from_inc();
        for lay in self.layers.iter_mut().filter(|l| !l.off) {
            lay.avg_max_ge();
            lay.inhib_from_ge_act();
            lay.act_from_g();
            lay.avg_max_act();
        }
    }

    /// delta-sending: a unit sends the change in its activation when it is
    /// above the send threshold and the change exceeds the delta
    /// threshold; a unit that drops below the send threshold sends the
    /// negation of its last-sent value, so receivers track the full
    /// current input
    fn send_g_delta(&mut self) {
        let Network { layers, prjns, .. } = self;
        let lay_off: Vec<bool> = layers.iter().map(|l| l.off).collect();
        for li in 0..layers.len() {
            if lay_off[li] {
                continue;
            }
            let opt = layers[li].act.opt_thresh;
            for ni in 0..layers[li].neurons.len() {
                let (act, act_sent) = {
                    let nrn = &layers[li].neurons[ni];
                    if nrn.is_off() {
                        continue;
                    }
                    (nrn.act, nrn.act_sent)
                };
                if act > opt.send {
                    let delta = act - act_sent;
                    if delta.abs() > opt.delta {
                        for &pi in layers[li].send_prjns.iter() {
                            let pj = &mut prjns[pi];
                            if pj.off || lay_off[pj.recv_lay] {
                                continue;
                            }
                            pj.send_g_delta(ni, delta);
                        }
                        layers[li].neurons[ni].act_sent = act;
                    }
                } else if act_sent > opt.send {
                    for &pi in layers[li].send_prjns.iter() {
                        let pj = &mut prjns[pi];
                        if pj.off || lay_off[pj.recv_lay] {
                            continue;
                        }
                        pj.send_g_delta(ni, -act_sent);
                    }
                    layers[li].neurons[ni].act_sent = 0.0;
                }
            }
        }
    }

    /// transfer accumulated conductance deltas to the receiving neurons
    /// and integrate into Ge and Gi
    fn g_from_inc(&mut self) {
        let Network { layers, prjns, .. } = self;
        let lay_off: Vec<bool> = layers.iter().map(|l| l.off).collect();
        for li in 0..layers.len() {
            if lay_off[li] {
                continue;
            }
            let lay = &mut layers[li];
            let Layer {
                recv_prjns,
                neurons,
                ..
            } = lay;
            for &pi in recv_prjns.iter() {
                let pj = &mut prjns[pi];
                if pj.off || lay_off[pj.send_lay] {
                    continue;
                }
                pj.recv_g_inc(neurons);
            }
            lay.ge_gi_from_inc();
        }
    }

    /// record phase activations at the end of a quarter
    pub fn quarter_final(&mut self, time: &Time) {
        for lay in self.layers.iter_mut().filter(|l| !l.off) {
            lay.quarter_final(time);
        }
    }

    /// compute weight changes from the learning rule, after the plus phase
    pub fn dwt(&mut self) {
        let Network { layers, prjns, .. } = self;
        for pi in 0..prjns.len() {
            let (s, r, off) = {
                let pj = &prjns[pi];
                (pj.send_lay, pj.recv_lay, pj.off)
            };
            if off || layers[s].off || layers[r].off {
                continue;
            }
            let pj = &mut prjns[pi];
            pj.dwt(&layers[s].neurons, &layers[r].neurons);
        }
    }

    /// update weights from accumulated weight changes; every
    /// wt_bal_interval updates, also update the weight balance factors
    pub fn wt_from_dwt(&mut self) {
        {
            let Network { layers, prjns, .. } = self;
            for pj in prjns.iter_mut() {
                if pj.off || layers[pj.send_lay].off || layers[pj.recv_lay].off {
                    continue;
                }
                pj.wt_from_dwt();
            }
        }
        self.wt_bal_ctr += 1;
        if self.wt_bal_ctr >= self.wt_bal_interval {
            self.wt_bal_ctr = 0;
            self.wt_bal_from_wt();
        }
    }

    /// update the per-receiving-unit weight balance factors
    pub fn wt_bal_from_wt(&mut self) {
        let Network { layers, prjns, .. } = self;
        for pi in 0..prjns.len() {
            let (s, r, off) = {
                let pj = &prjns[pi];
                (pj.send_lay, pj.recv_lay, pj.off)
            };
            if off || layers[s].off || layers[r].off {
                continue;
            }
            let rlay = &layers[r];
            prjns[pi].wt_bal_from_wt(rlay.typ == LayerType::Target, &rlay.neurons);
        }
    }
}

/// mutable references to two distinct elements of a slice
fn two_mut<T>(v: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (l, r) = v.split_at_mut(b);
        (&mut l[a], &mut r[0])
    } else {
        let (l, r) = v.split_at_mut(a);
        (&mut r[0], &mut l[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Full;

    fn two_layer_net() -> Network {
        let mut net = Network::with_seed("Test", 17);
        net.add_layer_2d("In", 1, 4, LayerType::Input);
        net.add_layer_2d("Out", 1, 4, LayerType::Target);
        net.connect_layers("In", "Out", Box::new(Full::new()), PrjnType::Forward)
            .unwrap();
        net.connect_layers("Out", "In", Box::new(Full::new()), PrjnType::Back)
            .unwrap();
        net.build().unwrap();
        net
    }

    #[test]
    fn build_registers_structure() {
        let net = two_layer_net();
        assert_eq!(net.layer_idx("In").unwrap(), 0);
        assert_eq!(net.layer_idx("Out").unwrap(), 1);
        assert!(matches!(
            net.layer_idx("Nope"),
            Err(NetError::UnknownLayer(_))
        ));
        assert_eq!(net.layers[0].send_prjns, vec![0]);
        assert_eq!(net.layers[0].recv_prjns, vec![1]);
        assert_eq!(net.layers[1].recv_prjns, vec![0]);
        assert_eq!(net.prjns[0].syns.len(), 16);
        assert_eq!(net.prjns[0].name(), "InToOut");
    }

    #[test]
    fn init_wts_makes_reciprocals_symmetric() {
        let mut net = two_layer_net();
        net.init_wts();
        let fwd = &net.prjns[0];
        let bck = &net.prjns[1];
        for si in 0..4 {
            for ri in 0..4 {
                let w = fwd.syn_val("Wt", si, ri).unwrap();
                let rw = bck.syn_val("Wt", ri, si).unwrap();
                assert_eq!(w, rw);
            }
        }
    }

    #[test]
    fn trial_init_scales_netinput() {
        let mut net = two_layer_net();
        net.init_wts();
        net.trial_init();
        // full connectivity from a layer at the default expected activity
        for pj in net.prjns.iter() {
            assert!(pj.g_scale > 0.0);
            assert!(pj.g_scale.is_finite());
        }
    }

    #[test]
    fn off_layer_is_skipped() {
        let mut net = Network::with_seed("Test", 3);
        net.add_layer_2d("In", 1, 4, LayerType::Input);
        net.add_layer_2d("Hid", 1, 4, LayerType::Hidden);
        net.layer_mut("Hid").unwrap().off = true;
        net.connect_layers("In", "Hid", Box::new(Full::new()), PrjnType::Forward)
            .unwrap();
        net.build().unwrap();
        net.init_wts();
        assert!(net.layers[1].neurons.is_empty());
        assert!(net.prjns[0].syns.is_empty());
    }
}
