// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Neuron (unit) level state variables

use serde::{Deserialize, Serialize};

use crate::error::{NeuralError, Result};

/// Bit flags for binary neuron state variables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeurFlags(u32);

impl NeurFlags {
    /// Neuron is off, excluded from all computation
    pub const OFF: NeurFlags = NeurFlags(1 << 0);
    /// Has external input (Ext was set)
    pub const HAS_EXT: NeurFlags = NeurFlags(1 << 1);
    /// Has target value for learning (Targ was set)
    pub const HAS_TARG: NeurFlags = NeurFlags(1 << 2);
    /// Has comparison value in Targ, only for error statistics
    pub const HAS_CMPR: NeurFlags = NeurFlags(1 << 3);

    /// All external-input related flags, cleared before applying new inputs
    pub const EXT_MASK: NeurFlags =
        NeurFlags(Self::HAS_EXT.0 | Self::HAS_TARG.0 | Self::HAS_CMPR.0);

    pub fn has(self, flag: NeurFlags) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn set(&mut self, flag: NeurFlags) {
        self.0 |= flag.0;
    }

    pub fn clear(&mut self, flag: NeurFlags) {
        self.0 &= !flag.0;
    }
}

/// Neuron holds all of the neuron (unit) level variables.
/// This is the basic rate-code-only version, with no optional features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Neuron {
    /// bit flags for binary state variables
    pub flags: NeurFlags,
    /// overall rate coded activation value, what is sent to other neurons, typically 0-1
    pub act: f32,
    /// total excitatory synaptic conductance, does *not* include Gbar.E
    pub ge: f32,
    /// total inhibitory synaptic conductance, does *not* include Gbar.I
    pub gi: f32,
    /// net current produced by all channels, drives update of Vm
    pub inet: f32,
    /// membrane potential, integrates Inet current over time
    pub vm: f32,

    /// target value: drives learning to produce this activation value
    pub targ: f32,
    /// external input: drives activation of unit from outside influences
    pub ext: f32,

    /// super-short time-scale activation average, the lowest-level time integration
    pub avg_ss: f32,
    /// short time-scale activation average, the plus-phase signal for XCAL learning
    pub avg_s: f32,
    /// medium time-scale activation average, the minus-phase signal for XCAL learning
    pub avg_m: f32,
    /// long time-scale average of AvgM, the BCM-style floating threshold in XCAL
    pub avg_l: f32,
    /// how much to learn based on the AvgL floating threshold, modulated by AvgL level
    /// and optionally the average error in the layer
    pub avg_l_lrn: f32,
    /// short time-scale average actually used for learning: mostly AvgS with a small
    /// AvgM contribution so the learning signal does not go to 0 when the unit turns
    /// off in the plus phase
    pub avg_s_lrn: f32,

    /// minus phase activation, recorded at end of third quarter
    pub act_m: f32,
    /// plus phase activation, recorded at end of the trial
    pub act_p: f32,
    /// ActP - ActM, the per-unit error gradient in standard error-driven terms
    pub act_dif: f32,
    /// change in Act from one cycle to the next
    pub act_del: f32,
    /// average of plus-phase activation over long time intervals (Dt.AvgTau)
    pub act_avg: f32,

    /// noise value added to unit
    pub noise: f32,
    /// total self-inhibition, time-integrated to avoid oscillations
    pub gi_self: f32,

    /// last activation value sent, only sent when the difference is over threshold
    pub act_sent: f32,
    /// raw excitatory conductance received from sending units, delta increments applied
    pub ge_raw: f32,
    /// delta increment in GeRaw received via delta-sending
    pub ge_inc: f32,
    /// raw inhibitory conductance from inhibitory projections
    pub gi_raw: f32,
    /// delta increment in GiRaw received via delta-sending
    pub gi_inc: f32,
    /// synaptic inhibitory conductance, time-integrated from GiRaw
    pub gi_syn: f32,
}

/// Names of all float32 neuron variables, for name-based access
pub const NEURON_VARS: &[&str] = &[
    "Act", "Ge", "Gi", "Inet", "Vm", "Targ", "Ext", "AvgSS", "AvgS", "AvgM", "AvgL", "AvgLLrn",
    "AvgSLrn", "ActM", "ActP", "ActDif", "ActDel", "ActAvg", "Noise", "GiSelf", "ActSent",
    "GeRaw", "GeInc", "GiRaw", "GiInc", "GiSyn",
];

impl Neuron {
    pub fn is_off(&self) -> bool {
        self.flags.has(NeurFlags::OFF)
    }

    /// Value of the variable with the given display name (e.g. "Act", "AvgL")
    pub fn var_by_name(&self, name: &str) -> Result<f32> {
        let v = match name {
            "Act" => self.act,
            "Ge" => self.ge,
            "Gi" => self.gi,
            "Inet" => self.inet,
            "Vm" => self.vm,
            "Targ" => self.targ,
            "Ext" => self.ext,
            "AvgSS" => self.avg_ss,
            "AvgS" => self.avg_s,
            "AvgM" => self.avg_m,
            "AvgL" => self.avg_l,
            "AvgLLrn" => self.avg_l_lrn,
            "AvgSLrn" => self.avg_s_lrn,
            "ActM" => self.act_m,
            "ActP" => self.act_p,
            "ActDif" => self.act_dif,
            "ActDel" => self.act_del,
            "ActAvg" => self.act_avg,
            "Noise" => self.noise,
            "GiSelf" => self.gi_self,
            "ActSent" => self.act_sent,
            "GeRaw" => self.ge_raw,
            "GeInc" => self.ge_inc,
            "GiRaw" => self.gi_raw,
            "GiInc" => self.gi_inc,
            "GiSyn" => self.gi_syn,
            _ => return Err(NeuralError::UnknownVar(name.to_string())),
        };
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_set_clear() {
        let mut fl = NeurFlags::default();
        assert!(!fl.has(NeurFlags::HAS_EXT));
        fl.set(NeurFlags::HAS_EXT);
        fl.set(NeurFlags::HAS_TARG);
        assert!(fl.has(NeurFlags::HAS_EXT));
        assert!(fl.has(NeurFlags::EXT_MASK));
        fl.clear(NeurFlags::EXT_MASK);
        assert!(!fl.has(NeurFlags::HAS_EXT));
        assert!(!fl.has(NeurFlags::HAS_TARG));
    }

    #[test]
    fn var_by_name() {
        let mut nrn = Neuron::default();
        nrn.avg_s_lrn = 0.42;
        assert_eq!(nrn.var_by_name("AvgSLrn").unwrap(), 0.42);
        assert!(nrn.var_by_name("NoSuchVar").is_err());
        for nm in NEURON_VARS {
            nrn.var_by_name(nm).unwrap();
        }
    }
}
