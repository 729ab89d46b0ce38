// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! FFFB feedforward / feedback pooled inhibition, neuron self inhibition,
//! and running-average activity tracking for netinput scaling.

use serde::{Deserialize, Serialize};

/// FFFBParams parameterizes feedforward (FF) and feedback (FB) inhibition,
/// computed as a function of the average (and max) excitatory netinput and
/// activation within a pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FFFBParams {
    /// enable this level of inhibition
    pub on: bool,
    /// overall inhibition gain, main parameter to adjust
    pub gi: f32,
    /// feedforward gain on the average netinput
    pub ff: f32,
    /// feedback gain on the average activation
    pub fb: f32,
    /// time constant in cycles for integrating feedback inhibition
    pub fb_tau: f32,
    /// what proportion of max netinput to mix with avg
    pub max_vs_avg: f32,
    /// feedforward zero point, below which no FF inhibition is computed
    pub ff0: f32,

    pub(crate) fb_dt: f32,
}

impl Default for FFFBParams {
    fn default() -> Self {
        let mut fb = FFFBParams {
            on: false,
            gi: 1.8,
            ff: 1.0,
            fb: 1.0,
            fb_tau: 1.4,
            max_vs_avg: 0.0,
            ff0: 0.1,
            fb_dt: 0.0,
        };
        fb.update();
        fb
    }
}

impl FFFBParams {
    pub fn update(&mut self) {
        self.fb_dt = 1.0 / self.fb_tau;
    }

    /// feedforward inhibition from netinput avg and max
    pub fn ff_inhib(&self, avg_ge: f32, max_ge: f32) -> f32 {
        let ff_netin = avg_ge + self.max_vs_avg * (max_ge - avg_ge);
        if ff_netin < self.ff0 {
            return 0.0;
        }
        self.ff * (ff_netin - self.ff0)
    }

    /// feedback inhibition from average activation
    pub fn fb_inhib(&self, avg_act: f32) -> f32 {
        self.fb * avg_act
    }

    /// time-integrate the feedback inhibition value
    pub fn fb_update(&self, fbi: &mut f32, new_fbi: f32) {
        *fbi += self.fb_dt * (new_fbi - *fbi);
    }

    /// inhib computes the full FFFB inhibition from layer or pool stats,
    /// updating the state in inh
    pub fn inhib(&self, avg_ge: f32, max_ge: f32, avg_act: f32, inh: &mut FFFBInhib) {
        if !self.on {
            inh.zero();
            return;
        }
        let ffi = self.ff_inhib(avg_ge, max_ge);
        let fbi = self.fb_inhib(avg_act);
        inh.ffi = ffi;
        self.fb_update(&mut inh.fbi, fbi);
        inh.gi = self.gi * (ffi + inh.fbi);
        inh.gi_orig = inh.gi;
    }
}

/// FFFBInhib is the computed FFFB inhibition state for a layer or pool
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FFFBInhib {
    /// computed feedforward inhibition
    pub ffi: f32,
    /// computed feedback inhibition, time-integrated
    pub fbi: f32,
    /// overall value of the inhibition
    pub gi: f32,
    /// original value of the inhibition, before pool-level max
    pub gi_orig: f32,
    /// layer-level inhibition applied to a pool, for pool max
    pub lay_gi: f32,
}

impl FFFBInhib {
    pub fn init(&mut self) {
        self.zero();
    }

    pub fn zero(&mut self) {
        self.ffi = 0.0;
        self.fbi = 0.0;
        self.gi = 0.0;
        self.gi_orig = 0.0;
        self.lay_gi = 0.0;
    }
}

/// SelfInhibParams is neuron self-inhibition, proportional to own activation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelfInhibParams {
    /// enable neuron self-inhibition
    pub on: bool,
    /// strength of self inhibition relative to activation
    pub gi: f32,
    /// time constant in cycles for integrating self inhibition
    pub tau: f32,

    pub(crate) dt: f32,
}

impl Default for SelfInhibParams {
    fn default() -> Self {
        let mut si = SelfInhibParams {
            on: false,
            gi: 0.4,
            tau: 1.4,
            dt: 0.0,
        };
        si.update();
        si
    }
}

impl SelfInhibParams {
    pub fn update(&mut self) {
        self.dt = 1.0 / self.tau;
    }

    /// inhib updates gi_self from the neuron's own activation
    pub fn inhib(&self, gi_self: &mut f32, act: f32) {
        if self.on {
            *gi_self += self.dt * (self.gi * act - *gi_self);
        } else {
            *gi_self = 0.0;
        }
    }
}

/// ActAvgParams tracks the running average activation in a layer, used for
/// netinput rescaling so that layers with different activity levels can be
/// combined sensibly
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActAvgParams {
    /// initial estimated average activity level
    pub init: f32,
    /// if true always use init instead of the running average
    pub fixed: bool,
    /// if true use the external activation levels where applied
    pub use_ext_act: bool,
    /// if true use the first actual average value to override init,
    /// providing a better estimate right away
    pub use_first: bool,
    /// time constant in trials for integrating the running average
    pub tau: f32,
    /// adjustment multiplier on the computed value, to correct for
    /// discrepancies between expected and actual levels
    pub adjust: f32,

    pub(crate) dt: f32,
}

impl Default for ActAvgParams {
    fn default() -> Self {
        let mut aa = ActAvgParams {
            init: 0.15,
            fixed: false,
            use_ext_act: false,
            use_first: true,
            tau: 100.0,
            adjust: 1.0,
            dt: 0.0,
        };
        aa.update();
        aa
    }
}

impl ActAvgParams {
    pub fn update(&mut self) {
        self.dt = 1.0 / self.tau;
    }

    /// initial value for the effective average, at InitWts
    pub fn eff_init(&self) -> f32 {
        if self.fixed {
            self.init
        } else {
            self.adjust * self.init
        }
    }

    /// avg_from_act updates the running average from the current actual avg
    pub fn avg_from_act(&self, avg: &mut f32, act: f32) {
        if self.use_first && *avg == self.init {
            *avg += 0.5 * (act - *avg);
        } else {
            *avg += self.dt * (act - *avg);
        }
    }

    /// eff_from_avg computes the effective value from the running average
    pub fn eff_from_avg(&self, eff: &mut f32, avg: f32) {
        if self.fixed {
            *eff = self.init;
        } else {
            *eff = self.adjust * avg;
        }
    }
}

/// InhibParams contains all the inhibition parameters for a layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InhibParams {
    /// FFFB inhibition across the whole layer
    pub layer: FFFBParams,
    /// FFFB inhibition within sub-pools, for 4D layers
    pub pool: FFFBParams,
    /// neuron self-inhibition
    pub self_inhib: SelfInhibParams,
    /// running average activity parameters
    pub act_avg: ActAvgParams,
}

impl Default for InhibParams {
    fn default() -> Self {
        let mut ip = InhibParams {
            layer: FFFBParams::default(),
            pool: FFFBParams::default(),
            self_inhib: SelfInhibParams::default(),
            act_avg: ActAvgParams::default(),
        };
        ip.layer.on = true;
        ip
    }
}

impl InhibParams {
    pub fn update(&mut self) {
        self.layer.update();
        self.pool.update();
        self.self_inhib.update();
        self.act_avg.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fffb_monotonic_in_ge() {
        let mut fp = FFFBParams::default();
        fp.on = true;
        let mut prev = -1.0f32;
        for i in 0..10 {
            let ge = 0.1 * i as f32;
            let mut inh = FFFBInhib::default();
            fp.inhib(ge, ge, 0.2, &mut inh);
            assert!(inh.gi >= prev, "gi not monotonic at ge={ge}");
            prev = inh.gi;
        }
    }

    #[test]
    fn fffb_off_zeros() {
        let fp = FFFBParams::default();
        let mut inh = FFFBInhib::default();
        inh.gi = 5.0;
        fp.inhib(1.0, 1.0, 1.0, &mut inh);
        assert_eq!(inh.gi, 0.0);
        assert_eq!(inh.ffi, 0.0);
        assert_eq!(inh.fbi, 0.0);
    }

    #[test]
    fn ff_zero_point() {
        let mut fp = FFFBParams::default();
        fp.on = true;
        assert_eq!(fp.ff_inhib(0.05, 0.05), 0.0);
        assert!(fp.ff_inhib(0.2, 0.2) > 0.0);
    }

    #[test]
    fn act_avg_use_first() {
        let aa = ActAvgParams::default();
        let mut avg = aa.init;
        aa.avg_from_act(&mut avg, 0.25);
        assert!((avg - 0.2).abs() < 1e-6); // halfway on first update
        aa.avg_from_act(&mut avg, 0.25);
        assert!((avg - (0.2 + 0.01 * 0.05)).abs() < 1e-6);
    }
}
