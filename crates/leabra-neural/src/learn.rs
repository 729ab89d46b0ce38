// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! XCAL learning: running-average activations, the checkmark dWt function,
//! sigmoidal weight contrast enhancement, dwt normalization, momentum, and
//! weight balance soft renormalization.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::neuron::Neuron;
use crate::rnd::RndParams;
use crate::synapse::Synapse;

/// LearnNeurParams manages learning-related parameters at the neuron level,
/// mainly the running average activations that drive learning
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LearnNeurParams {
    /// running average activations that drive learning
    pub act_avg: LrnActAvgParams,
    /// long-term running average AvgL, the BCM floating threshold
    pub avg_l: AvgLParams,
    /// cosine diff between minus and plus phase activations
    pub cos_diff: CosDiffParams,
}

impl LearnNeurParams {
    pub fn update(&mut self) {
        self.act_avg.update();
        self.avg_l.update();
        self.cos_diff.update();
    }

    /// initializes the running-average activation values, at InitWts
    pub fn init_act_avg(&self, nrn: &mut Neuron) {
        nrn.avg_ss = self.act_avg.init;
        nrn.avg_s = self.act_avg.init;
        nrn.avg_m = self.act_avg.init;
        nrn.avg_l = self.avg_l.init;
        nrn.avg_s_lrn = 0.0;
    }

    /// updates the running averages from current activation, after each cycle
    pub fn avgs_from_act(&self, nrn: &mut Neuron) {
        self.act_avg.avgs_from_act(
            nrn.act,
            &mut nrn.avg_ss,
            &mut nrn.avg_s,
            &mut nrn.avg_m,
            &mut nrn.avg_s_lrn,
        );
    }

    /// computes long-term average and learning factor from current AvgM,
    /// at start of new trial
    pub fn avg_l_from_avg_m(&self, nrn: &mut Neuron) {
        self.avg_l
            .avg_l_from_avg_m(nrn.avg_m, &mut nrn.avg_l, &mut nrn.avg_l_lrn);
    }
}

/// LearnSynParams manages learning-related parameters at the synapse level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnSynParams {
    /// enable learning for this projection
    pub learn: bool,
    /// learning rate
    pub lrate: f32,
    /// initial random weight distribution
    pub wt_init: RndParams,
    /// XCAL checkmark learning function
    pub x_cal: XCalParams,
    /// sigmoidal contrast weight enhancement
    pub wt_sig: WtSigParams,
    /// normalizing weight changes by max abs dwt
    pub norm: DWtNormParams,
    /// momentum across weight changes
    pub momentum: MomentumParams,
    /// balancing strength of weight increases vs decreases
    pub wt_bal: WtBalParams,
}

impl Default for LearnSynParams {
    fn default() -> Self {
        LearnSynParams {
            learn: true,
            lrate: 0.04,
            wt_init: RndParams::default(),
            x_cal: XCalParams::default(),
            wt_sig: WtSigParams::default(),
            norm: DWtNormParams::default(),
            momentum: MomentumParams::default(),
            wt_bal: WtBalParams::default(),
        }
    }
}

impl LearnSynParams {
    pub fn update(&mut self) {
        self.x_cal.update();
        self.norm.update();
        self.momentum.update();
    }

    /// initializes weight values from wt_init, and the linear weight from
    /// the sigmoidal weight value
    pub fn init_wts<R: Rng>(&self, syn: &mut Synapse, rng: &mut R) {
        syn.wt = self.wt_init.gen(rng);
        syn.l_wt = self.wt_sig.lin_from_sig_wt(syn.wt);
        syn.d_wt = 0.0;
        syn.norm = 0.0;
        syn.moment = 0.0;
    }

    /// updates the linear weight from the current effective (contrast
    /// enhanced) weight value
    pub fn l_wt_from_wt(&self, syn: &mut Synapse) {
        syn.l_wt = self.wt_sig.lin_from_sig_wt(syn.wt);
    }

    /// updates the effective weight from the current linear weight value
    pub fn wt_from_l_wt(&self, syn: &mut Synapse) {
        syn.wt = self.wt_sig.sig_from_lin_wt(syn.l_wt);
    }

    /// chl_dwt returns the (error-driven, bcm hebbian) weight change
    /// components of the XCAL CHL learning rule
    pub fn chl_dwt(
        &self,
        su_avg_s_lrn: f32,
        su_avg_m: f32,
        ru_avg_s_lrn: f32,
        ru_avg_m: f32,
        ru_avg_l: f32,
    ) -> (f32, f32) {
        let srs = su_avg_s_lrn * ru_avg_s_lrn;
        let srm = su_avg_m * ru_avg_m;
        let bcm = self.x_cal.dwt(srs, ru_avg_l);
        let err = self.x_cal.dwt(srs, srm);
        (err, bcm)
    }

    /// wt_from_dwt updates the synaptic weights from accumulated weight
    /// changes. wb_inc and wb_dec are the weight balance factors, wt is the
    /// sigmoidal contrast-enhanced weight and lwt is the linear weight.
    pub fn wt_from_dwt(&self, wb_inc: f32, wb_dec: f32, dwt: &mut f32, wt: &mut f32, lwt: &mut f32) {
        if *dwt == 0.0 {
            return;
        }
        if self.wt_sig.soft_bound {
            if *dwt > 0.0 {
                *dwt *= wb_inc * (1.0 - *lwt);
            } else {
                *dwt *= wb_dec * *lwt;
            }
        } else if *dwt > 0.0 {
            *dwt *= wb_inc;
        } else {
            *dwt *= wb_dec;
        }
        *lwt = (*lwt + *dwt).clamp(0.0, 1.0);
        *wt = self.wt_sig.sig_from_lin_wt(*lwt);
        *dwt = 0.0;
    }
}

/// LrnActAvgParams are rate constants for averaging over activations at
/// different time scales, producing the running averages that drive XCAL
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LrnActAvgParams {
    /// time constant in cycles for the super-short avg_ss, a pre-integration
    /// step before integrating into the short avg_s
    pub ss_tau: f32,
    /// time constant in cycles for the short avg_s from avg_ss (cascade),
    /// the plus-phase learning signal reflecting the most recent past
    pub s_tau: f32,
    /// time constant in cycles for the medium avg_m from avg_s (cascade),
    /// the minus-phase learning signal reflecting the prior expectation
    pub m_tau: f32,
    /// how much medium average to mix into avg_s_lrn, so learning does not
    /// go to zero when a unit turns off in the plus phase
    pub lrn_m: f32,
    /// initial value for the averages
    pub init: f32,

    pub(crate) ss_dt: f32,
    pub(crate) s_dt: f32,
    pub(crate) m_dt: f32,
    pub(crate) lrn_s: f32,
}

impl Default for LrnActAvgParams {
    fn default() -> Self {
        let mut aa = LrnActAvgParams {
            ss_tau: 2.0,
            s_tau: 2.0,
            m_tau: 10.0,
            lrn_m: 0.1,
            init: 0.15,
            ss_dt: 0.0,
            s_dt: 0.0,
            m_dt: 0.0,
            lrn_s: 0.0,
        };
        aa.update();
        aa
    }
}

impl LrnActAvgParams {
    pub fn update(&mut self) {
        self.ss_dt = 1.0 / self.ss_tau;
        self.s_dt = 1.0 / self.s_tau;
        self.m_dt = 1.0 / self.m_tau;
        self.lrn_s = 1.0 - self.lrn_m;
    }

    /// computes the cascade of averages from current act
    pub fn avgs_from_act(
        &self,
        act: f32,
        avg_ss: &mut f32,
        avg_s: &mut f32,
        avg_m: &mut f32,
        avg_s_lrn: &mut f32,
    ) {
        *avg_ss += self.ss_dt * (act - *avg_ss);
        *avg_s += self.s_dt * (*avg_ss - *avg_s);
        *avg_m += self.m_dt * (*avg_s - *avg_m);
        *avg_s_lrn = self.lrn_s * *avg_s + self.lrn_m * *avg_m;
    }
}

/// AvgLParams compute the long-term floating average AvgL which drives
/// BCM-style hebbian learning in XCAL. This increases contrast of weights
/// and generally decreases overall activity, preventing hog units. Also
/// computes an adaptive amount of BCM learning, AvgLLrn, from AvgL.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvgLParams {
    /// initial AvgL value at start of training
    pub init: f32,
    /// gain multiplier on avg_m in the running average, the key floating
    /// threshold in the BCM rule
    pub gain: f32,
    /// minimum AvgL value, floor even under prolonged inactivity
    pub min: f32,
    /// time constant in trials for updating AvgL
    pub tau: f32,
    /// maximum AvgLLrn value, reached when AvgL is at its maximum (gain)
    pub lrn_max: f32,
    /// minimum AvgLLrn value, reached when AvgL is at its minimum
    pub lrn_min: f32,
    /// modulate amount of learning by normalized level of error within layer
    pub err_mod: bool,
    /// minimum modulation value for err_mod, ensures some self-organizing
    /// learning even with very small error signals
    pub mod_min: f32,

    pub(crate) dt: f32,
    pub(crate) lrn_fact: f32,
}

impl Default for AvgLParams {
    fn default() -> Self {
        let mut al = AvgLParams {
            init: 0.4,
            gain: 2.5,
            min: 0.2,
            tau: 10.0,
            lrn_max: 0.5,
            lrn_min: 0.0001,
            err_mod: true,
            mod_min: 0.01,
            dt: 0.0,
            lrn_fact: 0.0,
        };
        al.update();
        al
    }
}

impl AvgLParams {
    pub fn update(&mut self) {
        self.dt = 1.0 / self.tau;
        self.lrn_fact = (self.lrn_max - self.lrn_min) / (self.gain - self.min);
    }

    /// computes long-term average and learning factor from avg_m
    pub fn avg_l_from_avg_m(&self, avg_m: f32, avg_l: &mut f32, lrn: &mut f32) {
        *avg_l += self.dt * (self.gain * avg_m - *avg_l);
        if *avg_l < self.min {
            *avg_l = self.min;
        }
        *lrn = self.lrn_fact * (*avg_l - self.min);
    }

    /// computes the AvgLLrn multiplier from the layer cosine diff avg stat
    pub fn err_mod_from_lay_err(&self, lay_cos_diff_avg: f32) -> f32 {
        if !self.err_mod {
            return 1.0;
        }
        lay_cos_diff_avg.max(self.mod_min)
    }
}

/// CosDiffParams specify integration of the cosine of the difference
/// between plus and minus phase activations, which modulates the amount of
/// hebbian learning and overall learning rate
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CosDiffParams {
    /// time constant in trials for the running average and variance
    pub tau: f32,

    pub(crate) dt: f32,
    pub(crate) dt_c: f32,
}

impl Default for CosDiffParams {
    fn default() -> Self {
        let mut cd = CosDiffParams {
            tau: 100.0,
            dt: 0.0,
            dt_c: 0.0,
        };
        cd.update();
        cd
    }
}

impl CosDiffParams {
    pub fn update(&mut self) {
        self.dt = 1.0 / self.tau;
        self.dt_c = 1.0 - self.dt;
    }

    /// updates the running average and variance from the current cosine diff.
    /// Variance uses the exponentially-weighted incremental formula from
    /// Finch (2009), Incremental calculation of weighted mean and variance.
    pub fn avg_var_from_cos(&self, avg: &mut f32, vr: &mut f32, cos: f32) {
        if *avg == 0.0 {
            // first time
            *avg = cos;
            *vr = 0.0;
        } else {
            let del = cos - *avg;
            let incr = self.dt * del;
            *avg += incr;
            if *vr == 0.0 {
                *vr = 2.0 * self.dt_c * del * incr;
            } else {
                *vr = self.dt_c * (*vr + del * incr);
            }
        }
    }
}

/// CosDiffStats holds cosine-difference statistics at the layer level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CosDiffStats {
    /// cosine (normalized dot product) difference between ActP and ActM on
    /// this trial
    pub cos: f32,
    /// running average of cos
    pub avg: f32,
    /// running variance of cos
    pub var: f32,
    /// 1 - avg, and 0 for non-hidden layers -- modulates hebbian learning
    pub avg_lrn: f32,
    /// value used for err_mod modulation of AvgLLrn, 0 for non-hidden layers
    pub mod_avg_l_lrn: f32,
}

impl CosDiffStats {
    pub fn init(&mut self) {
        *self = CosDiffStats::default();
    }
}

/// XCalParams are parameters for the temporally eXtended Contrastive
/// Attractor Learning (XCAL) checkmark function, the standard learning
/// equation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct XCalParams {
    /// multiplier on the medium-term (error-driven) component, 1 for
    /// error-driven learning, 0 for pure hebbian
    pub m_lrn: f32,
    /// if true, use the fixed l_lrn factor instead of the receiving unit's
    /// dynamic AvgLLrn -- e.g. m_lrn = 0, l_lrn = 1 gives pure hebbian
    pub set_l_lrn: bool,
    /// fixed weighting factor for the long-term (BCM, hebbian) component
    pub l_lrn: f32,
    /// proportional point within the LTD range where magnitude reverses
    /// back toward zero
    pub d_rev: f32,
    /// minimum sr coproduct below which no weight change occurs
    pub d_thr: f32,
    /// don't learn when sending unit activation is below this in both phases
    pub lrn_thr: f32,

    /// -(1-d_rev)/d_rev, the LTD slope with the minus sign built in
    pub(crate) d_rev_ratio: f32,
}

impl Default for XCalParams {
    fn default() -> Self {
        let mut xc = XCalParams {
            m_lrn: 1.0,
            set_l_lrn: false,
            l_lrn: 1.0,
            d_rev: 0.1,
            d_thr: 0.0001,
            lrn_thr: 0.01,
            d_rev_ratio: 0.0,
        };
        xc.update();
        xc
    }
}

impl XCalParams {
    pub fn update(&mut self) {
        if self.d_rev > 0.0 {
            self.d_rev_ratio = -(1.0 - self.d_rev) / self.d_rev;
        } else {
            self.d_rev_ratio = -1.0;
        }
    }

    /// dwt is the XCAL checkmark function of the sr coproduct relative to
    /// the floating threshold thr_p
    pub fn dwt(&self, srval: f32, thr_p: f32) -> f32 {
        if srval < self.d_thr {
            0.0
        } else if srval > thr_p * self.d_rev {
            srval - thr_p
        } else {
            srval * self.d_rev_ratio
        }
    }

    /// learning rate for the long-term floating average (BCM) component
    pub fn long_lrate(&self, avg_l_lrn: f32) -> f32 {
        if self.set_l_lrn {
            self.l_lrn
        } else {
            avg_l_lrn
        }
    }
}

/// WtSigParams are sigmoidal weight contrast enhancement parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WtSigParams {
    /// gain (contrast, sharpness) of the weight contrast function, 1 = linear
    pub gain: f32,
    /// offset of the function, 1 = centered at .5
    pub off: f32,
    /// apply exponential soft bounding to the weight changes
    pub soft_bound: bool,
}

impl Default for WtSigParams {
    fn default() -> Self {
        WtSigParams {
            gain: 6.0,
            off: 1.0,
            soft_bound: true,
        }
    }
}

/// sigmoid function for value w in 0-1 range, with gain and offset
pub fn sig_fun(w: f32, gain: f32, off: f32) -> f32 {
    if w <= 0.0 {
        return 0.0;
    }
    if w >= 1.0 {
        return 1.0;
    }
    1.0 / (1.0 + ((off * (1.0 - w)) / w).powf(gain))
}

/// sigmoid function with default gain = 6, offset = 1
pub fn sig_fun_61(w: f32) -> f32 {
    if w <= 0.0 {
        return 0.0;
    }
    if w >= 1.0 {
        return 1.0;
    }
    let pw = (1.0 - w) / w;
    1.0 / (1.0 + pw * pw * pw * pw * pw * pw)
}

/// inverse of the sigmoid function
pub fn sig_inv_fun(w: f32, gain: f32, off: f32) -> f32 {
    if w <= 0.0 {
        return 0.0;
    }
    if w >= 1.0 {
        return 1.0;
    }
    1.0 / (1.0 + ((1.0 - w) / w).powf(1.0 / gain) / off)
}

/// inverse of the sigmoid function with default gain = 6, offset = 1
pub fn sig_inv_fun_61(w: f32) -> f32 {
    if w <= 0.0 {
        return 0.0;
    }
    if w >= 1.0 {
        return 1.0;
    }
    1.0 / (1.0 + ((1.0 - w) / w).powf(1.0 / 6.0))
}

impl WtSigParams {
    /// sigmoidal contrast-enhanced weight from linear weight
    pub fn sig_from_lin_wt(&self, lw: f32) -> f32 {
        if self.gain == 1.0 && self.off == 1.0 {
            return lw;
        }
        if self.gain == 6.0 && self.off == 1.0 {
            return sig_fun_61(lw);
        }
        sig_fun(lw, self.gain, self.off)
    }

    /// linear weight from sigmoidal contrast-enhanced weight
    pub fn lin_from_sig_wt(&self, sw: f32) -> f32 {
        if self.gain == 1.0 && self.off == 1.0 {
            return sw;
        }
        if self.gain == 6.0 && self.off == 1.0 {
            return sig_inv_fun_61(sw);
        }
        sig_inv_fun(sw, self.gain, self.off)
    }
}

/// DWtNormParams are weight change normalization parameters, using
/// max(abs(dwt)) aggregated at the receiving neuron level within a
/// projection. The norm slowly decays and instantly resets to any current
/// max, serving as an estimate of the variance in the weight changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DWtNormParams {
    /// whether to use dwt normalization, only on the error-driven component
    pub on: bool,
    /// time constant for decay of the norm factor, generally long (1000+)
    pub decay_tau: f32,
    /// minimum effective value of the normalization factor
    pub norm_min: f32,
    /// learning rate multiplier to compensate for normalization
    pub lr_comp: f32,

    pub(crate) decay_dt: f32,
    pub(crate) decay_dt_c: f32,
}

impl Default for DWtNormParams {
    fn default() -> Self {
        let mut dn = DWtNormParams {
            on: true,
            decay_tau: 1000.0,
            norm_min: 0.001,
            lr_comp: 0.15,
            decay_dt: 0.0,
            decay_dt_c: 0.0,
        };
        dn.update();
        dn
    }
}

impl DWtNormParams {
    pub fn update(&mut self) {
        self.decay_dt = 1.0 / self.decay_tau;
        self.decay_dt_c = 1.0 - self.decay_dt;
    }

    /// updates the slowly-decaying norm from abs(dwt), jumping up to any new
    /// max, and returns the effective normalization multiplier including the
    /// learning rate compensation
    pub fn norm_from_abs_dwt(&self, norm: &mut f32, abs_dwt: f32) -> f32 {
        *norm = (self.decay_dt_c * *norm).max(abs_dwt);
        if *norm == 0.0 {
            return 1.0;
        }
        self.lr_comp / norm.max(self.norm_min)
    }
}

/// MomentumParams implement standard simple momentum, accentuating
/// consistent directions of weight change and canceling out dithering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MomentumParams {
    /// whether to use momentum
    pub on: bool,
    /// time constant factor for integration of momentum
    pub m_tau: f32,
    /// learning rate multiplier to compensate for momentum
    pub lr_comp: f32,

    pub(crate) m_dt: f32,
    pub(crate) m_dt_c: f32,
}

impl Default for MomentumParams {
    fn default() -> Self {
        let mut mp = MomentumParams {
            on: true,
            m_tau: 10.0,
            lr_comp: 0.1,
            m_dt: 0.0,
            m_dt_c: 0.0,
        };
        mp.update();
        mp
    }
}

impl MomentumParams {
    pub fn update(&mut self) {
        self.m_dt = 1.0 / self.m_tau;
        self.m_dt_c = 1.0 - self.m_dt;
    }

    /// updates the synaptic moment from the dwt value and returns the new
    /// momentum factor times the learning rate compensation
    pub fn moment_from_dwt(&self, moment: &mut f32, dwt: f32) -> f32 {
        *moment = self.m_dt_c * *moment + dwt;
        self.lr_comp * *moment
    }
}

/// WtBalParams are weight balance soft renormalization parameters:
/// maintains overall weight balance by progressively penalizing weight
/// increases as a function of how strong the average receiving weights
/// are (subject to thresholding) and the long time-averaged activation.
/// Plugs into the soft bounding function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WtBalParams {
    /// perform weight balance soft normalization, generally beneficial for
    /// larger models where hog units are a problem
    pub on: bool,
    /// threshold on weight value for inclusion in the weight average, so
    /// weakening of low weights does not dilute sensitivity to strong ones
    pub avg_thr: f32,
    /// high threshold on the weight average before driving factor changes
    pub hi_thr: f32,
    /// gain on above-hi_thr weight averages, turning weight increases down
    pub hi_gain: f32,
    /// low threshold on the weight average before driving factor changes
    pub lo_thr: f32,
    /// gain on below-lo_thr weight averages, turning weight increases up
    pub lo_gain: f32,
    /// threshold for the long time-average activation contribution
    pub act_thr: f32,
    /// gain on above-act_thr activation averages
    pub act_gain: f32,
}

impl Default for WtBalParams {
    fn default() -> Self {
        WtBalParams {
            on: false,
            avg_thr: 0.25,
            hi_thr: 0.4,
            hi_gain: 4.0,
            lo_thr: 0.4,
            lo_gain: 6.0,
            act_thr: 0.25,
            act_gain: 0.0,
        }
    }
}

impl WtBalParams {
    /// computes the weight balance factors (fact, inc, dec) from the extent
    /// to which the weight average and act average exceed the thresholds
    pub fn wt_bal(&self, wb_avg: f32, act_avg: f32) -> (f32, f32, f32) {
        let mut fact = 0.0;
        let mut inc = 1.0;
        let mut dec = 1.0;
        if wb_avg < self.lo_thr {
            let wb_avg = wb_avg.max(self.avg_thr); // prevent extreme low if everyone below thr
            fact = self.lo_gain * (self.lo_thr - wb_avg);
            dec = 1.0 / (1.0 + fact);
            inc = 2.0 - dec;
        } else if wb_avg > self.hi_thr {
            fact += self.hi_gain * (wb_avg - self.hi_thr);
            if act_avg > self.act_thr {
                fact += self.act_gain * (act_avg - self.act_thr);
            }
            // sigmoidally small toward 0 as fact gets larger
            inc = 1.0 / (1.0 + fact);
            dec = 2.0 - inc; // as inc goes down, dec goes up, sum to 2
        }
        (fact, inc, dec)
    }
}

/// WtBalRecv are the per-receiving-neuron weight balance factors
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WtBalRecv {
    /// average of effective weights above avg_thr
    pub avg: f32,
    /// overall weight balance factor driving inc and dec
    pub fact: f32,
    /// multiplier on weight increases
    pub inc: f32,
    /// multiplier on weight decreases
    pub dec: f32,
}

impl Default for WtBalRecv {
    fn default() -> Self {
        WtBalRecv {
            avg: 0.0,
            fact: 0.0,
            inc: 1.0,
            dec: 1.0,
        }
    }
}

impl WtBalRecv {
    pub fn init(&mut self) {
        *self = WtBalRecv::default();
    }
}
