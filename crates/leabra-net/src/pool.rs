// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Pools of neurons for aggregate statistics and pooled inhibition

use serde::{Deserialize, Serialize};

use leabra_neural::{AvgMax, FFFBInhib};

/// ActAvgs are running averages of overall pool activation, used for
/// netinput scaling so layers can be connected without regard to their
/// absolute activity levels
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActAvgs {
    /// running average of minus-phase activation
    pub act_m_avg: f32,
    /// running average of plus-phase activation
    pub act_p_avg: f32,
    /// act_p_avg with the adjust factor applied, the value used for scaling
    pub act_p_avg_eff: f32,
}

/// Pool is a group of neurons with aggregate statistics and its own FFFB
/// inhibition. Pool 0 always covers the entire layer; 4D layers add one
/// pool per unit group after it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pool {
    /// starting neuron index within the layer (inclusive)
    pub st_idx: usize,
    /// ending neuron index within the layer (exclusive)
    pub ed_idx: usize,
    /// FFFB inhibition state
    pub inhib: FFFBInhib,
    /// average and max Ge excitatory conductance
    pub ge: AvgMax,
    /// average and max activation over the current cycle
    pub act: AvgMax,
    /// average and max minus-phase activation
    pub act_m: AvgMax,
    /// average and max plus-phase activation
    pub act_p: AvgMax,
    /// running average activation levels, for netinput scaling
    pub act_avg: ActAvgs,
}

impl Pool {
    pub fn init(&mut self) {
        self.inhib.init();
        self.ge.init();
        self.act.init();
    }
}
