// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Synapse-level state variables

use serde::{Deserialize, Serialize};

use crate::error::{NeuralError, Result};

/// Synapse holds the state for one synaptic connection.
/// Synapses are owned by the sending projection, in sender order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Synapse {
    /// synaptic weight value, sigmoid contrast-enhanced version of the linear weight
    pub wt: f32,
    /// linear (underlying) weight value, learns via the XCAL rule
    pub l_wt: f32,
    /// change in synaptic weight, accumulated and then applied by WtFmDWt
    pub d_wt: f32,
    /// DWt normalization factor, reset to max of abs dwt, decays slowly down over time
    pub norm: f32,
    /// momentum: time-integrated DWt changes, to accumulate a consistent direction of
    /// weight change and cancel out dithering contradictory changes
    pub moment: f32,
}

/// Names of all float32 synapse variables, for name-based access
pub const SYNAPSE_VARS: &[&str] = &["Wt", "LWt", "DWt", "Norm", "Moment"];

impl Synapse {
    /// Value of the variable with the given display name (e.g. "Wt")
    pub fn var_by_name(&self, name: &str) -> Result<f32> {
        let v = match name {
            "Wt" => self.wt,
            "LWt" => self.l_wt,
            "DWt" => self.d_wt,
            "Norm" => self.norm,
            "Moment" => self.moment,
            _ => return Err(NeuralError::UnknownVar(name.to_string())),
        };
        Ok(v)
    }

    /// Set the variable with the given display name
    pub fn set_var_by_name(&mut self, name: &str, val: f32) -> Result<()> {
        match name {
            "Wt" => self.wt = val,
            "LWt" => self.l_wt = val,
            "DWt" => self.d_wt = val,
            "Norm" => self.norm = val,
            "Moment" => self.moment = val,
            _ => return Err(NeuralError::UnknownVar(name.to_string())),
        }
        Ok(())
    }
}
