// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! # Leabra Neural Computation
//!
//! Neuron-level computation for rate-coded Leabra networks, independent of
//! any network structure:
//! - **Neuron / Synapse**: flat state variables
//! - **Act**: conductance-based point-neuron dynamics with the NoisyXX1
//!   rate-code activation function
//! - **Inhib**: feedforward / feedback (FFFB) pooled inhibition functions
//! - **Learn**: XCAL "checkmark" + BCM floating-threshold learning rule,
//!   with DWt normalization, momentum, and weight balance
//! - **Time**: quarter / cycle timing state
//!
//! All state is plain `f32` fields updated in place by parameter structs,
//! so the same functions serve single units in tests and full layers in a
//! network sweep.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod act;
pub mod error;
pub mod inhib;
pub mod learn;
pub mod math;
pub mod neuron;
pub mod rnd;
pub mod synapse;
pub mod time;

pub use act::{
    ActInitParams, ActNoiseParams, ActNoiseType, ActParams, Chans, ClampParams, DtParams,
    OptThreshParams, WtScaleParams, XX1Params,
};
pub use error::{NeuralError, Result};
pub use inhib::{ActAvgParams, FFFBInhib, FFFBParams, InhibParams, SelfInhibParams};
pub use learn::{
    AvgLParams, CosDiffParams, CosDiffStats, DWtNormParams, LearnNeurParams, LearnSynParams,
    LrnActAvgParams, MomentumParams, WtBalParams, WtBalRecv, WtSigParams, XCalParams,
};
pub use math::{AvgMax, MinMax};
pub use neuron::{NeurFlags, Neuron};
pub use rnd::{RndDist, RndParams};
pub use synapse::Synapse;
pub use time::{Quarters, Time};
