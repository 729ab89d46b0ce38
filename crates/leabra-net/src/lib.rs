// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! # Leabra Network Structure
//!
//! Everything above the single neuron: layers with pooled FFFB inhibition,
//! projections with pattern-generated synapse structure, and the network
//! container running the standard alpha-trial update sequence of 4
//! quarters of 25 cycles, with the plus phase in the final quarter.
//!
//! The [`Network`] owns all [`Layer`]s and [`Projection`]s in two parallel
//! lists; layers and projections reference each other by index, so there
//! are no self-referential structures. Synapses live in their projection
//! in sender order, with a receiver-side index for receiver-major sweeps
//! like weight balance.

pub mod error;
pub mod layer;
pub mod network;
pub mod pattern;
pub mod pool;
pub mod prjn;
pub mod shape;
pub mod wts;

pub use error::{NetError, Result};
pub use layer::{Layer, LayerType};
pub use network::Network;
pub use pattern::{Connectivity, Full, OneToOne, Pattern};
pub use pool::{ActAvgs, Pool};
pub use prjn::{ConIdxs, Projection, PrjnType};
pub use shape::Shape;
