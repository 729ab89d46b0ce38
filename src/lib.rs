// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! # Leabra
//!
//! Biologically based neural network simulation with rate-coded point
//! neurons, fast feedforward/feedback (FFFB) pooled inhibition, and the
//! XCAL error-driven + hebbian learning rule.
//!
//! ## Quick Start
//!
//! ```rust
//! use leabra::prelude::*;
//!
//! let mut net = Network::with_seed("Demo", 42);
//! net.add_layer_2d("In", 5, 5, LayerType::Input);
//! net.add_layer_2d("Hid", 7, 7, LayerType::Hidden);
//! net.add_layer_2d("Out", 5, 5, LayerType::Target);
//! net.connect_layers("In", "Hid", Box::new(Full::new()), PrjnType::Forward)?;
//! net.connect_layers("Hid", "Out", Box::new(Full::new()), PrjnType::Forward)?;
//! net.connect_layers("Out", "Hid", Box::new(Full::new()), PrjnType::Back)?;
//! net.build()?;
//! net.init_wts();
//!
//! // one alpha trial: 4 quarters of 25 cycles, plus phase in the last
//! let mut time = Time::new();
//! net.apply_ext("In", &[0.95; 25])?;
//! net.apply_ext("Out", &[0.95; 25])?;
//! net.trial_init();
//! time.trial_start();
//! for _ in 0..4 {
//!     for _ in 0..time.cyc_per_qtr {
//!         net.cycle();
//!         time.cycle_inc();
//!     }
//!     net.quarter_final(&time);
//!     time.quarter_inc();
//! }
//! net.dwt();
//! net.wt_from_dwt();
//! # Ok::<(), leabra::NetError>(())
//! ```
//!
//! ## Crates
//!
//! - **leabra-neural**: neuron-level state and computation (activation
//!   dynamics, FFFB inhibition functions, XCAL learning functions)
//! - **leabra-net**: network structure (layers, projections, pools) and
//!   the alpha-trial update loop
//! - **leabra-observability**: `tracing` logging setup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use leabra_net as net;
pub use leabra_neural as neural;
pub use leabra_observability as observability;

pub use leabra_net::{
    Full, Layer, LayerType, NetError, Network, OneToOne, Pattern, Pool, PrjnType, Projection,
    Shape,
};
pub use leabra_neural::{Neuron, Synapse, Time};

/// Prelude - commonly used types for building and running networks
pub mod prelude {
    pub use crate::neural::{Neuron, Synapse, Time};
    pub use crate::net::{
        Full, Layer, LayerType, NetError, Network, OneToOne, Pattern, Pool, PrjnType, Projection,
        Shape,
    };
    pub use crate::observability::init_default as init_logging_default;
}
