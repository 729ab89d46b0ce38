// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for neuron-level operations

/// Errors from neuron / synapse level operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum NeuralError {
    #[error("unknown variable name: {0}")]
    UnknownVar(String),
}

/// Result type for neural operations
pub type Result<T> = std::result::Result<T, NeuralError>;
