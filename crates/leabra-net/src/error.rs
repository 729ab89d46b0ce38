// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for network construction and access

use thiserror::Error;

/// Errors from building and accessing network structure
#[derive(Debug, Error)]
pub enum NetError {
    #[error("layer named {0} not found")]
    UnknownLayer(String),

    #[error("build error: {0}")]
    Build(String),

    #[error("sending unit index {idx} out of range, layer has {size} units")]
    SendIdxRange { idx: usize, size: usize },

    #[error("receiving unit index {idx} out of range, layer has {size} units")]
    RecvIdxRange { idx: usize, size: usize },

    #[error("receiving unit {recv} does not receive from sending unit {send}")]
    NotConnected { send: usize, recv: usize },

    #[error(transparent)]
    Var(#[from] leabra_neural::NeuralError),

    #[error("weights file format: {0}")]
    WtsFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetError>;
