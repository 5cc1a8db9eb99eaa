// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::fmt::Display;

use thiserror::Error;

/// Invalid artifacts a caller may want to handle specially
///
/// Both usually mean the artifact was published by a newer tool.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InvalidArtifactKind {
    WrongArtifactType,
    UnknownLayerMediaType,
}

impl Display for InvalidArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongArtifactType => f.write_str("wrong artifact type"),
            Self::UnknownLayerMediaType => f.write_str("unknown layer media type"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to parse OCI manifest: {0}")]
    ManifestParse(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("manifest declares {declared} layers but {retrieved} were retrieved")]
    LayerCount { declared: usize, retrieved: usize },

    #[error("{message}")]
    InvalidArtifact {
        kind: Option<InvalidArtifactKind>,
        message: String,
    },
}

impl Error {
    pub(super) fn invalid(kind: Option<InvalidArtifactKind>, message: String) -> Self {
        Self::InvalidArtifact { kind, message }
    }

    /// The classification of an invalid artifact, if it has one
    pub fn kind(&self) -> Option<InvalidArtifactKind> {
        match self {
            Self::InvalidArtifact { kind, .. } => *kind,
            _ => None,
        }
    }
}
