// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use super::{media_type, Digest};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported manifest schema version {0}")]
    SchemaVersion(usize),

    #[error("unsupported manifest media type '{0}'")]
    MediaType(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct Descriptor {
    #[serde(rename = "mediaType")]
    pub media_type: String,

    pub digest: Digest,

    pub size: u64,

    #[serde(default)]
    pub urls: Vec<String>,

    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

/// The config descriptor; older producers leave out its media type
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(rename = "mediaType")]
    pub media_type: Option<String>,

    pub digest: Digest,

    pub size: u64,
}

/// A parsed OCI image manifest
///
/// The digest is not part of the document; it is whatever the registry
/// handed out alongside the bytes and is attached after parsing.
#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    #[serde(skip)]
    digest: Option<String>,

    #[serde(rename = "schemaVersion")]
    schema_version: usize,

    #[serde(rename = "mediaType")]
    media_type: Option<String>,

    #[serde(rename = "artifactType")]
    artifact_type: Option<String>,

    config: Config,

    #[serde(default)]
    layers: Vec<Descriptor>,

    #[serde(default)]
    annotations: HashMap<String, String>,
}

impl Manifest {
    const SCHEMA_VERSION: usize = 2;

    /// Parses a JSON manifest document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let manifest: Self = serde_json::from_slice(bytes)?;

        if manifest.schema_version != Self::SCHEMA_VERSION {
            return Err(ParseError::SchemaVersion(manifest.schema_version));
        }

        if let Some(kind) = &manifest.media_type {
            if !media_type::matches(kind, media_type::IMAGE_MANIFEST) {
                return Err(ParseError::MediaType(kind.clone()));
            }
        }

        Ok(manifest)
    }

    pub(crate) fn identify(mut self, digest: &str) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// The digest the manifest was retrieved under
    ///
    /// `None` for a manifest parsed on its own; a `ModuleArtifact` always
    /// carries one.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn schema_version(&self) -> usize {
        self.schema_version
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn artifact_type(&self) -> Option<&str> {
        self.artifact_type.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layers(&self) -> &[Descriptor] {
        &self.layers
    }

    pub fn annotations(&self) -> &HashMap<String, String> {
        &self.annotations
    }
}
