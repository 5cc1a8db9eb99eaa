// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use serde::Deserialize;

use crate::formats::media_type::{MODULE_ARTIFACT_TYPE, MODULE_CONFIG_V1, MODULE_LAYER_V1_JSON};

/// The types an artifact must declare to be accepted
///
/// These are versioned together with the tooling that publishes artifacts.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Contract {
    #[serde(rename = "artifactType")]
    pub artifact_type: String,

    #[serde(rename = "configMediaType")]
    pub config_media_type: String,

    #[serde(rename = "mainLayerMediaType")]
    pub main_layer_media_type: String,
}

impl Contract {
    /// The contract for module artifacts
    pub fn module() -> Self {
        Self {
            artifact_type: MODULE_ARTIFACT_TYPE.into(),
            config_media_type: MODULE_CONFIG_V1.into(),
            main_layer_media_type: MODULE_LAYER_V1_JSON.into(),
        }
    }
}

impl Default for Contract {
    fn default() -> Self {
        Self::module()
    }
}
