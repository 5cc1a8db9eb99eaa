// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use structopt::StructOpt;

use ocimod::artifact::Contract;

mod layers;
mod resolve;

pub trait Command {
    fn execute(self) -> anyhow::Result<()>;
}

#[derive(StructOpt, Debug)]
#[structopt(about = "validates module artifacts pulled from OCI registries")]
pub enum Main {
    Resolve(resolve::Resolve),
    Layers(layers::Layers),
}

impl Command for Main {
    fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Resolve(cmd) => cmd.execute(),
            Self::Layers(cmd) => cmd.execute(),
        }
    }
}

/// The expected artifact types
///
/// Individual options override the values read from `--contract`, which in
/// turn override the module defaults.
#[derive(StructOpt, Debug)]
pub struct ContractArgs {
    /// A JSON file holding the expected contract
    #[structopt(long, parse(from_os_str))]
    contract: Option<PathBuf>,

    /// The expected manifest artifact type
    #[structopt(long)]
    artifact_type: Option<String>,

    /// The expected config media type
    #[structopt(long)]
    config_media_type: Option<String>,

    /// The expected media type of the main layer
    #[structopt(long)]
    layer_media_type: Option<String>,
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("unable to read {}", path.display()))
}

impl ContractArgs {
    pub fn load(&self) -> Result<Contract> {
        let mut contract = match &self.contract {
            Some(path) => {
                let bytes = read(path)?;
                serde_json::from_slice(&bytes)
                    .with_context(|| format!("invalid contract in {}", path.display()))?
            }
            None => Contract::module(),
        };

        if let Some(value) = &self.artifact_type {
            contract.artifact_type = value.clone();
        }
        if let Some(value) = &self.config_media_type {
            contract.config_media_type = value.clone();
        }
        if let Some(value) = &self.layer_media_type {
            contract.main_layer_media_type = value.clone();
        }

        Ok(contract)
    }
}
