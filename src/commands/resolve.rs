// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{read, Command, ContractArgs};
use ocimod::artifact::{Contract, ModuleArtifact};
use ocimod::formats::{Algorithm, Digest};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use structopt::StructOpt;
use tracing::warn;

/// Validates a module artifact and prints its main layer
#[derive(StructOpt, Debug)]
pub struct Resolve {
    #[structopt(flatten)]
    contract: ContractArgs,

    /// The manifest digest (default: sha256 of the manifest file)
    #[structopt(short, long)]
    digest: Option<String>,

    /// Fail when a layer does not match its descriptor digest
    #[structopt(long)]
    strict: bool,

    /// The manifest file
    #[structopt(parse(from_os_str))]
    manifest: PathBuf,

    /// The layer blobs, in manifest order
    #[structopt(parse(from_os_str))]
    layers: Vec<PathBuf>,
}

impl Resolve {
    fn artifact(&self, contract: &Contract) -> Result<ModuleArtifact> {
        let bytes = read(&self.manifest)?;
        let digest = match &self.digest {
            Some(digest) => digest.clone(),
            None => Digest::of(Algorithm::Sha256, &bytes).to_string(),
        };

        let contents = self
            .layers
            .iter()
            .map(|path| read(path).map(Arc::<[u8]>::from))
            .collect::<Result<Vec<_>>>()?;

        let artifact = match ModuleArtifact::new(&bytes, &digest, contents, contract) {
            Ok(artifact) => artifact,
            Err(e) => match e.kind() {
                Some(kind) => {
                    let context = format!("invalid artifact: {}", kind);
                    return Err(anyhow::Error::new(e).context(context));
                }
                None => return Err(e.into()),
            },
        };

        for layer in artifact.layers() {
            if !layer.digest().verify(layer.content()) {
                if self.strict {
                    bail!("layer content does not match digest {}", layer.digest());
                }

                warn!("layer content does not match digest {}", layer.digest());
            }
        }

        Ok(artifact)
    }
}

impl Command for Resolve {
    fn execute(self) -> anyhow::Result<()> {
        let contract = self.contract.load()?;
        let artifact = self.artifact(&contract)?;
        let layer = artifact.main_layer();

        println!("manifest\t{}", artifact.digest());
        println!("{}\t{}\t{}", layer.media_type(), layer.digest(), layer.size());

        Ok(())
    }
}
