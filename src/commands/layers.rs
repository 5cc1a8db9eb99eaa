// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use super::{read, Command};
use ocimod::formats::media_type::{self, MODULE_LAYER_V1_JSON};
use ocimod::formats::oci::Manifest;

use std::path::PathBuf;

use structopt::StructOpt;

/// Lists the layers of a manifest, marking main layer candidates with '*'
#[derive(StructOpt, Debug)]
pub struct Layers {
    /// The media type of the main layer
    #[structopt(long)]
    layer_media_type: Option<String>,

    /// The manifest file
    #[structopt(parse(from_os_str))]
    manifest: PathBuf,
}

impl Layers {
    fn lines(&self, manifest: &Manifest) -> Vec<String> {
        let expected = self.layer_media_type.as_deref().unwrap_or(MODULE_LAYER_V1_JSON);

        manifest
            .layers()
            .iter()
            .map(|l| {
                let mark = if media_type::matches(&l.media_type, expected) {
                    '*'
                } else {
                    ' '
                };
                format!("{} {}\t{}\t{}", mark, l.media_type, l.digest, l.size)
            })
            .collect()
    }
}

impl Command for Layers {
    fn execute(self) -> anyhow::Result<()> {
        let manifest = Manifest::from_slice(&read(&self.manifest)?)?;

        println!(
            "artifactType\t{}",
            manifest.artifact_type().unwrap_or("(unspecified)")
        );
        for line in self.lines(&manifest) {
            println!("{}", line);
        }

        Ok(())
    }
}
