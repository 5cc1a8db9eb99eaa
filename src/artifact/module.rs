// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use super::{Contract, Error, InvalidArtifactKind, Layer};
use crate::formats::{media_type, oci::Manifest};

pub const NEWER_VERSION_MIGHT_BE_REQUIRED: &str =
    "A newer version of ocimod might be required to reference this artifact.";

/// A validated module artifact
///
/// The only way to get one is through a constructor, which checks the
/// manifest against a `Contract` and resolves the main layer. An existing
/// value is therefore always valid and never changes.
#[derive(Clone, Debug)]
pub struct ModuleArtifact {
    manifest: Manifest,
    layers: Vec<Layer>,
    main: usize,
}

impl ModuleArtifact {
    /// Validates a JSON manifest and the contents of its layers
    ///
    /// `contents` must hold every layer blob, in manifest order.
    pub fn new(
        bytes: &[u8],
        digest: &str,
        contents: Vec<Arc<[u8]>>,
        contract: &Contract,
    ) -> Result<Self, Error> {
        Self::with_parser(Manifest::from_slice, bytes, digest, contents, contract)
    }

    /// Like `new()`, with a caller-supplied manifest deserializer
    pub fn with_parser<P, E>(
        parse: P,
        bytes: &[u8],
        digest: &str,
        contents: Vec<Arc<[u8]>>,
        contract: &Contract,
    ) -> Result<Self, Error>
    where
        P: FnOnce(&[u8]) -> Result<Manifest, E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let manifest = parse(bytes)
            .map_err(|e| Error::ManifestParse(e.into()))?
            .identify(digest);

        if let Some(found) = manifest.artifact_type() {
            if !media_type::matches(found, &contract.artifact_type) {
                return Err(Error::invalid(
                    Some(InvalidArtifactKind::WrongArtifactType),
                    format!(
                        "Expected OCI manifest artifactType value of '{}' but found '{}'. {}",
                        contract.artifact_type, found, NEWER_VERSION_MIGHT_BE_REQUIRED
                    ),
                ));
            }
        }

        // Config mismatches carry no kind.
        if let Some(found) = manifest.config().media_type.as_deref() {
            if !media_type::matches(found, &contract.config_media_type) {
                return Err(Error::invalid(
                    None,
                    format!(
                        "Did not expect config media type '{}' (expected '{}'). {}",
                        found, contract.config_media_type, NEWER_VERSION_MIGHT_BE_REQUIRED
                    ),
                ));
            }
        }

        let declared = manifest.layers().len();
        if declared != contents.len() {
            return Err(Error::LayerCount {
                declared,
                retrieved: contents.len(),
            });
        }

        let layers: Vec<Layer> = manifest
            .layers()
            .iter()
            .cloned()
            .zip(contents)
            .map(|(descriptor, content)| Layer::new(descriptor, content))
            .collect();

        let main = Self::resolve(&layers, &contract.main_layer_media_type)?;
        debug!(
            "resolved main layer {} of manifest {}",
            layers[main].digest(),
            digest
        );

        Ok(Self {
            manifest,
            layers,
            main,
        })
    }

    /// Finds the index of the single layer with the expected media type
    ///
    /// Layers of any other media type are skipped, so producers may attach
    /// extra layers (signatures, provenance) as long as there is exactly one
    /// main layer.
    fn resolve(layers: &[Layer], expected: &str) -> Result<usize, Error> {
        let (main, ignored): (Vec<_>, Vec<_>) = layers
            .iter()
            .enumerate()
            .partition(|(_, l)| media_type::matches(l.media_type(), expected));

        for (_, layer) in ignored {
            debug!(
                "ignoring layer {} with media type {}",
                layer.digest(),
                layer.media_type()
            );
        }

        match main.as_slice() {
            [] => Err(Error::invalid(
                Some(InvalidArtifactKind::UnknownLayerMediaType),
                format!(
                    "Expected to find a layer with media type {}, but found none.",
                    expected
                ),
            )),

            [(index, _)] => Ok(*index),

            many => {
                let found: BTreeSet<&str> = many.iter().map(|(_, l)| l.media_type()).collect();
                let found: Vec<&str> = found.into_iter().collect();

                Err(Error::invalid(
                    Some(InvalidArtifactKind::UnknownLayerMediaType),
                    format!(
                        "Did not expect to find multiple layer media types of {}",
                        found.join(", ")
                    ),
                ))
            }
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The digest the manifest was retrieved under
    pub fn digest(&self) -> &str {
        self.manifest.digest().unwrap_or_default()
    }

    /// All layers in manifest order, including ignored ones
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn main_layer(&self) -> &Layer {
        &self.layers[self.main]
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use serde_json::{json, Map, Value};

    use super::{ModuleArtifact, NEWER_VERSION_MIGHT_BE_REQUIRED};
    use crate::artifact::{Contract, Error, InvalidArtifactKind};
    use crate::formats::{oci::Manifest, Algorithm, Digest};

    const DIGEST: &str = "sha256:6c3e2a0e1f6d3ae1c8a2b0d43e1c1c61c1a1e5d05a4a3a1a0a9f9ee4c5b6d7e8";
    const ARTIFACT: &str = "application/vnd.example.module.v1";
    const CONFIG: &str = "application/vnd.example.module.config.v1+json";
    const LAYER: &str = "application/vnd.example.module.layer.v1+json";
    const SIGNATURE: &str = "application/vnd.example.signature.v1";

    fn contract() -> Contract {
        Contract {
            artifact_type: ARTIFACT.into(),
            config_media_type: CONFIG.into(),
            main_layer_media_type: LAYER.into(),
        }
    }

    /// Builds manifest bytes plus one content blob per layer
    fn fixture(
        artifact_type: Option<&str>,
        config: Option<&str>,
        layers: &[&str],
    ) -> (Vec<u8>, Vec<Arc<[u8]>>) {
        let contents: Vec<Arc<[u8]>> = layers
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let blob = format!("{{\"layer\":{},\"kind\":\"{}\"}}", i, kind);
                Arc::from(blob.into_bytes())
            })
            .collect();

        let descriptors: Vec<Value> = layers
            .iter()
            .zip(&contents)
            .map(|(kind, content)| {
                json!({
                    "mediaType": kind,
                    "digest": Digest::of(Algorithm::Sha256, content).to_string(),
                    "size": content.len(),
                })
            })
            .collect();

        let mut cfg = Map::new();
        if let Some(kind) = config {
            cfg.insert("mediaType".into(), json!(kind));
        }
        cfg.insert("digest".into(), json!(Digest::of(Algorithm::Sha256, b"{}").to_string()));
        cfg.insert("size".into(), json!(2));

        let mut doc = Map::new();
        doc.insert("schemaVersion".into(), json!(2));
        if let Some(kind) = artifact_type {
            doc.insert("artifactType".into(), json!(kind));
        }
        doc.insert("config".into(), Value::Object(cfg));
        doc.insert("layers".into(), Value::Array(descriptors));

        (serde_json::to_vec(&Value::Object(doc)).unwrap(), contents)
    }

    fn build(
        artifact_type: Option<&str>,
        config: Option<&str>,
        layers: &[&str],
    ) -> Result<ModuleArtifact, Error> {
        let (bytes, contents) = fixture(artifact_type, config, layers);
        ModuleArtifact::new(&bytes, DIGEST, contents, &contract())
    }

    fn message(err: &Error) -> String {
        err.to_string()
    }

    #[test]
    fn auxiliary_layers_are_ignored() {
        let (bytes, contents) = fixture(Some(ARTIFACT), None, &[LAYER, SIGNATURE]);
        let artifact = ModuleArtifact::new(&bytes, DIGEST, contents.clone(), &contract()).unwrap();

        assert_eq!(artifact.layers().len(), 2);
        assert_eq!(artifact.main_layer().media_type(), LAYER);
        assert!(Arc::ptr_eq(artifact.main_layer().content(), &contents[0]));
        assert_eq!(artifact.layers()[1].media_type(), SIGNATURE);
    }

    #[test]
    fn main_layer_in_any_position() {
        let layers = [SIGNATURE, "text/plain", LAYER];
        let artifact = build(Some(ARTIFACT), Some(CONFIG), &layers).unwrap();
        assert!(std::ptr::eq(artifact.main_layer(), &artifact.layers()[2]));
    }

    #[test]
    fn multiple_main_layers() {
        let err = build(Some(ARTIFACT), None, &[LAYER, LAYER]).unwrap_err();
        assert_eq!(err.kind(), Some(InvalidArtifactKind::UnknownLayerMediaType));
        assert_eq!(
            message(&err),
            format!("Did not expect to find multiple layer media types of {}", LAYER)
        );
    }

    #[test]
    fn multiple_main_layers_are_listed_sorted() {
        let upper = LAYER.to_uppercase();
        let layers = [LAYER, SIGNATURE, upper.as_str(), LAYER];
        let err = build(Some(ARTIFACT), None, &layers).unwrap_err();
        assert_eq!(err.kind(), Some(InvalidArtifactKind::UnknownLayerMediaType));
        assert!(message(&err).ends_with(&format!("{}, {}", upper, LAYER)));
        assert!(!message(&err).contains(SIGNATURE));
    }

    #[test]
    fn no_main_layer() {
        for layers in [&[][..], &[SIGNATURE][..], &[CONFIG, SIGNATURE][..]] {
            let err = build(Some(ARTIFACT), None, layers).unwrap_err();
            assert_eq!(err.kind(), Some(InvalidArtifactKind::UnknownLayerMediaType));
            assert_eq!(
                message(&err),
                format!("Expected to find a layer with media type {}, but found none.", LAYER)
            );
        }
    }

    #[test]
    fn wrong_artifact_type() {
        let err = build(Some("application/vnd.other.thing"), None, &[LAYER]).unwrap_err();
        assert_eq!(err.kind(), Some(InvalidArtifactKind::WrongArtifactType));

        let msg = message(&err);
        assert!(msg.contains(ARTIFACT));
        assert!(msg.contains("application/vnd.other.thing"));
        assert!(msg.ends_with(NEWER_VERSION_MIGHT_BE_REQUIRED));
    }

    #[test]
    fn artifact_type_ignores_case() {
        let upper = ARTIFACT.to_uppercase();
        let layer = LAYER.to_uppercase();
        let config = CONFIG.to_uppercase();
        let artifact =
            build(Some(upper.as_str()), Some(config.as_str()), &[layer.as_str()]).unwrap();
        assert_eq!(artifact.main_layer().media_type(), layer);
    }

    #[test]
    fn missing_artifact_type_is_accepted() {
        let artifact = build(None, None, &[SIGNATURE, LAYER]).unwrap();
        assert_eq!(artifact.manifest().artifact_type(), None);
        assert_eq!(artifact.main_layer().media_type(), LAYER);

        // the other checks still apply
        let err = build(None, None, &[SIGNATURE]).unwrap_err();
        assert_eq!(err.kind(), Some(InvalidArtifactKind::UnknownLayerMediaType));
    }

    #[test]
    fn wrong_config_media_type_is_unclassified() {
        let other = "application/vnd.other.config";
        let err = build(Some(ARTIFACT), Some(other), &[LAYER]).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact { kind: None, .. }));
        assert_eq!(err.kind(), None);

        let msg = message(&err);
        assert!(msg.contains("application/vnd.other.config"));
        assert!(msg.contains(CONFIG));
    }

    #[test]
    fn checks_run_in_order() {
        let err = build(Some("application/vnd.other.thing"), Some("x/y"), &[]).unwrap_err();
        assert_eq!(err.kind(), Some(InvalidArtifactKind::WrongArtifactType));

        let err = build(Some(ARTIFACT), Some("x/y"), &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact { kind: None, .. }));
    }

    #[test]
    fn layer_count_mismatch() {
        let (bytes, mut contents) = fixture(Some(ARTIFACT), None, &[LAYER, SIGNATURE]);
        contents.pop();

        let err = ModuleArtifact::new(&bytes, DIGEST, contents, &contract()).unwrap_err();
        assert!(matches!(
            err,
            Error::LayerCount {
                declared: 2,
                retrieved: 1
            }
        ));
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn contract_checks_precede_layer_count() {
        let (bytes, mut contents) = fixture(Some("application/vnd.other.thing"), None, &[LAYER]);
        contents.clear();

        let err = ModuleArtifact::new(&bytes, DIGEST, contents, &contract()).unwrap_err();
        assert_eq!(err.kind(), Some(InvalidArtifactKind::WrongArtifactType));

        let (bytes, mut contents) = fixture(Some(ARTIFACT), Some("x/y"), &[LAYER]);
        contents.push(Arc::from(&b"extra"[..]));

        let err = ModuleArtifact::new(&bytes, DIGEST, contents, &contract()).unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact { kind: None, .. }));
    }

    #[test]
    fn unparsable_manifest() {
        let err = ModuleArtifact::new(b"<html>", DIGEST, Vec::new(), &contract()).unwrap_err();
        assert!(matches!(err, Error::ManifestParse(..)));
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn injected_parser() {
        let (bytes, contents) = fixture(Some(ARTIFACT), None, &[LAYER]);

        let artifact = ModuleArtifact::with_parser(
            |b: &[u8]| serde_json::from_slice::<Manifest>(b),
            &bytes,
            DIGEST,
            contents,
            &contract(),
        )
        .unwrap();
        assert_eq!(artifact.main_layer().media_type(), LAYER);

        let err = ModuleArtifact::with_parser(
            |_: &[u8]| Err::<Manifest, _>("unsupported encoding"),
            &bytes,
            DIGEST,
            Vec::new(),
            &contract(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ManifestParse(..)));
        assert!(message(&err).contains("unsupported encoding"));
    }

    #[test]
    fn construction_is_repeatable() {
        let (bytes, contents) = fixture(Some(ARTIFACT), Some(CONFIG), &[SIGNATURE, LAYER]);

        let one = ModuleArtifact::new(&bytes, DIGEST, contents.clone(), &contract()).unwrap();
        let two = ModuleArtifact::new(&bytes, DIGEST, contents, &contract()).unwrap();
        assert_eq!(one.main_layer().digest(), two.main_layer().digest());
        assert!(Arc::ptr_eq(one.main_layer().content(), two.main_layer().content()));

        let (bytes, contents) = fixture(Some(ARTIFACT), None, &[LAYER, LAYER]);
        let one = ModuleArtifact::new(&bytes, DIGEST, contents.clone(), &contract()).unwrap_err();
        let two = ModuleArtifact::new(&bytes, DIGEST, contents, &contract()).unwrap_err();
        assert_eq!(one.kind(), two.kind());
        assert_eq!(message(&one), message(&two));
    }

    #[test]
    fn carries_manifest_digest() {
        let artifact = build(Some(ARTIFACT), None, &[LAYER]).unwrap();
        assert_eq!(artifact.manifest().digest(), Some(DIGEST));
        assert_eq!(artifact.digest(), DIGEST);

        let layer = artifact.main_layer();
        assert!(layer.digest().verify(layer.content()));
        assert_eq!(layer.size(), layer.content().len() as u64);
    }

    #[test]
    fn shareable_across_threads() {
        fn check<T: Send + Sync>() {}
        check::<ModuleArtifact>();
        check::<Error>();

        let artifact = Arc::new(build(Some(ARTIFACT), None, &[LAYER]).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let artifact = artifact.clone();
                std::thread::spawn(move || artifact.main_layer().media_type().to_string())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), LAYER);
        }
    }
}
