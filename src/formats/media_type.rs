// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Media type constants and comparison

/// An OCI image manifest
pub const IMAGE_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";

/// The artifact type of a module
pub const MODULE_ARTIFACT_TYPE: &str = "application/vnd.ocimod.module.artifact";

/// The config blob of a module
pub const MODULE_CONFIG_V1: &str = "application/vnd.ocimod.module.config.v1+json";

/// The layer carrying a module's source as JSON
pub const MODULE_LAYER_V1_JSON: &str = "application/vnd.ocimod.module.layer.v1+json";

/// Compares two media types
///
/// Media types are ASCII tokens, so the comparison is an ordinal,
/// ASCII case-insensitive one and never depends on the current locale.
/// Every media type or artifact type check in this crate goes through here.
#[inline]
pub fn matches(actual: &str, expected: &str) -> bool {
    actual.eq_ignore_ascii_case(expected)
}
