// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Validation of module artifacts distributed through OCI registries
//!
//! A registry client fetches a manifest and its layer blobs; handing them
//! to `artifact::ModuleArtifact::new()` checks them against a
//! `artifact::Contract` and resolves the one layer carrying the module.

pub mod artifact;
pub mod formats;
