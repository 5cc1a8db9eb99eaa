// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

//! Validation of module artifacts pulled from an OCI registry

mod contract;
mod error;
mod layer;
mod module;

pub use self::contract::Contract;
pub use self::error::{Error, InvalidArtifactKind};
pub use self::layer::Layer;
pub use self::module::{ModuleArtifact, NEWER_VERSION_MIGHT_BE_REQUIRED};
