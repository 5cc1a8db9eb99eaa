// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

mod digest;
pub mod media_type;
pub mod oci;

pub use self::digest::{Algorithm, Digest, Invalid};
