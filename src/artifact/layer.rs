// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::sync::Arc;

use crate::formats::{oci::Descriptor, Digest};

/// A retrieved layer: its descriptor paired with its content
///
/// The content is shared with whoever retrieved it and is never copied.
#[derive(Clone, Debug)]
pub struct Layer {
    descriptor: Descriptor,
    content: Arc<[u8]>,
}

impl Layer {
    pub(super) fn new(descriptor: Descriptor, content: Arc<[u8]>) -> Self {
        Self {
            descriptor,
            content,
        }
    }

    pub fn media_type(&self) -> &str {
        &self.descriptor.media_type
    }

    pub fn digest(&self) -> &Digest {
        &self.descriptor.digest
    }

    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn content(&self) -> &Arc<[u8]> {
        &self.content
    }
}
