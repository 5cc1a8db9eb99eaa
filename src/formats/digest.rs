// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2021 Profian, Inc.

use std::str::FromStr;

use serde::Deserialize;
use sha2::{Digest as _, Sha224, Sha256, Sha384, Sha512};
use thiserror::Error;

#[inline(always)]
fn dehex(byte: u8) -> Result<u8, Invalid> {
    Ok(match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => return Err(Invalid::Encoding),
    })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum Invalid {
    #[error("invalid digest algorithm")]
    Algorithm,

    #[error("invalid digest encoding")]
    Encoding,

    #[error("invalid digest length")]
    Length,
}

/// A hash algorithm allowed in an OCI descriptor
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Sha224 => "sha224",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }

    /// Length of the raw hash output in bytes
    fn size(self) -> usize {
        match self {
            Algorithm::Sha224 => 28,
            Algorithm::Sha256 => 32,
            Algorithm::Sha384 => 48,
            Algorithm::Sha512 => 64,
        }
    }

    fn hash(self, data: &[u8]) -> Vec<u8> {
        match self {
            Algorithm::Sha224 => Sha224::digest(data).to_vec(),
            Algorithm::Sha256 => Sha256::digest(data).to_vec(),
            Algorithm::Sha384 => Sha384::digest(data).to_vec(),
            Algorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Invalid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Algorithm::Sha224,
            Algorithm::Sha256,
            Algorithm::Sha384,
            Algorithm::Sha512,
        ]
        .into_iter()
        .find(|a| s.eq_ignore_ascii_case(a.name()))
        .ok_or(Invalid::Algorithm)
    }
}

/// A content digest
///
/// This digest is most often represented in the form 'ALGORITHM:HEX_BYTES'.
/// A bare 64 character hex string is accepted as sha256.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: Algorithm,
    hash: Vec<u8>,
}

impl Digest {
    /// Computes the digest of `data`
    pub fn of(algorithm: Algorithm, data: &[u8]) -> Self {
        Self {
            algorithm,
            hash: algorithm.hash(data),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Whether `data` hashes to this digest
    pub fn verify(&self, data: &[u8]) -> bool {
        self.algorithm.hash(data) == self.hash
    }
}

impl FromStr for Digest {
    type Err = Invalid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algorithm, hex) = match s.split_once(':') {
            Some((lhs, rhs)) => (lhs.parse()?, rhs),
            None if s.len() == 64 => (Algorithm::Sha256, s),
            None => return Err(Invalid::Algorithm),
        };

        if hex.len() != algorithm.size() * 2 {
            return Err(Invalid::Length);
        }

        let hash = hex
            .as_bytes()
            .chunks_exact(2)
            .map(|pair| Ok(dehex(pair[0])? << 4 | dehex(pair[1])?))
            .collect::<Result<Vec<u8>, Invalid>>()?;

        Ok(Self { algorithm, hash })
    }
}

struct Visitor;
impl<'de> serde::de::Visitor<'de> for Visitor {
    type Value = Digest;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a string in the format `ALGO:HASH`")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(|e| E::custom(format!("{}: {}", e, v)))
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(Visitor)
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.algorithm.name())?;

        for byte in self.hash.iter() {
            write!(f, "{:02x}", byte)?;
        }

        Ok(())
    }
}
