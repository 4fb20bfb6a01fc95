// MediaGit - Git for Media Files
// Copyright (C) 2025 MediaGit Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Object identities for Git-compatible packs: SHA-1 or SHA-256, chosen
//! once per indexer (spec §6 construction parameter).

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fmt;

/// Hash algorithm an indexer was constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// 20-byte SHA-1, the historical Git default.
    Sha1,
    /// 32-byte SHA-256, for SHA-256 repositories.
    Sha256,
}

impl HashAlgorithm {
    /// Digest length in bytes for this algorithm.
    pub fn output_len(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
        }
    }

    /// Start a new running hash for streaming the whole pack through.
    pub fn running_hash(self) -> RunningHash {
        match self {
            HashAlgorithm::Sha1 => RunningHash::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => RunningHash::Sha256(Sha256::new()),
        }
    }

    /// Hash a complete Git object: `"<type> <size>\0" || content`.
    pub fn hash_object(self, type_name: &str, content: &[u8]) -> PackObjectId {
        let mut hasher = self.running_hash();
        hasher.update(type_name.as_bytes());
        hasher.update(b" ");
        hasher.update(content.len().to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(content);
        hasher.finalize()
    }

    /// Build an identity from raw bytes already known to have the right length.
    pub fn id_from_bytes(self, bytes: &[u8]) -> Option<PackObjectId> {
        match (self, bytes.len()) {
            (HashAlgorithm::Sha1, 20) => {
                let mut buf = [0u8; 20];
                buf.copy_from_slice(bytes);
                Some(PackObjectId::Sha1(buf))
            }
            (HashAlgorithm::Sha256, 32) => {
                let mut buf = [0u8; 32];
                buf.copy_from_slice(bytes);
                Some(PackObjectId::Sha256(buf))
            }
            _ => None,
        }
    }
}

/// A running hash over an entire byte stream (the pack trailer check).
#[derive(Clone)]
pub enum RunningHash {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl RunningHash {
    pub fn update(&mut self, data: &[u8]) {
        match self {
            RunningHash::Sha1(h) => h.update(data),
            RunningHash::Sha256(h) => h.update(data),
        }
    }

    pub fn finalize(self) -> PackObjectId {
        match self {
            RunningHash::Sha1(h) => {
                let out = h.finalize();
                let mut buf = [0u8; 20];
                buf.copy_from_slice(&out);
                PackObjectId::Sha1(buf)
            }
            RunningHash::Sha256(h) => {
                let out = h.finalize();
                let mut buf = [0u8; 32];
                buf.copy_from_slice(&out);
                PackObjectId::Sha256(buf)
            }
        }
    }
}

/// Content identity of a Git object: SHA-1 (20 bytes) or SHA-256 (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PackObjectId {
    Sha1([u8; 20]),
    Sha256([u8; 32]),
}

impl PackObjectId {
    /// Raw digest bytes, 20 or 32 long depending on algorithm.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PackObjectId::Sha1(b) => b.as_slice(),
            PackObjectId::Sha256(b) => b.as_slice(),
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// The first byte of the identity, used for the index fanout table.
    pub fn fanout_byte(&self) -> u8 {
        self.as_bytes()[0]
    }
}

impl fmt::Display for PackObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_object_hash_matches_known_git_blob_id() {
        // `git hash-object` for a zero-byte blob is e69de29bb2d1d6434b8b29ae775ad8c2e48c5391
        let id = HashAlgorithm::Sha1.hash_object("blob", b"");
        assert_eq!(id.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn sha1_object_hash_hello_world() {
        // `printf 'hello\n' | git hash-object --stdin` = ce013625030ba8dba906f756967f9e9ca394464a
        let id = HashAlgorithm::Sha1.hash_object("blob", b"hello\n");
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn output_len_matches_algorithm() {
        assert_eq!(HashAlgorithm::Sha1.output_len(), 20);
        assert_eq!(HashAlgorithm::Sha256.output_len(), 32);
    }

    #[test]
    fn fanout_byte_is_first_digest_byte() {
        let id = HashAlgorithm::Sha1.hash_object("blob", b"hello\n");
        assert_eq!(id.fanout_byte(), id.as_bytes()[0]);
    }
}
