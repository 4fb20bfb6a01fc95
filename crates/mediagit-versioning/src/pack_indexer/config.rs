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

//! Construction-time configuration for [`crate::pack_indexer::PackIndexer`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::hash::HashAlgorithm;

/// Entry count ceiling unless overridden: 2^32 - 1.
pub fn default_max_entries() -> u64 {
    u32::MAX as u64
}

fn default_hash_algorithm() -> HashAlgorithm {
    HashAlgorithm::Sha1
}

fn default_file_mode() -> u32 {
    0o644
}

fn default_resolve_cache_capacity() -> u64 {
    4096
}

/// Configuration an indexer is constructed with.
///
/// Mirrors `StorageConfig`'s shape: a plain serde struct with
/// `#[serde(default = ...)]` fields and a matching [`Default`] impl, so
/// it can be embedded in a larger TOML configuration or constructed
/// directly in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackIndexerConfig {
    /// Directory the temporary pack and, on commit, the final
    /// `pack-<hex>.pack`/`.idx` pair are written into.
    pub destination_dir: PathBuf,

    /// Hash algorithm used for object and pack identities.
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: HashAlgorithm,

    /// Unix file mode applied to the emitted pack and index files.
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,

    /// Maximum number of entries held in the resolved-content cache
    /// used while walking delta chains.
    #[serde(default = "default_resolve_cache_capacity")]
    pub resolve_cache_capacity: u64,

    /// Upper bound on the number of entries a single pack may declare.
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl PackIndexerConfig {
    /// Configuration pointed at `destination_dir`, otherwise defaulted.
    pub fn new(destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
            ..Self::default_unrooted()
        }
    }

    fn default_unrooted() -> Self {
        Self {
            destination_dir: PathBuf::new(),
            hash_algorithm: default_hash_algorithm(),
            file_mode: default_file_mode(),
            resolve_cache_capacity: default_resolve_cache_capacity(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for PackIndexerConfig {
    fn default() -> Self {
        Self::default_unrooted()
    }
}
