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

//! Zlib compression implementation for Git compatibility
//!
//! Git uses zlib (deflate) compression for all objects in the object database.
//! This implementation provides Git-compatible compression and decompression.

use crate::error::{CompressionError, CompressionResult};
use crate::{CompressionLevel, Compressor};
use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use std::fmt;
use std::io::Read;

/// Zlib compressor implementation
///
/// Uses the zlib (deflate) compression algorithm for Git compatibility.
/// Supports configurable compression levels.
#[derive(Clone)]
pub struct ZlibCompressor {
    level: CompressionLevel,
}

impl ZlibCompressor {
    /// Create a new Zlib compressor with the given compression level
    pub fn new(level: CompressionLevel) -> Self {
        ZlibCompressor { level }
    }

    /// Create a Zlib compressor with fast compression
    pub fn fast() -> Self {
        ZlibCompressor::new(CompressionLevel::Fast)
    }

    /// Create a Zlib compressor with default compression (Git default: level 6)
    pub fn default_level() -> Self {
        ZlibCompressor::new(CompressionLevel::Default)
    }

    /// Create a Zlib compressor with best compression
    pub fn best() -> Self {
        ZlibCompressor::new(CompressionLevel::Best)
    }

    /// Get the flate2 compression level
    fn get_compression(&self) -> Compression {
        match self.level {
            CompressionLevel::Fast => Compression::fast(),      // Level 1
            CompressionLevel::Default => Compression::new(6),    // Git default
            CompressionLevel::Best => Compression::best(),       // Level 9
        }
    }
}

impl fmt::Debug for ZlibCompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZlibCompressor")
            .field("level", &self.level)
            .finish()
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let mut encoder = ZlibEncoder::new(data, self.get_compression());
        let mut compressed = Vec::new();

        encoder
            .read_to_end(&mut compressed)
            .map_err(|e| CompressionError::zstd_error(format!("zlib compression failed: {}", e)))?;

        Ok(compressed)
    }

    fn decompress(&self, data: &[u8]) -> CompressionResult<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        // Check if this looks like zlib compressed data
        // Zlib header: CMF (0x78) + FLG where (CMF * 256 + FLG) % 31 == 0
        // Valid headers: 0x789C (default), 0x78DA (best), 0x7801 (no compression)
        let is_zlib = data.len() >= 2 && data[0] == 0x78 && {
            let cmf = data[0] as u16;
            let flg = data[1] as u16;
            (cmf * 256 + flg).is_multiple_of(31)
        };

        if is_zlib {
            let mut decoder = ZlibDecoder::new(data);
            let mut decompressed = Vec::new();

            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| {
                    CompressionError::decompression_failed(format!("zlib decompression failed: {}", e))
                })?;

            Ok(decompressed)
        } else {
            // Data is not zlib compressed, return as-is
            // This handles backward compatibility with uncompressed data
            Ok(data.to_vec())
        }
    }
}
