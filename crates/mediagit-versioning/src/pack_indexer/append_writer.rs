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

//! Writes every received byte verbatim to a temporary pack file, ahead
//! of the stream parser consuming the same chunk, so a parse failure
//! still leaves the received bytes on disk.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{PackIndexError, Result};

/// Platform write-size safety margin; chunks larger than this are split
/// across multiple `write_all` calls.
const MAX_WRITE_CHUNK: usize = 1 << 20;

/// Owns the temporary pack file and the running byte count.
pub struct AppendWriter {
    file: File,
    path: PathBuf,
    bytes_written: u64,
}

impl AppendWriter {
    /// Create a fresh temporary pack file inside `destination_dir`,
    /// named with a random suffix so concurrent indexers in the same
    /// directory never collide.
    pub fn create(destination_dir: &Path, file_mode: u32) -> Result<Self> {
        fs::create_dir_all(destination_dir)?;

        let suffix: u64 = {
            use std::collections::hash_map::DefaultHasher;
            use std::hash::{Hash, Hasher};
            use std::time::{SystemTime, UNIX_EPOCH};
            let mut hasher = DefaultHasher::new();
            std::process::id().hash(&mut hasher);
            // SystemTime is monotonic-enough entropy for a filename
            // suffix; it is never interpreted as a timestamp.
            if let Ok(elapsed) = SystemTime::now().duration_since(UNIX_EPOCH) {
                elapsed.as_nanos().hash(&mut hasher);
            }
            hasher.finish()
        };
        let path = destination_dir.join(format!("incoming-{suffix:016x}.pack"));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = file.metadata()?.permissions();
            perms.set_mode(file_mode);
            fs::set_permissions(&path, perms)?;
        }

        debug!(path = %path.display(), "opened temporary pack file");

        Ok(Self {
            file,
            path,
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Write `chunk` verbatim, split into `MAX_WRITE_CHUNK`-sized calls.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        for piece in chunk.chunks(MAX_WRITE_CHUNK) {
            self.file.write_all(piece)?;
        }
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        Ok(())
    }

    /// Remove the temporary pack file. Used by `free`/`Drop` when a
    /// commit never succeeded, and by tests.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PackIndexError::Io(e)),
        }
    }
}
