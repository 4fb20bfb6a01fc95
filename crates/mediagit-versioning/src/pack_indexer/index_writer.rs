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

//! Emits the canonical Git v2 `.idx` layout in a single forward pass,
//! hashing bytes as they're written so the index trailer needs no
//! second read of the file just produced.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::entry::{Entry, ObjectTable};
use super::error::Result;
use super::hash::{HashAlgorithm, PackObjectId, RunningHash};

const IDX_MAGIC: [u8; 4] = [0xff, b't', b'O', b'c'];
const IDX_VERSION: u32 = 2;

/// Offsets at or above this value can't fit in the 31 bits the offset
/// section allows; they're written to the long-offset section instead.
/// Must be exactly 2^31 (spec.md §9: a larger constant disagrees with
/// every real Git index reader).
const LONG_OFFSET_THRESHOLD: u64 = 1 << 31;

pub struct IndexWriter;

impl IndexWriter {
    /// Write `path` from `table`'s entries (which must all have an
    /// identity by now — the resolver runs first) and return the index
    /// trailer hash.
    pub fn write(
        path: &Path,
        table: &ObjectTable,
        hash_algorithm: HashAlgorithm,
        pack_trailer: PackObjectId,
        file_mode: u32,
    ) -> Result<PackObjectId> {
        let mut entries: Vec<&Entry> = table.iter().map(|(_, entry)| entry).collect();
        entries.sort_by(|a, b| {
            a.id()
                .expect("every entry has an identity by index-write time")
                .as_bytes()
                .cmp(
                    b.id()
                        .expect("every entry has an identity by index-write time")
                        .as_bytes(),
                )
        });

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        let mut writer = HashingWriter::new(file, hash_algorithm);

        writer.write_all(&IDX_MAGIC)?;
        writer.write_all(&IDX_VERSION.to_be_bytes())?;

        write_fanout(&mut writer, &entries)?;

        for entry in &entries {
            let id = entry
                .id()
                .expect("every entry has an identity by index-write time");
            writer.write_all(id.as_bytes())?;
        }

        for entry in &entries {
            writer.write_all(&entry.crc32().to_be_bytes())?;
        }

        let mut long_offsets = Vec::new();
        for entry in &entries {
            let position = entry.position();
            if position < LONG_OFFSET_THRESHOLD {
                writer.write_all(&(position as u32).to_be_bytes())?;
            } else {
                let long_index = long_offsets.len() as u32;
                writer.write_all(&(0x8000_0000 | long_index).to_be_bytes())?;
                long_offsets.push(position);
            }
        }

        for offset in &long_offsets {
            writer.write_all(&offset.to_be_bytes())?;
        }

        writer.write_all(pack_trailer.as_bytes())?;

        let index_hash = writer.finalize();
        writer.write_all(index_hash.as_bytes())?;
        writer.flush()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(file_mode);
            fs::set_permissions(path, perms)?;
        }

        debug!(
            path = %path.display(),
            entries = entries.len(),
            long_offsets = long_offsets.len(),
            "wrote pack index"
        );

        Ok(index_hash)
    }
}

fn write_fanout(writer: &mut impl Write, entries: &[&Entry]) -> Result<()> {
    let mut counts = [0u32; 256];
    for entry in entries {
        let byte = entry
            .id()
            .expect("every entry has an identity by index-write time")
            .fanout_byte() as usize;
        counts[byte] += 1;
    }

    let mut running = 0u32;
    for count in counts {
        running += count;
        writer.write_all(&running.to_be_bytes())?;
    }
    Ok(())
}

struct HashingWriter<W: Write> {
    inner: W,
    hash_algorithm: HashAlgorithm,
    hash: RunningHash,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W, hash_algorithm: HashAlgorithm) -> Self {
        Self {
            inner,
            hash_algorithm,
            hash: hash_algorithm.running_hash(),
        }
    }

    /// Consume the running hash accumulated so far, resetting it. Only
    /// meaningful once, right before writing the trailer.
    fn finalize(&mut self) -> PackObjectId {
        let taken = std::mem::replace(&mut self.hash, self.hash_algorithm.running_hash());
        taken.finalize()
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hash.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
