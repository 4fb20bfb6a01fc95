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

//! Git-compatible streaming packfile indexer.
//!
//! Feed an incoming packfile byte stream through [`PackIndexer::append`]
//! in chunks of any size, then call [`PackIndexer::commit`] once the
//! stream closes to resolve every delta and emit a `pack-<hex>.pack` /
//! `pack-<hex>.idx` pair that's bit-for-bit compatible with Git's own
//! v2 pack and index formats.
//!
//! This is a separate object format from this crate's own
//! [`crate::pack`] module: that one is MediaGit's internal chunked-media
//! pack, used between MediaGit's own client and server. This module
//! exists for interoperating with real Git remotes and tooling.

mod append_writer;
mod config;
mod entry;
mod error;
mod hash;
mod index_writer;
mod progress;
mod resolver;
mod stream_parser;
mod varint;

pub use config::PackIndexerConfig;
pub use entry::PackObjectKind;
pub use error::{PackIndexError, Result};
pub use hash::{HashAlgorithm, PackObjectId};
pub use progress::{ProgressObserver, ProgressSnapshot};

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use tracing::debug;

use append_writer::AppendWriter;
use entry::{DeltaBase, Entry, ObjectTable};
use index_writer::IndexWriter;
use progress::ProgressCounters;
use resolver::DeltaResolver;
use stream_parser::{ParseEvent, StreamParser};

/// An external object store a REF_DELTA base may live in, outside the
/// pack currently being indexed. The default lookup always misses, so
/// a caller with no object store still gets correct resolution for the
/// common case (every REF_DELTA base present earlier in the same pack).
pub trait BaseObjectSource: Send + Sync {
    fn lookup(&self, _id: &PackObjectId) -> Option<(PackObjectKind, Vec<u8>)> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexerState {
    Fresh,
    Started,
    Receiving,
    Complete,
    Committed,
    Failed,
}

impl IndexerState {
    fn label(self) -> &'static str {
        match self {
            IndexerState::Fresh => "fresh",
            IndexerState::Started => "started",
            IndexerState::Receiving => "receiving",
            IndexerState::Complete => "complete",
            IndexerState::Committed => "committed",
            IndexerState::Failed => "failed",
        }
    }
}

/// Fields captured at `*_start` and only known in full once the matching
/// `*_complete` event arrives. The parser only ever has one entry open
/// at a time, so a single slot is enough.
enum PendingEntry {
    Object {
        position: u64,
        header_size: u64,
        kind: PackObjectKind,
        declared_size: u64,
    },
    Delta {
        position: u64,
        header_size: u64,
        base: DeltaBase,
        declared_size: u64,
    },
}

/// Drives a single pack through its lifecycle: *fresh → started →
/// receiving → complete → committed | failed*.
pub struct PackIndexer {
    config: PackIndexerConfig,
    base_source: Option<Arc<dyn BaseObjectSource>>,
    progress_observer: Option<Box<dyn ProgressObserver>>,
    progress: ProgressCounters,
    state: IndexerState,
    writer: Option<AppendWriter>,
    parser: StreamParser,
    table: ObjectTable,
    pending_entry: Option<PendingEntry>,
    trailer_hash: Option<PackObjectId>,
}

impl PackIndexer {
    pub fn new(
        config: PackIndexerConfig,
        base_source: Option<Arc<dyn BaseObjectSource>>,
        progress_observer: Option<Box<dyn ProgressObserver>>,
    ) -> Self {
        let parser = StreamParser::new(config.hash_algorithm);
        Self {
            config,
            base_source,
            progress_observer,
            progress: ProgressCounters::new(),
            state: IndexerState::Fresh,
            writer: None,
            parser,
            table: ObjectTable::new(),
            pending_entry: None,
            trailer_hash: None,
        }
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    /// Feed the next chunk of the pack stream. A zero-length chunk is an
    /// idempotent no-op. The temporary pack file is created lazily on
    /// the first call.
    pub fn append(&mut self, chunk: &[u8]) -> Result<()> {
        match self.state {
            IndexerState::Fresh => {
                let writer = AppendWriter::create(&self.config.destination_dir, self.config.file_mode)?;
                self.writer = Some(writer);
                self.state = IndexerState::Started;
            }
            IndexerState::Started | IndexerState::Receiving => {}
            other => return Err(PackIndexError::state(other.label(), "append")),
        }

        if chunk.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.write_and_parse(chunk) {
            self.state = IndexerState::Failed;
            return Err(e);
        }

        self.state = if self.parser.is_done() {
            IndexerState::Complete
        } else {
            IndexerState::Receiving
        };

        self.check_cancellation()
    }

    /// The append writer runs as a pass separate from the parser (over
    /// the same chunk) so a parse failure still leaves the received
    /// bytes on disk.
    fn write_and_parse(&mut self, chunk: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .expect("append writer is created before write_and_parse runs");
        writer.write_chunk(chunk)?;
        self.progress.add_received_bytes(chunk.len() as u64);

        let events = self.parser.feed(chunk)?;
        for event in events {
            if let Some(trailer_hash) = record_event(
                event,
                &mut self.table,
                &mut self.pending_entry,
                &self.progress,
                self.config.max_entries,
            )? {
                self.trailer_hash = Some(trailer_hash);
            }
        }
        Ok(())
    }

    fn check_cancellation(&mut self) -> Result<()> {
        if let Some(observer) = self.progress_observer.as_mut() {
            let snapshot = self.progress.snapshot();
            if observer.on_progress(&snapshot) != 0 {
                self.state = IndexerState::Failed;
                return Err(PackIndexError::Cancelled);
            }
        }
        Ok(())
    }

    /// Resolve every delta and emit `pack-<hex>.pack` / `pack-<hex>.idx`
    /// into the configured destination directory, returning the hex
    /// identity shared by both filenames.
    pub fn commit(mut self) -> Result<String> {
        match self.state {
            IndexerState::Complete => {}
            other => return Err(PackIndexError::state(other.label(), "commit")),
        }

        let writer = self
            .writer
            .take()
            .expect("append writer exists once state reaches Complete");
        writer.sync()?;
        let temp_path = writer.path().to_path_buf();
        drop(writer);

        let file = fs::File::open(&temp_path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        drop(file);

        let hash_algorithm = self.config.hash_algorithm;
        let file_mode = self.config.file_mode;
        let destination_dir = self.config.destination_dir.clone();

        let mut table = std::mem::take(&mut self.table);
        let mut progress_observer = self.progress_observer.take();
        let base_source = self.base_source.take();
        let trailer_hash = self
            .trailer_hash
            .take()
            .expect("pack trailer hash is recorded once parsing reaches the trailer");

        let progress_ref = &self.progress;
        let mut cancel = move || -> Result<()> {
            if let Some(observer) = progress_observer.as_mut() {
                let snapshot = progress_ref.snapshot();
                if observer.on_progress(&snapshot) != 0 {
                    return Err(PackIndexError::Cancelled);
                }
            }
            Ok(())
        };

        let resolver = DeltaResolver::new(self.config.resolve_cache_capacity);
        if let Err(e) = resolver.resolve(
            &mut table,
            &mmap,
            hash_algorithm,
            base_source.as_deref(),
            &self.progress,
            &mut cancel,
        ) {
            self.state = IndexerState::Failed;
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        let hex = trailer_hash.to_hex();
        let pack_path = destination_dir.join(format!("pack-{hex}.pack"));
        let idx_path = destination_dir.join(format!("pack-{hex}.idx"));

        if let Err(e) = fs::rename(&temp_path, &pack_path) {
            self.state = IndexerState::Failed;
            return Err(PackIndexError::Io(e));
        }

        if let Err(e) = IndexWriter::write(&idx_path, &table, hash_algorithm, trailer_hash, file_mode) {
            let _ = fs::remove_file(&pack_path);
            self.state = IndexerState::Failed;
            return Err(e);
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&pack_path)?.permissions();
            perms.set_mode(file_mode);
            fs::set_permissions(&pack_path, perms)?;
        }

        self.state = IndexerState::Committed;
        debug!(hex = %hex, entries = table.len(), "committed pack and index");

        Ok(hex)
    }

    /// Release all resources now, rather than waiting for `Drop`.
    pub fn free(self) {}

    /// Re-derive the identity-to-offset mapping from a second,
    /// independent scan of `pack_path` and assert it agrees with
    /// `idx_path`. Does not mutate either file.
    pub fn verify(pack_path: &Path, idx_path: &Path, config: &PackIndexerConfig) -> Result<()> {
        let idx_bytes = fs::read(idx_path)?;
        let from_index = read_idx_identity_offsets(&idx_bytes, config.hash_algorithm)?;

        let pack_bytes = fs::read(pack_path)?;
        let mut parser = StreamParser::new(config.hash_algorithm);
        let mut table = ObjectTable::new();
        let mut pending_entry = None;
        let progress = ProgressCounters::new();
        let mut trailer_hash = None;

        let events = parser.feed(&pack_bytes)?;
        for event in events {
            if let Some(hash) = record_event(
                event,
                &mut table,
                &mut pending_entry,
                &progress,
                config.max_entries,
            )? {
                trailer_hash = Some(hash);
            }
        }
        if !parser.is_done() || trailer_hash.is_none() {
            return Err(PackIndexError::parse(
                pack_bytes.len() as u64,
                "pack ended before its trailer during verification re-scan",
            ));
        }

        let resolver = DeltaResolver::new(config.resolve_cache_capacity);
        let mut no_cancel = || -> Result<()> { Ok(()) };
        resolver.resolve(
            &mut table,
            &pack_bytes,
            config.hash_algorithm,
            None,
            &progress,
            &mut no_cancel,
        )?;

        let mut from_rescan = HashMap::with_capacity(table.len());
        for (_, entry) in table.iter() {
            let id = entry
                .id()
                .expect("every entry has an identity once resolution succeeds");
            from_rescan.insert(id, entry.position());
        }

        if from_rescan != from_index {
            return Err(PackIndexError::delta(
                "index identity-to-offset mapping disagrees with an independent pack re-scan",
            ));
        }

        Ok(())
    }
}

impl Drop for PackIndexer {
    fn drop(&mut self) {
        if self.state != IndexerState::Committed {
            if let Some(writer) = self.writer.take() {
                let _ = writer.remove();
            }
        }
    }
}

/// Fold one parser event into the entry table and progress counters.
/// Returns the pack trailer hash once `PackfileComplete` arrives.
fn record_event(
    event: ParseEvent,
    table: &mut ObjectTable,
    pending_entry: &mut Option<PendingEntry>,
    progress: &ProgressCounters,
    max_entries: u64,
) -> Result<Option<PackObjectId>> {
    match event {
        ParseEvent::PackfileHeader { entry_count, .. } => {
            if entry_count as u64 > max_entries {
                return Err(PackIndexError::limit(format!(
                    "pack declares {entry_count} entries, exceeding the configured maximum of {max_entries}"
                )));
            }
            Ok(None)
        }
        ParseEvent::ObjectStart {
            position,
            header_size,
            kind,
            size,
        } => {
            *pending_entry = Some(PendingEntry::Object {
                position,
                header_size,
                kind,
                declared_size: size,
            });
            Ok(None)
        }
        ParseEvent::ObjectComplete { compressed_crc, id, .. } => {
            let pending = pending_entry
                .take()
                .expect("object_complete always follows object_start");
            let PendingEntry::Object {
                position,
                header_size,
                kind,
                declared_size,
            } = pending
            else {
                unreachable!("object_complete must follow an Object pending entry")
            };
            table.push(Entry::Object {
                position,
                header_size,
                kind,
                declared_size,
                crc32: compressed_crc,
                id,
            });
            progress.inc_received_objects();
            progress.inc_indexed_objects();
            Ok(None)
        }
        ParseEvent::DeltaStart {
            position,
            header_size,
            size,
            base,
        } => {
            *pending_entry = Some(PendingEntry::Delta {
                position,
                header_size,
                base,
                declared_size: size,
            });
            Ok(None)
        }
        ParseEvent::DeltaComplete { compressed_crc, .. } => {
            let pending = pending_entry
                .take()
                .expect("delta_complete always follows delta_start");
            let PendingEntry::Delta {
                position,
                header_size,
                base,
                declared_size,
            } = pending
            else {
                unreachable!("delta_complete must follow a Delta pending entry")
            };
            table.push(Entry::Delta {
                position,
                header_size,
                declared_size,
                crc32: compressed_crc,
                base,
                id: None,
                final_kind: None,
            });
            progress.inc_received_objects();
            Ok(None)
        }
        ParseEvent::PackfileComplete { trailer_hash } => {
            let deltas = table.delta_handles().len() as u64;
            let objects = table.len() as u64 - deltas;
            progress.set_totals(objects, deltas);
            Ok(Some(trailer_hash))
        }
    }
}

const IDX_MAGIC: [u8; 4] = [0xff, b't', b'O', b'c'];

/// Parse enough of a v2 `.idx` file to recover its identity→offset
/// mapping, resolving long-offset pointers along the way. Used only by
/// [`PackIndexer::verify`].
fn read_idx_identity_offsets(
    bytes: &[u8],
    hash_algorithm: HashAlgorithm,
) -> Result<HashMap<PackObjectId, u64>> {
    if bytes.len() < 8 || bytes[0..4] != IDX_MAGIC {
        return Err(PackIndexError::parse(0, "bad index magic"));
    }
    let version = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != 2 {
        return Err(PackIndexError::parse(0, format!("unsupported index version {version}")));
    }

    let fanout_start = 8;
    let fanout_end = fanout_start + 256 * 4;
    if bytes.len() < fanout_end {
        return Err(PackIndexError::parse(0, "index truncated in fanout table"));
    }
    let count = u32::from_be_bytes([
        bytes[fanout_end - 4],
        bytes[fanout_end - 3],
        bytes[fanout_end - 2],
        bytes[fanout_end - 1],
    ]) as usize;

    let hash_len = hash_algorithm.output_len();
    let identities_start = fanout_end;
    let identities_end = identities_start + count * hash_len;
    let crc_end = identities_end + count * 4;
    let offsets_end = crc_end + count * 4;
    if bytes.len() < offsets_end {
        return Err(PackIndexError::parse(0, "index truncated before offset section"));
    }

    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let start = identities_start + i * hash_len;
        let id = hash_algorithm
            .id_from_bytes(&bytes[start..start + hash_len])
            .ok_or_else(|| PackIndexError::parse(0, "malformed identity in index"))?;
        ids.push(id);
    }

    let mut offset_words = Vec::with_capacity(count);
    let mut long_count = 0usize;
    for i in 0..count {
        let start = crc_end + i * 4;
        let word = u32::from_be_bytes([
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
        ]);
        if word & 0x8000_0000 != 0 {
            long_count += 1;
        }
        offset_words.push(word);
    }

    let long_offsets_start = offsets_end;
    let long_offsets_end = long_offsets_start + long_count * 8;
    if bytes.len() < long_offsets_end {
        return Err(PackIndexError::parse(0, "index truncated in long-offset section"));
    }
    let mut long_offsets = Vec::with_capacity(long_count);
    for i in 0..long_count {
        let start = long_offsets_start + i * 8;
        long_offsets.push(u64::from_be_bytes([
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
            bytes[start + 4],
            bytes[start + 5],
            bytes[start + 6],
            bytes[start + 7],
        ]));
    }

    let mut map = HashMap::with_capacity(count);
    for (i, &word) in offset_words.iter().enumerate() {
        let position = if word & 0x8000_0000 != 0 {
            let long_index = (word & 0x7fff_ffff) as usize;
            *long_offsets
                .get(long_index)
                .ok_or_else(|| PackIndexError::parse(0, "long offset index out of range"))?
        } else {
            word as u64
        };
        map.insert(ids[i], position);
    }

    Ok(map)
}
