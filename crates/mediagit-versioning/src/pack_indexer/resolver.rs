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

//! Resolves every delta entry into final content and identity, once
//! the stream has closed and the pack is available read-only.
//!
//! Runs the single-pass algorithm of spec.md §4.4: OFS_DELTA entries
//! are sorted by base position and resolved as a cursor walks the
//! object table in position order (bases always precede dependents);
//! REF_DELTA entries resolve in a second pass against whatever has
//! an identity by then, falling back to the external object store.

use std::collections::HashMap;
use std::sync::Arc;

use flate2::{Decompress, FlushDecompress, Status};
use moka::sync::Cache;
use tracing::trace;

use super::entry::{DeltaBase, Entry, EntryHandle, ObjectTable, PackObjectKind};
use super::error::{PackIndexError, Result};
use super::hash::{HashAlgorithm, PackObjectId};
use super::progress::ProgressCounters;
use super::varint::decode_delta_size;
use super::BaseObjectSource;

/// Resolved content keyed by pack position, so repeated materialisation
/// of a popular base in a deep delta chain doesn't redo the inflate +
/// instruction-apply work every time. Purely a performance optimisation:
/// correctness does not depend on cache hits.
pub struct DeltaResolver {
    cache: Cache<u64, (PackObjectKind, Arc<[u8]>)>,
}

impl DeltaResolver {
    pub fn new(cache_capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(cache_capacity).build(),
        }
    }

    /// Resolve every delta entry in `table` against the bytes in `pack`
    /// (the memory-mapped, read-only view of the just-completed pack).
    pub fn resolve(
        &self,
        table: &mut ObjectTable,
        pack: &[u8],
        hash_algorithm: HashAlgorithm,
        base_source: Option<&dyn BaseObjectSource>,
        progress: &ProgressCounters,
        cancel: &mut dyn FnMut() -> Result<()>,
    ) -> Result<()> {
        let mut id_index: HashMap<PackObjectId, EntryHandle> = HashMap::new();
        for (handle, entry) in table.iter() {
            if let Some(id) = entry.id() {
                id_index.insert(id, handle);
            }
        }

        let mut ofs_deltas = Vec::new();
        let mut ref_deltas = Vec::new();
        for &handle in table.delta_handles() {
            match table.get(handle).base() {
                Some(DeltaBase::Offset(_)) => ofs_deltas.push(handle),
                Some(DeltaBase::Reference(_)) => ref_deltas.push(handle),
                None => unreachable!("delta_handles only ever lists delta entries"),
            }
        }
        ofs_deltas.sort_by_key(|&h| base_position_of(table.get(h)));

        let order: Vec<EntryHandle> = table.iter().map(|(h, _)| h).collect();
        let mut cursor = 0usize;

        for handle in order {
            let position = table.get(handle).position();
            while cursor < ofs_deltas.len()
                && base_position_of(table.get(ofs_deltas[cursor])) == position
            {
                let delta_handle = ofs_deltas[cursor];
                cancel()?;
                self.resolve_one(delta_handle, table, pack, hash_algorithm, &mut id_index)?;
                progress.inc_indexed_deltas();
                cursor += 1;
            }
        }

        if cursor != ofs_deltas.len() {
            return Err(PackIndexError::delta(
                "OFS_DELTA entry whose base position never matched an object in this pack",
            ));
        }

        for delta_handle in ref_deltas {
            cancel()?;
            self.resolve_ref(delta_handle, table, pack, hash_algorithm, &mut id_index, base_source)?;
            progress.inc_indexed_deltas();
        }

        Ok(())
    }

    fn resolve_one(
        &self,
        handle: EntryHandle,
        table: &mut ObjectTable,
        pack: &[u8],
        hash_algorithm: HashAlgorithm,
        id_index: &mut HashMap<PackObjectId, EntryHandle>,
    ) -> Result<()> {
        let (kind, content) = self.materialize(handle, table, pack, hash_algorithm, id_index, None)?;
        let id = hash_algorithm.hash_object(kind.as_str(), &content);
        table.get_mut(handle).set_resolved(id, kind);
        id_index.insert(id, handle);
        Ok(())
    }

    fn resolve_ref(
        &self,
        handle: EntryHandle,
        table: &mut ObjectTable,
        pack: &[u8],
        hash_algorithm: HashAlgorithm,
        id_index: &mut HashMap<PackObjectId, EntryHandle>,
        base_source: Option<&dyn BaseObjectSource>,
    ) -> Result<()> {
        let (kind, content) =
            self.materialize(handle, table, pack, hash_algorithm, id_index, base_source)?;
        let id = hash_algorithm.hash_object(kind.as_str(), &content);
        table.get_mut(handle).set_resolved(id, kind);
        id_index.insert(id, handle);
        Ok(())
    }

    /// Reconstruct an entry's content and kind, recursing into its base
    /// if it is itself a delta (spec.md §4.4 step 3a).
    fn materialize(
        &self,
        handle: EntryHandle,
        table: &ObjectTable,
        pack: &[u8],
        hash_algorithm: HashAlgorithm,
        id_index: &HashMap<PackObjectId, EntryHandle>,
        base_source: Option<&dyn BaseObjectSource>,
    ) -> Result<(PackObjectKind, Arc<[u8]>)> {
        let position = table.get(handle).position();
        if let Some(cached) = self.cache.get(&position) {
            return Ok(cached);
        }

        let entry = table.get(handle);
        let start = (entry.position() + entry.header_size()) as usize;
        let declared_size = entry.declared_size();

        let result = match entry {
            Entry::Object { kind, .. } => {
                let content = decompress_at(pack, start, declared_size)?;
                (*kind, Arc::<[u8]>::from(content))
            }
            Entry::Delta { base, .. } => {
                let base = *base;
                let delta_payload = decompress_at(pack, start, declared_size)?;
                let (base_kind, base_content) = match base {
                    DeltaBase::Offset(base_position) => {
                        let base_handle = table.handle_at_position(base_position).ok_or_else(|| {
                            PackIndexError::delta(format!(
                                "OFS_DELTA base at position {base_position} not found"
                            ))
                        })?;
                        self.materialize(base_handle, table, pack, hash_algorithm, id_index, base_source)?
                    }
                    DeltaBase::Reference(base_id) => {
                        if let Some(&base_handle) = id_index.get(&base_id) {
                            self.materialize(
                                base_handle,
                                table,
                                pack,
                                hash_algorithm,
                                id_index,
                                base_source,
                            )?
                        } else if let Some(source) = base_source {
                            let found = source.lookup(&base_id).ok_or_else(|| {
                                PackIndexError::delta(format!(
                                    "REF_DELTA base {base_id} not found in pack or object store"
                                ))
                            })?;
                            (found.0, Arc::<[u8]>::from(found.1))
                        } else {
                            return Err(PackIndexError::delta(format!(
                                "REF_DELTA base {base_id} not found"
                            )));
                        }
                    }
                };
                let content = apply_delta(&base_content, &delta_payload)?;
                (base_kind, Arc::<[u8]>::from(content))
            }
        };

        self.cache.insert(position, result.clone());
        Ok(result)
    }
}

fn base_position_of(entry: &Entry) -> u64 {
    match entry.base() {
        Some(DeltaBase::Offset(position)) => position,
        _ => u64::MAX,
    }
}

/// Inflate `declared_size` bytes starting at `start` in `pack`.
fn decompress_at(pack: &[u8], start: usize, declared_size: u64) -> Result<Vec<u8>> {
    let mut decompressor = Decompress::new(true);
    let mut output = Vec::with_capacity(declared_size as usize);
    let mut cursor = start;

    loop {
        let input = pack.get(cursor..).ok_or_else(|| {
            PackIndexError::delta("entry start position is past the end of the pack")
        })?;
        if input.is_empty() {
            return Err(PackIndexError::delta("pack ended mid-object during resolution"));
        }

        let last_in = decompressor.total_in();
        let status = decompressor
            .decompress_vec(input, &mut output, FlushDecompress::None)
            .map_err(|e| PackIndexError::delta(format!("zlib decompression error: {e}")))?;
        cursor += (decompressor.total_in() - last_in) as usize;

        match status {
            Status::StreamEnd => {
                if decompressor.total_out() != declared_size {
                    return Err(PackIndexError::delta(format!(
                        "decompressed size {} does not match declared size {}",
                        decompressor.total_out(),
                        declared_size
                    )));
                }
                return Ok(output);
            }
            Status::Ok => continue,
            Status::BufError => return Err(PackIndexError::delta("zlib buffer error")),
        }
    }
}

/// Apply a delta instruction stream (already inflated) to `base`,
/// per spec.md §4.1/§4.4(b).
fn apply_delta(base: &[u8], delta: &[u8]) -> Result<Vec<u8>> {
    let mut pos = 0usize;
    let base_size = decode_delta_size(delta, &mut pos)?;
    let result_size = decode_delta_size(delta, &mut pos)?;

    if base_size as usize != base.len() {
        return Err(PackIndexError::delta(format!(
            "delta base size {base_size} does not match actual base length {}",
            base.len()
        )));
    }

    let mut output = Vec::with_capacity(result_size as usize);

    while pos < delta.len() {
        let flag = delta[pos];
        pos += 1;

        if flag & 0x80 != 0 {
            let mut offset: u64 = 0;
            let mut length: u64 = 0;
            for bit in 0..4 {
                if flag & (1 << bit) != 0 {
                    let byte = *delta
                        .get(pos)
                        .ok_or_else(|| PackIndexError::delta("copy instruction truncated"))?;
                    offset |= (byte as u64) << (8 * bit);
                    pos += 1;
                }
            }
            for bit in 0..3 {
                if flag & (1 << (4 + bit)) != 0 {
                    let byte = *delta
                        .get(pos)
                        .ok_or_else(|| PackIndexError::delta("copy instruction truncated"))?;
                    length |= (byte as u64) << (8 * bit);
                    pos += 1;
                }
            }
            if length == 0 {
                length = 0x10000;
            }

            let start = offset as usize;
            let end = start
                .checked_add(length as usize)
                .ok_or_else(|| PackIndexError::delta("copy instruction length overflow"))?;
            let slice = base
                .get(start..end)
                .ok_or_else(|| PackIndexError::delta("copy instruction reads past base object"))?;
            output.extend_from_slice(slice);
        } else if flag != 0 {
            let length = flag as usize;
            let slice = delta
                .get(pos..pos + length)
                .ok_or_else(|| PackIndexError::delta("insert instruction reads past delta buffer"))?;
            output.extend_from_slice(slice);
            pos += length;
        } else {
            return Err(PackIndexError::delta("reserved delta opcode 0x00"));
        }
    }

    if output.len() as u64 != result_size {
        return Err(PackIndexError::delta(format!(
            "delta result size {result_size} does not match produced length {}",
            output.len()
        )));
    }

    trace!(base_size, result_size, "applied delta");
    Ok(output)
}
