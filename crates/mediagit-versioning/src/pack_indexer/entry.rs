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

//! The object table: a single growable vector holding one `Entry` per
//! pack object (plain or delta), addressed by a stable `EntryHandle`.
//!
//! `PositionIndex` and `DeltaTable` are non-owning views over that
//! vector, keyed by pack offset or listing delta handles respectively.
//! Nothing outside this module ever holds an `Entry` directly; callers
//! pass handles around and look entries up through the table.

use std::collections::HashMap;

use super::hash::PackObjectId;

/// One of the four base object kinds a non-delta entry can carry.
/// Distinct from [`crate::ObjectType`], which only models MediaGit's
/// own three object kinds and has no tag variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl PackObjectKind {
    /// Map a pack header type id (1, 2, 3, 4) to a kind.
    pub fn from_type_id(type_id: u8) -> Option<Self> {
        match type_id {
            1 => Some(PackObjectKind::Commit),
            2 => Some(PackObjectKind::Tree),
            3 => Some(PackObjectKind::Blob),
            4 => Some(PackObjectKind::Tag),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PackObjectKind::Commit => "commit",
            PackObjectKind::Tree => "tree",
            PackObjectKind::Blob => "blob",
            PackObjectKind::Tag => "tag",
        }
    }
}

/// How a delta entry names its base object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaBase {
    /// OFS_DELTA: base is `base_offset` bytes before this entry's own
    /// offset within the same pack.
    Offset(u64),
    /// REF_DELTA: base is identified by object id, potentially outside
    /// this pack entirely.
    Reference(PackObjectId),
}

/// One object-table slot: either a plain object or an unresolved delta.
/// Both variants share position/length/crc fields needed by the index
/// writer regardless of whether the entry ever gets resolved.
#[derive(Debug, Clone)]
pub enum Entry {
    Object {
        /// Byte offset of this entry's header within the pack.
        position: u64,
        /// Bytes between `position` and the start of the compressed payload.
        header_size: u64,
        kind: PackObjectKind,
        /// Inflated content size as declared by the pack header.
        declared_size: u64,
        /// CRC32 over the entry's header + compressed bytes.
        crc32: u32,
        /// Content identity, known as soon as the entry is parsed.
        id: PackObjectId,
    },
    Delta {
        position: u64,
        header_size: u64,
        declared_size: u64,
        crc32: u32,
        base: DeltaBase,
        /// Content identity, only known after resolution.
        id: Option<PackObjectId>,
        /// Type of the reconstructed object, inherited from the
        /// (recursively resolved) base; only known after resolution.
        final_kind: Option<PackObjectKind>,
    },
}

impl Entry {
    pub fn position(&self) -> u64 {
        match self {
            Entry::Object { position, .. } => *position,
            Entry::Delta { position, .. } => *position,
        }
    }

    pub fn header_size(&self) -> u64 {
        match self {
            Entry::Object { header_size, .. } => *header_size,
            Entry::Delta { header_size, .. } => *header_size,
        }
    }

    pub fn crc32(&self) -> u32 {
        match self {
            Entry::Object { crc32, .. } => *crc32,
            Entry::Delta { crc32, .. } => *crc32,
        }
    }

    pub fn declared_size(&self) -> u64 {
        match self {
            Entry::Object { declared_size, .. } => *declared_size,
            Entry::Delta { declared_size, .. } => *declared_size,
        }
    }

    /// Content identity, if known. Plain objects always know it;
    /// deltas only after resolution assigns one.
    pub fn id(&self) -> Option<PackObjectId> {
        match self {
            Entry::Object { id, .. } => Some(*id),
            Entry::Delta { id, .. } => *id,
        }
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, Entry::Delta { .. })
    }

    /// The base this delta resolves against, if this is a delta entry.
    pub fn base(&self) -> Option<DeltaBase> {
        match self {
            Entry::Object { .. } => None,
            Entry::Delta { base, .. } => Some(*base),
        }
    }

    /// Object kind: always known for plain objects, known for deltas
    /// only once resolution has populated `final_kind`.
    pub fn kind(&self) -> Option<PackObjectKind> {
        match self {
            Entry::Object { kind, .. } => Some(*kind),
            Entry::Delta { final_kind, .. } => *final_kind,
        }
    }

    pub(crate) fn set_resolved(&mut self, id: PackObjectId, kind: PackObjectKind) {
        if let Entry::Delta {
            id: id_field,
            final_kind,
            ..
        } = self
        {
            *id_field = Some(id);
            *final_kind = Some(kind);
        }
    }
}

/// A stable handle into the object table. Indices are never reused or
/// reordered within one indexer's lifetime, so a handle taken during
/// parsing stays valid through resolution and index writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryHandle(u32);

impl EntryHandle {
    fn new(index: usize) -> Self {
        EntryHandle(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owning storage for every entry seen so far, plus the two non-owning
/// views (`PositionIndex`, `DeltaTable`) kept in step with it.
#[derive(Debug, Default)]
pub struct ObjectTable {
    entries: Vec<Entry>,
    by_position: HashMap<u64, EntryHandle>,
    delta_handles: Vec<EntryHandle>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a new entry and return its handle. The caller is
    /// responsible for having already validated that `position` is
    /// unique within this pack.
    pub fn push(&mut self, entry: Entry) -> EntryHandle {
        let handle = EntryHandle::new(self.entries.len());
        self.by_position.insert(entry.position(), handle);
        if entry.is_delta() {
            self.delta_handles.push(handle);
        }
        self.entries.push(entry);
        handle
    }

    pub fn get(&self, handle: EntryHandle) -> &Entry {
        &self.entries[handle.index()]
    }

    pub fn get_mut(&mut self, handle: EntryHandle) -> &mut Entry {
        &mut self.entries[handle.index()]
    }

    /// Look up the entry whose header starts at `position`, as needed
    /// when resolving an OFS_DELTA base.
    pub fn handle_at_position(&self, position: u64) -> Option<EntryHandle> {
        self.by_position.get(&position).copied()
    }

    /// All delta entries, in the order they were appended. The resolver
    /// walks this list; it does not need object entries at all.
    pub fn delta_handles(&self) -> &[EntryHandle] {
        &self.delta_handles
    }

    /// Iterate every entry alongside its handle, in table order (which
    /// is also pack order, since entries are only ever appended).
    pub fn iter(&self) -> impl Iterator<Item = (EntryHandle, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (EntryHandle::new(i), e))
    }
}
