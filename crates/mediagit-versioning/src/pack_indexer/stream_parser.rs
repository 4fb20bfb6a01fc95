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

//! Resumable parser for the Git pack stream frame: header, per-object
//! sub-headers and compressed payload boundaries.
//!
//! `feed` may be called with chunks of any size, split anywhere —
//! mid-varint, mid-header, mid-deflate-stream — and will buffer the
//! fragment until the next call resolves it. Each call returns the
//! events that became decidable from the bytes seen so far.

use flate2::{Decompress, FlushDecompress, Status};
use tracing::{debug, trace};

use super::entry::{DeltaBase, PackObjectKind};
use super::error::{PackIndexError, Result};
use super::hash::{HashAlgorithm, PackObjectId, RunningHash};
use super::varint::{decode_ofs_delta_offset, decode_type_and_size};

const PACK_MAGIC: &[u8; 4] = b"PACK";

/// One structural event in the pack stream, in the order of spec.md §4.1.
#[derive(Debug, Clone)]
pub enum ParseEvent {
    PackfileHeader {
        version: u32,
        entry_count: u32,
    },
    ObjectStart {
        position: u64,
        header_size: u64,
        kind: PackObjectKind,
        size: u64,
    },
    ObjectComplete {
        compressed_size: u64,
        compressed_crc: u32,
        id: PackObjectId,
    },
    DeltaStart {
        position: u64,
        header_size: u64,
        size: u64,
        base: DeltaBase,
    },
    DeltaComplete {
        compressed_size: u64,
        compressed_crc: u32,
    },
    PackfileComplete {
        trailer_hash: PackObjectId,
    },
}

struct InflatingEntry {
    decompressor: Decompress,
    crc: crc32fast::Hasher,
    /// `Some` for plain objects (content is hashed as it streams out);
    /// `None` for deltas, whose identity isn't known until resolution.
    running_hash: Option<RunningHash>,
    declared_size: u64,
    is_delta: bool,
}

enum ParserState {
    AwaitingHeader,
    AwaitingEntryHeader,
    Inflating(InflatingEntry),
    AwaitingTrailer,
    Done,
}

pub struct StreamParser {
    hash_algorithm: HashAlgorithm,
    state: ParserState,
    pending: Vec<u8>,
    cursor: usize,
    position: u64,
    entry_count: u32,
    entries_done: u32,
    pack_running_hash: Option<RunningHash>,
}

impl StreamParser {
    pub fn new(hash_algorithm: HashAlgorithm) -> Self {
        Self {
            hash_algorithm,
            state: ParserState::AwaitingHeader,
            pending: Vec::new(),
            cursor: 0,
            position: 0,
            entry_count: 0,
            entries_done: 0,
            pack_running_hash: Some(hash_algorithm.running_hash()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, ParserState::Done)
    }

    /// Feed the next chunk of the stream, returning every event that
    /// became decidable. May return an empty vector if `chunk` didn't
    /// complete any pending field.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<ParseEvent>> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(event) = self.advance()? {
            events.push(event);
            if matches!(self.state, ParserState::Done) {
                break;
            }
        }

        if self.cursor > 0 {
            self.pending.drain(0..self.cursor);
            self.cursor = 0;
        }

        Ok(events)
    }

    fn remaining(&self) -> &[u8] {
        &self.pending[self.cursor..]
    }

    fn advance(&mut self) -> Result<Option<ParseEvent>> {
        match &mut self.state {
            ParserState::AwaitingHeader => self.advance_header(),
            ParserState::AwaitingEntryHeader => self.advance_entry_header(),
            ParserState::Inflating(_) => self.advance_inflate(),
            ParserState::AwaitingTrailer => self.advance_trailer(),
            ParserState::Done => Ok(None),
        }
    }

    fn advance_header(&mut self) -> Result<Option<ParseEvent>> {
        if self.remaining().len() < 12 {
            return Ok(None);
        }

        let header = &self.pending[self.cursor..self.cursor + 12];
        if &header[0..4] != PACK_MAGIC {
            return Err(PackIndexError::parse(self.position, "missing PACK magic"));
        }
        let version = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
        let entry_count = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
        if version != 2 && version != 3 {
            return Err(PackIndexError::parse(
                self.position,
                format!("unsupported pack version {version}"),
            ));
        }

        self.pack_running_hash
            .as_mut()
            .expect("pack running hash consumed only once, at the trailer")
            .update(header);
        self.cursor += 12;
        self.position += 12;
        self.entry_count = entry_count;
        self.entries_done = 0;

        debug!(version, entry_count, "parsed pack header");

        self.state = if entry_count == 0 {
            ParserState::AwaitingTrailer
        } else {
            ParserState::AwaitingEntryHeader
        };

        Ok(Some(ParseEvent::PackfileHeader {
            version,
            entry_count,
        }))
    }

    fn advance_entry_header(&mut self) -> Result<Option<ParseEvent>> {
        let Some((consumed, type_id, size, extra)) =
            decode_entry_header(self.remaining(), self.hash_algorithm)?
        else {
            return Ok(None);
        };

        let header_bytes_start = self.cursor;
        let position = self.position;
        self.cursor += consumed;
        self.position += consumed as u64;

        let header_bytes = &self.pending[header_bytes_start..header_bytes_start + consumed];
        self.pack_running_hash
            .as_mut()
            .expect("pack running hash consumed only once, at the trailer")
            .update(header_bytes);

        let mut crc = crc32fast::Hasher::new();
        crc.update(header_bytes);

        trace!(position, type_id, size, "entry header decoded");

        let (event, is_delta, running_hash) = match extra {
            HeaderExtra::Plain => {
                let kind = PackObjectKind::from_type_id(type_id).ok_or_else(|| {
                    PackIndexError::parse(position, format!("invalid object type {type_id}"))
                })?;
                let mut hash = self.hash_algorithm.running_hash();
                hash.update(kind.as_str().as_bytes());
                hash.update(b" ");
                hash.update(size.to_string().as_bytes());
                hash.update(b"\0");
                let event = ParseEvent::ObjectStart {
                    position,
                    header_size: consumed as u64,
                    kind,
                    size,
                };
                (event, false, Some(hash))
            }
            HeaderExtra::Offset(negative_offset) => {
                let base_position = position.checked_sub(negative_offset).ok_or_else(|| {
                    PackIndexError::parse(position, "OFS_DELTA base offset precedes pack start")
                })?;
                let event = ParseEvent::DeltaStart {
                    position,
                    header_size: consumed as u64,
                    size,
                    base: DeltaBase::Offset(base_position),
                };
                (event, true, None)
            }
            HeaderExtra::Reference(id) => {
                let event = ParseEvent::DeltaStart {
                    position,
                    header_size: consumed as u64,
                    size,
                    base: DeltaBase::Reference(id),
                };
                (event, true, None)
            }
        };

        self.state = ParserState::Inflating(InflatingEntry {
            decompressor: Decompress::new(true),
            crc,
            running_hash,
            declared_size: size,
            is_delta,
        });

        Ok(Some(event))
    }

    fn advance_inflate(&mut self) -> Result<Option<ParseEvent>> {
        let position = self.position;
        let ParserState::Inflating(entry) = &mut self.state else {
            unreachable!("advance_inflate called outside Inflating state")
        };

        loop {
            let input = &self.pending[self.cursor..];
            if input.is_empty() {
                return Ok(None);
            }

            let last_in = entry.decompressor.total_in();
            let mut scratch = Vec::new();
            let status = entry
                .decompressor
                .decompress_vec(input, &mut scratch, FlushDecompress::None)
                .map_err(|e| {
                    PackIndexError::parse(position, format!("zlib decompression error: {e}"))
                })?;
            let nread = (entry.decompressor.total_in() - last_in) as usize;

            entry.crc.update(&self.pending[self.cursor..self.cursor + nread]);
            self.pack_running_hash
                .as_mut()
                .expect("pack running hash consumed only once, at the trailer")
                .update(&self.pending[self.cursor..self.cursor + nread]);
            if let Some(hash) = entry.running_hash.as_mut() {
                hash.update(&scratch);
            }
            self.cursor += nread;
            self.position += nread as u64;

            match status {
                Status::StreamEnd => {
                    if entry.decompressor.total_out() != entry.declared_size {
                        return Err(PackIndexError::parse(
                            position,
                            format!(
                                "decompressed size {} does not match header size {}",
                                entry.decompressor.total_out(),
                                entry.declared_size
                            ),
                        ));
                    }
                    let compressed_size = entry.decompressor.total_in();
                    let compressed_crc = std::mem::replace(&mut entry.crc, crc32fast::Hasher::new())
                        .finalize();
                    let is_delta = entry.is_delta;
                    let running_hash = entry.running_hash.take();

                    self.entries_done += 1;
                    self.state = if self.entries_done == self.entry_count {
                        ParserState::AwaitingTrailer
                    } else {
                        ParserState::AwaitingEntryHeader
                    };

                    let event = if is_delta {
                        ParseEvent::DeltaComplete {
                            compressed_size,
                            compressed_crc,
                        }
                    } else {
                        let id = running_hash.expect("object entries always hash").finalize();
                        ParseEvent::ObjectComplete {
                            compressed_size,
                            compressed_crc,
                            id,
                        }
                    };
                    return Ok(Some(event));
                }
                Status::Ok => {
                    if nread == 0 {
                        return Ok(None);
                    }
                    // loop again: more input may already be buffered
                }
                Status::BufError => {
                    return Err(PackIndexError::parse(position, "zlib buffer error"));
                }
            }
        }
    }

    fn advance_trailer(&mut self) -> Result<Option<ParseEvent>> {
        let hash_len = self.hash_algorithm.output_len();
        if self.remaining().len() < hash_len {
            return Ok(None);
        }

        let trailer = &self.pending[self.cursor..self.cursor + hash_len];
        let computed = self
            .pack_running_hash
            .take()
            .expect("pack running hash consumed exactly once")
            .finalize();

        if computed.as_bytes() != trailer {
            return Err(PackIndexError::parse(
                self.position,
                "pack trailer hash mismatch",
            ));
        }

        self.cursor += hash_len;
        self.position += hash_len as u64;
        self.state = ParserState::Done;

        debug!(trailer = %computed, "pack trailer verified");

        Ok(Some(ParseEvent::PackfileComplete {
            trailer_hash: computed,
        }))
    }
}

enum HeaderExtra {
    Plain,
    Offset(u64),
    Reference(PackObjectId),
}

fn decode_entry_header(
    buf: &[u8],
    hash_algorithm: HashAlgorithm,
) -> Result<Option<(usize, u8, u64, HeaderExtra)>> {
    let Some((n1, type_id, size)) = decode_type_and_size(buf)? else {
        return Ok(None);
    };

    match type_id {
        1..=4 => Ok(Some((n1, type_id, size, HeaderExtra::Plain))),
        6 => match decode_ofs_delta_offset(&buf[n1..])? {
            Some((n2, offset)) => Ok(Some((n1 + n2, type_id, size, HeaderExtra::Offset(offset)))),
            None => Ok(None),
        },
        7 => {
            let hash_len = hash_algorithm.output_len();
            if buf.len() < n1 + hash_len {
                return Ok(None);
            }
            let id = hash_algorithm
                .id_from_bytes(&buf[n1..n1 + hash_len])
                .expect("slice length matches hash_algorithm.output_len()");
            Ok(Some((n1 + hash_len, type_id, size, HeaderExtra::Reference(id))))
        }
        other => Err(PackIndexError::parse(0, format!("invalid object type {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zlib_compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn pack_header(entry_count: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"PACK");
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&entry_count.to_be_bytes());
        bytes
    }

    fn blob_entry(content: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        // type=3 (blob), size = content.len(); assume small enough for a
        // single header byte (< 16 bytes of content) for this fixture.
        assert!(content.len() < 16);
        bytes.push(0b0011_0000 | (content.len() as u8));
        bytes.extend(zlib_compress(content));
        bytes
    }

    #[test]
    fn empty_pack_round_trips() {
        let mut parser = StreamParser::new(HashAlgorithm::Sha1);
        let mut stream = pack_header(0);
        let mut hasher = sha1::Sha1::new();
        use sha1::Digest;
        hasher.update(&stream);
        let trailer = hasher.finalize();
        stream.extend_from_slice(&trailer);

        let events = parser.feed(&stream).unwrap();
        assert!(parser.is_done());
        assert!(matches!(events[0], ParseEvent::PackfileHeader { entry_count: 0, .. }));
        assert!(matches!(events[1], ParseEvent::PackfileComplete { .. }));
    }

    #[test]
    fn single_blob_entry_produces_expected_events() {
        let mut parser = StreamParser::new(HashAlgorithm::Sha1);
        let mut stream = pack_header(1);
        stream.extend(blob_entry(b"hello\n"));

        let mut hasher = sha1::Sha1::new();
        use sha1::Digest;
        hasher.update(&stream);
        let trailer = hasher.finalize();
        stream.extend_from_slice(&trailer);

        let events = parser.feed(&stream).unwrap();
        assert!(parser.is_done());

        let ids: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ParseEvent::ObjectComplete { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
    }

    #[test]
    fn feed_can_be_split_at_any_byte_boundary() {
        let mut whole_stream = pack_header(1);
        whole_stream.extend(blob_entry(b"hello\n"));
        let mut hasher = sha1::Sha1::new();
        use sha1::Digest;
        hasher.update(&whole_stream);
        let trailer = hasher.finalize();
        whole_stream.extend_from_slice(&trailer);

        for split in 1..whole_stream.len() {
            let mut parser = StreamParser::new(HashAlgorithm::Sha1);
            let mut events = parser.feed(&whole_stream[..split]).unwrap();
            events.extend(parser.feed(&whole_stream[split..]).unwrap());
            assert!(parser.is_done(), "split at {split} did not complete parse");
            let object_completes = events
                .iter()
                .filter(|e| matches!(e, ParseEvent::ObjectComplete { .. }))
                .count();
            assert_eq!(object_completes, 1, "split at {split}");
        }
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut parser = StreamParser::new(HashAlgorithm::Sha1);
        let mut bad = b"NOPE".to_vec();
        bad.extend_from_slice(&2u32.to_be_bytes());
        bad.extend_from_slice(&0u32.to_be_bytes());
        assert!(parser.feed(&bad).is_err());
    }
}
