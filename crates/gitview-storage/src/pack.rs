//! Pack file reader.
//!
//! Reads version 2 and 3 pack files as written by `git gc` and
//! `git repack`, resolving offset and ref deltas.
//! See: https://git-scm.com/docs/pack-format

use crate::{GitObject, ObjectId, ObjectStore, ObjectType, Result, StorageError};
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::io::Read;

/// Magic bytes at the start of a pack file.
const PACK_SIGNATURE: &[u8; 4] = b"PACK";
/// Header: signature, version, object count.
const HEADER_LEN: usize = 12;
/// Trailing SHA-1 of everything before it.
const CHECKSUM_LEN: usize = 20;

/// Upper bound on the inflated/deflated ratio used to size buffers.
const MAX_INFLATE_RATIO: usize = 4;

const OFS_DELTA: u8 = 6;
const REF_DELTA: u8 = 7;

/// A ref delta whose base was not yet available when it was read.
struct PendingDelta {
    offset: usize,
    base: ObjectId,
    delta: Vec<u8>,
}

/// Reads the objects of a pack file into an [`ObjectStore`].
pub struct PackReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Resolved objects by pack offset, for offset deltas.
    by_offset: HashMap<usize, (ObjectType, Bytes)>,
}

impl<'a> PackReader<'a> {
    /// Creates a reader over raw pack bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            by_offset: HashMap::new(),
        }
    }

    /// Reads every object into `store` and returns their ids in pack order
    /// (deltas whose base appears later come last).
    pub fn read_into(&mut self, store: &ObjectStore) -> Result<Vec<ObjectId>> {
        if self.data.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(invalid("pack too short"));
        }
        if &self.data[0..4] != PACK_SIGNATURE {
            return Err(invalid("bad signature"));
        }
        let version = read_u32(&self.data[4..8]);
        if version != 2 && version != 3 {
            return Err(invalid(&format!("unsupported version {}", version)));
        }
        let count = read_u32(&self.data[8..12]) as usize;

        let body_end = self.data.len() - CHECKSUM_LEN;
        let mut hasher = Sha1::new();
        hasher.update(&self.data[..body_end]);
        if hasher.finalize().as_slice() != &self.data[body_end..] {
            return Err(invalid("checksum mismatch"));
        }

        self.pos = HEADER_LEN;
        let mut ids = Vec::with_capacity(count.min(body_end - HEADER_LEN));
        let mut pending = Vec::new();

        for _ in 0..count {
            let offset = self.pos;
            let (type_code, size) = self.read_entry_header()?;
            match type_code {
                OFS_DELTA => {
                    let distance = self.read_base_distance()?;
                    let base_offset = offset
                        .checked_sub(distance)
                        .ok_or_else(|| invalid("offset delta points before pack start"))?;
                    let delta = self.inflate(size)?;
                    let (base_type, base) = self
                        .by_offset
                        .get(&base_offset)
                        .cloned()
                        .ok_or_else(|| invalid("offset delta base not found"))?;
                    let data = apply_delta(&base, &delta)?;
                    ids.push(self.store(store, offset, base_type, data));
                }
                REF_DELTA => {
                    let base = ObjectId::from_slice(self.take(20)?)?;
                    let delta = self.inflate(size)?;
                    match store.get(&base) {
                        Ok(base_object) => {
                            let data = apply_delta(&base_object.data, &delta)?;
                            ids.push(self.store(store, offset, base_object.object_type, data));
                        }
                        Err(StorageError::ObjectNotFound(_)) => pending.push(PendingDelta {
                            offset,
                            base,
                            delta,
                        }),
                        Err(e) => return Err(e),
                    }
                }
                code => {
                    let object_type = ObjectType::from_pack_type(code)?;
                    let data = self.inflate(size)?;
                    ids.push(self.store(store, offset, object_type, data));
                }
            }
        }

        while !pending.is_empty() {
            let before = pending.len();
            let mut unresolved = Vec::new();
            for entry in pending {
                match store.get(&entry.base) {
                    Ok(base) => {
                        let data = apply_delta(&base.data, &entry.delta)?;
                        ids.push(self.store(store, entry.offset, base.object_type, data));
                    }
                    Err(StorageError::ObjectNotFound(_)) => unresolved.push(entry),
                    Err(e) => return Err(e),
                }
            }
            if unresolved.len() == before {
                return Err(invalid(&format!(
                    "{} ref deltas with missing bases",
                    unresolved.len()
                )));
            }
            pending = unresolved;
        }

        Ok(ids)
    }

    fn store(
        &mut self,
        store: &ObjectStore,
        offset: usize,
        object_type: ObjectType,
        data: Vec<u8>,
    ) -> ObjectId {
        let data = Bytes::from(data);
        self.by_offset.insert(offset, (object_type, data.clone()));
        store.put(GitObject::new(object_type, data))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        if end > self.data.len() - CHECKSUM_LEN {
            return Err(invalid("unexpected end of pack"));
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn next_byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads the type and inflated size of an entry.
    fn read_entry_header(&mut self) -> Result<(u8, usize)> {
        let first = self.next_byte()?;
        let type_code = (first >> 4) & 0x07;
        let mut size = (first & 0x0F) as usize;
        let mut shift = 4;
        let mut byte = first;
        while byte & 0x80 != 0 {
            byte = self.next_byte()?;
            size |= ((byte & 0x7F) as usize)
                .checked_shl(shift)
                .ok_or_else(|| invalid("entry size overflow"))?;
            shift += 7;
        }
        Ok((type_code, size))
    }

    /// Reads the negative offset of an offset delta's base.
    fn read_base_distance(&mut self) -> Result<usize> {
        let mut byte = self.next_byte()?;
        let mut distance = (byte & 0x7F) as usize;
        while byte & 0x80 != 0 {
            byte = self.next_byte()?;
            distance = distance
                .checked_add(1)
                .and_then(|d| d.checked_mul(128))
                .ok_or_else(|| invalid("base offset overflow"))?
                | (byte & 0x7F) as usize;
        }
        Ok(distance)
    }

    /// Inflates one zlib stream at the cursor and advances past it.
    fn inflate(&mut self, size: usize) -> Result<Vec<u8>> {
        let remaining = &self.data[self.pos..self.data.len() - CHECKSUM_LEN];
        let mut decoder = ZlibDecoder::new(remaining);
        // sizes come from the pack, so neither trust them for allocation
        // nor inflate past them
        let mut inflated =
            Vec::with_capacity(size.min(remaining.len().saturating_mul(MAX_INFLATE_RATIO)));
        (&mut decoder)
            .take((size as u64).saturating_add(1))
            .read_to_end(&mut inflated)
            .map_err(|e| StorageError::Compression(e.to_string()))?;
        if inflated.len() != size {
            return Err(invalid(&format!(
                "entry size mismatch: expected {}, got {}",
                size,
                inflated.len()
            )));
        }
        self.pos += decoder.total_in() as usize;
        Ok(inflated)
    }
}

fn invalid(msg: &str) -> StorageError {
    StorageError::InvalidObject(format!("pack: {}", msg))
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Reads a little-endian base-128 size from a delta header.
fn read_delta_size(delta: &[u8], pos: &mut usize) -> Result<usize> {
    let mut size = 0usize;
    let mut shift = 0u32;
    loop {
        let byte = *delta.get(*pos).ok_or_else(|| invalid("truncated delta header"))?;
        *pos += 1;
        size |= ((byte & 0x7F) as usize)
            .checked_shl(shift)
            .ok_or_else(|| invalid("delta size overflow"))?;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok(size);
        }
    }
}

/// Rebuilds an object from its base and a git delta.
fn apply_delta(base: &[u8], delta: &[u8]) -> Result<Vec<u8>> {
    let mut pos = 0;
    let source_len = read_delta_size(delta, &mut pos)?;
    if source_len != base.len() {
        return Err(invalid("delta base size mismatch"));
    }
    let target_len = read_delta_size(delta, &mut pos)?;
    let mut out = Vec::with_capacity(target_len.min(base.len().saturating_add(delta.len())));

    while pos < delta.len() {
        let op = delta[pos];
        pos += 1;
        if op & 0x80 != 0 {
            // copy from base: offset bytes in bits 0-3, size bytes in bits 4-6
            let mut offset = 0usize;
            let mut len = 0usize;
            for bit in 0..7 {
                if op & (1 << bit) == 0 {
                    continue;
                }
                let byte = *delta.get(pos).ok_or_else(|| invalid("truncated copy"))? as usize;
                pos += 1;
                if bit < 4 {
                    offset |= byte << (8 * bit);
                } else {
                    len |= byte << (8 * (bit - 4));
                }
            }
            if len == 0 {
                len = 0x10000;
            }
            let chunk = base
                .get(offset..offset + len)
                .ok_or_else(|| invalid("copy out of range"))?;
            out.extend_from_slice(chunk);
        } else if op != 0 {
            let len = op as usize;
            let chunk = delta
                .get(pos..pos + len)
                .ok_or_else(|| invalid("truncated insert"))?;
            out.extend_from_slice(chunk);
            pos += len;
        } else {
            return Err(invalid("reserved delta opcode"));
        }
    }

    if out.len() != target_len {
        return Err(invalid("delta result size mismatch"));
    }
    Ok(out)
}
