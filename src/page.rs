//! Slotted page: a fixed `BLOCK_SZ`-byte buffer holding a growing slot
//! directory from the low end and record bytes growing from the high
//! end.
//!
//! Header layout (all fields little-endian, 2 bytes):
//!   bytes 0..2   num_records  (highest RecordID ever handed out, incl. tombstones)
//!   bytes 2..4   end_free     (offset of the last used byte of the free region)
//!   for i in 1..=num_records, at byte offset `4*i`:
//!     bytes 4i..4i+2    size of record i (0 if tombstoned)
//!     bytes 4i+2..4i+4  offset of record i (0 if tombstoned)

use crate::error::{Error, Result};

/// Fixed page size backing every heap file and B-tree node.
pub const BLOCK_SZ: usize = 4096;

/// A RecordID, unique within one page, allocated monotonically from 1.
pub type RecordId = u16;

fn get_u16(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([data[off], data[off + 1]])
}

fn set_u16(data: &mut [u8], off: usize, val: u16) {
    data[off..off + 2].copy_from_slice(&val.to_le_bytes());
}

/// An in-memory slotted page, backed by exactly `BLOCK_SZ` bytes.
#[derive(Debug, Clone)]
pub struct Page {
    data: Vec<u8>,
}

impl Page {
    /// A new, empty page: no records, all bytes free.
    pub fn empty() -> Self {
        let mut data = vec![0u8; BLOCK_SZ];
        set_u16(&mut data, 0, 0); // num_records
        set_u16(&mut data, 2, (BLOCK_SZ - 1) as u16); // end_free
        Page { data }
    }

    /// Load a page from its raw on-disk bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len(), BLOCK_SZ);
        Page { data: bytes }
    }

    /// The page's raw bytes, ready to hand to a block store.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn num_records(&self) -> u16 {
        get_u16(&self.data, 0)
    }

    fn set_num_records(&mut self, n: u16) {
        set_u16(&mut self.data, 0, n);
    }

    fn end_free(&self) -> u16 {
        get_u16(&self.data, 2)
    }

    fn set_end_free(&mut self, v: u16) {
        set_u16(&mut self.data, 2, v);
    }

    fn slot_header(&self, id: RecordId) -> (u16, u16) {
        let off = 4 * id as usize;
        (get_u16(&self.data, off), get_u16(&self.data, off + 2))
    }

    fn set_slot_header(&mut self, id: RecordId, size: u16, offset: u16) {
        let off = 4 * id as usize;
        set_u16(&mut self.data, off, size);
        set_u16(&mut self.data, off + 2, offset);
    }

    fn is_live(&self, id: RecordId) -> bool {
        if id == 0 || id > self.num_records() {
            return false;
        }
        let (size, offset) = self.slot_header(id);
        size != 0 || offset != 0
    }

    /// Whether a record of `size` bytes could be `add`ed right now.
    fn room_for(&self, size: u16) -> bool {
        let num_records = self.num_records() as i64;
        let end_free = self.end_free() as i64;
        4 * (num_records + 1) + 3 < end_free - size as i64 + 1
    }

    /// Add a new record, returning its RecordID. Fails with `NoRoom` if
    /// the admissibility predicate is false.
    pub fn add(&mut self, bytes: &[u8]) -> Result<RecordId> {
        let size = bytes.len();
        if size > u16::MAX as usize || !self.room_for(size as u16) {
            return Err(Error::no_room(format!(
                "page cannot fit {size} more bytes"
            )));
        }
        let id = self.num_records() + 1;
        let size = size as u16;
        let new_end_free = self.end_free() - size;
        let loc = new_end_free + 1;
        self.data[loc as usize..loc as usize + size as usize].copy_from_slice(bytes);
        self.set_slot_header(id, size, loc);
        self.set_num_records(id);
        self.set_end_free(new_end_free);
        Ok(id)
    }

    /// Fetch a record's bytes. Fails with `UnknownRecord` if `id` is 0,
    /// greater than the highest allocated id, or tombstoned.
    pub fn get(&self, id: RecordId) -> Result<&[u8]> {
        if !self.is_live(id) {
            return Err(Error::new(
                crate::error::ErrorKind::UnknownRecord,
                format!("record {id}"),
            ));
        }
        let (size, offset) = self.slot_header(id);
        Ok(&self.data[offset as usize..offset as usize + size as usize])
    }

    /// In-place replace a record's bytes, shifting later records to
    /// open or close room as needed.
    pub fn put(&mut self, id: RecordId, bytes: &[u8]) -> Result<()> {
        if !self.is_live(id) {
            return Err(Error::new(
                crate::error::ErrorKind::UnknownRecord,
                format!("record {id}"),
            ));
        }
        let new_size = bytes.len();
        if new_size > u16::MAX as usize {
            return Err(Error::no_room("record exceeds 64KiB"));
        }
        let (old_size, old_offset) = self.slot_header(id);
        let new_size = new_size as u16;
        if new_size > old_size {
            let grow = new_size - old_size;
            if !self.room_for_grow(grow) {
                return Err(Error::no_room(format!(
                    "cannot grow record {id} by {grow} bytes"
                )));
            }
            self.shift_records(id + 1, grow, true);
            let new_offset = old_offset - grow;
            self.data[new_offset as usize..new_offset as usize + new_size as usize]
                .copy_from_slice(bytes);
            self.set_slot_header(id, new_size, new_offset);
            // The live-byte block below `id` (if any) has already shifted by
            // `grow` via shift_records; either way the free region shrinks
            // by exactly the size delta, independent of id's position.
            self.set_end_free(self.end_free() - grow);
        } else {
            let shrink = old_size - new_size;
            self.shift_records(id + 1, shrink, false);
            let new_offset = old_offset + shrink;
            self.data[new_offset as usize..new_offset as usize + new_size as usize]
                .copy_from_slice(bytes);
            self.set_slot_header(id, new_size, new_offset);
            self.set_end_free(self.end_free() + shrink);
        }
        Ok(())
    }

    /// Whether a record could grow by `extra` bytes in place. No new
    /// slot directory entry is needed here (unlike `add`), so the
    /// admissibility check does not reserve room for one.
    fn room_for_grow(&self, extra: u16) -> bool {
        let num_records = self.num_records() as i64;
        let end_free = self.end_free() as i64;
        4 * num_records + 3 < end_free - extra as i64 + 1
    }

    /// Tombstone a record, shifting later records to close the gap.
    pub fn del(&mut self, id: RecordId) -> Result<()> {
        if !self.is_live(id) {
            return Err(Error::new(
                crate::error::ErrorKind::UnknownRecord,
                format!("record {id}"),
            ));
        }
        let (size, _offset) = self.slot_header(id);
        self.shift_records(id + 1, size, false);
        self.set_slot_header(id, 0, 0);
        self.set_end_free(self.end_free() + size);
        Ok(())
    }

    /// Live RecordIDs in ascending order.
    pub fn ids(&self) -> Vec<RecordId> {
        let n = self.num_records();
        (1..=n).filter(|&i| self.is_live(i)).collect()
    }

    /// Shift the contiguous live byte range `[end_free+1, begin_offset +
    /// begin_size - 1]` by `shift` bytes, in `grow`'s direction (true =
    /// toward the low end, opening room; false = toward the high end,
    /// closing a gap), fixing up every shifted record's offset.
    fn shift_records(&mut self, mut begin: RecordId, shift: u16, grow: bool) {
        if shift == 0 {
            return;
        }
        let num_records = self.num_records();
        while begin <= num_records && !self.is_live(begin) {
            begin += 1;
        }
        if begin > num_records {
            return;
        }
        let (begin_size, begin_offset) = self.slot_header(begin);
        let end_free = self.end_free();
        let block_size = (begin_offset + begin_size - 1) - end_free;
        let src = end_free as usize + 1;
        let mut buf = vec![0u8; block_size as usize];
        buf.copy_from_slice(&self.data[src..src + block_size as usize]);
        let dst = if grow {
            src - shift as usize
        } else {
            src + shift as usize
        };
        self.data[dst..dst + block_size as usize].copy_from_slice(&buf);
        for i in begin..=num_records {
            if self.is_live(i) {
                let (size, offset) = self.slot_header(i);
                let new_offset = if grow { offset - shift } else { offset + shift };
                self.set_slot_header(i, size, new_offset);
            }
        }
    }
}
