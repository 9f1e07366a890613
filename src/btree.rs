//! BTreeIndex: a unique ordered secondary index over a key projection
//! of a table.
//!
//! The tree lives in its own block-store-backed file, distinct from
//! the slotted-page heap format: a single stat page (root id, tree
//! height), interior pages (sorted routing keys with `n+1` child
//! pointers), and leaf pages (sorted `(key, handle)` pairs).
//! Height 1 means the root is a leaf. Keys are tuples encoded per a
//! fixed `key_profile` (the ordered column types of the indexed
//! columns); comparison is strict lexicographic left-to-right.
//!
//! This module accepts already-projected keys (`Vec<Value>`) rather
//! than whole rows: the caller (the catalog/executor layer, which
//! knows the owning table) projects a row onto the index's key
//! columns before calling `insert`/`lookup`. This keeps the index
//! itself independent of any particular table representation.

use crate::error::{Error, ErrorKind, Result};
use crate::page::BLOCK_SZ;
use crate::stg::BlockStore;
use crate::table::Handle;
use crate::value::{DataType, Value};
use std::cmp::Ordering;

/// Encode a key tuple per `profile`. INT: 4 bytes LE signed. TEXT:
/// 2-byte length then UTF-8 bytes. BOOLEAN: 1 byte.
fn encode_key(key: &[Value], profile: &[DataType]) -> Vec<u8> {
    debug_assert_eq!(key.len(), profile.len());
    let mut buf = Vec::new();
    for (v, t) in key.iter().zip(profile) {
        match (t, v) {
            (DataType::Int, Value::Int(x)) => buf.extend_from_slice(&x.to_le_bytes()),
            (DataType::Boolean, Value::Boolean(b)) => buf.push(if *b { 1 } else { 0 }),
            (DataType::Text, Value::Text(s)) => {
                let bytes = s.as_bytes();
                buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
                buf.extend_from_slice(bytes);
            }
            _ => panic!("key value does not match key profile"),
        }
    }
    buf
}

/// Decode one key tuple from `data` starting at `off`, returning the
/// tuple and the offset just past it.
fn decode_key(data: &[u8], off: usize, profile: &[DataType]) -> (Vec<Value>, usize) {
    let mut off = off;
    let mut out = Vec::with_capacity(profile.len());
    for t in profile {
        match t {
            DataType::Int => {
                let bytes: [u8; 4] = data[off..off + 4].try_into().unwrap();
                out.push(Value::Int(i32::from_le_bytes(bytes)));
                off += 4;
            }
            DataType::Boolean => {
                out.push(Value::Boolean(data[off] != 0));
                off += 1;
            }
            DataType::Text => {
                let len = u16::from_le_bytes([data[off], data[off + 1]]) as usize;
                off += 2;
                let s = String::from_utf8(data[off..off + len].to_vec()).unwrap();
                out.push(Value::Text(s));
                off += len;
            }
        }
    }
    (out, off)
}

fn compare_keys(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = x.partial_cmp(y).expect("key values must be same-typed");
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Whether every value in `key` has the tag its `profile` position
/// expects. A key can reach a public entry point (`lookup`, `insert`)
/// with the wrong shape if it was built from a WHERE literal that
/// doesn't match the indexed column's type (`id = 'x'` on an INT
/// column); since values of different tags are never equal (spec §3),
/// such a key can never match anything in this tree. Callers check
/// this before doing any tuple comparison, so `compare_keys`/
/// `encode_key` only ever see same-typed tuples and their panics stay
/// an internal invariant rather than something a caller can trigger.
fn key_matches_profile(key: &[Value], profile: &[DataType]) -> bool {
    key.len() == profile.len() && key.iter().zip(profile).all(|(v, t)| v.data_type() == *t)
}

fn decode_handle(data: &[u8], off: usize) -> Handle {
    let block = u32::from_le_bytes(data[off..off + 4].try_into().unwrap());
    let rec = u16::from_le_bytes(data[off + 4..off + 6].try_into().unwrap());
    (block, rec)
}

fn encode_handle(buf: &mut Vec<u8>, h: Handle) {
    buf.extend_from_slice(&h.0.to_le_bytes());
    buf.extend_from_slice(&h.1.to_le_bytes());
}

const HANDLE_SZ: usize = 6;

/// A leaf node: sorted `(key, handle)` pairs.
struct Leaf {
    entries: Vec<(Vec<Value>, Handle)>,
}

impl Leaf {
    fn decode(data: &[u8], profile: &[DataType]) -> Self {
        let count = u16::from_le_bytes([data[0], data[1]]) as usize;
        let mut off = 2;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let (key, new_off) = decode_key(data, off, profile);
            let handle = decode_handle(data, new_off);
            entries.push((key, handle));
            off = new_off + HANDLE_SZ;
        }
        Leaf { entries }
    }

    fn encoded_size(&self, profile: &[DataType]) -> usize {
        2 + self
            .entries
            .iter()
            .map(|(k, _)| encode_key(k, profile).len() + HANDLE_SZ)
            .sum::<usize>()
    }

    fn encode(&self, profile: &[DataType]) -> Vec<u8> {
        let mut buf = vec![0u8; 2];
        buf[0..2].copy_from_slice(&(self.entries.len() as u16).to_le_bytes());
        for (key, handle) in &self.entries {
            buf.extend_from_slice(&encode_key(key, profile));
            encode_handle(&mut buf, *handle);
        }
        buf.resize(BLOCK_SZ, 0);
        buf
    }

    fn find_eq(&self, key: &[Value]) -> Option<Handle> {
        self.entries
            .binary_search_by(|(k, _)| compare_keys(k, key))
            .ok()
            .map(|i| self.entries[i].1)
    }

    /// Insert in key order. Errors if the key already exists (unique
    /// index). Returns the entries to keep here and, if the page would
    /// overflow, the entries to move to a new right sibling.
    fn insert(&mut self, key: Vec<Value>, handle: Handle) -> Result<()> {
        match self.entries.binary_search_by(|(k, _)| compare_keys(k, &key)) {
            Ok(_) => Err(Error::already_exists("duplicate key in unique index")),
            Err(pos) => {
                self.entries.insert(pos, (key, handle));
                Ok(())
            }
        }
    }
}

/// A routing entry: `key` is the separator, `child` the page to its
/// right (keys `>= key` for non-final entries go toward `child` or a
/// later one).
struct Interior {
    first_child: u32,
    entries: Vec<(Vec<Value>, u32)>,
}

impl Interior {
    fn decode(data: &[u8], profile: &[DataType]) -> Self {
        let count = u16::from_le_bytes([data[0], data[1]]) as usize;
        let first_child = u32::from_le_bytes(data[2..6].try_into().unwrap());
        let mut off = 6;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let (key, new_off) = decode_key(data, off, profile);
            let child = u32::from_le_bytes(data[new_off..new_off + 4].try_into().unwrap());
            entries.push((key, child));
            off = new_off + 4;
        }
        Interior {
            first_child,
            entries,
        }
    }

    fn encoded_size(&self, profile: &[DataType]) -> usize {
        6 + self
            .entries
            .iter()
            .map(|(k, _)| encode_key(k, profile).len() + 4)
            .sum::<usize>()
    }

    fn encode(&self, profile: &[DataType]) -> Vec<u8> {
        let mut buf = vec![0u8; 6];
        buf[0..2].copy_from_slice(&(self.entries.len() as u16).to_le_bytes());
        buf[2..6].copy_from_slice(&self.first_child.to_le_bytes());
        for (key, child) in &self.entries {
            buf.extend_from_slice(&encode_key(key, profile));
            buf.extend_from_slice(&child.to_le_bytes());
        }
        buf.resize(BLOCK_SZ, 0);
        buf
    }

    /// Child to descend into for `key`: `c_0` if `key < k_1`, `c_i` if
    /// `k_{i-1} <= key < k_i`, `c_n` if `key >= k_n`.
    fn child_for(&self, key: &[Value]) -> u32 {
        let mut child = self.first_child;
        for (k, c) in &self.entries {
            if compare_keys(key, k) == Ordering::Less {
                break;
            }
            child = *c;
        }
        child
    }

    /// Insert routing entry `(key, child)` in sorted order.
    fn insert(&mut self, key: Vec<Value>, child: u32) {
        let pos = self
            .entries
            .binary_search_by(|(k, _)| compare_keys(k, &key))
            .unwrap_or_else(|p| p);
        self.entries.insert(pos, (key, child));
    }
}

/// Result of a node-level insert that overflowed: the new sibling's
/// page id and the boundary key that separates it from its left
/// neighbor, to be inserted into the parent (or used to build a new
/// root). `None` threads through the "no split happened" case
/// explicitly rather than being read from a default/uninitialized
/// value.
struct Split {
    new_node: u32,
    boundary: Vec<Value>,
}

/// A unique ordered secondary index. `unique = false` is rejected at
/// construction (spec §4.6) — this core has no way to look up or
/// maintain a key that can map to more than one handle.
pub struct BTreeIndex<S: BlockStore> {
    pub table: String,
    pub name: String,
    pub key_cols: Vec<String>,
    pub key_profile: Vec<DataType>,
    pub unique: bool,
    store: S,
}

const STAT_BLOCK: u32 = 1;

impl<S: BlockStore> BTreeIndex<S> {
    fn file_name(table: &str, name: &str) -> String {
        format!("{table}-{name}")
    }

    /// Create the backing file, write an empty leaf root, set stat to
    /// `(root, height=1)`, then bulk-insert `rows` (existing table
    /// rows' projected keys and handles). Fails with
    /// `NonUniqueUnsupported` if `unique` is false.
    pub fn create(
        table: &str,
        name: &str,
        key_cols: Vec<String>,
        key_profile: Vec<DataType>,
        unique: bool,
        rows: impl IntoIterator<Item = (Vec<Value>, Handle)>,
    ) -> Result<Self> {
        if !unique {
            return Err(Error::non_unique_unsupported());
        }
        if key_profile.is_empty() {
            return Err(Error::new(ErrorKind::RowShape, "index key must have at least one column"));
        }
        let file_name = Self::file_name(table, name);
        let mut store = S::create(&file_name, true)?;
        let stat_id = store.append()?;
        debug_assert_eq!(stat_id, STAT_BLOCK);
        let leaf_id = store.append()?;
        let empty_leaf = Leaf { entries: Vec::new() };
        store.put(leaf_id, &empty_leaf.encode(&key_profile))?;
        let mut idx = BTreeIndex {
            table: table.to_string(),
            name: name.to_string(),
            key_cols,
            key_profile,
            unique,
            store,
        };
        idx.write_stat(leaf_id, 1)?;
        for (key, handle) in rows {
            idx.insert(key, handle)?;
        }
        Ok(idx)
    }

    /// Open an existing index (key_cols/key_profile/unique come from
    /// the catalog's `_indices` rows).
    pub fn open(
        table: &str,
        name: &str,
        key_cols: Vec<String>,
        key_profile: Vec<DataType>,
        unique: bool,
    ) -> Result<Self> {
        let store = S::open(&Self::file_name(table, name))?;
        Ok(BTreeIndex {
            table: table.to_string(),
            name: name.to_string(),
            key_cols,
            key_profile,
            unique,
            store,
        })
    }

    pub fn close(&mut self) {
        self.store.close();
    }

    pub fn drop_index(table: &str, name: &str) -> Result<()> {
        S::drop_store(&Self::file_name(table, name))
    }

    fn read_stat(&self) -> Result<(u32, u32)> {
        let data = self.store.get(STAT_BLOCK)?;
        let root = u32::from_le_bytes(data[0..4].try_into().unwrap());
        let height = u32::from_le_bytes(data[4..8].try_into().unwrap());
        Ok((root, height))
    }

    fn write_stat(&mut self, root: u32, height: u32) -> Result<()> {
        let mut buf = vec![0u8; BLOCK_SZ];
        buf[0..4].copy_from_slice(&root.to_le_bytes());
        buf[4..8].copy_from_slice(&height.to_le_bytes());
        self.store.put(STAT_BLOCK, &buf)
    }

    fn read_leaf(&self, id: u32) -> Result<Leaf> {
        Ok(Leaf::decode(&self.store.get(id)?, &self.key_profile))
    }
    fn write_leaf(&mut self, id: u32, leaf: &Leaf) -> Result<()> {
        self.store.put(id, &leaf.encode(&self.key_profile))
    }
    fn read_interior(&self, id: u32) -> Result<Interior> {
        Ok(Interior::decode(&self.store.get(id)?, &self.key_profile))
    }
    fn write_interior(&mut self, id: u32, node: &Interior) -> Result<()> {
        self.store.put(id, &node.encode(&self.key_profile))
    }

    /// Project `key_dict` to the key tuple, descend, and return the
    /// matching handle (or none). A key whose value tags don't match
    /// this index's key profile (a WHERE literal of the wrong type)
    /// can never match a stored entry, so it returns empty rather than
    /// descending into a comparison it can't make — the same outcome
    /// a non-indexed scan gets from `==` on differently-tagged values.
    pub fn lookup(&self, key: &[Value]) -> Result<Vec<Handle>> {
        if !key_matches_profile(key, &self.key_profile) {
            return Ok(Vec::new());
        }
        let (root, height) = self.read_stat()?;
        let mut node_id = root;
        let mut h = height;
        loop {
            if h == 1 {
                let leaf = self.read_leaf(node_id)?;
                return Ok(leaf.find_eq(key).into_iter().collect());
            }
            let interior = self.read_interior(node_id)?;
            node_id = interior.child_for(key);
            h -= 1;
        }
    }

    /// Insert a `(key, handle)` pair, splitting nodes as needed,
    /// growing the tree's height if the root itself splits.
    pub fn insert(&mut self, key: Vec<Value>, handle: Handle) -> Result<()> {
        if key.is_empty() {
            return Err(Error::new(ErrorKind::RowShape, "empty index key"));
        }
        if !key_matches_profile(&key, &self.key_profile) {
            return Err(Error::row_shape("index key does not match key profile"));
        }
        let (root, height) = self.read_stat()?;
        if let Some(split) = self.insert_rec(root, height, &key, handle)? {
            let new_root = self.store.append()?;
            let interior = Interior {
                first_child: root,
                entries: vec![(split.boundary, split.new_node)],
            };
            self.write_interior(new_root, &interior)?;
            self.write_stat(new_root, height + 1)?;
        }
        Ok(())
    }

    fn insert_rec(
        &mut self,
        node_id: u32,
        height: u32,
        key: &[Value],
        handle: Handle,
    ) -> Result<Option<Split>> {
        if height == 1 {
            let mut leaf = self.read_leaf(node_id)?;
            leaf.insert(key.to_vec(), handle)?;
            if leaf.encoded_size(&self.key_profile) <= BLOCK_SZ {
                self.write_leaf(node_id, &leaf)?;
                Ok(None)
            } else {
                let mid = leaf.entries.len() / 2;
                let right_entries = leaf.entries.split_off(mid);
                let boundary = right_entries[0].0.clone();
                let right_id = self.store.append()?;
                self.write_leaf(node_id, &leaf)?;
                self.write_leaf(right_id, &Leaf { entries: right_entries })?;
                Ok(Some(Split {
                    new_node: right_id,
                    boundary,
                }))
            }
        } else {
            let mut node = self.read_interior(node_id)?;
            let child = node.child_for(key);
            let split = self.insert_rec(child, height - 1, key, handle)?;
            match split {
                None => Ok(None),
                Some(child_split) => {
                    node.insert(child_split.boundary, child_split.new_node);
                    if node.encoded_size(&self.key_profile) <= BLOCK_SZ {
                        self.write_interior(node_id, &node)?;
                        Ok(None)
                    } else {
                        let mid = node.entries.len() / 2;
                        let boundary = node.entries[mid].0.clone();
                        let right_first_child = node.entries[mid].1;
                        let right_entries = node.entries.split_off(mid + 1);
                        node.entries.truncate(mid);
                        let right_id = self.store.append()?;
                        self.write_interior(node_id, &node)?;
                        self.write_interior(
                            right_id,
                            &Interior {
                                first_child: right_first_child,
                                entries: right_entries,
                            },
                        )?;
                        Ok(Some(Split {
                            new_node: right_id,
                            boundary,
                        }))
                    }
                }
            }
        }
    }

    /// Remove the leaf entry for `(key, handle)`: DELETE's index
    /// maintenance step. Unlike `insert`, never merges or rebalances
    /// nodes on underflow — a tree's height and interior structure only
    /// ever grow. Errors if the entry is not present.
    pub fn remove_entry(&mut self, key: &[Value], handle: Handle) -> Result<()> {
        if !key_matches_profile(key, &self.key_profile) {
            return Err(Error::new(ErrorKind::UnknownRecord, "index entry not found"));
        }
        let (root, height) = self.read_stat()?;
        let mut node_id = root;
        let mut h = height;
        loop {
            if h == 1 {
                let mut leaf = self.read_leaf(node_id)?;
                let pos = leaf
                    .entries
                    .iter()
                    .position(|(k, v)| compare_keys(k, key) == Ordering::Equal && *v == handle)
                    .ok_or_else(|| Error::new(ErrorKind::UnknownRecord, "index entry not found"))?;
                leaf.entries.remove(pos);
                return self.write_leaf(node_id, &leaf);
            }
            let interior = self.read_interior(node_id)?;
            node_id = interior.child_for(key);
            h -= 1;
        }
    }

    /// A single key's lookup, by itself, is not an operation this core
    /// exposes for mutation: deleting requires the specific handle too
    /// (see `remove_entry`), so this generic by-key form is left
    /// unsupported, matching the source's own unimplemented `del`.
    pub fn del(&mut self, _key: &[Value]) -> Result<()> {
        Err(Error::not_implemented("delete from a B-tree index"))
    }

    /// Not supported in this core.
    pub fn range(&self, _min: &[Value], _max: &[Value]) -> Result<Vec<Handle>> {
        Err(Error::not_implemented("range query on a B-tree index"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stg::MemBlockStore;

    fn int_key(n: i32) -> Vec<Value> {
        vec![Value::Int(n)]
    }

    #[test]
    fn create_then_lookup_point() {
        let mut idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-basic",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            true,
            std::iter::empty(),
        )
        .unwrap();
        idx.insert(int_key(1), (1, 1)).unwrap();
        idx.insert(int_key(2), (1, 2)).unwrap();
        assert_eq!(idx.lookup(&int_key(1)).unwrap(), vec![(1, 1)]);
        assert_eq!(idx.lookup(&int_key(2)).unwrap(), vec![(1, 2)]);
        assert_eq!(idx.lookup(&int_key(3)).unwrap(), Vec::<Handle>::new());
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-basic", "ix").unwrap();
    }

    #[test]
    fn lookup_with_wrong_typed_key_returns_empty_not_panic() {
        let mut idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-type-mismatch",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            true,
            std::iter::empty(),
        )
        .unwrap();
        idx.insert(int_key(1), (1, 1)).unwrap();
        assert_eq!(
            idx.lookup(&[Value::Text("x".to_string())]).unwrap(),
            Vec::<Handle>::new()
        );
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-type-mismatch", "ix").unwrap();
    }

    #[test]
    fn insert_with_wrong_typed_key_is_rejected() {
        let mut idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-insert-mismatch",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            true,
            std::iter::empty(),
        )
        .unwrap();
        assert!(idx.insert(vec![Value::Text("x".to_string())], (1, 1)).is_err());
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-insert-mismatch", "ix").unwrap();
    }

    #[test]
    fn duplicate_key_rejected() {
        let mut idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-dup",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            true,
            std::iter::empty(),
        )
        .unwrap();
        idx.insert(int_key(1), (1, 1)).unwrap();
        assert!(idx.insert(int_key(1), (1, 2)).is_err());
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-dup", "ix").unwrap();
    }

    #[test]
    fn splits_across_many_inserts_and_grows_height() {
        let mut idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-split",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            true,
            std::iter::empty(),
        )
        .unwrap();
        for i in 0..2000 {
            idx.insert(int_key(i), (1, (i % 60000) as u16)).unwrap();
        }
        for i in 0..2000 {
            assert_eq!(
                idx.lookup(&int_key(i)).unwrap(),
                vec![(1, (i % 60000) as u16)],
                "lookup failed for {i}"
            );
        }
        let (_, height) = idx.read_stat().unwrap();
        assert!(height > 1, "tree should have grown past a single leaf");
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-split", "ix").unwrap();
    }

    #[test]
    fn text_keys_compare_lexicographically() {
        let mut idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-text",
            "ix",
            vec!["name".to_string()],
            vec![DataType::Text],
            true,
            std::iter::empty(),
        )
        .unwrap();
        idx.insert(vec![Value::Text("banana".into())], (1, 1)).unwrap();
        idx.insert(vec![Value::Text("apple".into())], (1, 2)).unwrap();
        assert_eq!(idx.lookup(&[Value::Text("apple".into())]).unwrap(), vec![(1, 2)]);
        assert_eq!(idx.lookup(&[Value::Text("banana".into())]).unwrap(), vec![(1, 1)]);
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-text", "ix").unwrap();
    }

    #[test]
    fn bulk_insert_on_create_indexes_existing_rows() {
        let rows = vec![(int_key(1), (1u32, 1u16)), (int_key(2), (1u32, 2u16))];
        let idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-bulk",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            true,
            rows,
        )
        .unwrap();
        assert_eq!(idx.lookup(&int_key(1)).unwrap(), vec![(1, 1)]);
        assert_eq!(idx.lookup(&int_key(2)).unwrap(), vec![(1, 2)]);
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-bulk", "ix").unwrap();
    }

    #[test]
    fn remove_entry_drops_the_matching_leaf_row() {
        let mut idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-remove",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            true,
            std::iter::empty(),
        )
        .unwrap();
        idx.insert(int_key(1), (1, 1)).unwrap();
        idx.insert(int_key(2), (1, 2)).unwrap();
        idx.remove_entry(&int_key(1), (1, 1)).unwrap();
        assert_eq!(idx.lookup(&int_key(1)).unwrap(), Vec::<Handle>::new());
        assert_eq!(idx.lookup(&int_key(2)).unwrap(), vec![(1, 2)]);
        assert!(idx.remove_entry(&int_key(1), (1, 1)).is_err());
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-remove", "ix").unwrap();
    }

    #[test]
    fn del_and_range_are_not_implemented() {
        let mut idx = BTreeIndex::<MemBlockStore>::create(
            "t-btree-notimpl",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            true,
            std::iter::empty(),
        )
        .unwrap();
        assert!(idx.del(&int_key(1)).is_err());
        assert!(idx.range(&int_key(1), &int_key(2)).is_err());
        BTreeIndex::<MemBlockStore>::drop_index("t-btree-notimpl", "ix").unwrap();
    }

    #[test]
    fn non_unique_request_rejected_at_construction() {
        let err = BTreeIndex::<MemBlockStore>::create(
            "t-btree-nonunique",
            "ix",
            vec!["id".to_string()],
            vec![DataType::Int],
            false,
            std::iter::empty(),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NonUniqueUnsupported);
    }
}
