//! The external block store interface this engine is layered on top
//! of, plus two concrete implementations.
//!
//! Any persistent store that maps positive integer block ids to fixed
//! `BLOCK_SZ`-byte blocks and persists them atomically satisfies this
//! interface; the heap file and B-tree index never touch the
//! filesystem directly.

use crate::error::{Error, Result};
use crate::page::BLOCK_SZ;
use std::collections::HashMap;

/// create/open/close/drop/get/put/append of opaque fixed-size blocks
/// keyed by positive integer id.
///
/// Single-threaded cooperative execution means no `Send + Sync` bound
/// is required here: nothing in this crate hands a `BlockStore` across
/// threads.
pub trait BlockStore {
    /// Create the named store. Fails if `exclusive` and it already exists.
    fn create(name: &str, exclusive: bool) -> Result<Self>
    where
        Self: Sized;

    /// Open an existing named store.
    fn open(name: &str) -> Result<Self>
    where
        Self: Sized;

    /// Close the store. Subsequent operations require reopening.
    fn close(&mut self);

    /// Remove the named store entirely.
    fn drop_store(name: &str) -> Result<()>
    where
        Self: Sized;

    /// Number of blocks currently allocated.
    fn block_count(&self) -> u32;

    /// Append a new zero-filled block, returning its id.
    fn append(&mut self) -> Result<u32>;

    /// Fetch block `id`'s bytes (always exactly `BLOCK_SZ` bytes).
    fn get(&self, id: u32) -> Result<Vec<u8>>;

    /// Overwrite block `id`'s bytes.
    fn put(&mut self, id: u32, bytes: &[u8]) -> Result<()>;
}

/// In-memory `BlockStore`, for tests. Stores are named, and dropping
/// the last handle to a name frees it; `drop_store` simulates deleting
/// the backing file.
mod registry {
    use super::*;
    use std::sync::Mutex;

    static STORES: Mutex<Option<HashMap<String, Vec<Vec<u8>>>>> = Mutex::new(None);

    pub fn with_stores<R>(f: impl FnOnce(&mut HashMap<String, Vec<Vec<u8>>>) -> R) -> R {
        let mut guard = STORES.lock().unwrap();
        let map = guard.get_or_insert_with(HashMap::new);
        f(map)
    }
}

/// `BlockStore` backed by an in-process table of named byte-block
/// vectors. Useful for unit tests that would otherwise need a
/// filesystem: a lightweight in-memory stand-in alongside the real
/// file-backed one.
pub struct MemBlockStore {
    name: String,
    closed: bool,
}

impl BlockStore for MemBlockStore {
    fn create(name: &str, exclusive: bool) -> Result<Self> {
        registry::with_stores(|stores| {
            if stores.contains_key(name) {
                if exclusive {
                    return Err(Error::already_exists(format!("store '{name}'")));
                }
            } else {
                stores.insert(name.to_string(), Vec::new());
            }
            Ok(())
        })?;
        Ok(MemBlockStore {
            name: name.to_string(),
            closed: false,
        })
    }

    fn open(name: &str) -> Result<Self> {
        registry::with_stores(|stores| {
            if !stores.contains_key(name) {
                return Err(Error::io(format!("store '{name}' does not exist")));
            }
            Ok(())
        })?;
        Ok(MemBlockStore {
            name: name.to_string(),
            closed: false,
        })
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn drop_store(name: &str) -> Result<()> {
        registry::with_stores(|stores| {
            stores.remove(name);
        });
        Ok(())
    }

    fn block_count(&self) -> u32 {
        registry::with_stores(|stores| stores.get(&self.name).map_or(0, |b| b.len() as u32))
    }

    fn append(&mut self) -> Result<u32> {
        if self.closed {
            return Err(Error::io("store is closed"));
        }
        registry::with_stores(|stores| {
            let blocks = stores.entry(self.name.clone()).or_default();
            blocks.push(vec![0u8; BLOCK_SZ]);
            Ok(blocks.len() as u32)
        })
    }

    fn get(&self, id: u32) -> Result<Vec<u8>> {
        if self.closed {
            return Err(Error::io("store is closed"));
        }
        registry::with_stores(|stores| {
            let blocks = stores
                .get(&self.name)
                .ok_or_else(|| Error::io(format!("store '{}' does not exist", self.name)))?;
            if id == 0 || id as usize > blocks.len() {
                return Err(Error::unknown_block(id));
            }
            Ok(blocks[id as usize - 1].clone())
        })
    }

    fn put(&mut self, id: u32, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::io("store is closed"));
        }
        debug_assert_eq!(bytes.len(), BLOCK_SZ);
        registry::with_stores(|stores| {
            let blocks = stores
                .get_mut(&self.name)
                .ok_or_else(|| Error::io(format!("store '{}' does not exist", self.name)))?;
            if id == 0 || id as usize > blocks.len() {
                return Err(Error::unknown_block(id));
            }
            blocks[id as usize - 1].copy_from_slice(bytes);
            Ok(())
        })
    }
}

/// `BlockStore` backed by a real `std::fs::File`, one file per name.
/// Addresses fixed `BLOCK_SZ` blocks by integer id rather than
/// arbitrary byte ranges.
pub struct FileBlockStore {
    file: std::fs::File,
    block_count: u32,
}

impl FileBlockStore {
    fn offset(id: u32) -> u64 {
        (id as u64 - 1) * BLOCK_SZ as u64
    }
}

impl BlockStore for FileBlockStore {
    fn create(name: &str, exclusive: bool) -> Result<Self> {
        use std::fs::OpenOptions;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .create_new(exclusive)
            .open(name)
            .map_err(|e| Error::io(format!("create '{name}': {e}")))?;
        let len = file
            .metadata()
            .map_err(|e| Error::io(e.to_string()))?
            .len();
        Ok(FileBlockStore {
            file,
            block_count: (len / BLOCK_SZ as u64) as u32,
        })
    }

    fn open(name: &str) -> Result<Self> {
        use std::fs::OpenOptions;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(name)
            .map_err(|e| Error::io(format!("open '{name}': {e}")))?;
        let len = file
            .metadata()
            .map_err(|e| Error::io(e.to_string()))?
            .len();
        Ok(FileBlockStore {
            file,
            block_count: (len / BLOCK_SZ as u64) as u32,
        })
    }

    fn close(&mut self) {
        // std::fs::File closes on Drop; nothing further to do here.
    }

    fn drop_store(name: &str) -> Result<()> {
        std::fs::remove_file(name).map_err(|e| Error::io(format!("drop '{name}': {e}")))
    }

    fn block_count(&self) -> u32 {
        self.block_count
    }

    fn append(&mut self) -> Result<u32> {
        use std::io::{Seek, SeekFrom, Write};
        let id = self.block_count + 1;
        self.file
            .seek(SeekFrom::Start(Self::offset(id)))
            .map_err(|e| Error::io(e.to_string()))?;
        self.file
            .write_all(&[0u8; BLOCK_SZ])
            .map_err(|e| Error::io(e.to_string()))?;
        self.block_count = id;
        Ok(id)
    }

    fn get(&self, id: u32) -> Result<Vec<u8>> {
        use std::io::{Read, Seek, SeekFrom};
        if id == 0 || id > self.block_count {
            return Err(Error::unknown_block(id));
        }
        let mut f = &self.file;
        f.seek(SeekFrom::Start(Self::offset(id)))
            .map_err(|e| Error::io(e.to_string()))?;
        let mut buf = vec![0u8; BLOCK_SZ];
        f.read_exact(&mut buf).map_err(|e| Error::io(e.to_string()))?;
        Ok(buf)
    }

    fn put(&mut self, id: u32, bytes: &[u8]) -> Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        if id == 0 || id > self.block_count {
            return Err(Error::unknown_block(id));
        }
        debug_assert_eq!(bytes.len(), BLOCK_SZ);
        self.file
            .seek(SeekFrom::Start(Self::offset(id)))
            .map_err(|e| Error::io(e.to_string()))?;
        self.file
            .write_all(bytes)
            .map_err(|e| Error::io(e.to_string()))
    }
}
