//! HeapFile: an ordered collection of pages over a `BlockStore`, one
//! per table. Never compacts, never reuses deleted pages, never
//! shrinks.

use crate::error::Result;
use crate::page::{Page, BLOCK_SZ};
use crate::stg::BlockStore;

/// A heap file: a name plus the block store backing it. `last` is the
/// highest allocated block id and is reloaded from the block store on
/// open rather than persisted separately.
pub struct HeapFile<S: BlockStore> {
    name: String,
    store: S,
}

impl<S: BlockStore> HeapFile<S> {
    /// Create the underlying store exclusively and allocate block 1 as
    /// an empty page, so every heap file has at least one block.
    pub fn create(name: &str) -> Result<Self> {
        let mut store = S::create(name, true)?;
        let first = store.append()?;
        debug_assert_eq!(first, 1);
        store.put(1, Page::empty().as_bytes())?;
        Ok(HeapFile {
            name: name.to_string(),
            store,
        })
    }

    /// Create the store if it doesn't already exist; otherwise open it.
    pub fn create_if_not_exists(name: &str) -> Result<Self> {
        match S::open(name) {
            Ok(store) => Ok(HeapFile {
                name: name.to_string(),
                store,
            }),
            Err(_) => Self::create(name),
        }
    }

    /// Open an existing heap file.
    pub fn open(name: &str) -> Result<Self> {
        let store = S::open(name)?;
        Ok(HeapFile {
            name: name.to_string(),
            store,
        })
    }

    /// Close the underlying store.
    pub fn close(&mut self) {
        self.store.close();
    }

    /// Drop the underlying store entirely. Not usable after this.
    pub fn drop_file(name: &str) -> Result<()> {
        S::drop_store(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn last(&self) -> u32 {
        self.store.block_count()
    }

    /// Allocate a new, empty page and append it to the store.
    pub fn get_new(&mut self) -> Result<(u32, Page)> {
        let id = self.store.append()?;
        let page = Page::empty();
        self.store.put(id, page.as_bytes())?;
        Ok((id, page))
    }

    /// Fetch the page for `id`. Fails with `UnknownBlock` for `id = 0`
    /// or `id > last`.
    pub fn get(&self, id: u32) -> Result<Page> {
        if id == 0 || id > self.last() {
            return Err(crate::error::Error::unknown_block(id));
        }
        let bytes = self.store.get(id)?;
        Ok(Page::from_bytes(bytes))
    }

    /// Write `page`'s bytes back to block `id`.
    pub fn put(&mut self, id: u32, page: &Page) -> Result<()> {
        debug_assert_eq!(page.as_bytes().len(), BLOCK_SZ);
        self.store.put(id, page.as_bytes())
    }

    /// `[1..=last]` in ascending order.
    pub fn block_ids(&self) -> Vec<u32> {
        (1..=self.last()).collect()
    }
}
