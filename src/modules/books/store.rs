//! In-memory book store.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use super::models::BookId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book store lock poisoned")]
    Poisoned,
}

/// Shared mapping from book id to title.
///
/// Writes are serialised behind a `RwLock`; each operation holds the lock for
/// a single map access. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct BookStore {
    books: Arc<RwLock<BTreeMap<BookId, String>>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the title for `id`, returning the previous title.
    pub fn put(&self, id: BookId, title: impl Into<String>) -> Result<Option<String>, StoreError> {
        Ok(self.write()?.insert(id, title.into()))
    }

    pub fn get(&self, id: BookId) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// Remove `id` if present. Absent ids are not an error.
    pub fn remove(&self, id: BookId) -> Result<Option<String>, StoreError> {
        Ok(self.write()?.remove(&id))
    }

    /// Copy of every entry, ordered by id.
    pub fn snapshot(&self) -> Result<BTreeMap<BookId, String>, StoreError> {
        Ok(self.read()?.clone())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// Poison the lock by panicking while holding the write guard.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let books = Arc::clone(&self.books);
        let _ = std::thread::spawn(move || {
            let _guard = books.write().unwrap();
            panic!("poisoning book store");
        })
        .join();
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<BookId, String>>, StoreError> {
        self.books.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<BookId, String>>, StoreError> {
        self.books.write().map_err(|_| StoreError::Poisoned)
    }
}
