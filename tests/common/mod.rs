//! Shared test harness for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use bookshelf_mcp::application::library::Library;
use bookshelf_mcp::domain::model::book::{Book, BookBuilder};
use bookshelf_mcp::domain::model::id::BookId;
use bookshelf_mcp::domain::observer::ShelfObserver;
use bookshelf_mcp::domain::storage::StorageBackend;

pub const TEST_KEY: &str = "books";

// =============================================================================
// InMemoryStore — テスト用ストア
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[error("in-memory store error")]
pub struct InMemoryError;

/// ファイルI/O不要のインメモリKVストア。クローンは同じ領域を共有する。
#[derive(Clone, Default)]
pub struct InMemoryStore {
    map: Rc<RefCell<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.borrow().contains_key(key)
    }
}

impl StorageBackend for InMemoryStore {
    type Error = InMemoryError;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.map.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.map
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.map.borrow_mut().remove(key);
        Ok(())
    }
}

/// 書き込みが常に失敗するストア。エラー伝播経路の検証用。
#[derive(Clone, Default)]
pub struct FailingStore;

impl StorageBackend for FailingStore {
    type Error = InMemoryError;

    fn read(&self, _key: &str) -> Result<Option<String>, Self::Error> {
        Ok(None)
    }

    fn write(&self, _key: &str, _value: &str) -> Result<(), Self::Error> {
        Err(InMemoryError)
    }

    fn remove(&self, _key: &str) -> Result<(), Self::Error> {
        Err(InMemoryError)
    }
}

// =============================================================================
// Fixture shelf
// =============================================================================

/// 固定IDの標準フィクスチャ:
/// 1. The Hobbit / J.R.R. Tolkien / 1937 / fantasy
/// 2. The Fellowship of the Ring / J.R.R. Tolkien / 1954 / fantasy / ISBN付き
/// 3. Dune / Frank Herbert / 1965
pub fn standard_books() -> Vec<Book> {
    vec![
        BookBuilder::new(BookId::from("b-hobbit"), "The Hobbit", "J.R.R. Tolkien", 1937)
            .genre("fantasy")
            .build(),
        BookBuilder::new(
            BookId::from("b-fellowship"),
            "The Fellowship of the Ring",
            "J.R.R. Tolkien",
            1954,
        )
        .genre("fantasy")
        .isbn("978-0-618-57494-2")
        .build(),
        BookBuilder::new(BookId::from("b-dune"), "Dune", "Frank Herbert", 1965).build(),
    ]
}

/// 標準フィクスチャ入りのLibraryを開く。再読込検証用にストアも返す。
pub fn library_with_standard() -> (Library<InMemoryStore>, InMemoryStore) {
    let store = InMemoryStore::new();
    let mut library = Library::open(store.clone(), TEST_KEY).unwrap();
    for book in standard_books() {
        library.add_book(book).unwrap();
    }
    (library, store)
}

// =============================================================================
// Observer probe
// =============================================================================

/// 通知をラベル付きで記録するObserver。通知順と回数の検証用。
pub struct ProbeObserver {
    label: &'static str,
    log: Arc<Mutex<Vec<(&'static str, usize)>>>,
}

impl ProbeObserver {
    pub fn new(
        label: &'static str,
        log: Arc<Mutex<Vec<(&'static str, usize)>>>,
    ) -> Arc<Self> {
        Arc::new(Self { label, log })
    }
}

impl ShelfObserver for ProbeObserver {
    fn notify(&self, books: &[Book]) {
        self.log.lock().unwrap().push((self.label, books.len()));
    }
}

// =============================================================================
// Assertion helpers
// =============================================================================

/// 結果がErrで、メッセージに指定文字列を含むことをassert。
pub fn assert_error_contains<T: std::fmt::Debug>(
    result: Result<T, impl std::fmt::Display>,
    expected: &str,
) {
    match result {
        Err(e) => {
            let msg = e.to_string();
            assert!(
                msg.contains(expected),
                "Expected error containing '{expected}', got: '{msg}'"
            );
        }
        Ok(v) => panic!("Expected error containing '{expected}', got Ok({v:?})"),
    }
}
