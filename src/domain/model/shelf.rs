use serde::{Deserialize, Serialize};

use super::book::Book;
use super::id::BookId;

/// 挿入順の書籍コレクション。
/// 追加時にIDの重複チェックは行わない。同一IDのエントリが複数あり得るため、
/// ID指定の削除は一致する全エントリを取り除く。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shelf {
    books: Vec<Book>,
}

impl Shelf {
    pub fn new() -> Self {
        Self::default()
    }

    /// 末尾に追加する。
    pub fn add(&mut self, book: Book) {
        self.books.push(book);
    }

    /// 指定IDに一致する全エントリを取り除き、取り除いた件数を返す。
    pub fn remove_by_id(&mut self, id: &BookId) -> usize {
        let before = self.books.len();
        self.books.retain(|b| b.id() != id);
        before - self.books.len()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl From<Vec<Book>> for Shelf {
    fn from(books: Vec<Book>) -> Self {
        Self { books }
    }
}
