use crate::domain::model::book::Book;
use crate::domain::storage::StorageBackend;

use super::error::AppError;
use super::library::Library;

/// 1つの対象Bookに束縛された (実行, 取り消し) の組。
/// 履歴スタックは持たない。undoはコマンド値を保持している呼び出し側だけが実行できる。
pub trait Command<S: StorageBackend> {
    fn execute(&self, library: &mut Library<S>) -> Result<(), AppError>;
    fn undo(&self, library: &mut Library<S>) -> Result<(), AppError>;
}

/// 書籍を1冊追加するコマンド。undoはID一致による削除で、execute前の状態に正確に戻る。
#[derive(Debug, Clone)]
pub struct AddBookCommand {
    book: Book,
}

impl AddBookCommand {
    pub fn new(book: Book) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }
}

impl<S: StorageBackend> Command<S> for AddBookCommand {
    fn execute(&self, library: &mut Library<S>) -> Result<(), AppError> {
        library.add_book(self.book.clone())
    }

    fn undo(&self, library: &mut Library<S>) -> Result<(), AppError> {
        library.remove_book(&self.book)
    }
}

/// 書籍を1冊削除するコマンド。undoは同じ書籍の再追加（末尾への復元）。
#[derive(Debug, Clone)]
pub struct RemoveBookCommand {
    book: Book,
}

impl RemoveBookCommand {
    pub fn new(book: Book) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }
}

impl<S: StorageBackend> Command<S> for RemoveBookCommand {
    fn execute(&self, library: &mut Library<S>) -> Result<(), AppError> {
        library.remove_book(&self.book)
    }

    fn undo(&self, library: &mut Library<S>) -> Result<(), AppError> {
        library.add_book(self.book.clone())
    }
}
