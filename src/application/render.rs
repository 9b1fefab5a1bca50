use std::sync::RwLock;

use crate::domain::model::book::Book;
use crate::domain::observer::ShelfObserver;

/// コレクション → 表示テキストへの変換。
pub struct ShelfRenderer;

impl ShelfRenderer {
    /// 棚全体のビュー。番号付き・挿入順の全量描画。
    pub fn render(books: &[Book]) -> String {
        if books.is_empty() {
            return "Bookshelf is empty. Add a book with `book_add`.".to_string();
        }

        let noun = if books.len() == 1 { "book" } else { "books" };
        let mut buf = format!("Bookshelf ({} {})\n\n", books.len(), noun);
        for (i, book) in books.iter().enumerate() {
            Self::render_entry(&mut buf, i + 1, book);
        }
        buf.push_str("\nRemove with `book_remove` (number or id).");
        buf
    }

    /// 検索結果の一時ビュー。Observer経路とは独立で、棚の描画バッファには触れない。
    pub fn render_results(books: &[&Book], query: &str) -> String {
        if books.is_empty() {
            return format!("No books matched '{query}'.");
        }

        let noun = if books.len() == 1 { "match" } else { "matches" };
        let mut buf = format!("{} {} for '{}':\n\n", books.len(), noun, query);
        for (i, book) in books.iter().enumerate() {
            Self::render_entry(&mut buf, i + 1, book);
        }
        buf.pop();
        buf
    }

    fn render_entry(buf: &mut String, index: usize, book: &Book) {
        buf.push_str(&format!(
            "{}. {} by {} ({})",
            index,
            book.title(),
            book.author(),
            book.year()
        ));
        if let Some(genre) = book.genre() {
            buf.push_str(&format!(" [{genre}]"));
        }
        if let Some(isbn) = book.isbn() {
            buf.push_str(&format!(" ISBN {isbn}"));
        }
        buf.push_str(&format!(" (id: {})\n", book.id().short()));
    }
}

/// 描画Observer。通知のたびに現在の描画を破棄し、リスト全体を描き直す。
pub struct RenderObserver {
    buffer: RwLock<String>,
}

impl RenderObserver {
    pub fn new() -> Self {
        Self {
            buffer: RwLock::new(ShelfRenderer::render(&[])),
        }
    }

    /// 直近に描画されたビューを返す。
    pub fn snapshot(&self) -> String {
        self.buffer.read().map(|b| b.clone()).unwrap_or_default()
    }
}

impl Default for RenderObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ShelfObserver for RenderObserver {
    fn notify(&self, books: &[Book]) {
        if let Ok(mut buf) = self.buffer.write() {
            *buf = ShelfRenderer::render(books);
        }
    }
}
