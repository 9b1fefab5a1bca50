use serde::{Deserialize, Serialize};

use super::id::BookId;

/// 書籍レコード。構築後は不変で、同一性は `id` のみで判定する。
/// 永続化スナップショットにはこのフィールドがそのまま書かれる
/// （バージョンタグなし、任意フィールドは省略）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    isbn: Option<String>,
}

impl Book {
    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }
}

/// Bookのfluentビルダー。必須フィールドはコンストラクタで受け取り、
/// 任意フィールドはチェーンで設定する。検証は行わない（呼び出し側の責務）。
#[derive(Debug, Clone)]
pub struct BookBuilder {
    id: BookId,
    title: String,
    author: String,
    year: i32,
    genre: Option<String>,
    isbn: Option<String>,
}

impl BookBuilder {
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            year,
            genre: None,
            isbn: None,
        }
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    /// 呼び出し時点のビルダー状態をスナップショットしたBookを返す。
    pub fn build(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            year: self.year,
            genre: self.genre,
            isbn: self.isbn,
        }
    }
}
