use super::model::book::Book;

/// 検索ストラテジー。キー文字列で実行時に選択される純粋フィルタ。
/// コレクションの変更・永続化・通知には一切関与しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// タイトル部分一致（大文字小文字を区別しない）
    Title,
    /// 著者部分一致（大文字小文字を区別しない）
    Author,
    /// 出版年の完全一致。クエリが整数として読めなければ空集合を返す。
    Year,
}

impl SearchStrategy {
    /// キー文字列から解決する。未知のキーはNone。
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(Self::Title),
            "author" => Some(Self::Author),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
        }
    }

    /// コレクションを絞り込んだ一時的な結果集合を返す。
    pub fn search<'a>(&self, books: &'a [Book], query: &str) -> Vec<&'a Book> {
        match self {
            Self::Title => {
                let q = query.to_lowercase();
                books
                    .iter()
                    .filter(|b| b.title().to_lowercase().contains(&q))
                    .collect()
            }
            Self::Author => {
                let q = query.to_lowercase();
                books
                    .iter()
                    .filter(|b| b.author().to_lowercase().contains(&q))
                    .collect()
            }
            Self::Year => match query.trim().parse::<i32>() {
                Ok(year) => books.iter().filter(|b| b.year() == year).collect(),
                Err(_) => Vec::new(),
            },
        }
    }
}

/// アクティブなストラテジーを1つだけ保持し、検索を委譲する。
#[derive(Debug, Clone)]
pub struct SearchManager {
    strategy: SearchStrategy,
}

impl SearchManager {
    pub fn new(strategy: SearchStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// ストラテジーを差し替える。いつでも可。
    pub fn set_strategy(&mut self, strategy: SearchStrategy) {
        self.strategy = strategy;
    }

    pub fn search<'a>(&self, books: &'a [Book], query: &str) -> Vec<&'a Book> {
        self.strategy.search(books, query)
    }
}
