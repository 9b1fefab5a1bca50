use super::model::book::Book;

/// Library変更通知の受け手。
/// add/removeが成功するたびに、現在のコレクション全体を同期的に受け取る。
pub trait ShelfObserver: Send + Sync {
    fn notify(&self, books: &[Book]);
}
