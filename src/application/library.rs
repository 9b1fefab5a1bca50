use std::sync::Arc;

use crate::domain::model::book::Book;
use crate::domain::model::shelf::Shelf;
use crate::domain::observer::ShelfObserver;
use crate::domain::storage::StorageBackend;

use super::error::AppError;

/// 書籍コレクションの管理者。コレクション本体・永続化・Observer通知を担う。
///
/// 永続化スナップショットは構築時に一度だけ読み込み、以後は
/// add/removeのたびに全量を書き戻す。ストレージキーは構築時に注入する。
pub struct Library<S: StorageBackend> {
    store: S,
    storage_key: String,
    shelf: Shelf,
    observers: Vec<Arc<dyn ShelfObserver>>,
}

impl<S: StorageBackend> Library<S> {
    /// ストアから既存スナップショットを読み込んでLibraryを開く。
    ///
    /// スナップショットの状態で3通りに分岐する:
    /// - キーなし → 空のコレクション
    /// - JSONとして壊れている → エラーログを出し、キーを削除して空から開始
    /// - JSONだが書籍配列の形状でない → エラーログのみ（値は残す）、空から開始
    ///
    /// いずれもエラーにはしない。Errになるのはバックエンド自体のI/O失敗のみ。
    pub fn open(store: S, storage_key: impl Into<String>) -> Result<Self, AppError> {
        let storage_key = storage_key.into();
        let shelf = Self::load_snapshot(&store, &storage_key)?;
        Ok(Self {
            store,
            storage_key,
            shelf,
            observers: Vec::new(),
        })
    }

    /// Observerを登録する。重複チェックは行わない。
    /// 同じObserverを2回attachすると、イベントごとに2回通知される。
    pub fn attach(&mut self, observer: Arc<dyn ShelfObserver>) {
        self.observers.push(observer);
    }

    /// Observerを同一性（ポインタ一致）で取り除く。
    pub fn detach(&mut self, observer: &Arc<dyn ShelfObserver>) {
        self.observers.retain(|o| !Arc::ptr_eq(o, observer));
    }

    /// 末尾に追加 → 全量永続化 → 登録順に同期通知。
    pub fn add_book(&mut self, book: Book) -> Result<(), AppError> {
        self.shelf.add(book);
        self.persist()?;
        self.notify_observers();
        Ok(())
    }

    /// `book.id` に一致する全エントリを取り除く。一致が無くても永続化と通知は行う。
    pub fn remove_book(&mut self, book: &Book) -> Result<(), AppError> {
        self.shelf.remove_by_id(book.id());
        self.persist()?;
        self.notify_observers();
        Ok(())
    }

    /// 現在のコレクションの読み取り専用ビュー。
    pub fn books(&self) -> &[Book] {
        self.shelf.books()
    }

    pub fn book_count(&self) -> usize {
        self.shelf.len()
    }

    // --- private ---

    fn load_snapshot(store: &S, key: &str) -> Result<Shelf, AppError> {
        let Some(raw) = store
            .read(key)
            .map_err(|e| AppError::Storage(Box::new(e)))?
        else {
            return Ok(Shelf::new());
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(key, error = %e, "corrupt snapshot, clearing stored value");
                store
                    .remove(key)
                    .map_err(|e| AppError::Storage(Box::new(e)))?;
                return Ok(Shelf::new());
            }
        };

        match serde_json::from_value::<Shelf>(value) {
            Ok(shelf) => Ok(shelf),
            Err(e) => {
                tracing::error!(key, error = %e, "malformed snapshot, starting empty (stored value kept)");
                Ok(Shelf::new())
            }
        }
    }

    fn persist(&self) -> Result<(), AppError> {
        let json =
            serde_json::to_string(&self.shelf).map_err(|e| AppError::Storage(Box::new(e)))?;
        self.store
            .write(&self.storage_key, &json)
            .map_err(|e| AppError::Storage(Box::new(e)))
    }

    fn notify_observers(&self) {
        for observer in &self.observers {
            observer.notify(self.shelf.books());
        }
    }
}
