/// 永続化の抽象。文字列値のキー/バリューストア。Infra層が実装する。
pub trait StorageBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error>;
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}
