use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("save file io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed save record: {0}")]
    Json(#[from] serde_json::Error),
}
