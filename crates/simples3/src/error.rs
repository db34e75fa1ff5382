use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("codec error: {0}")]
    Codec(#[from] simples3_codec::CodecError),

    #[error("store error: {0}")]
    Store(#[from] simples3_store::StoreError),

    /// A single JSON value was requested from a document with no lines.
    #[error("JSON document at {key} is empty")]
    EmptyDocument { key: String },
}

impl ClientError {
    /// Whether this error means the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(simples3_store::StoreError::NotFound { .. }))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
