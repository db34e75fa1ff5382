use thiserror::Error;

/// Errors from payload encoding and decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The gzip encoder failed to write its output.
    #[error("gzip compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// The input is not a valid gzip stream.
    #[error("invalid gzip stream: {0}")]
    Decode(#[source] std::io::Error),

    /// Text cannot be represented in, or bytes are not valid in, the
    /// requested character encoding.
    #[error("text is not valid {encoding}")]
    CharacterEncoding { encoding: &'static str },

    /// A line of a JSON Lines document is not valid JSON for the target type.
    #[error("malformed JSON on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The outermost value handed to the JSON Lines encoder is not an array.
    #[error("JSON Lines documents must be built from a sequence, got {0}")]
    NotASequence(&'static str),

    /// A value could not be serialized to JSON.
    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl From<std::string::FromUtf8Error> for CodecError {
    fn from(_: std::string::FromUtf8Error) -> Self {
        CodecError::CharacterEncoding { encoding: "UTF-8" }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
