use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Registration error: {0}")]
    Registration(String),

    #[error("Index '{index}' produced no key for {object}")]
    MissingIndexKey { index: String, object: String },

    #[error("Index configuration error: {0}")]
    IndexConfig(String),

    #[error("Index not found: {0}")]
    NoSuchIndex(String),

    #[error("Filter parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("Illegal operator: {0}")]
    IllegalOperator(String),

    #[error("Order-by error: {0}")]
    OrderBy(String),

    #[error("Evaluation error: {0}")]
    Eval(String),

    #[error("Authorization error: {0}")]
    Authorization(String),
}

impl CacheError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse { offset, message: message.into() }
    }

    /// True for errors produced while compiling filter or order-by text.
    #[must_use]
    pub const fn is_query_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::IllegalOperator(_) | Self::OrderBy(_))
    }

    /// True for errors that reject a store mutation.
    #[must_use]
    pub const fn is_registration_error(&self) -> bool {
        matches!(self, Self::Registration(_) | Self::MissingIndexKey { .. })
    }
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<regex::Error> for CacheError {
    fn from(e: regex::Error) -> Self {
        Self::Eval(format!("pattern: {e}"))
    }
}
