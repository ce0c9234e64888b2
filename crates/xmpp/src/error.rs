use thiserror::Error;

#[derive(Debug, Error)]
pub enum StanzaError {
    #[error("stanza is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed stanza XML: {0}")]
    Malformed(String),

    #[error("unsupported top-level element <{0}/>")]
    Unsupported(String),

    #[error("invalid <{stanza}/> stanza: {message}")]
    Invalid {
        stanza: &'static str,
        message: String,
    },
}

impl StanzaError {
    pub(crate) fn invalid(stanza: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Invalid {
            stanza,
            message: error.to_string(),
        }
    }
}
