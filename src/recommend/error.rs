use crate::gemini::CompletionError;

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("{0}")]
    Malformed(String),
    #[error("{0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl RecommendError {
    pub fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| RecommendError::Io { context, source }
    }
}

pub type RecommendResult<T> = Result<T, RecommendError>;
