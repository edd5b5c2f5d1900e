use reqwest::StatusCode;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
    sync::Arc,
};
use tracing::debug;

/// Cloneable error so it can travel inside iced messages.
#[derive(Debug, Clone)]
pub struct Error {
    inner: Arc<anyhow::Error>,
}

impl<E> From<E> for Error
where
    E: StdError + Send + Sync + 'static,
{
    #[cold]
    fn from(error: E) -> Self {
        debug!("`{error}`");
        Self {
            inner: Arc::new(error.into()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl Error {
    pub fn api(&self) -> Option<&ApiError> {
        self.inner.downcast_ref()
    }

    /// The server rejected our bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.api(), Some(ApiError::Unauthorized))
    }

    /// Server-provided reason if there is one, else the whole error.
    pub fn detail(&self) -> String {
        match self.api() {
            Some(ApiError::Status { detail, .. }) => detail.clone(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Unauthorized,
    Status { status: StatusCode, detail: String },
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Status { status, detail } => write!(f, "request failed ({status}): {detail}"),
        }
    }
}

impl StdError for ApiError {}

macro_rules! anyio {
    ($($tt:tt)*) => {
        $crate::utils::Error::from(std::io::Error::other(format!($($tt)*)))
    };
}

pub(crate) use anyio;

pub type Result<T, E = Error> = std::result::Result<T, E>;
