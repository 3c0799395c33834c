#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl From<Error> for mackerelfs_core::Error {
    fn from(error: Error) -> Self {
        mackerelfs_core::Error::upstream(error)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
