use thiserror::Error;

#[derive(Debug, Error)]
pub enum TempolensError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("tempo returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, TempolensError>;
