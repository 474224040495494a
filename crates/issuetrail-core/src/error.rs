use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown report shape: {0} (expected reference, detail or full)")]
    UnknownShape(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
