use thiserror::Error;

#[derive(Error, Debug)]
pub enum UncovError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not recognise '{0}' as valid LCOV")]
    LcovParse(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, UncovError>;
