//! OTC Settlement errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Custody(#[from] atlas_custody::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
