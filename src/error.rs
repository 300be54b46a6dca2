//! Error types for the ARUB dashboard

use thiserror::Error;

use crate::actions::ActionError;
use crate::wallet::SessionError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Wallet error: {0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Action(#[from] ActionError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
