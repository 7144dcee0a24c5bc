use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("bundled asset `{0}` is missing")]
    MissingAsset(String),
    #[error("bundled asset `{name}` is malformed: {reason}")]
    MalformedAsset { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
