mod files;
mod path;

use std::io::ErrorKind;

use thiserror::Error;

pub use files::FileStorage;
pub use path::{
    DEFAULT_FOLDER, normalize_folder, object_path, sanitize_filename, validate_object_path,
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found")]
    NotFound,
    #[error("invalid object path")]
    InvalidPath,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

/// Public URL for a stored object, served by `GET /files/{path}`.
#[must_use]
pub fn public_url(base_url: &str, object_path: &str) -> String {
    format!("{}/files/{object_path}", base_url.trim_end_matches('/'))
}
