use std::path::Path;
use std::sync::Arc;

use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Size of the built-in payload when no file is supplied.
pub const DEFAULT_PAYLOAD_BYTES: usize = 64 * 1024;

const BYTES_PER_KB: usize = 1024;

/// Request body bytes, loaded once at startup and shared read-only across
/// every worker.
#[derive(Debug, Clone)]
pub struct Payload {
    bytes: Arc<[u8]>,
    description: String,
}

impl Payload {
    /// Reads the payload from a file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is empty.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let bytes = std::fs::read(path).map_err(|err| {
            AppError::http(HttpError::ReadPayload {
                path: path.to_path_buf(),
                source: err,
            })
        })?;
        if bytes.is_empty() {
            return Err(AppError::http(HttpError::PayloadEmpty {
                path: path.to_path_buf(),
            }));
        }
        let description = format!("{} ({} KB)", path.display(), kb(bytes.len()));
        Ok(Self {
            bytes: bytes.into(),
            description,
        })
    }

    /// Builds the built-in payload buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when `size` is zero.
    pub fn generated(size: usize) -> AppResult<Self> {
        if size == 0 {
            return Err(AppError::validation(ValidationError::PayloadSizeZero));
        }
        let bytes: Vec<u8> = (0..size).map(|i| u8::try_from(i & 0xFF).unwrap_or(0)).collect();
        let description = format!("built-in ({} KB)", kb(size));
        Ok(Self {
            bytes: bytes.into(),
            description,
        })
    }

    #[must_use]
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn announce(&self) {
        println!("Loaded payload: {}", self.description);
    }
}

fn kb(bytes: usize) -> usize {
    bytes.checked_div(BYTES_PER_KB).unwrap_or(0)
}
