//! Error types for registry snapshot queries.
//!
//! Absence of a key, value or meta attribute is never an error: those queries
//! return `None` or an empty list. The variants here cover the remaining
//! outcomes a caller has to tell apart: the snapshot could not be read, the
//! Windows version could not be resolved, or a value exists but cannot be
//! mapped onto its domain type.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while reading a registry snapshot.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The snapshot file could not be opened or read.
    #[error("cannot read registry file '{}': {source}", path.display())]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Every resolution tier was exhausted without producing a version.
    #[error("Windows version undetermined for installation '{}'", root.display())]
    WindowsVersionUndetermined {
        /// Installation root that was inspected.
        root: PathBuf,
    },

    /// The `arch` meta attribute is missing or not one of `win32` / `win64`.
    #[error("unrecognized architecture: {0:?}")]
    UnrecognizedArchitecture(String),

    /// A value is present but cannot be mapped onto the expected type.
    #[error("malformed value {name:?} under {key}: {value:?} (expected {expected})")]
    MalformedValue {
        /// Key path the value was read from.
        key: String,
        /// Value name.
        name: String,
        /// Raw value text as found in the file.
        value: String,
        /// Description of what was expected.
        expected: &'static str,
    },

    /// Invalid UTF-16 payload inside a `hex(2)` / `hex(7)` value.
    #[error("invalid UTF-16 data in value {name:?}")]
    InvalidUtf16 {
        /// Value name.
        name: String,
    },
}

impl RegistryError {
    /// Creates an I/O error tied to the file it happened on.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the file being read
    /// * `source` - Underlying I/O error
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Creates an undetermined-version error for an installation root.
    pub fn undetermined(root: &Path) -> Self {
        Self::WindowsVersionUndetermined {
            root: root.to_path_buf(),
        }
    }

    /// Creates an unrecognized architecture error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bottle_reg::error::RegistryError;
    /// let err = RegistryError::unrecognized_architecture(Some("arm64"));
    /// assert!(err.is_malformed());
    /// ```
    pub fn unrecognized_architecture(raw: Option<&str>) -> Self {
        Self::UnrecognizedArchitecture(raw.unwrap_or_default().to_string())
    }

    /// Creates a malformed value error with context.
    ///
    /// # Arguments
    ///
    /// * `key` - Key path the value lives under
    /// * `name` - Value name
    /// * `value` - Offending raw value
    /// * `expected` - What the accessor was expecting
    pub fn malformed(key: &str, name: &str, value: &str, expected: &'static str) -> Self {
        Self::MalformedValue {
            key: key.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    /// Returns true if the snapshot file itself could not be read.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if the version resolver ran out of tiers.
    pub fn is_undetermined(&self) -> bool {
        matches!(self, Self::WindowsVersionUndetermined { .. })
    }

    /// Returns true if a value was present but could not be interpreted.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::UnrecognizedArchitecture(_) | Self::MalformedValue { .. } | Self::InvalidUtf16 { .. }
        )
    }
}
