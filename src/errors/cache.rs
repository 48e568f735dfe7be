// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for result cache backends.
//!
//! These errors never reach callers of the service: cache reads that fail are
//! treated as misses and failed writes are logged and dropped.

/// Errors that can occur inside a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheBackendError {
    /// The backend could not be reached.
    #[error("Cache backend {backend} unavailable: {details}")]
    Unavailable {
        /// Backend name, as returned by the store's `name()`
        backend: &'static str,
        /// Details about the failure
        details: String,
    },

    /// Filesystem I/O failed for a disk-backed store.
    #[error("Cache I/O error at {path}: {details}")]
    Io {
        /// Path that caused the error
        path: String,
        /// Details about the I/O error
        details: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized for, or deserialized from, the store.
    #[error("Cache serialization error: {details}")]
    Serialization {
        /// Details about the serialization error
        details: String,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// A stored entry was present but malformed.
    #[error("Corrupt cache entry {key}: {details}")]
    Corrupt {
        /// Storage key of the entry
        key: String,
        /// What was wrong with it
        details: String,
    },
}

impl CacheBackendError {
    /// Create an `Io` error from an I/O error and path.
    pub fn io(path: impl Into<String>, details: impl Into<String>, source: std::io::Error) -> Self {
        CacheBackendError::Io {
            path: path.into(),
            details: details.into(),
            source,
        }
    }

    /// Create a `Serialization` error.
    pub fn serialization(details: impl Into<String>, source: serde_json::Error) -> Self {
        CacheBackendError::Serialization {
            details: details.into(),
            source,
        }
    }

    /// Create a `Corrupt` error for a malformed entry.
    pub fn corrupt(key: impl Into<String>, details: impl Into<String>) -> Self {
        CacheBackendError::Corrupt {
            key: key.into(),
            details: details.into(),
        }
    }
}
