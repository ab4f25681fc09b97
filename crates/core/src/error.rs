// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The host's error taxonomy
//!
//! Every fallible operation in the host surfaces one of these kinds. The HTTP
//! facade maps each kind to a status code; the kinds themselves carry no
//! knowledge of HTTP.

use thiserror::Error;

/// Coarse classification of why an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing multipart data, unparseable JSON.
    BadRequest,
    /// The capacity gate refused a reservation.
    CapacityExceeded,
    /// A task id or result file does not exist.
    NotFound,
    /// Disk I/O failure, unable to create a task directory, blob store failure.
    Internal,
}

impl ErrorKind {
    /// The HTTP status code this kind maps to.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::CapacityExceeded => 503,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }
}

/// An error surfaced from the host's own operation (as opposed to a callback
/// failure, which is persisted into a task's `error` file and never raised as
/// a Rust error).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn capacity_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CapacityExceeded, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
