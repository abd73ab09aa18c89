// Copyright 2026 the Lucent Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend failures.

use std::fmt;

use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

/// Errors from the X11 backend.
///
/// Protocol errors against individual resources are not reported here; they
/// arrive as [`Event::Error`](lucent_core::event::Event::Error).
#[derive(Debug)]
pub enum BackendError {
    /// Opening the display failed.
    Connect(ConnectError),
    /// The connection broke.
    Connection(ConnectionError),
    /// A request needed during startup was refused.
    Reply(ReplyError),
    /// The server ran out of resource identifiers for this client.
    IdsExhausted,
    /// A required extension or format is missing.
    MissingCapability(&'static str),
    /// Another compositing manager owns the selection.
    AlreadyRunning {
        /// Name of the owning client, if it set one.
        owner: String,
    },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "cannot open display: {e}"),
            Self::Connection(e) => write!(f, "display connection failed: {e}"),
            Self::Reply(e) => write!(f, "request failed: {e}"),
            Self::IdsExhausted => f.write_str("out of resource identifiers"),
            Self::MissingCapability(what) => write!(f, "no {what} on this display"),
            Self::AlreadyRunning { owner } => {
                write!(f, "another composite manager is already running ({owner})")
            }
        }
    }
}

impl core::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Connect(e) => Some(e),
            Self::Connection(e) => Some(e),
            Self::Reply(e) => Some(e),
            Self::IdsExhausted | Self::MissingCapability(_) | Self::AlreadyRunning { .. } => None,
        }
    }
}

impl From<ConnectError> for BackendError {
    fn from(e: ConnectError) -> Self {
        Self::Connect(e)
    }
}

impl From<ConnectionError> for BackendError {
    fn from(e: ConnectionError) -> Self {
        Self::Connection(e)
    }
}

impl From<ReplyError> for BackendError {
    fn from(e: ReplyError) -> Self {
        match e {
            ReplyError::ConnectionError(e) => Self::Connection(e),
            other => Self::Reply(other),
        }
    }
}

impl From<ReplyOrIdError> for BackendError {
    fn from(e: ReplyOrIdError) -> Self {
        match e {
            ReplyOrIdError::IdsExhausted => Self::IdsExhausted,
            ReplyOrIdError::ConnectionError(e) => Self::Connection(e),
            ReplyOrIdError::X11Error(e) => Self::Reply(ReplyError::X11Error(e)),
        }
    }
}
