// MediaGit - Git for Media Files
// Copyright (C) 2025 MediaGit Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Error kinds for the Git-compatible streaming packfile indexer
//!
//! One variant family per error kind in the design: parse, delta, io,
//! limit, state and cancelled. All are terminal: once returned, the
//! owning `PackIndexer` has already transitioned to `Failed`.

use thiserror::Error;

/// Errors raised while indexing a packfile stream.
#[derive(Debug, Error)]
pub enum PackIndexError {
    /// Malformed bytes in the pack stream itself.
    #[error("pack stream parse error at position {position}: {reason}")]
    Parse {
        /// Byte offset within the pack where the problem was detected.
        position: u64,
        /// Human-readable description of what went wrong.
        reason: String,
    },

    /// A delta could not be resolved into final content.
    #[error("delta resolution error: {reason}")]
    Delta {
        /// Human-readable description of what went wrong.
        reason: String,
    },

    /// Underlying I/O failure (write, read, mmap, unlink).
    #[error("pack indexer I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured or implicit limit was exceeded.
    #[error("pack indexer limit exceeded: {reason}")]
    Limit {
        /// Human-readable description of the limit that was hit.
        reason: String,
    },

    /// An operation was invoked in the wrong lifecycle state.
    #[error("invalid operation for indexer state {state}: {operation}")]
    State {
        /// The state the indexer was in when the call was rejected.
        state: &'static str,
        /// The operation that was rejected.
        operation: &'static str,
    },

    /// The progress observer requested an abort.
    #[error("operation cancelled by progress observer")]
    Cancelled,

    /// Catch-all for collaborator errors (e.g. an object-store lookup)
    /// that only need to compose with this error type, not be matched
    /// on by §7 kind.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PackIndexError {
    pub(crate) fn parse(position: u64, reason: impl Into<String>) -> Self {
        PackIndexError::Parse {
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn delta(reason: impl Into<String>) -> Self {
        PackIndexError::Delta {
            reason: reason.into(),
        }
    }

    pub(crate) fn limit(reason: impl Into<String>) -> Self {
        PackIndexError::Limit {
            reason: reason.into(),
        }
    }

    pub(crate) fn state(state: &'static str, operation: &'static str) -> Self {
        PackIndexError::State { state, operation }
    }

    /// Whether this error kind is the external-observer cancellation kind.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PackIndexError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, PackIndexError>;
