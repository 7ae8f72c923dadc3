//! Error types for the pattern tree and matcher.
//!
//! Three kinds of failure are distinguished, matching the three ways this crate can fail to do its
//! job: a usage description that cannot be turned into a consistent tree, an argument vector that
//! does not satisfy an otherwise-valid tree, and an internal invariant violation that indicates a
//! bug in this crate rather than in caller-supplied data.

use std::fmt;

use thiserror::Error;

/// Errors produced while building or matching a pattern tree.
#[derive(Debug, Error)]
pub enum Error {
    /// The usage description could not be fixed into a consistent tree, e.g. an option's inline
    /// value spelling in a usage line disagreed with its declared value positions.
    #[error("usage grammar error: {0}")]
    UsageGrammar(String),

    /// A `--long=value` (or clustered `-xvalue`) option's value-ref failed to fully consume its
    /// attached value, or the argument vector otherwise failed to satisfy the tree.
    #[error("usage exit: {0}")]
    UsageExit(String),
}

impl Error {
    pub fn usage_grammar(msg: impl Into<String>) -> Self {
        Error::UsageGrammar(msg.into())
    }

    pub fn usage_exit(msg: impl Into<String>) -> Self {
        Error::UsageExit(msg.into())
    }
}

/// Panics for conditions that indicate a defect in this crate, not in caller data.
///
/// These are never `Result` variants: once `fixup::build` has succeeded, no valid argv can
/// trigger them. They exist to fail loudly and close to the cause rather than silently
/// misbehaving (e.g. reading the value of an `Either` that has not yet committed a branch).
pub(crate) fn bug(msg: impl fmt::Display) -> ! {
    panic!("internal invariant violation: {}", msg);
}

pub type Result<T> = std::result::Result<T, Error>;
