//! Failure taxonomy shared across the tracker pipeline.

use thiserror::Error;

/// Errors surfaced by the feed pipeline and its collaborators.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// An identifier failed canonical UUID validation.
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    /// An identifier stayed unbound after a dictionary refresh.
    #[error("no mapping found for {0}")]
    NotFound(String),

    /// An upstream response body was missing or malformed.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    /// An identifier was bound a second time, within one fetch or across
    /// fetches. Bindings never change for the lifetime of the process.
    #[error("duplicate mapping binding for {0}")]
    DuplicateBinding(String),

    /// A dictionary segment carried an empty id or name.
    #[error("invalid mapping entry: {0:?}")]
    InvalidEntry(String),

    /// The dictionary payload parsed to zero valid pairs.
    #[error("mapping payload contained no entries")]
    NoEntries,

    /// A feed record failed the line/field grammar.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A feed record carried a non-UUID match id.
    #[error("invalid match id: {0:?}")]
    InvalidMatchId(String),

    /// An upstream fetch failed with a transport error or non-2xx status.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// An upstream fetch exceeded the request timeout.
    #[error("fetch timed out")]
    Timeout,

    /// A component was asked to render state it never received.
    #[error("not initialized")]
    NotInitialized,
}
