//! Crate-wide error type.
//!
//! Every failure here is a silent degradation from the user's point of view;
//! callers decide whether to log and continue or to stop the current handler.

/// Errors produced by the bootstrap.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BootError {
    /// The CSRF `<meta>` element or its `content` attribute is absent.
    #[error("security token element is missing")]
    MissingToken,
    /// An element the markup is expected to provide was not found.
    #[error("required element not found: {0}")]
    MissingElement(String),
    /// The key-value store is disabled or inaccessible.
    #[error("persistent storage is unavailable")]
    StorageUnavailable,
    /// The store rejected a read or write (quota, security error).
    #[error("storage operation failed: {0}")]
    Storage(String),
    /// Opening or driving the transport failed.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The page-embedded configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A browser API call threw.
    #[error("browser call failed: {0}")]
    Dom(String),
    /// No `window`/`document` (not running in a browser).
    #[error("browser window is not available")]
    NoWindow,
}
