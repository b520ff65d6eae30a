//! Error handling for the renderer updater
//!
//! Two layers, the same way the rest of the crate is built:
//! - [`UpdateError`] is the strongly-typed failure of one pipeline step. It is
//!   what [`UpdateOutcome::Failed`](crate::updater::UpdateOutcome::Failed) carries, so
//!   callers and tests can match on *why* an update did not happen.
//! - [`ErrorContext`] wraps an error with a suggestion and details for the
//!   host binary, rendered with terminal colors.
//!
//! Helpers that only touch the file system return `anyhow::Result` with
//! `.context()`; the pipeline converts those into [`UpdateError::FileSystem`]
//! at its boundary.
//!
//! # Examples
//!
//! ```rust,no_run
//! use render_updater::core::{UpdateError, user_friendly_error};
//!
//! let err = UpdateError::ChecksumMismatch {
//!     expected: "abc".to_string(),
//!     actual: "def".to_string(),
//! };
//! user_friendly_error(anyhow::Error::from(err)).display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// A failed step of the hot-update pipeline.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The request never produced a response (DNS, TLS, connection reset, ...).
    #[error("Network request to {url} failed: {reason}")]
    Network {
        /// Requested URL
        url: String,
        /// Transport error message
        reason: String,
    },

    /// The release host answered with a non-success status.
    #[error("Release host returned HTTP {status} for {url}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// A release descriptor or manifest could not be decoded.
    #[error("Failed to parse {what}: {reason}")]
    Parse {
        /// What was being parsed (e.g. "release list", "manifest.yml")
        what: String,
        /// Decoder error message
        reason: String,
    },

    /// The release list was empty, so no tag could be selected.
    #[error("No releases published for {repo}")]
    NoReleases {
        /// `owner/repo`
        repo: String,
    },

    /// The manifest decoded but its content cannot be used safely.
    #[error("Invalid release manifest: {reason}")]
    InvalidManifest {
        /// Why the manifest was rejected
        reason: String,
    },

    /// The downloaded archive does not hash to the manifest digest.
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Digest declared by the manifest
        expected: String,
        /// Digest of the downloaded bytes
        actual: String,
    },

    /// The archive unpacked without the expected top-level directory.
    #[error("Archive did not contain the '{expected}' directory")]
    ArchiveLayout {
        /// Directory name the archive should have produced
        expected: String,
    },

    /// Decompressing or unpacking the archive failed.
    #[error("Failed to extract {archive}: {reason}")]
    Extraction {
        /// Archive path
        archive: String,
        /// Underlying error message
        reason: String,
    },

    /// A file-system step failed (create, rename, write, remove).
    #[error("File system operation '{operation}' failed: {reason}")]
    FileSystem {
        /// What the pipeline was doing
        operation: String,
        /// Underlying error chain, flattened
        reason: String,
    },

    /// The update lock could not be opened.
    #[error("Failed to open update lock at {path}: {reason}")]
    Lock {
        /// Lock file path
        path: String,
        /// Underlying error message
        reason: String,
    },

    /// The bundle was installed but there is no window to tell about it.
    ///
    /// The files stay in place; the next launch loads them through the
    /// entry resolver.
    #[error("Renderer {version} installed but no application window is available to reload")]
    NoWindow {
        /// Installed version
        version: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },
}

impl UpdateError {
    /// Wrap an `anyhow` error from a file-system helper.
    pub fn file_system(operation: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            reason: format!("{error:#}"),
        }
    }

    /// Whether the failure came from the network or the release host.
    ///
    /// These are expected to clear up by themselves; the next scheduled run
    /// simply tries again.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::HttpStatus { .. } | Self::Parse { .. })
    }
}

/// An error plus the hints shown to the person running the host binary.
#[derive(Debug)]
pub struct ErrorContext {
    /// Rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no suggestion or details.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with hints where we have them.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(update_error) = error.downcast_ref::<UpdateError>() {
        return context_for(update_error);
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(format!("Invalid configuration file: {toml_error}"))
            .with_suggestion("Check the TOML syntax of the updater configuration file");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(format!("{error:#}"))
            .with_suggestion("Check ownership and permissions of the update directory");
    }

    ErrorContext::new(format!("{error:#}"))
}

fn context_for(error: &UpdateError) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());
    match error {
        UpdateError::Network { .. } | UpdateError::HttpStatus { .. } => ctx
            .with_suggestion("Check your network connection or configure a proxy with `proxy = \"http://host:port\"`")
            .with_details("The renderer keeps running the currently installed bundle"),
        UpdateError::ChecksumMismatch { .. } => ctx
            .with_suggestion("Retry later; if it persists the release asset may be corrupted")
            .with_details("The downloaded archive was left on disk and not applied"),
        UpdateError::NoReleases { .. } => ctx
            .with_suggestion("Check the `owner` and `repo` settings in the configuration"),
        UpdateError::NoWindow { .. } => ctx
            .with_details("The new bundle will be loaded on the next launch"),
        UpdateError::Lock { .. } => ctx
            .with_suggestion("Make sure the parent of the update root is writable"),
        UpdateError::Config { .. } => ctx
            .with_suggestion("Run `render-updater config` to print the effective configuration"),
        _ => ctx,
    }
}
