//! # Error Types
//!
//! This module defines error types used throughout the quickqr library.

use thiserror::Error;

/// Main error type for quickqr operations
#[derive(Debug, Error)]
pub enum QuickQrError {
    /// The symbol encoder rejected the payload (usually too long for the
    /// chosen error-correction level)
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Rasterization, color or image serialization failure
    #[error("Render error: {0}")]
    Render(String),

    /// Request fields outside their accepted ranges
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Malformed configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
