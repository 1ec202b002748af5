//! Error types for parsing and rendering.

use std::str::Utf8Error;

use crate::options::{Options, Phase};

/// Error returned when input cannot be turned into a document tree.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Byte input is not UTF-8 and [`Options::VALIDATE_UTF8`] was not set.
    #[error("input is not valid UTF-8")]
    InvalidUtf8(#[from] Utf8Error),
}

/// Error returned when a document tree cannot be serialized.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Wrap width below zero.
    #[error("wrap width must not be negative, got {0}")]
    NegativeWidth(i32),

    /// Writing to the output buffer failed.
    #[error("failed to write output")]
    Format(#[from] std::fmt::Error),
}

/// Error returned by [`Options::validate`].
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// Flags that belong to the other phase.
    #[error("options {flags:?} do not apply to the {phase} phase")]
    WrongPhase {
        /// The offending flags.
        flags: Options,
        /// The phase they were supplied for.
        phase: Phase,
    },
}
