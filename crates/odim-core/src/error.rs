//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the ODIM workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Registry operation failures live next to the registry in `odim-state`;
//! proof verifier failures live in `odim-zkp`. This module holds the
//! primitive-parsing errors and the top-level [`OdimError`] that wraps them.

use thiserror::Error;

/// Top-level error type for ODIM primitives.
#[derive(Error, Debug)]
pub enum OdimError {
    /// An identifier string was rejected.
    #[error("identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    /// A field element string was rejected.
    #[error("field element error: {0}")]
    FieldElement(#[from] FieldElementError),

    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error constructing an [`Identifier`](crate::Identifier).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The empty string is reserved as the "no next identity" sentinel.
    #[error("identifier must not be empty")]
    Empty,
}

/// Error parsing a [`FieldElement`](crate::FieldElement).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldElementError {
    /// No digits were supplied.
    #[error("field element must not be empty")]
    Empty,

    /// A non-digit character was found. Grouping separators (`,`, `_`),
    /// signs, and whitespace are all rejected.
    #[error("field element contains invalid character {character:?} at position {position}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
        /// Byte offset of the character in the input.
        position: usize,
    },

    /// The value does not fit in 256 bits.
    #[error("field element exceeds 256 bits: {0}")]
    Overflow(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
