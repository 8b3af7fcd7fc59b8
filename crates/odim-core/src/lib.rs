//! # odim-core — Foundational Types for the ODIM Registry
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Identifier` and
//!    `FieldElement` have validated constructors. The empty string is the
//!    registry's "no next identity" sentinel and can never be an `Identifier`.
//!
//! 2. **Canonical field-element encoding.** A `FieldElement` is always held
//!    in canonical decimal form, so two encodings of the same number compare
//!    equal and digest identically.
//!
//! 3. **`CanonicalBytes` newtype.** All digest computation flows through
//!    `CanonicalBytes::new()` (RFC 8785 JCS). Registry state digests are
//!    reproducible byte-for-byte by independent replays.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `odim-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod field;
pub mod identity;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, FieldElementError, IdentifierError, OdimError};
pub use field::{FieldElement, PublicKey};
pub use identity::Identifier;
