//! # Field Elements and Public Keys
//!
//! Public-key coordinates and proof public inputs cross the registry
//! boundary as field elements. Off-chain key tooling emits them as decimal
//! strings with no grouping separators; proof tooling (ZoKrates) emits
//! `0x`-prefixed hex. Both parse into the same canonical value.
//!
//! ## Canonical Form
//!
//! A `FieldElement` holds a 256-bit unsigned integer (`alloy_primitives::U256`)
//! and always renders as a canonical decimal string: ASCII digits only, no
//! sign, no leading zeros except for `"0"` itself. Reduction modulo a specific curve's field is the
//! verifier's concern, not the registry's.

use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::FieldElementError;

/// A 256-bit unsigned field element.
///
/// Serialized as its canonical decimal string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldElement(U256);

impl FieldElement {
    /// The zero element.
    pub fn zero() -> Self {
        Self(U256::ZERO)
    }

    /// Whether this element is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a field element from a decimal string or a `0x`-prefixed hex
    /// string. Leading zeros are normalized away.
    ///
    /// # Errors
    ///
    /// Returns [`FieldElementError::InvalidCharacter`] for separators,
    /// signs, or whitespace, and [`FieldElementError::Overflow`] for values
    /// of 2^256 or above.
    pub fn parse(s: &str) -> Result<Self, FieldElementError> {
        match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => Self::parse_radix(hex, 16, 2).map_err(|e| match e {
                FieldElementError::Overflow(_) => FieldElementError::Overflow(s.to_string()),
                other => other,
            }),
            None => Self::parse_radix(s, 10, 0),
        }
    }

    /// `U256::from_str_radix` skips `_`, so every character is checked
    /// against the radix before the conversion.
    fn parse_radix(digits: &str, radix: u32, offset: usize) -> Result<Self, FieldElementError> {
        if digits.is_empty() {
            return Err(FieldElementError::Empty);
        }
        if let Some((position, character)) =
            digits.char_indices().find(|(_, c)| !c.is_digit(radix))
        {
            return Err(FieldElementError::InvalidCharacter {
                character,
                position: position + offset,
            });
        }
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            return Ok(Self::zero());
        }
        U256::from_str_radix(trimmed, u64::from(radix))
            .map(Self)
            .map_err(|_| FieldElementError::Overflow(digits.to_string()))
    }

    /// Build a field element from a 32-byte big-endian integer.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }

    /// Render the value as a 32-byte big-endian integer.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    /// The underlying integer.
    pub fn as_uint(&self) -> &U256 {
        &self.0
    }
}

impl From<U256> for FieldElement {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for FieldElement {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl TryFrom<String> for FieldElement {
    type Error = FieldElementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl FromStr for FieldElement {
    type Err = FieldElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<FieldElement> for String {
    fn from(fe: FieldElement) -> Self {
        fe.to_string()
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A claimed public key as a pair of field-element coordinates.
///
/// `(0, 0)` means "no public key". It is what the key store returns for any
/// identifier that was never bound or has been removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    /// X coordinate.
    pub x: FieldElement,
    /// Y coordinate.
    pub y: FieldElement,
}

impl PublicKey {
    /// Create a public key from its coordinates.
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y }
    }

    /// The `(0, 0)` pair.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether both coordinates are zero.
    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
