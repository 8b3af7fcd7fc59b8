//! # Proof Data Model
//!
//! A key-binding proof is Groth16-shaped: two G1 points (`a`, `c`) and one
//! G2 point (`b`), each coordinate a field element. The JSON shape matches
//! ZoKrates `proof.json`:
//!
//! ```json
//! {
//!   "proof": { "a": ["x", "y"], "b": [["x0", "x1"], ["y0", "y1"]], "c": ["x", "y"] },
//!   "inputs": ["x", "y", "x", "y"]
//! }
//! ```
//!
//! Coordinates may be decimal or `0x`-hex; they are normalized on parse.

use serde::{Deserialize, Serialize};

use odim_core::{FieldElement, PublicKey};

/// A point on the G1 curve, as affine coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[FieldElement; 2]", into = "[FieldElement; 2]")]
pub struct G1Point {
    /// X coordinate.
    pub x: FieldElement,
    /// Y coordinate.
    pub y: FieldElement,
}

impl G1Point {
    /// Create a point from its coordinates.
    pub fn new(x: FieldElement, y: FieldElement) -> Self {
        Self { x, y }
    }
}

impl From<[FieldElement; 2]> for G1Point {
    fn from([x, y]: [FieldElement; 2]) -> Self {
        Self { x, y }
    }
}

impl From<G1Point> for [FieldElement; 2] {
    fn from(p: G1Point) -> Self {
        [p.x, p.y]
    }
}

/// A point on the G2 curve. Each coordinate is an element of the quadratic
/// extension field, carried as a pair of base-field elements in the order
/// the proof tooling emitted them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[[FieldElement; 2]; 2]", into = "[[FieldElement; 2]; 2]")]
pub struct G2Point {
    /// X coordinate pair.
    pub x: [FieldElement; 2],
    /// Y coordinate pair.
    pub y: [FieldElement; 2],
}

impl G2Point {
    /// Create a point from its coordinate pairs.
    pub fn new(x: [FieldElement; 2], y: [FieldElement; 2]) -> Self {
        Self { x, y }
    }
}

impl From<[[FieldElement; 2]; 2]> for G2Point {
    fn from([x, y]: [[FieldElement; 2]; 2]) -> Self {
        Self { x, y }
    }
}

impl From<G2Point> for [[FieldElement; 2]; 2] {
    fn from(p: G2Point) -> Self {
        [p.x, p.y]
    }
}

/// A Groth16-shaped proof object. Opaque to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proof {
    /// First G1 component.
    pub a: G1Point,
    /// G2 component.
    pub b: G2Point,
    /// Second G1 component.
    pub c: G1Point,
}

/// The public-input vector handed to the verifier alongside a proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicInputs(Vec<FieldElement>);

impl PublicInputs {
    /// Wrap an input vector exactly as supplied.
    pub fn new(inputs: Vec<FieldElement>) -> Self {
        Self(inputs)
    }

    /// Build the `[x, y, x, y]` vector used by key-binding proofs.
    pub fn for_key(key: &PublicKey) -> Self {
        Self(vec![
            key.x.clone(),
            key.y.clone(),
            key.x.clone(),
            key.y.clone(),
        ])
    }

    /// The public key claimed by these inputs: the first two elements.
    ///
    /// Returns `None` when fewer than two elements were supplied.
    pub fn claimed_key(&self) -> Option<PublicKey> {
        match self.0.as_slice() {
            [x, y, ..] => Some(PublicKey::new(x.clone(), y.clone())),
            _ => None,
        }
    }

    /// Access the raw elements.
    pub fn as_slice(&self) -> &[FieldElement] {
        &self.0
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<FieldElement>> for PublicInputs {
    fn from(inputs: Vec<FieldElement>) -> Self {
        Self(inputs)
    }
}

/// A proof together with its public inputs, as written by proof tooling.
///
/// Extra top-level fields (ZoKrates writes `scheme` and `curve`) are
/// ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// The proof object.
    pub proof: Proof,
    /// Its public inputs.
    pub inputs: PublicInputs,
}

impl ProofBundle {
    /// Parse a bundle from proof-tool JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
