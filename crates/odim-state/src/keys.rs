//! # Public Key Store
//!
//! Sibling table to the [`IdentityRegistry`](crate::registry::IdentityRegistry),
//! keyed by the same identifier space. Written only by the registry service
//! in lock-step with link and unlink.
//!
//! Absence and `(0, 0)` are the same thing: clearing removes the entry, and
//! reading a missing entry yields the zero pair.

use std::collections::BTreeMap;

use odim_core::{Identifier, PublicKey};

/// Identifier → bound public key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicKeyStore {
    keys: BTreeMap<Identifier, PublicKey>,
}

impl PublicKeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `id`, overwriting any previous binding.
    pub fn set(&mut self, id: Identifier, key: PublicKey) {
        if key.is_zero() {
            self.keys.remove(id.as_str());
        } else {
            self.keys.insert(id, key);
        }
    }

    /// Reset `id` to the zero pair.
    pub fn clear(&mut self, id: &str) {
        self.keys.remove(id);
    }

    /// The key bound to `id`, or `(0, 0)` if none.
    pub fn get(&self, id: &str) -> PublicKey {
        self.keys.get(id).cloned().unwrap_or_default()
    }

    /// Number of non-zero bindings.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no identifier has a non-zero key.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Drop every binding.
    pub fn reset(&mut self) {
        self.keys.clear();
    }
}
