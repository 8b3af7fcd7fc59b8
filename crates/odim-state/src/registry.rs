//! # Identity Registry — Circular Identity Lists
//!
//! Each principal owns a circular singly-linked list of the identities it
//! has bound, anchored at the principal itself:
//!
//! ```text
//!   P ──▶ X4 ──▶ X3 ──▶ X2 ──▶ X1 ──┐
//!   ▲                               │
//!   └───────────────────────────────┘
//! ```
//!
//! ## Representation
//!
//! Identifiers are interned into [`IdentityHandle`]s (indices into a node
//! arena). Each node holds one `next` handle and its [`NodeRole`]. The
//! "global registration set" is every node whose `next` is set.
//!
//! | `next(P)` | Meaning |
//! |---|---|
//! | unset | P has never anchored a cycle (the `""` sentinel) |
//! | `P` | self-loop: P is registered but currently has no identities |
//! | `X` | X is P's most recently added identity |
//!
//! ## Plan / Commit
//!
//! Mutations are split into a pure planning step that checks every
//! precondition and a commit step that cannot fail. The service plans,
//! consults the proof verifier, then commits, so a rejection at any point
//! leaves no trace. Planning never interns; a rejected operation does not
//! even grow the arena.
//!
//! ## Complexity
//!
//! `next_of`, `is_registered`, and linking are O(1). Unlinking walks the
//! owner's cycle to find the target's predecessor (there are no back
//! pointers), so it is O(k) in the owner's identity count. Per-principal
//! counts are expected to be small.
//!
//! Interned handles are never freed. An identifier that is unlinked keeps
//! its arena slot with `next` unset.

use std::collections::HashMap;

use odim_core::Identifier;

use crate::error::RegistryError;

/// Index of an interned identifier in the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityHandle(u32);

impl IdentityHandle {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The part a node currently plays in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Not linked into any cycle.
    Unlinked,
    /// Owns a cycle (possibly the empty self-loop).
    Anchor,
    /// Linked into some anchor's cycle.
    Member,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlinked => write!(f, "UNLINKED"),
            Self::Anchor => write!(f, "ANCHOR"),
            Self::Member => write!(f, "MEMBER"),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    id: Identifier,
    next: Option<IdentityHandle>,
    role: NodeRole,
}

/// A validated, not-yet-applied link of `identity` into `owner`'s cycle.
///
/// Only [`IdentityRegistry::plan_link`] creates one, and only
/// [`IdentityRegistry::commit_link`] consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a plan does nothing until committed"]
pub struct LinkPlan {
    owner: Identifier,
    identity: Identifier,
}

impl LinkPlan {
    /// The principal whose cycle grows.
    pub fn owner(&self) -> &Identifier {
        &self.owner
    }

    /// The identity being linked.
    pub fn identity(&self) -> &Identifier {
        &self.identity
    }
}

/// A validated, not-yet-applied removal of `target` from its owner's cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a plan does nothing until committed"]
pub struct UnlinkPlan {
    predecessor: IdentityHandle,
    target: IdentityHandle,
    successor: IdentityHandle,
    steps: usize,
}

impl UnlinkPlan {
    /// How many `next` hops the predecessor scan took.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

/// The forest of per-principal identity cycles.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    handles: HashMap<Identifier, IdentityHandle>,
    nodes: Vec<Node>,
}

impl IdentityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cycle and interned identifier.
    pub fn reset(&mut self) {
        self.handles.clear();
        self.nodes.clear();
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Look up an identifier's handle without interning it.
    pub fn handle(&self, id: &str) -> Option<IdentityHandle> {
        self.handles.get(id).copied()
    }

    /// The identifier behind a handle.
    pub fn resolve(&self, handle: IdentityHandle) -> &Identifier {
        &self.nodes[handle.index()].id
    }

    /// The identifier `next` points at, or `None` for the empty sentinel.
    pub fn next_of(&self, id: &str) -> Option<&Identifier> {
        let node = self.node(id)?;
        node.next.map(|next| self.resolve(next))
    }

    /// Whether `id` is in the global registration set.
    pub fn is_registered(&self, id: &str) -> bool {
        self.node(id).is_some_and(|n| n.next.is_some())
    }

    /// The current role of `id`. Identifiers never seen are `Unlinked`.
    pub fn role(&self, id: &str) -> NodeRole {
        self.node(id).map_or(NodeRole::Unlinked, |n| n.role)
    }

    /// Iterate `owner`'s identities in traversal order (most recent first).
    ///
    /// Yields nothing for an unregistered owner, for the self-loop, and for
    /// an identifier that is a member rather than an anchor.
    pub fn cycle(&self, owner: &str) -> CycleIter<'_> {
        let anchor = self
            .handle(owner)
            .filter(|h| self.nodes[h.index()].role == NodeRole::Anchor);
        CycleIter {
            registry: self,
            anchor,
            cursor: anchor.and_then(|h| self.nodes[h.index()].next),
            remaining: self.nodes.len(),
        }
    }

    /// Every principal that anchors a cycle, in arena order.
    pub fn principals(&self) -> impl Iterator<Item = &Identifier> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.role == NodeRole::Anchor)
            .map(|n| &n.id)
    }

    /// Size of the global registration set (anchors plus members).
    pub fn registered_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.next.is_some()).count()
    }

    /// Number of interned identifiers, linked or not.
    pub fn interned_count(&self) -> usize {
        self.nodes.len()
    }

    // ── Linking ──────────────────────────────────────────────────────

    /// Check that `identity` may be linked into `owner`'s cycle.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyRegistered`] if `identity` is in the global
    /// set or is `owner` itself.
    pub fn plan_link(
        &self,
        owner: &Identifier,
        identity: &Identifier,
    ) -> Result<LinkPlan, RegistryError> {
        if self.is_registered(identity.as_str()) || owner == identity {
            return Err(RegistryError::AlreadyRegistered);
        }
        Ok(LinkPlan {
            owner: owner.clone(),
            identity: identity.clone(),
        })
    }

    /// Apply a link: `identity` becomes the node right after `owner`.
    ///
    /// An unregistered owner gets the two-node cycle `owner → identity →
    /// owner` and becomes an anchor. Otherwise `identity` is spliced in
    /// right after `owner`, which keeps its role: an owner that is itself a
    /// member grows the cycle it already belongs to.
    pub fn commit_link(&mut self, plan: LinkPlan) -> IdentityHandle {
        let owner = self.intern(plan.owner);
        let identity = self.intern(plan.identity);
        let successor = self.nodes[owner.index()].next.unwrap_or(owner);

        let owner_node = &mut self.nodes[owner.index()];
        owner_node.next = Some(identity);
        if owner_node.role == NodeRole::Unlinked {
            owner_node.role = NodeRole::Anchor;
        }

        let identity_node = &mut self.nodes[identity.index()];
        identity_node.next = Some(successor);
        identity_node.role = NodeRole::Member;

        identity
    }

    /// Plan and commit a link in one step.
    pub fn link_after(
        &mut self,
        owner: &Identifier,
        identity: &Identifier,
    ) -> Result<IdentityHandle, RegistryError> {
        let plan = self.plan_link(owner, identity)?;
        Ok(self.commit_link(plan))
    }

    /// Make `owner` a registered anchor with no identities (self-loop).
    ///
    /// Used when restoring a principal whose identities were all removed.
    pub(crate) fn commit_self_loop(&mut self, owner: Identifier) -> IdentityHandle {
        let handle = self.intern(owner);
        let node = &mut self.nodes[handle.index()];
        node.next = Some(handle);
        node.role = NodeRole::Anchor;
        handle
    }

    // ── Unlinking ────────────────────────────────────────────────────

    /// Locate `target` in `owner`'s cycle and plan its removal.
    ///
    /// Walks forward from `owner` tracking the predecessor until it finds
    /// the node whose `next` is `target`. O(k) in the cycle size. A member
    /// `owner` walks the cycle it belongs to.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::SenderNotRegistered`] if `owner` is not linked.
    /// - [`RegistryError::TargetNotRegistered`] if `target` is not linked.
    /// - [`RegistryError::TargetNotInCallersCycle`] if `target` is linked
    ///   elsewhere, is `owner` itself, or is an anchor. Anchors are never
    ///   unlinked.
    pub fn plan_unlink(&self, owner: &str, target: &str) -> Result<UnlinkPlan, RegistryError> {
        let owner_handle = self
            .handle(owner)
            .filter(|h| self.nodes[h.index()].next.is_some())
            .ok_or(RegistryError::SenderNotRegistered)?;
        let target_handle = self
            .handle(target)
            .filter(|h| self.nodes[h.index()].next.is_some())
            .ok_or(RegistryError::TargetNotRegistered)?;
        if target_handle == owner_handle
            || self.nodes[target_handle.index()].role == NodeRole::Anchor
        {
            return Err(RegistryError::TargetNotInCallersCycle);
        }

        let mut predecessor = owner_handle;
        let mut steps = 0;
        loop {
            let Some(current) = self.nodes[predecessor.index()].next else {
                break;
            };
            steps += 1;
            if current == target_handle {
                let successor = self.nodes[current.index()]
                    .next
                    .unwrap_or(owner_handle);
                tracing::trace!(owner, target, steps, "located removal target");
                return Ok(UnlinkPlan {
                    predecessor,
                    target: target_handle,
                    successor,
                    steps,
                });
            }
            if current == owner_handle || steps > self.nodes.len() {
                break;
            }
            predecessor = current;
        }
        Err(RegistryError::TargetNotInCallersCycle)
    }

    /// Apply a removal: splice `target` out and clear its `next`.
    ///
    /// Removing the last identity leaves the owner's self-loop.
    pub fn commit_unlink(&mut self, plan: UnlinkPlan) -> Identifier {
        self.nodes[plan.predecessor.index()].next = Some(plan.successor);
        let node = &mut self.nodes[plan.target.index()];
        node.next = None;
        node.role = NodeRole::Unlinked;
        node.id.clone()
    }

    /// Plan and commit a removal in one step.
    pub fn unlink(&mut self, owner: &str, target: &str) -> Result<Identifier, RegistryError> {
        let plan = self.plan_unlink(owner, target)?;
        Ok(self.commit_unlink(plan))
    }

    // ── Internals ────────────────────────────────────────────────────

    fn node(&self, id: &str) -> Option<&Node> {
        self.handle(id).map(|h| &self.nodes[h.index()])
    }

    fn intern(&mut self, id: Identifier) -> IdentityHandle {
        if let Some(handle) = self.handles.get(id.as_str()) {
            return *handle;
        }
        let handle = IdentityHandle(self.nodes.len() as u32);
        self.nodes.push(Node {
            id: id.clone(),
            next: None,
            role: NodeRole::Unlinked,
        });
        self.handles.insert(id, handle);
        handle
    }
}

/// Iterator over one principal's identities, most recent first.
#[derive(Debug, Clone)]
pub struct CycleIter<'a> {
    registry: &'a IdentityRegistry,
    anchor: Option<IdentityHandle>,
    cursor: Option<IdentityHandle>,
    remaining: usize,
}

impl<'a> Iterator for CycleIter<'a> {
    type Item = &'a Identifier;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        if Some(current) == self.anchor || self.remaining == 0 {
            self.cursor = None;
            return None;
        }
        self.remaining -= 1;
        self.cursor = self.registry.nodes[current.index()].next;
        Some(self.registry.resolve(current))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
