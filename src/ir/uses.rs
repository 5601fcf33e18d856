//! Reverse-reference index for statement references.
//!
//! [`UseIndex`] answers "which statements point at statement X, and how". It is owned
//! by the [`StmtChain`](crate::ir::StmtChain) and updated whenever a statement enters or
//! leaves the chain or has its references changed, so it always mirrors the forward
//! reference graph.
//!
//! Entries are kept per target in insertion order. A statement holding several
//! references to the same target (for example a switch with two cases jumping to the
//! same label) contributes one entry per reference.

use std::collections::HashMap;

use crate::ir::{Stmt, StmtId, StmtRef};

/// One incoming reference: who points at the target, and whether it is a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefSite {
    /// The statement holding the reference.
    pub source: StmtId,
    /// `true` if the reference is a control transfer edge.
    pub branch_target: bool,
}

impl RefSite {
    /// Creates a new reference site.
    #[must_use]
    pub const fn new(source: StmtId, branch_target: bool) -> Self {
        Self {
            source,
            branch_target,
        }
    }

    /// Returns `true` if the reference is a control transfer edge.
    #[must_use]
    pub const fn is_branch_target(&self) -> bool {
        self.branch_target
    }
}

/// Index from statement to the references pointing at it.
#[derive(Debug, Clone, Default)]
pub struct UseIndex {
    incoming: HashMap<StmtId, Vec<RefSite>>,
}

impl UseIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the references pointing at `target`, oldest first.
    #[must_use]
    pub fn refs_to(&self, target: StmtId) -> &[RefSite] {
        self.incoming.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if anything points at `target`.
    #[must_use]
    pub fn is_referenced(&self, target: StmtId) -> bool {
        !self.refs_to(target).is_empty()
    }

    /// Records all outgoing references of `stmt`, held by `source`.
    pub fn index_stmt(&mut self, source: StmtId, stmt: &Stmt) {
        for r in stmt.refs() {
            self.add(source, r);
        }
    }

    /// Forgets all outgoing references of `stmt`, held by `source`.
    pub fn unindex_stmt(&mut self, source: StmtId, stmt: &Stmt) {
        for r in stmt.refs() {
            self.remove(source, r);
        }
    }

    /// Records a single reference.
    pub fn add(&mut self, source: StmtId, r: StmtRef) {
        self.incoming
            .entry(r.target())
            .or_default()
            .push(RefSite::new(source, r.is_branch_target()));
    }

    /// Forgets a single reference.
    ///
    /// Returns `false` if no matching entry was recorded.
    pub fn remove(&mut self, source: StmtId, r: StmtRef) -> bool {
        let site = RefSite::new(source, r.is_branch_target());
        let Some(sites) = self.incoming.get_mut(&r.target()) else {
            return false;
        };
        let Some(pos) = sites.iter().position(|s| *s == site) else {
            return false;
        };

        sites.remove(pos);
        if sites.is_empty() {
            self.incoming.remove(&r.target());
        }
        true
    }

    /// Drops every entry that targets `target`.
    pub fn clear_target(&mut self, target: StmtId) {
        self.incoming.remove(&target);
    }

    /// Returns the total number of recorded references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.incoming.values().map(Vec::len).sum()
    }

    /// Returns `true` if no references are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }
}
