//! The ordered statement container of a method body.
//!
//! [`StmtChain`] owns every statement of a body, keeps them in program order and
//! maintains the [`UseIndex`] of incoming references. All mutation goes through the
//! chain so the index can never drift from the statements it describes:
//!
//! - [`push`](StmtChain::push), [`insert_after`](StmtChain::insert_after) and
//!   [`insert_before`](StmtChain::insert_before) index the new statement's references
//! - [`modify`](StmtChain::modify) and [`replace`](StmtChain::replace) un-index, mutate
//!   and re-index in one step
//! - [`remove`](StmtChain::remove) retargets jumps to the removed statement onto its
//!   successor and un-indexes it
//!
//! # Forward References
//!
//! Statement identifiers are only known once a statement has been added, so jumps to
//! later statements are usually built by adding a placeholder (`Stmt::Nop`) and
//! [replacing](StmtChain::replace) it once the target exists.

use std::fmt;

use indexmap::IndexSet;
use log::{debug, trace};

use crate::{
    ir::{RefSite, Stmt, StmtId, UseIndex},
    Error, Result,
};

/// Ordered, mutable sequence of the statements of one method body.
///
/// # Examples
///
/// ```rust
/// use ssachain::ir::{Stmt, StmtChain};
///
/// let mut chain = StmtChain::new();
/// let head = chain.push(Stmt::Nop);
/// let exit = chain.push(Stmt::Return(None));
/// chain.replace(head, Stmt::Goto { target: exit })?;
///
/// assert_eq!(chain.succ_of(head), Some(exit));
/// assert_eq!(chain.refs_to(exit).len(), 1);
/// # Ok::<(), ssachain::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct StmtChain {
    /// Statement arena indexed by [`StmtId`]; removed statements leave `None`.
    slots: Vec<Option<Stmt>>,
    /// Program order.
    order: Vec<StmtId>,
    /// Incoming references of every statement in the chain.
    uses: UseIndex,
}

impl StmtChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty chain with room for `capacity` statements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            uses: UseIndex::new(),
        }
    }

    fn alloc(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(self.slots.len());
        self.uses.index_stmt(id, &stmt);
        self.slots.push(Some(stmt));
        id
    }

    /// Appends a statement at the end of the program order.
    pub fn push(&mut self, stmt: Stmt) -> StmtId {
        let id = self.alloc(stmt);
        self.order.push(id);
        id
    }

    /// Inserts a statement directly after `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStmt`] if `anchor` is not in the chain.
    pub fn insert_after(&mut self, anchor: StmtId, stmt: Stmt) -> Result<StmtId> {
        let pos = self.position(anchor).ok_or(Error::UnknownStmt(anchor))?;
        let id = self.alloc(stmt);
        self.order.insert(pos + 1, id);
        Ok(id)
    }

    /// Inserts a statement directly before `anchor`.
    ///
    /// Jumps to `anchor` keep pointing at `anchor`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStmt`] if `anchor` is not in the chain.
    pub fn insert_before(&mut self, anchor: StmtId, stmt: Stmt) -> Result<StmtId> {
        let pos = self.position(anchor).ok_or(Error::UnknownStmt(anchor))?;
        let id = self.alloc(stmt);
        self.order.insert(pos, id);
        Ok(id)
    }

    /// Returns the statement with the given identifier.
    #[must_use]
    pub fn get(&self, id: StmtId) -> Option<&Stmt> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Returns `true` if the statement is part of the chain.
    #[must_use]
    pub fn contains(&self, id: StmtId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the position of `id` in program order.
    #[must_use]
    pub fn position(&self, id: StmtId) -> Option<usize> {
        self.order.iter().position(|&s| s == id)
    }

    /// Returns the first statement in program order.
    #[must_use]
    pub fn first(&self) -> Option<StmtId> {
        self.order.first().copied()
    }

    /// Returns the last statement in program order.
    #[must_use]
    pub fn last(&self) -> Option<StmtId> {
        self.order.last().copied()
    }

    /// Returns the statement physically preceding `id`.
    #[must_use]
    pub fn pred_of(&self, id: StmtId) -> Option<StmtId> {
        let pos = self.position(id)?;
        pos.checked_sub(1).map(|p| self.order[p])
    }

    /// Returns the statement physically following `id`.
    #[must_use]
    pub fn succ_of(&self, id: StmtId) -> Option<StmtId> {
        let pos = self.position(id)?;
        self.order.get(pos + 1).copied()
    }

    /// Returns the statement identifiers in program order.
    #[must_use]
    pub fn ids(&self) -> &[StmtId] {
        &self.order
    }

    /// Iterates over the statements in program order.
    pub fn iter(&self) -> impl Iterator<Item = (StmtId, &Stmt)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.get(id).map(|stmt| (id, stmt)))
    }

    /// Returns the number of statements in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the chain holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the references pointing at `id`, oldest first.
    #[must_use]
    pub fn refs_to(&self, id: StmtId) -> &[RefSite] {
        self.uses.refs_to(id)
    }

    /// Returns the reverse-reference index.
    #[must_use]
    pub fn uses(&self) -> &UseIndex {
        &self.uses
    }

    #[cfg(test)]
    pub(crate) fn uses_mut(&mut self) -> &mut UseIndex {
        &mut self.uses
    }

    /// Mutates a statement in place and re-indexes its references.
    ///
    /// # Arguments
    ///
    /// * `id` - The statement to mutate
    /// * `f` - The mutation; its return value is passed through
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStmt`] if `id` is not in the chain.
    pub fn modify<R>(&mut self, id: StmtId, f: impl FnOnce(&mut Stmt) -> R) -> Result<R> {
        let stmt = self
            .slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownStmt(id))?;

        self.uses.unindex_stmt(id, stmt);
        let result = f(stmt);
        self.uses.index_stmt(id, stmt);
        trace!("modified {id}: {stmt}");
        Ok(result)
    }

    /// Replaces a statement, keeping its identifier and position.
    ///
    /// Returns the previous statement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStmt`] if `id` is not in the chain.
    pub fn replace(&mut self, id: StmtId, stmt: Stmt) -> Result<Stmt> {
        self.modify(id, |slot| std::mem::replace(slot, stmt))
    }

    /// Redirects every jump to `from` so it targets `to` instead.
    ///
    /// Phi provenance references to `from` are not touched; see
    /// [`redirect_to_preds`](crate::ssa::redirect_to_preds) for those. Returns the number
    /// of rewritten branch targets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStmt`] if either statement is not in the chain.
    pub fn retarget_branches(&mut self, from: StmtId, to: StmtId) -> Result<usize> {
        if !self.contains(from) {
            return Err(Error::UnknownStmt(from));
        }
        if !self.contains(to) {
            return Err(Error::UnknownStmt(to));
        }

        let mut sources: Vec<StmtId> = self
            .refs_to(from)
            .iter()
            .filter(|site| site.is_branch_target())
            .map(|site| site.source)
            .collect();
        sources.dedup();

        let mut count = 0;
        for source in sources {
            count += self.modify(source, |stmt| stmt.retarget_branches(from, to))?;
        }

        debug!("retargeted {count} branch(es) from {from} to {to}");
        Ok(count)
    }

    /// Returns where control entering `id` ends up once `id` is removed.
    ///
    /// Nothing enters a statement that is neither branched to nor fallen into, so the
    /// result is `None`. Otherwise every way out of `id` must lead to the same statement:
    /// the successor for a statement that falls through, the target for a `goto`. A
    /// predecessor falling into `id` keeps falling into the successor, so the exit must be
    /// the successor in that case.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownStmt`] if `id` is not in the chain
    /// - [`Error::NoSuccessor`] if `id` falls through but is the last statement
    /// - [`Error::FlowNotPreserved`] if control entering `id` has no single destination
    ///   (returns, throws, two-way jumps, self loops) or falling through would skip it
    pub fn removal_target(&self, id: StmtId) -> Result<Option<StmtId>> {
        let pos = self.position(id).ok_or(Error::UnknownStmt(id))?;
        let stmt = self.get(id).ok_or(Error::UnknownStmt(id))?;

        let branched = self.refs_to(id).iter().any(RefSite::is_branch_target);
        let fallen_into = pos > 0
            && self
                .order
                .get(pos - 1)
                .and_then(|prev| self.get(*prev))
                .is_some_and(Stmt::falls_through);
        if !branched && !fallen_into {
            return Ok(None);
        }

        let succ = self.order.get(pos + 1).copied();
        let mut exits: IndexSet<StmtId> = stmt.branch_targets().into_iter().collect();
        if stmt.falls_through() {
            exits.insert(succ.ok_or(Error::NoSuccessor(id))?);
        }

        let dest = match exits.first() {
            Some(&dest) if exits.len() == 1 && dest != id => dest,
            _ => return Err(Error::FlowNotPreserved(id)),
        };
        if fallen_into && succ != Some(dest) {
            return Err(Error::FlowNotPreserved(id));
        }

        Ok(Some(dest))
    }

    /// Removes a statement from the chain.
    ///
    /// Jumps to the removed statement are retargeted to [`removal_target`]: the successor,
    /// or the target when the statement is a `goto`. Phi nodes that name it as a
    /// predecessor must have been patched beforehand.
    ///
    /// [`removal_target`]: StmtChain::removal_target
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownStmt`] if `id` is not in the chain
    /// - [`Error::StillReferenced`] if Phi provenance references still target `id`
    /// - [`Error::NoSuccessor`] and [`Error::FlowNotPreserved`] as for [`removal_target`]
    pub fn remove(&mut self, id: StmtId) -> Result<Stmt> {
        let pos = self.position(id).ok_or(Error::UnknownStmt(id))?;

        let refs = self.refs_to(id);
        let provenance = refs.iter().filter(|site| !site.is_branch_target()).count();
        if provenance > 0 {
            return Err(Error::StillReferenced {
                stmt: id,
                count: provenance,
            });
        }

        if let Some(dest) = self.removal_target(id)? {
            if !self.refs_to(id).is_empty() {
                self.retarget_branches(id, dest)?;
            }
        }

        self.order.remove(pos);
        let stmt = self.slots[id.index()].take().ok_or(Error::UnknownStmt(id))?;
        self.uses.unindex_stmt(id, &stmt);
        self.uses.clear_target(id);

        debug!("removed {id}: {stmt}");
        Ok(stmt)
    }
}

impl fmt::Display for StmtChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, stmt) in self.iter() {
            writeln!(f, "{id}: {stmt}")?;
        }
        Ok(())
    }
}
