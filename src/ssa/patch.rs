//! Phi fix-ups for statements leaving the control flow graph.
//!
//! When a pass deletes a statement that acts as a block boundary, every Phi node that
//! names it as the predecessor of an argument would be left pointing at a statement that
//! no longer exists. [`redirect_to_preds`] replaces that single incoming edge with one
//! edge per real predecessor of the removed statement, each carrying the value that used
//! to flow along the removed edge.
//!
//! ```text
//! before                               after redirect_to_preds(s3)
//!
//! s0: if l0 goto s3                    s0: if l0 goto s3
//! s1: if l1 goto s3                    s1: if l1 goto s3
//! s2: l2 = 1                           s2: l2 = 1
//! s3: goto s6                          s3: goto s6
//! ...                                  ...
//! s6: l4 = phi(l2 from s3,             s6: l4 = phi(l3 from s5,
//!              l3 from s5)                          l2 from s2, l2 from s0, l2 from s1)
//! ```
//!
//! The statement itself stays in the chain; removing it (and retargeting the jumps to
//! it) is left to [`StmtChain::remove`], or done in one go with [`remove_and_patch`].

use indexmap::IndexSet;
use log::{debug, trace};

use crate::{
    ir::{RefSite, Stmt, StmtChain, StmtId, Value},
    ssa::{phi_expr, phi_expr_mut},
    Error, Result,
};

/// Rewires every Phi node that uses `remove` as a predecessor marker.
///
/// Each affected Phi node loses its argument bound to `remove` and gains one argument
/// per predecessor of `remove`, all carrying the removed argument's value. The position
/// of the new arguments among themselves is unspecified.
///
/// Predecessors of `remove` are the statement physically before it if that one falls
/// through, plus every statement holding a branch-target reference to it.
///
/// Returns the number of Phi nodes that were rewritten. When nothing points at
/// `remove`, or only jumps do, the chain is left untouched and `0` is returned.
///
/// # Arguments
///
/// * `chain` - The statement chain holding `remove`
/// * `remove` - The statement about to leave the control flow graph
///
/// # Errors
///
/// - [`Error::UnknownStmt`] if `remove` is not in the chain
/// - [`Error::Inconsistent`] if the reverse-reference index names a Phi node that has no
///   argument bound to `remove`; no Phi node is modified in that case
pub fn redirect_to_preds(chain: &mut StmtChain, remove: StmtId) -> Result<usize> {
    if !chain.contains(remove) {
        return Err(Error::UnknownStmt(remove));
    }

    let pointers = chain.refs_to(remove);
    if pointers.is_empty() {
        trace!("{remove} is not referenced, nothing to redirect");
        return Ok(0);
    }

    // Only jumps: retargeting those is the chain's business, no Phi is involved.
    if pointers.iter().all(RefSite::is_branch_target) {
        trace!("{remove} is only a branch target, nothing to redirect");
        return Ok(0);
    }

    let preds = collect_preds(chain, remove);
    let phis = collect_phis(chain, remove)?;

    // Resolve every argument before touching anything so a broken Phi aborts cleanly.
    let mut rewrites: Vec<(StmtId, usize, Value)> = Vec::with_capacity(phis.len());
    for phi in phis {
        let expr = chain.get(phi).and_then(phi_expr).ok_or_else(|| {
            inconsistent_error!("{} is indexed as a Phi node but is not one", phi)
        })?;
        let index = expr.arg_index(remove).ok_or_else(|| {
            inconsistent_error!(
                "Phi node {} is indexed as using {} but has no argument bound to it",
                phi,
                remove
            )
        })?;
        let value = expr.value(index).cloned().ok_or_else(|| {
            inconsistent_error!("Phi node {} lost argument {}", phi, index)
        })?;
        rewrites.push((phi, index, value));
    }

    debug!(
        "redirecting {} Phi node(s) from {remove} to {} predecessor(s)",
        rewrites.len(),
        preds.len()
    );

    let count = rewrites.len();
    for (phi, index, value) in rewrites {
        chain.modify(phi, |stmt| {
            if let Some(expr) = phi_expr_mut(stmt) {
                expr.remove_arg(index);
                for &pred in &preds {
                    expr.add_arg(value.clone(), pred);
                }
            }
        })?;
        trace!("patched {phi}");
    }

    Ok(count)
}

/// Collects the control flow predecessors of `remove` in one pass over the chain.
fn collect_preds(chain: &StmtChain, remove: StmtId) -> IndexSet<StmtId> {
    let mut preds = IndexSet::new();

    if chain.first() != Some(remove) {
        if let Some(prev) = chain.pred_of(remove) {
            if chain.get(prev).is_some_and(Stmt::falls_through) {
                preds.insert(prev);
            }
        }
    }

    for (id, stmt) in chain.iter() {
        if stmt
            .refs()
            .iter()
            .any(|r| r.is_branch_target() && r.target() == remove)
        {
            preds.insert(id);
        }
    }

    preds
}

/// Collects the Phi nodes naming `remove` as the predecessor of an argument.
fn collect_phis(chain: &StmtChain, remove: StmtId) -> Result<IndexSet<StmtId>> {
    let mut phis = IndexSet::new();

    for site in chain.refs_to(remove) {
        if site.is_branch_target() {
            continue;
        }

        let stmt = chain.get(site.source).ok_or_else(|| {
            inconsistent_error!(
                "{} is indexed as referencing {} but is not in the chain",
                site.source,
                remove
            )
        })?;
        if phi_expr(stmt).is_some() {
            phis.insert(site.source);
        }
    }

    Ok(phis)
}

/// Patches the Phi nodes using `remove`, then removes it from the chain.
///
/// Jumps to `remove` are retargeted as described in [`StmtChain::remove`]. Removability
/// is checked first, so a refused removal leaves every Phi node untouched. Returns the
/// removed statement.
///
/// # Errors
///
/// Any error of [`StmtChain::removal_target`], [`redirect_to_preds`] or
/// [`StmtChain::remove`].
pub fn remove_and_patch(chain: &mut StmtChain, remove: StmtId) -> Result<Stmt> {
    chain.removal_target(remove)?;
    redirect_to_preds(chain, remove)?;
    chain.remove(remove)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::{Expr, Local, StmtRef},
        test::{control_preds, int, local, phi_stmt, three_way_merge},
    };
    use std::collections::HashSet;

    fn phi_of(chain: &StmtChain, id: StmtId) -> crate::ssa::PhiExpr {
        chain.get(id).and_then(phi_expr).cloned().unwrap()
    }

    #[test]
    fn test_rewrites_to_every_pred() {
        let (mut chain, m) = three_way_merge();
        let before = phi_of(&chain, m.phi).len();

        assert_eq!(redirect_to_preds(&mut chain, m.removed).unwrap(), 1);

        let phi = phi_of(&chain, m.phi);
        assert_eq!(phi.len(), before + 2);
        assert_eq!(phi.arg_index(m.removed), None);
        for pred in [m.fall, m.branch_a, m.branch_b] {
            let bound: Vec<_> = phi.args().iter().filter(|a| a.pred() == pred).collect();
            assert_eq!(bound.len(), 1, "one argument for {pred}");
            assert_eq!(bound[0].value(), &local(2));
        }
        assert_eq!(phi.value_from(m.other), Some(&local(3)));
    }

    #[test]
    fn test_rewrite_updates_index() {
        let (mut chain, m) = three_way_merge();
        redirect_to_preds(&mut chain, m.removed).unwrap();

        assert!(chain
            .refs_to(m.removed)
            .iter()
            .all(RefSite::is_branch_target));
        assert!(chain
            .refs_to(m.fall)
            .contains(&RefSite::new(m.phi, false)));

        // the statement is still in place, only Phi provenance moved
        assert!(chain.contains(m.removed));
        assert_eq!(chain.refs_to(m.removed).len(), 2);
    }

    #[test]
    fn test_unreferenced_is_noop() {
        let (mut chain, m) = three_way_merge();
        let before = phi_of(&chain, m.phi);

        assert_eq!(redirect_to_preds(&mut chain, m.fall).unwrap(), 0);
        assert_eq!(phi_of(&chain, m.phi), before);
    }

    #[test]
    fn test_branch_only_is_noop() {
        let mut chain = StmtChain::new();
        let jump = chain.push(Stmt::Nop);
        let label = chain.push(Stmt::Nop);
        let other = chain.push(Stmt::Nop);
        let phi = chain.push(phi_stmt(3, vec![local(1), local(2)], vec![jump, other]));
        chain.replace(jump, Stmt::Goto { target: label }).unwrap();
        let before = phi_of(&chain, phi);

        assert_eq!(redirect_to_preds(&mut chain, label).unwrap(), 0);
        assert_eq!(phi_of(&chain, phi), before);
    }

    #[test]
    fn test_fall_through_pred() {
        let mut chain = StmtChain::new();
        let prev = chain.push(Stmt::Assign {
            dest: Local::new(1),
            source: Expr::Use(int(5)),
        });
        let removed = chain.push(Stmt::Nop);
        let phi = chain.push(phi_stmt(2, vec![local(1)], vec![removed]));

        redirect_to_preds(&mut chain, removed).unwrap();

        let expr = phi_of(&chain, phi);
        assert_eq!(expr.len(), 1);
        assert_eq!(expr.pred(0), Some(prev));
        assert_eq!(expr.value(0), Some(&local(1)));
    }

    #[test]
    fn test_no_fall_through_after_goto() {
        let mut chain = StmtChain::new();
        let exit = chain.push(Stmt::Return(None));
        let jump = chain.push(Stmt::Goto { target: exit });
        let removed = chain.push(Stmt::Nop);
        let phi = chain.push(phi_stmt(2, vec![local(1)], vec![removed]));

        redirect_to_preds(&mut chain, removed).unwrap();

        let expr = phi_of(&chain, phi);
        assert!(expr.is_empty());
        assert!(chain.refs_to(jump).is_empty());
    }

    #[test]
    fn test_first_stmt_has_no_fall_through_pred() {
        let mut chain = StmtChain::new();
        let removed = chain.push(Stmt::Nop);
        let back = chain.push(Stmt::If {
            condition: local(0),
            target: removed,
        });
        let phi = chain.push(phi_stmt(2, vec![local(1)], vec![removed]));

        redirect_to_preds(&mut chain, removed).unwrap();

        let expr = phi_of(&chain, phi);
        assert_eq!(expr.preds().collect::<Vec<_>>(), vec![back]);
    }

    #[test]
    fn test_pred_counted_once() {
        // two switch cases reaching `removed` still make a single predecessor
        let mut chain = StmtChain::new();
        let switch = chain.push(Stmt::Nop);
        let removed = chain.push(Stmt::Nop);
        let phi = chain.push(phi_stmt(2, vec![int(0)], vec![removed]));
        chain
            .replace(
                switch,
                Stmt::Switch {
                    key: local(0),
                    targets: vec![removed, removed],
                    default: phi,
                },
            )
            .unwrap();

        redirect_to_preds(&mut chain, removed).unwrap();

        let expr = phi_of(&chain, phi);
        assert_eq!(expr.preds().collect::<Vec<_>>(), vec![switch]);
        assert_eq!(expr.value(0), Some(&int(0)));
    }

    #[test]
    fn test_multiple_phis() {
        let (mut chain, m) = three_way_merge();
        let second = chain
            .insert_after(m.phi, phi_stmt(5, vec![int(9), int(8)], vec![m.removed, m.other]))
            .unwrap();

        assert_eq!(redirect_to_preds(&mut chain, m.removed).unwrap(), 2);

        let expr = phi_of(&chain, second);
        assert_eq!(expr.len(), 4);
        assert_eq!(expr.arg_index(m.removed), None);
        assert_eq!(expr.value_from(m.branch_b), Some(&int(9)));
    }

    #[test]
    fn test_inconsistent_index_is_fatal() {
        let mut chain = StmtChain::new();
        let x = chain.push(Stmt::Nop);
        let y = chain.push(Stmt::Nop);
        let phi = chain.push(phi_stmt(2, vec![local(1)], vec![x]));

        // claim the Phi node also uses `y`
        chain.uses_mut().add(phi, StmtRef::provenance(y));
        let before = phi_of(&chain, phi);

        let err = redirect_to_preds(&mut chain, y).unwrap_err();
        assert!(matches!(err, Error::Inconsistent { .. }));
        assert_eq!(phi_of(&chain, phi), before);
    }

    #[test]
    fn test_unknown_stmt() {
        let (mut chain, _) = three_way_merge();
        assert!(matches!(
            redirect_to_preds(&mut chain, StmtId::new(99)),
            Err(Error::UnknownStmt(_))
        ));
    }

    #[test]
    fn test_remove_and_patch_refuses_skipping_goto() {
        // s3: goto s6 is fallen into by s2 but jumps past s4, so it cannot go
        let (mut chain, m) = three_way_merge();
        let before = phi_of(&chain, m.phi);

        let err = remove_and_patch(&mut chain, m.removed).unwrap_err();
        assert!(matches!(err, Error::FlowNotPreserved(s) if s == m.removed));
        assert!(chain.contains(m.removed));
        assert_eq!(phi_of(&chain, m.phi), before);
        assert_eq!(
            chain.get(m.branch_a).map(Stmt::branch_targets),
            Some(vec![m.removed])
        );
    }

    #[test]
    fn test_remove_and_patch_goto_keeps_phi_in_step() {
        // s0: if l0 goto s4
        // s1: if l1 goto s4
        // s2: l3 = 2
        // s3: goto s6
        // s4: goto s6           ; removed
        // s5: return
        // s6: l4 = phi(l3 from s3, 1 from s4)
        // s7: return l4
        let mut chain = StmtChain::new();
        let branch_a = chain.push(Stmt::Nop);
        let branch_b = chain.push(Stmt::Nop);
        chain.push(Stmt::Assign {
            dest: Local::new(3),
            source: Expr::Use(int(2)),
        });
        let other = chain.push(Stmt::Nop);
        let removed = chain.push(Stmt::Nop);
        chain.push(Stmt::Return(None));
        let join = chain.push(phi_stmt(4, vec![local(3), int(1)], vec![other, removed]));
        chain.push(Stmt::Return(Some(local(4))));
        for (branch, cond) in [(branch_a, 0), (branch_b, 1)] {
            chain
                .replace(
                    branch,
                    Stmt::If {
                        condition: local(cond),
                        target: removed,
                    },
                )
                .unwrap();
        }
        chain.replace(other, Stmt::Goto { target: join }).unwrap();
        chain.replace(removed, Stmt::Goto { target: join }).unwrap();

        let stmt = remove_and_patch(&mut chain, removed).unwrap();
        assert_eq!(stmt, Stmt::Goto { target: join });

        // both conditional jumps now land on the join directly
        for branch in [branch_a, branch_b] {
            assert_eq!(chain.get(branch).map(Stmt::branch_targets), Some(vec![join]));
        }

        // one argument per edge that really enters the join
        let phi = phi_of(&chain, join);
        let preds: HashSet<StmtId> = phi.preds().collect();
        assert_eq!(phi.len(), preds.len());
        assert_eq!(preds, control_preds(&chain, join));
        assert_eq!(phi.value_from(branch_a), Some(&int(1)));
        assert_eq!(phi.value_from(branch_b), Some(&int(1)));
        assert_eq!(phi.value_from(other), Some(&local(3)));
    }
}
