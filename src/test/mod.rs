//! Fixtures shared by the unit tests.

use std::collections::HashSet;

use crate::{
    ir::{Constant, Expr, Local, Stmt, StmtChain, StmtId, Value},
    ssa::PhiExpr,
};

/// Shorthand for a local operand.
pub fn local(index: usize) -> Value {
    Value::Local(Local::new(index))
}

/// Shorthand for an integer constant operand.
pub fn int(value: i32) -> Value {
    Value::Const(Constant::Int(value))
}

/// Builds `dest = phi(values[i] from preds[i], ...)`.
pub fn phi_stmt(dest: usize, values: Vec<Value>, preds: Vec<StmtId>) -> Stmt {
    Stmt::Assign {
        dest: Local::new(dest),
        source: Expr::Phi(PhiExpr::new(values, preds).expect("phi arity")),
    }
}

/// Statement handles of [`three_way_merge`].
pub struct Merge {
    pub branch_a: StmtId,
    pub branch_b: StmtId,
    pub fall: StmtId,
    pub removed: StmtId,
    pub other: StmtId,
    pub phi: StmtId,
}

/// A chain where `removed` has three predecessors and feeds a Phi node.
///
/// ```text
/// s0: if l0 goto s3        ; branch_a
/// s1: if l1 goto s3        ; branch_b
/// s2: l2 = 1               ; fall, falls through into s3
/// s3: goto s6              ; removed
/// s4: l3 = 2
/// s5: nop                  ; other, falls through into s6
/// s6: l4 = phi(l2 from s3, l3 from s5)
/// s7: return l4
/// ```
pub fn three_way_merge() -> (StmtChain, Merge) {
    let mut chain = StmtChain::new();
    let branch_a = chain.push(Stmt::Nop);
    let branch_b = chain.push(Stmt::Nop);
    let fall = chain.push(Stmt::Assign {
        dest: Local::new(2),
        source: Expr::Use(int(1)),
    });
    let removed = chain.push(Stmt::Nop);
    chain.push(Stmt::Assign {
        dest: Local::new(3),
        source: Expr::Use(int(2)),
    });
    let other = chain.push(Stmt::Nop);
    let phi = chain.push(phi_stmt(4, vec![local(2), local(3)], vec![removed, other]));
    chain.push(Stmt::Return(Some(local(4))));

    chain
        .replace(
            branch_a,
            Stmt::If {
                condition: local(0),
                target: removed,
            },
        )
        .expect("fixture");
    chain
        .replace(
            branch_b,
            Stmt::If {
                condition: local(1),
                target: removed,
            },
        )
        .expect("fixture");
    chain
        .replace(removed, Stmt::Goto { target: phi })
        .expect("fixture");

    (
        chain,
        Merge {
            branch_a,
            branch_b,
            fall,
            removed,
            other,
            phi,
        },
    )
}

/// The statements control can reach `id` from: the statement before it when that one
/// falls through, plus every statement jumping to it.
pub fn control_preds(chain: &StmtChain, id: StmtId) -> HashSet<StmtId> {
    let mut preds: HashSet<StmtId> = chain
        .iter()
        .filter(|(_, stmt)| stmt.branch_targets().contains(&id))
        .map(|(source, _)| source)
        .collect();
    if let Some(prev) = chain.pred_of(id) {
        if chain.get(prev).is_some_and(Stmt::falls_through) {
            preds.insert(prev);
        }
    }
    preds
}
