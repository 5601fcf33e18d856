//! Phi node recognition utilities.
//!
//! A Phi node is an [`Stmt::Assign`] whose source is an [`Expr::Phi`]. These helpers
//! are pure queries; a `None` result simply means "not a Phi node", which is the common
//! case for arbitrary statements.
//!
//! # Example
//!
//! ```rust
//! use ssachain::{
//!     ir::{Expr, Local, Stmt, StmtId},
//!     ssa::{is_phi, phi_dest, phi_expr, PhiExpr},
//! };
//!
//! let node = Stmt::Assign {
//!     dest: Local::new(4),
//!     source: Expr::Phi(PhiExpr::trivial(Local::new(1), vec![StmtId::new(0)])),
//! };
//!
//! assert!(is_phi(&node));
//! assert_eq!(phi_dest(&node), Some(Local::new(4)));
//! assert_eq!(phi_expr(&node).map(PhiExpr::len), Some(1));
//! assert!(!is_phi(&Stmt::Nop));
//! ```

use crate::{
    ir::{Expr, Local, Stmt},
    ssa::PhiExpr,
};

/// Returns `true` if `stmt` is a Phi node.
#[must_use]
pub fn is_phi(stmt: &Stmt) -> bool {
    phi_expr(stmt).is_some()
}

/// Returns the Phi expression of `stmt` if it is a Phi node.
#[must_use]
pub fn phi_expr(stmt: &Stmt) -> Option<&PhiExpr> {
    match stmt {
        Stmt::Assign {
            source: Expr::Phi(phi),
            ..
        } => Some(phi),
        _ => None,
    }
}

/// Returns the Phi expression of `stmt` for mutation if it is a Phi node.
///
/// When `stmt` lives in a [`StmtChain`](crate::ir::StmtChain), call this from within
/// [`StmtChain::modify`](crate::ir::StmtChain::modify).
pub fn phi_expr_mut(stmt: &mut Stmt) -> Option<&mut PhiExpr> {
    match stmt {
        Stmt::Assign {
            source: Expr::Phi(phi),
            ..
        } => Some(phi),
        _ => None,
    }
}

/// Returns the local assigned by `stmt` if it is a Phi node.
#[must_use]
pub fn phi_dest(stmt: &Stmt) -> Option<Local> {
    match stmt {
        Stmt::Assign {
            dest,
            source: Expr::Phi(_),
        } => Some(*dest),
        _ => None,
    }
}
