//! Three-address statement IR underlying the SSA layer.
//!
//! # Architecture
//!
//! - `value` - locals, constants and operand values
//! - `stmt` - statements, expressions and statement references
//! - `uses` - reverse-reference index ("who points at me")
//! - `chain` - ordered statement container owning statements and the index
//! - `body` - conventional method bodies
//!
//! The control flow graph is implicit: edges are the branch-target references held by
//! statements plus fall-through edges between neighbours in the chain.

mod body;
mod chain;
mod stmt;
mod uses;
mod value;

pub use body::{Body, Method};
pub use chain::StmtChain;
pub use stmt::{BinOp, Expr, Stmt, StmtId, StmtRef};
pub use uses::{RefSite, UseIndex};
pub use value::{Constant, Local, Value};
