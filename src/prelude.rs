//! # ssachain Prelude
//!
//! The types and functions needed for everyday work with statement chains and Phi nodes.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ssachain operations
pub use crate::Error;

/// The result type used throughout ssachain
pub use crate::Result;

// ================================================================================================
// Statement IR
// ================================================================================================

/// Operands and locals
pub use crate::ir::{Constant, Local, Value};

/// Statements, expressions and statement references
pub use crate::ir::{BinOp, Expr, Stmt, StmtId, StmtRef};

/// The statement container and its reverse-reference index
pub use crate::ir::{RefSite, StmtChain, UseIndex};

/// Conventional method bodies
pub use crate::ir::{Body, Method};

// ================================================================================================
// SSA
// ================================================================================================

/// Phi expressions
pub use crate::ssa::{PhiArg, PhiExpr};

/// Phi node queries
pub use crate::ssa::{is_phi, phi_dest, phi_expr, phi_expr_mut};

/// CFG-edit patching
pub use crate::ssa::{redirect_to_preds, remove_and_patch};

/// SSA bodies and conversion collaborators
pub use crate::ssa::{SsaBody, SsaBuilder, SsaEliminator};

/// Phase options
pub use crate::ssa::{PhaseOptions, PhaseRegistry, SsaOptions, StaticPhaseRegistry};
