//! SSA layer: Phi expressions, Phi-node utilities and CFG-edit patching.
//!
//! In SSA form every local is assigned exactly once. Where control flow merges, a Phi
//! node `x = phi(v1 from p1, v2 from p2, ...)` selects the value that flowed in along the
//! edge from predecessor `pi`. The predecessors are statement references, so removing a
//! statement that a Phi names as a predecessor leaves the Phi pointing at nothing.
//! [`redirect_to_preds`] repairs that before the removal happens.
//!
//! # Architecture
//!
//! - `phi` - [`PhiExpr`] and its [`PhiArg`] pairs
//! - `phis` - recognising and unpacking Phi nodes
//! - `patch` - the predecessor redirection algorithm
//! - `options` - phase options and the registry they come from
//! - `body` - [`SsaBody`] and the conversion entry points
//!
//! SSA construction and elimination themselves are supplied through [`SsaBuilder`] and
//! [`SsaEliminator`].
//!
//! # Example
//!
//! ```rust
//! use ssachain::{
//!     ir::{Expr, Local, Stmt, StmtChain, Value},
//!     ssa::{phi_expr, redirect_to_preds, PhiExpr},
//! };
//!
//! let mut chain = StmtChain::new();
//! let entry = chain.push(Stmt::Nop);
//! let dead = chain.push(Stmt::Nop);
//! let phi = chain.push(Stmt::Assign {
//!     dest: Local::new(1),
//!     source: Expr::Phi(PhiExpr::trivial(Local::new(0), vec![dead])),
//! });
//!
//! assert_eq!(redirect_to_preds(&mut chain, dead)?, 1);
//! let patched = chain.get(phi).and_then(phi_expr).unwrap();
//! assert_eq!(patched.value_from(entry), Some(&Value::Local(Local::new(0))));
//! assert!(patched.value_from(dead).is_none());
//!
//! chain.remove(dead)?;
//! # Ok::<(), ssachain::Error>(())
//! ```

mod body;
mod options;
mod patch;
mod phi;
mod phis;

pub use body::{
    from_bodies, from_body, from_body_in_phase, from_body_with_options, new_body,
    new_trivial_phi, new_phi, to_body, SsaBody, SsaBuilder, SsaEliminator,
};
pub use options::{
    PhaseOptions, PhaseRegistry, SsaOption, SsaOptions, StaticPhaseRegistry, DEFAULT_PHASE,
};
pub use patch::{redirect_to_preds, remove_and_patch};
pub use phi::{PhiArg, PhiExpr};
pub use phis::{is_phi, phi_dest, phi_expr, phi_expr_mut};
