// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # ssachain
//!
//! SSA support for a statement-chain intermediate representation: Phi expressions,
//! Phi-node utilities, and the patching that keeps Phi nodes valid when statements are
//! removed from the control flow graph.
//!
//! ## Features
//!
//! - **Statement chain** - ordered statements with a transactional reverse-reference index
//! - **Phi expressions** - ordered `(value, predecessor)` pairs with arity checking
//! - **Predecessor redirection** - rewrites Phi nodes before a statement is deleted
//! - **Pluggable conversion** - SSA construction and elimination behind traits
//! - **Phase options** - `key:value` option strings resolved through a registry
//!
//! ## Architecture
//!
//! - [`ir`] - values, statements, the reverse-reference index and the chain
//! - [`ssa`] - Phi expressions, Phi-node queries, patching, options and conversion
//! - [`logging`] - logger setup for host binaries and tests
//! - [`prelude`] - the commonly used types in one import
//!
//! ## Quick Start
//!
//! ```rust
//! use ssachain::prelude::*;
//!
//! // s0: if l0 goto s2
//! // s1: l1 = 1
//! // s2: goto s3          <- about to be deleted
//! // s3: l2 = phi(l1 from s2)
//! let mut chain = StmtChain::new();
//! let branch = chain.push(Stmt::Nop);
//! let fall = chain.push(Stmt::Assign {
//!     dest: Local::new(1),
//!     source: Expr::Use(Value::Const(Constant::Int(1))),
//! });
//! let dead = chain.push(Stmt::Nop);
//! let merge = chain.push(Stmt::Assign {
//!     dest: Local::new(2),
//!     source: Expr::Phi(PhiExpr::trivial(Local::new(1), vec![dead])),
//! });
//! chain.replace(
//!     branch,
//!     Stmt::If {
//!         condition: Value::Local(Local::new(0)),
//!         target: dead,
//!     },
//! )?;
//! chain.replace(dead, Stmt::Goto { target: merge })?;
//!
//! remove_and_patch(&mut chain, dead)?;
//!
//! let phi = chain.get(merge).and_then(phi_expr).unwrap();
//! assert_eq!(phi.preds().collect::<Vec<_>>(), vec![fall, branch]);
//! # Ok::<(), ssachain::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`] with [`Error`]. Caller mistakes (unknown
//! statements, arity mismatches, bad option strings) are separate variants from
//! [`Error::Inconsistent`], which reports a reverse-reference index that disagrees with
//! the statements it indexes.

#[macro_use]
pub(crate) mod error;

#[cfg(test)]
pub(crate) mod test;

/// Three-address statement IR.
///
/// Values, statements and statement references, plus [`ir::StmtChain`] which owns the
/// statements of a body and keeps the reverse-reference index in step with every edit.
pub mod ir;

/// Static single assignment layer.
///
/// Phi expressions, Phi-node utilities, the predecessor redirection used when statements
/// are deleted, phase options, and the conversion entry points.
pub mod ssa;

/// Logger initialisation.
pub mod logging;

/// Commonly used types and functions.
///
/// ```rust
/// use ssachain::prelude::*;
///
/// let phi = PhiExpr::trivial(Local::new(0), vec![StmtId::new(1)]);
/// assert_eq!(phi.len(), 1);
/// ```
pub mod prelude;

/// `ssachain` Result type.
///
/// Shorthand for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// `ssachain` Error type.
pub use error::Error;
