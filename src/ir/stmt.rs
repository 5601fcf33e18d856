//! Statements, expressions and statement references.
//!
//! Statements are the nodes of both the linear program order and the control flow
//! graph. There is no separate CFG object: a statement's branch targets are its
//! outgoing control-flow edges, and a fall-through edge exists whenever a statement
//! [falls through](Stmt::falls_through) into its successor in the chain.
//!
//! # Statement References
//!
//! A [`StmtRef`] names another statement and carries a branch-target flag:
//!
//! | Source | `is_branch_target()` | Meaning |
//! |--------|----------------------|---------|
//! | `goto`, `if`, `switch` targets | `true` | control transfer edge |
//! | Phi argument predecessor | `false` | data provenance marker |
//!
//! References only name their target; the [`StmtChain`](crate::ir::StmtChain) owns all
//! statements and keeps the reverse index of who points at whom.
//!
//! # Phi Placement
//!
//! [`Expr`] is the closed set of assignment right-hand sides, and operands of every
//! non-Phi expression are plain [`Value`]s. A Phi expression therefore can only ever
//! appear as the direct source of an [`Stmt::Assign`].

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    ir::{Local, Value},
    ssa::PhiExpr,
};

/// Identifier of a statement within one chain.
///
/// Identifiers are allocated by the chain and are never reused, so a handle to a
/// removed statement cannot silently alias a newer one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(usize);

impl StmtId {
    /// Creates a new statement identifier.
    ///
    /// # Arguments
    ///
    /// * `index` - The arena index of the statement
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for StmtId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A reference from one statement to another.
///
/// # Examples
///
/// ```rust
/// use ssachain::ir::{StmtId, StmtRef};
///
/// let jump = StmtRef::branch(StmtId::new(4));
/// assert!(jump.is_branch_target());
///
/// let marker = StmtRef::provenance(StmtId::new(4));
/// assert!(!marker.is_branch_target());
/// assert_eq!(jump.target(), marker.target());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtRef {
    /// The statement being pointed at.
    target: StmtId,
    /// `true` for control transfer edges, `false` for Phi provenance markers.
    branch_target: bool,
}

impl StmtRef {
    /// Creates a control transfer reference.
    #[must_use]
    pub const fn branch(target: StmtId) -> Self {
        Self {
            target,
            branch_target: true,
        }
    }

    /// Creates a Phi provenance reference.
    #[must_use]
    pub const fn provenance(target: StmtId) -> Self {
        Self {
            target,
            branch_target: false,
        }
    }

    /// Returns the referenced statement.
    #[must_use]
    pub const fn target(&self) -> StmtId {
        self.target
    }

    /// Returns `true` if this reference is a control transfer edge.
    #[must_use]
    pub const fn is_branch_target(&self) -> bool {
        self.branch_target
    }
}

/// Binary operators of the three-address IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum BinOp {
    /// Addition.
    #[strum(serialize = "+")]
    Add,
    /// Subtraction.
    #[strum(serialize = "-")]
    Sub,
    /// Multiplication.
    #[strum(serialize = "*")]
    Mul,
    /// Division.
    #[strum(serialize = "/")]
    Div,
    /// Remainder.
    #[strum(serialize = "%")]
    Rem,
    /// Bitwise and.
    #[strum(serialize = "&")]
    And,
    /// Bitwise or.
    #[strum(serialize = "|")]
    Or,
    /// Bitwise exclusive or.
    #[strum(serialize = "^")]
    Xor,
    /// Equality comparison.
    #[strum(serialize = "==")]
    Eq,
    /// Inequality comparison.
    #[strum(serialize = "!=")]
    Ne,
    /// Signed less-than comparison.
    #[strum(serialize = "<")]
    Lt,
}

/// Right-hand side of an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Plain copy of a value.
    Use(Value),
    /// Binary operation on two values.
    Binary {
        /// The operator.
        op: BinOp,
        /// Left operand.
        left: Value,
        /// Right operand.
        right: Value,
    },
    /// SSA merge of values flowing in from predecessor statements.
    Phi(PhiExpr),
}

impl Expr {
    /// Returns the values read by this expression, in operand order.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Self::Use(value) => vec![value],
            Self::Binary { left, right, .. } => vec![left, right],
            Self::Phi(phi) => phi.values().collect(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Use(value) => write!(f, "{value}"),
            Self::Binary { op, left, right } => write!(f, "{left} {op} {right}"),
            Self::Phi(phi) => write!(f, "{phi}"),
        }
    }
}

/// A statement of the three-address IR.
///
/// # Examples
///
/// ```rust
/// use ssachain::ir::{Expr, Local, Stmt, StmtId, Value};
///
/// let copy = Stmt::Assign { dest: Local::new(1), source: Expr::Use(Value::Local(Local::new(0))) };
/// assert!(copy.falls_through());
/// assert!(copy.refs().is_empty());
///
/// let jump = Stmt::Goto { target: StmtId::new(0) };
/// assert!(!jump.falls_through());
/// assert_eq!(jump.refs().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// Does nothing; commonly used as a block label.
    Nop,
    /// `dest = source`.
    Assign {
        /// The variable being defined.
        dest: Local,
        /// The expression computing the value.
        source: Expr,
    },
    /// Unconditional jump.
    Goto {
        /// Jump target.
        target: StmtId,
    },
    /// Conditional jump, taken when `condition` is non-zero; falls through otherwise.
    If {
        /// The tested value.
        condition: Value,
        /// Jump target when the condition holds.
        target: StmtId,
    },
    /// Multi-way jump.
    Switch {
        /// The value being switched on.
        key: Value,
        /// Case targets in table order.
        targets: Vec<StmtId>,
        /// Target when no case matches.
        default: StmtId,
    },
    /// Method return.
    Return(Option<Value>),
    /// Exception throw.
    Throw(Value),
}

impl Stmt {
    /// Returns every outgoing reference of this statement.
    ///
    /// Branch targets come first in operand order, followed by the predecessor markers
    /// of a Phi source in argument order.
    #[must_use]
    pub fn refs(&self) -> Vec<StmtRef> {
        match self {
            Self::Goto { target } | Self::If { target, .. } => vec![StmtRef::branch(*target)],
            Self::Switch {
                targets, default, ..
            } => targets
                .iter()
                .chain(std::iter::once(default))
                .map(|target| StmtRef::branch(*target))
                .collect(),
            Self::Assign {
                source: Expr::Phi(phi),
                ..
            } => phi.preds().map(StmtRef::provenance).collect(),
            Self::Nop | Self::Assign { .. } | Self::Return(_) | Self::Throw(_) => Vec::new(),
        }
    }

    /// Returns the branch targets of this statement.
    #[must_use]
    pub fn branch_targets(&self) -> Vec<StmtId> {
        self.refs()
            .into_iter()
            .filter(StmtRef::is_branch_target)
            .map(|r| r.target())
            .collect()
    }

    /// Rewrites every branch target equal to `from` into `to`.
    ///
    /// Phi provenance markers are left alone. Returns the number of rewritten targets.
    pub fn retarget_branches(&mut self, from: StmtId, to: StmtId) -> usize {
        let mut count = 0;
        let mut swap = |target: &mut StmtId| {
            if *target == from {
                *target = to;
                count += 1;
            }
        };

        match self {
            Self::Goto { target } | Self::If { target, .. } => swap(target),
            Self::Switch {
                targets, default, ..
            } => {
                targets.iter_mut().for_each(&mut swap);
                swap(default);
            }
            Self::Nop | Self::Assign { .. } | Self::Return(_) | Self::Throw(_) => {}
        }
        count
    }

    /// Returns `true` if this statement may transfer control to an explicit target.
    #[must_use]
    pub const fn branches(&self) -> bool {
        matches!(self, Self::Goto { .. } | Self::If { .. } | Self::Switch { .. })
    }

    /// Returns `true` if control can continue with the next statement in program order.
    ///
    /// A conditional jump falls through when its condition fails; unconditional jumps,
    /// switches, returns and throws never do.
    #[must_use]
    pub const fn falls_through(&self) -> bool {
        matches!(self, Self::Nop | Self::Assign { .. } | Self::If { .. })
    }

    /// Returns the local defined by this statement, if any.
    #[must_use]
    pub const fn def(&self) -> Option<Local> {
        match self {
            Self::Assign { dest, .. } => Some(*dest),
            _ => None,
        }
    }

    /// Returns the values read by this statement.
    #[must_use]
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Self::Assign { source, .. } => source.values(),
            Self::If { condition, .. } => vec![condition],
            Self::Switch { key, .. } => vec![key],
            Self::Return(Some(value)) | Self::Throw(value) => vec![value],
            Self::Nop | Self::Goto { .. } | Self::Return(None) => Vec::new(),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop => write!(f, "nop"),
            Self::Assign { dest, source } => write!(f, "{dest} = {source}"),
            Self::Goto { target } => write!(f, "goto {target}"),
            Self::If { condition, target } => write!(f, "if {condition} goto {target}"),
            Self::Switch {
                key,
                targets,
                default,
            } => {
                write!(f, "switch {key} [")?;
                for (i, target) in targets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{target}")?;
                }
                write!(f, "] default {default}")
            }
            Self::Return(Some(value)) => write!(f, "return {value}"),
            Self::Return(None) => write!(f, "return"),
            Self::Throw(value) => write!(f, "throw {value}"),
        }
    }
}
