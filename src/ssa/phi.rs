//! Phi expression representation for SSA form.
//!
//! A Phi expression is the right-hand side of a Phi node: it selects one of its argument
//! values depending on which control flow predecessor was taken to reach the statement
//! holding it.
//!
//! # Semantics
//!
//! `l3 = phi(l1 from s4, l2 from s8)` means:
//! - If control arrived through statement `s4`, use `l1`
//! - If control arrived through statement `s8`, use `l2`
//!
//! # Invariants
//!
//! - There is exactly one argument per incoming edge of the block that starts at the
//!   Phi node's statement
//! - Argument `i` is bound to the predecessor reached by edge `i`; consumers match
//!   values to predecessors by position, never by value equality
//!
//! The predecessor of each argument doubles as a provenance reference of the holding
//! statement (see [`StmtRef::provenance`](crate::ir::StmtRef::provenance)). Once a Phi
//! expression lives inside a [`StmtChain`](crate::ir::StmtChain), mutate it through
//! [`StmtChain::modify`](crate::ir::StmtChain::modify) so the reverse index follows.

use std::fmt;

use crate::{
    ir::{Local, StmtId, Value},
    Error, Result,
};

/// One argument of a Phi expression: a value coming from a specific predecessor.
///
/// # Examples
///
/// ```rust
/// use ssachain::{ir::{Local, StmtId, Value}, ssa::PhiArg};
///
/// let arg = PhiArg::new(Value::Local(Local::new(2)), StmtId::new(1));
/// assert_eq!(arg.pred(), StmtId::new(1));
/// assert_eq!(arg.to_string(), "l2 from s1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiArg {
    /// The value selected when control arrives from `pred`.
    value: Value,
    /// The predecessor statement this value flows from.
    pred: StmtId,
}

impl PhiArg {
    /// Creates a new Phi argument.
    ///
    /// # Arguments
    ///
    /// * `value` - The value supplied along this edge
    /// * `pred` - The predecessor statement the edge starts at
    #[must_use]
    pub const fn new(value: Value, pred: StmtId) -> Self {
        Self { value, pred }
    }

    /// Returns the argument value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the predecessor statement.
    #[must_use]
    pub const fn pred(&self) -> StmtId {
        self.pred
    }
}

impl fmt::Display for PhiArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.value, self.pred)
    }
}

/// An SSA merge operand: an ordered list of (value, predecessor) pairs.
///
/// # Examples
///
/// ```rust
/// use ssachain::{ir::{Constant, Local, StmtId, Value}, ssa::PhiExpr};
///
/// // Before renaming every slot names the same variable
/// let trivial = PhiExpr::trivial(Local::new(0), vec![StmtId::new(1), StmtId::new(4)]);
/// assert_eq!(trivial.len(), 2);
///
/// // After renaming values are paired with predecessors positionally
/// let phi = PhiExpr::new(
///     vec![Value::Local(Local::new(1)), Value::Const(Constant::Int(0))],
///     vec![StmtId::new(1), StmtId::new(4)],
/// )?;
/// assert_eq!(phi.arg_index(StmtId::new(4)), Some(1));
/// assert_eq!(phi.arg_index(StmtId::new(9)), None);
/// # Ok::<(), ssachain::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhiExpr {
    args: Vec<PhiArg>,
}

impl PhiExpr {
    /// Creates a Phi expression pairing `values` with `preds` positionally.
    ///
    /// # Arguments
    ///
    /// * `values` - Argument values (locals or constants)
    /// * `preds` - Predecessor statements, one per value
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhiArity`] if the two lists differ in length.
    pub fn new(values: Vec<Value>, preds: Vec<StmtId>) -> Result<Self> {
        if values.len() != preds.len() {
            return Err(Error::PhiArity {
                values: values.len(),
                preds: preds.len(),
            });
        }

        Ok(Self {
            args: values
                .into_iter()
                .zip(preds)
                .map(|(value, pred)| PhiArg::new(value, pred))
                .collect(),
        })
    }

    /// Creates a Phi expression whose arguments all refer to `local`.
    ///
    /// This is the shape Phi nodes have right after placement and before renaming.
    ///
    /// # Arguments
    ///
    /// * `local` - The not-yet-renamed variable
    /// * `preds` - Predecessor statements in edge order
    #[must_use]
    pub fn trivial(local: Local, preds: Vec<StmtId>) -> Self {
        Self {
            args: preds
                .into_iter()
                .map(|pred| PhiArg::new(Value::Local(local), pred))
                .collect(),
        }
    }

    /// Returns the arguments in edge order.
    #[must_use]
    pub fn args(&self) -> &[PhiArg] {
        &self.args
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns `true` if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns the argument values in edge order.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.args.iter().map(PhiArg::value)
    }

    /// Returns the predecessor statements in edge order.
    pub fn preds(&self) -> impl Iterator<Item = StmtId> + '_ {
        self.args.iter().map(PhiArg::pred)
    }

    /// Returns the value of argument `index`.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.args.get(index).map(PhiArg::value)
    }

    /// Returns the predecessor of argument `index`.
    #[must_use]
    pub fn pred(&self, index: usize) -> Option<StmtId> {
        self.args.get(index).map(PhiArg::pred)
    }

    /// Replaces the value of argument `index`.
    ///
    /// Returns `false` if there is no such argument.
    pub fn set_value(&mut self, index: usize, value: Value) -> bool {
        match self.args.get_mut(index) {
            Some(arg) => {
                arg.value = value;
                true
            }
            None => false,
        }
    }

    /// Rebinds argument `index` to a different predecessor.
    ///
    /// Returns `false` if there is no such argument.
    pub fn set_pred(&mut self, index: usize, pred: StmtId) -> bool {
        match self.args.get_mut(index) {
            Some(arg) => {
                arg.pred = pred;
                true
            }
            None => false,
        }
    }

    /// Appends an argument bound to `pred`.
    pub fn add_arg(&mut self, value: Value, pred: StmtId) {
        self.args.push(PhiArg::new(value, pred));
    }

    /// Removes and returns argument `index`, shifting later arguments down.
    pub fn remove_arg(&mut self, index: usize) -> Option<PhiArg> {
        if index < self.args.len() {
            Some(self.args.remove(index))
        } else {
            None
        }
    }

    /// Returns the position of the first argument bound to `pred`.
    #[must_use]
    pub fn arg_index(&self, pred: StmtId) -> Option<usize> {
        self.args.iter().position(|arg| arg.pred == pred)
    }

    /// Returns the value flowing in from `pred`.
    #[must_use]
    pub fn value_from(&self, pred: StmtId) -> Option<&Value> {
        self.arg_index(pred).and_then(|index| self.value(index))
    }
}

impl fmt::Display for PhiExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "phi(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}
