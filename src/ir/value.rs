//! Values of the three-address IR.
//!
//! A [`Value`] is what an operand slot can hold: either a [`Local`] variable or a
//! [`Constant`]. Values never nest; composite computations live in
//! [`Expr`](crate::ir::Expr), which only ever appears as the right-hand side of an
//! assignment.

use std::fmt;

/// Handle of a local variable within one method body.
///
/// Locals are plain indices into the body's local table. After SSA construction every
/// renamed version of a source variable is a distinct `Local`.
///
/// # Examples
///
/// ```rust
/// use ssachain::ir::Local;
///
/// let local = Local::new(3);
/// assert_eq!(local.index(), 3);
/// assert_eq!(local.to_string(), "l3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Local(usize);

impl Local {
    /// Creates a new local handle.
    ///
    /// # Arguments
    ///
    /// * `index` - The index into the body's local table
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// A compile-time constant operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// The null reference.
    Null,
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// String literal.
    Str(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}L"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// An operand: a local variable or a constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A local variable.
    Local(Local),
    /// A constant.
    Const(Constant),
}

impl Value {
    /// Returns the local if this value is one.
    #[must_use]
    pub const fn as_local(&self) -> Option<Local> {
        match self {
            Self::Local(local) => Some(*local),
            Self::Const(_) => None,
        }
    }

    /// Returns `true` if this value is a constant.
    #[must_use]
    pub const fn is_const(&self) -> bool {
        matches!(self, Self::Const(_))
    }
}

impl From<Local> for Value {
    fn from(local: Local) -> Self {
        Self::Local(local)
    }
}

impl From<Constant> for Value {
    fn from(constant: Constant) -> Self {
        Self::Const(constant)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(local) => write!(f, "{local}"),
            Self::Const(constant) => write!(f, "{constant}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_display() {
        assert_eq!(format!("{}", Local::new(7)), "l7");
        assert_eq!(format!("{:?}", Local::new(0)), "l0");
    }

    #[test]
    fn test_constant_display() {
        assert_eq!(Constant::Null.to_string(), "null");
        assert_eq!(Constant::Int(-4).to_string(), "-4");
        assert_eq!(Constant::Long(9).to_string(), "9L");
        assert_eq!(Constant::Str("hi".into()).to_string(), "\"hi\"");
    }

    #[test]
    fn test_value_accessors() {
        let local: Value = Local::new(2).into();
        assert_eq!(local.as_local(), Some(Local::new(2)));
        assert!(!local.is_const());

        let constant: Value = Constant::Int(1).into();
        assert_eq!(constant.as_local(), None);
        assert!(constant.is_const());
    }
}
