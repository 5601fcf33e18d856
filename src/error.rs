use thiserror::Error;

use crate::ir::StmtId;

macro_rules! inconsistent_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Inconsistent {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Inconsistent {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Caller Errors
/// - [`Error::PhiArity`] - Phi expression built from value and predecessor lists of different length
/// - [`Error::UnknownStmt`] - A statement handle that is not part of the chain
/// - [`Error::StillReferenced`] - Physical removal of a statement that Phi nodes still name
/// - [`Error::NoSuccessor`] - Branch references cannot be retargeted past the last statement
/// - [`Error::FlowNotPreserved`] - Removal would reroute control flow
/// - [`Error::InvalidOption`] - Malformed phase option string
///
/// ## Internal Errors
/// - [`Error::Inconsistent`] - The reverse-reference index disagrees with a Phi node
///
/// ## Collaborator Errors
/// - [`Error::Build`] - The SSA builder failed
/// - [`Error::Eliminate`] - The SSA eliminator failed
///
/// # Examples
///
/// ```rust
/// use ssachain::{Error, ir::{Local, Value}, ssa::PhiExpr};
///
/// match PhiExpr::new(vec![Value::Local(Local::new(0))], Vec::new()) {
///     Err(Error::PhiArity { values, preds }) => assert_eq!((values, preds), (1, 0)),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A Phi expression was built from lists of different length.
    ///
    /// Every argument value must be paired with exactly one predecessor statement, the
    /// lists are never truncated or padded.
    #[error("Phi expression needs one predecessor per value - {values} values, {preds} predecessors")]
    PhiArity {
        /// Number of argument values supplied
        values: usize,
        /// Number of predecessor statements supplied
        preds: usize,
    },

    /// The forward reference graph and the reverse-reference index have drifted apart.
    ///
    /// This is never a user-facing condition; it means SSA form is already corrupt. The
    /// operation that detected it aborts without modifying the body.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the broken invariant
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Inconsistent - {file}:{line}: {message}")]
    Inconsistent {
        /// The message to be printed for the Inconsistent error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The statement is not part of the chain.
    #[error("Statement {0} is not part of the chain")]
    UnknownStmt(StmtId),

    /// The statement is still the provenance marker of Phi arguments.
    ///
    /// Patch the Phi nodes with [`crate::ssa::redirect_to_preds`] before removing it.
    #[error("Statement {stmt} is still referenced by {count} Phi argument(s)")]
    StillReferenced {
        /// The statement that was about to be removed
        stmt: StmtId,
        /// Number of provenance references still targeting it
        count: usize,
    },

    /// Branch references to the statement cannot be moved to a successor.
    #[error("Statement {0} is branched to but has no successor to retarget to")]
    NoSuccessor(StmtId),

    /// Removing the statement would change where control entering it goes.
    ///
    /// Only statements with a single way out can be removed while something jumps or
    /// falls into them, and a statement that is fallen into must lead to its successor.
    #[error("Removing statement {0} would change where control entering it goes")]
    FlowNotPreserved(StmtId),

    /// A phase option string could not be parsed.
    #[error("Invalid phase option - {0}")]
    InvalidOption(String),

    /// The external SSA builder failed.
    #[error("SSA construction failed - {0}")]
    Build(String),

    /// The external SSA eliminator failed.
    #[error("SSA elimination failed - {0}")]
    Eliminate(String),
}
