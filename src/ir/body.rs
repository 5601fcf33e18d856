//! Conventional (non-SSA) method bodies.

use std::fmt;

use crate::ir::{Local, StmtChain};

/// The method a body belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Number of parameters; parameters occupy the first locals of the body.
    pub param_count: usize,
}

impl Method {
    /// Creates a new method descriptor.
    pub fn new(name: impl Into<String>, param_count: usize) -> Self {
        Self {
            name: name.into(),
            param_count,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.param_count)
    }
}

/// A method body in conventional three-address form.
///
/// # Examples
///
/// ```rust
/// use ssachain::ir::{Body, Method, Stmt};
///
/// let mut body = Body::new(Method::new("run", 1));
/// let tmp = body.new_local();
/// assert_eq!(tmp.index(), 1);
///
/// body.chain_mut().push(Stmt::Return(None));
/// assert_eq!(body.chain().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Body {
    method: Method,
    local_count: usize,
    chain: StmtChain,
}

impl Body {
    /// Creates an empty body whose only locals are the method parameters.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            local_count: method.param_count,
            method,
            chain: StmtChain::new(),
        }
    }

    /// Creates a body from an existing chain and local count.
    #[must_use]
    pub fn from_parts(method: Method, local_count: usize, chain: StmtChain) -> Self {
        Self {
            local_count: local_count.max(method.param_count),
            method,
            chain,
        }
    }

    /// Returns the owning method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the number of locals, parameters included.
    #[must_use]
    pub const fn local_count(&self) -> usize {
        self.local_count
    }

    /// Returns the parameter locals.
    pub fn params(&self) -> impl Iterator<Item = Local> {
        (0..self.method.param_count).map(Local::new)
    }

    /// Allocates a fresh local.
    pub fn new_local(&mut self) -> Local {
        let local = Local::new(self.local_count);
        self.local_count += 1;
        local
    }

    /// Returns the statement chain.
    #[must_use]
    pub fn chain(&self) -> &StmtChain {
        &self.chain
    }

    /// Returns the statement chain for mutation.
    pub fn chain_mut(&mut self) -> &mut StmtChain {
        &mut self.chain
    }

    /// Splits the body into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Method, usize, StmtChain) {
        (self.method, self.local_count, self.chain)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "body {} ({} locals)", self.method, self.local_count)?;
        write!(f, "{}", self.chain)
    }
}
