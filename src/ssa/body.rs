//! SSA-form method bodies and the conversion entry points.
//!
//! Building SSA form (Phi placement at dominance frontiers, renaming) and lowering it
//! back to a conventional body are done by external collaborators behind the
//! [`SsaBuilder`] and [`SsaEliminator`] traits. The free functions in this module resolve
//! phase options, hand bodies to those collaborators and construct Phi expressions; they
//! hold no state of their own.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ssachain::ssa;
//!
//! let registry = StaticPhaseRegistry::new()
//!     .with_phase("ssa", PhaseOptions::parse("naive-phi-elimination")?);
//!
//! let mut ssa_body = ssa::from_body(&builder, &registry, body)?;
//! ssa_body.redirect_to_preds(dead_label)?;
//! ssa_body.chain_mut().remove(dead_label)?;
//!
//! let body = ssa::to_body(&eliminator, ssa_body)?;
//! ```

use std::fmt;

use log::debug;
use rayon::prelude::*;

use crate::{
    ir::{Body, Local, Method, StmtChain, StmtId, Value},
    ssa::{
        phi_expr, redirect_to_preds, PhaseOptions, PhaseRegistry, PhiExpr, SsaOptions,
        DEFAULT_PHASE,
    },
    Result,
};

/// A method body in SSA form.
///
/// Same shape as a conventional [`Body`] plus the options it was built with, which
/// travel with it to the eliminator.
#[derive(Debug, Clone)]
pub struct SsaBody {
    method: Method,
    local_count: usize,
    chain: StmtChain,
    options: SsaOptions,
}

impl SsaBody {
    /// Assembles an SSA body from its parts.
    ///
    /// This is what [`SsaBuilder`] implementations return.
    #[must_use]
    pub fn from_parts(
        method: Method,
        local_count: usize,
        chain: StmtChain,
        options: SsaOptions,
    ) -> Self {
        Self {
            local_count: local_count.max(method.param_count),
            method,
            chain,
            options,
        }
    }

    /// Returns the owning method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the options this body was built with.
    #[must_use]
    pub fn options(&self) -> &SsaOptions {
        &self.options
    }

    /// Replaces the options handed to the eliminator.
    pub fn set_options(&mut self, options: SsaOptions) {
        self.options = options;
    }

    /// Returns the number of locals, parameters included.
    #[must_use]
    pub const fn local_count(&self) -> usize {
        self.local_count
    }

    /// Allocates a fresh local, typically a new SSA version.
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

    /// Iterates over the Phi nodes in program order.
    pub fn phi_nodes(&self) -> impl Iterator<Item = (StmtId, &PhiExpr)> + '_ {
        self.chain
            .iter()
            .filter_map(|(id, stmt)| phi_expr(stmt).map(|phi| (id, phi)))
    }

    /// Returns the number of Phi nodes.
    #[must_use]
    pub fn phi_count(&self) -> usize {
        self.phi_nodes().count()
    }

    /// Patches the Phi nodes that use `remove` as a predecessor.
    ///
    /// See [`redirect_to_preds`](crate::ssa::redirect_to_preds).
    ///
    /// # Errors
    ///
    /// Any error of [`redirect_to_preds`](crate::ssa::redirect_to_preds).
    pub fn redirect_to_preds(&mut self, remove: StmtId) -> Result<usize> {
        redirect_to_preds(&mut self.chain, remove)
    }

    /// Splits the body into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Method, usize, StmtChain, SsaOptions) {
        (self.method, self.local_count, self.chain, self.options)
    }
}

impl fmt::Display for SsaBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ssa body {} ({} locals, phase {})",
            self.method, self.local_count, self.options.phase
        )?;
        write!(f, "{}", self.chain)
    }
}

/// Lifts conventional bodies into SSA form.
pub trait SsaBuilder {
    /// Builds the SSA form of `body`.
    ///
    /// # Errors
    ///
    /// Implementations report their failures as [`Error::Build`](crate::Error::Build).
    fn build(&self, body: Body, options: &SsaOptions) -> Result<SsaBody>;
}

/// Lowers SSA bodies back to conventional form, dissolving all Phi nodes.
pub trait SsaEliminator {
    /// Eliminates the Phi nodes of `body`.
    ///
    /// When `body.options().naive_phi_elimination` is set, dead code elimination and local
    /// reallocation are skipped before the Phi nodes are dissolved.
    ///
    /// # Errors
    ///
    /// Implementations report their failures as [`Error::Eliminate`](crate::Error::Eliminate).
    fn eliminate(&self, body: SsaBody) -> Result<Body>;
}

/// Returns an empty SSA body for `method`, built with default options.
#[must_use]
pub fn new_body(method: Method) -> SsaBody {
    SsaBody::from_parts(method, 0, StmtChain::new(), SsaOptions::default())
}

/// Builds the SSA form of `body` with the options of [`DEFAULT_PHASE`].
///
/// # Errors
///
/// Option errors, or whatever the builder reports.
pub fn from_body<B, R>(builder: &B, registry: &R, body: Body) -> Result<SsaBody>
where
    B: SsaBuilder + ?Sized,
    R: PhaseRegistry + ?Sized,
{
    from_body_in_phase(builder, registry, body, DEFAULT_PHASE)
}

/// Builds the SSA form of `body` with the options of `phase`.
///
/// # Errors
///
/// Option errors, or whatever the builder reports.
pub fn from_body_in_phase<B, R>(
    builder: &B,
    registry: &R,
    body: Body,
    phase: &str,
) -> Result<SsaBody>
where
    B: SsaBuilder + ?Sized,
    R: PhaseRegistry + ?Sized,
{
    let options = SsaOptions::from_phase_options(phase, registry.phase_options(phase))?;
    build(builder, body, &options)
}

/// Builds the SSA form of `body` with the options of `phase` overridden by `options`.
///
/// # Arguments
///
/// * `builder` - The SSA construction collaborator
/// * `registry` - Source of the phase's registered options
/// * `body` - The conventional body
/// * `phase` - Phase name
/// * `options` - Option string layered on top of the registered options
///
/// # Errors
///
/// [`Error::InvalidOption`](crate::Error::InvalidOption) for a malformed option string,
/// or whatever the builder reports.
pub fn from_body_with_options<B, R>(
    builder: &B,
    registry: &R,
    body: Body,
    phase: &str,
    options: &str,
) -> Result<SsaBody>
where
    B: SsaBuilder + ?Sized,
    R: PhaseRegistry + ?Sized,
{
    let raw = registry
        .phase_options(phase)
        .merged(&PhaseOptions::parse(options)?);
    let options = SsaOptions::from_phase_options(phase, raw)?;
    build(builder, body, &options)
}

/// Builds the SSA forms of many bodies in parallel.
///
/// Bodies share no mutable state, so each one is handed to the builder on its own
/// worker. Results are returned in input order.
///
/// # Errors
///
/// Option errors abort the whole batch; builder failures are reported per body.
pub fn from_bodies<B, R>(
    builder: &B,
    registry: &R,
    bodies: Vec<Body>,
    phase: &str,
) -> Result<Vec<Result<SsaBody>>>
where
    B: SsaBuilder + Sync + ?Sized,
    R: PhaseRegistry + ?Sized,
{
    let options = SsaOptions::from_phase_options(phase, registry.phase_options(phase))?;
    Ok(bodies
        .into_par_iter()
        .map(|body| build(builder, body, &options))
        .collect())
}

fn build<B>(builder: &B, body: Body, options: &SsaOptions) -> Result<SsaBody>
where
    B: SsaBuilder + ?Sized,
{
    debug!(
        "building SSA for {} (phase {}, naive phi elimination {})",
        body.method(),
        options.phase,
        options.naive_phi_elimination
    );
    builder.build(body, options)
}

/// Lowers an SSA body back to conventional form.
///
/// # Errors
///
/// Whatever the eliminator reports.
pub fn to_body<E>(eliminator: &E, body: SsaBody) -> Result<Body>
where
    E: SsaEliminator + ?Sized,
{
    debug!(
        "eliminating {} Phi node(s) in {}",
        body.phi_count(),
        body.method()
    );
    eliminator.eliminate(body)
}

/// Creates a Phi expression whose arguments all refer to `local`.
///
/// See [`PhiExpr::trivial`].
#[must_use]
pub fn new_trivial_phi(local: Local, preds: Vec<StmtId>) -> PhiExpr {
    PhiExpr::trivial(local, preds)
}

/// Creates a Phi expression pairing `values` with `preds` positionally.
///
/// # Errors
///
/// [`Error::PhiArity`](crate::Error::PhiArity) if the lists differ in length.
pub fn new_phi(values: Vec<Value>, preds: Vec<StmtId>) -> Result<PhiExpr> {
    PhiExpr::new(values, preds)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        ir::{Expr, Stmt},
        ssa::{phi_dest, StaticPhaseRegistry},
        test::{local, phi_stmt, three_way_merge},
        Error,
    };

    /// Records the options it was called with and wraps the chain unchanged.
    #[derive(Default)]
    struct RecordingBuilder {
        calls: AtomicUsize,
    }

    impl SsaBuilder for RecordingBuilder {
        fn build(&self, body: Body, options: &SsaOptions) -> Result<SsaBody> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if body.method().name == "broken" {
                return Err(Error::Build("irreducible".into()));
            }
            let (method, locals, chain) = body.into_parts();
            Ok(SsaBody::from_parts(method, locals, chain, options.clone()))
        }
    }

    /// Turns every Phi node into a copy of its first argument.
    struct FirstArgEliminator;

    impl SsaEliminator for FirstArgEliminator {
        fn eliminate(&self, body: SsaBody) -> Result<Body> {
            let (method, locals, mut chain, _) = body.into_parts();
            let phis: Vec<StmtId> = chain
                .iter()
                .filter(|(_, stmt)| phi_dest(stmt).is_some())
                .map(|(id, _)| id)
                .collect();
            for id in phis {
                chain.modify(id, |stmt| {
                    if let Stmt::Assign { source, .. } = stmt {
                        let first = match source {
                            Expr::Phi(phi) => phi.value(0).cloned(),
                            _ => None,
                        };
                        if let Some(value) = first {
                            *source = Expr::Use(value);
                        }
                    }
                })?;
            }
            Ok(Body::from_parts(method, locals, chain))
        }
    }

    fn body_named(name: &str) -> Body {
        let mut body = Body::new(Method::new(name, 2));
        body.chain_mut().push(Stmt::Return(None));
        body
    }

    #[test]
    fn test_new_body_is_empty() {
        let body = new_body(Method::new("m", 3));
        assert!(body.chain().is_empty());
        assert_eq!(body.local_count(), 3);
        assert_eq!(body.options(), &SsaOptions::default());
        assert_eq!(body.phi_count(), 0);
    }

    #[test]
    fn test_from_body_uses_default_phase() {
        let registry = StaticPhaseRegistry::new().with_phase(
            DEFAULT_PHASE,
            PhaseOptions::parse("naive-phi-elimination").unwrap(),
        );
        let builder = RecordingBuilder::default();

        let ssa = from_body(&builder, &registry, body_named("m")).unwrap();
        assert_eq!(ssa.options().phase, DEFAULT_PHASE);
        assert!(ssa.options().naive_phi_elimination);
        assert_eq!(ssa.chain().len(), 1);
    }

    #[test]
    fn test_from_body_in_named_phase() {
        let registry = StaticPhaseRegistry::new().with_phase(
            DEFAULT_PHASE,
            PhaseOptions::parse("naive-phi-elimination").unwrap(),
        );

        let ssa =
            from_body_in_phase(&RecordingBuilder::default(), &registry, body_named("m"), "alt")
                .unwrap();
        assert_eq!(ssa.options().phase, "alt");
        assert!(!ssa.options().naive_phi_elimination);
    }

    #[test]
    fn test_option_string_overrides_phase() {
        let registry = StaticPhaseRegistry::new().with_phase(
            DEFAULT_PHASE,
            PhaseOptions::parse("naive-phi-elimination:true other:1").unwrap(),
        );

        let ssa = from_body_with_options(
            &RecordingBuilder::default(),
            &registry,
            body_named("m"),
            DEFAULT_PHASE,
            "naive-phi-elimination:false",
        )
        .unwrap();
        assert!(!ssa.options().naive_phi_elimination);
        assert_eq!(ssa.options().raw.get("other"), Some("1"));
    }

    #[test]
    fn test_bad_option_string() {
        let err = from_body_with_options(
            &RecordingBuilder::default(),
            &StaticPhaseRegistry::new(),
            body_named("m"),
            DEFAULT_PHASE,
            ":oops",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn test_from_bodies_keeps_order() {
        let builder = RecordingBuilder::default();
        let bodies = vec![body_named("a"), body_named("broken"), body_named("c")];

        let results =
            from_bodies(&builder, &StaticPhaseRegistry::new(), bodies, DEFAULT_PHASE).unwrap();

        assert_eq!(builder.calls.load(Ordering::Relaxed), 3);
        assert_eq!(results[0].as_ref().unwrap().method().name, "a");
        assert!(matches!(results[1], Err(Error::Build(_))));
        assert_eq!(results[2].as_ref().unwrap().method().name, "c");
    }

    #[test]
    fn test_to_body_dissolves_phis() {
        let (chain, m) = three_way_merge();
        let ssa = SsaBody::from_parts(Method::new("m", 2), 5, chain, SsaOptions::default());
        assert_eq!(ssa.phi_count(), 1);

        let body = to_body(&FirstArgEliminator, ssa).unwrap();
        assert_eq!(
            body.chain().get(m.phi),
            Some(&Stmt::Assign {
                dest: Local::new(4),
                source: Expr::Use(local(2)),
            })
        );
        assert!(body.chain().refs_to(m.removed).iter().all(|s| s.is_branch_target()));
    }

    #[test]
    fn test_ssa_body_redirect() {
        let (chain, m) = three_way_merge();
        let mut ssa = SsaBody::from_parts(Method::new("m", 2), 5, chain, SsaOptions::default());

        assert_eq!(ssa.redirect_to_preds(m.removed).unwrap(), 1);
        let (_, phi) = ssa.phi_nodes().next().unwrap();
        assert_eq!(phi.len(), 4);
    }

    #[test]
    fn test_phi_constructors() {
        let preds = vec![StmtId::new(1), StmtId::new(2)];
        let trivial = new_trivial_phi(Local::new(0), preds.clone());
        assert!(trivial.values().all(|v| *v == local(0)));

        assert!(new_phi(vec![local(1)], preds.clone()).is_err());
        let phi = new_phi(vec![local(1), local(2)], preds).unwrap();

        let mut ssa = new_body(Method::new("m", 0));
        let dest = ssa.new_local();
        let id = ssa.chain_mut().push(Stmt::Assign {
            dest,
            source: Expr::Phi(phi.clone()),
        });
        assert_eq!(ssa.phi_nodes().collect::<Vec<_>>(), vec![(id, &phi)]);
        assert_eq!(
            ssa.chain().get(id),
            Some(&phi_stmt(
                0,
                vec![local(1), local(2)],
                vec![StmtId::new(1), StmtId::new(2)]
            ))
        );
    }
}
