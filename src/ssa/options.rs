//! Phase options for SSA construction and elimination.
//!
//! Options are grouped by named phase and resolved outside of this crate through a
//! [`PhaseRegistry`]. An option string such as `"verbose naive-phi-elimination:true"`
//! can be layered on top of a phase's registered options.
//!
//! # Option String Syntax
//!
//! - Tokens are separated by whitespace or commas
//! - `key:value` sets `key` to `value`
//! - A bare `key` is shorthand for `key:true`
//! - Later tokens override earlier ones
//!
//! The only option interpreted here is `naive-phi-elimination` (default `false`), which
//! makes the eliminator skip dead code elimination and local reallocation before
//! eliminating Phi nodes. Other keys are preserved in [`SsaOptions::raw`] for
//! collaborators to read.

use std::collections::{BTreeMap, HashMap};

use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// Name of the phase whose options are used when none is given.
pub const DEFAULT_PHASE: &str = "ssa";

/// The options this crate interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SsaOption {
    /// Skip dead code elimination and local reallocation before eliminating Phi nodes.
    NaivePhiElimination,
}

/// A parsed set of `key:value` phase options.
///
/// # Examples
///
/// ```rust
/// use ssachain::ssa::PhaseOptions;
///
/// let opts = PhaseOptions::parse("naive-phi-elimination, verbose:false")?;
/// assert_eq!(opts.get("naive-phi-elimination"), Some("true"));
/// assert_eq!(opts.get("verbose"), Some("false"));
/// # Ok::<(), ssachain::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseOptions {
    values: BTreeMap<String, String>,
}

impl PhaseOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an option string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for tokens with an empty key or value.
    pub fn parse(input: &str) -> Result<Self> {
        let mut options = Self::new();

        for token in input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let (key, value) = match token.split_once(':') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (token, "true"),
            };
            if key.is_empty() || value.is_empty() {
                return Err(Error::InvalidOption(token.to_string()));
            }
            options.set(key, value);
        }

        Ok(options)
    }

    /// Sets an option, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns the raw value of an option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns a boolean option, or `default` if it is not set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if the value is neither `true` nor `false`.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(Error::InvalidOption(format!("{key}:{other}"))),
        }
    }

    /// Layers `overrides` on top of these options.
    #[must_use]
    pub fn merged(mut self, overrides: &PhaseOptions) -> Self {
        for (key, value) in &overrides.values {
            self.values.insert(key.clone(), value.clone());
        }
        self
    }

    /// Iterates over all options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Source of per-phase options.
///
/// The embedding tool owns option declaration and defaults; this crate only asks for the
/// options of a phase by name.
pub trait PhaseRegistry {
    /// Returns the options registered for `phase`, empty if the phase is unknown.
    fn phase_options(&self, phase: &str) -> PhaseOptions;
}

/// In-memory [`PhaseRegistry`].
///
/// # Examples
///
/// ```rust
/// use ssachain::ssa::{PhaseOptions, PhaseRegistry, StaticPhaseRegistry, DEFAULT_PHASE};
///
/// let registry = StaticPhaseRegistry::new()
///     .with_phase(DEFAULT_PHASE, PhaseOptions::parse("naive-phi-elimination")?);
/// assert_eq!(
///     registry.phase_options(DEFAULT_PHASE).get("naive-phi-elimination"),
///     Some("true")
/// );
/// assert!(registry.phase_options("other").is_empty());
/// # Ok::<(), ssachain::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticPhaseRegistry {
    phases: HashMap<String, PhaseOptions>,
}

impl StaticPhaseRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers options for a phase, builder style.
    #[must_use]
    pub fn with_phase(mut self, phase: impl Into<String>, options: PhaseOptions) -> Self {
        self.insert(phase, options);
        self
    }

    /// Registers options for a phase, replacing earlier ones.
    pub fn insert(&mut self, phase: impl Into<String>, options: PhaseOptions) {
        self.phases.insert(phase.into(), options);
    }
}

impl PhaseRegistry for StaticPhaseRegistry {
    fn phase_options(&self, phase: &str) -> PhaseOptions {
        self.phases.get(phase).cloned().unwrap_or_default()
    }
}

/// Typed view of the options of one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsaOptions {
    /// The phase the options were resolved for.
    pub phase: String,
    /// Skip dead code elimination and local reallocation before eliminating Phi nodes.
    pub naive_phi_elimination: bool,
    /// Every option as given, including ones this crate does not interpret.
    pub raw: PhaseOptions,
}

impl SsaOptions {
    /// Interprets the options of `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if a recognised option has a non-boolean value.
    pub fn from_phase_options(phase: &str, raw: PhaseOptions) -> Result<Self> {
        let naive_phi_elimination =
            raw.get_bool(SsaOption::NaivePhiElimination.as_ref(), false)?;

        Ok(Self {
            phase: phase.to_string(),
            naive_phi_elimination,
            raw,
        })
    }
}

impl Default for SsaOptions {
    fn default() -> Self {
        Self {
            phase: DEFAULT_PHASE.to_string(),
            naive_phi_elimination: false,
            raw: PhaseOptions::new(),
        }
    }
}
