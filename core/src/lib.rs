//! # Polyweight
//!
//! Weight-space polyhedron exploration for computing the non-dominated outcomes of
//! multi-objective linear and integer programs.
//!
//! The problem itself is hidden behind an [`Oracle`] that minimises weighted sums (and, for the
//! two-projection phase, weighted Chebyshev norms) of the objectives. The [`Explorer`] drives
//! the oracle through the exploration phases and collects the outcomes.

use std::fmt;

pub mod options;
pub use options::{ExplorationConfig, ExplorationMode, Limits};

pub mod types;
pub use types::{Outcome, Solution, Weight};

pub mod boxes;
pub mod ddm;
pub mod projections;

pub mod weight_space;
pub use weight_space::{NumericalInconsistency, WeightSpacePolyhedron};

pub mod oracle;
pub use oracle::{ChebyshevOracle, Explicit, Oracle, OracleResult};

pub mod explorer;
pub use explorer::{ExplorationStatus, Explorer, Interrupter};

pub mod logging;

pub(crate) mod termination;
pub use termination::MaybeTerminated;
pub use termination::MaybeTerminatedError;
pub use termination::Termination;

/// Exploration phases that the explorer can be in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Lexicographic optimization of every objective ordering
    LexOpt,
    /// Exploration of the weight-space polyhedron
    WeightSpace,
    /// Chebyshev sweeps of the bi-objective projections
    TwoProj,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::LexOpt => write!(f, "lex-opt"),
            Phase::WeightSpace => write!(f, "weight-space"),
            Phase::TwoProj => write!(f, "two-proj"),
        }
    }
}

/// The kind of a newly found outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    /// An extreme supported or lexicographically optimal outcome
    Bounded,
    /// A direction of unboundedness
    Unbounded,
    /// An outcome found by the two-projection phase
    Unsupported,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Bounded => write!(f, "bounded"),
            OutcomeKind::Unbounded => write!(f, "unbounded"),
            OutcomeKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Statistics of the explorer
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Stats {
    /// The number of calls to the oracle
    pub n_oracle_calls: usize,
    /// The number of bounded outcomes
    pub n_bounded: usize,
    /// The number of unbounded directions
    pub n_unbounded: usize,
    /// The number of outcomes found by the two-projection phase
    pub n_unsupported: usize,
    /// The number of weight-space vertices ever created
    pub n_vertices_created: usize,
    /// The number of weight-space vertices cut off by new outcomes
    pub n_vertices_obsolete: usize,
    /// The number of objectives
    pub n_objs: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "n-objs: {}", self.n_objs)?;
        writeln!(f, "n-oracle-calls: {}", self.n_oracle_calls)?;
        writeln!(f, "n-bounded: {}", self.n_bounded)?;
        writeln!(f, "n-unbounded: {}", self.n_unbounded)?;
        writeln!(f, "n-unsupported: {}", self.n_unsupported)?;
        writeln!(f, "n-vertices-created: {}", self.n_vertices_created)?;
        write!(f, "n-vertices-obsolete: {}", self.n_vertices_obsolete)
    }
}

/// A logger to attach to an explorer
pub trait WriteExplorationLog {
    /// Adds an oracle call to the log
    fn log_oracle_call(&mut self, result: &OracleResult) -> anyhow::Result<()>;
    /// Adds a newly found outcome to the log
    fn log_outcome(&mut self, kind: OutcomeKind, outcome: &[f64]) -> anyhow::Result<()>;
    /// Adds the start of a phase to the log
    fn log_phase(&mut self, phase: Phase) -> anyhow::Result<()>;
    /// Adds a new routine starting to the log
    fn log_routine_start(&mut self, desc: &'static str) -> anyhow::Result<()>;
    /// Adds a new routine ending to the log
    fn log_routine_end(&mut self) -> anyhow::Result<()>;
    /// Adds end of exploration to the log
    fn log_end_explore(&mut self) -> anyhow::Result<()>;
    /// Logs any string
    fn log_message(&mut self, msg: &str) -> anyhow::Result<()>;
}
