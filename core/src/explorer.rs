//! # The Exploration Driver
//!
//! [`Explorer`] computes the non-dominated outcomes of a multi-objective problem that is only
//! accessible through an [`Oracle`]. The exploration runs in phases:
//!
//! 1. The lexicographic phase finds the lexicographic optima for every objective ordering
//!    starting at each objective. These seed the bounded outcomes (and unbounded directions).
//! 2. The weight-space phase computes all extreme supported outcomes by exploring the vertices
//!    of the weight-space polyhedron.
//! 3. Alternatively, for two or three objectives, the two-projection phase sweeps the
//!    bi-objective projections with weighted Chebyshev scalarizations and, for three
//!    objectives, explores the remaining boxes of outcome space as sub-problems.

use std::{
    fmt, mem,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::Context;

use crate::{
    boxes::RectangularBox,
    oracle::{Chebyshev, ObjectiveBound, Oracle, OracleResult, Query},
    options::{ExplorationConfig, ExplorationMode, Limits},
    termination::{Flow, MaybeTerminated, MaybeTerminatedError, Stop, Termination},
    types::{outcomes_coincide, weakly_dominates, Solution, Weight},
    weight_space::WeightSpacePolyhedron,
    OutcomeKind, Phase, Stats, WriteExplorationLog,
};

mod lexopt;
mod twoproj;
mod wsp;

/// The state of an exploration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExplorationStatus {
    /// [`Explorer::explore`] was not called yet
    #[default]
    Unsolved,
    LexOptPhase,
    WeightSpacePhase,
    TwoProjPhase,
    /// All non-dominated outcomes were computed
    Finished,
    /// The time limit was reached before the exploration finished
    TimeLimitReached,
    /// The oracle reported an unexpected result or the exploration failed
    Error,
}

impl ExplorationStatus {
    /// Checks whether the status is final
    pub fn is_final(self) -> bool {
        matches!(
            self,
            ExplorationStatus::Finished
                | ExplorationStatus::TimeLimitReached
                | ExplorationStatus::Error
        )
    }
}

impl fmt::Display for ExplorationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorationStatus::Unsolved => write!(f, "unsolved"),
            ExplorationStatus::LexOptPhase => write!(f, "lexicographic optimization phase"),
            ExplorationStatus::WeightSpacePhase => write!(f, "weight space phase"),
            ExplorationStatus::TwoProjPhase => write!(f, "two projection phase"),
            ExplorationStatus::Finished => write!(f, "finished"),
            ExplorationStatus::TimeLimitReached => write!(f, "time limit reached"),
            ExplorationStatus::Error => write!(f, "error"),
        }
    }
}

/// Handle to interrupt a running exploration, e.g., from a signal handler
#[derive(Clone, Debug)]
pub struct Interrupter {
    /// Termination flag of the explorer
    term_flag: Arc<AtomicBool>,
}

impl Interrupter {
    /// Interrupts the explorer asynchronously
    pub fn interrupt(&mut self) {
        self.term_flag.store(true, Ordering::Relaxed);
    }
}

/// Outcomes found by a (sub-)exploration
#[derive(Debug, Default)]
struct Frontier {
    bounded: Vec<Solution>,
    unbounded: Vec<Solution>,
}

impl Frontier {
    fn knows_bounded(&self, outcome: &[f64], epsilon: f64) -> bool {
        self.bounded
            .iter()
            .any(|sol| outcomes_coincide(sol.outcome(), outcome, epsilon))
    }

    fn knows_ray(&self, ray: &[f64]) -> bool {
        self.unbounded.iter().any(|sol| sol.outcome() == ray)
    }
}

/// The region of outcome space a (sub-)exploration is restricted to
#[derive(Debug, Clone, Default)]
struct Scope {
    bounds: Vec<ObjectiveBound>,
    /// Sub-problems are restricted to a box of the two-projection phase
    is_sub: bool,
}

impl Scope {
    /// The scope of the sub-problem for a box, with upper bounds shrunk by `delta`
    fn within(bx: &RectangularBox, delta: f64) -> Self {
        Scope {
            bounds: bx
                .intervals()
                .iter()
                .enumerate()
                .map(|(obj, &(lo, hi))| ObjectiveBound::range(obj, lo, hi - delta))
                .collect(),
            is_sub: true,
        }
    }
}

/// The weight-space explorer
///
/// # Generics
///
/// - `O`: the scalarization oracle
pub struct Explorer<O> {
    /// The oracle solving the scalarizations
    oracle: O,
    /// Configuration options
    config: ExplorationConfig,
    /// The number of objectives
    n_objs: usize,
    status: ExplorationStatus,
    /// Extreme supported (and lexicographically optimal) results
    bounded: Vec<Solution>,
    /// Results found by the two-projection phase
    unsupported: Vec<Solution>,
    /// Unbounded directions
    unbounded: Vec<Solution>,
    /// The last polyhedron of the weight-space phase
    polyhedron: Option<WeightSpacePolyhedron>,
    /// Running statistics
    stats: Stats,
    /// Limits for the current exploration
    lims: Limits,
    /// Start of the current exploration
    start: Instant,
    /// Logger to log with
    logger: Option<Box<dyn WriteExplorationLog>>,
    /// Termination flag
    term_flag: Arc<AtomicBool>,
}

impl<O: Oracle> Explorer<O> {
    /// Initializes an explorer for the problem behind an oracle
    pub fn new(oracle: O, config: ExplorationConfig) -> anyhow::Result<Self> {
        config.validate().context("invalid exploration config")?;
        let n_objs = oracle.n_objs();
        anyhow::ensure!(n_objs >= 1, "problem without objectives");
        Ok(Explorer {
            oracle,
            config,
            n_objs,
            status: ExplorationStatus::default(),
            bounded: vec![],
            unsupported: vec![],
            unbounded: vec![],
            polyhedron: None,
            stats: Stats {
                n_objs,
                ..Default::default()
            },
            lims: Limits::none(),
            start: Instant::now(),
            logger: None,
            term_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Computes the non-dominated outcomes under given limits. If not fully explored, returns
    /// an early termination reason. Oracle-reported failures end the exploration with
    /// [`ExplorationStatus::Error`].
    pub fn explore(&mut self, limits: Limits) -> MaybeTerminatedError {
        if self.status != ExplorationStatus::Unsolved {
            return MaybeTerminatedError::Error(anyhow::anyhow!(
                "explorer already ran and is {}",
                self.status
            ));
        }
        self.lims = limits;
        self.start = Instant::now();
        let res = self.compute_nondom_points();
        match &res {
            Err(Stop::Terminated(Termination::TimeLimit)) => {
                self.status = ExplorationStatus::TimeLimitReached
            }
            Err(Stop::Error(_)) => self.status = ExplorationStatus::Error,
            _ => (),
        }
        if let Some(logger) = &mut self.logger {
            if let Err(err) = logger.log_end_explore().context("logger failed") {
                return MaybeTerminatedError::Error(err);
            }
        }
        if res.is_ok() && self.status == ExplorationStatus::TimeLimitReached {
            return MaybeTerminatedError::Terminated(Termination::TimeLimit);
        }
        res.into()
    }

    fn compute_nondom_points(&mut self) -> Flow {
        if self.lims.oracle_calls == Some(0) {
            return Err(Termination::OracleCallsLimit.into());
        }
        if self.lims.outcomes == Some(0) {
            return Err(Termination::OutcomesLimit.into());
        }

        self.status = ExplorationStatus::LexOptPhase;
        self.log_phase(Phase::LexOpt)?;
        self.status = self.on_main_frontier(|this, frontier| {
            this.lex_opt_phase(frontier, &Scope::default())
        })?;
        if self.status != ExplorationStatus::LexOptPhase {
            return Ok(());
        }
        if self.n_objs == 1 || self.bounded.len() <= 1 {
            self.status = ExplorationStatus::Finished;
            return Ok(());
        }

        if self.runs_two_proj_phase() {
            self.status = ExplorationStatus::TwoProjPhase;
            self.log_phase(Phase::TwoProj)?;
            self.two_proj_phase()
        } else {
            self.status = ExplorationStatus::WeightSpacePhase;
            self.log_phase(Phase::WeightSpace)?;
            self.status = self.on_main_frontier(|this, frontier| {
                this.weight_space_phase(frontier, &Scope::default())
            })?;
            Ok(())
        }
    }

    fn runs_two_proj_phase(&mut self) -> bool {
        self.config.mode == ExplorationMode::Auto
            && self.n_objs <= 3
            && self.oracle.as_chebyshev().is_some()
    }

    /// Runs a phase on the bounded and unbounded outcomes of the main problem
    fn on_main_frontier<T, F>(&mut self, phase: F) -> Flow<T>
    where
        F: FnOnce(&mut Self, &mut Frontier) -> Flow<T>,
    {
        let mut frontier = Frontier {
            bounded: mem::take(&mut self.bounded),
            unbounded: mem::take(&mut self.unbounded),
        };
        let res = phase(self, &mut frontier);
        self.bounded = frontier.bounded;
        self.unbounded = frontier.unbounded;
        res
    }

    /// Maps an oracle result that is neither optimal nor unbounded to the resulting status
    fn non_opt_status(
        &mut self,
        res: &OracleResult,
        scope: &Scope,
        context: &str,
    ) -> Flow<ExplorationStatus> {
        match res {
            OracleResult::TimeLimit => Ok(ExplorationStatus::TimeLimitReached),
            OracleResult::Infeasible if scope.is_sub => Ok(ExplorationStatus::Finished),
            _ => {
                self.log_message(&format!("unexpected oracle result in {context}: {res}"))?;
                Ok(ExplorationStatus::Error)
            }
        }
    }

    /// Records a bounded result
    fn add_bounded(&mut self, frontier: &mut Frontier, solution: Solution, scope: &Scope) -> Flow {
        frontier.bounded.push(solution);
        if scope.is_sub {
            return Ok(());
        }
        let idx = frontier.bounded.len() - 1;
        self.log_outcome(OutcomeKind::Bounded, &frontier.bounded[idx])
    }

    /// Records an unbounded direction
    fn add_unbounded(&mut self, frontier: &mut Frontier, ray: Solution, scope: &Scope) -> Flow {
        frontier.unbounded.push(ray);
        if scope.is_sub {
            return Ok(());
        }
        let idx = frontier.unbounded.len() - 1;
        self.log_outcome(OutcomeKind::Unbounded, &frontier.unbounded[idx])
    }

    /// Records a result of the two-projection phase
    fn add_unsupported(&mut self, solution: Solution) -> Flow {
        let logged = solution.clone();
        self.unsupported.push(solution);
        self.log_outcome(OutcomeKind::Unsupported, &logged)
    }

    /// Removes the bounded results that are weakly dominated by or equal to another bounded
    /// result
    pub fn delete_weakly_dominated_supported(&mut self) {
        let mut idx = 0;
        while idx < self.bounded.len() {
            let dominated = self.bounded.iter().enumerate().any(|(other_idx, other)| {
                other_idx != idx && weakly_dominates(other.outcome(), self.bounded[idx].outcome())
            });
            if dominated {
                self.bounded.remove(idx);
            } else {
                idx += 1;
            }
        }
    }

    /// Checks whether any result among the bounded and unsupported results is weakly dominated
    /// by or equal to another one
    pub fn dominated_points_found(&self) -> bool {
        let results: Vec<&Solution> = self.bounded.iter().chain(&self.unsupported).collect();
        results.iter().enumerate().any(|(idx, sol)| {
            results.iter().enumerate().any(|(other_idx, other)| {
                other_idx != idx && weakly_dominates(other.outcome(), sol.outcome())
            })
        })
    }

    /// Gets the oracle
    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<O> Explorer<O> {
    pub fn status(&self) -> ExplorationStatus {
        self.status
    }

    pub fn config(&self) -> &ExplorationConfig {
        &self.config
    }

    /// The extreme supported and lexicographically optimal results
    ///
    /// These can include weakly dominated results, e.g., lexicographic optima that only differ
    /// in a single objective. Call [`Explorer::delete_weakly_dominated_supported`] to remove
    /// them.
    pub fn bounded(&self) -> &[Solution] {
        &self.bounded
    }

    /// The non-dominated results found by the two-projection phase
    pub fn unsupported(&self) -> &[Solution] {
        &self.unsupported
    }

    /// The unbounded directions
    pub fn unbounded(&self) -> &[Solution] {
        &self.unbounded
    }

    /// The polyhedron of the last weight-space phase of the main problem
    pub fn polyhedron(&self) -> Option<&WeightSpacePolyhedron> {
        self.polyhedron.as_ref()
    }

    /// Gets tracked statistics from the explorer
    pub fn stats(&self) -> Stats {
        Stats {
            n_bounded: self.bounded.len(),
            n_unbounded: self.unbounded.len(),
            n_unsupported: self.unsupported.len(),
            ..self.stats
        }
    }

    /// Attaches a logger to the explorer
    pub fn attach_logger<L: WriteExplorationLog + 'static>(&mut self, logger: L) {
        self.logger = Some(Box::new(logger));
    }

    /// Detaches a logger from the explorer
    pub fn detach_logger(&mut self) -> Option<Box<dyn WriteExplorationLog>> {
        self.logger.take()
    }

    /// Gets an interrupter to the explorer
    pub fn interrupter(&mut self) -> Interrupter {
        Interrupter {
            term_flag: self.term_flag.clone(),
        }
    }

    /// Checks the termination flag and terminates if appropriate
    fn check_termination(&self) -> MaybeTerminated {
        if self.term_flag.load(Ordering::Relaxed) {
            MaybeTerminated::Terminated(Termination::Interrupted)
        } else {
            MaybeTerminated::Done(())
        }
    }

    /// The time left for the exploration. Terminates if the time limit ran out.
    fn time_remaining(&self) -> Flow<Option<Duration>> {
        let Some(limit) = self.config.time_limit else {
            return Ok(None);
        };
        match limit.checked_sub(self.start.elapsed()) {
            Some(remaining) if !remaining.is_zero() => Ok(Some(remaining)),
            _ => Err(Termination::TimeLimit.into()),
        }
    }

    /// Logs an oracle call. Can return a termination if the oracle call limit is reached.
    fn log_oracle_call(&mut self, result: &OracleResult) -> Flow {
        self.stats.n_oracle_calls += 1;
        // Dispatch to logger
        if let Some(logger) = &mut self.logger {
            logger.log_oracle_call(result).context("logger failed")?;
        }
        // Update limit and check termination
        if let Some(oracle_calls) = &mut self.lims.oracle_calls {
            *oracle_calls -= 1;
            if *oracle_calls == 0 {
                return Err(Termination::OracleCallsLimit.into());
            }
        }
        Ok(())
    }

    /// Logs a new outcome. Can return a termination if the outcome limit is reached.
    fn log_outcome(&mut self, kind: OutcomeKind, solution: &Solution) -> Flow {
        // Dispatch to logger
        if let Some(logger) = &mut self.logger {
            logger
                .log_outcome(kind, solution.outcome())
                .context("logger failed")?;
        }
        // Update limit and check termination
        if let Some(outcomes) = &mut self.lims.outcomes {
            *outcomes -= 1;
            if *outcomes == 0 {
                return Err(Termination::OutcomesLimit.into());
            }
        }
        Ok(())
    }

    /// Logs the start of a phase
    fn log_phase(&mut self, phase: Phase) -> anyhow::Result<()> {
        if let Some(logger) = &mut self.logger {
            logger.log_phase(phase).context("logger failed")?;
        }
        Ok(())
    }

    /// Logs a routine start
    fn log_routine_start(&mut self, desc: &'static str) -> anyhow::Result<()> {
        // Dispatch to logger
        if let Some(logger) = &mut self.logger {
            logger.log_routine_start(desc).context("logger failed")?;
        }
        Ok(())
    }

    /// Logs a routine end
    fn log_routine_end(&mut self) -> anyhow::Result<()> {
        // Dispatch to logger
        if let Some(logger) = &mut self.logger {
            logger.log_routine_end().context("logger failed")?;
        }
        Ok(())
    }

    fn log_message(&mut self, msg: &str) -> anyhow::Result<()> {
        if let Some(logger) = &mut self.logger {
            logger.log_message(msg).context("logger failed")?;
        }
        Ok(())
    }
}

impl<O: Oracle> Explorer<O> {
    /// Minimises a weighted sum of the objectives subject to bounds
    fn solve_weighted(
        &mut self,
        weight: Weight,
        bounds: Vec<ObjectiveBound>,
    ) -> Flow<OracleResult> {
        self.check_termination().into_flow()?;
        let query = Query::new(weight)
            .with_bounds(bounds)
            .with_time_remaining(self.time_remaining()?);
        self.log_routine_start("oracle call")?;
        let res = self.oracle.solve(&query).context("oracle failed")?;
        self.log_routine_end()?;
        self.log_oracle_call(&res)?;
        Ok(res)
    }

    /// Minimises a weighted Chebyshev norm of an objective pair subject to bounds
    fn solve_chebyshev(
        &mut self,
        scal: &Chebyshev,
        bounds: &[ObjectiveBound],
    ) -> Flow<OracleResult> {
        self.check_termination().into_flow()?;
        let time_remaining = self.time_remaining()?;
        self.log_routine_start("oracle call")?;
        let res = match self.oracle.as_chebyshev() {
            Some(oracle) => oracle
                .solve_chebyshev(scal, bounds, time_remaining)
                .context("oracle failed")?,
            None => {
                return Err(
                    anyhow::anyhow!("oracle does not support Chebyshev scalarizations").into(),
                )
            }
        };
        self.log_routine_end()?;
        self.log_oracle_call(&res)?;
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        oracle::{Explicit, Oracle, OracleResult, Query},
        options::{ExplorationConfig, ExplorationMode, Limits},
        types::{outcomes_coincide, weighted_value, Outcome, Solution},
        MaybeTerminatedError, Termination,
    };

    use super::{ExplorationStatus, Explorer};

    const EPS: f64 = 1e-5;

    fn toy(order: &[[f64; 2]]) -> Explicit {
        Explicit::from_outcomes(2, order.iter().map(|o| o.to_vec()))
    }

    fn contains(sols: &[Solution], outcome: &[f64]) -> bool {
        sols.iter()
            .any(|sol| outcomes_coincide(sol.outcome(), outcome, EPS))
    }

    fn weight_space_only() -> ExplorationConfig {
        ExplorationConfig::default().with_mode(ExplorationMode::WeightSpaceOnly)
    }

    /// Xorshift generator for reproducible instances
    struct Rng(u64);

    impl Rng {
        fn new(seed: u64) -> Self {
            Rng(seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) | 1)
        }

        fn below(&mut self, bound: u64) -> u64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            self.0 % bound
        }
    }

    fn min_weighted<'a>(weight: &[f64], outcomes: impl Iterator<Item = &'a Outcome>) -> f64 {
        outcomes
            .map(|o| weighted_value(weight, o))
            .fold(f64::INFINITY, f64::min)
    }

    fn assert_minima(found: &[Solution], points: &[Vec<f64>], rng: &mut Rng) {
        let n_objs = points[0].len();
        for _ in 0..50 {
            let weight: Vec<f64> = (0..n_objs).map(|_| 1. + rng.below(100) as f64).collect();
            let found = min_weighted(&weight, found.iter().map(|sol| sol.outcome()));
            let exact = min_weighted(&weight, points.iter());
            assert!(
                (found - exact).abs() < 1e-6,
                "weight {weight:?}: found {found}, optimum {exact} for {points:?}"
            );
        }
    }

    /// Explores `points` in weight-space-only mode and checks that the bounded outcomes attain
    /// the true minimum for sampled weights, before and after removing weakly dominated ones
    fn check_weight_space_minima(points: &[Vec<f64>], rng: &mut Rng) {
        let n_objs = points[0].len();
        let oracle = Explicit::from_outcomes(n_objs, points.iter().cloned());
        let mut explorer = Explorer::new(oracle, weight_space_only()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished, "{points:?}");
        if let Some(poly) = explorer.polyhedron() {
            assert!(poly.has_valid_skeleton(n_objs), "{points:?}");
            assert!(!poly.has_untested_weight());
        }
        assert_minima(explorer.bounded(), points, rng);

        explorer.delete_weakly_dominated_supported();
        assert!(!explorer.dominated_points_found(), "{points:?}");
        assert_minima(explorer.bounded(), points, rng);
    }

    /// Oracle without a Chebyshev scalarization
    struct WeightedOnly(Explicit);

    impl Oracle for WeightedOnly {
        fn n_objs(&self) -> usize {
            self.0.n_objs()
        }

        fn solve(&mut self, query: &Query) -> anyhow::Result<OracleResult> {
            self.0.solve(query)
        }
    }

    /// Oracle that takes a while to answer
    struct Slow(Explicit);

    impl Oracle for Slow {
        fn n_objs(&self) -> usize {
            self.0.n_objs()
        }

        fn solve(&mut self, query: &Query) -> anyhow::Result<OracleResult> {
            assert!(query.time_remaining.is_some());
            std::thread::sleep(Duration::from_millis(5));
            self.0.solve(query)
        }
    }

    /// Oracle that always runs out of time
    struct OutOfTime;

    impl Oracle for OutOfTime {
        fn n_objs(&self) -> usize {
            2
        }

        fn solve(&mut self, _query: &Query) -> anyhow::Result<OracleResult> {
            Ok(OracleResult::TimeLimit)
        }
    }

    /// Oracle that fails on every call
    struct Failing;

    impl Oracle for Failing {
        fn n_objs(&self) -> usize {
            2
        }

        fn solve(&mut self, _query: &Query) -> anyhow::Result<OracleResult> {
            anyhow::bail!("solver crashed")
        }
    }

    #[test]
    fn weight_space_skips_tied_middle_point() {
        let oracle = toy(&[[2., 2.], [0., 4.], [4., 0.]]);
        let mut explorer = Explorer::new(oracle, weight_space_only()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished);
        // (2, 2) only ties the vertex between the two extreme outcomes
        assert_eq!(explorer.bounded().len(), 2);
        assert!(!contains(explorer.bounded(), &[2., 2.]));
        assert!(!explorer.dominated_points_found());
        let poly = explorer.polyhedron().unwrap();
        assert!(!poly.has_untested_weight());
        assert!(poly.has_valid_skeleton(2));
        assert!(explorer.unsupported().is_empty());
    }

    #[test]
    fn weight_space_skips_dominated_and_non_extreme() {
        let oracle = toy(&[[0., 4.], [2., 2.], [4., 0.], [3., 3.], [1., 4.]]);
        let mut explorer = Explorer::new(oracle, weight_space_only()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        // the first minimum at the tie is already known
        assert_eq!(explorer.bounded().len(), 2);
        assert!(!contains(explorer.bounded(), &[3., 3.]));
        assert!(!explorer.dominated_points_found());
    }

    #[test]
    fn two_projection_finds_unsupported() {
        let oracle = toy(&[[0., 4.], [2., 2.], [4., 0.]]);
        let mut explorer = Explorer::new(oracle, ExplorationConfig::default()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished);
        assert_eq!(explorer.bounded().len(), 2);
        assert_eq!(explorer.unsupported().len(), 1);
        assert!(contains(explorer.unsupported(), &[2., 2.]));
        assert!(explorer.polyhedron().is_none());
        let stats = explorer.stats();
        assert_eq!(stats.n_objs, 2);
        assert_eq!(stats.n_unsupported, 1);
    }

    #[test]
    fn two_projection_finds_non_convex_point() {
        // (3, 1) lies above the segment between (0, 4) and (4, 0) and is not supported
        let oracle = toy(&[[0., 4.], [3., 1.], [4., 0.], [4., 4.]]);
        let mut explorer = Explorer::new(oracle, ExplorationConfig::default()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished);
        assert!(contains(explorer.unsupported(), &[3., 1.]));
        assert!(!contains(explorer.unsupported(), &[4., 4.]));
        assert!(!explorer.dominated_points_found());
    }

    #[test]
    fn auto_without_chebyshev_uses_weight_space() {
        let oracle = WeightedOnly(toy(&[[2., 2.], [0., 4.], [4., 0.]]));
        let mut explorer = Explorer::new(oracle, ExplorationConfig::default()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.bounded().len(), 2);
        assert!(explorer.unsupported().is_empty());
        assert!(explorer.polyhedron().is_some());
    }

    #[test]
    fn single_objective() {
        let oracle = Explicit::from_outcomes(1, [vec![3.], vec![1.], vec![2.]]);
        let mut explorer = Explorer::new(oracle, ExplorationConfig::default()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished);
        assert_eq!(explorer.bounded().len(), 1);
        assert_eq!(explorer.bounded()[0].outcome(), &vec![1.]);
        assert_eq!(explorer.stats().n_oracle_calls, 1);
        assert!(explorer.polyhedron().is_none());
    }

    #[test]
    fn lexicographic_ties() {
        // both (0, 4) and (0, 2) minimise the first objective, only (0, 2) is non-dominated
        let oracle = toy(&[[0., 4.], [0., 2.], [4., 0.]]);
        let mut explorer = Explorer::new(oracle, weight_space_only()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert!(contains(explorer.bounded(), &[0., 2.]));
        assert!(!contains(explorer.bounded(), &[0., 4.]));
    }

    #[test]
    fn infeasible_problem() {
        let mut explorer = Explorer::new(Explicit::new(2), ExplorationConfig::default()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished);
        assert!(explorer.bounded().is_empty());
    }

    #[test]
    fn unbounded_directions() {
        let mut oracle = toy(&[[0., 4.], [4., 0.]]);
        oracle.add_ray(vec![1., -1.]);
        let mut explorer = Explorer::new(oracle, weight_space_only()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished);
        assert_eq!(explorer.unbounded().len(), 1);
        assert_eq!(explorer.unbounded()[0].outcome(), &vec![1., -1.]);
        // fixing the first objective cuts off the ray
        assert_eq!(explorer.bounded().len(), 1);
        assert!(contains(explorer.bounded(), &[0., 4.]));
        assert_eq!(explorer.stats().n_unbounded, 1);
    }

    #[test]
    fn explore_only_once() {
        let mut explorer = Explorer::new(toy(&[[0., 1.]]), ExplorationConfig::default()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert!(matches!(
            explorer.explore(Limits::none()),
            MaybeTerminatedError::Error(_)
        ));
    }

    #[test]
    fn oracle_call_limit() {
        let oracle = toy(&[[2., 2.], [0., 4.], [4., 0.]]);
        let mut explorer = Explorer::new(oracle, weight_space_only()).unwrap();
        let limits = Limits {
            oracle_calls: Some(3),
            outcomes: None,
        };
        match explorer.explore(limits) {
            MaybeTerminatedError::Terminated(term) => {
                assert_eq!(term, Termination::OracleCallsLimit)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(explorer.stats().n_oracle_calls, 3);
        assert_eq!(explorer.status(), ExplorationStatus::LexOptPhase);
    }

    #[test]
    fn outcome_limit() {
        let oracle = toy(&[[2., 2.], [0., 4.], [4., 0.]]);
        let mut explorer = Explorer::new(oracle, weight_space_only()).unwrap();
        let limits = Limits {
            oracle_calls: None,
            outcomes: Some(1),
        };
        match explorer.explore(limits) {
            MaybeTerminatedError::Terminated(term) => assert_eq!(term, Termination::OutcomesLimit),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(explorer.bounded().len(), 1);
    }

    #[test]
    fn interrupted() {
        let mut explorer = Explorer::new(toy(&[[0., 1.]]), ExplorationConfig::default()).unwrap();
        explorer.interrupter().interrupt();
        match explorer.explore(Limits::none()) {
            MaybeTerminatedError::Terminated(term) => assert_eq!(term, Termination::Interrupted),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn oracle_failure() {
        let mut explorer = Explorer::new(Failing, ExplorationConfig::default()).unwrap();
        let res = explorer.explore(Limits::none());
        assert!(matches!(res, MaybeTerminatedError::Error(_)));
        assert_eq!(explorer.status(), ExplorationStatus::Error);
    }

    #[test]
    fn time_limit() {
        let mut config = weight_space_only();
        config.set_time_limit(Some(Duration::from_millis(1)));
        let mut explorer = Explorer::new(Slow(toy(&[[0., 1.]])), config).unwrap();
        match explorer.explore(Limits::none()) {
            MaybeTerminatedError::Terminated(term) => assert_eq!(term, Termination::TimeLimit),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(explorer.status(), ExplorationStatus::TimeLimitReached);
        assert_eq!(explorer.stats().n_oracle_calls, 1);
    }

    #[test]
    fn oracle_time_limit() {
        let mut explorer = Explorer::new(OutOfTime, ExplorationConfig::default()).unwrap();
        match explorer.explore(Limits::none()) {
            MaybeTerminatedError::Terminated(term) => assert_eq!(term, Termination::TimeLimit),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(explorer.status(), ExplorationStatus::TimeLimitReached);
    }

    #[test]
    fn invalid_config() {
        let config = ExplorationConfig {
            numerics: 2.,
            ..Default::default()
        };
        assert!(Explorer::new(Explicit::new(2), config).is_err());
        assert!(Explorer::new(Explicit::new(0), ExplorationConfig::default()).is_err());
    }

    #[test]
    fn delete_weakly_dominated() {
        let mut explorer = Explorer::new(Explicit::new(2), ExplorationConfig::default()).unwrap();
        explorer.bounded = [[0., 4.], [0., 4.], [1., 4.], [4., 0.]]
            .iter()
            .map(|o| Solution::from_outcome(o.to_vec()))
            .collect();
        assert!(explorer.dominated_points_found());
        explorer.delete_weakly_dominated_supported();
        assert_eq!(explorer.bounded().len(), 2);
        assert!(!explorer.dominated_points_found());
    }

    #[test]
    fn weight_space_degenerate_ties() {
        let points = [
            [8., 5., 15.],
            [19., 0., 14.],
            [16., 3., 11.],
            [2., 24., 10.],
            [27., 21., 24.],
            [1., 8., 19.],
            [26., 5., 24.],
            [5., 16., 10.],
            [16., 10., 15.],
            [24., 27., 8.],
            [9., 0., 18.],
            [12., 7., 0.],
            [25., 9., 1.],
            [14., 0., 7.],
            [18., 14., 20.],
        ];
        let points: Vec<Vec<f64>> = points.iter().map(|p| p.to_vec()).collect();
        check_weight_space_minima(&points, &mut Rng::new(26));
    }

    #[test]
    fn weight_space_random_integer_instances() {
        for (n_objs, n_seeds) in [(3, 40), (4, 20)] {
            for seed in 0..n_seeds {
                let mut rng = Rng::new(seed);
                let points: Vec<Vec<f64>> = (0..15)
                    .map(|_| (0..n_objs).map(|_| rng.below(30) as f64).collect())
                    .collect();
                check_weight_space_minima(&points, &mut rng);
            }
        }
    }
}
