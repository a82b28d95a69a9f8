//! # Scalarization Oracles
//!
//! The explorer treats the underlying single-objective solver as a black box that minimises a
//! weighted sum (or, for the two-projection phase, a weighted Chebyshev norm) of the objectives
//! subject to bounds on objective values.

use std::{fmt, time::Duration};

use itertools::Itertools;

use crate::types::{weighted_value, Outcome, Solution, Weight};

/// Feasibility tolerance of objective bounds in [`Explicit`]
const BOUND_TOLERANCE: f64 = 1e-9;

/// A restriction `lower <= y_obj <= upper` of one objective value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectiveBound {
    pub obj: usize,
    pub lower: f64,
    pub upper: f64,
}

impl ObjectiveBound {
    /// Fixes an objective to a value
    pub fn fixed(obj: usize, value: f64) -> Self {
        ObjectiveBound {
            obj,
            lower: value,
            upper: value,
        }
    }

    /// Bounds an objective from above
    pub fn upper(obj: usize, upper: f64) -> Self {
        ObjectiveBound {
            obj,
            lower: f64::NEG_INFINITY,
            upper,
        }
    }

    pub fn range(obj: usize, lower: f64, upper: f64) -> Self {
        ObjectiveBound { obj, lower, upper }
    }

    /// Checks whether an outcome satisfies the bound up to `tolerance`
    pub fn is_satisfied(&self, outcome: &[f64], tolerance: f64) -> bool {
        let val = outcome[self.obj];
        val >= self.lower - tolerance && val <= self.upper + tolerance
    }

    /// Checks whether moving along a ray keeps the bound satisfied
    pub fn admits_ray(&self, ray: &[f64]) -> bool {
        let dir = ray[self.obj];
        (dir <= 0. || self.upper == f64::INFINITY) && (dir >= 0. || self.lower == f64::NEG_INFINITY)
    }
}

impl fmt::Display for ObjectiveBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= y{} <= {}", self.lower, self.obj, self.upper)
    }
}

/// A weighted-sum query to an [`Oracle`]
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Query {
    pub weight: Weight,
    pub bounds: Vec<ObjectiveBound>,
    /// The remaining time of the exploration
    pub time_remaining: Option<Duration>,
}

impl Query {
    pub fn new(weight: Weight) -> Self {
        Query {
            weight,
            bounds: vec![],
            time_remaining: None,
        }
    }

    pub fn with_bounds(mut self, bounds: Vec<ObjectiveBound>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_time_remaining(mut self, time: Option<Duration>) -> Self {
        self.time_remaining = time;
        self
    }
}

/// The answer of an oracle
#[derive(Clone, Debug, PartialEq)]
pub enum OracleResult {
    /// An optimal solution and its scalarized value
    Optimal { solution: Solution, value: f64 },
    /// The scalarization is unbounded. The ray is an outcome-space direction, if available.
    Unbounded { ray: Option<Solution> },
    Infeasible,
    /// The oracle ran out of time
    TimeLimit,
    /// The oracle failed for a reason of its own
    Error(String),
}

impl fmt::Display for OracleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleResult::Optimal { value, .. } => write!(f, "optimal ({value})"),
            OracleResult::Unbounded { ray: Some(_) } => write!(f, "unbounded"),
            OracleResult::Unbounded { ray: None } => write!(f, "unbounded (no ray)"),
            OracleResult::Infeasible => write!(f, "infeasible"),
            OracleResult::TimeLimit => write!(f, "time limit"),
            OracleResult::Error(msg) => write!(f, "error ({msg})"),
        }
    }
}

/// A single-objective solver minimising weighted sums of the objectives
pub trait Oracle {
    /// The number of objectives of the problem
    fn n_objs(&self) -> usize;
    /// Minimises `query.weight · y` subject to the bounds of the query
    fn solve(&mut self, query: &Query) -> anyhow::Result<OracleResult>;
    /// Access to the Chebyshev scalarization, if the oracle supports it
    fn as_chebyshev(&mut self) -> Option<&mut dyn ChebyshevOracle> {
        None
    }
}

/// Weighted Chebyshev scalarization of an objective pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chebyshev {
    /// The objective pair
    pub objs: (usize, usize),
    /// The reference point
    pub reference: (f64, f64),
    /// The weights of the two distances
    pub beta: (f64, f64),
}

impl Chebyshev {
    /// `max(beta_1 (y_a - ref_1), beta_2 (y_b - ref_2))`
    pub fn value(&self, outcome: &[f64]) -> f64 {
        let first = self.beta.0 * (outcome[self.objs.0] - self.reference.0);
        let second = self.beta.1 * (outcome[self.objs.1] - self.reference.1);
        first.max(second)
    }
}

/// An oracle that can also minimise weighted Chebyshev norms
pub trait ChebyshevOracle: Oracle {
    fn solve_chebyshev(
        &mut self,
        scal: &Chebyshev,
        bounds: &[ObjectiveBound],
        time_remaining: Option<Duration>,
    ) -> anyhow::Result<OracleResult>;
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn n_objs(&self) -> usize {
        (**self).n_objs()
    }

    fn solve(&mut self, query: &Query) -> anyhow::Result<OracleResult> {
        (**self).solve(query)
    }

    fn as_chebyshev(&mut self) -> Option<&mut dyn ChebyshevOracle> {
        (**self).as_chebyshev()
    }
}

impl<O: ChebyshevOracle + ?Sized> ChebyshevOracle for Box<O> {
    fn solve_chebyshev(
        &mut self,
        scal: &Chebyshev,
        bounds: &[ObjectiveBound],
        time_remaining: Option<Duration>,
    ) -> anyhow::Result<OracleResult> {
        (**self).solve_chebyshev(scal, bounds, time_remaining)
    }
}

/// Oracle over an explicitly enumerated set of feasible outcomes and recession directions
#[derive(Clone, Debug, Default)]
pub struct Explicit {
    n_objs: usize,
    solutions: Vec<Solution>,
    rays: Vec<Outcome>,
    n_calls: usize,
}

impl Explicit {
    pub fn new(n_objs: usize) -> Self {
        Explicit {
            n_objs,
            ..Default::default()
        }
    }

    /// Creates an oracle with solutions `s0`, `s1`, ... for the given outcomes
    pub fn from_outcomes<I: IntoIterator<Item = Outcome>>(n_objs: usize, outcomes: I) -> Self {
        let mut oracle = Explicit::new(n_objs);
        for (idx, outcome) in outcomes.into_iter().enumerate() {
            oracle.add_solution(Solution::new(vec![(format!("s{idx}"), 1.)], outcome));
        }
        oracle
    }

    pub fn add_solution(&mut self, solution: Solution) {
        assert_eq!(
            solution.outcome().len(),
            self.n_objs,
            "outcome of different dimension"
        );
        self.solutions.push(solution);
    }

    /// Adds a direction along which the feasible outcomes are unbounded
    pub fn add_ray(&mut self, ray: Outcome) {
        assert_eq!(ray.len(), self.n_objs, "ray of different dimension");
        self.rays.push(ray);
    }

    /// The number of calls answered so far
    pub fn n_calls(&self) -> usize {
        self.n_calls
    }

    fn feasible<'a>(
        &'a self,
        bounds: &'a [ObjectiveBound],
    ) -> impl Iterator<Item = &'a Solution> + 'a {
        self.solutions.iter().filter(move |sol| {
            bounds
                .iter()
                .all(|b| b.is_satisfied(sol.outcome(), BOUND_TOLERANCE))
        })
    }

    fn admissible_rays<'a>(
        &'a self,
        bounds: &'a [ObjectiveBound],
    ) -> impl Iterator<Item = &'a Outcome> + 'a {
        self.rays
            .iter()
            .filter(move |ray| bounds.iter().all(|b| b.admits_ray(ray)))
    }

    /// Answers a query by minimising `eval` over the feasible solutions, or reporting a ray
    /// along which `improves` holds
    fn minimise<E, R>(
        &mut self,
        bounds: &[ObjectiveBound],
        time: Option<Duration>,
        eval: E,
        improves: R,
    ) -> OracleResult
    where
        E: Fn(&[f64]) -> f64,
        R: Fn(&[f64]) -> bool,
    {
        self.n_calls += 1;
        if time.is_some_and(|t| t.is_zero()) {
            return OracleResult::TimeLimit;
        }
        let Some(best) = self
            .feasible(bounds)
            .min_by(|a, b| eval(a.outcome()).total_cmp(&eval(b.outcome())))
            .cloned()
        else {
            return OracleResult::Infeasible;
        };
        if let Some(ray) = self.admissible_rays(bounds).find(|ray| improves(ray)) {
            return OracleResult::Unbounded {
                ray: Some(Solution::from_outcome(ray.clone())),
            };
        }
        let value = eval(best.outcome());
        OracleResult::Optimal {
            solution: best,
            value,
        }
    }
}

impl Oracle for Explicit {
    fn n_objs(&self) -> usize {
        self.n_objs
    }

    fn solve(&mut self, query: &Query) -> anyhow::Result<OracleResult> {
        anyhow::ensure!(
            query.weight.len() == self.n_objs,
            "weight of dimension {} for {} objectives",
            query.weight.len(),
            self.n_objs
        );
        let weight = &query.weight;
        Ok(self.minimise(
            &query.bounds,
            query.time_remaining,
            |y| weighted_value(weight, y),
            |r| weighted_value(weight, r) < -BOUND_TOLERANCE,
        ))
    }

    fn as_chebyshev(&mut self) -> Option<&mut dyn ChebyshevOracle> {
        Some(self)
    }
}

impl ChebyshevOracle for Explicit {
    fn solve_chebyshev(
        &mut self,
        scal: &Chebyshev,
        bounds: &[ObjectiveBound],
        time_remaining: Option<Duration>,
    ) -> anyhow::Result<OracleResult> {
        anyhow::ensure!(
            scal.objs.0 < self.n_objs && scal.objs.1 < self.n_objs,
            "objective pair {:?} out of range",
            scal.objs
        );
        let (a, b) = scal.objs;
        Ok(self.minimise(
            bounds,
            time_remaining,
            |y| scal.value(y),
            |r| r[a] <= 0. && r[b] <= 0. && (r[a] < 0. || r[b] < 0.),
        ))
    }
}

impl fmt::Display for Explicit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "explicit oracle with {} objectives", self.n_objs)?;
        for sol in &self.solutions {
            writeln!(f, "  {sol}")?;
        }
        for ray in &self.rays {
            writeln!(f, "  ray [{}]", ray.iter().format(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Chebyshev, ChebyshevOracle, Explicit, ObjectiveBound, Oracle, OracleResult, Query};

    fn toy() -> Explicit {
        Explicit::from_outcomes(2, [vec![0., 4.], vec![2., 2.], vec![4., 0.], vec![3., 3.]])
    }

    fn optimum(res: OracleResult) -> (Vec<f64>, f64) {
        match res {
            OracleResult::Optimal { solution, value } => (solution.outcome().clone(), value),
            other => panic!("unexpected result {other}"),
        }
    }

    #[test]
    fn weighted_sum() {
        let mut oracle = toy();
        let (outcome, value) = optimum(oracle.solve(&Query::new(vec![1., 0.])).unwrap());
        assert_eq!((outcome, value), (vec![0., 4.], 0.));
        let (outcome, _) = optimum(oracle.solve(&Query::new(vec![1., 3.])).unwrap());
        assert_eq!(outcome, vec![4., 0.]);
        assert_eq!(oracle.n_calls(), 2);
    }

    #[test]
    fn bounds() {
        let mut oracle = toy();
        let query = Query::new(vec![0., 1.]).with_bounds(vec![ObjectiveBound::fixed(0, 2.)]);
        assert_eq!(optimum(oracle.solve(&query).unwrap()).0, vec![2., 2.]);
        let query = Query::new(vec![0., 1.]).with_bounds(vec![ObjectiveBound::upper(1, -1.)]);
        assert_eq!(oracle.solve(&query).unwrap(), OracleResult::Infeasible);
    }

    #[test]
    fn rays() {
        let mut oracle = toy();
        oracle.add_ray(vec![1., -1.]);
        assert!(matches!(
            oracle.solve(&Query::new(vec![0., 1.])).unwrap(),
            OracleResult::Unbounded { ray: Some(_) }
        ));
        assert!(matches!(
            oracle.solve(&Query::new(vec![1., 1.])).unwrap(),
            OracleResult::Optimal { .. }
        ));
        // the ray leaves the bounded region
        let query = Query::new(vec![0., 1.]).with_bounds(vec![ObjectiveBound::upper(0, 10.)]);
        assert!(matches!(oracle.solve(&query).unwrap(), OracleResult::Optimal { .. }));
    }

    #[test]
    fn time_limit_and_dimension() {
        let mut oracle = toy();
        let query = Query::new(vec![1., 1.]).with_time_remaining(Some(Duration::ZERO));
        assert_eq!(oracle.solve(&query).unwrap(), OracleResult::TimeLimit);
        assert!(oracle.solve(&Query::new(vec![1.])).is_err());
    }

    #[test]
    fn chebyshev() {
        let mut oracle = toy();
        let scal = Chebyshev {
            objs: (0, 1),
            reference: (-1., -1.),
            beta: (1., 1.),
        };
        assert_eq!(scal.value(&[0., 4.]), 5.);
        let (outcome, value) = optimum(oracle.solve_chebyshev(&scal, &[], None).unwrap());
        assert_eq!((outcome, value), (vec![2., 2.], 3.));
    }
}
