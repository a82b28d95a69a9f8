//! # Types
//!
//! Shared numeric types of the weight-space explorer.

use std::fmt;

use itertools::Itertools;

/// A point (if bounded) or direction (if a ray) in objective space
pub type Outcome = Vec<f64>;

/// Non-negative coefficients of a linear scalarization over the objectives
pub type Weight = Vec<f64>;

/// Values of the non-zero variables of a solution
pub type Assignment = Vec<(String, f64)>;

/// A solution found by the oracle together with its outcome
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Solution {
    assignment: Assignment,
    outcome: Outcome,
}

impl Solution {
    pub fn new(assignment: Assignment, outcome: Outcome) -> Self {
        Solution {
            assignment,
            outcome,
        }
    }

    /// Creates a solution without a recorded assignment
    pub fn from_outcome(outcome: Outcome) -> Self {
        Solution {
            assignment: vec![],
            outcome,
        }
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn into_parts(self) -> (Assignment, Outcome) {
        (self.assignment, self.outcome)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.outcome.iter().format(", "))?;
        if !self.assignment.is_empty() {
            write!(
                f,
                " {{{}}}",
                self.assignment
                    .iter()
                    .format_with(", ", |(name, val), f| f(&format_args!("{name}={val}")))
            )?;
        }
        Ok(())
    }
}

/// Checks whether two outcomes agree in every component up to `epsilon`
pub fn outcomes_coincide(a: &[f64], b: &[f64], epsilon: f64) -> bool {
    assert_eq!(a.len(), b.len(), "outcomes of different dimension");
    a.iter().zip(b).all(|(v, w)| (v - w).abs() < epsilon)
}

/// The weighted objective value of an outcome
pub fn weighted_value(weight: &[f64], outcome: &[f64]) -> f64 {
    debug_assert_eq!(weight.len(), outcome.len());
    weight.iter().zip(outcome).map(|(w, y)| w * y).sum()
}

/// Checks whether `first` is component-wise smaller than or equal to `second`
pub fn weakly_dominates(first: &[f64], second: &[f64]) -> bool {
    debug_assert_eq!(first.len(), second.len());
    first.iter().zip(second).all(|(f, s)| f <= s)
}

/// The unit weight of objective `idx`
pub fn unit_weight(n_objs: usize, idx: usize) -> Weight {
    debug_assert!(idx < n_objs);
    let mut weight = vec![0.; n_objs];
    weight[idx] = 1.;
    weight
}

/// The projection of an outcome onto two objectives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoDProj {
    first: f64,
    second: f64,
}

impl TwoDProj {
    /// Projects `outcome` onto the objectives `first` and `second`
    pub fn new(outcome: &[f64], first: usize, second: usize) -> Self {
        assert!(first < outcome.len() && second < outcome.len());
        TwoDProj {
            first: outcome[first],
            second: outcome[second],
        }
    }

    pub fn from_values(first: f64, second: f64) -> Self {
        TwoDProj { first, second }
    }

    pub fn first(&self) -> f64 {
        self.first
    }

    pub fn second(&self) -> f64 {
        self.second
    }
}

impl fmt::Display for TwoDProj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proj = [{}, {}]", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::{outcomes_coincide, weakly_dominates, weighted_value, Solution, TwoDProj};

    #[test]
    fn coincide() {
        assert!(outcomes_coincide(&[1., 2.], &[1. + 1e-6, 2.], 1e-5));
        assert!(!outcomes_coincide(&[1., 2.], &[1., 2. + 1e-4], 1e-5));
        assert!(!outcomes_coincide(&[0.], &[0.], 0.));
    }

    #[test]
    #[should_panic(expected = "outcomes of different dimension")]
    fn coincide_dimension_mismatch() {
        outcomes_coincide(&[1.], &[1., 2.], 1e-5);
    }

    #[test]
    fn dominance_and_weights() {
        assert!(weakly_dominates(&[1., 2.], &[1., 3.]));
        assert!(weakly_dominates(&[1., 2.], &[1., 2.]));
        assert!(!weakly_dominates(&[1., 4.], &[2., 3.]));
        assert_eq!(weighted_value(&[0.5, 0.5], &[2., 2.]), 2.);
    }

    #[test]
    fn projection() {
        let proj = TwoDProj::new(&[3., 1., 7.], 0, 2);
        assert_eq!((proj.first(), proj.second()), (3., 7.));
        assert_eq!(format!("{proj}"), "Proj = [3, 7]");
    }

    #[test]
    fn solution_display() {
        let sol = Solution::new(vec![("x".to_string(), 1.5)], vec![0., 4.]);
        assert_eq!(format!("{sol}"), "[0, 4] {x=1.5}");
        assert_eq!(format!("{}", Solution::from_outcome(vec![2.])), "[2]");
    }
}
