//! # Options
//!
//! This module contains all configuration options of the weight-space explorer.

use std::{fmt, time::Duration};

/// Exploration-wide configuration options
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplorationConfig {
    /// Tolerance for outcome coincidence, projection dominance and vertex obsolescence
    pub epsilon: f64,
    /// Minimum width of an outcome-space box worth exploring
    pub delta: f64,
    /// Zero tolerance of the geometric core (slacks, multiples, combination parameters)
    pub numerics: f64,
    /// Offset added to the combination parameter when cutting with a ray
    pub ray_offset: f64,
    /// Wall-clock budget for the whole exploration
    pub time_limit: Option<Duration>,
    /// Which phases to run after the lexicographic phase
    pub mode: ExplorationMode,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        ExplorationConfig {
            epsilon: 1e-5,
            delta: 1e-2,
            numerics: 1e-9,
            ray_offset: 1e-7,
            time_limit: None,
            mode: ExplorationMode::default(),
        }
    }
}

impl ExplorationConfig {
    pub fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.time_limit = limit;
    }

    /// Sets the mode and returns the config for chaining
    pub fn with_mode(mut self, mode: ExplorationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks that the tolerances are usable
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.epsilon >= 0. && self.epsilon.is_finite(),
            "epsilon must be a finite non-negative value, got {}",
            self.epsilon
        );
        anyhow::ensure!(
            self.delta >= 0. && self.delta.is_finite(),
            "delta must be a finite non-negative value, got {}",
            self.delta
        );
        anyhow::ensure!(
            self.numerics > 0. && self.numerics < 1.,
            "numerical tolerance must lie in (0, 1), got {}",
            self.numerics
        );
        anyhow::ensure!(
            (0. ..1.).contains(&self.ray_offset),
            "ray offset must lie in [0, 1), got {}",
            self.ray_offset
        );
        if let Some(limit) = self.time_limit {
            anyhow::ensure!(!limit.is_zero(), "time limit must be positive");
        }
        Ok(())
    }
}

impl fmt::Display for ExplorationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epsilon={} delta={} numerics={} ray-offset={} time-limit=",
            self.epsilon, self.delta, self.numerics, self.ray_offset
        )?;
        match self.time_limit {
            Some(limit) => write!(f, "{}s", limit.as_secs_f64())?,
            None => write!(f, "none")?,
        }
        write!(f, " mode={}", self.mode)
    }
}

/// Phases to run after the lexicographic optimization phase
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ExplorationMode {
    /// Weight-space phase for more than three objectives, two-projection phase otherwise
    #[default]
    Auto,
    /// Only compute the extreme supported outcomes via the weight-space phase
    WeightSpaceOnly,
}

impl fmt::Display for ExplorationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorationMode::Auto => write!(f, "auto"),
            ExplorationMode::WeightSpaceOnly => write!(f, "weight-space-only"),
        }
    }
}

/// Limits for a call to [`crate::Explorer::explore`]
#[derive(Clone, Copy, Default, Debug)]
pub struct Limits {
    /// The maximum number of oracle calls to make
    pub oracle_calls: Option<usize>,
    /// The maximum number of new outcomes to record
    pub outcomes: Option<usize>,
}

impl Limits {
    /// No limits
    pub fn none() -> Limits {
        Limits {
            oracle_calls: None,
            outcomes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ExplorationConfig, ExplorationMode};

    #[test]
    fn default_validates() {
        ExplorationConfig::default().validate().unwrap();
    }

    #[test]
    fn invalid_tolerances() {
        let cfg = ExplorationConfig {
            epsilon: -1.,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = ExplorationConfig {
            numerics: 0.,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let mut cfg = ExplorationConfig::default();
        cfg.set_time_limit(Some(Duration::ZERO));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn display() {
        let mut cfg = ExplorationConfig::default().with_mode(ExplorationMode::WeightSpaceOnly);
        cfg.set_time_limit(Some(Duration::from_millis(1500)));
        let text = format!("{cfg}");
        assert!(text.contains("time-limit=1.5s"));
        assert!(text.ends_with("mode=weight-space-only"));
    }
}
