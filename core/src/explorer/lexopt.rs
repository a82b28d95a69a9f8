//! # Lexicographic Optimization Phase
//!
//! For every objective `i`, the objectives are optimized in the cyclic order `i, i+1, ...`,
//! fixing each objective to its optimal value before moving to the next one. The resulting
//! lexicographic optima are non-dominated and seed the weight-space polyhedron.

use crate::{
    oracle::{ObjectiveBound, Oracle, OracleResult},
    termination::Flow,
    types::{unit_weight, Solution},
};

use super::{ExplorationStatus, Explorer, Frontier, Scope};

impl<O: Oracle> Explorer<O> {
    /// Runs the lexicographic phase. Returns [`ExplorationStatus::LexOptPhase`] if the
    /// exploration should continue.
    pub(super) fn lex_opt_phase(
        &mut self,
        frontier: &mut Frontier,
        scope: &Scope,
    ) -> Flow<ExplorationStatus> {
        self.log_routine_start("lexicographic optimization")?;
        let mut first_call = true;
        for obj in 0..self.n_objs {
            let status = self.lex_optimize(obj, frontier, scope, &mut first_call)?;
            if status != ExplorationStatus::LexOptPhase {
                self.log_routine_end()?;
                return Ok(status);
            }
        }
        self.log_routine_end()?;
        Ok(ExplorationStatus::LexOptPhase)
    }

    /// Computes the lexicographic optimum for the objective order starting at `obj`
    fn lex_optimize(
        &mut self,
        obj: usize,
        frontier: &mut Frontier,
        scope: &Scope,
        first_call: &mut bool,
    ) -> Flow<ExplorationStatus> {
        let mut bounds = scope.bounds.clone();
        let mut optimum: Option<Solution> = None;
        for counter in 0..self.n_objs {
            let current = (obj + counter) % self.n_objs;
            let res = self.solve_weighted(unit_weight(self.n_objs, current), bounds.clone())?;
            let was_first = std::mem::replace(first_call, false);
            match res {
                OracleResult::Optimal { solution, value } => {
                    if counter + 1 < self.n_objs {
                        bounds.push(ObjectiveBound::fixed(current, value));
                    }
                    optimum = Some(solution);
                }
                OracleResult::Unbounded { ray: Some(ray) } => {
                    if !frontier.knows_ray(ray.outcome()) {
                        self.add_unbounded(frontier, ray, scope)?;
                    }
                    return Ok(ExplorationStatus::LexOptPhase);
                }
                OracleResult::TimeLimit => return Ok(ExplorationStatus::TimeLimitReached),
                // the problem (or box) has no feasible outcomes at all
                OracleResult::Infeasible if was_first => return Ok(ExplorationStatus::Finished),
                res => {
                    self.log_message(&format!(
                        "unexpected oracle result in lexicographic optimization of objective \
                         {current}: {res}"
                    ))?;
                    return Ok(ExplorationStatus::Error);
                }
            }
        }
        if let Some(solution) = optimum {
            if !frontier.knows_bounded(solution.outcome(), self.config.epsilon) {
                self.add_bounded(frontier, solution, scope)?;
            }
        }
        Ok(ExplorationStatus::LexOptPhase)
    }
}
