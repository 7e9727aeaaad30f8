//! Model building and solving: the per-period variable factory, the
//! constraint pipeline, cost objectives and the solver hand-off.

pub mod constraints;
pub mod context;
pub mod objective;
pub mod solve;
pub mod variables;

pub use constraints::{BalanceMode, Strategy, SHORTAGE_BOUND};
pub use context::{EdgeFlowVar, NodeVars, OptimizationContext, PeriodVars};
pub use solve::{SolveReport, SolveStatus, SolvedModel, SolvedNode, SolvedPeriod};

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::grid::Grid;

/// Knobs for one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOptions {
    pub strategy: Strategy,
    pub mode: BalanceMode,
    /// Number of periods to model; must not exceed the grid's shortest
    /// demand series.
    pub periods: usize,
    /// Global scale applied to every nodal demand.
    pub demand_multiplier: f64,
    /// Use the audited (per-term) cost objective. Debugging aid only.
    pub audit_costs: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Simple,
            mode: BalanceMode::Strict,
            periods: 1,
            demand_multiplier: 1.0,
            audit_costs: false,
        }
    }
}

/// A full multi-period dispatch problem over a grid.
///
/// Builds variables and constraints strictly in period order (the ramp logic
/// of period `t` reads the ledger entry of `t-1`), selects the objective
/// flavour and performs the blocking solve.
#[derive(Debug)]
pub struct DispatchProblem<'g> {
    grid: &'g Grid,
    options: ModelOptions,
}

impl<'g> DispatchProblem<'g> {
    pub fn new(grid: &'g Grid, options: ModelOptions) -> Result<Self> {
        if options.periods == 0 {
            return Err(DispatchError::Model(
                "at least one period is required".to_string(),
            ));
        }
        let available = grid.period_count();
        if options.periods > available {
            return Err(DispatchError::Model(format!(
                "{} periods requested but the shortest demand series has {available}",
                options.periods
            )));
        }
        Ok(Self { grid, options })
    }

    pub fn solve(self) -> Result<SolvedModel> {
        let ModelOptions {
            strategy,
            mode,
            periods,
            demand_multiplier,
            audit_costs,
        } = self.options;

        tracing::info!(
            ?strategy,
            ?mode,
            periods,
            nodes = self.grid.nodes().len(),
            edges = self.grid.edges().len(),
            "building dispatch model"
        );

        let mut ctx = OptimizationContext::new(demand_multiplier);
        for t in 0..periods {
            let period = variables::period_variables(&mut ctx, self.grid, strategy, t);
            constraints::build_period_constraints(&mut ctx, self.grid, period, t, strategy, mode)?;
        }

        let objective = if audit_costs {
            objective::generation_cost_audited(&mut ctx)
        } else {
            match mode {
                BalanceMode::Strict => objective::generation_cost(&ctx),
                BalanceMode::Relaxed => objective::generation_cost_relaxed(&ctx),
            }
        };

        solve::solve(ctx, self.grid, strategy, objective)
    }
}
