//! The single blocking solve call: registers the accumulated model with the
//! MILP backend, maps the terminal status and materialises solved values.

use chrono::{DateTime, Utc};
use good_lp::{
    default_solver, Expression, IntoAffineExpression, ResolutionError, Solution, SolverModel,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{DispatchError, Result};
use crate::grid::Grid;
use crate::model::constraints::Strategy;
use crate::model::context::OptimizationContext;

/// Terminal status of a solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    Optimal,
    /// A solution exists but optimality was not proven. The generic
    /// `good_lp` solution type cannot distinguish this from `Optimal`, so
    /// the current backend never reports it; it is kept for backends (and
    /// serialized reports) that do.
    Feasible,
    Infeasible,
    Unbounded,
    Error,
}

/// Metadata describing one completed solve.
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub strategy: Strategy,
    pub status: SolveStatus,
    pub objective_value: f64,
}

/// Solved values for one node in one period. `working` mirrors the
/// commitment booleans; without commitment modelling every unit reports true.
#[derive(Debug, Clone, Serialize)]
pub struct SolvedNode {
    pub name: String,
    /// Demand at this period, already scaled by the global multiplier.
    pub demand: f64,
    pub generation: Vec<f64>,
    pub working: Vec<bool>,
}

/// Solved value of one directed flow variable.
#[derive(Debug, Clone, Serialize)]
pub struct SolvedFlow {
    pub from: String,
    pub to: String,
    pub from_index: usize,
    pub to_index: usize,
    pub value: f64,
    pub capacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolvedPeriod {
    pub nodes: Vec<SolvedNode>,
    pub flows: Vec<SolvedFlow>,
    pub phases: Vec<f64>,
}

/// Everything read back from a successful solve.
#[derive(Debug, Clone, Serialize)]
pub struct SolvedModel {
    pub report: SolveReport,
    pub periods: Vec<SolvedPeriod>,
    pub shortages: Vec<f64>,
}

impl SolvedModel {
    pub fn total_shortage(&self) -> f64 {
        self.shortages.iter().sum()
    }
}

/// Hand the accumulated model to the solver and extract solved values.
///
/// Infeasibility and unboundedness come back as
/// [`DispatchError::Solver`] carrying the terminal status; the caller decides
/// whether to rebuild in relaxed mode.
pub fn solve(
    ctx: OptimizationContext,
    grid: &Grid,
    strategy: Strategy,
    objective: Expression,
) -> Result<SolvedModel> {
    let OptimizationContext {
        vars,
        constraints,
        ledger,
        shortages,
        demand_multiplier,
    } = ctx;

    tracing::debug!(
        periods = ledger.len(),
        constraints = constraints.len(),
        "handing model to solver"
    );

    let mut model = vars.minimise(objective.clone()).using(default_solver);
    for constraint in constraints {
        model = model.with(constraint);
    }

    let solution = model.solve().map_err(|e| {
        let status = match e {
            ResolutionError::Infeasible => SolveStatus::Infeasible,
            ResolutionError::Unbounded => SolveStatus::Unbounded,
            ResolutionError::Other(msg) => {
                tracing::error!(message = msg, "solver failure");
                SolveStatus::Error
            }
            ResolutionError::Str(msg) => {
                tracing::error!(message = %msg, "solver failure");
                SolveStatus::Error
            }
        };
        DispatchError::Solver(status)
    })?;

    let objective_value = objective.eval_with(&solution);
    tracing::info!(objective_value, "solve finished");

    let mut periods = Vec::with_capacity(ledger.len());
    for (t, period) in ledger.iter().enumerate() {
        let mut nodes = Vec::with_capacity(period.nodes.len());
        for (node, node_vars) in grid.nodes().iter().zip(&period.nodes) {
            let generation: Vec<f64> = node_vars
                .generation
                .iter()
                .map(|&v| solution.value(v))
                .collect();
            let working = match &node_vars.commitment {
                Some(on) => on.iter().map(|&v| solution.value(v) > 0.5).collect(),
                None => vec![true; generation.len()],
            };
            nodes.push(SolvedNode {
                name: node.name.clone(),
                demand: node.demand[t] * demand_multiplier,
                generation,
                working,
            });
        }

        let mut flows = Vec::new();
        for (a, row) in period.flows.iter().enumerate() {
            for (b, entry) in row.iter().enumerate() {
                if let Some(flow) = entry {
                    flows.push(SolvedFlow {
                        from: grid.nodes()[a].name.clone(),
                        to: grid.nodes()[b].name.clone(),
                        from_index: a,
                        to_index: b,
                        value: solution.value(flow.var),
                        capacity: flow.capacity,
                    });
                }
            }
        }

        let phases = period.phases.iter().map(|&v| solution.value(v)).collect();
        periods.push(SolvedPeriod {
            nodes,
            flows,
            phases,
        });
    }

    let shortages = shortages.iter().map(|&v| solution.value(v)).collect();

    Ok(SolvedModel {
        report: SolveReport {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            strategy,
            status: SolveStatus::Optimal,
            objective_value,
        },
        periods,
        shortages,
    })
}
