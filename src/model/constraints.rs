//! Constraint assembly for one period: DC power-flow physics, generator
//! bounds, commitment transitions with ramp limits, and nodal balance.
//!
//! The three fidelity levels share one pipeline; the strategy only selects
//! which generator-bound rule applies and whether transition logic runs.

use good_lp::{constraint, variable, Expression, Variable};
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::grid::Grid;
use crate::model::context::{OptimizationContext, PeriodVars};

/// Upper bound of a shortage slack, MW. Large enough to absorb any realistic
/// nodal deficit without unbounding the problem.
pub const SHORTAGE_BOUND: f64 = 1000.0;

/// Model fidelity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Continuous dispatch only: `Pmin <= g <= Pmax`, units can never switch
    /// off when `Pmin > 0`.
    Simple,
    /// Adds one commitment boolean per unit: `on*Pmin <= g <= on*Pmax`.
    Binary,
    /// Binary plus ramp limits and start/stop transition bounds.
    Complex,
}

impl Strategy {
    pub fn models_commitment(self) -> bool {
        !matches!(self, Strategy::Simple)
    }

    pub fn models_transitions(self) -> bool {
        matches!(self, Strategy::Complex)
    }
}

/// Whether nodal balance is an exact equality or may be relaxed by a
/// shortage slack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceMode {
    Strict,
    Relaxed,
}

/// Build every constraint of period `t` and commit the period's variables to
/// the ledger.
///
/// Periods must be processed in increasing order: the transition constraints
/// of period `t` read the ledger entry of period `t-1`.
pub fn build_period_constraints(
    ctx: &mut OptimizationContext,
    grid: &Grid,
    period: PeriodVars,
    t: usize,
    strategy: Strategy,
    mode: BalanceMode,
) -> Result<()> {
    for node_a in grid.nodes() {
        let a = node_a.index;
        let mut outgoing: Vec<Variable> = Vec::new();

        // DC power-flow physics: flow == v_src * v_dst * admittance * (phase_src - phase_dst).
        // The phase term is antisymmetric under direction swap while the
        // voltage product and admittance are not, so the two directed flow
        // variables of an edge end up exact negatives of each other with no
        // explicit tie between them.
        for node_b in grid.nodes() {
            let b = node_b.index;
            let Some(flow) = &period.flows[a][b] else {
                continue;
            };
            let edge = grid
                .find_edge(&node_a.name, &node_b.name)
                .ok_or_else(|| DispatchError::EdgeNotFound {
                    a: node_a.name.clone(),
                    b: node_b.name.clone(),
                })?;
            let coefficient = flow.src_voltage * flow.dst_voltage * edge.admittance;
            ctx.push_constraint(constraint!(
                flow.var == (period.phases[a] - period.phases[b]) * coefficient
            ));
            outgoing.push(flow.var);
        }

        // Generator bounds. The degenerate [0,0] generator of a plantless
        // node needs no bound constraints.
        let node_vars = &period.nodes[a];
        for (i, plant) in node_a.plants.iter().enumerate() {
            let gen = node_vars.generation[i];
            match strategy {
                Strategy::Simple => {
                    ctx.push_constraint(constraint!(gen <= plant.p_max));
                    ctx.push_constraint(constraint!(gen >= plant.p_min));
                }
                Strategy::Binary | Strategy::Complex => {
                    let on = commitment_var(node_vars.commitment.as_deref(), i, &node_a.name)?;
                    ctx.push_constraint(constraint!(gen - on * plant.p_max <= 0.0));
                    ctx.push_constraint(constraint!(gen - on * plant.p_min >= 0.0));

                    if strategy.models_transitions() && t > 0 {
                        let previous = ctx.ledger.get(t - 1).ok_or_else(|| {
                            DispatchError::Model(format!(
                                "period {t} built before period {}",
                                t - 1
                            ))
                        })?;
                        let prev_node = &previous.nodes[a];
                        let prev_on =
                            commitment_var(prev_node.commitment.as_deref(), i, &node_a.name)?;
                        let prev_gen = prev_node.generation[i];
                        transition_constraints(
                            ctx,
                            prev_on,
                            on,
                            prev_gen,
                            gen,
                            plant.p_min,
                            plant.ramp,
                            &plant.block_name,
                            t,
                        );
                    }
                }
            }
        }

        // Nodal balance: generation - demand - net outgoing flow == 0,
        // with a shortage slack on the left in relaxed mode.
        let demand = node_a.demand[t] * ctx.demand_multiplier;
        let generation: Expression = node_vars
            .generation
            .iter()
            .map(|&v| Expression::from(v))
            .sum();
        let flows: Expression = outgoing.iter().map(|&v| Expression::from(v)).sum();
        match mode {
            BalanceMode::Strict => {
                ctx.push_constraint(constraint!(generation - flows == demand));
            }
            BalanceMode::Relaxed => {
                let short = ctx.vars.add(
                    variable()
                        .min(0.0)
                        .max(SHORTAGE_BOUND)
                        .name(format!("shortage_{}_t{}", node_a.name, t)),
                );
                ctx.push_constraint(constraint!(generation - flows + short == demand));
                ctx.shortages.push(short);
            }
        }
    }

    ctx.commit_period(t, period)
}

fn commitment_var(
    commitment: Option<&[Variable]>,
    i: usize,
    node_name: &str,
) -> Result<Variable> {
    commitment
        .and_then(|on| on.get(i))
        .copied()
        .ok_or_else(|| {
            DispatchError::Model(format!(
                "commitment variables missing for node {node_name}; \
                 variables were built with a non-commitment strategy"
            ))
        })
}

/// Start/stop transition logic for one unit between periods `t-1` and `t`.
///
/// The boolean `z` is pinned by four inequalities to 1 exactly when the
/// commitment state changed and to 0 during steady operation (on or off).
/// The inter-period swing is then bounded by
/// `|g[t-1] - g[t]| <= z*Pmin + (1-z)*ramp`: a unit may move up to its ramp
/// limit while running continuously, but the jump at a start or stop event is
/// capped at `Pmin`.
#[allow(clippy::too_many_arguments)]
fn transition_constraints(
    ctx: &mut OptimizationContext,
    prev_on: Variable,
    on: Variable,
    prev_gen: Variable,
    gen: Variable,
    p_min: f64,
    ramp: f64,
    block_name: &str,
    t: usize,
) -> Variable {
    let z = ctx
        .vars
        .add(variable().binary().name(format!("z_{block_name}_t{t}")));

    ctx.push_constraint(constraint!(prev_on + on >= z));
    ctx.push_constraint(constraint!(prev_on - on <= z));
    ctx.push_constraint(constraint!(on - prev_on <= z));
    ctx.push_constraint(constraint!(prev_on + on + z <= 2.0));

    // z*Pmin + (1-z)*ramp, rearranged so z appears once.
    let swing = z * (p_min - ramp) + ramp;
    ctx.push_constraint(constraint!(prev_gen - gen <= swing.clone()));
    ctx.push_constraint(constraint!(gen - prev_gen <= swing));
    z
}
