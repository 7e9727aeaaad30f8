//! Per-period variable creation: generation, commitment, phase angle and
//! directed edge flow.

use good_lp::{variable, Variable};

use crate::grid::Grid;
use crate::model::constraints::Strategy;
use crate::model::context::{EdgeFlowVar, NodeVars, OptimizationContext, PeriodVars};

/// Bound on every phase-angle variable, in radians.
pub const MAX_PHASE: f64 = std::f64::consts::PI;

/// Generation variables for every node, plus commitment booleans when the
/// strategy models unit commitment.
///
/// The lower bound of every generation variable is 0 even when `Pmin > 0`, so
/// a unit can be forced off; the minimum is enforced by the constraint
/// builder (directly in the simple strategy, tied to the commitment boolean
/// otherwise). A plantless node gets one generator fixed at `[0, 0]` so that
/// every node participates uniformly in balance equations.
pub fn node_variables(
    ctx: &mut OptimizationContext,
    grid: &Grid,
    strategy: Strategy,
    t: usize,
) -> Vec<NodeVars> {
    let mut all = Vec::with_capacity(grid.nodes().len());
    for node in grid.nodes() {
        let mut generation = Vec::new();
        let mut commitment = strategy.models_commitment().then(Vec::new);
        let mut costs = Vec::new();

        if node.plants.is_empty() {
            generation.push(ctx.vars.add(
                variable()
                    .min(0.0)
                    .max(0.0)
                    .name(format!("{}_t{}", node.name, t)),
            ));
            if let Some(on) = commitment.as_mut() {
                on.push(
                    ctx.vars
                        .add(variable().binary().name(format!("{}_on_t{}", node.name, t))),
                );
            }
            costs.push(1.0);
        } else {
            for plant in &node.plants {
                generation.push(ctx.vars.add(
                    variable().min(0.0).max(plant.p_max).name(format!(
                        "{}_{}_t{}",
                        plant.name, plant.block_name, t
                    )),
                ));
                if let Some(on) = commitment.as_mut() {
                    on.push(ctx.vars.add(
                        variable()
                            .binary()
                            .name(format!("{}_on_t{}", plant.block_name, t)),
                    ));
                }
                costs.push(plant.cost);
            }
        }

        all.push(NodeVars {
            node_name: node.name.clone(),
            generation,
            commitment,
            costs,
        });
    }
    all
}

/// One phase-angle variable per node in `[-pi, pi]`. The reference node
/// (index 0) is overwritten with a variable pinned to `[0, 0]` after the
/// loop: the slack bus anchors the angular reference for the whole grid.
pub fn phase_variables(ctx: &mut OptimizationContext, grid: &Grid, t: usize) -> Vec<Variable> {
    let mut phases: Vec<Variable> = grid
        .nodes()
        .iter()
        .map(|node| {
            ctx.vars.add(
                variable()
                    .min(-MAX_PHASE)
                    .max(MAX_PHASE)
                    .name(format!("phase_{}_t{}", node.name, t)),
            )
        })
        .collect();
    if let Some(reference) = phases.first_mut() {
        *reference = ctx.vars.add(
            variable()
                .min(0.0)
                .max(0.0)
                .name(format!("phase_ref_t{t}")),
        );
    }
    phases
}

/// Directed flow variables: for every ordered pair of adjacent nodes one
/// variable bounded by `[-capacity, +capacity]`, carrying the terminal
/// voltages oriented for that direction. Non-adjacent pairs are an explicit
/// `None` so downstream loops can skip them. Each physical edge therefore
/// yields two independent directed variables.
pub fn edge_flow_variables(
    ctx: &mut OptimizationContext,
    grid: &Grid,
    t: usize,
) -> Vec<Vec<Option<EdgeFlowVar>>> {
    let mut matrix = Vec::with_capacity(grid.nodes().len());
    for node_a in grid.nodes() {
        let mut row = Vec::with_capacity(grid.nodes().len());
        for node_b in grid.nodes() {
            match grid.find_edge(&node_a.name, &node_b.name) {
                Some(edge) => {
                    let var = ctx.vars.add(
                        variable()
                            .min(-edge.capacity)
                            .max(edge.capacity)
                            .name(format!("flow_{}_{}_t{}", node_a.name, node_b.name, t)),
                    );
                    row.push(Some(EdgeFlowVar {
                        var,
                        capacity: edge.capacity,
                        src_voltage: grid.source_voltage(&node_a.name, &node_b.name, edge),
                        dst_voltage: grid.source_voltage(&node_b.name, &node_a.name, edge),
                    }));
                }
                None => row.push(None),
            }
        }
        matrix.push(row);
    }
    matrix
}

/// All variables of one period, ready for the constraint builder.
pub fn period_variables(
    ctx: &mut OptimizationContext,
    grid: &Grid,
    strategy: Strategy,
    t: usize,
) -> PeriodVars {
    PeriodVars {
        nodes: node_variables(ctx, grid, strategy, t),
        flows: edge_flow_variables(ctx, grid, t),
        phases: phase_variables(ctx, grid, t),
    }
}
