//! Linear cost objectives assembled from the per-period ledger.

use good_lp::{constraint, variable, Expression, Variable};
use ordered_float::OrderedFloat;

use crate::grid::model::DEFAULT_PLANT_COST;
use crate::model::context::OptimizationContext;

/// Bound on the audited per-term cost variables of the debugging objective.
const AUDIT_COST_BOUND: f64 = 10_000.0;

/// Plain generation cost: `sum(cost * generation)` over every plant and
/// period.
pub fn generation_cost(ctx: &OptimizationContext) -> Expression {
    cost_terms(ctx).into_iter().sum()
}

/// Generation cost plus every shortage slack weighted one unit above the most
/// expensive plant, so shedding load is strictly worse than any feasible
/// generation mix.
pub fn generation_cost_relaxed(ctx: &OptimizationContext) -> Expression {
    let penalty = shortage_penalty(ctx);
    let mut terms = cost_terms(ctx);
    for &short in &ctx.shortages {
        terms.push(short * penalty);
    }
    terms.into_iter().sum()
}

/// Per-unit weight applied to shortage slacks: max observed plant cost + 1.
pub fn shortage_penalty(ctx: &OptimizationContext) -> f64 {
    let max_cost = ctx
        .ledger
        .iter()
        .flat_map(|period| period.nodes.iter())
        .flat_map(|node| node.costs.iter().copied())
        .map(OrderedFloat)
        .max()
        .map(|c| c.0)
        .unwrap_or(DEFAULT_PLANT_COST);
    max_cost + 1.0
}

/// Debugging variant of [`generation_cost`]: one auxiliary continuous
/// variable per term, constrained equal to `cost * generation`, so individual
/// cost contributions can be inspected in the solved model. Shortage slacks,
/// when present, keep the same penalty weight as the relaxed objective, so
/// auditing never turns shedding free.
pub fn generation_cost_audited(ctx: &mut OptimizationContext) -> Expression {
    let penalty = shortage_penalty(ctx);
    let entries: Vec<(Variable, f64)> = ctx
        .ledger
        .iter()
        .flat_map(|period| period.nodes.iter())
        .flat_map(|node| node.generation.iter().copied().zip(node.costs.iter().copied()))
        .collect();

    let mut terms = Vec::with_capacity(entries.len());
    for (i, (gen, cost)) in entries.into_iter().enumerate() {
        let audit = ctx.vars.add(
            variable()
                .min(0.0)
                .max(AUDIT_COST_BOUND)
                .name(format!("cost_audit_{i}")),
        );
        ctx.push_constraint(constraint!(audit - gen * cost == 0.0));
        terms.push(Expression::from(audit));
    }
    for &short in &ctx.shortages {
        terms.push(short * penalty);
    }
    terms.into_iter().sum()
}

fn cost_terms(ctx: &OptimizationContext) -> Vec<Expression> {
    let mut terms = Vec::new();
    for period in &ctx.ledger {
        for node in &period.nodes {
            for (i, &gen) in node.generation.iter().enumerate() {
                terms.push(gen * node.costs[i]);
            }
        }
    }
    terms
}
