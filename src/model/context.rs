use good_lp::{Constraint, ProblemVariables, Variable};

use crate::error::{DispatchError, Result};

/// Per-node slice of the solver ledger for one period.
///
/// `generation` is aligned by position with the node's plant list (a
/// plantless node carries a single generator fixed at `[0, 0]` so it still
/// participates in balance equations). `commitment` is present only under
/// commitment-aware strategies and is aligned with `generation`.
#[derive(Debug, Clone)]
pub struct NodeVars {
    pub node_name: String,
    pub generation: Vec<Variable>,
    pub commitment: Option<Vec<Variable>>,
    pub costs: Vec<f64>,
}

/// Directed flow variable for one ordered adjacent pair, with the terminal
/// voltages as seen from that direction.
#[derive(Debug, Clone)]
pub struct EdgeFlowVar {
    pub var: Variable,
    pub capacity: f64,
    pub src_voltage: f64,
    pub dst_voltage: f64,
}

/// All decision variables of one time period.
///
/// `flows` is an n-by-n matrix indexed by node index; `None` marks a
/// non-adjacent pair. A physical edge contributes two independent directed
/// entries, `[a][b]` and `[b][a]`.
#[derive(Debug, Clone)]
pub struct PeriodVars {
    pub nodes: Vec<NodeVars>,
    pub flows: Vec<Vec<Option<EdgeFlowVar>>>,
    pub phases: Vec<Variable>,
}

/// Owns everything one optimization run accumulates: the solver's variable
/// pool, the pending constraint list, the time-indexed ledger and the
/// shortage slacks collected in relaxed mode.
///
/// Periods must be committed strictly in increasing order; period `t`'s
/// transition constraints read entry `t-1`.
pub struct OptimizationContext {
    pub vars: ProblemVariables,
    pub constraints: Vec<Constraint>,
    pub ledger: Vec<PeriodVars>,
    pub shortages: Vec<Variable>,
    pub demand_multiplier: f64,
}

impl OptimizationContext {
    pub fn new(demand_multiplier: f64) -> Self {
        Self {
            vars: ProblemVariables::new(),
            constraints: Vec::new(),
            ledger: Vec::new(),
            shortages: Vec::new(),
            demand_multiplier,
        }
    }

    pub fn push_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Append a fully constrained period to the ledger. Rejects out-of-order
    /// commits, which would corrupt the ramp logic.
    pub fn commit_period(&mut self, t: usize, period: PeriodVars) -> Result<()> {
        if t != self.ledger.len() {
            return Err(DispatchError::Model(format!(
                "period {t} committed out of order, expected {}",
                self.ledger.len()
            )));
        }
        self.ledger.push(period);
        Ok(())
    }
}
