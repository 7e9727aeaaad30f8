use anyhow::{Context, Result};
use std::fs;
use tracing::{info, warn};

use grid_dispatch::config::Config;
use grid_dispatch::error::DispatchError;
use grid_dispatch::model::{BalanceMode, DispatchProblem, SolveStatus, SolvedModel};
use grid_dispatch::{export, grid};

fn main() -> Result<()> {
    grid_dispatch::telemetry::init_tracing();

    let cfg = Config::load()?;

    let nodes_text = fs::read_to_string(&cfg.input.nodes)
        .with_context(|| format!("reading nodes from {}", cfg.input.nodes.display()))?;
    let plants_text = fs::read_to_string(&cfg.input.plants)
        .with_context(|| format!("reading plants from {}", cfg.input.plants.display()))?;
    let edges_text = fs::read_to_string(&cfg.input.edges)
        .with_context(|| format!("reading edges from {}", cfg.input.edges.display()))?;

    let nodes = grid::parse_nodes(&nodes_text)?;
    let plants = if cfg.input.plants.extension().is_some_and(|e| e == "json") {
        grid::parse_plants_json(&plants_text)?
    } else {
        grid::parse_plants(&plants_text)?
    };
    let edges = grid::parse_edges(&edges_text)?;
    let grid = grid::build_grid(nodes, plants, edges)?;

    let options = cfg.model.to_options();
    let solved = match DispatchProblem::new(&grid, options.clone())?.solve() {
        Ok(solved) => solved,
        Err(DispatchError::Solver(SolveStatus::Infeasible))
            if options.mode == BalanceMode::Strict && cfg.model.fallback_to_relaxed =>
        {
            warn!("strict model is infeasible, retrying in relaxed mode");
            let mut relaxed = options;
            relaxed.mode = BalanceMode::Relaxed;
            DispatchProblem::new(&grid, relaxed)?.solve()?
        }
        Err(e) => return Err(e.into()),
    };

    report(&solved);

    let period = solved
        .periods
        .get(cfg.output.period)
        .with_context(|| format!("export period {} is out of range", cfg.output.period))?;
    let elements = export::export_graph(&grid, period);
    if let Some(dir) = cfg.output.path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&cfg.output.path, serde_json::to_string_pretty(&elements)?)
        .with_context(|| format!("writing graph to {}", cfg.output.path.display()))?;

    info!(path = %cfg.output.path.display(), "graph export written");
    Ok(())
}

fn report(solved: &SolvedModel) {
    info!(
        id = %solved.report.id,
        status = ?solved.report.status,
        objective = solved.report.objective_value,
        "dispatch solved"
    );
    let total_shortage = solved.total_shortage();
    if total_shortage > 0.0 {
        warn!(total_shortage, "demand was shed to keep the model feasible");
    }
}
