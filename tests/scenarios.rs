//! End-to-end dispatch scenarios solved against the real MILP backend.
//!
//! These cover the observable contract of the model builder: nodal balance,
//! the pinned reference bus, directed-flow antisymmetry, commitment
//! semantics and the startup/shutdown swing bounds.

use grid_dispatch::error::DispatchError;
use grid_dispatch::model::{
    BalanceMode, DispatchProblem, ModelOptions, SolveStatus, SolvedModel, SolvedPeriod, Strategy,
};
use grid_dispatch::{export, Edge, Grid, Plant};

const TOL: f64 = 1e-4;

fn flow(period: &SolvedPeriod, from: &str, to: &str) -> f64 {
    period
        .flows
        .iter()
        .find(|f| f.from == from && f.to == to)
        .map(|f| f.value)
        .unwrap_or_else(|| panic!("no directed flow {from}->{to}"))
}

/// One plant at A, all demand at B, a single 150 MW line between them.
fn two_node_grid(p_max: f64) -> Grid {
    let mut grid = Grid::default();
    grid.add_node("A", vec![0.0]).unwrap();
    grid.add_node("B", vec![100.0]).unwrap();
    grid.add_plant(
        "A",
        Plant::new("Turow", "T1", 0.0, p_max, Some(1.0), None).unwrap(),
    )
    .unwrap();
    grid.add_edge(Edge::new("A", "B", 150.0, 1000.0, 1.0, 1.0).unwrap())
        .unwrap();
    grid
}

fn solve(grid: &Grid, options: ModelOptions) -> Result<SolvedModel, DispatchError> {
    DispatchProblem::new(grid, options).unwrap().solve()
}

/// Every node must balance exactly: generation - demand - net outgoing flow,
/// plus any shortage assigned to the node's balance row.
fn assert_balanced(grid: &Grid, solved: &SolvedModel) {
    let per_node_shortage = solved.shortages.len() == solved.periods.len() * grid.nodes().len();
    for (t, period) in solved.periods.iter().enumerate() {
        for (i, node) in period.nodes.iter().enumerate() {
            let generation: f64 = node.generation.iter().sum();
            let outgoing: f64 = period
                .flows
                .iter()
                .filter(|f| f.from_index == i)
                .map(|f| f.value)
                .sum();
            let shortage = if per_node_shortage {
                solved.shortages[t * grid.nodes().len() + i]
            } else {
                0.0
            };
            let residual = generation - node.demand - outgoing + shortage;
            assert!(
                residual.abs() < TOL,
                "node {} period {t} unbalanced by {residual}",
                node.name
            );
        }
    }
}

#[test]
fn scenario_a_single_plant_serves_remote_demand() {
    let grid = two_node_grid(200.0);
    let solved = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Simple,
            ..ModelOptions::default()
        },
    )
    .unwrap();

    let period = &solved.periods[0];
    assert!((period.nodes[0].generation[0] - 100.0).abs() < TOL);
    assert!((flow(period, "A", "B") - 100.0).abs() < TOL);
    assert!((flow(period, "B", "A") + 100.0).abs() < TOL);
    assert!((solved.report.objective_value - 100.0).abs() < TOL);
    assert_eq!(solved.report.status, SolveStatus::Optimal);
    assert_balanced(&grid, &solved);
}

#[test]
fn scenario_a_export_shape() {
    let grid = two_node_grid(200.0);
    let solved = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Simple,
            ..ModelOptions::default()
        },
    )
    .unwrap();

    let elements = export::export_graph(&grid, &solved.periods[0]);
    let json = serde_json::to_value(&elements).unwrap();
    let edge = json
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["group"] == "edges")
        .expect("one undirected edge record");
    assert_eq!(edge["data"]["value"], 100.0);
    assert_eq!(edge["data"]["percentage"], 66.67);
}

#[test]
fn scenario_b_strict_infeasible_relaxed_sheds_exact_deficit() {
    let grid = two_node_grid(80.0);

    let strict = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Simple,
            ..ModelOptions::default()
        },
    );
    match strict {
        Err(DispatchError::Solver(SolveStatus::Infeasible)) => {}
        other => panic!("expected infeasible, got {other:?}"),
    }

    let relaxed = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Simple,
            mode: BalanceMode::Relaxed,
            ..ModelOptions::default()
        },
    )
    .unwrap();
    assert_eq!(relaxed.report.status, SolveStatus::Optimal);
    assert!((relaxed.total_shortage() - 20.0).abs() < TOL);
    assert!(relaxed.shortages.iter().all(|&s| s >= -TOL));
    // 80 MW generated at cost 1, 20 MW shed at penalty 2.
    assert!((relaxed.report.objective_value - 120.0).abs() < TOL);
    assert_balanced(&grid, &relaxed);
}

#[test]
fn scenario_c_startup_jump_bounded_by_p_min_not_ramp() {
    // Pmin 10, ramp 30. Demand profile forces the unit off in period 0.
    let startup_at_p_min = {
        let mut grid = Grid::default();
        grid.add_node("N", vec![0.0, 10.0, 10.0]).unwrap();
        grid.add_plant(
            "N",
            Plant::new("Turow", "T1", 10.0, 100.0, Some(1.0), Some(30.0)).unwrap(),
        )
        .unwrap();
        grid
    };
    let solved = solve(
        &startup_at_p_min,
        ModelOptions {
            strategy: Strategy::Complex,
            periods: 3,
            ..ModelOptions::default()
        },
    )
    .unwrap();
    assert!(solved.periods[0].nodes[0].generation[0].abs() < TOL);
    assert!(!solved.periods[0].nodes[0].working[0]);
    assert!((solved.periods[1].nodes[0].generation[0] - 10.0).abs() < TOL);
    assert!(solved.periods[1].nodes[0].working[0]);

    // A 20 MW jump at startup is within the ramp limit but above Pmin, so
    // the transition bound must reject it.
    let startup_above_p_min = {
        let mut grid = Grid::default();
        grid.add_node("N", vec![0.0, 20.0, 20.0]).unwrap();
        grid.add_plant(
            "N",
            Plant::new("Turow", "T1", 10.0, 100.0, Some(1.0), Some(30.0)).unwrap(),
        )
        .unwrap();
        grid
    };
    let result = solve(
        &startup_above_p_min,
        ModelOptions {
            strategy: Strategy::Complex,
            periods: 3,
            ..ModelOptions::default()
        },
    );
    match result {
        Err(DispatchError::Solver(SolveStatus::Infeasible)) => {}
        other => panic!("expected infeasible, got {other:?}"),
    }
}

#[test]
fn complex_allows_full_ramp_during_steady_operation() {
    // Once running, the unit may swing by its ramp limit per period.
    let mut grid = Grid::default();
    grid.add_node("N", vec![10.0, 40.0]).unwrap();
    grid.add_plant(
        "N",
        Plant::new("Turow", "T1", 10.0, 100.0, Some(1.0), Some(30.0)).unwrap(),
    )
    .unwrap();

    let solved = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Complex,
            periods: 2,
            ..ModelOptions::default()
        },
    )
    .unwrap();
    let g0 = solved.periods[0].nodes[0].generation[0];
    let g1 = solved.periods[1].nodes[0].generation[0];
    assert!((g1 - g0 - 30.0).abs() < TOL);
}

#[test]
fn binary_commitment_semantics() {
    // Two units, only the cheap one is needed; the expensive one must be
    // fully off, not lingering below its Pmin.
    let mut grid = Grid::default();
    grid.add_node("A", vec![50.0]).unwrap();
    grid.add_plant(
        "A",
        Plant::new("Cheap", "C1", 20.0, 100.0, Some(1.0), None).unwrap(),
    )
    .unwrap();
    grid.add_plant(
        "A",
        Plant::new("Dear", "D1", 30.0, 100.0, Some(5.0), None).unwrap(),
    )
    .unwrap();

    let solved = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Binary,
            ..ModelOptions::default()
        },
    )
    .unwrap();

    let node = &solved.periods[0].nodes[0];
    let plants = &grid.nodes()[0].plants;
    for (i, plant) in plants.iter().enumerate() {
        if node.working[i] {
            assert!(node.generation[i] >= plant.p_min - TOL);
            assert!(node.generation[i] <= plant.p_max + TOL);
        } else {
            assert!(node.generation[i].abs() < TOL);
        }
    }
    assert!(node.working[0]);
    assert!(!node.working[1]);
    assert!((node.generation[0] - 50.0).abs() < TOL);
}

#[test]
fn reference_bus_and_antisymmetry_on_a_chain() {
    // A - B - C chain, generation at A, demand at B and C.
    let mut grid = Grid::default();
    grid.add_node("A", vec![0.0]).unwrap();
    grid.add_node("B", vec![40.0]).unwrap();
    grid.add_node("C", vec![30.0]).unwrap();
    grid.add_plant(
        "A",
        Plant::new("Turow", "T1", 0.0, 200.0, Some(1.0), None).unwrap(),
    )
    .unwrap();
    grid.add_edge(Edge::new("A", "B", 150.0, 1000.0, 1.0, 1.0).unwrap())
        .unwrap();
    grid.add_edge(Edge::new("B", "C", 150.0, 1000.0, 1.0, 1.0).unwrap())
        .unwrap();

    let solved = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Simple,
            ..ModelOptions::default()
        },
    )
    .unwrap();
    let period = &solved.periods[0];

    assert!(period.phases[0].abs() < TOL, "reference bus must sit at 0");
    for pair in [("A", "B"), ("B", "C")] {
        let forward = flow(period, pair.0, pair.1);
        let backward = flow(period, pair.1, pair.0);
        assert!(
            (forward + backward).abs() < TOL,
            "flow {}->{} not antisymmetric",
            pair.0,
            pair.1
        );
    }
    assert!((flow(period, "A", "B") - 70.0).abs() < TOL);
    assert!((flow(period, "B", "C") - 30.0).abs() < TOL);
    assert_balanced(&grid, &solved);
}

#[test]
fn demand_multiplier_scales_every_node() {
    let grid = two_node_grid(200.0);
    let solved = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Simple,
            demand_multiplier: 0.5,
            ..ModelOptions::default()
        },
    )
    .unwrap();

    let period = &solved.periods[0];
    assert!((period.nodes[1].demand - 50.0).abs() < TOL);
    assert!((period.nodes[0].generation[0] - 50.0).abs() < TOL);
    assert!((flow(period, "A", "B") - 50.0).abs() < TOL);
}

#[test]
fn audited_objective_keeps_shortage_penalty_in_relaxed_mode() {
    // Shedding must stay strictly dearer than generating even when the
    // per-term audit variables replace the plain cost sum.
    let grid = two_node_grid(80.0);
    let solved = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Simple,
            mode: BalanceMode::Relaxed,
            audit_costs: true,
            ..ModelOptions::default()
        },
    )
    .unwrap();

    assert!((solved.periods[0].nodes[0].generation[0] - 80.0).abs() < TOL);
    assert!((solved.total_shortage() - 20.0).abs() < TOL);
    // 80 MW generated at cost 1, 20 MW shed at penalty 2.
    assert!((solved.report.objective_value - 120.0).abs() < TOL);
    assert_balanced(&grid, &solved);
}

#[test]
fn audited_objective_matches_plain_cost() {
    let grid = two_node_grid(200.0);
    let audited = solve(
        &grid,
        ModelOptions {
            strategy: Strategy::Simple,
            audit_costs: true,
            ..ModelOptions::default()
        },
    )
    .unwrap();
    assert!((audited.report.objective_value - 100.0).abs() < TOL);
}
