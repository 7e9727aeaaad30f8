//! Renders a solved period as the graph-element collection the visualization
//! front end consumes: one record per node, one per plant (as a child node)
//! and one per physical edge.

use serde::Serialize;

use crate::grid::Grid;
use crate::model::solve::SolvedPeriod;

#[derive(Debug, Clone, Serialize)]
pub struct GraphElement {
    pub group: ElementGroup,
    pub data: ElementData,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementGroup {
    Nodes,
    Edges,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ElementData {
    Node {
        id: String,
        #[serde(rename = "type")]
        kind: &'static str,
        demand: f64,
    },
    Plant {
        id: String,
        parent: String,
        #[serde(rename = "type")]
        kind: &'static str,
        value: f64,
        #[serde(rename = "isWorking")]
        is_working: u8,
    },
    Edge {
        id: String,
        source: String,
        target: String,
        value: f64,
        percentage: f64,
    },
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Line utilisation in percent. Non-positive capacity cannot occur for a
/// validated grid, but a defined 0 beats a silent division fault.
fn utilisation(flow: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        round2((flow / capacity).abs() * 100.0)
    } else {
        0.0
    }
}

/// Export one solved period as graph elements.
///
/// Of the two directed flow variables per physical edge only the canonical
/// direction (lower node index first) is emitted, so `(A,B)` and `(B,A)`
/// collapse into a single undirected record.
pub fn export_graph(grid: &Grid, solved: &SolvedPeriod) -> Vec<GraphElement> {
    let mut elements = Vec::new();

    for node in &solved.nodes {
        elements.push(GraphElement {
            group: ElementGroup::Nodes,
            data: ElementData::Node {
                id: node.name.clone(),
                kind: "node",
                demand: round2(node.demand),
            },
        });
    }

    for (node, solved_node) in grid.nodes().iter().zip(&solved.nodes) {
        for (i, plant) in node.plants.iter().enumerate() {
            elements.push(GraphElement {
                group: ElementGroup::Nodes,
                data: ElementData::Plant {
                    id: plant.block_name.clone(),
                    parent: node.name.clone(),
                    kind: "node",
                    value: round2(solved_node.generation[i]),
                    is_working: u8::from(solved_node.working[i]),
                },
            });
        }
    }

    for flow in &solved.flows {
        if flow.from_index >= flow.to_index {
            continue;
        }
        elements.push(GraphElement {
            group: ElementGroup::Edges,
            data: ElementData::Edge {
                id: format!("{}{}", flow.from, flow.to),
                source: flow.from.clone(),
                target: flow.to.clone(),
                value: round2(flow.value),
                percentage: utilisation(flow.value, flow.capacity),
            },
        });
    }

    elements
}
