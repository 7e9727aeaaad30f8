//! Input record schemas and grid assembly.
//!
//! Two formats are supported, matching the upstream tooling: comma-separated
//! line records for nodes, plants and edges, and a JSON array for plants.
//! Optional trailing fields (`cost`, `ramp`) are resolved into `Option`s once
//! at parse time; nothing downstream ever branches on field count.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::grid::model::{Edge, Grid, Plant};

/// `name, d0, d1, ..., dn` — one demand magnitude per period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub demand: Vec<f64>,
}

/// `nodeName, plantName, blockName, Pmin, Pmax, <unused>, [cost], [ramp]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    #[serde(rename = "sourceNode")]
    pub node_name: String,
    pub plant_name: String,
    pub block_name: String,
    #[serde(rename = "Pmin")]
    pub p_min: f64,
    #[serde(rename = "Pmax")]
    pub p_max: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub ramp: Option<f64>,
}

/// `nodeA, nodeB, capacity, admittance, voltageA, voltageB`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub node_a: String,
    pub node_b: String,
    pub capacity: f64,
    pub admittance: f64,
    pub voltage_a: f64,
    pub voltage_b: f64,
}

fn parse_field(field: &str, kind: &'static str, line: usize) -> Result<f64> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| DispatchError::MalformedRecord {
            kind,
            line,
            reason: format!("expected a number, got {:?}", field.trim()),
        })
}

fn split_line(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

/// Parse node records from CSV text. Blank lines are skipped.
pub fn parse_nodes(text: &str) -> Result<Vec<NodeRecord>> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line);
        if fields.len() < 2 {
            return Err(DispatchError::MalformedRecord {
                kind: "node",
                line: line_no,
                reason: format!("expected a name and at least one demand, got {} fields", fields.len()),
            });
        }
        let demand = fields[1..]
            .iter()
            .map(|f| parse_field(f, "node", line_no))
            .collect::<Result<Vec<_>>>()?;
        records.push(NodeRecord {
            name: fields[0].to_string(),
            demand,
        });
    }
    Ok(records)
}

/// Parse plant records from CSV text: 6, 7 or 8 fields per line, with `cost`
/// and `ramp` as optional trailing fields.
pub fn parse_plants(text: &str) -> Result<Vec<PlantRecord>> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line);
        if fields.len() < 6 || fields.len() > 8 {
            return Err(DispatchError::MalformedRecord {
                kind: "plant",
                line: line_no,
                reason: format!("expected 6 to 8 fields, got {}", fields.len()),
            });
        }
        // fields[5] is a legacy column with no meaning here.
        let cost = match fields.get(6) {
            Some(f) => Some(parse_field(f, "plant", line_no)?),
            None => None,
        };
        let ramp = match fields.get(7) {
            Some(f) => Some(parse_field(f, "plant", line_no)?),
            None => None,
        };
        records.push(PlantRecord {
            node_name: fields[0].to_string(),
            plant_name: fields[1].to_string(),
            block_name: fields[2].to_string(),
            p_min: parse_field(fields[3], "plant", line_no)?,
            p_max: parse_field(fields[4], "plant", line_no)?,
            cost,
            ramp,
        });
    }
    Ok(records)
}

/// Parse plant records from a JSON array, the other ingestion path the
/// upstream tooling feeds us.
pub fn parse_plants_json(text: &str) -> Result<Vec<PlantRecord>> {
    Ok(serde_json::from_str(text)?)
}

/// Parse edge records from CSV text.
pub fn parse_edges(text: &str) -> Result<Vec<EdgeRecord>> {
    let mut records = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(line);
        if fields.len() != 6 {
            return Err(DispatchError::MalformedRecord {
                kind: "edge",
                line: line_no,
                reason: format!("expected 6 fields, got {}", fields.len()),
            });
        }
        records.push(EdgeRecord {
            node_a: fields[0].to_string(),
            node_b: fields[1].to_string(),
            capacity: parse_field(fields[2], "edge", line_no)?,
            admittance: parse_field(fields[3], "edge", line_no)?,
            voltage_a: parse_field(fields[4], "edge", line_no)?,
            voltage_b: parse_field(fields[5], "edge", line_no)?,
        });
    }
    Ok(records)
}

/// Assemble a validated grid from parsed records.
///
/// Plants referencing unknown nodes and edges referencing unknown endpoints
/// are rejected with lookup errors rather than silently dropped.
pub fn build_grid(
    nodes: Vec<NodeRecord>,
    plants: Vec<PlantRecord>,
    edges: Vec<EdgeRecord>,
) -> Result<Grid> {
    let mut grid = Grid::default();
    for record in nodes {
        grid.add_node(record.name, record.demand)?;
    }
    for record in plants {
        let plant = Plant::new(
            record.plant_name,
            record.block_name,
            record.p_min,
            record.p_max,
            record.cost,
            record.ramp,
        )?;
        grid.add_plant(&record.node_name, plant)?;
    }
    for record in edges {
        grid.add_edge(Edge::new(
            record.node_a,
            record.node_b,
            record.capacity,
            record.admittance,
            record.voltage_a,
            record.voltage_b,
        )?)?;
    }
    Ok(grid)
}
