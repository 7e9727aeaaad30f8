use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// A grid bus: a demand sink that may also host generating plants.
///
/// `demand` holds one non-negative magnitude per time period; the global
/// demand multiplier is applied at model-build time, not here. `index` is the
/// node's stable position in the grid, used for matrix-style lookups into the
/// per-period variable ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub demand: Vec<f64>,
    pub index: usize,
    pub plants: Vec<Plant>,
}

impl Node {
    pub fn new(name: impl Into<String>, demand: Vec<f64>, index: usize) -> Result<Self> {
        let name = name.into();
        if demand.is_empty() {
            return Err(DispatchError::InvalidNode {
                name,
                reason: "demand series is empty".to_string(),
            });
        }
        if let Some(bad) = demand.iter().find(|d| **d < 0.0 || !d.is_finite()) {
            return Err(DispatchError::InvalidNode {
                name,
                reason: format!("demand must be finite and non-negative, got {bad}"),
            });
        }
        Ok(Self {
            name,
            demand,
            index,
            plants: Vec::new(),
        })
    }
}

/// A generating unit inside a node.
///
/// `block_name` is unique within its node and is used as constraint/variable
/// identity. A missing ramp means the unit can swing freely between `p_min`
/// and `p_max` from one period to the next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub name: String,
    pub block_name: String,
    pub p_min: f64,
    pub p_max: f64,
    pub ramp: f64,
    pub cost: f64,
}

pub const DEFAULT_PLANT_COST: f64 = 1.0;

impl Plant {
    pub fn new(
        name: impl Into<String>,
        block_name: impl Into<String>,
        p_min: f64,
        p_max: f64,
        cost: Option<f64>,
        ramp: Option<f64>,
    ) -> Result<Self> {
        let block_name = block_name.into();
        if p_min < 0.0 {
            return Err(DispatchError::InvalidPlant {
                block: block_name,
                reason: format!("Pmin must be non-negative, got {p_min}"),
            });
        }
        if p_max < p_min {
            return Err(DispatchError::InvalidPlant {
                block: block_name,
                reason: format!("Pmax {p_max} is below Pmin {p_min}"),
            });
        }
        let ramp = ramp.unwrap_or(p_max - p_min);
        if ramp < 0.0 {
            return Err(DispatchError::InvalidPlant {
                block: block_name,
                reason: format!("ramp must be non-negative, got {ramp}"),
            });
        }
        Ok(Self {
            name: name.into(),
            block_name,
            p_min,
            p_max,
            ramp,
            cost: cost.unwrap_or(DEFAULT_PLANT_COST),
        })
    }
}

/// A transmission line between two nodes.
///
/// Undirected: the edge between A and B is the same object whichever way it
/// is queried. `capacity` bounds the flow symmetrically, `admittance` is the
/// line susceptance in siemens and the two voltages are the terminal
/// magnitudes as stored, i.e. `voltage_a` belongs to `node_a`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub node_a: String,
    pub node_b: String,
    pub capacity: f64,
    pub admittance: f64,
    pub voltage_a: f64,
    pub voltage_b: f64,
}

impl Edge {
    pub fn new(
        node_a: impl Into<String>,
        node_b: impl Into<String>,
        capacity: f64,
        admittance: f64,
        voltage_a: f64,
        voltage_b: f64,
    ) -> Result<Self> {
        let node_a = node_a.into();
        let node_b = node_b.into();
        if capacity <= 0.0 || !capacity.is_finite() {
            return Err(DispatchError::InvalidEdge {
                a: node_a,
                b: node_b,
                reason: format!("capacity must be positive, got {capacity}"),
            });
        }
        Ok(Self {
            node_a,
            node_b,
            capacity,
            admittance,
            voltage_a,
            voltage_b,
        })
    }

    /// Whether this edge connects the two named nodes, in either order.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.node_a == a && self.node_b == b) || (self.node_a == b && self.node_b == a)
    }
}

/// The full topology handed to the model builder.
///
/// Lookups are linear scans; grids in dispatch studies are small enough that
/// index structures would not pay for themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grid {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Grid {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Append a node. Names are lookup keys, so duplicates are rejected.
    pub fn add_node(&mut self, name: impl Into<String>, demand: Vec<f64>) -> Result<()> {
        let name = name.into();
        if self.find_node(&name).is_some() {
            return Err(DispatchError::InvalidNode {
                name,
                reason: "duplicate node name".to_string(),
            });
        }
        let node = Node::new(name, demand, self.nodes.len())?;
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        self.find_node(&edge.node_a)
            .ok_or_else(|| DispatchError::NodeNotFound(edge.node_a.clone()))?;
        self.find_node(&edge.node_b)
            .ok_or_else(|| DispatchError::NodeNotFound(edge.node_b.clone()))?;
        self.edges.push(edge);
        Ok(())
    }

    /// Attach a plant to the named node. Fails if the node does not exist.
    pub fn add_plant(&mut self, node_name: &str, plant: Plant) -> Result<()> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.name == node_name)
            .ok_or_else(|| DispatchError::NodeNotFound(node_name.to_string()))?;
        node.plants.push(plant);
        Ok(())
    }

    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Order-independent edge lookup: `(A,B)` and `(B,A)` find the same edge.
    pub fn find_edge(&self, a: &str, b: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.connects(a, b))
    }

    /// Voltage at the node that is the "from" side when the edge is traversed
    /// from `a` towards `b`.
    pub fn source_voltage(&self, a: &str, _b: &str, edge: &Edge) -> f64 {
        if edge.node_a == a {
            edge.voltage_a
        } else {
            edge.voltage_b
        }
    }

    /// Number of periods the whole grid supports: the shortest demand series
    /// across all nodes (0 for an empty grid).
    pub fn period_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.demand.len())
            .min()
            .unwrap_or(0)
    }
}
