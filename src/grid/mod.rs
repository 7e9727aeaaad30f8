//! Grid topology: node/plant/edge records and the queries the model builder
//! runs against them.

pub mod loader;
pub mod model;

pub use loader::{build_grid, parse_edges, parse_nodes, parse_plants, parse_plants_json};
pub use loader::{EdgeRecord, NodeRecord, PlantRecord};
pub use model::{Edge, Grid, Node, Plant};
