//! Multi-period DC optimal power flow with unit commitment.
//!
//! Given a grid topology (nodes with per-period demand, optionally hosting
//! generating plants, connected by lines), this crate builds per-period
//! decision variables, physical and operational constraints and a linear
//! cost objective, hands the model to a MILP solver and reads the solved
//! dispatch back into a graph-shaped result.
//!
//! Three fidelity levels are supported: `simple` (continuous dispatch only),
//! `binary` (per-unit commitment booleans) and `complex` (commitment plus
//! ramp limits and start/stop transition bounds).

pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod model;
pub mod telemetry;

pub use error::{DispatchError, Result};
pub use grid::{Edge, Grid, Node, Plant};
pub use model::{BalanceMode, DispatchProblem, ModelOptions, SolvedModel, Strategy};
