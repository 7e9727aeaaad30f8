use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;

use crate::model::{BalanceMode, ModelOptions, Strategy};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub model: ModelConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub nodes: PathBuf,
    /// Plant records; a `.json` extension selects the JSON schema, anything
    /// else is read as CSV.
    pub plants: PathBuf,
    pub edges: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub strategy: Strategy,
    pub mode: BalanceMode,
    pub periods: usize,
    pub demand_multiplier: f64,
    pub audit_costs: bool,
    /// Retry a strict run in relaxed mode when the solver reports
    /// infeasibility.
    pub fallback_to_relaxed: bool,
}

impl ModelConfig {
    pub fn to_options(&self) -> ModelOptions {
        ModelOptions {
            strategy: self.strategy,
            mode: self.mode,
            periods: self.periods,
            demand_multiplier: self.demand_multiplier,
            audit_costs: self.audit_costs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Which period the exported graph describes.
    pub period: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("GRID__").split("__"));
        Ok(figment.extract()?)
    }
}
