//! Seeded random snapshots for exercising the evaluator.
//!
//! Every generated snapshot satisfies the construction invariants:
//! allocation never exceeds max, and nothing is negative. Whether it is
//! safe is left to chance.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BankerError, BankerResult};
use crate::types::Snapshot;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of processes (`n`)
    #[serde(default = "default_processes")]
    pub processes: usize,
    /// Number of resource types (`m`)
    #[serde(default = "default_resources")]
    pub resources: usize,
    /// Lower bound for each Available entry
    #[serde(default = "default_min_available")]
    pub min_available: u32,
    /// Upper bound for each Available entry
    #[serde(default = "default_max_available")]
    pub max_available: u32,
    /// Upper bound for each Max entry
    #[serde(default = "default_max_demand")]
    pub max_demand: u32,
    /// Fixed seed; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            processes: default_processes(),
            resources: default_resources(),
            min_available: default_min_available(),
            max_available: default_max_available(),
            max_demand: default_max_demand(),
            seed: None,
        }
    }
}

fn default_processes() -> usize {
    20
}

fn default_resources() -> usize {
    30
}

fn default_min_available() -> u32 {
    2
}

fn default_max_available() -> u32 {
    10
}

fn default_max_demand() -> u32 {
    7
}

pub struct SnapshotGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SnapshotGenerator {
    pub fn new(config: GeneratorConfig) -> BankerResult<Self> {
        if config.min_available > config.max_available {
            return Err(BankerError::InvalidConfig(format!(
                "min_available ({}) exceeds max_available ({})",
                config.min_available, config.max_available
            )));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draw the next snapshot.
    ///
    /// Available is uniform in `min_available..=max_available`, each Max
    /// entry in `0..=max_demand`, each Allocation entry in `0..=Max`.
    pub fn generate(&mut self) -> Snapshot {
        let GeneratorConfig {
            processes,
            resources,
            min_available,
            max_available,
            max_demand,
            ..
        } = self.config;

        let available = (0..resources)
            .map(|_| i64::from(self.rng.gen_range(min_available..=max_available)))
            .collect();
        let max: Vec<Vec<i64>> = (0..processes)
            .map(|_| {
                (0..resources)
                    .map(|_| i64::from(self.rng.gen_range(0..=max_demand)))
                    .collect()
            })
            .collect();
        let allocation = max
            .iter()
            .map(|row| row.iter().map(|&cap| self.rng.gen_range(0..=cap)).collect())
            .collect();

        debug!(processes, resources, "Generated snapshot");
        Snapshot::new(available, max, allocation)
    }
}

/// One-shot convenience wrapper.
pub fn generate(config: &GeneratorConfig) -> BankerResult<Snapshot> {
    Ok(SnapshotGenerator::new(config.clone())?.generate())
}
