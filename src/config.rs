// Run configuration: explicit, no hidden defaults, no ambient globals.

use anyhow::{Context, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Directory paths (injected; nothing hard-coded)
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,

    // MinHash / LSH parameters
    #[serde(default = "default_num_perm")]
    pub num_perm: usize,
    #[serde(default = "default_num_bands")]
    pub num_bands: usize,
    #[serde(default = "default_shingle_k")]
    pub shingle_k: usize,

    // Verification threshold. Required: there is no sensible universal
    // default, observed practical values run 0.5-0.95.
    pub similarity_threshold: f32,

    // Read only the first N lines of each file (throughput knob for
    // large corpora). None reads whole files.
    #[serde(default)]
    pub max_preview_lines: Option<usize>,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub debug: bool,
}

fn default_num_perm() -> usize {
    100 // signature length
}

fn default_num_bands() -> usize {
    50 // 2 rows per band at the default num_perm
}

fn default_shingle_k() -> usize {
    5 // character shingle length
}

fn default_seed() -> u64 {
    42
}

impl Config {
    /// Rows per LSH band. Integer division: when `num_bands` does not
    /// divide `num_perm` exactly, the trailing `num_perm % num_bands`
    /// signature positions are not banded (they still count toward
    /// similarity verification).
    pub fn rows_per_band(&self) -> usize {
        self.num_perm / self.num_bands
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.num_perm == 0 {
            anyhow::bail!("num_perm must be at least 1");
        }
        if self.num_bands == 0 {
            anyhow::bail!("num_bands must be at least 1");
        }
        if self.num_bands > self.num_perm {
            anyhow::bail!(
                "num_bands ({}) cannot exceed num_perm ({})",
                self.num_bands,
                self.num_perm
            );
        }
        if self.shingle_k == 0 {
            anyhow::bail!("shingle_k must be at least 1");
        }
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold < 1.0) {
            anyhow::bail!(
                "similarity_threshold must lie in (0, 1), got {}",
                self.similarity_threshold
            );
        }
        Ok(())
    }
}

pub fn read_config(config_path: &PathBuf) -> Result<Config, Error> {
    let file = File::open(config_path)
        .with_context(|| format!("failed to open config file {:?}", config_path))?;
    let config: Config = serde_yaml::from_reader(file)
        .with_context(|| format!("failed to parse config file {:?}", config_path))?;
    config.validate()?;
    Ok(config)
}
