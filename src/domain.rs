use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Placeholder written for every field that could not be resolved. Rows keep
/// their fixed column count; nothing is ever emitted as empty-by-omission.
pub const UNKNOWN: &str = "NA";

/// Status value that gates controls and (in the default mode) files.
pub const RELEASED: &str = "released";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tsv,
    Csv,
}

impl OutputFormat {
    pub fn delimiter(self) -> char {
        match self {
            OutputFormat::Tsv => '\t',
            OutputFormat::Csv => ',',
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Where the per-file assembly column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AssemblySource {
    /// Always the experiment-level assembly.
    Experiment,
    /// bam files carry their own assembly; everything else falls back to the
    /// experiment-level value.
    FileThenExperiment,
}

/// Knobs that varied across iterations of this exporter, selected once at
/// startup instead of duplicating the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Emit only files whose status is "released".
    pub filter_released_only: bool,
    /// Resolve the treatments column (otherwise it stays at the sentinel).
    pub include_treatments: bool,
    pub assembly_source: AssemblySource,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            filter_released_only: true,
            include_treatments: true,
            assembly_source: AssemblySource::FileThenExperiment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiters() {
        assert_eq!(OutputFormat::Tsv.delimiter(), '\t');
        assert_eq!(OutputFormat::Csv.delimiter(), ',');
    }

    #[test]
    fn default_config_matches_latest_variant() {
        let config = ResolverConfig::default();
        assert!(config.filter_released_only);
        assert!(config.include_treatments);
        assert_eq!(config.assembly_source, AssemblySource::FileThenExperiment);
    }
}
