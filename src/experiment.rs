use serde_json::Value;
use tracing::warn;

use crate::domain::{ResolverConfig, UNKNOWN};
use crate::error::MetaError;
use crate::json::{Lookup, get_str, idx, key, lookup, opt_array, opt_str, require_str};

/// Experiment-level columns, resolved from one search-result entry.
///
/// Everything except the accession and the detail path degrades to the
/// sentinel; those two abort the experiment when absent.
#[derive(Debug, Clone)]
pub struct ExperimentFields {
    pub accession: String,
    pub detail_path: String,
    pub assay: String,
    pub tissue: String,
    pub target: String,
    pub status: String,
    pub description: String,
    pub organism_code: String,
    pub life_stage: String,
    pub age: String,
    pub treatments: String,
}

pub fn resolve_experiment(
    entry: &Value,
    config: &ResolverConfig,
) -> Result<ExperimentFields, MetaError> {
    let accession = require_str(entry, &[key("accession")])?.to_string();
    let detail_path = require_str(entry, &[key("@id")])?.to_string();

    let assay = get_str(entry, &[key("assay_term_name")], UNKNOWN);
    let tissue = get_str(entry, &[key("biosample_term_name")], UNKNOWN);
    let status = get_str(entry, &[key("status")], UNKNOWN);
    let description = get_str(entry, &[key("description")], UNKNOWN);

    // Search results carry the target label under the literal key
    // "target.label"; embedded detail objects nest it instead.
    let target = opt_str(entry, &[key("target.label")])
        .or_else(|| opt_str(entry, &[key("target"), key("label")]))
        .unwrap_or(UNKNOWN)
        .to_string();

    let biosample_path = [key("replicates"), idx(0), key("library"), key("biosample")];
    let (organism_code, life_stage, age, treatments) = match lookup(entry, &biosample_path) {
        Lookup::Found(biosample) => resolve_biosample(biosample, &accession, config),
        Lookup::Missing | Lookup::WrongType => {
            warn!(
                "replicates[0].library.biosample not found for accession {}",
                accession
            );
            (
                UNKNOWN.to_string(),
                UNKNOWN.to_string(),
                UNKNOWN.to_string(),
                UNKNOWN.to_string(),
            )
        }
    };

    Ok(ExperimentFields {
        accession,
        detail_path,
        assay,
        tissue,
        target,
        status,
        description,
        organism_code,
        life_stage,
        age,
        treatments,
    })
}

fn resolve_biosample(
    biosample: &Value,
    accession: &str,
    config: &ResolverConfig,
) -> (String, String, String, String) {
    let organism_code = match opt_str(biosample, &[key("organism"), key("scientific_name")]) {
        Some(name) => match organism_code(name) {
            Some(code) => code,
            None => {
                warn!(
                    "scientific_name {:?} has fewer than two tokens for accession {}",
                    name, accession
                );
                UNKNOWN.to_string()
            }
        },
        None => {
            warn!("organism.scientific_name not found for accession {}", accession);
            UNKNOWN.to_string()
        }
    };

    let life_stage = get_str(biosample, &[key("life_stage")], UNKNOWN);

    let age = match opt_str(biosample, &[key("age")]) {
        Some(value) => {
            let units = opt_str(biosample, &[key("age_units")]).unwrap_or("");
            format!("{value}{units}")
        }
        None => {
            warn!("age not found for accession {}", accession);
            UNKNOWN.to_string()
        }
    };

    let treatments = if config.include_treatments {
        match opt_array(biosample, &[key("treatments")]) {
            Some(items) => items
                .iter()
                .filter_map(|item| opt_str(item, &[key("treatment_term_name")]))
                .collect::<Vec<_>>()
                .join(";"),
            // a biosample without a treatments list simply has none
            None => String::new(),
        }
    } else {
        UNKNOWN.to_string()
    };

    (organism_code, life_stage, age, treatments)
}

/// "Homo sapiens" -> "hs", "Mus musculus" -> "mm". Needs at least two
/// whitespace-separated tokens.
pub fn organism_code(scientific_name: &str) -> Option<String> {
    let mut tokens = scientific_name.split_whitespace();
    let genus = tokens.next()?.chars().next()?;
    let species = tokens.next()?.chars().next()?;
    Some(
        genus
            .to_lowercase()
            .chain(species.to_lowercase())
            .collect(),
    )
}
