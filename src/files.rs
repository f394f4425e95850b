use serde_json::Value;
use tracing::warn;

use crate::domain::{AssemblySource, RELEASED, ResolverConfig, UNKNOWN};
use crate::json::{get_i64, get_str, get_u64, key, opt_i64, opt_str};

/// File-level columns for one entry of an experiment's files array.
#[derive(Debug, Clone)]
pub struct FileFields {
    pub status: String,
    pub format: String,
    pub output_type: String,
    pub size: u64,
    pub url: String,
    pub md5: String,
    pub lab: String,
    pub date_created: String,
    pub biological_replicate: i64,
    pub technical_replicate: i64,
    pub read_length: String,
    pub assembly: String,
}

/// Resolves one file entry. Returns `None` for malformed entries and for
/// files excluded by the released-only mode.
pub fn resolve_file(
    file: &Value,
    site_base: &str,
    experiment_accession: &str,
    experiment_assembly: &str,
    config: &ResolverConfig,
) -> Option<FileFields> {
    if !file.is_object() {
        warn!(
            "skipping non-object file entry for accession {}",
            experiment_accession
        );
        return None;
    }
    // only for diagnostics; files without one still resolve
    let file_accession = opt_str(file, &[key("accession")]).unwrap_or(UNKNOWN);

    let status = get_str(file, &[key("status")], UNKNOWN);
    if config.filter_released_only && status != RELEASED {
        return None;
    }

    let format = get_str(file, &[key("file_format")], UNKNOWN);
    let output_type = get_str(file, &[key("output_type")], UNKNOWN);
    let size = get_u64(file, &[key("file_size")], 0);
    let md5 = get_str(file, &[key("md5sum")], UNKNOWN);
    let date_created = get_str(file, &[key("date_created")], UNKNOWN);

    let url = match opt_str(file, &[key("href")]) {
        Some(href) => format!("{site_base}{href}"),
        None => {
            warn!(
                "href not found for file {} of accession {}",
                file_accession, experiment_accession
            );
            UNKNOWN.to_string()
        }
    };

    let lab = match opt_str(file, &[key("submitted_by"), key("lab")]) {
        Some(raw) => lab_name(raw),
        None => {
            warn!(
                "submitted_by.lab not found for file {} of accession {}",
                file_accession, experiment_accession
            );
            UNKNOWN.to_string()
        }
    };

    let biological_replicate = get_i64(file, &[key("replicate"), key("biological_replicate_number")], 0);
    let technical_replicate = get_i64(file, &[key("replicate"), key("technical_replicate_number")], 0);

    let read_length = if format == "fastq" {
        match opt_i64(file, &[key("replicate"), key("read_length")]) {
            Some(length) => {
                let units = opt_str(file, &[key("replicate"), key("read_length_units")]).unwrap_or("");
                format!("{length}{units}")
            }
            None => {
                warn!(
                    "read_length not found for fastq file {} of accession {}",
                    file_accession, experiment_accession
                );
                UNKNOWN.to_string()
            }
        }
    } else {
        UNKNOWN.to_string()
    };

    let assembly = match config.assembly_source {
        AssemblySource::Experiment => experiment_assembly.to_string(),
        AssemblySource::FileThenExperiment => {
            if format == "bam" {
                get_str(file, &[key("assembly")], experiment_assembly)
            } else {
                experiment_assembly.to_string()
            }
        }
    };

    Some(FileFields {
        status,
        format,
        output_type,
        size,
        url,
        md5,
        lab,
        date_created,
        biological_replicate,
        technical_replicate,
        read_length,
        assembly,
    })
}

/// Strips the `/labs/` prefix and any remaining path separators from the raw
/// submitting-lab path, e.g. "/labs/barbara-wold/" -> "barbara-wold".
pub fn lab_name(raw: &str) -> String {
    raw.replacen("/labs/", "", 1).replace('/', "")
}
