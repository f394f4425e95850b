use crate::allowlist::Classification;
use crate::experiment::ExperimentFields;
use crate::files::FileFields;

/// Canonical column layout. Every emitted row has exactly these fields, in
/// this order, however many lookups degraded to the sentinel.
pub const COLUMNS: [&str; 26] = [
    "accession",
    "inAllowList",
    "organism",
    "lifeStage",
    "age",
    "assay",
    "tissue",
    "target",
    "treatments",
    "experimentStatus",
    "description",
    "fileStatus",
    "fileFormat",
    "outputType",
    "fileSize",
    "URL",
    "md5sum",
    "assembly",
    "lab",
    "dateCreated",
    "biologicalReplicate",
    "technicalReplicate",
    "runType",
    "readLength",
    "controlDetails",
    "friendlyName",
];

pub fn header() -> Vec<String> {
    COLUMNS.iter().map(|name| name.to_string()).collect()
}

/// Merges experiment-, control-, and file-level fields into one output row.
pub fn assemble(
    experiment: &ExperimentFields,
    classification: Classification,
    run_type: &str,
    control_details: &str,
    file: &FileFields,
) -> Vec<String> {
    vec![
        experiment.accession.clone(),
        classification.as_str().to_string(),
        experiment.organism_code.clone(),
        experiment.life_stage.clone(),
        experiment.age.clone(),
        experiment.assay.clone(),
        experiment.tissue.clone(),
        experiment.target.clone(),
        experiment.treatments.clone(),
        experiment.status.clone(),
        experiment.description.clone(),
        file.status.clone(),
        file.format.clone(),
        file.output_type.clone(),
        file.size.to_string(),
        file.url.clone(),
        file.md5.clone(),
        file.assembly.clone(),
        file.lab.clone(),
        file.date_created.clone(),
        file.biological_replicate.to_string(),
        file.technical_replicate.to_string(),
        run_type.to_string(),
        file.read_length.clone(),
        control_details.to_string(),
        friendly_name(experiment, file),
    ]
}

/// Human-readable composite identifier for a file record.
pub fn friendly_name(experiment: &ExperimentFields, file: &FileFields) -> String {
    [
        experiment.accession.as_str(),
        experiment.organism_code.as_str(),
        experiment.life_stage.as_str(),
        experiment.age.as_str(),
        experiment.tissue.as_str(),
        experiment.assay.as_str(),
        experiment.target.as_str(),
        &file.biological_replicate.to_string(),
        &file.technical_replicate.to_string(),
    ]
    .join("_")
}
