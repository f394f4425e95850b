use serde_json::Value;
use tracing::{info, warn};

use crate::allowlist::AllowList;
use crate::control::resolve_controls;
use crate::dcc::DccClient;
use crate::domain::{ResolverConfig, UNKNOWN};
use crate::error::MetaError;
use crate::experiment::resolve_experiment;
use crate::files::resolve_file;
use crate::json::{get_str, key, opt_str, require_array};
use crate::row::assemble;
use crate::writer::RowSink;

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub experiments: usize,
    pub experiments_skipped: usize,
    pub rows: usize,
}

/// Sequences resolve -> classify -> fetch detail -> controls -> files for
/// every experiment of a search result, one at a time.
///
/// A failure inside one experiment (missing accession, unreachable detail
/// page, missing files array) logs and moves on to the next; only sink
/// failures and the up-front notification check stop the run.
pub struct Pipeline<'a, C: DccClient> {
    client: &'a C,
    site_base: String,
    allow_list: AllowList,
    config: ResolverConfig,
}

impl<'a, C: DccClient> Pipeline<'a, C> {
    pub fn new(
        client: &'a C,
        site_base: String,
        allow_list: AllowList,
        config: ResolverConfig,
    ) -> Self {
        Self {
            client,
            site_base,
            allow_list,
            config,
        }
    }

    pub fn run(&self, search: &Value, sink: &mut dyn RowSink) -> Result<RunSummary, MetaError> {
        let notification = get_str(search, &[key("notification")], "<absent>");
        if notification != "Success" {
            return Err(MetaError::UpstreamProtocol(notification));
        }

        let graph = require_array(search, &[key("@graph")])?;
        info!("search returned {} experiments", graph.len());

        let mut summary = RunSummary::default();
        for entry in graph {
            match self.process_experiment(entry, sink) {
                Ok(rows) => {
                    summary.experiments += 1;
                    summary.rows += rows;
                }
                // sink failures poison the whole run
                Err(err @ MetaError::OutputIo(_)) => return Err(err),
                Err(err) => {
                    let accession = opt_str(entry, &[key("accession")]).unwrap_or(UNKNOWN);
                    warn!("skipping experiment {}: {}", accession, err);
                    summary.experiments_skipped += 1;
                }
            }
        }
        info!(
            "wrote {} rows from {} experiments ({} skipped)",
            summary.rows, summary.experiments, summary.experiments_skipped
        );
        Ok(summary)
    }

    fn process_experiment(&self, entry: &Value, sink: &mut dyn RowSink) -> Result<usize, MetaError> {
        let experiment = resolve_experiment(entry, &self.config)?;
        let classification = self.allow_list.classify(&experiment.accession);

        let detail_url = format!("{}{}?format=json", self.site_base, experiment.detail_path);
        let detail = self.client.fetch_json(&detail_url)?;

        let run_type = match opt_str(&detail, &[key("run_type")]) {
            Some(value) => value.to_string(),
            None => {
                warn!("run_type not found for accession {}", experiment.accession);
                UNKNOWN.to_string()
            }
        };
        let experiment_assembly = get_str(&detail, &[key("assembly")], UNKNOWN);

        let control_details = resolve_controls(
            self.client,
            &self.site_base,
            &experiment.accession,
            &detail,
        );

        let files = require_array(&detail, &[key("files")]).inspect_err(|_| {
            warn!("no files found for accession {}", experiment.accession);
        })?;

        let mut rows = 0usize;
        for file in files {
            let Some(fields) = resolve_file(
                file,
                &self.site_base,
                &experiment.accession,
                &experiment_assembly,
                &self.config,
            ) else {
                continue;
            };
            let row = assemble(
                &experiment,
                classification,
                &run_type,
                &control_details,
                &fields,
            );
            sink.write_row(&row)?;
            rows += 1;
        }
        Ok(rows)
    }
}

/// Appends the fixed query suffix the DCC search endpoint expects.
pub fn search_url(query_url: &str) -> String {
    format!("{query_url}&format=json&limit=all")
}
