use serde_json::Value;
use tracing::warn;

use crate::dcc::DccClient;
use crate::domain::{RELEASED, UNKNOWN};
use crate::json::{get_str, key, opt_array, opt_str};

/// One released file of a released control experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFileEntry {
    pub control_accession: String,
    pub url: String,
    pub md5: String,
}

/// Resolves the controlDetails column for one experiment.
///
/// Each released control's detail page is fetched and its released files are
/// collected; a transport failure on one control skips that control only.
/// The composite keeps the historical `@accession;url;md5` groups glued
/// together with no separator between groups.
pub fn resolve_controls(
    client: &dyn DccClient,
    site_base: &str,
    experiment_accession: &str,
    detail: &Value,
) -> String {
    let Some(controls) = opt_array(detail, &[key("possible_controls")]) else {
        warn!(
            "possible_controls not found for accession {}",
            experiment_accession
        );
        return UNKNOWN.to_string();
    };

    let mut entries = Vec::new();
    for control in controls {
        let status = get_str(control, &[key("status")], UNKNOWN);
        if status != RELEASED {
            continue;
        }
        let Some(control_accession) = opt_str(control, &[key("accession")]) else {
            warn!(
                "control without accession listed for accession {}",
                experiment_accession
            );
            continue;
        };
        let Some(control_path) = opt_str(control, &[key("@id")]) else {
            warn!(
                "control {} has no @id for accession {}",
                control_accession, experiment_accession
            );
            continue;
        };

        let url = format!("{site_base}{control_path}?format=json");
        let control_detail = match client.fetch_json(&url) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "error fetching page {} for accession {}: {}",
                    url, experiment_accession, err
                );
                continue;
            }
        };
        collect_control_files(&control_detail, control_accession, site_base, &mut entries);
    }

    format_control_details(&entries)
}

fn collect_control_files(
    control_detail: &Value,
    control_accession: &str,
    site_base: &str,
    entries: &mut Vec<ControlFileEntry>,
) {
    let Some(files) = opt_array(control_detail, &[key("files")]) else {
        return;
    };
    for file in files {
        if get_str(file, &[key("status")], UNKNOWN) != RELEASED {
            continue;
        }
        let (Some(href), Some(md5)) = (
            opt_str(file, &[key("href")]),
            opt_str(file, &[key("md5sum")]),
        ) else {
            continue;
        };
        entries.push(ControlFileEntry {
            control_accession: control_accession.to_string(),
            url: format!("{site_base}{href}"),
            md5: md5.to_string(),
        });
    }
}

pub fn format_control_details(entries: &[ControlFileEntry]) -> String {
    if entries.is_empty() {
        return UNKNOWN.to_string();
    }
    let mut out = String::new();
    for entry in entries {
        out.push('@');
        out.push_str(&entry.control_accession);
        out.push(';');
        out.push_str(&entry.url);
        out.push(';');
        out.push_str(&entry.md5);
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::MetaError;

    struct CannedClient(Value);

    impl DccClient for CannedClient {
        fn fetch_json(&self, _url: &str) -> Result<Value, MetaError> {
            Ok(self.0.clone())
        }
    }

    struct FailingClient;

    impl DccClient for FailingClient {
        fn fetch_json(&self, url: &str) -> Result<Value, MetaError> {
            Err(MetaError::DccHttp(format!("unreachable: {url}")))
        }
    }

    fn detail_with_one_control() -> Value {
        json!({
            "possible_controls": [{
                "accession": "ENCSR000CTL",
                "@id": "/experiments/ENCSR000CTL/",
                "status": "released"
            }]
        })
    }

    #[test]
    fn aggregates_released_control_files() {
        let client = CannedClient(json!({
            "files": [
                {"status": "released", "href": "/files/f1/a.bam", "md5sum": "abc"},
                {"status": "revoked", "href": "/files/f2/b.bam", "md5sum": "def"}
            ]
        }));
        let details = resolve_controls(
            &client,
            "https://host",
            "ENCSR000AAA",
            &detail_with_one_control(),
        );
        assert_eq!(details, "@ENCSR000CTL;https://host/files/f1/a.bam;abc");
    }

    #[test]
    fn control_with_no_released_files_stays_unknown() {
        let client = CannedClient(json!({"files": []}));
        let details = resolve_controls(
            &client,
            "https://host",
            "ENCSR000AAA",
            &detail_with_one_control(),
        );
        assert_eq!(details, UNKNOWN);
    }

    #[test]
    fn unreleased_controls_are_skipped() {
        let client = CannedClient(json!({
            "files": [{"status": "released", "href": "/f", "md5sum": "x"}]
        }));
        let detail = json!({
            "possible_controls": [{
                "accession": "ENCSR000CTL",
                "@id": "/experiments/ENCSR000CTL/",
                "status": "archived"
            }]
        });
        let details = resolve_controls(&client, "https://host", "ENCSR000AAA", &detail);
        assert_eq!(details, UNKNOWN);
    }

    #[test]
    fn transport_failure_skips_that_control() {
        let details = resolve_controls(
            &FailingClient,
            "https://host",
            "ENCSR000AAA",
            &detail_with_one_control(),
        );
        assert_eq!(details, UNKNOWN);
    }

    #[test]
    fn missing_possible_controls_degrades() {
        let client = CannedClient(json!({}));
        let details = resolve_controls(&client, "https://host", "ENCSR000AAA", &json!({}));
        assert_eq!(details, UNKNOWN);
    }

    #[test]
    fn groups_concatenate_without_separator() {
        let entries = vec![
            ControlFileEntry {
                control_accession: "ENCSR000CTL".to_string(),
                url: "https://host/f1".to_string(),
                md5: "abc".to_string(),
            },
            ControlFileEntry {
                control_accession: "ENCSR000CTL".to_string(),
                url: "https://host/f2".to_string(),
                md5: "def".to_string(),
            },
        ];
        assert_eq!(
            format_control_details(&entries),
            "@ENCSR000CTL;https://host/f1;abc@ENCSR000CTL;https://host/f2;def"
        );
    }
}
