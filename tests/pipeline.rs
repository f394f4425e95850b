use std::collections::HashMap;
use std::fs;

use assert_matches::assert_matches;
use serde_json::{Value, json};

use encode_meta::allowlist::AllowList;
use encode_meta::dcc::DccClient;
use encode_meta::domain::{OutputFormat, ResolverConfig, UNKNOWN};
use encode_meta::error::MetaError;
use encode_meta::pipeline::Pipeline;
use encode_meta::row::{COLUMNS, header};
use encode_meta::writer::{DelimitedWriter, RowSink};

const SITE: &str = "https://www.encodeproject.org";

struct MockDcc {
    pages: HashMap<String, Value>,
}

impl MockDcc {
    fn with_fixtures() -> Self {
        let mut pages = HashMap::new();
        pages.insert(
            format!("{SITE}/experiments/ENCSR000AAA/?format=json"),
            fixture("experiment_detail.json"),
        );
        pages.insert(
            format!("{SITE}/experiments/ENCSR000CTL/?format=json"),
            fixture("control_detail.json"),
        );
        Self { pages }
    }
}

impl DccClient for MockDcc {
    fn fetch_json(&self, url: &str) -> Result<Value, MetaError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| MetaError::DccHttp(format!("no page at {url}")))
    }
}

#[derive(Default)]
struct VecSink {
    rows: Vec<Vec<String>>,
}

impl RowSink for VecSink {
    fn write_row(&mut self, fields: &[String]) -> Result<(), MetaError> {
        self.rows.push(fields.to_vec());
        Ok(())
    }
}

fn fixture(name: &str) -> Value {
    let raw = fs::read_to_string(format!("tests/fixtures/{name}")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

const CONTROL_DETAILS: &str =
    "@ENCSR000CTL;https://www.encodeproject.org/files/ENCFF000CTL/@@download/ENCFF000CTL.bam;6d2a4f8b0c9e3a17d5b6c8e9f0a1b2c3";

#[test]
fn end_to_end_fixture_rows() {
    let client = MockDcc::with_fixtures();
    let pipeline = Pipeline::new(
        &client,
        SITE.to_string(),
        AllowList::from_lines(["ENCSR000AAA"]).unwrap(),
        ResolverConfig::default(),
    );
    let mut sink = VecSink::default();

    let summary = pipeline
        .run(&fixture("search_results.json"), &mut sink)
        .unwrap();
    assert_eq!(summary.experiments, 1);
    assert_eq!(summary.experiments_skipped, 0);
    assert_eq!(summary.rows, 2);

    let expected_fastq: Vec<String> = [
        "ENCSR000AAA",
        "yes",
        "mm",
        "embryonic",
        "11.5day",
        "ChIP-seq",
        "small intestine",
        "POLR2A",
        "",
        "released",
        "POLR2A ChIP-seq on embryonic mouse small intestine",
        "released",
        "fastq",
        "reads",
        "877651",
        "https://www.encodeproject.org/files/ENCFF000AAA/@@download/ENCFF000AAA.fastq.gz",
        "91a45f705e8c8a2babfb976b3e5bd2f3",
        "mm9",
        "barbara-wold",
        "2013-06-14",
        "1",
        "1",
        "Single-ended",
        "101nt",
        CONTROL_DETAILS,
        "ENCSR000AAA_mm_embryonic_11.5day_small intestine_ChIP-seq_POLR2A_1_1",
    ]
    .iter()
    .map(|f| f.to_string())
    .collect();

    let expected_bam: Vec<String> = [
        "ENCSR000AAA",
        "yes",
        "mm",
        "embryonic",
        "11.5day",
        "ChIP-seq",
        "small intestine",
        "POLR2A",
        "",
        "released",
        "POLR2A ChIP-seq on embryonic mouse small intestine",
        "released",
        "bam",
        "alignments",
        "2877651",
        "https://www.encodeproject.org/files/ENCFF000BBB/@@download/ENCFF000BBB.bam",
        "3c85f4c38b7659ab8aa3a5bc1c4b9d17",
        "mm10",
        "ali-mortazavi",
        "2013-07-02",
        "1",
        "1",
        "Single-ended",
        "NA",
        CONTROL_DETAILS,
        "ENCSR000AAA_mm_embryonic_11.5day_small intestine_ChIP-seq_POLR2A_1_1",
    ]
    .iter()
    .map(|f| f.to_string())
    .collect();

    assert_eq!(sink.rows[0], expected_fastq);
    assert_eq!(sink.rows[1], expected_bam);
    for row in &sink.rows {
        assert_eq!(row.len(), COLUMNS.len());
    }
}

#[test]
fn absent_allow_list_tags_rows_unknown() {
    let client = MockDcc::with_fixtures();
    let pipeline = Pipeline::new(
        &client,
        SITE.to_string(),
        AllowList::none(),
        ResolverConfig::default(),
    );
    let mut sink = VecSink::default();

    pipeline
        .run(&fixture("search_results.json"), &mut sink)
        .unwrap();
    assert!(sink.rows.iter().all(|row| row[1] == "unknown"));
}

#[test]
fn all_statuses_mode_keeps_the_revoked_file() {
    let config = ResolverConfig {
        filter_released_only: false,
        ..ResolverConfig::default()
    };
    let client = MockDcc::with_fixtures();
    let pipeline = Pipeline::new(&client, SITE.to_string(), AllowList::none(), config);
    let mut sink = VecSink::default();

    let summary = pipeline
        .run(&fixture("search_results.json"), &mut sink)
        .unwrap();
    assert_eq!(summary.rows, 3);
    assert_eq!(sink.rows[2][11], "revoked");
}

#[test]
fn notification_mismatch_is_fatal() {
    let client = MockDcc::with_fixtures();
    let pipeline = Pipeline::new(
        &client,
        SITE.to_string(),
        AllowList::none(),
        ResolverConfig::default(),
    );
    let mut sink = VecSink::default();

    let search = json!({"notification": "Failure", "@graph": []});
    let err = pipeline.run(&search, &mut sink).unwrap_err();
    assert_matches!(err, MetaError::UpstreamProtocol(message) if message == "Failure");
    assert!(sink.rows.is_empty());
}

#[test]
fn missing_accession_skips_only_that_experiment() {
    let client = MockDcc::with_fixtures();
    let pipeline = Pipeline::new(
        &client,
        SITE.to_string(),
        AllowList::none(),
        ResolverConfig::default(),
    );
    let mut sink = VecSink::default();

    let mut search = fixture("search_results.json");
    let graph = search["@graph"].as_array_mut().unwrap();
    graph.insert(0, json!({"@id": "/experiments/ENCSR000BAD/"}));

    let summary = pipeline.run(&search, &mut sink).unwrap();
    assert_eq!(summary.experiments_skipped, 1);
    assert_eq!(summary.experiments, 1);
    assert_eq!(summary.rows, 2);
}

#[test]
fn missing_files_array_contributes_no_rows() {
    let mut pages = HashMap::new();
    pages.insert(
        format!("{SITE}/experiments/ENCSR000AAA/?format=json"),
        json!({"run_type": "Single-ended", "possible_controls": []}),
    );
    let client = MockDcc { pages };
    let pipeline = Pipeline::new(
        &client,
        SITE.to_string(),
        AllowList::none(),
        ResolverConfig::default(),
    );
    let mut sink = VecSink::default();

    let summary = pipeline
        .run(&fixture("search_results.json"), &mut sink)
        .unwrap();
    assert_eq!(summary.experiments_skipped, 1);
    assert_eq!(summary.rows, 0);
    assert!(sink.rows.is_empty());
}

#[test]
fn unreachable_detail_page_skips_the_experiment() {
    let client = MockDcc {
        pages: HashMap::new(),
    };
    let pipeline = Pipeline::new(
        &client,
        SITE.to_string(),
        AllowList::none(),
        ResolverConfig::default(),
    );
    let mut sink = VecSink::default();

    let summary = pipeline
        .run(&fixture("search_results.json"), &mut sink)
        .unwrap();
    assert_eq!(summary.experiments_skipped, 1);
    assert!(sink.rows.is_empty());
}

#[test]
fn broken_biosample_chain_still_emits_rows() {
    let client = MockDcc::with_fixtures();
    let pipeline = Pipeline::new(
        &client,
        SITE.to_string(),
        AllowList::none(),
        ResolverConfig::default(),
    );
    let mut sink = VecSink::default();

    let mut search = fixture("search_results.json");
    search["@graph"][0]
        .as_object_mut()
        .unwrap()
        .remove("replicates");

    let summary = pipeline.run(&search, &mut sink).unwrap();
    assert_eq!(summary.rows, 2);
    // organism, lifeStage, age, treatments all degrade together
    for row in &sink.rows {
        assert_eq!(row[2], UNKNOWN);
        assert_eq!(row[3], UNKNOWN);
        assert_eq!(row[4], UNKNOWN);
        assert_eq!(row[8], UNKNOWN);
        assert_eq!(row.len(), COLUMNS.len());
    }
}

#[test]
fn delimited_output_file_round_trip() {
    let client = MockDcc::with_fixtures();
    let pipeline = Pipeline::new(
        &client,
        SITE.to_string(),
        AllowList::none(),
        ResolverConfig::default(),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metadata.tsv");
    let mut writer = DelimitedWriter::create(&path, OutputFormat::Tsv).unwrap();
    writer.write_row(&header()).unwrap();
    pipeline
        .run(&fixture("search_results.json"), &mut writer)
        .unwrap();
    writer.finish().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], COLUMNS.join("\t"));
    assert!(lines[1].starts_with("ENCSR000AAA\tunknown\tmm\tembryonic\t11.5day\t"));
    assert_eq!(lines[1].split('\t').count(), COLUMNS.len());
}
