use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use encode_meta::allowlist::AllowList;
use encode_meta::dcc::{DccClient, DccHttpClient, load_credentials, site_base};
use encode_meta::domain::{AssemblySource, OutputFormat, ResolverConfig};
use encode_meta::error::MetaError;
use encode_meta::pipeline::{Pipeline, search_url};
use encode_meta::row::header;
use encode_meta::writer::{DelimitedWriter, RowSink};

#[derive(Parser)]
#[command(name = "encode-meta")]
#[command(about = "Flatten ENCODE DCC experiment/file metadata into a tsv or csv table")]
#[command(version, author)]
struct Cli {
    /// Search URL with query strings built in, e.g.
    /// https://www.encodeproject.org/search/?type=Experiment&assay_term_name=ChIP-seq
    query_url: String,

    /// Output file path
    output: PathBuf,

    /// Output table format
    format: OutputFormat,

    /// File with one experiment accession per line; rows are tagged
    /// yes/no by membership (unknown when omitted)
    #[arg(long)]
    allow_list: Option<PathBuf>,

    /// File holding a single token used as the HTTP Basic auth payload
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Emit every file regardless of status instead of released only
    #[arg(long)]
    all_file_statuses: bool,

    /// Leave the treatments column unresolved
    #[arg(long)]
    no_treatments: bool,

    /// Where the assembly column comes from
    #[arg(long, value_enum, default_value_t = AssemblySource::FileThenExperiment)]
    assembly_source: AssemblySource,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(meta) = report.downcast_ref::<MetaError>() {
            return ExitCode::from(map_exit_code(meta));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MetaError) -> u8 {
    match error {
        MetaError::AllowListRead(_)
        | MetaError::MalformedAllowList { .. }
        | MetaError::CredentialsRead(_)
        | MetaError::MalformedCredentials
        | MetaError::InvalidQueryUrl(_) => 2,
        MetaError::DccHttp(_) | MetaError::DccStatus { .. } | MetaError::UpstreamProtocol(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let allow_list = match &cli.allow_list {
        Some(path) => AllowList::load(path).into_diagnostic()?,
        None => AllowList::none(),
    };
    let credentials = cli
        .credentials
        .as_deref()
        .map(load_credentials)
        .transpose()
        .into_diagnostic()?;

    let config = ResolverConfig {
        filter_released_only: !cli.all_file_statuses,
        include_treatments: !cli.no_treatments,
        assembly_source: cli.assembly_source,
    };

    let base = site_base(&cli.query_url).into_diagnostic()?;
    let client = DccHttpClient::new(credentials.as_deref()).into_diagnostic()?;

    let mut writer = DelimitedWriter::create(&cli.output, cli.format).into_diagnostic()?;
    writer.write_row(&header()).into_diagnostic()?;

    let search = client
        .fetch_json(&search_url(&cli.query_url))
        .into_diagnostic()?;

    let pipeline = Pipeline::new(&client, base, allow_list, config);
    pipeline.run(&search, &mut writer).into_diagnostic()?;
    writer.finish().into_diagnostic()?;

    Ok(())
}
