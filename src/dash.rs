use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
pub mod fetcher;
mod io_common;
pub mod normalizer;
pub mod render;

use crate::dash::config_reader::*;
use crate::dash::fetcher::{fetch_all, HttpRetriever, Retrieve, RetrieveError};
use crate::dash::normalizer::normalize_all;
use crate::dash::render::{build_dashboard, error_notice, Dashboard};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashError {
    #[snafu(display("Source unavailable: {address}: {source}"))]
    SourceUnavailable {
        address: String,
        source: RetrieveError,
    },
    #[snafu(display("Malformed dataset {source_name}: {reason}"))]
    MalformedDataset { source_name: String, reason: String },
    #[snafu(display("Cannot create the HTTP client: {source}"))]
    HttpClient { source: RetrieveError },
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the dashboard and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

/// Retrieves the sources, validates them and assembles the dashboard.
///
/// Any retrieval or validation failure aborts the whole run: there is no
/// partial dashboard.
pub async fn run_dashboard<R: Retrieve + ?Sized>(
    retriever: &R,
    config: &DashboardConfig,
    root: &Path,
    query: &str,
) -> DashResult<Dashboard> {
    let requests = resolve_sources(config, root)?;
    let addresses: Vec<String> = requests.iter().map(|r| r.address.clone()).collect();
    let payloads = fetch_all(retriever, &addresses).await?;

    let datasets = normalize_all(requests.iter().map(|r| r.kind).zip(payloads).collect())?;
    Ok(build_dashboard(
        &datasets,
        &config.map,
        config.ranking_size,
        query,
    ))
}

fn load_config(args: &Args) -> DashResult<(DashboardConfig, PathBuf)> {
    let (mut config, root) = match &args.config {
        Some(path) => {
            let root = Path::new(path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (read_config(path)?, root)
        }
        None => (DashboardConfig::default(), PathBuf::from(".")),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = Some(base_url.clone());
    }
    info!("config: {:?}", config);
    Ok((config, root))
}

async fn build_from_args(args: &Args) -> DashResult<Dashboard> {
    let (config, root) = load_config(args)?;
    let retriever = HttpRetriever::new().context(HttpClientSnafu {})?;
    let query = args.query.clone().unwrap_or_default();
    run_dashboard(&retriever, &config, &root, &query).await
}

/// Writes to the given file, or to the standard output.
pub fn write_output(out: Option<&str>, contents: &str) -> DashResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", contents);
            Ok(())
        }
        Some(path) => {
            info!("Writing dashboard to {}", path);
            fs::write(path, contents).context(WritingOutputSnafu { path })
        }
    }
}

pub fn read_reference(path: &str) -> DashResult<String> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})
}

/// Compares the rendered dashboard with a reference one.
pub fn check_reference(path: &str, rendered: &str) -> DashResult<()> {
    let reference = read_reference(path)?;
    if reference != rendered {
        warn!("Found differences with the reference {}", path);
        print_diff(reference.as_str(), rendered, "\n");
        return ReferenceMismatchSnafu { path }.fail();
    }
    debug!("check_reference: identical to {}", path);
    Ok(())
}

/// Runs the program. On failure, the error notice replaces the dashboard.
pub async fn run(args: &Args) -> DashResult<()> {
    let out = args.out.as_deref();
    let rendered = match build_from_args(args).await {
        Ok(dashboard) => serde_json::to_string_pretty(&dashboard).context(ParsingJsonSnafu {})?,
        Err(e) => {
            warn!("Cannot build the dashboard: {}", e);
            write_output(out, &error_notice(&e).to_string())?;
            return Err(e);
        }
    };
    write_output(out, &rendered)?;
    if let Some(reference) = &args.reference {
        check_reference(reference, &rendered)?;
    }
    Ok(())
}
