//! Catalog Enhancer - command line entry point
//!
//! Looks up (or reads) a single catalog record, translates it and prints the
//! resulting instance as a JSON response envelope.

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_enhancer::{
    config::AppConfig,
    marc::MarcRecord,
    models::InstanceRecord,
    services::{output::Response, Services},
    AppError, AppResult,
};

#[derive(Debug, Parser)]
#[command(version, about = "Enhance a catalog record with holdings and authority data")]
#[command(group(ArgGroup::new("input").required(true).args(["identifier", "file"])))]
struct Args {
    /// Identifier to look up in the catalog
    #[arg(long)]
    identifier: Option<String>,

    /// Identifier type; only "oclc" is supported
    #[arg(long = "type", default_value = "oclc")]
    id_type: String,

    /// Translate a local MARC file (ISO 2709 or MARCXML) instead
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = AppConfig::load()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("catalog_enhancer={}", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting catalog enhancer v{}", env!("CARGO_PKG_VERSION"));

    let services = Services::new(&config)?;

    let output = match run(&services, &args).await {
        Ok(instance) => serde_json::to_string_pretty(&Response::ok(instance))?,
        Err(e) => {
            tracing::error!("Enhancement failed: {}", e);
            serde_json::to_string_pretty(&Response::error(&e))?
        }
    };
    println!("{}", output);

    Ok(())
}

async fn run(services: &Services, args: &Args) -> AppResult<InstanceRecord> {
    if let Some(path) = &args.file {
        let record = read_record(path).await?;
        return Ok(services.enhancer.translate_record(&record).await);
    }

    let identifier = args
        .identifier
        .as_deref()
        .ok_or_else(|| AppError::InvalidRequest("Query must include an identifier and type".to_string()))?;
    services.enhancer.fetch_data(identifier, &args.id_type).await
}

/// MARCXML when the file starts with `<`, ISO 2709 otherwise
async fn read_record(path: &Path) -> AppResult<MarcRecord> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Cannot read {}: {}", path.display(), e)))?;

    if data.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<') {
        let xml = String::from_utf8_lossy(&data);
        MarcRecord::from_marcxml(&xml)
    } else {
        MarcRecord::from_bytes(&data)
            .ok_or_else(|| AppError::Catalog(format!("{} is not a valid MARC record", path.display())))
    }
}
