mod backend;
mod pipeline;

use backend::Backend;
use clap::Parser;
use pipeline::batch;
use pipeline::glossary::Glossary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "geoflag",
    version,
    about = "Analyze feature descriptions for geo-specific compliance requirements"
)]
struct Cli {
    /// Path to the input CSV file
    #[arg(long, default_value = "sample_data.csv")]
    input: PathBuf,

    /// Path to the output CSV file
    #[arg(long, default_value = "analysis_results.csv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geoflag=warn")),
        )
        .init();

    let cli = Cli::parse();

    let backend = Backend::from_env();
    println!("geoflag\n");
    println!("Using {}", backend.describe());
    if let Some(hint) = backend.startup_hint() {
        println!("{hint}");
    }
    println!();

    let glossary = Glossary::from_env();

    let summary = batch::run(&backend, &glossary, &cli.input, &cli.output).await?;
    println!(
        "{} analyzed, {} skipped ({} rows total)",
        summary.analyzed, summary.skipped, summary.total
    );

    Ok(())
}
