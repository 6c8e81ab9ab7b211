//! Arcadgraph CLI - Convert an ARCAD IBM i extract into graph import tables
//!
//! # Main Commands
//!
//! ```bash
//! arcadgraph convert                       # Fetch the reference extract, write csv_neo4j/
//! arcadgraph convert --input-dir ./arcad   # Use local files instead
//! arcadgraph report --json                 # Print the statistics report only
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! arcadgraph inspect IBMi_RefArcaddesXREF.xlsx   # Show how a single file decodes
//! ```

use clap::{Args, Parser, Subcommand};
use arcadgraph::{
    convert, load_file, logs, write_outputs, Config, InputFormat, InputSource, PipelineOptions,
};
use std::path::{Path, PathBuf};

/// Report lines shown after a conversion.
const REPORT_PREVIEW_LINES: usize = 30;

#[derive(Parser)]
#[command(name = "arcadgraph")]
#[command(about = "Convert an ARCAD IBM i inventory into Neo4j import tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full conversion: load, classify, write tables and report
    Convert {
        #[command(flatten)]
        input: InputArgs,

        /// Output directory (default: csv_neo4j)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Don't echo progress lines
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run the pipeline and print the statistics report without writing files
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode one dataset file and describe it
    Inspect {
        /// Input file (xlsx or csv)
        file: PathBuf,

        /// Number of preview rows
        #[arg(long, default_value = "5")]
        rows: usize,
    },
}

/// Where to read the datasets from; overrides the environment.
#[derive(Args)]
struct InputArgs {
    /// Fetch from a remote archive (default archive if no URL given)
    #[arg(long, num_args = 0..=1, default_missing_value = "", conflicts_with = "input_dir")]
    remote: Option<String>,

    /// Read the datasets from a local directory
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Input file format: xlsx or csv
    #[arg(short, long)]
    format: Option<InputFormat>,
}

impl InputArgs {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.input_dir {
            config.source = InputSource::Local { dir };
        } else if let Some(url) = self.remote {
            let base_url = if url.is_empty() {
                arcadgraph::config::DEFAULT_BASE_URL.to_string()
            } else {
                url
            };
            config.source = InputSource::Remote { base_url };
        }
        if let Some(format) = self.format {
            config.format = format;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output_dir,
            quiet,
        } => cmd_convert(input, output_dir, quiet).await,

        Commands::Report { input, json } => cmd_report(input, json).await,

        Commands::Inspect { file, rows } => cmd_inspect(&file, rows).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn resolve_config(input: InputArgs) -> Result<Config, Box<dyn std::error::Error>> {
    // Loads .env before reading the environment
    let mut config = Config::from_env()?;
    input.apply(&mut config);
    Ok(config)
}

async fn cmd_convert(
    input: InputArgs,
    output_dir: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    logs::set_echo(!quiet);

    let mut config = resolve_config(input)?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    let output = convert(&config, &PipelineOptions::now()).await?;
    let written = write_outputs(&output, &config.output_dir)?;

    eprintln!("\n📦 {} files written to {}", written.len(), config.output_dir.display());
    for file in &written {
        eprintln!("   {}", file_name(&file.path));
    }

    eprintln!("\n📊 Report preview:");
    for line in output.report.render().lines().take(REPORT_PREVIEW_LINES) {
        eprintln!("   {}", line);
    }

    eprintln!("\n➡️  Next steps:");
    eprintln!("   1. Copy {}/*.csv into the Neo4j import directory", config.output_dir.display());
    eprintln!("   2. Run the graph import script");

    eprintln!("\n✨ Done!");
    Ok(())
}

async fn cmd_report(input: InputArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Keep stdout clean for the report itself
    logs::set_echo(false);

    let config = resolve_config(input)?;
    let output = convert(&config, &PipelineOptions::now()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output.report)?);
    } else {
        print!("{}", output.report.render());
    }

    for observation in &output.observations {
        eprintln!("⚠️  {}", observation);
    }
    Ok(())
}

async fn cmd_inspect(file: &Path, rows: usize) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", file.display());

    let parsed = load_file(file).await?;
    let table = &parsed.table;

    eprintln!("   Format: {}", parsed.format);
    eprintln!("   Rows: {}", table.len());
    eprintln!("   Columns: {}", table.columns().join(", "));

    for row in table.rows().iter().take(rows) {
        let cells: Vec<String> = row.iter().map(|c| c.render()).collect();
        println!("{}", cells.join(" | "));
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
