use anyhow::Context;
use clap::{Parser, Subcommand};
use nutriclust::{JsonTableSource, ModelStore, Pipeline, PipelineConfig, TableSource};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Cluster nutritional records with seeded k-means
#[derive(Parser, Debug)]
#[command(name = "nutriclust")]
#[command(about = "Cluster nutritional records with k-means", long_about = None)]
struct Args {
    /// Path to the pipeline configuration
    #[arg(short, long, default_value = "conf/pipeline.toml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline on a table
    Run {
        /// Table name
        #[arg(long)]
        table_name: String,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Print the first row of a table
    Peek {
        /// Table name
        #[arg(long)]
        table: String,
    },
    /// Print a saved model
    DescribeModel {
        /// Model path; defaults to model.save_path
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn main() {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", e);
    }

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = PipelineConfig::from_file(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?
        .with_overrides(|name| std::env::var(name).ok());

    match args.command {
        Command::Run { table_name, json } => {
            info!("Starting nutriclust v{}", env!("CARGO_PKG_VERSION"));
            info!("Data directory: {:?}", config.source.data_dir);
            info!("Keyspace: {}", config.source.keyspace);

            let source = JsonTableSource::new(&config.source.data_dir, &config.source.keyspace)?;
            let pipeline = Pipeline::new(config, source)?;
            let report = pipeline
                .run(&table_name)
                .with_context(|| format!("pipeline run on table '{}'", table_name))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        Command::Peek { table } => {
            let source = JsonTableSource::new(&config.source.data_dir, &config.source.keyspace)?;
            match source.peek(&table)? {
                Some(row) => println!("{}", serde_json::to_string_pretty(&row)?),
                None => info!("Table '{}' is empty", table),
            }
        }
        Command::DescribeModel { path } => {
            let path = path.unwrap_or_else(|| config.model.save_path.clone());
            let model = ModelStore::new(&path)
                .load()
                .with_context(|| format!("reading model {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
    }

    Ok(())
}
