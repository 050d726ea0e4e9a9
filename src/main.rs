//! `docslice` command-line interface.
//!
//! ```bash
//! docslice chunk report.txt --max-chunk-size 200
//! docslice chunk report.txt --unit tokens --json
//! docslice highlights report.txt --query "datacenter build-outs"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use docslice::{
    get_highlights_from_file, Boundary, Chunker, ChunkerConfig, Config, FsExtractor,
    HighlightsClient, HighlightsConfig, SimulatedHighlights, SizeUnit, TieredChunker,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docslice", version, about = "Split documents into bounded chunks and find relevant passages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a text file into chunks that fit a size limit
    Chunk {
        /// File to split
        file: PathBuf,
        /// Maximum chunk size (overrides DOCSLICE_MAX_CHUNK_SIZE)
        #[arg(long)]
        max_chunk_size: Option<usize>,
        /// characters or tokens (overrides DOCSLICE_CHUNK_UNIT)
        #[arg(long)]
        unit: Option<SizeUnit>,
        /// Print chunks as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find the passages of a file most relevant to a query
    Highlights {
        /// File to search
        file: PathBuf,
        /// What to look for
        #[arg(long, short)]
        query: String,
        /// Number of highlights to print
        #[arg(long, default_value_t = 5)]
        max_highlights: usize,
        /// Maximum chunk size (overrides DOCSLICE_MAX_CHUNK_SIZE)
        #[arg(long)]
        max_chunk_size: Option<usize>,
        /// characters or tokens (overrides DOCSLICE_CHUNK_UNIT)
        #[arg(long)]
        unit: Option<SizeUnit>,
        /// Collapse whitespace before chunking
        #[arg(long)]
        normalize: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command {
        Commands::Chunk {
            file,
            max_chunk_size,
            unit,
            json,
        } => {
            let chunker = build_chunker(config.chunker, max_chunk_size, unit)?;
            run_chunk(&chunker, &file, json)
        }
        Commands::Highlights {
            file,
            query,
            max_highlights,
            max_chunk_size,
            unit,
            normalize,
        } => {
            let missing = config.storage.missing();
            if !missing.is_empty() {
                debug!(?missing, "storage credentials not set, reading local files only");
            }
            let chunker = build_chunker(config.chunker, max_chunk_size, unit)?;
            let client = highlights_client(&config.highlights)?;
            run_highlights(&chunker, client.as_ref(), &file, &query, max_highlights, normalize)
        }
    }
}

fn build_chunker(
    mut config: ChunkerConfig,
    max_chunk_size: Option<usize>,
    unit: Option<SizeUnit>,
) -> Result<TieredChunker> {
    if let Some(size) = max_chunk_size {
        config.max_chunk_size = size;
    }
    if let Some(unit) = unit {
        config.unit = unit;
    }
    Ok(TieredChunker::from_config(&config)?)
}

fn run_chunk(chunker: &TieredChunker, file: &Path, json: bool) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let chunks = chunker
        .chunk(&text)
        .with_context(|| format!("failed to chunk {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    let unit = chunker.unit();
    for chunk in &chunks {
        let split = chunk.split_by.map_or("whole", Boundary::name);
        println!(
            "--- chunk {} | {} {} | bytes {}..{} | split: {}",
            chunk.index, chunk.size, unit, chunk.start, chunk.end, split
        );
        println!("{}", chunk.text);
    }
    Ok(())
}

fn run_highlights(
    chunker: &TieredChunker,
    client: &dyn HighlightsClient,
    file: &Path,
    query: &str,
    max_highlights: usize,
    normalize: bool,
) -> Result<()> {
    let root = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_id = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("not a file name: {}", file.display()))?;

    let extractor = FsExtractor::new(root).normalized(normalize);
    let report =
        get_highlights_from_file(&extractor, chunker, client, file_id, query, max_highlights)?;
    println!("{report}");
    Ok(())
}

fn highlights_client(config: &HighlightsConfig) -> Result<Box<dyn HighlightsClient>> {
    #[cfg(feature = "http")]
    {
        if config.api_key.is_some() {
            let client = docslice::HttpHighlightsClient::new(config)?;
            return Ok(Box::new(client));
        }
    }

    if config.api_key.is_some() {
        warn!("built without the `http` feature, highlights will be simulated");
    } else {
        warn!("HIGHLIGHTS_API_KEY not set, highlights will be simulated");
    }
    Ok(Box::new(SimulatedHighlights))
}
