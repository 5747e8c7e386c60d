use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::core::{self, RenderOptions, ResultCache};

#[derive(Parser)]
#[command(name = "diffsense")]
#[command(about = "Structured diff parsing, rendering, and analysis-result caching")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the annotated line-by-line view of a diff
    Render {
        /// Diff file to read (stdin when omitted)
        input: Option<PathBuf>,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,

        /// Hide the line-number gutter
        #[arg(long)]
        no_line_numbers: bool,

        /// Override the configured output width
        #[arg(long)]
        width: Option<usize>,

        /// Extra ignore patterns on top of the configured set
        #[arg(long = "ignore")]
        ignore: Vec<String>,
    },

    /// Print the compact change-count summary
    Summary {
        /// Diff file to read (stdin when omitted)
        input: Option<PathBuf>,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,

        /// Extra ignore patterns on top of the configured set
        #[arg(long = "ignore")]
        ignore: Vec<String>,
    },

    /// Show a diff and an annotation file side by side
    Columns {
        /// Diff file to read (stdin when omitted)
        input: Option<PathBuf>,

        /// File holding the annotation text for the right column
        #[arg(short, long)]
        annotations: PathBuf,

        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,

        /// Override the configured output width
        #[arg(long)]
        width: Option<usize>,
    },

    /// Inspect or maintain the analysis-result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show entry count, total size, and oldest entry
    Stats,

    /// Delete every cached result
    Clear,

    /// Delete entries older than the configured TTL
    Prune {
        /// Override the configured TTL, in hours
        #[arg(long)]
        ttl: Option<u64>,
    },
}

impl Cli {
    pub fn execute(self, config: Config) -> Result<()> {
        match self.command {
            Commands::Render {
                input,
                no_color,
                no_line_numbers,
                width,
                ignore,
            } => {
                let diff = filtered_input(input.as_deref(), &config, &ignore)?;
                let opts = render_options(&config, no_color, no_line_numbers, width);
                print!("{}", core::render_annotated(&diff, &opts));
                Ok(())
            }
            Commands::Summary {
                input,
                no_color,
                ignore,
            } => {
                let diff = filtered_input(input.as_deref(), &config, &ignore)?;
                let opts = render_options(&config, no_color, false, None);
                print!("{}", core::render_summary(&diff, &opts));
                Ok(())
            }
            Commands::Columns {
                input,
                annotations,
                no_color,
                width,
            } => {
                let diff = read_input(input.as_deref())?;
                let annotation_text = std::fs::read_to_string(&annotations)?;
                let opts = render_options(&config, no_color, false, width);
                print!("{}", core::render_two_column(&diff, &annotation_text, &opts));
                Ok(())
            }
            Commands::Cache { command } => execute_cache(command, &config),
        }
    }
}

fn execute_cache(command: CacheCommands, config: &Config) -> Result<()> {
    let cache = match &config.cache.dir {
        Some(dir) => ResultCache::at_dir(dir),
        None => ResultCache::with_default_dir(),
    };

    match command {
        CacheCommands::Stats => {
            let stats = cache.stats();
            println!("Entries:    {}", stats.entries);
            println!("Total size: {} bytes", stats.total_size_bytes);
            match stats
                .oldest_timestamp
                .and_then(chrono::DateTime::from_timestamp_millis)
            {
                Some(oldest) => println!("Oldest:     {}", oldest.to_rfc3339()),
                None => println!("Oldest:     (none)"),
            }
        }
        CacheCommands::Clear => {
            let removed = cache.clear_all();
            println!("Removed {} cached results", removed);
        }
        CacheCommands::Prune { ttl } => {
            let ttl_hours = ttl.unwrap_or(config.cache.ttl_hours);
            let removed = cache.prune_expired(ttl_hours);
            println!("Pruned {} entries older than {}h", removed, ttl_hours);
        }
    }

    Ok(())
}

fn render_options(
    config: &Config,
    no_color: bool,
    no_line_numbers: bool,
    width: Option<usize>,
) -> RenderOptions {
    RenderOptions {
        colors: config.render.colors && !no_color,
        line_numbers: config.render.line_numbers && !no_line_numbers,
        context_lines: config.render.context_lines,
        max_width: width.unwrap_or(config.render.max_width),
    }
}

fn filtered_input(path: Option<&Path>, config: &Config, extra: &[String]) -> Result<String> {
    let text = read_input(path)?;

    let mut patterns = config.filter.ignore_patterns.clone();
    patterns.extend_from_slice(extra);

    Ok(core::filter_ignored(&text, &patterns))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
