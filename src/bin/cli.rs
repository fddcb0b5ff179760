//! blockingmachine: CLI for importing filter lists and exporting blocklists.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use blockingmachine::{
    clean_output_dir, export_with_options, AppConfig, Category, Error, FilterSource, Fetcher,
    IngestPipeline, JsonFileStore, Result, RuleStore, StoreSummary,
};

#[derive(Parser)]
#[command(name = "blockingmachine")]
#[command(version)]
#[command(about = "Merge community filter lists and export them as blocklists", long_about = None)]
struct Cli {
    /// Config file (default: searched in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every configured source and merge it into the store
    Import,

    /// Write the stored rules in one or more formats
    Export {
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format to write, or `all` (repeatable)
        #[arg(short, long = "format")]
        formats: Vec<String>,

        /// Only export these categories (repeatable)
        #[arg(long = "category")]
        categories: Vec<Category>,

        /// Never export these categories (repeatable)
        #[arg(long = "exclude-category")]
        exclude_categories: Vec<Category>,

        /// Minimum record priority
        #[arg(long)]
        min_priority: Option<i32>,

        /// Only export records carrying one of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Check every configured source
    Validate {
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show store statistics
    Stats {
        /// Number of sample rules to print
        #[arg(long, default_value_t = 5)]
        sample: usize,
    },

    /// Remove exported files
    Cleanup {
        /// Also remove every record from the store
        #[arg(long)]
        drop_store: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let level = if cli.debug || config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Import => import(config),
        Commands::Export {
            output,
            formats,
            categories,
            exclude_categories,
            min_priority,
            tags,
        } => {
            let mut options = config.export.clone();
            if !formats.is_empty() {
                options.formats = formats;
            }
            if !categories.is_empty() {
                options.selection.categories = categories;
            }
            if !exclude_categories.is_empty() {
                options.selection.exclude_categories = exclude_categories;
            }
            if min_priority.is_some() {
                options.selection.min_priority = min_priority;
            }
            if !tags.is_empty() {
                options.selection.tags = tags;
            }

            let output = output.unwrap_or_else(|| config.output_dir());
            let store = JsonFileStore::open(config.store_path())?;
            let meta = config.meta.resolve();
            let report = export_with_options(&store, &output, &meta, &options)?;

            for path in &report.written {
                println!("Wrote {:?}", path);
            }
            for id in &report.skipped_formats {
                println!("Skipped unsupported format: {}", id);
            }
            for (format, error) in &report.failed {
                println!("Failed to write {}: {}", format, error);
            }
            println!("Exported {} rules", report.rule_count);
            Ok(())
        }
        Commands::Validate { verbose } => validate(config, verbose),
        Commands::Stats { sample } => stats(config, sample),
        Commands::Cleanup { drop_store } => {
            let removed = clean_output_dir(&config.output_dir())?;
            println!("Removed {} exported file(s)", removed);
            if drop_store {
                let store = JsonFileStore::open(config.store_path())?;
                let count = store.len()?;
                store.clear()?;
                println!("Dropped {} rules from {:?}", count, store.path());
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let path = match path {
        Some(path) => path,
        None => AppConfig::discover(std::env::current_dir()?)?,
    };
    AppConfig::load(path)
}

fn import(config: &AppConfig) -> Result<()> {
    let store = JsonFileStore::open(config.store_path())?;
    let stats = IngestPipeline::new(&store, Fetcher::new()?).run(&config.sources)?;

    println!(
        "Sources: {} attempted, {} succeeded, {} failed",
        stats.sources_attempted, stats.sources_succeeded, stats.sources_failed
    );
    println!(
        "Rules: {} processed, {} unique",
        stats.total_rules, stats.unique_rules
    );
    for (source, count) in &stats.rules_per_source {
        println!("  {}: {}", source, count);
    }
    for (category, count) in &stats.rules_per_category {
        println!("  [{}] {}", category, count);
    }
    for failure in &stats.errors {
        println!("  Failed {}: {}", failure.source, failure.error);
    }
    println!("Store now holds {} rules", store.len()?);
    Ok(())
}

fn validate(config: &AppConfig, verbose: bool) -> Result<()> {
    let mut invalid = 0;
    for raw in &config.sources {
        match FilterSource::resolve(raw) {
            Ok(source) => {
                if verbose {
                    println!(
                        "ok      {} [{}] priority={} trusted={} enabled={}",
                        source.name(),
                        source.category(),
                        source.priority(),
                        source.trusted(),
                        source.enabled()
                    );
                }
            }
            Err(e) => {
                invalid += 1;
                println!("invalid {}: {}", raw.display_name(), e);
            }
        }
    }

    println!(
        "{} source(s), {} valid, {} invalid",
        config.sources.len(),
        config.sources.len() - invalid,
        invalid
    );
    if invalid > 0 {
        return Err(Error::Config(format!("{} invalid source(s)", invalid)));
    }
    Ok(())
}

fn stats(config: &AppConfig, sample: usize) -> Result<()> {
    let store = JsonFileStore::open(config.store_path())?;
    let rules = store.all()?;
    let summary = StoreSummary::from_rules(&rules);

    println!("Total rules: {}", summary.total_rules);
    println!("By type:");
    for (rule_type, count) in &summary.rule_types {
        println!("  {}: {}", rule_type, count);
    }
    println!("By category:");
    for (category, count) in &summary.categories {
        println!("  {}: {}", category, count);
    }
    if sample > 0 && !rules.is_empty() {
        println!("Sample rules:");
        for rule in rules.iter().take(sample) {
            println!("  {} ({}, {})", rule.raw, rule.rule_type, rule.category());
        }
    }
    Ok(())
}
