//! flyer-scout CLI
//!
//! Maintenance commands for the result cache.

use clap::{Parser, Subcommand};
use flyer_scout::ScoutConfig;
use scout_cache::{CacheManager, Category, EvictReason, Lookup};
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flyer-scout")]
#[command(about = "Flyer event extraction with a file-backed result cache", version)]
struct Cli {
    /// Path to config file (default: flyer-scout.toml if present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Override the cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Override the default TTL in seconds
    #[arg(long, global = true)]
    default_ttl: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Result cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show entry counts and disk usage
    Stats {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List readable entries
    List {
        /// Only entries in this category
        #[arg(long)]
        category: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Delete expired and unreadable entries
    ClearExpired,

    /// Delete every entry
    ClearAll,

    /// Delete every entry in one category
    ClearCategory {
        /// Category label (e.g. places_api, venue_detail)
        category: String,
    },

    /// Print a cached value
    Get {
        /// Category label
        category: String,

        /// Logical key within the category
        key: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match ScoutConfig::discover(cli.config.as_deref())
        .and_then(|c| c.with_overrides(cli.cache_dir, cli.default_ttl))
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let cache = match CacheManager::open(&config.cache) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error opening cache at {}: {}", config.cache.cache_dir.display(), e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Cache { action } => match action {
            CacheCommands::Stats { json } => run_stats(&cache, json),
            CacheCommands::List { category, json } => run_list(&cache, category, json),
            CacheCommands::ClearExpired => {
                let removed = cache.clear_expired();
                println!("Removed {} expired entries", removed);
            }
            CacheCommands::ClearAll => {
                let removed = cache.clear_all();
                println!("Removed {} entries", removed);
            }
            CacheCommands::ClearCategory { category } => {
                let category = Category::from_label(&category);
                let removed = cache.clear_category(&category);
                println!("Removed {} entries from {}", removed, category);
            }
            CacheCommands::Get { category, key } => run_get(&cache, &category, &key),
        },
    }
}

/// Log to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flyer_scout=info,scout_cache=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_stats(cache: &CacheManager, json_output: bool) {
    let stats = cache.stats();

    if json_output {
        print_json(&stats);
        return;
    }

    println!("Cache directory: {}", cache.store().root().display());
    println!("  Entries: {}", stats.total_entries);
    println!("  Expired: {}", stats.expired_count);
    println!("  Size: {:.2} MB ({} bytes)", stats.total_megabytes, stats.total_bytes);
    if !stats.per_category.is_empty() {
        println!();
        println!("  By category:");
        for (category, count) in &stats.per_category {
            println!("    {:<16} {}", category, count);
        }
    }
}

fn run_list(cache: &CacheManager, category: Option<String>, json_output: bool) {
    let category = category.map(|c| Category::from_label(&c));
    let entries: Vec<_> = cache
        .entries()
        .into_iter()
        .filter(|e| category.as_ref().map_or(true, |c| &e.category == c))
        .collect();

    if json_output {
        print_json(&entries);
        return;
    }

    if entries.is_empty() {
        println!("No cache entries");
        return;
    }

    for entry in &entries {
        let state = if entry.expired { "expired" } else { "fresh" };
        println!(
            "{:<16} {:<8} {}  (expires {})",
            entry.category,
            state,
            entry.key,
            entry.expires_at.to_rfc3339()
        );
    }
}

fn run_get(cache: &CacheManager, category: &str, key: &str) {
    let category = Category::from_label(category);

    match cache.lookup::<serde_json::Value>(key, &category) {
        Lookup::Hit(value) => print_json(&value),
        Lookup::Miss => {
            eprintln!("Not cached: {} {}", category, key);
            process::exit(1);
        }
        Lookup::Evicted(EvictReason::Expired) => {
            eprintln!("Entry had expired and was removed: {} {}", category, key);
            process::exit(1);
        }
        Lookup::Evicted(EvictReason::Corrupt) => {
            eprintln!("Entry was unreadable and was removed: {} {}", category, key);
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
