//! `stockpile` -- build the game data store from a content root and report
//! what was loaded.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use stockpile_data::{FsAssetSource, GameDataStore, StoreConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stockpile")]
#[command(about = "Load a game content tree into memory and summarize it")]
struct Args {
    /// Content root containing the database and user directories
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// TOML file overriding the database and profiles directories
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the summary as JSON instead of plain text
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockpile=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = match &args.config {
        Some(path) => StoreConfig::from_toml_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => StoreConfig::default(),
    };

    tracing::info!(root = %args.root.display(), "building game data store");
    let source = FsAssetSource::new(&args.root);
    let store = GameDataStore::build(&source, &config)
        .with_context(|| format!("building store from {}", args.root.display()))?;

    let summary = store.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("presets:             {}", summary.presets);
        println!("editions:            {}", summary.editions);
        println!("item templates:      {}", summary.item_templates);
        println!("handbook categories: {}", summary.handbook_categories);
        println!("handbook items:      {}", summary.handbook_items);
        println!("locales:             {}", summary.locales);
        println!("traders:             {}", summary.traders);
        println!("quests:              {}", summary.quests);
        println!("hideout areas:       {}", summary.hideout_areas);
        println!("profiles:            {}", summary.profiles);
        println!("bot types:           {}", summary.bot_types);
        println!("locations:           {}", summary.locations);
    }
    Ok(())
}
