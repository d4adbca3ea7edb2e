//! # component-inspect
//!
//! Loads component definition files (`.component` definition language or
//! `.json`), runs every component through the store pipeline and prints the
//! resulting layouts.

mod report;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use component_schema::DefinitionRegistry;
use component_world::{LocalHost, World, WorldConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "component-inspect", about = "Print compiled component store layouts")]
struct Args {
    /// Definition files to load
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Instance capacity of every store (defaults to COMPONENT_STORE_SIZE or 1000)
    #[arg(short, long)]
    capacity: Option<u32>,

    /// Only inspect the component with this name
    #[arg(long)]
    component: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut definitions = DefinitionRegistry::new();
    for path in &args.files {
        let ids = definitions
            .load_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
        info!(file = %path.display(), components = ids.len(), "loaded definitions");
    }
    if definitions.is_empty() {
        warn!("no component definitions found");
    }

    let mut config = WorldConfig::from_env();
    if let Some(capacity) = args.capacity {
        config = config
            .with_component_store_size(capacity)
            .with_max_entities(config.max_entities.max(capacity));
    }

    let targets: Vec<_> = match &args.component {
        Some(name) => {
            let id = definitions
                .find(name)
                .with_context(|| format!("no component named '{name}'"))?;
            vec![id]
        }
        None => definitions.iter().map(|(id, _)| id).collect(),
    };

    let host = Rc::new(LocalHost::new(definitions, config)?);
    let mut world = World::new(host);
    let reports = report::inspect(&mut world, &targets);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", report::render(&reports));
    }

    if reports.iter().any(|r| r.error.is_some()) {
        std::process::exit(1);
    }
    Ok(())
}
