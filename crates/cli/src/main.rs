use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use ancestry_core::{
    build_ancestry, AncestorGraph, LayoutConfig, RecordFormat, RecordStore, TraversalConfig,
    DEFAULT_CAPACITY,
};

mod dot;

#[derive(Parser)]
#[command(name = "ancestry")]
#[command(version)]
#[command(about = "Ancestor lineage graphs with pedigree-collapse detection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the ancestor graph of one individual
    Tree {
        /// Path to the record file (.ged, .csv or .json)
        #[arg(short, long)]
        input: String,

        /// Record file format; guessed from the extension when omitted
        #[arg(long)]
        input_format: Option<String>,

        /// Identifier of the root individual (GEDCOM pointers may keep their @)
        #[arg(long)]
        id: String,

        /// Number of generations to walk
        #[arg(short, long)]
        generations: usize,

        /// Maximum number of occurrences before the graph is truncated
        #[arg(long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,

        /// Horizontal distance between neighbouring ancestors
        #[arg(long, default_value = "1.0")]
        x_spacing: f64,

        /// Vertical distance between generations
        #[arg(long, default_value = "1.0")]
        y_spacing: f64,

        /// Output format: "text" (default), "json" or "dot"
        #[arg(long, default_value = "text")]
        format: String,

        /// Write output to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print record counts and founders of a record file
    Stats {
        /// Path to the record file (.ged, .csv or .json)
        #[arg(short, long)]
        input: String,

        /// Record file format; guessed from the extension when omitted
        #[arg(long)]
        input_format: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Tree {
            input,
            input_format,
            id,
            generations,
            capacity,
            x_spacing,
            y_spacing,
            format,
            output,
        } => {
            let layout = LayoutConfig {
                x_spacing,
                y_spacing,
            };
            let config = TraversalConfig::new(id.trim().trim_matches('@'))
                .generations(generations)
                .capacity(capacity)
                .layout(layout);
            cmd_tree(&input, input_format.as_deref(), &config, &format, output.as_deref())
        }
        Commands::Stats {
            input,
            input_format,
        } => cmd_stats(&input, input_format.as_deref()),
    }
}

fn load_store(path: &str, format: Option<&str>) -> Result<RecordStore> {
    let format = match format {
        Some(name) => RecordFormat::from_name(name)
            .with_context(|| format!("Unknown input format '{}'", name))?,
        None => RecordFormat::from_path(path).with_context(|| {
            format!(
                "Cannot infer format of '{}'; pass --input-format ged|csv|json",
                path
            )
        })?,
    };

    let store = RecordStore::load(path, format)
        .with_context(|| format!("Failed to load records from '{}'", path))?;

    eprintln!(
        "Loaded {} individuals, {} families from '{}'",
        store.n_individuals(),
        store.n_families(),
        path
    );
    Ok(store)
}

fn cmd_tree(
    input: &str,
    input_format: Option<&str>,
    config: &TraversalConfig,
    output_format: &str,
    output: Option<&str>,
) -> Result<()> {
    let store = load_store(input, input_format)?;
    log::debug!("Traversal config: {:?}", config);

    let graph = build_ancestry(&store, config)
        .with_context(|| format!("Failed to build ancestry of '{}'", config.root))?;

    if graph.is_truncated() {
        eprintln!(
            "Warning: graph truncated at {} occurrences; raise --capacity or lower --generations",
            graph.capacity()
        );
    }

    let rendered = match output_format.to_lowercase().as_str() {
        "text" => graph.summary(&store),
        "json" => render_json(&graph)?,
        "dot" => dot::render(&graph, &store),
        other => {
            anyhow::bail!(
                "Unknown output format '{}'. Use 'text' (default), 'json' or 'dot'.",
                other
            );
        }
    };

    match output {
        Some(path) => {
            std::fs::write(Path::new(path), rendered)
                .with_context(|| format!("Failed to write '{}'", path))?;
            eprintln!("Wrote {} occurrences to '{}'", graph.len(), path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn render_json(graph: &AncestorGraph) -> Result<String> {
    let mut json = serde_json::to_string_pretty(graph)?;
    json.push('\n');
    Ok(json)
}

fn cmd_stats(input: &str, input_format: Option<&str>) -> Result<()> {
    let store = load_store(input, input_format)?;

    let founders = store.founders();
    println!("Individuals: {}", store.n_individuals());
    println!("Families:    {}", store.n_families());
    println!("Founders:    {}", founders.len());

    let show = founders.len().min(10);
    for id in founders.iter().take(show) {
        println!("  {}", id);
    }
    if founders.len() > show {
        println!("  ... and {} more", founders.len() - show);
    }

    Ok(())
}
