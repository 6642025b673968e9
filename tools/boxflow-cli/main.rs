use boxflow::demo;
use boxflow::prelude::*;
use clap::Parser;
use std::fs;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Inspect a node catalog and dry-run the editor's synchronization protocol
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a definitions JSON file; the built-in sample catalog is used if omitted
    definitions_path: Option<String>,

    /// Path to an editor configuration JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Build the demo graph and print the frames it sends to the peer
    #[arg(short, long)]
    demo: bool,

    /// Replay the demo frames into a peer-side mirror and print its replies
    #[arg(short, long, requires = "demo")]
    mirror: bool,

    /// Save a binary snapshot of the demo graph to this path
    #[arg(short, long, requires = "demo")]
    snapshot: Option<String>,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EditorConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EditorConfig::default(),
    };

    let defs = match &cli.definitions_path {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read definitions file '{}': {}", path, e))
            });
            Definitions::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid definitions: {}", e)))
        }
        None => {
            println!("No definitions file provided. Using the sample catalog.");
            demo::sample_definitions()
        }
    };

    print_catalog(&defs);

    if cli.demo {
        run_demo(defs, config, cli.mirror, cli.snapshot.as_deref());
    }
}

fn print_catalog(defs: &Definitions) {
    println!("\n--- Catalog ({} types) ---", defs.len());
    for group in defs.groups() {
        println!("[{}]", group);
        for type_name in defs.types(&group) {
            let variant = defs
                .nodetype(&type_name)
                .map(|kind| kind.to_string())
                .unwrap_or_else(|e| format!("<{}>", e));
            let inputs = defs.input_names(&type_name).unwrap_or_default();
            let outputs = defs.output_names(&type_name).unwrap_or_default();
            println!(
                "  {:<12} {:<14} in: {:<3} out: {}",
                type_name,
                variant,
                inputs.len(),
                outputs.len()
            );
        }
    }
}

fn run_demo(defs: Definitions, config: EditorConfig, mirror: bool, snapshot: Option<&str>) {
    println!("\n--- Demo graph (peer at {}) ---", config.link.url());
    let channel = MemoryChannel::open();
    let mut graph = Graph::builder(defs.clone())
        .with_config(config)
        .with_link(SyncLink::new(channel.clone()))
        .build();

    demo::populate(&mut graph)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build demo graph: {}", e)));

    let frames = channel.take();
    for frame in &frames {
        println!("-> {}", frame);
    }
    println!(
        "{} nodes, {} edges, {} frames sent",
        graph.nodes().len(),
        graph.edges().len(),
        frames.len()
    );

    if mirror {
        let mut peer = Mirror::new(defs);
        let mut replies = Vec::new();
        for frame in &frames {
            match peer.dispatch(frame) {
                Ok(out) => replies.extend(out),
                Err(e) => exit_with_error(&format!("Mirror rejected frame: {}", e)),
            }
        }
        println!("\n--- Mirror ---");
        println!("{} boxes, {} links", peer.boxes().len(), peer.links().len());
        for reply in &replies {
            println!("<- {}", reply);
            if let Err(e) = graph.receive(reply) {
                exit_with_error(&format!("Failed to apply reply: {}", e));
            }
        }
        if replies.is_empty() {
            println!("No replies.");
        }
    }

    if let Some(path) = snapshot {
        graph
            .snapshot()
            .and_then(|snap| snap.save(path))
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save snapshot: {}", e)));
        println!("\nSnapshot saved to {}", path);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
