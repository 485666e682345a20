use aiflow::graph::layout;
use aiflow::prelude::*;
use clap::{Parser, Subcommand};
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Order, convert and check node-based AI flows
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the nodes of a saved flow in execution order
    Order {
        /// Path to the saved flow JSON file (`{nodes, edges, metadata}`)
        flow_path: String,
        /// Also print the level each node is placed on
        #[arg(short, long)]
        levels: bool,
    },
    /// Convert a saved flow into a flow document
    Export {
        flow_path: String,
        /// Where to write the document; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
        /// Leave out x/y coordinates
        #[arg(long)]
        no_coordinates: bool,
        /// Leave out node configurations
        #[arg(long)]
        no_config: bool,
        /// Leave out run results
        #[arg(long)]
        lightweight: bool,
    },
    /// Convert a flow document back into a saved flow
    Import {
        document_path: String,
        #[arg(short, long)]
        output: Option<String>,
        /// Name stored in the saved flow's metadata
        #[arg(short, long, default_value = "imported flow")]
        name: String,
        /// Recompute node positions instead of keeping the document's coordinates
        #[arg(long)]
        arrange: bool,
    },
    /// Check that the nodes needed for a run have their required fields
    Check {
        flow_path: String,
        /// Only check what is needed to run this node
        #[arg(short, long)]
        node: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = ConfigRegistry::with_defaults();

    match cli.command {
        Command::Order { flow_path, levels } => run_order(&flow_path, levels, &registry),
        Command::Export {
            flow_path,
            output,
            no_coordinates,
            no_config,
            lightweight,
        } => {
            let options = ExportOptions::default()
                .with_coordinates(!no_coordinates)
                .with_config(!no_config)
                .lightweight(lightweight);
            run_export(&flow_path, output, options, &registry);
        }
        Command::Import {
            document_path,
            output,
            name,
            arrange,
        } => run_import(&document_path, output, &name, arrange, &registry),
        Command::Check { flow_path, node } => run_check(&flow_path, node, &registry),
    }
}

fn run_order(flow_path: &str, show_levels: bool, registry: &ConfigRegistry) {
    let graph = load_graph(flow_path, registry);

    if let Some(cycle) = graph.find_cycle() {
        eprintln!(
            "Warning: the flow contains a cycle ({}); the order below is partial.",
            cycle.join(" -> ")
        );
    }

    let levels = layout::node_levels(&graph.nodes, &graph.edges);
    for (index, node) in graph.sorted_nodes().iter().enumerate() {
        if show_levels {
            let level = levels.get(&node.id).copied().unwrap_or(0);
            println!("{:>3}. {} (level {})", index + 1, node.name(), level);
        } else {
            println!("{:>3}. {}", index + 1, node.name());
        }
    }
}

fn run_export(
    flow_path: &str,
    output: Option<String>,
    options: ExportOptions,
    registry: &ConfigRegistry,
) {
    let start = Instant::now();
    let graph = load_graph(flow_path, registry);
    let document = graph.to_document(&options);
    let json = document
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize document: {}", e)));

    write_output(output.as_deref(), &json);
    eprintln!(
        "Exported {} nodes in {:?}",
        document.len(),
        start.elapsed()
    );
}

fn run_import(
    document_path: &str,
    output: Option<String>,
    name: &str,
    arrange: bool,
    registry: &ConfigRegistry,
) {
    let json = read_file(document_path);
    let document = FlowDocument::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse document: {}", e)));

    let mut graph = FlowGraph::from_document(&document, registry);
    if arrange {
        graph.arrange_levels();
    }
    let saved = SavedFlow::new(graph, name);
    let json = saved
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize flow: {}", e)));

    write_output(output.as_deref(), &json);
    eprintln!(
        "Imported {} nodes and {} edges",
        saved.graph.nodes.len(),
        saved.graph.edges.len()
    );
}

fn run_check(flow_path: &str, node: Option<String>, registry: &ConfigRegistry) {
    let graph = load_graph(flow_path, registry);

    match PreparedRun::prepare(&graph, node.as_deref()) {
        Ok(run) => {
            print_required_nodes(&graph, node.as_deref());
            println!(
                "Flow is ready: {} node(s) would be sent under '{}'",
                run.document.len(),
                run.operation.event_name()
            );
        }
        Err(DispatchError::NotReady(ReadinessError::MissingRequiredFields(diagnostics))) => {
            print_required_nodes(&graph, node.as_deref());
            println!("{}", missing_fields_message(&diagnostics));
            std::process::exit(1);
        }
        Err(e) => exit_with_error(&e.to_string()),
    }
}

fn print_required_nodes(graph: &FlowGraph, node: Option<&str>) {
    if let Some(name) = node {
        let document = graph.to_document(&ExportOptions::dispatch());
        let required = required_nodes_for_launch(&document, name);
        println!("Nodes required to run '{}': {}", name, required.join(", "));
    }
}

/// Loads a saved flow, upgrading tabs written before metadata existed.
fn load_graph(flow_path: &str, registry: &ConfigRegistry) -> FlowGraph {
    let json = read_file(flow_path);
    let mut saved = SavedFlow::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse flow: {}", e)));

    let migrated = saved.migrate(registry);
    if migrated > 0 {
        eprintln!("Migrated {} node(s) from an older flow format", migrated);
    } else if saved.metadata.is_some() && !saved.is_compatible() {
        eprintln!("Warning: flow was saved with a different format version");
    }
    saved.graph
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read file '{}': {}", path, e)))
}

fn write_output(path: Option<&str>, content: &str) {
    match path {
        Some(path) => fs::write(path, content).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write file '{}': {}", path, e))
        }),
        None => println!("{}", content),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
