//! Whale Route - Command Line Interface
//!
//! Searches for a low-cost route between two cities of a road network with
//! the whale population search.

use clap::{Parser, Subcommand};
use whale_route::benchmark::{Benchmark, BenchmarkConfig};
use whale_route::error::{Error, Result};
use whale_route::graph::Graph;
use whale_route::heuristics::whale::{WhaleConfig, WhaleOptimization};
use whale_route::visualization::{export_history_csv, Visualizer};

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "whale-route")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Whale-inspired route search on small road networks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the nodes of a network with their menu numbers
    Nodes {
        /// JSON graph file (defaults to the built-in Baja California network)
        #[arg(short, long)]
        graph: Option<PathBuf>,
    },

    /// Search a route between two nodes
    Solve {
        /// JSON graph file (defaults to the built-in Baja California network)
        #[arg(short, long)]
        graph: Option<PathBuf>,

        /// Start node: menu number (1-based) or name; digits always read as a menu number. Prompted when omitted
        #[arg(long)]
        start: Option<String>,

        /// End node: menu number (1-based) or name; digits always read as a menu number. Prompted when omitted
        #[arg(long)]
        end: Option<String>,

        /// JSON file with search parameters
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of whales
        #[arg(short, long)]
        whales: Option<usize>,

        /// Number of iterations
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Time limit in seconds
        #[arg(short, long)]
        time_limit: Option<f64>,

        /// Output solution to JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output best-distance history to CSV file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Render the best route and the convergence curve next to this path
        #[arg(long)]
        visualize: Option<PathBuf>,

        /// Directory receiving one SVG frame per iteration
        #[arg(long)]
        frames: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze a network
    Analyze {
        /// JSON graph file (defaults to the built-in Baja California network)
        #[arg(short, long)]
        graph: Option<PathBuf>,
    },

    /// Run the search over many seeds and compare with the exact shortest path
    Benchmark {
        /// JSON graph file (defaults to the built-in Baja California network)
        #[arg(short, long)]
        graph: Option<PathBuf>,

        /// Start node: menu number (1-based) or name; digits always read as a menu number
        #[arg(long)]
        start: String,

        /// End node: menu number (1-based) or name; digits always read as a menu number
        #[arg(long)]
        end: String,

        /// Number of seeded runs
        #[arg(short, long, default_value = "30")]
        runs: usize,

        /// Seed of the first run
        #[arg(long, default_value = "0")]
        first_seed: u64,

        /// Number of whales
        #[arg(short, long, default_value = "50")]
        whales: usize,

        /// Number of iterations
        #[arg(short, long, default_value = "100")]
        iterations: usize,

        /// Run seeds one after another
        #[arg(long)]
        sequential: bool,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Nodes { graph } => {
            load_graph(graph.as_deref()).map(|g| print_menu(&g))
        }

        Commands::Solve { graph, start, end, config, whales, iterations, seed, time_limit, output, history, visualize, frames, verbose } => {
            let overrides = Overrides { whales, iterations, seed, time_limit };
            let outputs = Outputs { output, history, visualize, frames };
            solve(graph.as_deref(), start, end, config.as_deref(), overrides, outputs, verbose)
        }

        Commands::Analyze { graph } => {
            analyze(graph.as_deref())
        }

        Commands::Benchmark { graph, start, end, runs, first_seed, whales, iterations, sequential, output } => {
            let config = BenchmarkConfig {
                num_runs: runs,
                first_seed,
                parallel: !sequential,
                whale: WhaleConfig { num_whales: whales, max_iterations: iterations, ..Default::default() },
                ..Default::default()
            };
            run_benchmark(graph.as_deref(), &start, &end, config, &output)
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Command-line values that override the search configuration
struct Overrides {
    whales: Option<usize>,
    iterations: Option<usize>,
    seed: Option<u64>,
    time_limit: Option<f64>,
}

struct Outputs {
    output: Option<PathBuf>,
    history: Option<PathBuf>,
    visualize: Option<PathBuf>,
    frames: Option<PathBuf>,
}

fn load_graph(path: Option<&Path>) -> Result<Graph> {
    match path {
        Some(path) => {
            println!("Loading graph from {:?}...", path);
            Graph::from_file(path)
        }
        None => Ok(Graph::baja_california()),
    }
}

fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<WhaleConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<WhaleConfig>(&text)?
        }
        None => WhaleConfig::default(),
    };

    if let Some(whales) = overrides.whales {
        config.num_whales = whales;
    }
    if let Some(iterations) = overrides.iterations {
        config.max_iterations = iterations;
    }
    if let Some(seed) = overrides.seed {
        config.seed = seed;
    }
    if overrides.time_limit.is_some() {
        config.time_limit = overrides.time_limit;
    }

    Ok(config)
}

fn print_menu(graph: &Graph) {
    println!("Nodes of {}:", graph.name);
    for (idx, name) in graph.nodes().iter().enumerate() {
        println!("{}: {}", idx + 1, name);
    }
}

/// Resolve a 1-based menu number or a node name.
///
/// Integers are always menu numbers, so a node named "2" is only reachable
/// through its menu number.
fn resolve_node(graph: &Graph, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if (1..=graph.num_nodes()).contains(&n) => Ok(n - 1),
        Ok(n) => Err(Error::Configuration(format!(
            "node number {} is out of range 1..={}",
            n, graph.num_nodes()
        ))),
        Err(_) => graph.node_id(value),
    }
}

/// Ask for a menu number until a valid one is entered
fn prompt_node(graph: &Graph, label: &str) -> Result<usize> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    loop {
        print!("Enter the number of the {} city: ", label);
        std::io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Configuration(format!("no {} city given", label)));
        }

        match line.trim().parse::<usize>() {
            Ok(n) if (1..=graph.num_nodes()).contains(&n) => return Ok(n - 1),
            _ => println!("Please enter a number between 1 and {}.", graph.num_nodes()),
        }
    }
}

fn select_node(graph: &Graph, value: Option<String>, label: &str, menu_shown: &mut bool) -> Result<usize> {
    match value {
        Some(value) => resolve_node(graph, &value),
        None => {
            if !*menu_shown {
                println!("Select the start and destination cities by number:");
                print_menu(graph);
                *menu_shown = true;
            }
            prompt_node(graph, label)
        }
    }
}

fn solve(
    graph_path: Option<&Path>,
    start: Option<String>,
    end: Option<String>,
    config_path: Option<&Path>,
    overrides: Overrides,
    outputs: Outputs,
    verbose: bool,
) -> Result<()> {
    let graph = load_graph(graph_path)?;
    let config = load_config(config_path, &overrides)?;

    let mut menu_shown = false;
    let start = select_node(&graph, start, "start", &mut menu_shown)?;
    let end = select_node(&graph, end, "destination", &mut menu_shown)?;

    if verbose {
        println!("{}", graph.statistics());
        println!("Config: {:?}", config);
    }

    let viz = Visualizer::new();
    if let Some(dir) = &outputs.frames {
        std::fs::create_dir_all(dir)?;
    }

    println!(
        "Searching {} -> {} with {} whales over {} iterations...",
        graph.node_name(start), graph.node_name(end), config.num_whales, config.max_iterations
    );
    let timer = Instant::now();

    let mut woa = WhaleOptimization::new(&graph, start, end, config)?;
    let mut frame_error: Option<std::io::Error> = None;
    let solution = woa.run_with_observer(|snapshot| {
        let Some(dir) = &outputs.frames else { return };
        if frame_error.is_some() {
            return;
        }
        let svg = viz.generate_frame_svg(&graph, snapshot);
        let path = dir.join(format!("iteration_{:04}.svg", snapshot.iteration));
        if let Err(e) = viz.save_svg(&svg, &path) {
            frame_error = Some(e);
        }
    })?;
    if let Some(e) = frame_error {
        return Err(e.into());
    }

    let elapsed = timer.elapsed();

    println!("\n========== Results ==========");
    println!(
        "Best route from {} to {}: {} (distance {:.2})",
        graph.node_name(start),
        graph.node_name(end),
        solution.route_string(&graph),
        solution.cost
    );
    println!("Iterations: {}", solution.iterations);
    println!("Improvements: {}", solution.improvements());
    if let Some(at) = solution.converged_at() {
        println!("Best reached at iteration: {}", at);
    }
    println!("Time: {:.4}s", elapsed.as_secs_f64());

    if verbose {
        println!("\nHistory: {:?}", solution.history);
    }

    if let Some(out_path) = &outputs.output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(out_path, json)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if let Some(history_path) = &outputs.history {
        export_history_csv(&solution.history, history_path)?;
        println!("History saved to {:?}", history_path);
    }

    if let Some(base) = &outputs.visualize {
        let route_svg = viz.generate_svg(&graph, &solution);
        save_picture(&viz, &route_svg, base, "png", "svg")?;

        let curve_svg = viz.generate_convergence_svg(&solution.history);
        save_picture(&viz, &curve_svg, base, "convergence.png", "convergence.svg")?;
    }

    Ok(())
}

/// Save as PNG, falling back to SVG when no converter is available
fn save_picture(viz: &Visualizer, svg: &str, base: &Path, png_ext: &str, svg_ext: &str) -> Result<()> {
    let png_path = base.with_extension(png_ext);
    match viz.save_png(svg, &png_path) {
        Ok(()) => println!("Visualization saved to {:?}", png_path),
        Err(e) => {
            let svg_path = base.with_extension(svg_ext);
            viz.save_svg(svg, &svg_path)?;
            println!("PNG conversion failed ({}). Saved SVG to {:?}", e, svg_path);
        }
    }
    Ok(())
}

fn analyze(graph_path: Option<&Path>) -> Result<()> {
    let graph = load_graph(graph_path)?;

    println!("========== Graph Analysis ==========\n");
    println!("{}", graph.statistics());

    println!("Adjacency:");
    for (id, name) in graph.nodes().iter().enumerate() {
        let neighbors: Vec<String> = graph.neighbors(id)
            .iter()
            .map(|&(n, w)| format!("{} ({})", graph.node_name(n), w))
            .collect();
        println!("  {}: {}", name, neighbors.join(", "));
    }

    Ok(())
}

fn run_benchmark(graph_path: Option<&Path>, start: &str, end: &str, config: BenchmarkConfig, output: &Path) -> Result<()> {
    let graph = load_graph(graph_path)?;
    let start = resolve_node(&graph, start)?;
    let end = resolve_node(&graph, end)?;

    std::fs::create_dir_all(output)?;

    let mut benchmark = Benchmark::new(config);
    benchmark.run(&graph, start, end)?;

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("Results exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_node() {
        let graph = Graph::baja_california();
        assert_eq!(resolve_node(&graph, "1").unwrap(), 0);
        assert_eq!(resolve_node(&graph, " 8 ").unwrap(), 7);
        assert_eq!(resolve_node(&graph, "Mexicali").unwrap(), 4);
        assert!(matches!(resolve_node(&graph, "0"), Err(Error::Configuration(_))));
        assert!(matches!(resolve_node(&graph, "9"), Err(Error::Configuration(_))));
        assert!(matches!(resolve_node(&graph, "Tokyo"), Err(Error::UnknownNode(_))));
    }

    #[test]
    fn test_digit_names_resolve_as_menu_numbers() {
        let mut graph = Graph::new("digits");
        graph.add_node("A").unwrap();
        graph.add_node("1").unwrap();
        graph.connect("A", "1", 1.0).unwrap();

        assert_eq!(resolve_node(&graph, "1").unwrap(), 0);
        assert_eq!(resolve_node(&graph, "2").unwrap(), 1);
    }
}
