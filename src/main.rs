use clap::Parser;
use log::error;
use maxclique::dimacs::{read_graph, Format};
use maxclique::graph::BitGraph;
use maxclique::search::{self, Algorithm, SearchConfig, SearchOutcome};
use maxclique::skeleton::SkeletonConfig;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exact maximum clique search
#[derive(Parser, Debug)]
#[command(name = "maxclique", version)]
#[command(about = "Exact maximum clique by bit-parallel branch and bound")]
#[command(long_about = "Finds a maximum clique of an undirected graph.

  maxclique graph.clq                        # DIMACS input, sequential colouring bound
  maxclique adj.txt --format matrix          # 0/1 adjacency matrix
  maxclique graph.clq -a dynamic -w 8 -t 32  # parallel, on-demand task creation
  maxclique --random 200 --density 0.5 --seed 7 -a safe

Vertex ids are printed as they appear in the input: 1-based for DIMACS, 0-based otherwise.")]
struct Cli {
    /// Graph file to read
    #[arg(value_name = "INPUT", required_unless_present_any = ["random", "validate"])]
    input: Option<PathBuf>,

    /// Input format: dimacs or matrix
    #[arg(long, default_value = "dimacs")]
    format: Format,

    /// Generate a random G(n, p) graph with this many vertices instead of reading a file
    #[arg(long, value_name = "N", conflicts_with = "input")]
    random: Option<usize>,

    /// Edge probability for --random, in [0, 1]
    #[arg(long, value_name = "P", default_value_t = 0.5, value_parser = parse_density)]
    density: f64,

    /// Seed for --random
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Solver: plain, colored, broadcast, safe or dynamic
    #[arg(short, long, default_value = "colored")]
    algorithm: Algorithm,

    /// Search in input vertex order instead of degree order
    #[arg(long)]
    no_permute: bool,

    /// Worker threads for the parallel solvers (default: available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Split depth for static strategies; donation depth limit for the dynamic one
    #[arg(short = 'd', long, default_value_t = 2)]
    spawn_depth: usize,

    /// Outstanding tasks the dynamic strategy maintains
    #[arg(short = 't', long)]
    target_tasks: Option<usize>,

    /// Solve the bundled reference graphs with every algorithm and check the answers
    #[arg(long)]
    validate: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Parses an edge probability, rejecting anything outside `[0, 1]` including NaN.
fn parse_density(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} is not a probability in [0, 1]"))
    }
}

impl Cli {
    fn search_config(&self) -> SearchConfig {
        let defaults = SkeletonConfig::default();
        SearchConfig {
            algorithm: self.algorithm,
            permute: !self.no_permute,
            skeleton: SkeletonConfig {
                workers: self.workers.unwrap_or(defaults.workers),
                spawn_depth: self.spawn_depth,
                target_tasks: self.target_tasks,
                ..defaults
            },
        }
    }

    fn load_graph(&self) -> maxclique::Result<BitGraph> {
        if let Some(n) = self.random {
            let mut rng = SmallRng::seed_from_u64(self.seed);
            return Ok(BitGraph::random(n, self.density, &mut rng));
        }
        match &self.input {
            Some(path) => Ok(read_graph(path, self.format)?),
            None => Ok(BitGraph::empty(0)),
        }
    }

    /// Offset added to internal ids when printing.
    fn label_base(&self) -> usize {
        usize::from(self.random.is_none() && self.format == Format::Dimacs)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn report(outcome: &SearchOutcome, base: usize) {
    let labels: Vec<String> = outcome
        .clique
        .iter()
        .map(|v| (v + base).to_string())
        .collect();
    println!("size: {}", outcome.size);
    println!("clique: {}", labels.join(" "));
    println!("valid: {}", if outcome.valid { "yes" } else { "NO" });
    println!(
        "nodes: {} | prunes: {} | tasks: {} | steals: {} | messages: {}",
        outcome.stats.nodes,
        outcome.stats.prunes,
        outcome.stats.spawned,
        outcome.stats.steals,
        outcome.stats.messages
    );
    println!("time: {:.3}s", outcome.elapsed.as_secs_f64());
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = cli.search_config();

    if cli.validate {
        // Every algorithm runs, including the dynamic one.
        let skeleton = &mut config.skeleton;
        skeleton.target_tasks = skeleton.target_tasks.or(Some(skeleton.workers * 2));
        return match maxclique::validate::validate_known_graphs(&config) {
            Ok(()) => {
                println!("Validation OK: every algorithm solves the bundled graphs.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Validation FAILED: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let outcome = cli
        .load_graph()
        .and_then(|graph| search::run(&graph, &config));
    match outcome {
        Ok(outcome) => {
            report(&outcome, cli.label_base());
            if outcome.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
