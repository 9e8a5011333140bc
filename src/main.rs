use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use rankprob::{Label, RankConfig, RankEngine, Tree, TreeIndex};

#[derive(Parser, Debug)]
#[command(name = "rankprob", about = "Rank statistics of internal vertices under random labeled histories")]
struct Cli {
    /// Bundled tree to query.
    #[arg(long, value_enum, default_value_t = SampleTree::Full, global = true)]
    tree: SampleTree,

    /// Skip leaf-count and label checks before each query.
    #[arg(long, global = true)]
    no_validate: bool,

    /// Allowed drift of a distribution's sum from 1 before warning.
    #[arg(long, default_value_t = 1e-9, global = true)]
    tolerance: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the rank distribution of a vertex.
    Rank {
        /// Vertex label.
        label: Label,
    },
    /// Print the expected rank and its variance.
    Moments {
        /// Vertex label.
        label: Label,
    },
    /// Print the probability that `u` comes before `v`.
    Compare {
        /// Earlier vertex.
        u: Label,
        /// Later vertex.
        v: Label,
    },
    /// Print mean and variance for every internal vertex.
    Summary,
    /// Print the number of labeled histories.
    Histories,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SampleTree {
    /// Nine leaves, internal vertices 1..=8.
    Full,
    /// Five leaves, internal vertices 2..=5.
    T4,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let tree = match cli.tree {
        SampleTree::Full => sample_tree(),
        SampleTree::T4 => sample_subtree(),
    };
    let config = RankConfig::default()
        .with_validation(!cli.no_validate)
        .with_sum_tolerance(cli.tolerance);
    let mut engine = RankEngine::new(config);

    match cli.command {
        Commands::Rank { label } => run_rank(&mut engine, &tree, label)?,
        Commands::Moments { label } => run_moments(&mut engine, &tree, label)?,
        Commands::Compare { u, v } => run_compare(&mut engine, &tree, u, v)?,
        Commands::Summary => run_summary(&mut engine, &tree)?,
        Commands::Histories => {
            let count = engine
                .history_count(&tree)
                .context("failed to count labeled histories")?;
            println!("{tree}\thistories={count}");
        }
    }

    Ok(())
}

fn run_rank(engine: &mut RankEngine, tree: &Tree, label: Label) -> Result<()> {
    let dist = engine
        .rank_distribution(tree, label)
        .with_context(|| format!("rank distribution failed for vertex {label}"))?;

    for (rank, p) in dist.iter() {
        println!("rank {rank}\tp={p:.6}");
    }
    Ok(())
}

fn run_moments(engine: &mut RankEngine, tree: &Tree, label: Label) -> Result<()> {
    let (mean, variance) = engine
        .expected_rank(tree, label)
        .with_context(|| format!("moments failed for vertex {label}"))?;

    println!("vertex {label}\tmean={mean:.6}\tvariance={variance:.6}");
    Ok(())
}

fn run_compare(engine: &mut RankEngine, tree: &Tree, u: Label, v: Label) -> Result<()> {
    let p = engine
        .compare(tree, u, v)
        .with_context(|| format!("comparison of {u} and {v} failed"))?;

    println!("P({u} before {v}) = {p}");
    Ok(())
}

fn run_summary(engine: &mut RankEngine, tree: &Tree) -> Result<()> {
    let index = TreeIndex::build(tree).context("failed to index tree")?;
    let summary = engine
        .rank_summary(&index)
        .context("rank summary failed")?;

    for row in summary {
        println!(
            "vertex {}\tdepth={}\tmean={:.4}\tvariance={:.4}",
            row.label, row.depth, row.mean, row.variance
        );
    }
    Ok(())
}

fn cherry(label: Label) -> Tree {
    Tree::internal(label, Tree::leaf(), Tree::leaf())
}

/// (((,)4,)3,(,)5)2
fn sample_subtree() -> Tree {
    let t1 = Tree::internal(3, cherry(4), Tree::leaf());
    Tree::internal(2, t1, cherry(5))
}

/// (((,)7,(,)8)6,(((,)4,)3,(,)5)2)1
fn sample_tree() -> Tree {
    let t2 = Tree::internal(6, cherry(7), cherry(8));
    Tree::internal(1, t2, sample_subtree())
}
