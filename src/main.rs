use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use cdmc_cluster::{ClusterAssignment, HierarchicalConfig, Linkage};
use cdmc_converge::{AgreementMetric, ConvergenceConfig};
use cdmc_dtw::Dtw;
use cdmc_io::{CsvSequenceReader, Dataset, ExperimentName, ResultWriter, SequenceSource};
use cdmc_model::{ModelConfig, ModelType};

#[derive(Parser)]
#[command(name = "cdmc")]
#[command(about = "Regime discovery in symbol sequences: DTW-seeded clustering refined by sequence models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for model initialisation
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Where and how to read the sequences.
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Path to the input CSV file (`id,s0,s1,...`, one sequence per row)
    #[arg(long)]
    data: PathBuf,

    /// The first row is data, not a header
    #[arg(long, default_value_t = false)]
    no_header: bool,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

/// DTW variant used for the distance matrix.
#[derive(Args, Debug, Clone)]
struct DtwArgs {
    /// Sakoe-Chiba band radius (0 = unconstrained)
    #[arg(long, default_value_t = 0)]
    warping_window: usize,

    /// Enable the globally weighted variant with this cost weight in (0, 1]
    #[arg(long)]
    cost_weight: Option<f64>,
}

/// Per-cluster model parameters.
#[derive(Args, Debug, Clone)]
struct ModelArgs {
    /// Model family: "markov-chain", "semi-markov" or "hidden-markov"
    #[arg(long, default_value = "markov-chain")]
    model: ModelType,

    /// Hidden states of the hidden Markov model
    #[arg(long, default_value_t = 2)]
    n_states: usize,

    /// Longest run length tracked individually by the semi-Markov model
    #[arg(long, default_value_t = 20)]
    max_duration: usize,

    /// Maximum Baum-Welch iterations
    #[arg(long, default_value_t = 100)]
    em_iter: usize,

    /// Baum-Welch log-likelihood tolerance
    #[arg(long, default_value_t = 1e-4)]
    em_tol: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Print the pairwise DTW distance matrix
    Distance {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        dtw: DtwArgs,
    },

    /// Cluster sequences into k groups from the DTW dendrogram alone
    Partition {
        #[command(flatten)]
        input: InputArgs,

        /// Number of clusters
        #[arg(long)]
        k: usize,

        /// Linkage: "average", "complete", "single" or "weighted"
        #[arg(long, default_value = "average")]
        linkage: Linkage,

        #[command(flatten)]
        dtw: DtwArgs,
    },

    /// Run the full pipeline: DTW, hierarchical seed, model refinement
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Number of clusters
        #[arg(long)]
        k: usize,

        /// Linkage for the initial partition
        #[arg(long, default_value = "average")]
        linkage: Linkage,

        /// Stopping metric: "rand-index", "adjusted-rand-index",
        /// "normalized-mutual-information" or "purity"
        #[arg(long, default_value = "rand-index")]
        metric: AgreementMetric,

        /// Agreement between consecutive assignments that counts as converged
        #[arg(long, default_value_t = 0.99)]
        threshold: f64,

        /// Maximum refinement iterations
        #[arg(long, default_value_t = 50)]
        max_iter: usize,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+);
        /// nothing is written without it
        #[arg(long)]
        experiment: Option<String>,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        dtw: DtwArgs,

        #[command(flatten)]
        model: ModelArgs,
    },
}

// --- Output structs for JSON serialization ---

#[derive(Serialize)]
struct DistanceOutput {
    n_sequences: usize,
    ids: Vec<String>,
    max_distance: f64,
    matrix: Vec<Vec<f64>>,
}

#[derive(Serialize)]
struct PartitionOutput {
    k: usize,
    linkage: Linkage,
    n_sequences: usize,
    n_clusters: usize,
    cluster_sizes: Vec<usize>,
    assignments: BTreeMap<String, usize>,
}

#[derive(Serialize)]
struct RunOutput {
    experiment: Option<String>,
    k: usize,
    model: &'static str,
    metric: &'static str,
    state: &'static str,
    converged: bool,
    iterations: usize,
    best_agreement: f64,
    cluster_sizes: Vec<usize>,
    assignments: BTreeMap<String, usize>,
}

fn read_dataset(input: &InputArgs) -> Result<Dataset> {
    let delimiter = u8::try_from(input.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter {:?} is not a single ASCII character", input.delimiter))?;
    CsvSequenceReader::new(&input.data)
        .with_headers(!input.no_header)
        .with_delimiter(delimiter)
        .sequences()
        .context("failed to read input CSV")
}

fn build_dtw(args: &DtwArgs) -> Result<Dtw> {
    let mut dtw = Dtw::symbolic();
    if args.warping_window > 0 {
        dtw = dtw.with_sakoe_chiba(args.warping_window);
    }
    if let Some(cost_weight) = args.cost_weight {
        dtw = dtw
            .with_global_weight(cost_weight)
            .context("invalid --cost-weight")?;
    }
    Ok(dtw)
}

fn label_map(dataset: &Dataset, assignment: &ClusterAssignment) -> BTreeMap<String, usize> {
    dataset
        .ids
        .iter()
        .zip(assignment.labels())
        .map(|(id, label)| (id.to_string(), label.index()))
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Distance { input, dtw } => {
            let dataset = read_dataset(&input)?;
            let matrix = build_dtw(&dtw)?
                .pairwise(&dataset.sequences)
                .context("distance computation failed")?;

            let output = DistanceOutput {
                n_sequences: dataset.len(),
                ids: dataset.ids.iter().map(ToString::to_string).collect(),
                max_distance: matrix.max(),
                matrix: matrix.to_rows(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Partition {
            input,
            k,
            linkage,
            dtw,
        } => {
            let dataset = read_dataset(&input)?;
            let matrix = build_dtw(&dtw)?
                .pairwise(&dataset.sequences)
                .context("distance computation failed")?;
            let assignment = HierarchicalConfig::new(k)?
                .with_linkage(linkage)
                .fit(&matrix)
                .context("hierarchical clustering failed")?;

            let output = PartitionOutput {
                k,
                linkage,
                n_sequences: dataset.len(),
                n_clusters: assignment.n_clusters(),
                cluster_sizes: assignment.cluster_sizes(),
                assignments: label_map(&dataset, &assignment),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Run {
            input,
            k,
            linkage,
            metric,
            threshold,
            max_iter,
            experiment,
            output_dir,
            dtw,
            model,
        } => {
            // Validate the name before any work is done.
            let experiment_name = experiment.clone().map(ExperimentName::new).transpose()?;
            let dataset = read_dataset(&input)?;

            let model_config = ModelConfig::new(dataset.alphabet_size())?
                .with_n_states(model.n_states)
                .with_max_duration(model.max_duration)
                .with_max_iter(model.em_iter)
                .with_tolerance(model.em_tol)
                .with_seed(cli.seed);
            let config = ConvergenceConfig::new(k)?
                .with_dtw(build_dtw(&dtw)?)
                .with_linkage(linkage)
                .with_model_type(model.model)
                .with_model_config(model_config)
                .with_metric(metric)
                .with_similarity_threshold(threshold)?
                .with_max_iterations(max_iter);

            let result = config
                .fit(&dataset.sequences)
                .context("clustering failed")?;

            if let Some(name) = experiment_name {
                let writer = ResultWriter::new(&output_dir, name)?;
                writer.write_run(&dataset.ids, &result)?;
                writer.write_assignments(&dataset.ids, result.final_assignment())?;
            }

            let output = RunOutput {
                experiment,
                k,
                model: model.model.name(),
                metric: metric.name(),
                state: result.state().name(),
                converged: result.converged(),
                iterations: result.iterations(),
                best_agreement: result.best_agreement(),
                cluster_sizes: result.final_assignment().cluster_sizes(),
                assignments: label_map(&dataset, result.final_assignment()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
