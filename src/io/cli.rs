//! Command-line interface for extraction, reconstruction and catalog summaries

use crate::analysis::regions::Connectivity;
use crate::io::configuration::{
    CANONICAL_FRAGMENT_SIZE, DEFAULT_DIFF_THRESHOLD, DEFAULT_MIN_REGION_AREA,
    DEFAULT_SIMILARITY_THRESHOLD, PipelineConfig, RegionNumbering,
};
use crate::io::error::Result;
use crate::io::image::{format_size, load_images};
use crate::io::progress::ProgressManager;
use crate::pipeline::{extract_with_progress, reconstruct_to_file, summarize};
use crate::storage::workspace::Workspace;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fragdedup")]
#[command(
    author,
    version,
    about = "Split near-duplicate images into deduplicated fragments and rebuild them"
)]
/// Command-line arguments for the fragment tool
pub struct Cli {
    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available operations
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract and deduplicate fragments from a batch of same-sized images
    Extract(ExtractArgs),
    /// Rebuild one image from its stored fragments
    Reconstruct(ReconstructArgs),
    /// Show record counts and fragment storage size
    Summary {
        /// Output directory of a previous extraction
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Arguments of the `extract` subcommand
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Source images, in image-index order
    #[arg(value_name = "IMAGES", required = true)]
    pub images: Vec<PathBuf>,

    /// Output directory for fragments and the record database
    #[arg(short, long)]
    pub output: PathBuf,

    /// Accumulated luma difference above which pixels differ
    #[arg(short = 't', long, default_value_t = DEFAULT_DIFF_THRESHOLD)]
    pub diff_threshold: u8,

    /// Regions must have more pixels than this to be kept
    #[arg(short = 'a', long, default_value_t = DEFAULT_MIN_REGION_AREA)]
    pub min_area: usize,

    /// Similarity above which a fragment reuses an earlier one
    #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub similarity: f64,

    /// Pixel adjacency for region labeling
    #[arg(short, long, value_enum, default_value_t = ConnectivityArg::Eight)]
    pub connectivity: ConnectivityArg,

    /// Scope in which region ids are unique
    #[arg(long, value_enum, default_value_t = NumberingArg::PerPass)]
    pub region_ids: NumberingArg,
}

impl ExtractArgs {
    /// Pipeline configuration described by these arguments
    pub const fn config(&self) -> PipelineConfig {
        PipelineConfig {
            diff_threshold: self.diff_threshold,
            min_region_area: self.min_area,
            connectivity: self.connectivity.into_connectivity(),
            similarity_threshold: self.similarity,
            canonical_size: CANONICAL_FRAGMENT_SIZE,
            region_numbering: self.region_ids.into_numbering(),
        }
    }
}

/// Arguments of the `reconstruct` subcommand
#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// Output directory of a previous extraction
    #[arg(short, long)]
    pub output: PathBuf,

    /// 1-based index of the image to rebuild
    #[arg(short, long)]
    pub index: usize,

    /// Destination file (defaults to reconstructed_image<INDEX>.png in the output directory)
    #[arg(short, long)]
    pub dest: Option<PathBuf>,
}

/// Connectivity choices accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectivityArg {
    /// Edge neighbours only
    Four,
    /// Edge and diagonal neighbours
    Eight,
}

impl ConnectivityArg {
    const fn into_connectivity(self) -> Connectivity {
        match self {
            Self::Four => Connectivity::Four,
            Self::Eight => Connectivity::Eight,
        }
    }
}

/// Region id scopes accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberingArg {
    /// Each pass numbers its regions from 1
    PerPass,
    /// Non-overlap ids continue after overlap ids
    RunWide,
}

impl NumberingArg {
    const fn into_numbering(self) -> RegionNumbering {
        match self {
            Self::PerPass => RegionNumbering::PerPass,
            Self::RunWide => RegionNumbering::RunWide,
        }
    }
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Default log filter when `RUST_LOG` is unset
    pub const fn default_log_level(&self) -> &'static str {
        if self.quiet { "warn" } else { "info" }
    }
}

/// Install the stderr log subscriber; later calls are no-ops
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Executes the parsed subcommand
pub struct CommandRunner {
    cli: Cli,
}

impl CommandRunner {
    /// Create a runner for the given CLI arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected subcommand
    ///
    /// # Errors
    ///
    /// Returns any error raised by loading images, extraction, reconstruction
    /// or the catalog summary
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Command::Extract(args) => self.extract(args),
            Command::Reconstruct(args) => Self::reconstruct(args),
            Command::Summary { output } => Self::summary(output.clone()),
        }
    }

    fn extract(&self, args: &ExtractArgs) -> Result<()> {
        let start_time = Instant::now();
        let images = load_images(&args.images)?;
        let mut workspace = Workspace::open(args.output.clone())?;
        let (store, storage) = workspace.parts_mut();

        let mut progress = if self.cli.should_show_progress() {
            ProgressManager::new()
        } else {
            ProgressManager::hidden()
        };

        let report =
            extract_with_progress(&images, store, storage, &args.config(), Some(&mut progress))?;

        info!(
            output = %args.output.display(),
            fragments = report.fragments_saved,
            reused = report.duplicates_reused,
            records = report.records_written,
            elapsed_ms = start_time.elapsed().as_millis(),
            "extraction finished"
        );
        Ok(())
    }

    fn reconstruct(args: &ReconstructArgs) -> Result<()> {
        let workspace = Workspace::open_existing(args.output.clone())?;
        let path = reconstruct_to_file(args.index, &workspace, args.dest.as_deref())?;
        info!(index = args.index, path = %path.display(), "reconstruction written");
        Ok(())
    }

    // Allow print for the summary report, which is the command's output
    #[allow(clippy::print_stdout)]
    fn summary(output: PathBuf) -> Result<()> {
        let workspace = Workspace::open_existing(output)?;
        let summary = summarize(workspace.store(), workspace.storage())?;

        for image in &summary.images {
            println!(
                "image {}: {} overlap, {} non-overlap records",
                image.image_index, image.overlap_records, image.non_overlap_records
            );
        }
        println!(
            "{} records referencing {} fragments ({})",
            summary.record_count(),
            summary.fragment_count,
            format_size(summary.fragment_bytes)
        );
        Ok(())
    }
}
