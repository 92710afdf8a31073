use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan",
    version,
    about = "matfx CLI - energy loss, process noise and material-aware step limiting for charged tracks.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tabulate dE/dx against momentum for one particle species and write it as CSV.
    Dedx(DedxArgs),
    /// Propagate a straight track through a slab geometry with full material effects.
    Traverse(TraverseArgs),
}

/// Where the material comes from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct MaterialSource {
    /// Slab geometry file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub geometry: Option<PathBuf>,

    /// Name of a built-in material (e.g., 'silicon', 'iron').
    #[arg(short, long, value_name = "NAME")]
    pub material: Option<String>,
}

/// Arguments for the `dedx` subcommand.
#[derive(Args, Debug)]
pub struct DedxArgs {
    /// Particle name (e.g., 'e-', 'mu+', 'p') or PDG code.
    #[arg(short, long, value_name = "NAME_OR_PDG")]
    pub particle: String,

    #[command(flatten)]
    pub source: MaterialSource,

    /// Directory the `dEdx_<pdg>.csv` table is written to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Settings file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `traverse` subcommand.
#[derive(Args, Debug)]
pub struct TraverseArgs {
    /// Particle name (e.g., 'e-', 'mu+', 'p') or PDG code.
    #[arg(short, long, value_name = "NAME_OR_PDG")]
    pub particle: String,

    /// Initial momentum in GeV/c.
    #[arg(long, value_name = "GEV")]
    pub momentum: f64,

    #[command(flatten)]
    pub source: MaterialSource,

    /// Starting z in cm. Defaults to 1 cm in front of the first layer.
    #[arg(long, value_name = "CM", allow_negative_numbers = true)]
    pub start_z: Option<f64>,

    /// Direction slopes dx/dz and dy/dz.
    #[arg(long, value_names = ["TX", "TY"], num_args = 2, allow_negative_numbers = true)]
    pub slopes: Option<Vec<f64>>,

    /// Total path length in cm. Defaults to reaching 1 cm past the last layer.
    #[arg(long, value_name = "CM")]
    pub max_distance: Option<f64>,

    /// Propagate against the direction of flight.
    #[arg(long)]
    pub backward: bool,

    /// Skip the process-noise calculation.
    #[arg(long)]
    pub no_noise: bool,

    /// Write the per-step table to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Settings file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
