//! selfref cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; selfref ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge all inputs and resolve `${self:...}` references
    ///
    /// Reads json from stdin unless any other source is provided (via --input-*)
    Resolve(ResolveCommand),

    /// Print a single value of the resolved document
    Get(GetCommand),
}

#[derive(Parser, Debug)]
pub struct ResolveCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub resolver: ResolverArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Only merge the inputs, keep references as they are
    #[clap(long = "no-resolve")]
    pub no_resolve: bool,
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub resolver: ResolverArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Path of the value, for example `database.hosts[0]`
    pub path: String,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load a file
    ///
    /// Files are merged in the order given, later files take precedence.
    #[clap(short = 'f', long = "input-file")]
    pub files: Vec<PathBuf>,

    /// Load all *.json and *.jsonc files from given directory
    #[clap(short = 'd', long = "input-dir")]
    pub directories: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ResolverArgs {
    /// What to do with references to paths that do not exist
    #[arg(long = "missing", default_value_t)]
    pub missing: MissingReference,

    /// Maximum number of nested reference expansions
    #[arg(long = "max-depth", default_value_t = 64)]
    pub max_depth: usize,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Spaces per indentation level (json only, 0 for compact output)
    #[arg(long = "indent", default_value_t = 2)]
    pub indent: usize,

    /// Write to a file instead of stdout
    #[clap(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum MissingReference {
    /// `null` for whole values, the text "undefined" inside strings
    #[default]
    Undefined,
    /// `null` for whole values, nothing inside strings
    Empty,
    /// Abort with an error
    Error,
}

impl std::fmt::Display for MissingReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingReference::Undefined => f.write_str("undefined"),
            MissingReference::Empty => f.write_str("empty"),
            MissingReference::Error => f.write_str("error"),
        }
    }
}
