use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "couplemap")]
#[command(about = "Cross-project type coupling analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the workspace manifest (Cargo.toml) to analyze
    pub manifest: PathBuf,

    /// Use the first detected toolchain without prompting
    #[arg(long = "assume-toolchain")]
    pub assume_toolchain: bool,

    /// Configuration file (defaults to .couplemap.toml beside the manifest)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
