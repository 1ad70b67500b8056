use anyhow::Result;
use clap::Parser;
use couplemap::cli::Cli;
use couplemap::commands::analyze::{run, AnalyzeConfig};
use couplemap::config::CouplingConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    let config = match &cli.config {
        Some(path) => CouplingConfig::from_file(path)?,
        None => {
            let dir = cli.manifest.parent().unwrap_or(std::path::Path::new("."));
            CouplingConfig::discover(dir)?
        }
    };

    run(AnalyzeConfig {
        manifest: cli.manifest,
        assume_toolchain: cli.assume_toolchain,
        config,
    })
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}
