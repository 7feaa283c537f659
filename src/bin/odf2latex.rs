//! Command line front end of the converter.

use clap::Parser;
use odf2latex::latex::{LatexConfig, LatexConverter};
use std::path::PathBuf;

/// Convert an OpenDocument text file to LaTeX.
#[derive(Debug, Parser)]
#[clap(name = "odf2latex", version)]
struct Args {
    /// Input document (.odt or .fodt)
    #[clap(value_name = "INPUT")]
    input: PathBuf,

    /// Directory for the .tex file and its artifacts; defaults to the
    /// input's directory
    #[clap(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// YAML configuration file
    #[clap(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log recovered problems and conversion progress
    #[clap(short, long)]
    verbose: bool,
}

fn run(args: Args) -> odf2latex::Result<()> {
    let config = match &args.config {
        Some(path) => LatexConfig::from_yaml_file(path)?,
        None => LatexConfig::default(),
    };
    let converter = LatexConverter::new(config)?;
    let result = converter.convert_file(&args.input)?;
    let dir = match args.output {
        Some(dir) => dir,
        None => args
            .input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default(),
    };
    result.write_all(&dir)?;
    for file in result.files() {
        log::info!("Wrote {}", dir.join(file.name()).display());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
