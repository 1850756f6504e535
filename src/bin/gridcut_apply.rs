use clap::{Args, Parser, Subcommand};
use gridcut::{CutEngine, Grid};
use log::info;
use pretty_env_logger;
use std::process::ExitCode;
use std::{error::Error, path::PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    about = "Apply saved cuts to a grid without the interactive front end",
    long_about = None,
    version = env!("GRIDCUT_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Zero every cut bin of a grid and write the result
    Apply {
        #[command(flatten)]
        inputs: Inputs,

        /// Where to write the masked grid (CSV)
        #[clap(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Only check that a mask file matches a grid
    Check {
        #[command(flatten)]
        inputs: Inputs,
    },
}

#[derive(Args, Debug)]
struct Inputs {
    /// Grid file (CSV)
    grid: PathBuf,

    /// Mask file written by gridcut
    mask: PathBuf,
}

fn load(inputs: &Inputs) -> Result<(CutEngine, Grid), Box<dyn Error>> {
    let grid = Grid::try_from(&inputs.grid)?;
    let mut engine = CutEngine::new();
    engine.register(&grid)?;
    engine.load_mask(&inputs.mask)?;
    Ok((engine, grid))
}

fn entrypoint() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Apply { inputs, output } => {
            let (mut engine, mut grid) = load(&inputs)?;
            let cut = engine.apply_cuts(&mut grid)?;
            grid.write_to_file(&output)?;
            info!("Masked grid was written to {}", output.display());
            let lost = engine.data_lost_fraction(0)?;
            println!(
                "{}: {} of {} bins cut, {:.2}% of the content removed",
                grid.name(),
                cut,
                grid.binning().nbins(),
                100.0 * lost
            );
        }
        Command::Check { inputs } => {
            let (mut engine, grid) = load(&inputs)?;
            let cut = engine.mask()?.iter().filter(|&&cut| cut).count();
            println!(
                "{} matches {} ({} bins cut)",
                inputs.mask.display(),
                grid.name(),
                cut
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}
