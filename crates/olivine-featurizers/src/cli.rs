use super::commands;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum FeaturizerKind {
    /// Gaussian symmetry functions (G2 + G4) with default parameters.
    Gaussian,
    /// Angular Fourier Series with the default gaussian bin grid.
    Afs,
}

#[derive(Subcommand)]
enum Commands {
    Featurize {
        /// Structure JSON file.
        #[arg(short, long)]
        input: String,
        /// CSV file to write per-site features to.
        #[arg(short, long)]
        output: String,
        #[arg(short, long, value_enum, default_value = "gaussian")]
        featurizer: FeaturizerKind,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Featurize {
                input,
                output,
                featurizer,
            } => commands::featurize::execute(input, output, featurizer),
        }
    }
}
