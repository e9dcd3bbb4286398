use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vd")]
#[command(about = "Inspect and judge recorded test outcomes", long_about = None)]
pub struct Cli {
    /// Path to a verdict.toml (defaults to the nearest one above the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build one outcome and show its identity, output and verdict
    Inspect {
        /// Outcome name, e.g. java.lang.IntegerTest#testParse
        name: String,

        /// Result the action finished with (e.g. SUCCESS, EXEC_FAILED)
        #[arg(long)]
        result: String,

        /// Output line (repeat for several lines)
        #[arg(long = "output", conflicts_with = "output_file")]
        output: Vec<String>,

        /// Read the output from a file instead
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Expected result (defaults to the configured one)
        #[arg(long)]
        expect: Option<String>,

        /// Text the output is expected to contain
        #[arg(long)]
        expect_output: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Judge a JSON array of outcomes, grouped by suite
    Summarize {
        /// File holding the outcomes
        file: PathBuf,

        /// Expected result for every outcome (defaults to the configured one)
        #[arg(long)]
        expect: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
