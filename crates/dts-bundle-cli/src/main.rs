//! dts-bundle CLI
//!
//! Compiles a TypeScript project's declarations and merges them into a single
//! `declare module` bundle.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::generate::{self, GenerateArgs};
use output::{resolve_color_choice, StyledOutput};

#[derive(Parser)]
#[command(name = "dts-bundle")]
#[command(about = "Bundle TypeScript declaration files into one module file", long_about = None)]
#[command(version)]
struct Cli {
    /// Color output: auto, always or never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the bundled declaration file
    #[command(alias = "gen")]
    Generate(GenerateArgs),
}

fn main() {
    let cli = Cli::parse();
    let choice = resolve_color_choice(cli.color.as_deref());

    let result = match cli.command {
        Commands::Generate(args) => generate::execute(args, choice),
    };

    if let Err(err) = result {
        let mut out = StyledOutput::new(choice);
        out.stderr_error(&format!("error: {:#}\n", err));
        std::process::exit(1);
    }
}
