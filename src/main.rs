use clap::Parser;
use miette::Result;
use spritely::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => spritely::cli::build::run(args)?,
        Commands::Check(args) => spritely::cli::check::run(args)?,
        Commands::Init(args) => spritely::cli::init::run(args)?,
        Commands::Completions(args) => spritely::cli::completions::run(args)?,
    }

    Ok(())
}
