pub mod build;
pub mod check;
pub mod completions;
pub mod init;

use clap::{Parser, Subcommand};

/// spritely - cache-gated SmartSprites filter for CSS assets
#[derive(Parser, Debug)]
#[command(name = "spritely")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sprite filter over CSS assets
    Build(build::BuildArgs),

    /// Validate configuration and sprite directives without invoking the tool
    Check(check::CheckArgs),

    /// Initialize a project (generates spritely.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
