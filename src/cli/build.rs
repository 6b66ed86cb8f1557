//! Build command implementation.
//!
//! Runs the sprite filter over every CSS asset under a source root, then
//! reports per-asset outcomes. With `--json`, a machine-readable report
//! goes to stdout.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::asset::{scan_sources, Asset};
use crate::config::{Config, MANIFEST_FILENAME};
use crate::error::Result;
use crate::filter::{FilterOutcome, SpriteFilter};
use crate::output::{display_path, plural, Printer};

/// Run the sprite filter over CSS assets
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Source root to scan for CSS assets
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Manifest path (default: spritely.yaml under the source root)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Batch all stale stylesheets into one tool invocation
    #[arg(long)]
    pub batch: bool,

    /// Emit a JSON report on stdout
    #[arg(long)]
    pub json: bool,
}

/// One line of the JSON report.
#[derive(Serialize)]
struct ReportEntry {
    source: PathBuf,
    target: PathBuf,
    #[serde(flatten)]
    outcome: FilterOutcome,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let printer = Printer::new();

    let config = load_config(&args)?;
    let filter = SpriteFilter::new(config)?;

    printer.status("Scanning", &display_path(&args.path));
    let sources = scan_sources(&args.path, filter.config());
    if sources.is_empty() {
        printer.warning("Empty", "no CSS assets found");
        return Ok(());
    }

    let mut assets = sources
        .iter()
        .map(|source| Asset::load(&args.path, source))
        .collect::<Result<Vec<_>>>()?;

    let outcomes = filter.run(&mut assets)?;

    let mut passthrough = 0;
    let mut rewritten = 0;
    let mut resolved = 0;
    for (asset, outcome) in assets.iter().zip(&outcomes) {
        match outcome {
            FilterOutcome::Passthrough => passthrough += 1,
            FilterOutcome::Stylesheet { regenerated } => {
                rewritten += 1;
                let verb = if *regenerated { "Generating" } else { "Cached" };
                printer.status(verb, &asset.source_path.display().to_string());
            }
            FilterOutcome::Sprite { image, regenerated } => {
                resolved += 1;
                let verb = if *regenerated { "Generating" } else { "Cached" };
                printer.status(
                    verb,
                    &format!(
                        "{} -> {}",
                        asset.source_path.display(),
                        display_path(image)
                    ),
                );
            }
        }
    }

    printer.success(
        "Finished",
        &format!(
            "{}, {}, {} untouched",
            plural(rewritten, "stylesheet", "stylesheets"),
            plural(resolved, "sprite", "sprites"),
            passthrough
        ),
    );

    if args.json {
        let report: Vec<ReportEntry> = assets
            .into_iter()
            .zip(outcomes)
            .map(|(asset, outcome)| ReportEntry {
                source: asset.source_path,
                target: asset.target_path,
                outcome,
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "[]".to_string())
        );
    }

    Ok(())
}

/// Resolve configuration: explicit --config, else spritely.yaml under the
/// source root, else defaults. The --batch flag overrides the manifest.
fn load_config(args: &BuildArgs) -> Result<Config> {
    let manifest_path = args
        .config
        .clone()
        .unwrap_or_else(|| args.path.join(MANIFEST_FILENAME));

    let mut config = if manifest_path.exists() {
        Config::load(&manifest_path)?
    } else {
        Config::default()
    };

    if args.batch {
        config = Config {
            batch: true,
            ..config
        };
    }

    Ok(config)
}
