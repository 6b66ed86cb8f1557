//! spritely - cache-gated SmartSprites filter
//!
//! A library for integrating the external SmartSprites tool into an
//! asset-processing pipeline: detect sprite directives in CSS content,
//! regenerate outputs through the tool when the cache is stale, and load
//! rewritten stylesheets or resolved sprite images back into assets.

pub mod asset;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod pattern;
pub mod tool;

pub use asset::{detect_asset_kind, scan_sources, Asset, AssetKind};
pub use config::{Config, LogLevel, MANIFEST_FILENAME};
pub use error::{Result, SpritelyError};
pub use filter::directive::{contains_directive, parse_directive, SpriteDirective};
pub use filter::{cache, locate, FilterOutcome, SpriteFilter};
pub use tool::{command_spec, check_output, CommandSpec, SystemRunner, ToolOutput, ToolRunner};
