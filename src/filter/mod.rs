//! The sprite filter façade.
//!
//! Per asset the filter moves through a fixed sequence: directive
//! detection, cache freshness, (possibly) tool invocation, output
//! resolution, content loading. Content without a directive passes through
//! untouched. Any failure aborts the asset's processing; there is no
//! fallback to a stale cache entry.
//!
//! Two invocation variants exist. The per-asset variant writes the asset's
//! content to a randomly named temporary file and runs the tool once per
//! asset with the asset's source root as working directory; the temporary
//! input is removed on every path. The batched variant stages all stale
//! assets under the cache mirror and issues a single invocation from the
//! tool's install directory.

pub mod cache;
pub mod directive;
pub mod locate;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::asset::{detect_asset_kind, Asset, AssetKind};
use crate::config::Config;
use crate::error::{Result, SpritelyError};
use crate::tool::{self, SystemRunner, ToolRunner};

/// What the filter did with one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum FilterOutcome {
    /// No sprite directive; content untouched.
    Passthrough,
    /// Content replaced with the rewritten stylesheet.
    Stylesheet { regenerated: bool },
    /// Asset retargeted at the generated sprite image.
    Sprite { image: PathBuf, regenerated: bool },
}

/// The filter façade. Owns a validated configuration and a runner.
#[derive(Debug)]
pub struct SpriteFilter<R: ToolRunner> {
    config: Config,
    runner: R,
}

impl SpriteFilter<SystemRunner> {
    /// Construct a filter that spawns the real tool.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: ToolRunner> SpriteFilter<R> {
    /// Construct a filter with a custom runner. Validates the configuration
    /// up front so a mis-pointed tool path fails here, not mid-run.
    pub fn with_runner(config: Config, runner: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process a run of assets, honouring the configured batching mode.
    pub fn run(&self, assets: &mut [Asset]) -> Result<Vec<FilterOutcome>> {
        if self.config.batch {
            self.process_batch(assets)
        } else {
            assets.iter_mut().map(|a| self.process(a)).collect()
        }
    }

    /// Process one asset through the per-asset variant.
    pub fn process(&self, asset: &mut Asset) -> Result<FilterOutcome> {
        let content = asset.content_str();
        if !directive::contains_directive(&content) {
            return Ok(FilterOutcome::Passthrough);
        }

        let cached = self.cached_path(&asset.source_path);
        let regenerated = if cache::is_stale(&asset.absolute_source(), &cached)? {
            self.regenerate_one(asset)?;
            true
        } else {
            false
        };

        self.load(asset, &content, regenerated)
    }

    /// Process assets with one tool invocation covering every stale one.
    pub fn process_batch(&self, assets: &mut [Asset]) -> Result<Vec<FilterOutcome>> {
        let mut staged = Vec::new();
        let mut regenerated = vec![false; assets.len()];

        for (i, asset) in assets.iter().enumerate() {
            if !directive::contains_directive(&asset.content_str()) {
                continue;
            }

            let cached = self.cached_path(&asset.source_path);
            if cache::is_stale(&asset.absolute_source(), &cached)? {
                staged.push(self.stage(asset)?);
                regenerated[i] = true;
            }
        }

        if !staged.is_empty() {
            let spec = tool::command_spec(
                &self.config,
                &staged,
                &self.config.cache_dir,
                &self.config.tool_home,
            );
            tool::check_output(&self.runner.run(&spec)?)?;
        }

        assets
            .iter_mut()
            .zip(regenerated)
            .map(|(asset, regen)| {
                let content = asset.content_str();
                if directive::contains_directive(&content) {
                    self.load(asset, &content, regen)
                } else {
                    Ok(FilterOutcome::Passthrough)
                }
            })
            .collect()
    }

    /// Canonical cache entry for an asset: the rewritten stylesheet path.
    fn cached_path(&self, source_path: &Path) -> PathBuf {
        cache::rewritten_path(&self.config.cache_dir, source_path, &self.config.css_suffix)
    }

    /// Write the asset's content under the cache mirror for a batched run.
    fn stage(&self, asset: &Asset) -> Result<PathBuf> {
        let staged = cache::cache_path_for(&self.config.cache_dir, &asset.source_path);
        if let Some(parent) = staged.parent() {
            fs::create_dir_all(parent).map_err(|e| SpritelyError::Io {
                path: parent.to_path_buf(),
                message: format!("Failed to create cache directory: {}", e),
            })?;
        }
        fs::write(&staged, &asset.content).map_err(|e| SpritelyError::Io {
            path: staged.clone(),
            message: format!("Failed to stage asset: {}", e),
        })?;
        Ok(staged)
    }

    /// Regenerate one asset's cache entry via a temporary input file.
    ///
    /// The temporary file carries a randomized name so concurrent runs do
    /// not collide, and is removed on success and failure alike. The tool's
    /// rewritten output (temp name + suffix) is moved to the canonical
    /// cache path only after the run is classified as successful.
    fn regenerate_one(&self, asset: &Asset) -> Result<()> {
        let staged_dir = cache::cache_path_for(&self.config.cache_dir, &asset.source_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.cache_dir.clone());
        fs::create_dir_all(&staged_dir).map_err(|e| SpritelyError::Io {
            path: staged_dir.clone(),
            message: format!("Failed to create cache directory: {}", e),
        })?;

        let stem = asset
            .source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".to_string());
        let mut temp = tempfile::Builder::new()
            .prefix(&format!("{}-", stem))
            .suffix(".css")
            .tempfile_in(&staged_dir)
            .map_err(|e| SpritelyError::Io {
                path: staged_dir.clone(),
                message: format!("Failed to create temporary input: {}", e),
            })?;
        temp.write_all(&asset.content)?;
        temp.flush()?;

        let spec = tool::command_spec(
            &self.config,
            &[temp.path().to_path_buf()],
            &self.config.cache_dir,
            &asset.source_root,
        );
        let result = self
            .runner
            .run(&spec)
            .and_then(|out| tool::check_output(&out));

        // The rewritten output sits beside the temp input under a derived
        // name; it is as transient as the input itself.
        let temp_rewritten = cache::with_suffix(temp.path(), &self.config.css_suffix);

        let finished = result.and_then(|()| {
            let cached = self.cached_path(&asset.source_path);
            fs::copy(&temp_rewritten, &cached)
                .map(|_| ())
                .map_err(|e| SpritelyError::Io {
                    path: temp_rewritten.clone(),
                    message: format!("Tool produced no rewritten output: {}", e),
                })
        });

        if temp_rewritten != temp.path() {
            let _ = fs::remove_file(&temp_rewritten);
        }
        // `temp` drops here, removing the input on every path.

        finished
    }

    /// Load resolved output into the asset.
    ///
    /// Descriptors resolve the generated sprite image by glob and retarget
    /// the asset at it; stylesheets take the rewritten CSS from the cache.
    fn load(&self, asset: &mut Asset, content: &str, regenerated: bool) -> Result<FilterOutcome> {
        let kind =
            detect_asset_kind(&asset.source_path, &self.config).unwrap_or(AssetKind::Stylesheet);

        match kind {
            AssetKind::Descriptor => {
                let parsed = directive::parse_directive(content)?;
                let glob = parsed.glob_pattern();
                let image = locate::locate_newest(&self.config.cache_dir, &glob)?;

                asset.content = fs::read(&image).map_err(|e| SpritelyError::Io {
                    path: image.clone(),
                    message: format!("Failed to read generated sprite: {}", e),
                })?;
                asset.target_path = image
                    .strip_prefix(&self.config.cache_dir)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| image.clone());

                Ok(FilterOutcome::Sprite { image, regenerated })
            }
            AssetKind::Stylesheet => {
                let cached = self.cached_path(&asset.source_path);
                asset.content = fs::read(&cached).map_err(|e| SpritelyError::Io {
                    path: cached.clone(),
                    message: format!("Failed to read cached stylesheet: {}", e),
                })?;

                Ok(FilterOutcome::Stylesheet { regenerated })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    const STYLESHEET: &str = "\
/** sprite: icons; sprite-image: url('/img/${sprite}-${date}.png') */
.icon-save { background-image: url('save.png'); /** sprite-ref: icons */ }
";

    const DESCRIPTOR: &str = "\
/** sprite: logo; sprite-image: url('/img/${sprite}-${date}.png'); sprite-layout: vertical */
";

    /// Records invocations and emulates the tool's filesystem effects.
    struct MockRunner {
        calls: RefCell<Vec<tool::CommandSpec>>,
        code: i32,
        stdout: String,
        /// When set, write `<input><suffix>.css` beside each css input.
        rewrite_suffix: Option<String>,
        /// Extra files to create on invocation (generated sprite images).
        creates: Vec<PathBuf>,
    }

    impl MockRunner {
        fn rewriting() -> Self {
            Self {
                calls: RefCell::new(vec![]),
                code: 0,
                stdout: String::new(),
                rewrite_suffix: Some("-sprite".to_string()),
                creates: vec![],
            }
        }

        fn failing(code: i32) -> Self {
            Self {
                calls: RefCell::new(vec![]),
                code,
                stdout: String::new(),
                rewrite_suffix: None,
                creates: vec![],
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl ToolRunner for &MockRunner {
        fn run(&self, spec: &tool::CommandSpec) -> Result<tool::ToolOutput> {
            self.calls.borrow_mut().push(spec.clone());

            if let Some(suffix) = &self.rewrite_suffix {
                let files = spec
                    .args
                    .iter()
                    .skip_while(|a| *a != "--css-files")
                    .skip(1);
                for file in files {
                    let rewritten = cache::with_suffix(Path::new(file), suffix);
                    std::fs::write(rewritten, "rewritten {}").unwrap();
                }
            }

            for path in &self.creates {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).unwrap();
                }
                std::fs::write(path, "png-bytes").unwrap();
            }

            Ok(tool::ToolOutput {
                code: Some(self.code),
                stdout: self.stdout.clone(),
                stderr: if self.code == 0 {
                    String::new()
                } else {
                    "java.io.IOException: boom".to_string()
                },
            })
        }
    }

    struct Fixture {
        source_root: tempfile::TempDir,
        cache_root: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                source_root: tempdir().unwrap(),
                cache_root: tempdir().unwrap(),
            }
        }

        fn config(&self) -> Config {
            Config {
                cache_dir: self.cache_root.path().to_path_buf(),
                ..Default::default()
            }
        }

        fn asset(&self, name: &str, content: &str) -> Asset {
            let path = self.source_root.path().join("css");
            std::fs::create_dir_all(&path).unwrap();
            std::fs::write(path.join(name), content).unwrap();
            Asset::load(self.source_root.path(), &PathBuf::from("css").join(name)).unwrap()
        }

        fn set_mtime(&self, path: &Path, unix_seconds: u64) {
            let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(unix_seconds);
            std::fs::File::options()
                .write(true)
                .open(path)
                .unwrap()
                .set_modified(mtime)
                .unwrap();
        }
    }

    #[test]
    fn test_no_directive_is_passthrough() {
        let fx = Fixture::new();
        let runner = MockRunner::rewriting();
        let filter = SpriteFilter::with_runner(fx.config(), &runner).unwrap();

        let mut asset = fx.asset("plain.css", "body { color: red; }");
        let before = asset.content.clone();

        let outcome = filter.process(&mut asset).unwrap();

        assert_eq!(outcome, FilterOutcome::Passthrough);
        assert_eq!(asset.content, before);
        assert_eq!(runner.call_count(), 0);
    }

    #[test]
    fn test_stale_stylesheet_invokes_tool_and_loads_rewrite() {
        let fx = Fixture::new();
        let runner = MockRunner::rewriting();
        let filter = SpriteFilter::with_runner(fx.config(), &runner).unwrap();

        let mut asset = fx.asset("main.css", STYLESHEET);
        let outcome = filter.process(&mut asset).unwrap();

        assert_eq!(outcome, FilterOutcome::Stylesheet { regenerated: true });
        assert_eq!(runner.call_count(), 1);
        assert_eq!(asset.content_str(), "rewritten {}");
        // Canonical cache entry now exists.
        assert!(fx.cache_root.path().join("css/main-sprite.css").exists());
    }

    #[test]
    fn test_fresh_cache_skips_invocation() {
        let fx = Fixture::new();
        let runner = MockRunner::rewriting();
        let filter = SpriteFilter::with_runner(fx.config(), &runner).unwrap();

        let mut asset = fx.asset("main.css", STYLESHEET);
        fx.set_mtime(&asset.absolute_source(), 1_000_000);

        let cached = fx.cache_root.path().join("css/main-sprite.css");
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, "cached rewrite").unwrap();
        fx.set_mtime(&cached, 2_000_000);

        let outcome = filter.process(&mut asset).unwrap();

        assert_eq!(outcome, FilterOutcome::Stylesheet { regenerated: false });
        assert_eq!(runner.call_count(), 0);
        assert_eq!(asset.content_str(), "cached rewrite");
    }

    #[test]
    fn test_execution_error_surfaces_stderr() {
        let fx = Fixture::new();
        let runner = MockRunner::failing(2);
        let filter = SpriteFilter::with_runner(fx.config(), &runner).unwrap();

        let mut asset = fx.asset("main.css", STYLESHEET);
        let err = filter.process(&mut asset).unwrap_err();

        match err {
            SpritelyError::Execution { code, stderr } => {
                assert_eq!(code, 2);
                assert_eq!(stderr, "java.io.IOException: boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_marker_in_stdout_despite_zero_exit() {
        let fx = Fixture::new();
        let runner = MockRunner {
            calls: RefCell::new(vec![]),
            code: 0,
            stdout: "ERROR: sprite image dir missing".to_string(),
            rewrite_suffix: Some("-sprite".to_string()),
            creates: vec![],
        };
        let filter = SpriteFilter::with_runner(fx.config(), &runner).unwrap();

        let mut asset = fx.asset("main.css", STYLESHEET);
        let err = filter.process(&mut asset).unwrap_err();

        assert!(matches!(err, SpritelyError::ToolReported { .. }));
    }

    #[test]
    fn test_temp_inputs_removed_on_success_and_failure() {
        let fx = Fixture::new();

        let runner = MockRunner::rewriting();
        let filter = SpriteFilter::with_runner(fx.config(), &runner).unwrap();
        let mut asset = fx.asset("main.css", STYLESHEET);
        filter.process(&mut asset).unwrap();

        let failing = MockRunner::failing(1);
        let filter = SpriteFilter::with_runner(fx.config(), &failing).unwrap();
        let mut asset = fx.asset("other.css", STYLESHEET);
        filter.process(&mut asset).unwrap_err();

        // Only the canonical cache entry survives; every temp name
        // (containing the random infix) is gone.
        let staged: Vec<String> = std::fs::read_dir(fx.cache_root.path().join("css"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(staged, vec!["main-sprite.css".to_string()]);
    }

    #[test]
    fn test_descriptor_resolves_newest_sprite_image() {
        let fx = Fixture::new();
        let image_new = fx.cache_root.path().join("img/logo-20240202.png");
        let image_old = fx.cache_root.path().join("img/logo-20230101.png");

        let mut runner = MockRunner::rewriting();
        runner.creates = vec![image_old.clone(), image_new.clone()];
        let filter = SpriteFilter::with_runner(fx.config(), &runner).unwrap();

        let mut asset = fx.asset("logo.sprite.css", DESCRIPTOR);
        let outcome = filter.process(&mut asset).unwrap();

        // Both images land in the same run; path order breaks the tie
        // towards the newer-named file.
        assert!(image_old.exists());
        assert_eq!(
            outcome,
            FilterOutcome::Sprite {
                image: image_new.clone(),
                regenerated: true
            }
        );
        assert_eq!(asset.target_path, PathBuf::from("img/logo-20240202.png"));
        assert_eq!(asset.content, b"png-bytes");
    }

    #[test]
    fn test_descriptor_without_output_is_no_output_found() {
        let fx = Fixture::new();
        let runner = MockRunner::rewriting();
        let filter = SpriteFilter::with_runner(fx.config(), &runner).unwrap();

        let mut asset = fx.asset("logo.sprite.css", DESCRIPTOR);
        let err = filter.process(&mut asset).unwrap_err();

        assert!(matches!(err, SpritelyError::NoOutputFound { .. }));
    }

    #[test]
    fn test_batch_issues_single_invocation() {
        let fx = Fixture::new();
        let runner = MockRunner::rewriting();
        let config = Config {
            batch: true,
            tool_home: fx.source_root.path().to_path_buf(),
            ..fx.config()
        };
        let filter = SpriteFilter::with_runner(config, &runner).unwrap();

        let mut assets = vec![
            fx.asset("a.css", STYLESHEET),
            fx.asset("b.css", STYLESHEET),
            fx.asset("plain.css", "body {}"),
        ];

        let outcomes = filter.run(&mut assets).unwrap();

        assert_eq!(runner.call_count(), 1);
        assert_eq!(
            outcomes,
            vec![
                FilterOutcome::Stylesheet { regenerated: true },
                FilterOutcome::Stylesheet { regenerated: true },
                FilterOutcome::Passthrough,
            ]
        );

        // Both staged inputs travelled in one --css-files list, and the
        // working directory was the tool's install path.
        let calls = runner.calls.borrow();
        let css_files: Vec<&String> = calls[0]
            .args
            .iter()
            .skip_while(|a| *a != "--css-files")
            .skip(1)
            .collect();
        assert_eq!(css_files.len(), 2);
        assert_eq!(calls[0].cwd, fx.source_root.path());
    }

    #[test]
    fn test_batch_with_all_fresh_skips_invocation() {
        let fx = Fixture::new();
        let runner = MockRunner::rewriting();
        let config = Config {
            batch: true,
            ..fx.config()
        };
        let filter = SpriteFilter::with_runner(config, &runner).unwrap();

        let mut asset = fx.asset("main.css", STYLESHEET);
        fx.set_mtime(&asset.absolute_source(), 1_000_000);
        let cached = fx.cache_root.path().join("css/main-sprite.css");
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, "cached rewrite").unwrap();
        fx.set_mtime(&cached, 2_000_000);

        let outcomes = filter.run(std::slice::from_mut(&mut asset)).unwrap();

        assert_eq!(runner.call_count(), 0);
        assert_eq!(
            outcomes,
            vec![FilterOutcome::Stylesheet { regenerated: false }]
        );
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = Config {
            java: PathBuf::from("/nonexistent/jvm/bin/java"),
            ..Default::default()
        };

        let err = SpriteFilter::new(config).unwrap_err();
        assert!(matches!(err, SpritelyError::Configuration { .. }));
    }
}
