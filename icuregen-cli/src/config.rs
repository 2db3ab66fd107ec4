//! Configuration file loading for icuregen.
//!
//! Discovers and loads `icuregen.toml` from the current directory (or an
//! explicit `--config` path) and merges it with CLI arguments. CLI arguments,
//! including values clap takes from the environment, win over the file.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use icuregen_core::settings::{DEFAULT_LANG_INFO_OUT, DEFAULT_MAKE_JOBS, DEFAULT_MAX_ITERATIONS};
use icuregen_core::RegenSettings;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "icuregen.toml";

/// Top-level configuration from icuregen.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IcuregenConfig {
    pub paths: PathsConfig,
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Android source tree root, used when `ANDROID_BUILD_TOP` is unset.
    pub android_root: Option<Utf8PathBuf>,

    /// Parent directory for build workspaces.
    pub scratch_dir: Option<Utf8PathBuf>,

    /// Where `LocaleDistanceBuilder` writes `langInfo.txt`.
    pub lang_info_out: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// `make -j` value.
    pub jobs: Option<u32>,

    /// Maximum builds before giving up on convergence.
    pub max_iterations: Option<u32>,

    /// Disable the iteration cap entirely.
    pub unbounded: bool,
}

/// Discover `icuregen.toml` in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<IcuregenConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<IcuregenConfig> {
    let config: IcuregenConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load an explicit config path, or discover one in `dir`, or fall back to defaults.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
) -> anyhow::Result<IcuregenConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => match discover_config(dir) {
            Some(path) => load_config(&path),
            None => Ok(IcuregenConfig::default()),
        },
    }
}

/// Values given on the command line (or via the environment).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub android_root: Option<Utf8PathBuf>,
    pub scratch_dir: Option<Utf8PathBuf>,
    pub lang_info_out: Option<Utf8PathBuf>,
    pub jobs: Option<u32>,
    pub max_iterations: Option<u32>,
    pub unbounded: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: IcuregenConfig,
}

impl ConfigMerger {
    pub fn new(config: IcuregenConfig) -> Self {
        Self { config }
    }

    /// Produce pipeline settings. CLI values override the file, the file
    /// overrides built-in defaults.
    pub fn merge(self, cli: CliOverrides) -> anyhow::Result<RegenSettings> {
        let paths = self.config.paths;
        let build = self.config.build;

        let Some(android_root) = cli.android_root.or(paths.android_root) else {
            anyhow::bail!(
                "ANDROID_BUILD_TOP is not set; run from a lunched shell, \
                 pass --android-root, or set paths.android_root in {}",
                CONFIG_FILE_NAME
            );
        };

        let jobs = cli.jobs.or(build.jobs).unwrap_or(DEFAULT_MAKE_JOBS);
        if jobs == 0 {
            anyhow::bail!("build jobs must be at least 1");
        }

        // The cap is resolved per layer: whichever layer says anything about it
        // (a limit or `unbounded`) decides, and lower layers are not consulted.
        let max_iterations = if cli.unbounded {
            None
        } else if let Some(max) = cli.max_iterations {
            Some(max)
        } else if build.unbounded {
            None
        } else {
            Some(build.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS))
        };
        if max_iterations == Some(0) {
            anyhow::bail!("max_iterations must be at least 1");
        }

        Ok(RegenSettings {
            android_root,
            scratch_root: cli.scratch_dir.or(paths.scratch_dir),
            lang_info_out: cli
                .lang_info_out
                .or(paths.lang_info_out)
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_LANG_INFO_OUT)),
            make_jobs: jobs,
            max_iterations,
        })
    }
}
