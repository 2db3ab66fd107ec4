//! Clap-free settings for the regeneration pipeline.

use camino::Utf8PathBuf;

/// Where `LocaleDistanceBuilder` writes its output; the path is hard-wired in the tool.
pub const DEFAULT_LANG_INFO_OUT: &str = "/tmp/langInfo.txt";

/// Parallelism passed to `make` for the ICU data build.
pub const DEFAULT_MAKE_JOBS: u32 = 32;

/// Builds allowed before giving up on the derived file converging.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct RegenSettings {
    /// Root of the Android source tree (`ANDROID_BUILD_TOP`).
    pub android_root: Utf8PathBuf,

    /// Parent directory for fresh build workspaces. `None` uses the system temp dir.
    pub scratch_root: Option<Utf8PathBuf>,

    pub lang_info_out: Utf8PathBuf,
    pub make_jobs: u32,

    /// `None` disables the cap.
    pub max_iterations: Option<u32>,
}

impl Default for RegenSettings {
    fn default() -> Self {
        Self {
            android_root: Utf8PathBuf::from("."),
            scratch_root: None,
            lang_info_out: Utf8PathBuf::from(DEFAULT_LANG_INFO_OUT),
            make_jobs: DEFAULT_MAKE_JOBS,
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
        }
    }
}
