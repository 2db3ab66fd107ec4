//! Error types for icuregen-core.
//!
//! Distinguishes between:
//! - Tool and runtime failures (exit code 1): a subprocess exited non-zero or
//!   could not be launched, a directory is missing, an I/O operation failed.
//! - Output mismatches (exit code 2): an external build produced an unexpected
//!   number of artifacts, or the derived file never stabilized.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegenError {
    /// An external tool ran and reported failure.
    #[error("`{program}` {}", describe_exit(.code))]
    ToolFailed {
        program: String,
        /// Exit code, or `None` when terminated by a signal.
        code: Option<i32>,
    },

    /// An external tool could not be started at all.
    #[error("failed to launch `{program}`")]
    ToolLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A glob over build outputs did not match the expected number of files.
    #[error(
        "unexpectedly found {} {what} matching {pattern} (expected {expected}): {found:?}",
        .found.len()
    )]
    ArtifactCount {
        what: String,
        pattern: String,
        expected: usize,
        found: Vec<Utf8PathBuf>,
    },

    /// A well-known source tree directory does not exist.
    #[error("{what} directory not found at {path}")]
    MissingDirectory { what: String, path: Utf8PathBuf },

    /// The derived file kept changing until the build cap was reached. Its
    /// committed copy holds output that no build has consumed yet.
    #[error(
        "{derived_file} still changing after {iterations} builds; \
         its committed copy is newer than the last build"
    )]
    NotConverged {
        iterations: u32,
        derived_file: Utf8PathBuf,
    },

    #[error("runtime error: {0:#}")]
    Runtime(#[from] anyhow::Error),
}

impl RegenError {
    /// Returns true if external tools ran but produced unusable output.
    pub fn is_output_mismatch(&self) -> bool {
        matches!(
            self,
            RegenError::ArtifactCount { .. } | RegenError::NotConverged { .. }
        )
    }

    /// Returns the recommended process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_output_mismatch() { 2 } else { 1 }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

pub type RegenResult<T> = Result<T, RegenError>;
