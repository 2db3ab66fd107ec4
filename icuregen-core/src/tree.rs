//! Well-known locations inside the Android source tree.

use crate::error::{RegenError, RegenResult};
use camino::{Utf8Path, Utf8PathBuf};

#[derive(Debug, Clone)]
pub struct SourceTree {
    android_root: Utf8PathBuf,
}

impl SourceTree {
    pub fn new(android_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            android_root: android_root.into(),
        }
    }

    pub fn android_root(&self) -> &Utf8Path {
        &self.android_root
    }

    /// `external/icu`
    pub fn icu_dir(&self) -> RegenResult<Utf8PathBuf> {
        existing_dir(&self.android_root.join("external/icu"), "external/icu")
    }

    /// `external/icu/icu4c/source`
    pub fn icu4c_dir(&self) -> RegenResult<Utf8PathBuf> {
        existing_dir(
            &self.icu_dir()?.join("icu4c/source"),
            "external/icu/icu4c/source",
        )
    }

    /// `external/icu/icu4j`
    pub fn icu4j_dir(&self) -> RegenResult<Utf8PathBuf> {
        existing_dir(&self.icu_dir()?.join("icu4j"), "external/icu/icu4j")
    }

    /// Committed copy of `langInfo.txt`.
    pub fn lang_info_file(&self) -> RegenResult<Utf8PathBuf> {
        Ok(self.icu4c_dir()?.join("data/misc/langInfo.txt"))
    }
}

/// Resolve symlinks and require a directory.
fn existing_dir(path: &Utf8Path, what: &str) -> RegenResult<Utf8PathBuf> {
    match path.canonicalize_utf8() {
        Ok(real) if real.is_dir() => Ok(real),
        _ => Err(RegenError::MissingDirectory {
            what: what.to_string(),
            path: path.to_path_buf(),
        }),
    }
}
