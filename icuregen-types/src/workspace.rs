use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Scratch directory holding one full ICU build attempt.
///
/// A workspace is created fresh for every build and never reused for an
/// unrelated one. Removing it is left to whoever owns the scratch root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildWorkspace {
    pub root: Utf8PathBuf,
}

impl BuildWorkspace {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory `runConfigureICU` and `make` run in.
    pub fn icu_build_dir(&self) -> Utf8PathBuf {
        self.root.join("icu")
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Result of regenerating a derived file against its committed copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedFileStatus {
    /// Fresh output differed and has been committed; another build is needed.
    Changed,
    Unchanged,
}

impl DerivedFileStatus {
    pub fn is_changed(self) -> bool {
        matches!(self, DerivedFileStatus::Changed)
    }
}
