//! Discovery and copying of build outputs.
//!
//! Every glob over build outputs is paired with an [`ArtifactExpectation`] so a
//! surprising count is caught right after the tool that produced it.

use crate::error::{RegenError, RegenResult};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::{Pattern, glob};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io;
use tracing::debug;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactExpectation {
    ExactlyOne,
    Exactly(usize),
}

impl ArtifactExpectation {
    pub fn count(self) -> usize {
        match self {
            ArtifactExpectation::ExactlyOne => 1,
            ArtifactExpectation::Exactly(n) => n,
        }
    }

    pub fn check(
        self,
        what: &str,
        pattern: &str,
        found: Vec<Utf8PathBuf>,
    ) -> RegenResult<Vec<Utf8PathBuf>> {
        if found.len() == self.count() {
            Ok(found)
        } else {
            Err(RegenError::ArtifactCount {
                what: what.to_string(),
                pattern: pattern.to_string(),
                expected: self.count(),
                found,
            })
        }
    }
}

/// Build a glob pattern rooted at `dir`, escaping any glob syntax in `dir` itself.
pub fn pattern_in(dir: &Utf8Path, suffix: &str) -> String {
    format!("{}/{}", Pattern::escape(dir.as_str()), suffix)
}

/// All paths matching `pattern`, sorted.
pub fn find_artifacts(pattern: &str) -> RegenResult<Vec<Utf8PathBuf>> {
    let mut out = Vec::new();
    for entry in glob(pattern).with_context(|| format!("invalid glob {pattern}"))? {
        let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
        let path = Utf8PathBuf::from_path_buf(path)
            .map_err(|p| anyhow::anyhow!("non UTF-8 path {}", p.display()))?;
        out.push(path);
    }
    out.sort();
    debug!(pattern, matches = out.len(), "globbed build outputs");
    Ok(out)
}

pub fn expect_artifacts(
    what: &str,
    pattern: &str,
    expectation: ArtifactExpectation,
) -> RegenResult<Vec<Utf8PathBuf>> {
    expectation.check(what, pattern, find_artifacts(pattern)?)
}

pub fn expect_one(what: &str, pattern: &str) -> RegenResult<Utf8PathBuf> {
    let mut found = expect_artifacts(what, pattern, ArtifactExpectation::ExactlyOne)?;
    Ok(found.remove(0))
}

/// Locate the single `icudtNNl.dat` produced by an ICU build directory.
pub fn dat_file(icu_build_dir: &Utf8Path) -> RegenResult<Utf8PathBuf> {
    expect_one(
        ".dat files",
        &pattern_in(icu_build_dir, "data/out/tmp/icudt??l.dat"),
    )
}

/// True when both jars exist and hold the same entries with the same
/// uncompressed contents. Entry timestamps and compression settings are ignored,
/// so a rebuilt jar with unchanged data compares equal to the committed one.
pub fn jars_equivalent(a: &Utf8Path, b: &Utf8Path) -> anyhow::Result<bool> {
    if !a.is_file() || !b.is_file() {
        return Ok(false);
    }
    Ok(jar_entry_digests(a)? == jar_entry_digests(b)?)
}

/// Entry name to SHA-256 of its uncompressed bytes.
fn jar_entry_digests(path: &Utf8Path) -> anyhow::Result<BTreeMap<String, String>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path))?;
    let mut archive = ZipArchive::new(file).with_context(|| format!("read jar {}", path))?;
    let mut digests = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("read entry {i} of {}", path))?;
        let mut hasher = Sha256::new();
        io::copy(&mut entry, &mut hasher)
            .with_context(|| format!("inflate {} in {}", entry.name(), path))?;
        digests.insert(entry.name().to_string(), hex::encode(hasher.finalize()));
    }
    Ok(digests)
}

/// Copy `src` into directory `dest_dir`, keeping its file name.
pub fn copy_into(src: &Utf8Path, dest_dir: &Utf8Path) -> RegenResult<Utf8PathBuf> {
    let name = src
        .file_name()
        .with_context(|| format!("{} has no file name", src))?;
    let dest = dest_dir.join(name);
    fs::copy(src, &dest).with_context(|| format!("copy {} to {}", src, dest_dir))?;
    Ok(dest)
}

/// Recursively copy a directory tree. `dest` must not exist yet.
pub fn copy_tree(src: &Utf8Path, dest: &Utf8Path) -> RegenResult<()> {
    fs::create_dir(dest).with_context(|| format!("create {}", dest))?;
    for entry in fs::read_dir(src).with_context(|| format!("read {}", src))? {
        let entry = entry.with_context(|| format!("read entry in {}", src))?;
        let from = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|p| anyhow::anyhow!("non UTF-8 path {}", p.display()))?;
        let Some(name) = from.file_name() else {
            continue;
        };
        let to = dest.join(name);
        if entry
            .file_type()
            .with_context(|| format!("stat {}", from))?
            .is_dir()
        {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).with_context(|| format!("copy {} to {}", from, to))?;
        }
    }
    Ok(())
}
