//! Port traits abstracting all process and file I/O away from the pipeline.

use crate::error::RegenResult;
use camino::{Utf8Path, Utf8PathBuf};
use icuregen_types::{BuildWorkspace, DerivedFileStatus};
use std::fmt;

/// A single external tool invocation.
///
/// The working directory is always explicit; the pipeline never changes the
/// working directory of its own process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub current_dir: Utf8PathBuf,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, current_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            current_dir: current_dir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// File name of the program, e.g. `pkgdata` for `/build/icu/bin/pkgdata`.
    pub fn program_name(&self) -> &str {
        Utf8Path::new(&self.program)
            .file_name()
            .unwrap_or(self.program.as_str())
    }

    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.env {
            write!(f, "{k}={v} ")?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external tools to completion. Any non-zero exit is an error.
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> RegenResult<()>;
}

/// The three opaque steps driven by the convergence loop.
pub trait DataBuilder {
    /// Full build in a fresh workspace, copying outputs into the source tree.
    fn build(&mut self) -> RegenResult<BuildWorkspace>;

    /// Regenerate the derived file, committing it when it changed.
    fn regenerate_derived_file(&mut self) -> RegenResult<DerivedFileStatus>;

    /// Committed location of the derived file.
    fn derived_file(&self) -> RegenResult<Utf8PathBuf>;

    /// Reduced-size rebuild of the most recent workspace.
    fn final_build_variant(&mut self, workspace: &BuildWorkspace) -> RegenResult<()>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
}
