//! Default process- and filesystem-backed port implementations.

use crate::error::{RegenError, RegenResult};
use crate::ports::{ToolInvocation, ToolRunner, WritePort};
use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use std::process::Command;
use tracing::{debug, info};

/// Runs tools as child processes, inheriting stdio so build output streams through.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolRunner;

impl ToolRunner for ProcessToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> RegenResult<()> {
        info!(cwd = %invocation.current_dir, "running {}", invocation);

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&invocation.current_dir)
            .status()
            .map_err(|source| RegenError::ToolLaunch {
                program: invocation.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(RegenError::ToolFailed {
                program: invocation.program.clone(),
                code: status.code(),
            });
        }
        debug!(program = %invocation.program, "tool finished");
        Ok(())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }
}
