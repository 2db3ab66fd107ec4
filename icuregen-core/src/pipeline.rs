//! The convergence loop, extracted from the CLI.
//!
//! ICU's `langInfo.txt` is generated by an ICU4J tool that reads the ICU data
//! built from it, so the data is rebuilt until regenerating the file no longer
//! changes it. A final, time-zone-free rebuild then produces the device `.dat`.

use crate::error::{RegenError, RegenResult};
use crate::ports::{DataBuilder, WritePort};
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use icuregen_types::report::{RegenReport, ReportToolInfo};
use icuregen_types::BuildWorkspace;
use tracing::{info, warn};

pub fn tool_info() -> ReportToolInfo {
    ReportToolInfo {
        name: "icuregen".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Build, regenerate the derived file, and repeat until it is stable; then run
/// the final variant build on the last workspace.
///
/// `max_iterations` bounds the number of builds and must be at least 1; `None`
/// loops until the derived file stops changing.
pub fn regenerate_until_stable(
    builder: &mut dyn DataBuilder,
    max_iterations: Option<u32>,
    tool: ReportToolInfo,
) -> RegenResult<RegenReport> {
    if max_iterations == Some(0) {
        return Err(anyhow::anyhow!("max_iterations must be at least 1").into());
    }

    let started_at = Utc::now();
    let mut report = RegenReport::new(tool, started_at);
    report.max_iterations = max_iterations;

    let mut workspace = run_build(builder, &mut report)?;
    loop {
        let status = builder.regenerate_derived_file()?;
        report.derived_file_runs += 1;
        if !status.is_changed() {
            info!(builds = report.builds, "derived file converged");
            break;
        }

        if let Some(max) = max_iterations
            && report.builds >= max
        {
            let derived_file = builder.derived_file()?;
            warn!(
                builds = report.builds,
                "{} did not converge and now holds output no build has used; \
                 revert it or rerun without a cap",
                derived_file
            );
            return Err(RegenError::NotConverged {
                iterations: report.builds,
                derived_file,
            });
        }
        info!("derived file changed, rebuilding");
        workspace = run_build(builder, &mut report)?;
    }

    info!(workspace = %workspace.root, "running final variant build");
    builder.final_build_variant(&workspace)?;
    report.final_workspace = Some(workspace);
    report.finish(started_at, Utc::now());
    Ok(report)
}

fn run_build(
    builder: &mut dyn DataBuilder,
    report: &mut RegenReport,
) -> RegenResult<BuildWorkspace> {
    let workspace = builder.build()?;
    report.builds += 1;
    info!(build = report.builds, workspace = %workspace.root, "build complete");
    report.workspaces.push(workspace.clone());
    Ok(workspace)
}

/// Write the run report as pretty JSON.
pub fn write_report(
    report: &RegenReport,
    path: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    writer.write_file(path, json.as_bytes())
}
