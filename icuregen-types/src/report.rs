use crate::workspace::BuildWorkspace;
use serde::{Deserialize, Serialize};

/// Summary of one convergence run, written as `icuregen.report.v1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenReport {
    pub schema: String,
    pub tool: ReportToolInfo,
    pub run: ReportRunInfo,

    /// Full builds performed (always at least one on success).
    pub builds: u32,

    /// Derived-file regenerations performed, including the final unchanged one.
    pub derived_file_runs: u32,

    /// Upper bound on builds that was in force.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,

    #[serde(default)]
    pub workspaces: Vec<BuildWorkspace>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_workspace: Option<BuildWorkspace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRunInfo {
    pub started_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl RegenReport {
    pub fn new(tool: ReportToolInfo, started_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            schema: crate::schema::ICUREGEN_REPORT_V1.to_string(),
            tool,
            run: ReportRunInfo {
                started_at: started_at.to_rfc3339(),
                ended_at: None,
                duration_ms: None,
            },
            builds: 0,
            derived_file_runs: 0,
            max_iterations: None,
            workspaces: Vec::new(),
            final_workspace: None,
        }
    }

    /// Stamp the end time and duration.
    pub fn finish(
        &mut self,
        started_at: chrono::DateTime<chrono::Utc>,
        ended_at: chrono::DateTime<chrono::Utc>,
    ) {
        self.run.ended_at = Some(ended_at.to_rfc3339());
        let ms = (ended_at - started_at).num_milliseconds().max(0);
        self.run.duration_ms = Some(ms as u64);
    }
}
