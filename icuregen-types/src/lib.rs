//! Shared DTOs for the icuregen workspace.
//!
//! # Design constraints
//! - Filter configurations are consumed verbatim by ICU's data build tool.
//! - Reports are serialized to disk; prefer adding optional fields over
//!   changing semantics.

pub mod filters;
pub mod report;
pub mod workspace;

pub use filters::{DataFilters, FeatureFilter, FilterConfiguration};
pub use report::RegenReport;
pub use workspace::{BuildWorkspace, DerivedFileStatus};

/// Schema identifiers.
pub mod schema {
    pub const ICUREGEN_REPORT_V1: &str = "icuregen.report.v1";
}
