//! Embeddable core library for icuregen.
//!
//! Provides a clap-free entry point for regenerating ICU data artifacts in an
//! Android source tree.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`ToolRunner`](ports::ToolRunner): run external build tools
//! - [`DataBuilder`](ports::DataBuilder): the three steps of the convergence loop
//! - [`WritePort`](ports::WritePort): write report files
//!
//! The [`adapters`] module provides default process- and filesystem-backed
//! implementations, and [`icu::IcuToolchain`] implements `DataBuilder` on top of
//! a `ToolRunner`.
//!
//! # Entry points
//!
//! - [`regenerate_until_stable`](pipeline::regenerate_until_stable): rebuild until
//!   `langInfo.txt` converges, then produce the reduced `.dat`

pub mod adapters;
pub mod artifacts;
pub mod error;
pub mod icu;
pub mod pipeline;
pub mod ports;
pub mod settings;
pub mod tree;

pub use error::{RegenError, RegenResult};
pub use icu::IcuToolchain;
pub use settings::RegenSettings;

// Re-export the DTOs so embedders don't need icuregen-types directly.
pub use icuregen_types::{BuildWorkspace, DerivedFileStatus, FilterConfiguration, RegenReport};
