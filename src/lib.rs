//! Tab strip WebUI source preparation
//!
//! Fetches the Chromium tab strip sources at the newest Canary tag and turns
//! them into a flat `out/` tree a standalone TypeScript build can consume.

pub mod config;
pub mod download;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod preprocess;
pub mod transform;

pub use config::{BuildConfig, PreprocessorKind};
pub use error::BuildError;
pub use pipeline::{Mode, Pipeline, RunReport, Workspace};
