//! Platform-conditional preprocessing of staged sources
//!
//! Upstream sources carry `<if expr="...">` blocks that select code per
//! platform. Two strategies implement the same contract: read each named
//! file from the input folder, strip the directives for the given defines,
//! write the result under the same name in the output folder.

mod expr;
mod grit;
mod native;

use std::path::{Path, PathBuf};

use log::info;

use crate::config::PreprocessorKind;
use crate::error::Result;

pub use expr::evaluate;
pub use grit::GritPreprocessor;
pub use native::{NativePreprocessor, strip_conditionals};

/// One preprocessing invocation
#[derive(Debug, Clone)]
pub struct PreprocessJob<'a> {
    pub in_dir: &'a Path,
    pub out_dir: &'a Path,
    pub files: &'a [&'a str],
    pub defines: &'a [(&'a str, bool)],
}

/// Strategy that strips platform-conditional directives
pub trait PlatformPreprocessor {
    fn name(&self) -> &'static str;

    fn process(&self, job: &PreprocessJob<'_>) -> Result<()>;
}

/// Pick the preprocessor for `kind`; `Auto` prefers grit when it can run
pub fn select(
    kind: PreprocessorKind,
    python: &str,
    grit_dir: &Path,
) -> Box<dyn PlatformPreprocessor> {
    let grit = GritPreprocessor::new(python, grit_dir);
    let chosen: Box<dyn PlatformPreprocessor> = match kind {
        PreprocessorKind::Grit => Box::new(grit),
        PreprocessorKind::Native => Box::new(NativePreprocessor),
        PreprocessorKind::Auto if grit.is_available() => Box::new(grit),
        PreprocessorKind::Auto => Box::new(NativePreprocessor),
    };
    info!("Using {} preprocessor", chosen.name());
    chosen
}

/// `name=true|false` as passed on grit's command line
pub fn define_arg(name: &str, value: bool) -> String {
    format!("{name}={value}")
}

fn output_path(job: &PreprocessJob<'_>, file: &str) -> PathBuf {
    job.out_dir.join(file)
}
