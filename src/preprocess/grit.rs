//! grit's `preprocess_if_expr.py` run as a subprocess

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use super::{PlatformPreprocessor, PreprocessJob, define_arg};
use crate::error::{BuildError, Result};

const SCRIPT: &str = "preprocess_if_expr.py";

#[derive(Debug, Clone)]
pub struct GritPreprocessor {
    python: String,
    script: PathBuf,
}

impl GritPreprocessor {
    pub fn new(python: &str, grit_dir: &Path) -> Self {
        Self {
            python: python.to_string(),
            script: grit_dir.join(SCRIPT),
        }
    }

    /// Interpreter on PATH and script unpacked
    pub fn is_available(&self) -> bool {
        which::which(&self.python).is_ok() && self.script.is_file()
    }

    fn command(&self, job: &PreprocessJob<'_>) -> Command {
        let mut cmd = Command::new(&self.python);
        cmd.arg(&self.script)
            .arg("--in-folder")
            .arg(job.in_dir)
            .arg("--out-folder")
            .arg(job.out_dir)
            .arg("--in-files")
            .args(job.files);
        for (name, value) in job.defines {
            cmd.arg("-D").arg(define_arg(name, *value));
        }
        cmd
    }
}

impl PlatformPreprocessor for GritPreprocessor {
    fn name(&self) -> &'static str {
        "grit"
    }

    fn process(&self, job: &PreprocessJob<'_>) -> Result<()> {
        let mut cmd = self.command(job);
        debug!("Running {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            BuildError::Preprocess(format!("failed to run {}: {}", self.python, e))
        })?;

        if !output.status.success() {
            return Err(BuildError::Preprocess(format!(
                "{} exited with {}: {}",
                SCRIPT,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}
