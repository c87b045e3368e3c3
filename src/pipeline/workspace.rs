//! Working directories of one build and the file copies between them

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::BuildConfig;
use crate::error::{BuildError, Result};

/// Every directory a build touches, resolved against the work root
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    /// Pristine upstream sources (`in`)
    pub input: PathBuf,
    /// Preprocessed copy of `input` (`in2`)
    pub preprocessed: PathBuf,
    /// Unpacked grit tool tree
    pub grit: PathBuf,
    /// Build artifact consumed by the TypeScript compiler
    pub out: PathBuf,
    pub sibling_src: PathBuf,
    pub assets: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, sibling_src: &Path, assets: &Path) -> Self {
        let root = root.into();
        Self {
            input: root.join("in"),
            preprocessed: root.join("in2"),
            grit: root.join("grit"),
            out: root.join("out"),
            sibling_src: root.join(sibling_src),
            assets: root.join(assets),
            root,
        }
    }

    pub fn from_config(cfg: &BuildConfig) -> Self {
        Self::new(&cfg.work_dir, &cfg.sibling_src_dir, &cfg.asset_dir)
    }

    /// Directories deleted after a successful build
    pub fn staging_dirs(&self) -> [&Path; 3] {
        [&self.input, &self.preprocessed, &self.grit]
    }

    /// Delete and recreate the staging directories and `out`
    pub fn recreate(&self) -> Result<()> {
        for dir in self.staging_dirs().into_iter().chain([self.out.as_path()]) {
            recreate_dir(dir)?;
        }
        Ok(())
    }

    /// Best-effort removal of the staging directories
    pub fn remove_staging(&self) {
        for dir in self.staging_dirs() {
            if let Err(e) = fs::remove_dir_all(dir)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!("Failed to remove {}: {}", dir.display(), e);
            }
        }
    }
}

/// Remove `dir` if present, then create it empty
pub fn recreate_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => debug!("Removed {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(BuildError::io(dir, e)),
    }
    fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))
}

pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst).map_err(|e| BuildError::io(src, e))?;
    Ok(())
}

/// Copy the contents of `src` into `dst` recursively; returns files copied
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BuildError::io(path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BuildError::io(entry.path(), std::io::Error::other(e)))?;
        let target = dst.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| BuildError::io(&target, e))?;
        } else if file_type.is_file() {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
