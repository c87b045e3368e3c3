//! Text transforms applied to the output tree
//!
//! - `rewrite` - resource-root and loader-line rewriting
//! - `template` - HTML fragment wrapping
//! - `images` - `data:` URI inlining
//! - `imports` - optional post-build import fix-ups

mod images;
mod imports;
mod rewrite;
mod template;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, Result};

pub use images::{EmbedOutcome, data_uri, embed_images, embed_into};
pub use imports::{fix_directory, fix_module};
pub use rewrite::{rewrite_file, rewrite_source};
pub use template::{WRAPPER_SUFFIX, escape_template_literal, render_wrapper, wrap_html};

/// `*.ts` files directly inside `dir`, sorted by name
pub fn typescript_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BuildError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "ts") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
