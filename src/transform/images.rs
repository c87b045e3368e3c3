//! Inline image assets into a generated module as `data:` URIs

use std::fs;
use std::io;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, warn};

use crate::error::{BuildError, Result};
use crate::manifest::ImageAsset;

/// Result of one best-effort substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// The asset was read; `replaced` references were rewritten
    Embedded { asset: &'static str, replaced: usize },
    /// The asset could not be read; the reference was left untouched
    Skipped { asset: &'static str, reason: io::ErrorKind },
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Replace each asset's reference URL in `text` with its data URI
pub fn embed_into(
    text: &str,
    assets: &[ImageAsset],
    asset_dir: &Path,
) -> (String, Vec<EmbedOutcome>) {
    let mut out = text.to_string();
    let mut outcomes = Vec::with_capacity(assets.len());

    for asset in assets {
        let path = asset_dir.join(asset.file_name);
        let outcome = match fs::read(&path) {
            Ok(bytes) => {
                let replaced = out.matches(asset.reference).count();
                out = out.replace(asset.reference, &data_uri(asset.mime, &bytes));
                debug!("Embedded {} ({} references)", asset.file_name, replaced);
                EmbedOutcome::Embedded {
                    asset: asset.file_name,
                    replaced,
                }
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                EmbedOutcome::Skipped {
                    asset: asset.file_name,
                    reason: e.kind(),
                }
            }
        };
        outcomes.push(outcome);
    }
    (out, outcomes)
}

/// Embed `assets` into the module at `path`, rewriting it in place
pub fn embed_images(
    path: &Path,
    assets: &[ImageAsset],
    asset_dir: &Path,
) -> Result<Vec<EmbedOutcome>> {
    let text = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    let (embedded, outcomes) = embed_into(&text, assets, asset_dir);
    fs::write(path, embedded).map_err(|e| BuildError::io(path, e))?;
    Ok(outcomes)
}
