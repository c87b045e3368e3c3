use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;

/// Canary releases across the three desktop platforms
const DEFAULT_RELEASES_URL: &str =
    "https://chromiumdash.appspot.com/fetch_releases?channel=Canary&platform=Win64,Linux,Mac";
const DEFAULT_SOURCE_HOST: &str = "https://chromium.googlesource.com/chromium/src";
const DEFAULT_RELEASE_TIMEOUT_SECS: u64 = 10;

/// Which implementation strips platform-conditional directives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PreprocessorKind {
    /// Use grit's script when python and the script are present, else native
    #[default]
    Auto,
    /// Always shell out to `grit/preprocess_if_expr.py`
    Grit,
    /// Always use the built-in directive evaluator
    Native,
}

impl std::str::FromStr for PreprocessorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "grit" => Ok(Self::Grit),
            "native" => Ok(Self::Native),
            other => Err(anyhow::anyhow!("unknown preprocessor '{other}'")),
        }
    }
}

/// Build configuration (defaults reproduce the stock upstream build).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Release-metadata endpoint returning a JSON array of releases
    pub releases_url: String,
    /// Gitiles root of the source tree; archive and file URLs hang off it
    pub source_host: String,
    pub release_timeout_secs: u64,
    pub user_agent: String,
    /// Root holding `in`, `in2`, `grit` and `out`
    pub work_dir: PathBuf,
    /// Hand-maintained sources, relative to `work_dir`
    pub sibling_src_dir: PathBuf,
    /// Image assets, relative to `work_dir`
    pub asset_dir: PathBuf,
    pub preprocessor: PreprocessorKind,
    pub python: String,
    /// Run the import fix-up pass over `out/*.ts` after the build
    pub fix_imports: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            source_host: DEFAULT_SOURCE_HOST.to_string(),
            release_timeout_secs: DEFAULT_RELEASE_TIMEOUT_SECS,
            user_agent: concat!("tabstrip-builder/", env!("CARGO_PKG_VERSION")).to_string(),
            work_dir: PathBuf::from("."),
            sibling_src_dir: PathBuf::from("../src"),
            asset_dir: PathBuf::from("../strip"),
            preprocessor: PreprocessorKind::Auto,
            python: "python3".to_string(),
            fix_imports: false,
        }
    }
}

impl BuildConfig {
    /// Load defaults, then the optional TOML file, then `TABSTRIP_*` overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            None => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TABSTRIP_RELEASES_URL") {
            self.releases_url = url;
        }
        if let Ok(host) = std::env::var("TABSTRIP_SOURCE_HOST") {
            self.source_host = host;
        }
        if let Ok(secs) = std::env::var("TABSTRIP_RELEASE_TIMEOUT") {
            match secs.parse::<u64>() {
                Ok(secs) => self.release_timeout_secs = secs,
                Err(_) => warn!("Ignoring invalid TABSTRIP_RELEASE_TIMEOUT={secs}"),
            }
        }
        if let Ok(kind) = std::env::var("TABSTRIP_PREPROCESSOR") {
            match kind.parse() {
                Ok(kind) => self.preprocessor = kind,
                Err(e) => warn!("Ignoring TABSTRIP_PREPROCESSOR: {e}"),
            }
        }
    }

    pub fn release_timeout(&self) -> Duration {
        Duration::from_secs(self.release_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: BuildConfig = toml::from_str(
            r#"
            work_dir = "/tmp/build"
            preprocessor = "native"
            "#,
        )
        .expect("valid config");
        assert_eq!(cfg.work_dir, PathBuf::from("/tmp/build"));
        assert_eq!(cfg.preprocessor, PreprocessorKind::Native);
        assert_eq!(cfg.release_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.source_host, DEFAULT_SOURCE_HOST);
        assert!(!cfg.fix_imports);
    }

    #[test]
    fn preprocessor_kind_parses_case_insensitively() {
        assert_eq!("GRIT".parse::<PreprocessorKind>().unwrap(), PreprocessorKind::Grit);
        assert!("python".parse::<PreprocessorKind>().is_err());
    }
}
