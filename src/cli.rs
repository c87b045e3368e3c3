use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;

use tabstrip_builder::PreprocessorKind;

#[derive(Parser, Debug)]
#[command(version, about = "Prepare Chromium tab strip sources for a standalone build")]
pub struct Args {
    /// `copyonly` syncs the hand-written sources into out/ and stops
    pub mode: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Directory holding in/, in2/, grit/ and out/
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// How platform-conditional blocks are stripped
    #[arg(long, value_enum)]
    pub preprocessor: Option<PreprocessorKind>,

    /// Rewire template imports in out/ after the build
    #[arg(long)]
    pub fix_imports: bool,
}

/// Parse `argv`; usage errors are returned instead of exiting with clap's code 2
///
/// `--help` and `--version` still print and exit normally.
pub fn parse_from<I, T>(argv: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(argv) {
        Ok(args) => Ok(args),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => Err(anyhow!(usage_message(&e))),
    }
}

/// First line of clap's rendering without its `error: ` prefix
fn usage_message(e: &clap::Error) -> String {
    let rendered = e.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}
