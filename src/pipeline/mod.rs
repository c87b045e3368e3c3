//! Build orchestration
//!
//! Runs every step strictly in order: resolve tag → stage sources →
//! preprocess → wrap/copy into `out` → rewrite → shared modules → images →
//! sibling sync → cleanup. The first failure aborts the run with the step
//! named in the error.

pub mod workspace;

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::BuildConfig;
use crate::download::{Fetch, RemoteSource, extract_tar_gz, resolve_latest};
use crate::manifest::{self, ArchiveSpec};
use crate::preprocess::{self, PlatformPreprocessor, PreprocessJob};
use crate::transform::{self, EmbedOutcome};
pub use workspace::Workspace;
use workspace::{copy_file, copy_tree};

/// What a run does after resolving the tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    /// Only sync the hand-maintained sibling sources into `out`
    CopyOnly,
}

impl Mode {
    /// `copyonly` selects [`Mode::CopyOnly`]; anything else builds fully
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("copyonly") => Self::CopyOnly,
            _ => Self::Full,
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub tag: String,
    pub mode: Mode,
    pub images: Vec<EmbedOutcome>,
}

pub struct Pipeline<F> {
    source: RemoteSource<F>,
    workspace: Workspace,
    config: BuildConfig,
    preprocessor: Option<Box<dyn PlatformPreprocessor>>,
}

impl<F: Fetch> Pipeline<F> {
    pub fn new(fetcher: F, config: BuildConfig) -> Self {
        Self {
            source: RemoteSource::new(fetcher, config.source_host.clone()),
            workspace: Workspace::from_config(&config),
            config,
            preprocessor: None,
        }
    }

    /// Use `preprocessor` instead of the one chosen from configuration
    pub fn with_preprocessor(mut self, preprocessor: Box<dyn PlatformPreprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub async fn run(&self, mode: Mode) -> Result<RunReport> {
        let tag = self.resolve_tag().await?;

        if mode == Mode::CopyOnly {
            self.copy_sibling_sources()?;
            return Ok(RunReport {
                tag,
                mode,
                images: Vec::new(),
            });
        }

        let images = self.build(&tag).await?;
        Ok(RunReport { tag, mode, images })
    }

    pub async fn resolve_tag(&self) -> Result<String> {
        let release = resolve_latest(
            self.source.fetcher(),
            &self.config.releases_url,
            self.config.release_timeout(),
        )
        .await
        .context("Error getting latest release")?;
        Ok(release.version)
    }

    async fn build(&self, tag: &str) -> Result<Vec<EmbedOutcome>> {
        let ws = &self.workspace;
        info!("Building tab strip sources for {}", tag);

        ws.recreate().context("Error creating working directories")?;

        self.fetch_archive(tag, &manifest::TAB_STRIP_ARCHIVE, &ws.input)
            .await
            .context("Error fetching tab_strip")?;
        self.fetch_archive(tag, &manifest::GRIT_ARCHIVE, &ws.grit)
            .await
            .context("Error fetching grit")?;

        let util = self
            .source
            .download_tagged_file(tag, manifest::UTIL_SOURCE)
            .await
            .context("Error downloading util.ts")?;
        let util_path = ws.input.join("util.ts");
        std::fs::write(&util_path, util)
            .with_context(|| format!("Error writing {}", util_path.display()))?;

        copy_tree(&ws.input, &ws.preprocessed).context("Error copying files to in2")?;
        self.preprocess().context("Error preprocessing platform conditionals")?;

        self.populate_out()?;
        self.rewrite_out().context("Error rewriting output modules")?;
        self.download_shared_modules(tag).await?;

        let images = transform::embed_images(
            &ws.out.join(manifest::IMAGE_TARGET),
            manifest::IMAGE_ASSETS,
            &ws.assets,
        )
        .context("Error embedding images")?;

        self.copy_sibling_sources().context("Error in final file copy")?;

        if self.config.fix_imports {
            let changed = transform::fix_directory(&ws.out, manifest::HTML_TEMPLATES)
                .context("Error fixing template imports")?;
            info!("Fixed imports in {} modules", changed);
        }

        ws.remove_staging();
        Ok(images)
    }

    async fn fetch_archive(
        &self,
        tag: &str,
        archive: &ArchiveSpec,
        dest: &Path,
    ) -> Result<()> {
        let url = self.source.archive_url(tag, archive.repo_path);
        info!("Downloading {}", url);
        let data = self.source.download_bytes(&url).await?;
        extract_tar_gz(data, dest).await?;
        Ok(())
    }

    fn preprocess(&self) -> Result<()> {
        let ws = &self.workspace;
        let job = PreprocessJob {
            in_dir: &ws.input,
            out_dir: &ws.preprocessed,
            files: manifest::PREPROCESSED_FILES,
            defines: manifest::PLATFORM_DEFINES,
        };

        match &self.preprocessor {
            Some(preprocessor) => preprocessor.process(&job)?,
            None => {
                preprocess::select(self.config.preprocessor, &self.config.python, &ws.grit)
                    .process(&job)?
            }
        }
        Ok(())
    }

    /// Wrap the HTML templates and copy the verbatim files and directory
    fn populate_out(&self) -> Result<()> {
        let ws = &self.workspace;

        for file in manifest::HTML_TEMPLATES {
            transform::wrap_html(&ws.preprocessed.join(file), &ws.out.join(file))
                .with_context(|| format!("Error converting {file} to wrapper"))?;
        }

        for file in manifest::VERBATIM_FILES {
            copy_file(&ws.preprocessed.join(file), &ws.out.join(file))
                .with_context(|| format!("Error copying {file}"))?;
        }

        copy_tree(
            &ws.input.join(manifest::VERBATIM_DIR),
            &ws.out.join(manifest::VERBATIM_DIR),
        )
        .with_context(|| format!("Error copying {} directory", manifest::VERBATIM_DIR))?;
        Ok(())
    }

    fn rewrite_out(&self) -> Result<()> {
        for path in transform::typescript_files(&self.workspace.out)? {
            transform::rewrite_file(&path)
                .with_context(|| format!("Error processing {}", path.display()))?;
        }
        Ok(())
    }

    async fn download_shared_modules(&self, tag: &str) -> Result<()> {
        for module in manifest::SHARED_MODULES {
            let mut data = self
                .source
                .download_tagged_file(tag, module.repo_path)
                .await
                .with_context(|| format!("Error downloading {}", module.repo_path))?;

            if module.needs_nocheck {
                let mut marked = manifest::NOCHECK_MARKER.as_bytes().to_vec();
                marked.append(&mut data);
                data = marked;
            }

            let name = module
                .repo_path
                .rsplit('/')
                .next()
                .unwrap_or(module.repo_path);
            let out_path = self.workspace.out.join(name);
            std::fs::write(&out_path, data)
                .with_context(|| format!("Error writing {}", out_path.display()))?;
            debug!("Wrote {}", out_path.display());
        }
        Ok(())
    }

    /// Copy the hand-maintained sources from the sibling directory into `out`
    pub fn copy_sibling_sources(&self) -> Result<()> {
        let ws = &self.workspace;
        std::fs::create_dir_all(&ws.out)
            .with_context(|| format!("Error creating {}", ws.out.display()))?;

        for file in manifest::SIBLING_SOURCES {
            copy_file(&ws.sibling_src.join(file), &ws.out.join(file))
                .with_context(|| format!("failed to copy {file}"))?;
        }
        Ok(())
    }
}
