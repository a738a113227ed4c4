use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};

use crate::app_config::Config;
use crate::download;
use crate::file_utils::FileManager;
use crate::ipe_tools::IpeTools;
use crate::pipeline::{DocumentPaths, DocumentPipeline, Outcome};
use crate::services;

// @module: Batch controller for document translation

/// Options for one batch run
#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    /// Explicit document names; empty means every container in the input
    /// directory
    pub names: Vec<String>,
    /// Substitute source text instead of calling the translation backend
    pub no_translate: bool,
    /// Use containers already present instead of fetching the course page
    pub reuse_downloads: bool,
}

/// Summary of a finished batch
#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.completed + self.skipped + self.failed
    }
}

/// Main application controller for batch document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the batch: acquire containers, then move each document through
    /// the pipeline. A document failure is logged and counted, never
    /// propagated; the batch always runs to the end.
    pub async fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        let dirs = &self.config.directories;
        FileManager::ensure_dir(&dirs.input)?;
        FileManager::ensure_dir(&dirs.work)?;
        FileManager::ensure_dir(&dirs.output)?;

        self.acquire_containers(options).await?;

        let names = self.resolve_names(options)?;
        if names.is_empty() {
            warn!("no documents to process in {}", dirs.input.display());
            return Ok(RunSummary::default());
        }

        let translator = services::create_translator(&self.config)?;
        info!(
            "processing {} document(s) with the {} backend",
            names.len(),
            translator.name()
        );
        let tools = IpeTools::new(&self.config.ipe);
        let mut pipeline = DocumentPipeline::new(&self.config, &tools, translator.as_ref());
        pipeline.no_translate = options.no_translate;

        let progress = ProgressBar::new(names.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut summary = RunSummary::default();
        for name in &names {
            progress.set_message(name.clone());
            let paths = DocumentPaths::for_document(&self.config, name);
            match pipeline.run(&paths).await {
                Ok(Outcome::Completed) => {
                    info!("{}: completed -> {}", name, paths.output.display());
                    summary.completed += 1;
                }
                Ok(Outcome::Skipped(reason)) => {
                    info!("{}: skipped ({})", name, reason);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("{}", e);
                    summary.failed += 1;
                }
            }
            progress.inc(1);
        }
        progress.finish_with_message("done");

        info!(
            "batch finished: {} completed, {} skipped, {} failed",
            summary.completed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Fetch containers from the course page unless reuse was requested or
    /// no page is configured
    async fn acquire_containers(&self, options: &RunOptions) -> Result<()> {
        if options.reuse_downloads {
            info!("reusing containers already in the input directory");
            return Ok(());
        }
        match &self.config.download.course_url {
            Some(url) => {
                let fetched =
                    download::download_containers(url, &self.config.directories.input).await?;
                info!("fetched {} new container(s)", fetched);
            }
            None => info!("no course URL configured, using local containers"),
        }
        Ok(())
    }

    /// Turn explicit names into a worklist, or enumerate the input
    /// directory when none were given
    fn resolve_names(&self, options: &RunOptions) -> Result<Vec<String>> {
        if !options.names.is_empty() {
            for name in &options.names {
                let container = self
                    .config
                    .directories
                    .input
                    .join(format!("{}.pdf", name));
                if !FileManager::file_exists(&container) {
                    return Err(anyhow!("no container for document {:?} at {}", name, container.display()));
                }
            }
            return Ok(options.names.clone());
        }
        let files = FileManager::find_files(&self.config.directories.input, "pdf")
            .context("Failed to list the input directory")?;
        Ok(files
            .iter()
            .map(FileManager::file_stem)
            .collect())
    }
}
