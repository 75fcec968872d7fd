//! # treedoc Library
//!
//! This crate moves source trees in and out of a single block of text:
//!
//! - Collect the text files of a directory tree into one Markdown document,
//!   each file as a path line followed by a fenced code block
//! - Restore the files of such a document back into a directory tree
//!
//! ## Document format
//!
//! ````text
//! src/main.py
//! ```python
//! print("hi")
//! ```
//! ````
//!
//! ## Usage
//!
//! ### To collect a tree:
//!
//! ```rust,no_run
//! use treedoc::{CollectConfig, ExclusionSet, run_collect};
//! use std::path::PathBuf;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CollectConfig {
//!         doc_root: PathBuf::from("my_project"),
//!         output: Some(PathBuf::from("all_code.md")),
//!         excludes: ExclusionSet::new([".git", "target"]),
//!         include_hidden: false,
//!         respect_gitignore: false,
//!         verbosity: 0,
//!     };
//!
//!     let summary = run_collect(&config).await?;
//!     println!("collected {} files", summary.collected);
//!     Ok(())
//! }
//! ```
//!
//! ### To restore files from a document:
//!
//! ```rust,no_run
//! use treedoc::extract_from_markdown;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     extract_from_markdown(Path::new("all_code.md"), Some(Path::new("restored/"))).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
#[cfg(feature = "restore")]
pub mod extractor;
pub mod filewalker;
#[cfg(feature = "restore")]
pub mod format;
pub mod source;
pub mod utils;
pub mod writer;

pub use cli::{CollectConfig, InputSource, RestoreConfig};
pub use error::Error;
#[cfg(feature = "restore")]
pub use extractor::{
    Entry, ParsedDocument, RestoreSummary, extract_from_markdown, parse_document,
    restore_document,
};
pub use filewalker::{ExclusionSet, WalkOptions, collect_files};
pub use source::{Loaded, SourceFile, load_source};
pub use writer::MarkdownWriter;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::fs::File;
use tokio::io::{AsyncWrite, stdout};

/// First line of every collected document. Files starting with it are
/// previous outputs and are never collected again.
pub const OUTPUT_MAGIC_HEADER: &str = "<!-- treedoc: collected source tree -->\n";

/// Counts reported at the end of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub collected: usize,
    pub skipped: usize,
}

/// Collects `config.doc_root` into one document written to `config.output`
/// or standard output.
pub async fn run_collect(config: &CollectConfig) -> Result<CollectSummary> {
    if !config.doc_root.is_dir() {
        return Err(Error::FatalArgument {
            arg: "--doc-root",
            message: format!("'{}' is not a directory", config.doc_root.display()),
        }
        .into());
    }

    let sink: Box<dyn AsyncWrite + Unpin + Send> = match &config.output {
        Some(path) => Box::new(
            File::create(path)
                .await
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        ),
        None => Box::new(stdout()),
    };
    let mut md_writer = MarkdownWriter::new(sink);

    let files = collect_files(
        &config.doc_root,
        WalkOptions {
            excludes: &config.excludes,
            include_hidden: config.include_hidden,
            respect_gitignore: config.respect_gitignore,
            skip_file: config.output.as_deref(),
        },
    )?;

    let mut summary = CollectSummary {
        collected: 0,
        skipped: files.errors,
    };

    md_writer.write_header().await?;

    for entry in &files.entries {
        let path = entry.path();
        let rel_path = path.strip_prefix(&config.doc_root).unwrap_or(path);

        match load_source(path, rel_path) {
            Ok(Loaded::Text(file)) => {
                md_writer.write_entry(&file).await?;
                summary.collected += 1;
            }
            Ok(Loaded::Binary) => {
                warn!("Skipping binary file: {}", rel_path.display());
                summary.skipped += 1;
            }
            Ok(Loaded::NotUtf8) => {
                warn!("Skipping file that is not valid UTF-8: {}", rel_path.display());
                summary.skipped += 1;
            }
            Ok(Loaded::PreviousOutput) => {
                debug!("Skipping previous output: {}", rel_path.display());
            }
            Err(err) => {
                warn!("{err}");
                summary.skipped += 1;
            }
        }
    }

    md_writer.flush().await?;

    info!(
        "collected {} files, skipped {}",
        summary.collected, summary.skipped
    );
    Ok(summary)
}

/// Restores the document named by `config.input` under `config.doc_root`.
#[cfg(feature = "restore")]
pub async fn run_restore(config: &RestoreConfig) -> Result<RestoreSummary> {
    use tokio::io::AsyncReadExt;

    let text = match &config.input {
        InputSource::Stdin => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read document from standard input")?;
            text
        }
        InputSource::File(path) => {
            if !path.is_file() {
                return Err(Error::FatalArgument {
                    arg: "--input",
                    message: format!("'{}' not found", path.display()),
                }
                .into());
            }
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read input file {}", path.display()))?
        }
    };

    debug!("Using document root: {}", config.doc_root.display());

    let summary = restore_document(&text, &config.doc_root).await?;

    info!(
        "restored {} files, skipped {}",
        summary.restored, summary.skipped
    );
    Ok(summary)
}
