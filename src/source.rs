//! Reading collected files and deciding whether they can be embedded.

use crate::OUTPUT_MAGIC_HEADER;
use crate::error::{Error, Result};
use crate::utils::display_rel_path;
use content_inspector::{ContentType, inspect};
use log::debug;
use memmap2::MmapOptions;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Bytes inspected for binary detection.
const SAMPLE_SIZE: usize = 8192;

/// A text file found during collection, with its path relative to the
/// document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub rel_path: PathBuf,
    pub content: String,
}

impl SourceFile {
    /// The path as written on the path line, always with `/` separators.
    pub fn display_path(&self) -> String {
        display_rel_path(&self.rel_path)
    }
}

/// Result of loading one walked file.
#[derive(Debug)]
pub enum Loaded {
    Text(SourceFile),
    Binary,
    NotUtf8,
    /// A document this tool wrote earlier.
    PreviousOutput,
}

/// Reads `path` and classifies it.
pub fn load_source(path: &Path, rel_path: &Path) -> Result<Loaded> {
    let file = File::open(path).map_err(|e| Error::io("failed to open", path, e))?;
    let len = file
        .metadata()
        .map_err(|e| Error::io("failed to stat", path, e))?
        .len();

    if len == 0 {
        debug!("Empty file: {}", rel_path.display());
        return Ok(Loaded::Text(SourceFile {
            rel_path: rel_path.to_path_buf(),
            content: String::new(),
        }));
    }

    // SAFETY: the map is read-only and dropped before this function returns.
    let mmap = unsafe {
        MmapOptions::new()
            .map(&file)
            .map_err(|e| Error::io("failed to mmap", path, e))?
    };

    let sample = &mmap[..std::cmp::min(SAMPLE_SIZE, mmap.len())];
    match inspect(sample) {
        ContentType::BINARY => return Ok(Loaded::Binary),
        ContentType::UTF_8 | ContentType::UTF_8_BOM => {}
        _ => return Ok(Loaded::NotUtf8),
    }

    let content = match std::str::from_utf8(&mmap) {
        Ok(text) => text.to_string(),
        Err(_) => return Ok(Loaded::NotUtf8),
    };

    if content.starts_with(OUTPUT_MAGIC_HEADER) {
        return Ok(Loaded::PreviousOutput);
    }

    Ok(Loaded::Text(SourceFile {
        rel_path: rel_path.to_path_buf(),
        content,
    }))
}
