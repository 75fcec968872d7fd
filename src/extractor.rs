//! Recovering files from a round-trip document.
//!
//! The scanner runs over the document one line at a time with two states:
//! looking for a path line, and inside a fenced block. A block preceded by a
//! usable path line becomes an [`Entry`]; anything else is reported and
//! skipped so that one malformed block never stops the rest of the document
//! from being restored.

use crate::error::{Error, Result};
use crate::format::{Fence, clean_path_candidate, is_blank, is_separator, parse_opening_fence};
use anyhow::Context;
use log::{debug, info, trace, warn};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// One decoded (path, content) unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Relative to the destination root, free of `..` and root components.
    pub path: PathBuf,
    pub content: String,
    /// Line number of the path line.
    pub line: usize,
}

/// Everything the scanner recovered from a document.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub entries: Vec<Entry>,
    /// Problems found while scanning, in document order.
    pub problems: Vec<Error>,
    /// Blocks that produced no entry.
    pub skipped: usize,
}

/// Counts reported at the end of a restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: usize,
    pub skipped: usize,
}

enum State<'a> {
    SeekingPath {
        candidate: Option<(String, usize)>,
    },
    InBlock {
        path: Option<(String, usize)>,
        fence: Fence,
        opened_at: usize,
        lines: Vec<&'a str>,
    },
}

struct Scanner<'a> {
    state: State<'a>,
    doc: ParsedDocument,
}

impl<'a> Scanner<'a> {
    fn new() -> Self {
        Self {
            state: State::SeekingPath { candidate: None },
            doc: ParsedDocument::default(),
        }
    }

    fn feed(&mut self, line_no: usize, raw: &'a str) {
        let line = raw.trim_end_matches(['\n', '\r']);
        trace!("Line {line_no}: {line}");

        match &mut self.state {
            State::SeekingPath { candidate } => {
                if let Some((fence, _)) = parse_opening_fence(line) {
                    let path = candidate.take();
                    match &path {
                        Some((p, at)) => {
                            debug!("Entering code block at line {line_no} for '{p}' (path line {at})")
                        }
                        None => {
                            self.doc.problems.push(Error::parse(
                                line_no,
                                "code block has no preceding path line, skipping it",
                            ));
                            self.doc.skipped += 1;
                        }
                    }
                    self.state = State::InBlock {
                        path,
                        fence,
                        opened_at: line_no,
                        lines: Vec::new(),
                    };
                } else if is_blank(line) || is_separator(line) {
                    // Tolerated between a path line and its fence.
                } else {
                    *candidate = clean_path_candidate(line).map(|p| (p, line_no));
                }
            }
            State::InBlock { fence, lines, .. } => {
                if fence.is_closed_by(line) {
                    debug!("Exiting code block at line {line_no}");
                    let state =
                        std::mem::replace(&mut self.state, State::SeekingPath { candidate: None });
                    self.close_block(state, Some(raw.ends_with("\r\n")));
                } else {
                    lines.push(raw);
                }
            }
        }
    }

    /// `closed_crlf` is `None` for a block cut off by the end of the document,
    /// otherwise whether its closing fence line ends in CRLF.
    fn close_block(&mut self, state: State<'a>, closed_crlf: Option<bool>) {
        let State::InBlock {
            path: Some((path, path_line)),
            opened_at,
            lines,
            ..
        } = state
        else {
            return;
        };

        let mut content = lines.concat();
        if let Some(crlf) = closed_crlf {
            // The terminator before the closing fence is part of the fence.
            if content.ends_with('\n') {
                content.pop();
                if crlf && content.ends_with('\r') {
                    content.pop();
                }
            }
        } else {
            self.doc.problems.push(Error::parse(
                opened_at,
                format!("code block for '{path}' is never closed, writing it anyway"),
            ));
        }

        match sanitize_entry_path(&path, path_line) {
            Ok(rel) => self.doc.entries.push(Entry {
                path: rel,
                content,
                line: path_line,
            }),
            Err(err) => {
                self.doc.problems.push(err);
                self.doc.skipped += 1;
            }
        }
    }

    fn finish(mut self) -> ParsedDocument {
        let state = std::mem::replace(&mut self.state, State::SeekingPath { candidate: None });
        let (has_path, has_lines, opened_at) = match &state {
            State::InBlock {
                path,
                lines,
                opened_at,
                ..
            } => (path.is_some(), !lines.is_empty(), *opened_at),
            State::SeekingPath { .. } => return self.doc,
        };

        if has_path && has_lines {
            debug!("End of document reached inside block opened at line {opened_at}");
            self.close_block(state, None);
        } else if has_path {
            self.doc.problems.push(Error::parse(
                opened_at,
                "empty code block is never closed, skipping it",
            ));
            self.doc.skipped += 1;
        }
        self.doc
    }
}

/// Scans a document and returns the entries it encodes. Pure: nothing is
/// written to disk.
pub fn parse_document(text: &str) -> ParsedDocument {
    let mut scanner = Scanner::new();
    for (index, raw) in text.split_inclusive('\n').enumerate() {
        scanner.feed(index + 1, raw);
    }
    scanner.finish()
}

/// Validates a decoded path and returns it as a relative path that cannot
/// leave the directory it is joined onto.
pub fn sanitize_entry_path(path: &str, line: usize) -> Result<PathBuf> {
    let mut rel = PathBuf::new();

    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::PathTraversal {
                    path: path.to_string(),
                    line,
                });
            }
        }
    }

    if rel.as_os_str().is_empty() {
        return Err(Error::parse(line, format!("path '{path}' names no file")));
    }

    Ok(rel)
}

/// Writes one entry under `doc_root`, creating parent directories and
/// overwriting any existing file. Returns the written path.
pub async fn write_entry(doc_root: &Path, entry: &Entry) -> Result<PathBuf> {
    let target = doc_root.join(&entry.path);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io("failed to create directory", parent, e))?;
    }

    fs::write(&target, entry.content.as_bytes())
        .await
        .map_err(|e| Error::io("failed to write", &target, e))?;

    Ok(target)
}

/// Restores every entry of `text` under `doc_root`, which is created if it
/// does not exist.
pub async fn restore_document(text: &str, doc_root: &Path) -> anyhow::Result<RestoreSummary> {
    fs::create_dir_all(doc_root)
        .await
        .with_context(|| format!("Failed to create document root {}", doc_root.display()))?;

    let parsed = parse_document(text);
    for problem in &parsed.problems {
        warn!("{problem}");
    }

    let mut summary = RestoreSummary {
        restored: 0,
        skipped: parsed.skipped,
    };

    for entry in &parsed.entries {
        match write_entry(doc_root, entry).await {
            Ok(target) => {
                info!("Created: {}", target.display());
                debug!("Saved {} bytes to {}", entry.content.len(), target.display());
                summary.restored += 1;
            }
            Err(err) => {
                warn!("line {}: {err}", entry.line);
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}

/// Extracts files from a document on disk. Without `output_root` the files
/// are restored under the current directory.
pub async fn extract_from_markdown(
    input: &Path,
    output_root: Option<&Path>,
) -> anyhow::Result<RestoreSummary> {
    let text = fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read input file {}", input.display()))?;

    let doc_root = match output_root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir()?,
    };

    restore_document(&text, &doc_root).await
}
