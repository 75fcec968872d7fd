use anyhow::Result;
use ignore::{DirEntry, WalkBuilder};
use log::{debug, warn};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Literal name/path fragments that remove matching files and directories
/// from collection.
///
/// A fragment matches when its components appear as a contiguous run of
/// whole components in the path relative to the document root. `venv`
/// matches `venv/` and `tools/venv/` but not `venv2/`; `src/gen` matches
/// `src/gen/` anywhere in the tree. Excluding a directory removes its
/// whole subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    patterns: BTreeSet<Vec<String>>,
}

impl ExclusionSet {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = fragments
            .into_iter()
            .map(|fragment| {
                fragment
                    .as_ref()
                    .split(['/', '\\'])
                    .filter(|part| !part.is_empty() && *part != ".")
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|parts| !parts.is_empty())
            .collect();

        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Checks a path relative to the document root against every fragment.
    pub fn matches(&self, rel_path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let components: Vec<String> = rel_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        self.patterns.iter().any(|pattern| {
            pattern.len() <= components.len()
                && components
                    .windows(pattern.len())
                    .any(|window| window == pattern.as_slice())
        })
    }
}

/// Walk settings for [`collect_files`].
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions<'a> {
    pub excludes: &'a ExclusionSet,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
    /// A file never to collect, typically the document being written.
    pub skip_file: Option<&'a Path>,
}

/// Files found by a walk, in deterministic order.
#[derive(Debug, Default)]
pub struct CollectedFiles {
    pub entries: Vec<DirEntry>,
    /// Walk errors that were logged and skipped.
    pub errors: usize,
}

/// Collects every regular file under `doc_root` in lexicographic order,
/// applying the exclusion set and hidden-file policy.
pub fn collect_files(doc_root: &Path, options: WalkOptions<'_>) -> Result<CollectedFiles> {
    let mut builder = WalkBuilder::new(doc_root);

    builder
        .standard_filters(false)
        .hidden(!options.include_hidden)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));

    if options.respect_gitignore {
        builder
            .git_ignore(true)
            .git_exclude(true)
            .git_global(true)
            .ignore(true)
            .parents(true)
            .require_git(false);
    }

    if !options.excludes.is_empty() {
        let root = doc_root.to_path_buf();
        let excludes = options.excludes.clone();
        builder.filter_entry(move |e| {
            let rel_path = e.path().strip_prefix(&root).unwrap_or(e.path());
            !excludes.matches(rel_path)
        });
    }

    let skip_file: Option<PathBuf> = options.skip_file.and_then(|p| p.canonicalize().ok());

    let mut collected = CollectedFiles::default();

    for result in builder.build() {
        match result {
            Ok(entry) => {
                let path = entry.path();

                if path.is_dir() {
                    continue;
                }

                // Symlinks to regular files are followed; FIFOs, sockets and
                // devices are not.
                if !path.is_file() {
                    if entry.path_is_symlink() && std::fs::metadata(path).is_err() {
                        warn!("Skipping broken symlink: {}", path.display());
                        collected.errors += 1;
                    } else {
                        debug!("Skipping non-regular file: {}", path.display());
                    }
                    continue;
                }

                if let Some(skip) = skip_file.as_deref() {
                    if is_same_file(path, skip) {
                        debug!("Skipping output file: {}", path.display());
                        continue;
                    }
                }

                collected.entries.push(entry);
            }
            Err(err) => {
                warn!("Error walking path: {err}");
                collected.errors += 1;
            }
        }
    }

    Ok(collected)
}

fn is_same_file(path: &Path, canonical: &Path) -> bool {
    path.file_name() == canonical.file_name()
        && path.canonicalize().is_ok_and(|p| p == canonical)
}
