//! Entry sources: which files go into an archive, and under what names.
//!
//! An [`EntrySource`] is built from explicit files and recursively walked
//! directories. Directory walks consult an [`ExclusionPolicy`]; explicitly
//! named files are always taken. The result is an ordered list of
//! [`SourceEntry`] values whose content is read only when the archive is
//! written.

mod filter;

pub use filter::ExclusionPolicy;

use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// A file on disk and the name it will have in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub path: PathBuf,
}

impl SourceEntry {
    /// Read the file content.
    pub async fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))
    }
}

/// Convert a filesystem path into a forward-slash archive name.
///
/// Root, drive prefix, `.` and `..` components are dropped so the name can
/// never point outside the extraction directory. Returns `None` when no
/// normal component remains.
pub fn archive_name(path: &Path) -> Option<String> {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Ordered collection of files to archive.
#[derive(Debug, Default)]
pub struct EntrySource {
    policy: ExclusionPolicy,
    junk_paths: bool,
    entries: Vec<SourceEntry>,
    seen: HashSet<String>,
}

impl EntrySource {
    pub fn new(policy: ExclusionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Store only file names, dropping directory structure.
    pub fn junk_paths(mut self, enabled: bool) -> Self {
        self.junk_paths = enabled;
        self
    }

    pub fn policy(&self) -> &ExclusionPolicy {
        &self.policy
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SourceEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a path given on the command line: a file is added as is, a
    /// directory is walked.
    pub async fn add_path(&mut self, path: &Path) -> Result<()> {
        let meta = fs::metadata(path)
            .await
            .with_context(|| format!("cannot access {}", path.display()))?;

        if meta.is_dir() {
            self.add_dir(path).await
        } else if meta.is_file() {
            self.add_file(path)
        } else {
            bail!("{} is not a regular file or directory", path.display())
        }
    }

    /// Add one explicit file. The exclusion policy does not apply.
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let Some(name) = archive_name(path) else {
            bail!("{} has no usable archive name", path.display());
        };
        self.push(name, path.to_path_buf());
        Ok(())
    }

    /// Recursively add a directory's files, named under the directory's own
    /// name (`client/src/app.js` for `client`).
    ///
    /// Entries are visited depth-first in name order. Excluded entries are
    /// skipped, and an excluded directory is not descended into. Nested
    /// directories that cannot be read are logged and skipped.
    pub async fn add_dir(&mut self, root: &Path) -> Result<()> {
        let base = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut pending = Vec::new();
        queue_children(&mut pending, read_dir_sorted(root).await?, "");

        while let Some((path, relative)) = pending.pop() {
            if !self.policy.should_include(&relative) {
                debug!(path = %relative, "excluded");
                continue;
            }

            // Follows symlinks.
            let meta = match fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if meta.is_dir() {
                match read_dir_sorted(&path).await {
                    Ok(children) => queue_children(&mut pending, children, &relative),
                    Err(err) => {
                        warn!(dir = %path.display(), error = %err, "skipping unreadable directory");
                    }
                }
            } else if meta.is_file() {
                let name = if base.is_empty() {
                    relative
                } else {
                    format!("{base}/{relative}")
                };
                self.push(name, path);
            } else {
                debug!(path = %path.display(), "skipping special file");
            }
        }

        Ok(())
    }

    fn push(&mut self, name: String, path: PathBuf) {
        let name = if self.junk_paths {
            match name.rsplit('/').next() {
                Some(file_name) => file_name.to_string(),
                None => name,
            }
        } else {
            name
        };

        if !self.seen.insert(name.clone()) {
            warn!(name = %name, path = %path.display(), "duplicate archive name, keeping the first");
            return;
        }

        debug!(name = %name, path = %path.display(), "queued");
        self.entries.push(SourceEntry { name, path });
    }
}

/// Push `children` of `parent` onto the walk stack so they pop in name order.
fn queue_children(
    pending: &mut Vec<(PathBuf, String)>,
    children: Vec<(String, PathBuf)>,
    parent: &str,
) {
    for (file_name, path) in children.into_iter().rev() {
        let relative = if parent.is_empty() {
            file_name
        } else {
            format!("{parent}/{file_name}")
        };
        pending.push((path, relative));
    }
}

/// List a directory's children as (file name, path), sorted by name.
async fn read_dir_sorted(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut read_dir = fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut children = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .with_context(|| format!("failed to read directory {}", dir.display()))?
    {
        children.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }

    children.sort();
    Ok(children)
}
