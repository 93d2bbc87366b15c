//! Module table
//!
//! An insertion-ordered map from module identifier to declaration text, plus the
//! loader that fills it from the compiler's temporary output directory.

use crate::log::Reporter;
use crate::path::{BaseKind, NormalizeOptions, PathNormalizer};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Declaration text of one module, one entry per line
pub type DeclarationText = Vec<String>;

/// Suffix of the files the compiler emits
pub const DECLARATION_SUFFIX: &str = ".d.ts";

/// Errors that can occur while loading declaration fragments
#[derive(Debug, Error)]
pub enum LoadError {
    /// The declaration directory could not be enumerated
    #[error("Failed to list declarations in {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A declaration file could not be read
    #[error("Failed to read declaration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered mapping from module identifier to declaration text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTable {
    entries: Vec<(String, DeclarationText)>,
    index: HashMap<String, usize>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module. Replacing an existing key keeps its original position.
    pub fn insert(&mut self, id: impl Into<String>, text: DeclarationText) -> Option<DeclarationText> {
        let id = id.into();
        match self.index.get(&id) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, text)),
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, text));
                None
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&DeclarationText> {
        self.index.get(id).map(|&slot| &self.entries[slot].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in table order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeclarationText)> {
        self.entries.iter().map(|(id, text)| (id.as_str(), text))
    }

    /// Build a new table by transforming every module's text, keeping order.
    pub fn map_texts<F>(&self, mut f: F) -> ModuleTable
    where
        F: FnMut(&str, &DeclarationText) -> DeclarationText,
    {
        self.iter().map(|(id, text)| (id.to_string(), f(id, text))).collect()
    }
}

impl FromIterator<(String, DeclarationText)> for ModuleTable {
    fn from_iter<I: IntoIterator<Item = (String, DeclarationText)>>(iter: I) -> Self {
        let mut table = ModuleTable::new();
        for (id, text) in iter {
            table.insert(id, text);
        }
        table
    }
}

impl IntoIterator for ModuleTable {
    type Item = (String, DeclarationText);
    type IntoIter = std::vec::IntoIter<(String, DeclarationText)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Split file content into declaration lines
pub fn split_lines(content: &str) -> DeclarationText {
    content.lines().map(str::to_string).collect()
}

/// Loads every declaration fragment under the normalizer's temp root
pub struct TableLoader<'a> {
    normalizer: &'a PathNormalizer,
    force: bool,
}

impl<'a> TableLoader<'a> {
    pub fn new(normalizer: &'a PathNormalizer) -> Self {
        Self {
            normalizer,
            force: false,
        }
    }

    /// Skip unreadable directories and files instead of failing
    pub fn best_effort(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Discover, identify and read all fragments
    pub fn load(&self, reporter: &mut dyn Reporter) -> Result<ModuleTable, LoadError> {
        let root = self.normalizer.base(BaseKind::Temp).to_path_buf();
        let mut files = Vec::new();
        self.discover(&root, &mut files, reporter)?;
        reporter.verbose(&format!("Found {} declaration files", files.len()));

        let options = NormalizeOptions::new(BaseKind::Temp)
            .with_prefix()
            .stripping_extension();

        let mut table = ModuleTable::new();
        for path in files {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(source) => {
                    let err = LoadError::Read { path, source };
                    if self.force {
                        reporter.warn(&err.to_string());
                        continue;
                    }
                    return Err(err);
                }
            };

            let id = self.normalizer.normalize(&path, options);
            reporter.debug(&format!("Loaded {} as {}", path.display(), id));
            table.insert(id, split_lines(&content));
        }

        Ok(table)
    }

    /// Recursively collect declaration files, sorted by name within each directory.
    fn discover(
        &self,
        dir: &Path,
        files: &mut Vec<PathBuf>,
        reporter: &mut dyn Reporter,
    ) -> Result<(), LoadError> {
        let entries = match read_sorted_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                let err = LoadError::Discovery {
                    path: dir.to_path_buf(),
                    source,
                };
                if self.force {
                    reporter.warn(&err.to_string());
                    return Ok(());
                }
                return Err(err);
            }
        };

        for (path, file_type) in entries {
            if file_type.is_dir() {
                self.discover(&path, files, reporter)?;
            } else if file_type.is_symlink() && path.is_dir() {
                reporter.debug(&format!("Skipping symlinked directory {}", path.display()));
            } else if is_declaration_file(&path) {
                files.push(path);
            }
        }
        Ok(())
    }
}

/// Directory entries sorted by path; file types are not followed through symlinks.
fn read_sorted_dir(dir: &Path) -> std::io::Result<Vec<(PathBuf, fs::FileType)>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(DECLARATION_SUFFIX))
}
