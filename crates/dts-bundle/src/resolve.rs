//! Reference resolution
//!
//! Rewrites relative references (`./x`, `../y`) into fully-qualified module
//! identifiers so every module block in the bundle can be addressed by name.
//! Package references (`lodash`, `node:fs`) are left alone.

use crate::log::Reporter;
use crate::path::{lexical_normalize, BaseKind, NormalizeOptions, PathNormalizer};
use crate::references::{is_relative, rewrite_line};
use crate::table::ModuleTable;

/// Outcome of resolving one relative reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The candidate identifier is a module in the table
    Known(String),
    /// The candidate was unknown but `<candidate>/index` is known
    Index(String),
    /// Neither matched; `<candidate>/index` is used as a guess
    Guessed(String),
}

impl Resolution {
    pub fn id(&self) -> &str {
        match self {
            Resolution::Known(id) | Resolution::Index(id) | Resolution::Guessed(id) => id,
        }
    }

    pub fn into_id(self) -> String {
        match self {
            Resolution::Known(id) | Resolution::Index(id) | Resolution::Guessed(id) => id,
        }
    }
}

/// Rewrites relative references against a module table
pub struct ReferenceResolver<'a> {
    normalizer: &'a PathNormalizer,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(normalizer: &'a PathNormalizer) -> Self {
        Self { normalizer }
    }

    /// Resolve `raw` as written inside module `source_id`.
    pub fn resolve_path(&self, source_id: &str, raw: &str, table: &ModuleTable) -> Resolution {
        // The module name is treated as a directory, so step up once first.
        let cwd = self.normalizer.base(BaseKind::Cwd);
        let absolute = lexical_normalize(&cwd.join(source_id).join("..").join(raw));
        let candidate = self
            .normalizer
            .normalize(&absolute, NormalizeOptions::new(BaseKind::Cwd).assuming_exists());

        if table.contains(&candidate) {
            return Resolution::Known(candidate);
        }

        let index = format!("{}/index", candidate);
        if table.contains(&index) {
            Resolution::Index(index)
        } else {
            Resolution::Guessed(index)
        }
    }

    /// Rewrite every relative reference in every module. Returns a new table.
    pub fn resolve(&self, table: &ModuleTable, reporter: &mut dyn Reporter) -> ModuleTable {
        let mut rewritten = 0usize;

        let resolved = table.map_texts(|source_id, text| {
            text.iter()
                .map(|line| {
                    rewrite_line(line, |raw| {
                        if !is_relative(raw) {
                            return None;
                        }
                        let resolution = self.resolve_path(source_id, raw, table);
                        if let Resolution::Guessed(guess) = &resolution {
                            reporter.warn(&format!(
                                "Could not resolve '{}' in {}, assuming {}",
                                raw, source_id, guess
                            ));
                        }
                        reporter.debug(&format!(
                            "{}: '{}' -> '{}'",
                            source_id,
                            raw,
                            resolution.id()
                        ));
                        rewritten += 1;
                        Some(resolution.into_id())
                    })
                })
                .collect()
        });

        reporter.verbose(&format!("Resolved {} relative references", rewritten));
        resolved
    }
}
