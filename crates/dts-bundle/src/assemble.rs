//! Bundle assembly
//!
//! Turns the final module table into one declaration file: every module becomes a
//! `declare module '<id>' { ... }` block, followed by an alias statement that
//! points the package name at the main module.

use crate::path::{BaseKind, NormalizeOptions, PathNormalizer};
use crate::table::{DeclarationText, ModuleTable};
use std::path::Path;
use thiserror::Error;

/// Ambient keyword removed from module bodies
pub const AMBIENT_TOKEN: &str = "declare ";

/// Indent applied to every line inside a module block
pub const INDENT: &str = "  ";

/// Placeholder replaced with the main module identifier
pub const MAIN_MODULE_PLACEHOLDER: &str = "{main-module}";

/// Placeholder replaced with the package name
pub const PACKAGE_NAME_PLACEHOLDER: &str = "{package-name}";

/// Alias used when no template is configured
pub const DEFAULT_ALIAS_TEMPLATE: &str = "declare module '{package-name}' {\n  import main = require('{main-module}');\n  export = main;\n}";

/// Errors that can occur while assembling the bundle
#[derive(Debug, Error)]
pub enum AssembleError {
    /// No entry file to derive the main module from
    #[error("No entry file configured; cannot determine the main module")]
    NoEntry,
}

/// Remove every occurrence of the ambient keyword from each line
pub fn strip_ambient(table: &ModuleTable) -> ModuleTable {
    table.map_texts(|_, text| {
        text.iter()
            .map(|line| line.replace(AMBIENT_TOKEN, ""))
            .collect()
    })
}

/// Prefix every line with [`INDENT`]
pub fn indent(table: &ModuleTable) -> ModuleTable {
    table.map_texts(|_, text| text.iter().map(|line| format!("{}{}", INDENT, line)).collect())
}

/// Wrap one module's text in a named module declaration
pub fn wrap(id: &str, text: &DeclarationText) -> String {
    format!("declare module '{}' {{\n{}\n}}", id, text.join("\n"))
}

/// Wrap every module and join the blocks in table order
pub fn join(table: &ModuleTable) -> String {
    table
        .iter()
        .map(|(id, text)| wrap(id, text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Identifier of the main module, derived from the entry file
pub fn main_module(normalizer: &PathNormalizer, entry: Option<&Path>) -> Result<String, AssembleError> {
    let entry = entry.ok_or(AssembleError::NoEntry)?;
    let entry = normalizer.base(BaseKind::Project).join(entry);
    Ok(normalizer.normalize(
        entry,
        NormalizeOptions::new(BaseKind::Project)
            .with_prefix()
            .stripping_extension()
            .assuming_exists(),
    ))
}

/// Substitute both placeholders in an alias template
pub fn render_alias(template: &str, main_module: &str, package_name: &str) -> String {
    template
        .replace(MAIN_MODULE_PLACEHOLDER, main_module)
        .replace(PACKAGE_NAME_PLACEHOLDER, package_name)
}

/// Settings for [`Assembler::assemble`]
#[derive(Debug, Clone, Copy)]
pub struct AliasSettings<'a> {
    pub entry: Option<&'a Path>,
    /// `None` uses [`DEFAULT_ALIAS_TEMPLATE`]
    pub template: Option<&'a str>,
    pub enabled: bool,
}

/// Produces the final bundle text
pub struct Assembler<'a> {
    normalizer: &'a PathNormalizer,
}

impl<'a> Assembler<'a> {
    pub fn new(normalizer: &'a PathNormalizer) -> Self {
        Self { normalizer }
    }

    /// Strip, indent, wrap and join the table, then append the alias.
    ///
    /// The result always ends with a newline.
    pub fn assemble(&self, table: &ModuleTable, alias: AliasSettings<'_>) -> Result<String, AssembleError> {
        let mut output = join(&indent(&strip_ambient(table)));

        if alias.enabled {
            let main = main_module(self.normalizer, alias.entry)?;
            let template = alias.template.unwrap_or(DEFAULT_ALIAS_TEMPLATE);
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&render_alias(template, &main, self.normalizer.package_name()));
        }

        if !output.ends_with('\n') {
            output.push('\n');
        }
        Ok(output)
    }
}
