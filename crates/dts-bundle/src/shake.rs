//! Tree-shaking
//!
//! Keeps only the modules reachable from the entry module by following
//! references. Runs on a resolved table, where every reference to a bundled
//! module is already a full identifier.

use crate::log::Reporter;
use crate::references::references_in;
use crate::table::ModuleTable;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which references the shaker follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShakeStrategy {
    /// Keep every module
    #[default]
    Off,
    /// Follow only `export ... from` references
    ExportOnly,
    /// Follow every static, dynamic and `require` reference
    ReferencedOnly,
}

/// Returned when a strategy name is not recognized
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown shake strategy '{0}' (valid values: {valid})", valid = ShakeStrategy::NAMES.join(", "))]
pub struct UnknownStrategy(pub String);

impl ShakeStrategy {
    /// Canonical names accepted on the command line
    pub const NAMES: [&'static str; 3] = ["off", "exportOnly", "referencedOnly"];

    pub fn as_str(self) -> &'static str {
        match self {
            ShakeStrategy::Off => "off",
            ShakeStrategy::ExportOnly => "exportOnly",
            ShakeStrategy::ReferencedOnly => "referencedOnly",
        }
    }

    /// Parse a strategy name, falling back to [`ShakeStrategy::Off`] with a
    /// warning when the name is unknown.
    pub fn from_name_or_off(name: &str, reporter: &mut dyn Reporter) -> Self {
        match name.parse() {
            Ok(strategy) => strategy,
            Err(err) => {
                reporter.warn(&format!("{}; shaking is disabled", err));
                ShakeStrategy::Off
            }
        }
    }
}

impl FromStr for ShakeStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(ShakeStrategy::Off),
            "exportOnly" => Ok(ShakeStrategy::ExportOnly),
            "referencedOnly" | "allImports" => Ok(ShakeStrategy::ReferencedOnly),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for ShakeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduce `table` to the modules reachable from `entry`.
///
/// The traversal is an iterative depth-first walk with a visited set, so cycles
/// terminate and deep graphs do not grow the call stack. The result lists
/// modules in the order they were first visited.
pub fn shake(
    table: &ModuleTable,
    entry: &str,
    strategy: ShakeStrategy,
    reporter: &mut dyn Reporter,
) -> ModuleTable {
    if strategy == ShakeStrategy::Off {
        return table.clone();
    }

    let mut result = ModuleTable::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![entry];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }

        let Some(text) = table.get(id) else {
            reporter.warn(&format!("no typings for {}", id));
            continue;
        };

        reporter.debug(&format!("Keeping {}", id));
        result.insert(id, text.clone());

        let mut next: Vec<&str> = references_in(text)
            .filter(|r| strategy == ShakeStrategy::ReferencedOnly || r.exported)
            .map(|r| r.path)
            .filter(|path| !visited.contains(path))
            .collect();
        // Reverse so the first reference in the text is walked first.
        next.reverse();
        stack.extend(next);
    }

    reporter.verbose(&format!(
        "Shaking kept {} of {} modules",
        result.len(),
        table.len()
    ));
    result
}
