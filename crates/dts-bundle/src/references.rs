//! Import-like references inside declaration text
//!
//! References are found with regular expressions, not by parsing. Text that only
//! looks like an import (inside a comment or a string) is matched as well.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// `from './x'` and `from "./x"`
static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bfrom\s+(?P<quote>['"])(?P<path>[^'"]+)['"]"#).expect("static regex")
});

/// `import('./x')`
static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\(\s*(?P<quote>['"])(?P<path>[^'"]+)['"]\s*\)"#).expect("static regex")
});

/// `require('./x')`, as in `import x = require('./x')`
static REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\(\s*(?P<quote>['"])(?P<path>[^'"]+)['"]\s*\)"#).expect("static regex")
});

static EXPORT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*export\b").expect("static regex"));

fn patterns() -> [&'static Regex; 3] {
    [&*STATIC_IMPORT, &*DYNAMIC_IMPORT, &*REQUIRE]
}

/// A reference found in one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub path: &'a str,
    /// The line re-exports (`export ... from`)
    pub exported: bool,
}

impl Reference<'_> {
    pub fn is_relative(&self) -> bool {
        is_relative(self.path)
    }
}

pub fn is_relative(path: &str) -> bool {
    path.starts_with('.')
}

/// All references in a line, in pattern order then position order
pub fn references_in_line(line: &str) -> Vec<Reference<'_>> {
    let exported = EXPORT_LINE.is_match(line);
    let mut found = Vec::new();
    for pattern in patterns() {
        for caps in pattern.captures_iter(line) {
            if let Some(path) = caps.name("path") {
                found.push(Reference {
                    path: path.as_str(),
                    exported,
                });
            }
        }
    }
    found
}

/// All references in a block of lines
pub fn references_in<'a>(lines: &'a [String]) -> impl Iterator<Item = Reference<'a>> + 'a {
    lines.iter().flat_map(|line| references_in_line(line))
}

/// Rewrite the path of every reference in `line` for which `rewrite` returns
/// `Some`, keeping the surrounding text and quote characters.
pub fn rewrite_line<F>(line: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut current = line.to_string();
    for pattern in patterns() {
        if !pattern.is_match(&current) {
            continue;
        }
        current = pattern
            .replace_all(&current, |caps: &Captures| {
                let whole = caps.get(0).map_or("", |m| m.as_str());
                let Some(path) = caps.name("path") else {
                    return whole.to_string();
                };
                match rewrite(path.as_str()) {
                    Some(new_path) => {
                        let start = caps.get(0).map_or(0, |m| m.start());
                        let offset = path.start() - start;
                        format!(
                            "{}{}{}",
                            &whole[..offset],
                            new_path,
                            &whole[offset + path.len()..]
                        )
                    }
                    None => whole.to_string(),
                }
            })
            .into_owned();
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_import_quotes() {
        let refs = references_in_line(r#"import { A } from "./a";"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].path, "./a");
        assert!(!refs[0].exported);

        let refs = references_in_line("export * from '../b';");
        assert_eq!(refs[0].path, "../b");
        assert!(refs[0].exported);
    }

    #[test]
    fn test_dynamic_import_and_require() {
        let refs = references_in_line("x: import('./lazy').Lazy; import y = require('./y');");
        let paths: Vec<_> = refs.iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["./lazy", "./y"]);
    }

    #[test]
    fn test_package_reference_is_not_relative() {
        let refs = references_in_line("import { EventEmitter } from 'events';");
        assert!(!refs[0].is_relative());
    }

    #[test]
    fn test_rewrite_only_the_path() {
        let line = r#"export { a } from "./a"; // trailing"#;
        let rewritten = rewrite_line(line, |p| Some(format!("pkg/{}", &p[2..])));
        assert_eq!(rewritten, r#"export { a } from "pkg/a"; // trailing"#);
    }

    #[test]
    fn test_rewrite_skips_when_none() {
        let line = "import { x } from 'lodash';";
        assert_eq!(rewrite_line(line, |_| None), line);
    }

    #[test]
    fn test_rewrite_multiple_in_one_line() {
        let line = "type T = import('./a').A | import('./b').B;";
        let rewritten = rewrite_line(line, |p| Some(p.replace("./", "pkg/")));
        assert_eq!(rewritten, "type T = import('pkg/a').A | import('pkg/b').B;");
    }
}
