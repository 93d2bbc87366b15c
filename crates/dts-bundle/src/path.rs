//! Path normalization
//!
//! Turns filesystem paths into module identifiers: forward-slash strings relative
//! to one of three bases (the temporary declaration root, the project root or the
//! working directory), optionally prefixed with the package name and stripped of
//! their `.d.ts` style extension.
//!
//! All path arithmetic is lexical. Nothing here touches the filesystem except the
//! optional "is this a regular file" check guarding extension stripping.

use std::path::{Component, Path, PathBuf};

/// Directory a path is made relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    /// Temporary directory the compiler wrote declarations into
    Temp,
    /// Root of the package being bundled
    Project,
    /// Process working directory
    Cwd,
}

/// Options for a single [`PathNormalizer::normalize`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub base: BaseKind,
    /// Prepend `<package-name>/`
    pub add_prefix: bool,
    /// Drop the trailing extension (and a following `.d`)
    pub strip_extension: bool,
    /// Skip the regular-file check before stripping
    pub assume_exists: bool,
}

impl NormalizeOptions {
    pub fn new(base: BaseKind) -> Self {
        Self {
            base,
            add_prefix: false,
            strip_extension: false,
            assume_exists: false,
        }
    }

    pub fn with_prefix(mut self) -> Self {
        self.add_prefix = true;
        self
    }

    pub fn stripping_extension(mut self) -> Self {
        self.strip_extension = true;
        self
    }

    pub fn assuming_exists(mut self) -> Self {
        self.assume_exists = true;
        self
    }
}

/// Converts paths into module identifiers for one package
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    tmp_root: PathBuf,
    project_root: PathBuf,
    cwd: PathBuf,
    package_name: String,
}

impl PathNormalizer {
    /// Create a normalizer. Relative roots are resolved against `cwd`.
    pub fn new(
        tmp_root: impl AsRef<Path>,
        project_root: impl AsRef<Path>,
        cwd: impl AsRef<Path>,
        package_name: impl Into<String>,
    ) -> Self {
        let cwd = lexical_normalize(cwd.as_ref());
        Self {
            tmp_root: absolutize(tmp_root.as_ref(), &cwd),
            project_root: absolutize(project_root.as_ref(), &cwd),
            cwd,
            package_name: package_name.into(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Absolute directory for a base kind
    pub fn base(&self, kind: BaseKind) -> &Path {
        match kind {
            BaseKind::Temp => &self.tmp_root,
            BaseKind::Project => &self.project_root,
            BaseKind::Cwd => &self.cwd,
        }
    }

    /// Normalize `path` into a module identifier.
    ///
    /// Relative inputs are taken relative to the working directory before the
    /// base is applied, so an identifier normalized against [`BaseKind::Cwd`]
    /// comes back unchanged.
    pub fn normalize(&self, path: impl AsRef<Path>, options: NormalizeOptions) -> String {
        let absolute = absolutize(path.as_ref(), &self.cwd);
        let relative = relative_path(self.base(options.base), &absolute);
        let mut id = to_slash(&relative);

        if options.strip_extension && (options.assume_exists || absolute.is_file()) {
            id = strip_extension(&id);
        }

        if options.add_prefix {
            id = format!("{}/{}", self.package_name, id);
        }

        id
    }
}

/// Remove the last segment's extension, then a trailing `.d` if one remains.
pub fn strip_extension(id: &str) -> String {
    let segment_start = id.rfind('/').map(|i| i + 1).unwrap_or(0);
    let mut stripped = match id[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => id[..segment_start + dot].to_string(),
        _ => id.to_string(),
    };
    if stripped.len() > segment_start + 2 && stripped.ends_with(".d") {
        stripped.truncate(stripped.len() - 2);
    }
    stripped
}

/// Collapse `.` and `..` components without consulting the filesystem
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Resolve `path` against `cwd` if it is relative, then normalize
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        lexical_normalize(path)
    } else {
        lexical_normalize(&cwd.join(path))
    }
}

/// Lexical path from `base` to `target`, using `..` when `target` lies outside
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base: Vec<Component> = base.components().collect();
    let target: Vec<Component> = target.components().collect();

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base.len() {
        result.push("..");
    }
    for component in &target[common..] {
        result.push(component.as_os_str());
    }
    result
}

/// Join components with `/` regardless of platform
fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "/")
}

/// Walk up from `start_dir` looking for a `package.json`
pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        if current.join("package.json").is_file() {
            return Some(current.to_path_buf());
        }

        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> PathNormalizer {
        PathNormalizer::new("/work/tmp", "/work/project", "/work", "pkg")
    }

    #[test]
    fn test_relative_to_temp_root() {
        let n = normalizer();
        let id = n.normalize(
            "/work/tmp/a/b.d.ts",
            NormalizeOptions::new(BaseKind::Temp)
                .with_prefix()
                .stripping_extension()
                .assuming_exists(),
        );
        assert_eq!(id, "pkg/a/b");
    }

    #[test]
    fn test_relative_input_uses_cwd() {
        let n = normalizer();
        let id = n.normalize("project/src/index.ts", NormalizeOptions::new(BaseKind::Project));
        assert_eq!(id, "src/index.ts");
    }

    #[test]
    fn test_outside_base_uses_parent_segments() {
        let n = normalizer();
        let id = n.normalize("/work/other/x", NormalizeOptions::new(BaseKind::Project));
        assert_eq!(id, "../other/x");
    }

    #[test]
    fn test_strip_requires_existing_file() {
        let n = normalizer();
        let id = n.normalize(
            "/work/tmp/missing.d.ts",
            NormalizeOptions::new(BaseKind::Temp).stripping_extension(),
        );
        assert_eq!(id, "missing.d.ts");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("pkg/index.d.ts"), "pkg/index");
        assert_eq!(strip_extension("pkg/index.ts"), "pkg/index");
        assert_eq!(strip_extension("pkg/v1.2/index"), "pkg/v1.2/index");
        assert_eq!(strip_extension("pkg/.hidden"), "pkg/.hidden");
        assert_eq!(strip_extension("pkg/a.d"), "pkg/a");
    }

    #[test]
    fn test_cwd_normalization_is_idempotent() {
        let n = normalizer();
        let options = NormalizeOptions::new(BaseKind::Cwd).assuming_exists();
        let once = n.normalize("pkg/a/c", options);
        let twice = n.normalize(&once, options);
        assert_eq!(once, "pkg/a/c");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_lexical_normalize() {
        assert_eq!(
            lexical_normalize(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
        assert_eq!(lexical_normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(lexical_normalize(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn test_find_project_root() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        std::fs::write(root.join("package.json"), r#"{"name":"x"}"#).unwrap();
        let nested = root.join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested).unwrap(), root);
    }
}
