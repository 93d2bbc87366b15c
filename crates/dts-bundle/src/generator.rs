//! Generation run
//!
//! A [`Generator`] drives one run from start to finish:
//!
//! 1. read `package.json` for the package name
//! 2. create a temporary directory (removed on every exit path)
//! 3. let the emitter write per-file fragments into it
//! 4. load, resolve, shake and assemble the module table
//! 5. write the bundle to the output path

use crate::assemble::{main_module, AliasSettings, AssembleError, Assembler};
use crate::config::GeneratorOptions;
use crate::emit::{DeclarationEmitter, EmitError, TscEmitter};
use crate::fs_util::{create_dir_all_with_retry, with_retry};
use crate::log::Reporter;
use crate::manifest::{ManifestError, PackageManifest};
use crate::path::{absolutize, PathNormalizer};
use crate::resolve::ReferenceResolver;
use crate::shake::{shake, ShakeStrategy};
use crate::table::{LoadError, TableLoader};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

/// Fatal errors of a generation run
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// package.json missing or invalid
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Declaration fragments could not be listed or read
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    /// The declaration compiler failed and best-effort mode is off
    #[error("Declaration compiler failed: {0}")]
    ExternalTool(#[from] EmitError),

    /// The temporary directory could not be created
    #[error("Failed to create temporary directory in {path}: {source}")]
    TempDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file or its directory could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The working directory could not be determined
    #[error("Failed to determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub output_path: PathBuf,
    /// Module blocks written to the bundle
    pub modules: usize,
}

/// Result of bundling an already-populated declaration directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub text: String,
    pub modules: usize,
}

/// Owns one generation run
pub struct Generator<E = TscEmitter> {
    options: GeneratorOptions,
    emitter: E,
    cwd: Option<PathBuf>,
}

impl Generator<TscEmitter> {
    /// Generator that runs the TypeScript compiler configured in `options`
    pub fn new(options: GeneratorOptions) -> Self {
        let emitter = TscEmitter::new(&options.tsc_command).with_extra_args(options.tsc_args.clone());
        Self::with_emitter(options, emitter)
    }
}

impl<E: DeclarationEmitter> Generator<E> {
    pub fn with_emitter(options: GeneratorOptions, emitter: E) -> Self {
        Self {
            options,
            emitter,
            cwd: None,
        }
    }

    /// Use `cwd` instead of the process working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn working_dir(&self) -> Result<PathBuf, GeneratorError> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().map_err(GeneratorError::WorkingDir),
        }
    }

    /// Run the whole pipeline and write the bundle.
    pub fn generate(&self, reporter: &mut dyn Reporter) -> Result<GenerateOutcome, GeneratorError> {
        let cwd = self.working_dir()?;
        let root = absolutize(&self.options.root, &cwd);

        let manifest = PackageManifest::from_dir(&root)?;
        reporter.info(&format!("Generating declarations for {}", manifest.name));

        let tmp = self.create_temp_dir(&root)?;
        reporter.verbose(&format!("Temporary directory: {}", tmp.path().display()));

        if let Err(err) = self.emitter.emit(&root, tmp.path(), reporter) {
            if !self.options.force {
                return Err(err.into());
            }
            reporter.warn(&format!("{}; continuing with the fragments that exist", err));
        }

        let manifest_types = manifest.types;
        let normalizer = PathNormalizer::new(tmp.path(), &root, &cwd, manifest.name);
        let bundle = self.bundle(&normalizer, reporter)?;

        let output_path = self.options.output_path();
        let output_path = absolutize(&output_path, &cwd);
        check_declared_types(manifest_types.as_deref(), &root, &output_path, reporter);
        write_output(&output_path, &bundle.text)?;
        reporter.info(&format!(
            "Wrote {} modules to {}",
            bundle.modules,
            output_path.display()
        ));

        let tmp_path = tmp.path().to_path_buf();
        if let Err(err) = tmp.close() {
            reporter.warn(&format!(
                "Failed to remove temporary directory {}: {}",
                tmp_path.display(),
                err
            ));
        }

        Ok(GenerateOutcome {
            output_path,
            modules: bundle.modules,
        })
    }

    /// Load, resolve, shake and assemble the fragments under the normalizer's
    /// temp root.
    pub fn bundle(
        &self,
        normalizer: &PathNormalizer,
        reporter: &mut dyn Reporter,
    ) -> Result<Bundle, GeneratorError> {
        let table = TableLoader::new(normalizer)
            .best_effort(self.options.force)
            .load(reporter)?;
        reporter.info(&format!("Loaded {} declaration modules", table.len()));

        let table = ReferenceResolver::new(normalizer).resolve(&table, reporter);

        let strategy = ShakeStrategy::from_name_or_off(&self.options.shake, reporter);
        let table = if strategy == ShakeStrategy::Off {
            table
        } else {
            let entry = main_module(normalizer, self.options.entry.as_deref())?;
            reporter.verbose(&format!("Shaking from {} ({})", entry, strategy));
            shake(&table, &entry, strategy, reporter)
        };

        let text = Assembler::new(normalizer).assemble(
            &table,
            AliasSettings {
                entry: self.options.entry.as_deref(),
                template: self.options.template.as_deref(),
                enabled: self.options.add_alias,
            },
        )?;

        Ok(Bundle {
            text,
            modules: table.len(),
        })
    }

    fn create_temp_dir(&self, root: &Path) -> Result<TempDir, GeneratorError> {
        let parent = match &self.options.tmp {
            Some(tmp) => root.join(tmp),
            None => std::env::temp_dir(),
        };
        let temp_err = |source: std::io::Error| GeneratorError::TempDir {
            path: parent.clone(),
            source,
        };

        create_dir_all_with_retry(&parent).map_err(temp_err)?;
        with_retry(|| tempfile::Builder::new().prefix("dts-bundle-").tempdir_in(&parent))
            .map_err(temp_err)
    }
}

/// Warn when package.json advertises typings somewhere other than the bundle.
fn check_declared_types(
    types: Option<&str>,
    root: &Path,
    output_path: &Path,
    reporter: &mut dyn Reporter,
) {
    let Some(types) = types else {
        return;
    };
    let declared = absolutize(Path::new(types), root);
    if declared != output_path {
        reporter.warn(&format!(
            "package.json declares types at {}, but the bundle is written to {}",
            declared.display(),
            output_path.display()
        ));
    }
}

fn write_output(path: &Path, text: &str) -> Result<(), GeneratorError> {
    let write_err = |source: std::io::Error| GeneratorError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        create_dir_all_with_retry(parent).map_err(write_err)?;
    }
    std::fs::write(path, text).map_err(write_err)
}
