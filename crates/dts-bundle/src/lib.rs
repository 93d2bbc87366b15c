//! dts-bundle library
//!
//! Merges the per-file declaration fragments emitted by the TypeScript compiler
//! into a single declaration file:
//! - Path normalization into module identifiers
//! - Module table loading (ordered, deterministic)
//! - Relative reference resolution
//! - Reachability-based tree-shaking
//! - Assembly into `declare module` blocks plus a package alias
//! - Generation runs with temporary-directory cleanup and best-effort mode

pub mod assemble;
pub mod config;
pub mod emit;
pub mod fs_util;
pub mod generator;
pub mod log;
pub mod manifest;
pub mod path;
pub mod references;
pub mod resolve;
pub mod shake;
pub mod table;

pub use assemble::{AliasSettings, AssembleError, Assembler, DEFAULT_ALIAS_TEMPLATE};
pub use config::{BundleConfig, ConfigError, GeneratorOptions};
pub use emit::{DeclarationEmitter, EmitError, TscEmitter};
pub use generator::{Bundle, GenerateOutcome, Generator, GeneratorError};
pub use log::{CollectingReporter, ConsoleReporter, LogLevel, NullReporter, Reporter};
pub use manifest::{ManifestError, PackageManifest};
pub use path::{find_project_root, BaseKind, NormalizeOptions, PathNormalizer};
pub use resolve::{ReferenceResolver, Resolution};
pub use shake::{shake, ShakeStrategy, UnknownStrategy};
pub use table::{LoadError, ModuleTable, TableLoader};
