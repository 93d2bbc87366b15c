//! `dts-bundle generate` — Bundle a project's declarations into one file.

use crate::output::StyledOutput;
use anyhow::Context;
use clap::Args;
use dts_bundle::{
    find_project_root, BundleConfig, ConsoleReporter, Generator, GeneratorOptions, LogLevel,
};
use std::path::PathBuf;
use termcolor::ColorChoice;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Project root (defaults to the nearest directory with a package.json)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Parent directory for the temporary declaration output
    #[arg(short, long)]
    pub tmp: Option<PathBuf>,

    /// Entry file, relative to the root [default: index.ts]
    #[arg(short, long)]
    pub entry: Option<PathBuf>,

    /// Output file, relative to the root [default: index.d.ts]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep going when the compiler or a fragment read fails
    #[arg(short, long)]
    pub force: bool,

    /// error, warn, info, verbose or debug [default: info]
    #[arg(short = 'L', long)]
    pub log_level: Option<String>,

    /// Tree-shaking strategy: off, exportOnly or referencedOnly
    #[arg(short, long)]
    pub shake: Option<String>,

    /// Alias template; {main-module} and {package-name} are substituted
    #[arg(long)]
    pub template: Option<String>,

    /// Do not append the package alias
    #[arg(long)]
    pub no_alias: bool,

    /// Compiler command [default: "npx tsc"]
    #[arg(long)]
    pub tsc_command: Option<String>,

    /// Extra compiler arguments (e.g. --tsc="-p tsconfig.build.json")
    #[arg(long, allow_hyphen_values = true)]
    pub tsc: Option<String>,
}

impl GenerateArgs {
    /// Layer these flags over the project config
    pub fn into_options(self, root: PathBuf, config: &BundleConfig) -> GeneratorOptions {
        let mut options = GeneratorOptions::for_root(root);
        options.apply_config(config);

        if let Some(tmp) = self.tmp {
            options.tmp = Some(tmp);
        }
        if let Some(entry) = self.entry {
            options.entry = Some(entry);
        }
        if let Some(output) = self.output {
            options.output = output;
        }
        if self.force {
            options.force = true;
        }
        if let Some(shake) = self.shake {
            options.shake = shake;
        }
        if let Some(template) = self.template {
            options.template = Some(template);
        }
        if self.no_alias {
            options.add_alias = false;
        }
        if let Some(command) = self.tsc_command {
            options.tsc_command = command;
        }
        if let Some(args) = self.tsc {
            options.tsc_args = args.split_whitespace().map(str::to_string).collect();
        }
        options
    }
}

fn resolve_root(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root);
    }
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    Ok(find_project_root(&cwd).unwrap_or(cwd))
}

pub fn execute(args: GenerateArgs, choice: ColorChoice) -> anyhow::Result<()> {
    let root = resolve_root(args.root.clone())?;
    let config = BundleConfig::load_optional(&root)?;

    let level = match args.log_level.as_deref().or(config.log_level.as_deref()) {
        Some(name) => name.parse::<LogLevel>()?,
        None => LogLevel::Info,
    };
    let mut reporter = ConsoleReporter::new(level, choice);

    let options = args.into_options(root, &config);
    let outcome = Generator::new(options).generate(&mut reporter)?;

    let mut out = StyledOutput::new(choice);
    out.success("✓ ");
    out.plain(&format!(
        "Bundled {} modules into {}",
        outcome.modules,
        outcome.output_path.display()
    ));
    out.newline();
    Ok(())
}
