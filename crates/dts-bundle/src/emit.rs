//! Declaration emission
//!
//! The per-file fragments come from an external compiler. [`DeclarationEmitter`]
//! is the seam; [`TscEmitter`] runs the TypeScript compiler as a child process.

use crate::log::Reporter;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Command used when none is configured
pub const DEFAULT_TSC_COMMAND: &str = "npx tsc";

/// Errors raised by the external declaration compiler
#[derive(Debug, Error)]
pub enum EmitError {
    /// The compiler could not be started
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiler ran and reported failure
    #[error("`{program}` exited with {}{}", status_text(.code), stderr_suffix(.stderr))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The configured command is empty
    #[error("No declaration compiler command configured")]
    EmptyCommand,
}

fn status_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

/// Produces `.d.ts` fragments for a project into a directory
pub trait DeclarationEmitter {
    fn emit(
        &self,
        project_root: &Path,
        out_dir: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<(), EmitError>;
}

/// Runs `tsc --declaration --emitDeclarationOnly --declarationDir <out>`
#[derive(Debug, Clone)]
pub struct TscEmitter {
    command: Vec<String>,
    extra_args: Vec<String>,
}

impl Default for TscEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_TSC_COMMAND)
    }
}

impl TscEmitter {
    /// `command` is split on whitespace into program and leading arguments
    pub fn new(command: &str) -> Self {
        Self {
            command: command.split_whitespace().map(str::to_string).collect(),
            extra_args: Vec::new(),
        }
    }

    /// Arguments appended after the declaration flags
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Full argument vector, program first
    pub fn command_line(&self, out_dir: &Path) -> Vec<String> {
        let mut line = self.command.clone();
        line.extend([
            "--declaration".to_string(),
            "--emitDeclarationOnly".to_string(),
            "--declarationDir".to_string(),
            out_dir.display().to_string(),
        ]);
        line.extend(self.extra_args.iter().cloned());
        line
    }
}

impl DeclarationEmitter for TscEmitter {
    fn emit(
        &self,
        project_root: &Path,
        out_dir: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<(), EmitError> {
        if self.command.is_empty() {
            return Err(EmitError::EmptyCommand);
        }
        let line = self.command_line(out_dir);
        let (program, args) = line.split_first().ok_or(EmitError::EmptyCommand)?;
        reporter.verbose(&format!("Running {}", line.join(" ")));

        let output = Command::new(program)
            .args(args)
            .current_dir(project_root)
            .output()
            .map_err(|source| EmitError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            reporter.debug(line);
        }

        if !output.status.success() {
            // tsc prints diagnostics on stdout, so include both streams.
            let mut diagnostics = stdout.into_owned();
            diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(EmitError::Failed {
                program: program.clone(),
                code: output.status.code(),
                stderr: diagnostics,
            });
        }

        Ok(())
    }
}
