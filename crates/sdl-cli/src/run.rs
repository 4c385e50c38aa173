//! Implementation of the `sdl run` command.

use crate::config::RunSection;
use anyhow::{bail, Context, Result};
use sdl_manifest::{Manifest, Script};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Options for running a script.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Script name.
    pub script: String,
    /// Extra arguments appended to the main script's command.
    pub args: Vec<String>,
    /// Succeed quietly when the script is not defined.
    pub if_present: bool,
    /// Don't print the `> name` banner before each command.
    pub silent: bool,
}

/// Runs scripts from a manifest inside the project root.
pub struct ScriptRunner<'a> {
    manifest: &'a Manifest,
    root: &'a Path,
    shell: &'a RunSection,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(manifest: &'a Manifest, root: &'a Path, shell: &'a RunSection) -> Self {
        Self {
            manifest,
            root,
            shell,
        }
    }

    /// Run `pre<script>`, `<script>` and `post<script>` in order, stopping at the
    /// first failure. Returns the exit code of the last command run.
    pub fn run(&self, options: &RunOptions) -> Result<i32> {
        let Some(chain) = self.manifest.lifecycle(&options.script) else {
            if options.if_present {
                tracing::debug!(script = %options.script, "script not present, skipping");
                return Ok(0);
            }
            bail!(
                "missing script: `{}`\n\n{}",
                options.script,
                available_scripts(self.manifest)
            );
        };

        for script in chain {
            let extra: &[String] = if script.name == options.script {
                &options.args
            } else {
                &[]
            };
            let command_line = command_line(script, extra)?;

            if !options.silent {
                eprintln!(
                    "\n> {}@{} {}\n> {}\n",
                    self.manifest.name, self.manifest.version, script.name, command_line
                );
            }

            let code = self.spawn(script, &command_line)?;
            if code != 0 {
                tracing::info!(script = %script.name, code, "script failed");
                return Ok(code);
            }
        }
        Ok(0)
    }

    fn spawn(&self, script: &Script, command_line: &str) -> Result<i32> {
        let mut command = self.command(script, command_line)?;
        tracing::debug!(script = %script.name, shell = %self.shell.shell, "spawning script");

        let status = command
            .status()
            .with_context(|| format!("Failed to start `{}` for script `{}`", self.shell.shell, script.name))?;
        // A child killed by a signal has no code
        Ok(status.code().unwrap_or(1))
    }

    /// The shell invocation for one script, with the npm lifecycle environment
    fn command(&self, script: &Script, command_line: &str) -> Result<Command> {
        let mut command = Command::new(&self.shell.shell);
        command
            .args(&self.shell.shell_args)
            .arg(command_line)
            .current_dir(self.root)
            .env("npm_lifecycle_event", &script.name)
            .env("npm_package_name", &self.manifest.name)
            .env("npm_package_version", self.manifest.version.to_string());

        let bin = self.root.join("node_modules").join(".bin");
        if bin.is_dir() {
            command.env("PATH", prepend_path(bin, std::env::var_os("PATH"))?);
        }
        Ok(command)
    }
}

/// The script's command with extra arguments shell-quoted onto the end
fn command_line(script: &Script, extra: &[String]) -> Result<String> {
    if extra.is_empty() {
        return Ok(script.command.clone());
    }
    let quoted = shlex::try_join(extra.iter().map(String::as_str))
        .with_context(|| format!("Cannot pass arguments to script `{}`", script.name))?;
    Ok(format!("{} {quoted}", script.command))
}

fn prepend_path(dir: PathBuf, existing: Option<OsString>) -> Result<OsString> {
    let rest = existing
        .as_deref()
        .map(|paths| std::env::split_paths(paths).collect::<Vec<_>>())
        .unwrap_or_default();
    std::env::join_paths(std::iter::once(dir).chain(rest)).context("Invalid PATH entry")
}

/// npm-style listing used when a script is missing and by `sdl scripts`
pub fn available_scripts(manifest: &Manifest) -> String {
    if manifest.scripts().is_empty() {
        return String::from("no scripts are defined in this manifest");
    }
    let mut out = String::from("available scripts:");
    for script in manifest.scripts() {
        out.push_str(&format!("\n  {}\n    {}", script.name, script.command));
    }
    out
}
