//! sdl - Command-line interface for `config.sdl` package manifests

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sdl_core::{Diagnostic, FormatConfig, Formatter, Severity};
use sdl_manifest::{DependencyKind, Manifest, ManifestLocation};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod add;
mod config;
mod init;
mod list;
mod project;
mod remove;
mod run;

use config::SdlConfig;
use project::{parse_or_report, render_parse_errors, Project};

#[derive(Parser)]
#[command(name = "sdl")]
#[command(version = sdl_core::VERSION)]
#[command(about = "Run scripts and manage config.sdl package manifests", long_about = None)]
struct Cli {
    /// Path to the manifest (default: nearest config.sdl above the current directory)
    #[arg(long, global = true, env = "SDL_MANIFEST")]
    manifest: Option<PathBuf>,

    /// Path to the CLI configuration file
    #[arg(long, global = true, env = "SDL_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON where supported
    #[arg(long, short = 'j', global = true)]
    json: bool,

    /// Show debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script from the manifest, with its pre/post hooks
    Run {
        /// Script name
        script: String,

        /// Arguments passed to the script after `--`
        #[arg(last = true)]
        args: Vec<String>,

        /// Exit successfully if the script is not defined
        #[arg(long)]
        if_present: bool,

        /// Don't print the command banner
        #[arg(short, long)]
        silent: bool,
    },

    /// List the manifest's scripts
    Scripts,

    /// Validate the manifest and report every problem
    Check {
        /// Manifest to check (default: the project manifest)
        file: Option<PathBuf>,
    },

    /// Print the tag tree of any SDL file
    Dump {
        /// File to dump (default: the project manifest)
        file: Option<PathBuf>,
    },

    /// Format SDL files
    Fmt {
        /// Files to format (if none, formats stdin)
        files: Vec<PathBuf>,

        /// Check if files are formatted without modifying
        #[arg(short, long)]
        check: bool,

        /// Spaces per indentation level (overrides the config file)
        #[arg(long)]
        indent: Option<usize>,
    },

    /// List dependencies and whether the installed copies match
    Deps {
        /// Only show one table
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Show package metadata
    Info,

    /// Add a dependency to config.sdl
    Add {
        /// Package name with an optional range, e.g. "react@^16.8.0"
        package: String,

        /// Add as a peer dependency
        #[arg(long, conflicts_with = "dev")]
        peer: bool,

        /// Add as a development dependency
        #[arg(long)]
        dev: bool,
    },

    /// Remove a dependency from config.sdl
    Remove {
        /// Package name to remove
        package: String,

        /// Remove from peer dependencies
        #[arg(long, conflicts_with_all = ["dev", "normal"])]
        peer: bool,

        /// Remove from development dependencies
        #[arg(long, conflicts_with = "normal")]
        dev: bool,

        /// Remove from regular dependencies
        #[arg(long)]
        normal: bool,
    },

    /// Create a starter config.sdl in the current directory
    Init {
        /// Set the package name (defaults to directory name)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite an existing config.sdl
        #[arg(long)]
        force: bool,
    },
}

/// Dependency table selector for `--kind`
#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Normal,
    Peer,
    Dev,
}

impl From<KindArg> for DependencyKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Normal => Self::Normal,
            KindArg::Peer => Self::Peer,
            KindArg::Dev => Self::Dev,
        }
    }
}

fn select_kind(peer: bool, dev: bool, normal: bool) -> Option<DependencyKind> {
    if peer {
        Some(DependencyKind::Peer)
    } else if dev {
        Some(DependencyKind::Dev)
    } else if normal {
        Some(DependencyKind::Normal)
    } else {
        None
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match execute(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// `-v` forces debug output; otherwise `RUST_LOG` applies, defaulting to warnings
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Run a command, returning the process exit code
fn execute(cli: Cli) -> Result<i32> {
    let config = SdlConfig::load(cli.config.as_deref())?;
    let manifest_flag = cli.manifest.as_deref();

    match cli.command {
        Commands::Run {
            script,
            args,
            if_present,
            silent,
        } => {
            let project = Project::open(manifest_flag)?;
            let manifest = project.manifest()?;
            let runner = run::ScriptRunner::new(&manifest, &project.location.root, &config.run);
            let options = run::RunOptions {
                script,
                args,
                if_present,
                silent,
            };
            return runner.run(&options);
        }

        Commands::Scripts => {
            let manifest = Project::open(manifest_flag)?.manifest()?;
            list::scripts(&manifest, cli.json)?;
        }

        Commands::Check { file } => {
            let path = match file {
                Some(file) => file,
                None => locate(manifest_flag)?,
            };
            return check_file(&path);
        }

        Commands::Dump { file } => {
            let path = match file {
                Some(file) => file,
                None => locate(manifest_flag)?,
            };
            dump_file(&path, cli.json)?;
        }

        Commands::Fmt {
            files,
            check,
            indent,
        } => {
            format_files(&files, check, config.format_config(indent))?;
        }

        Commands::Deps { kind } => {
            let project = Project::open(manifest_flag)?;
            let manifest = project.manifest()?;
            list::deps(
                &manifest,
                &project.location.root,
                kind.map(Into::into),
                cli.json,
            )?;
        }

        Commands::Info => {
            let manifest = Project::open(manifest_flag)?.manifest()?;
            list::info(&manifest, cli.json)?;
        }

        Commands::Add { package, peer, dev } => {
            let mut project = Project::open(manifest_flag)?;
            let options = add::AddOptions {
                package,
                kind: select_kind(peer, dev, false).unwrap_or(DependencyKind::Normal),
            };
            add::add_dependency(&mut project, &options, config.format_config(None))?;
        }

        Commands::Remove {
            package,
            peer,
            dev,
            normal,
        } => {
            let mut project = Project::open(manifest_flag)?;
            let options = remove::RemoveOptions {
                package,
                kind: select_kind(peer, dev, normal),
            };
            remove::remove_dependency_from(&mut project, &options, config.format_config(None))?;
        }

        Commands::Init { name, force } => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            let options = init::InitOptions { name, force };
            init::init_project(&cwd, options, config.format_config(None))?;
        }
    }

    Ok(0)
}

/// Path of the project manifest without parsing it, so `check` and `dump`
/// can report syntax errors themselves
fn locate(manifest_flag: Option<&Path>) -> Result<PathBuf> {
    let location = match manifest_flag {
        Some(path) => ManifestLocation::at(path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            ManifestLocation::find(cwd)?
        }
    };
    Ok(location.manifest_path)
}

/// Validate one manifest file, printing every diagnostic
fn check_file(path: &Path) -> Result<i32> {
    let label = path.display().to_string();
    let source =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read '{label}'"))?;

    let document = match sdl_core::Parser::parse_document(&source) {
        Ok(document) => document,
        Err(errors) => {
            eprint!("{}", render_parse_errors(&errors, &source, &label));
            eprintln!("\n{label}: {} syntax error(s)", errors.len());
            return Ok(1);
        }
    };

    let diagnostics: Vec<Diagnostic> = Manifest::check(&document)
        .iter()
        .map(Diagnostic::from)
        .collect();
    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic.render(&source, &label));
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    if errors > 0 {
        eprintln!("{label}: {errors} error(s), {warnings} warning(s)");
        return Ok(1);
    }
    println!("{label}: ok ({warnings} warning(s))");
    Ok(0)
}

/// Print the tag tree, or the document as JSON
fn dump_file(path: &Path, json: bool) -> Result<()> {
    let label = path.display().to_string();
    let source =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read '{label}'"))?;
    let document = parse_or_report(&source, &label)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&document.tags)?);
    } else {
        print!("{document}");
    }
    Ok(())
}

/// Format files in place, or stdin to stdout when no files are given
fn format_files(files: &[PathBuf], check: bool, config: FormatConfig) -> Result<()> {
    use std::io::{self, Read, Write};

    if files.is_empty() {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read from stdin")?;

        let document = parse_or_report(&source, "<stdin>")?;
        let formatted = Formatter::with_config(config).format(&document);

        if check {
            if source != formatted {
                bail!("stdin is not formatted");
            }
        } else {
            io::stdout()
                .write_all(formatted.as_bytes())
                .context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    let mut unformatted_files = Vec::new();
    let mut error_files = Vec::new();

    for file in files {
        let label = file.display().to_string();
        let source = match std::fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error reading '{label}': {e}");
                error_files.push(file);
                continue;
            }
        };

        let Ok(document) = parse_or_report(&source, &label) else {
            error_files.push(file);
            continue;
        };
        let formatted = Formatter::with_config(config.clone()).format(&document);

        if source == formatted {
            continue;
        }
        if check {
            println!("Would reformat: {label}");
            unformatted_files.push(file);
        } else {
            match std::fs::write(file, &formatted) {
                Ok(()) => println!("Formatted: {label}"),
                Err(e) => {
                    eprintln!("Error writing '{label}': {e}");
                    error_files.push(file);
                }
            }
        }
    }

    if !error_files.is_empty() {
        bail!("{} file(s) could not be formatted", error_files.len());
    }
    if !unformatted_files.is_empty() {
        bail!("{} file(s) would be reformatted", unformatted_files.len());
    }
    Ok(())
}
