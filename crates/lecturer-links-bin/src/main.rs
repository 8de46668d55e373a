//! Lecturer Links Binary Entry Point

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lecturer_links_core::vfs::PhysicalFileSystem;
use lecturer_links_core::{resolve_slug, LinksConfig, SiteReport, SiteRewriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lecturer-links")]
#[command(about = "Rewrite lecturer links of a frozen site for GitHub Pages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every HTML document under a site directory in place
    Rewrite(RewriteArgs),

    /// Print the page path of each lecturer name
    Resolve(ResolveArgs),

    /// Print the effective lecturer table as YAML
    Table(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct RewriteArgs {
    /// Root directory of the frozen site
    site: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,

    /// Compute changes without writing files
    #[arg(long)]
    dry_run: bool,

    /// Leave root-absolute links as they are
    #[arg(long)]
    no_relocate: bool,

    /// Print the full report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ResolveArgs {
    /// Lecturer display names
    #[arg(required = true)]
    names: Vec<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn load_config(path: Option<&Path>) -> Result<LinksConfig> {
    match path {
        Some(path) => LinksConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(LinksConfig::default()),
    }
}

fn run_rewrite(args: &RewriteArgs) -> Result<SiteReport> {
    let mut config = load_config(args.config.config.as_deref())?;
    if args.dry_run {
        config.site.dry_run = true;
    }
    if args.no_relocate {
        config.relocate.enabled = false;
    }

    if !args.site.is_dir() {
        anyhow::bail!("site directory {} does not exist", args.site.display());
    }

    let rewriter = SiteRewriter::from_config(config, Arc::new(PhysicalFileSystem))
        .context("invalid lecturer table")?;
    log::info!(
        "Rewriting {} with {} lecturers (relocation {})",
        args.site.display(),
        rewriter.table().len(),
        if rewriter.config().relocate.enabled { "on" } else { "off" }
    );
    Ok(rewriter.run(&args.site))
}

fn print_summary(report: &SiteReport) {
    println!(
        "{} files, {} changed{}",
        report.files.len(),
        report.files_changed(),
        if report.dry_run { " (dry run)" } else { "" }
    );
    println!(
        "{} lecturer links rewritten, {} unresolved, {} links relocated",
        report.totals.rewritten, report.totals.unresolved, report.totals.relocated
    );
    for failure in &report.failures {
        println!("failed: {}: {}", failure.path.display(), failure.message);
    }
}

/// Resolved paths in input order; `None` for unknown names.
fn resolve_names(config: &LinksConfig, names: &[String]) -> Result<Vec<Option<String>>> {
    let table = config.table().context("invalid lecturer table")?;
    Ok(names
        .iter()
        .map(|name| resolve_slug(&table, name))
        .collect())
}

/// Printable outcome of `resolve`.
struct ResolveOutput {
    lines: Vec<String>,
    unknown: Vec<String>,
}

impl ResolveOutput {
    fn success(&self) -> bool {
        self.unknown.is_empty()
    }
}

fn resolve_command(config: &LinksConfig, names: &[String]) -> Result<ResolveOutput> {
    let mut output = ResolveOutput {
        lines: Vec::new(),
        unknown: Vec::new(),
    };
    for (name, path) in names.iter().zip(resolve_names(config, names)?) {
        match path {
            Some(path) => output.lines.push(path),
            None => output.unknown.push(name.clone()),
        }
    }
    Ok(output)
}

/// The effective lecturer table as YAML.
fn table_yaml(config: &LinksConfig) -> Result<String> {
    let table = config.table().context("invalid lecturer table")?;
    Ok(serde_yaml::to_string(&table.to_map())?)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Rewrite(args) => {
            let report = run_rewrite(args)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }
            Ok(exit_code(report.is_success()))
        }
        Commands::Resolve(args) => {
            let config = load_config(args.config.config.as_deref())?;
            let output = resolve_command(&config, &args.names)?;
            for line in &output.lines {
                println!("{line}");
            }
            for name in &output.unknown {
                log::warn!("no lecturer named {name:?}");
            }
            Ok(exit_code(output.success()))
        }
        Commands::Table(args) => {
            let config = load_config(args.config.as_deref())?;
            print!("{}", table_yaml(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
