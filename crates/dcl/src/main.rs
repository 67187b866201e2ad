use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dcl_core::aggregate::OrganizationCostReport;
use dcl_core::config::{Config, CONFIG_FILE_NAME};
use dcl_core::engine::CostEngine;
use dcl_core::pipeline::{BatchOptions, BatchOutcome, CostPipeline};
use dcl_core::types::{Division, Severity};

use dcl_report::{json, markdown, text};

mod input;

#[derive(Parser)]
#[command(name = "dcl")]
#[command(about = "Division-aware cost scoring and Sinphasé governance for GitHub organizations")]
#[command(version)]
struct Cli {
    /// Show debug logging and extra report columns
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every repository in a metrics export and write the cost report
    Analyze {
        /// Metrics export (JSON)
        metrics: PathBuf,
        /// Config file path (defaults to the nearest dcl.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory of per-repository `<name>.toml` configs
        #[arg(long)]
        overrides: Option<PathBuf>,
        /// Only analyze this division
        #[arg(long)]
        division: Option<String>,
        /// Also analyze archived repositories
        #[arg(long)]
        include_archived: bool,
        /// Where to write the JSON report
        #[arg(short, long, default_value = "cost_scores.json")]
        output: PathBuf,
        /// Output format printed to stdout
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Display a previously written cost report
    Display {
        /// Report written by `dcl analyze`
        report: PathBuf,
        /// Only show this division
        #[arg(long)]
        division: Option<String>,
        #[arg(long, value_enum, default_value_t = DisplayFormat::Table)]
        format: DisplayFormat,
    },
    /// Analyze and exit with code 0 (pass) or 1 (too many isolation candidates)
    Check {
        /// Metrics export (JSON)
        metrics: PathBuf,
        /// Maximum number of isolation candidates allowed
        #[arg(long, default_value_t = 0)]
        max_isolation: usize,
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory of per-repository `<name>.toml` configs
        #[arg(long)]
        overrides: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Report every problem in a configuration file
    Validate {
        /// Config file path (defaults to the nearest dcl.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Create a default dcl.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Clone, Copy, ValueEnum)]
enum DisplayFormat {
    Table,
    Summary,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let verbose = cli.verbose;
    let result = match cli.command {
        Commands::Analyze {
            metrics,
            config,
            overrides,
            division,
            include_archived,
            output,
            format,
        } => {
            let options = AnalyzeOptions {
                config: config.as_deref(),
                overrides: overrides.as_deref(),
                division: division.as_deref(),
                include_archived,
            };
            cmd_analyze(&metrics, &options, &output, format, verbose)
        }
        Commands::Display {
            report,
            division,
            format,
        } => cmd_display(&report, division.as_deref(), format, verbose),
        Commands::Check {
            metrics,
            max_isolation,
            config,
            overrides,
            format,
        } => {
            let options = AnalyzeOptions {
                config: config.as_deref(),
                overrides: overrides.as_deref(),
                division: None,
                include_archived: false,
            };
            cmd_check(&metrics, &options, max_isolation, format)
        }
        Commands::Validate { config } => cmd_validate(config.as_deref()),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

struct AnalyzeOptions<'a> {
    config: Option<&'a Path>,
    overrides: Option<&'a Path>,
    division: Option<&'a str>,
    include_archived: bool,
}

fn cmd_analyze(
    metrics_path: &Path,
    options: &AnalyzeOptions<'_>,
    output: &Path,
    format: ReportFormat,
    verbose: bool,
) -> Result<()> {
    let outcome = run_batch(metrics_path, options)?;
    let report = &outcome.report;

    input::write_report(output, report)?;
    info!("wrote cost report to {}", output.display());

    match format {
        ReportFormat::Text => {
            print!("{}", text::format_report(report));
            if verbose {
                print!("{}", text::format_repository_table(report, true));
            }
            println!("Report written to {}", output.display());
        }
        ReportFormat::Json => println!("{}", json::format_report(report, false)),
        ReportFormat::Markdown => print!("{}", markdown::format_report(report)),
    }
    Ok(())
}

fn cmd_display(
    report_path: &Path,
    division: Option<&str>,
    format: DisplayFormat,
    verbose: bool,
) -> Result<()> {
    let mut report = input::read_report(report_path)?;
    if let Some(name) = division {
        let division: Division = name.parse()?;
        report.retain_division(division);
    }

    match format {
        DisplayFormat::Table => print!("{}", text::format_repository_table(&report, verbose)),
        DisplayFormat::Summary => print!("{}", text::format_division_summary(&report)),
        DisplayFormat::Json => println!("{}", json::format_report(&report, false)),
    }
    Ok(())
}

fn cmd_check(
    metrics_path: &Path,
    options: &AnalyzeOptions<'_>,
    max_isolation: usize,
    format: ReportFormat,
) -> Result<()> {
    let outcome = run_batch(metrics_path, options)?;
    let (output, passed) = match format {
        ReportFormat::Text => text::format_check(&outcome.report, max_isolation),
        ReportFormat::Json => json::format_check(&outcome.report, max_isolation, false),
        ReportFormat::Markdown => markdown::format_check(&outcome.report, max_isolation),
    };
    print!("{output}");
    if matches!(format, ReportFormat::Json) {
        println!();
    }
    if !passed {
        process::exit(1);
    }
    Ok(())
}

fn cmd_validate(config_path: Option<&Path>) -> Result<()> {
    let (path, config) = match config_path {
        Some(p) => (p.to_path_buf(), Config::read(p)?),
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            match Config::discover(&cwd) {
                Some(p) => {
                    let config = Config::read(&p)?;
                    (p, config)
                }
                None => anyhow::bail!(
                    "no {CONFIG_FILE_NAME} found. Run `dcl init` to create one."
                ),
            }
        }
    };

    let issues = config.validate();
    if issues.is_empty() {
        println!("{}: configuration is valid", path.display());
        return Ok(());
    }

    println!("{}: {} issue(s)", path.display(), issues.len());
    for issue in &issues {
        println!("  {issue}");
    }
    if issues.iter().any(|i| i.severity == Severity::Error) {
        process::exit(1);
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE_NAME);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE_NAME}"))?;
    println!("Created {CONFIG_FILE_NAME} with default configuration.");
    Ok(())
}

fn load_config(metrics_path: &Path, config_path: Option<&Path>) -> Result<Config> {
    if let Some(p) = config_path {
        return Config::load(p);
    }

    let dir = metrics_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    match Config::load_or_default(dir) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("{e:#}. Using defaults.");
            Ok(Config::default())
        }
    }
}

fn run_batch(metrics_path: &Path, options: &AnalyzeOptions<'_>) -> Result<BatchOutcome> {
    let config = load_config(metrics_path, options.config)?;
    let mut batch = input::read_metrics(metrics_path)?;
    if let Some(dir) = options.overrides {
        input::apply_overrides(&mut batch.repositories, dir)?;
    }

    let division = options
        .division
        .map(|name| name.parse::<Division>())
        .transpose()?;
    let organization = batch
        .organization
        .or_else(|| config.organization.name.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let engine = CostEngine::from_config(&config).context("invalid configuration")?;
    let pipeline = CostPipeline::new(engine)
        .with_options(BatchOptions {
            division,
            include_archived: options.include_archived,
        })
        .with_fingerprint(config.fingerprint()?);

    let outcome = pipeline.run(&organization, &batch.repositories);
    log_outcome(&outcome);
    Ok(outcome)
}

fn log_outcome(outcome: &BatchOutcome) {
    for failure in &outcome.failures {
        warn!("skipping repository: {failure}");
    }
    for name in &outcome.skipped {
        debug!(repository = %name, "archived repository skipped");
    }
    log_scores(&outcome.report);
}

fn log_scores(report: &OrganizationCostReport) {
    for result in &report.repository_scores {
        debug!(
            repository = %result.repository,
            division = %result.division,
            score = result.normalized_score,
            alerts = result.governance_alerts.len(),
            violations = result.sinphase_violations.len(),
            isolation = result.requires_isolation,
            "scored repository"
        );
    }
}
