use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};

use tax_cli::report::render;
use tax_cli::utils::parse_amount;
use tax_cli::{App, AppConfig, OutputFormat, Session, logging};
use tax_data::ScheduleLoader;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Federal plus regional marginal income tax estimator.
///
/// Loads the bracket tables, then estimates tax on an income or the income
/// behind an amount of tax paid.
#[derive(Debug, Parser)]
#[command(name = "tax-estimator", version)]
struct Cli {
    /// TOML config file. Flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Federal bracket table (CSV: low_range,high_range,tax_rate).
    #[arg(long, global = true)]
    federal: Option<PathBuf>,

    /// Regional bracket table (CSV: prov,low_range,high_range,tax_rate).
    #[arg(long, global = true)]
    regional: Option<PathBuf>,

    /// Ceiling for the reverse income search.
    #[arg(long, global = true, value_parser = parse_amount)]
    max_income: Option<Decimal>,

    /// Log level or EnvFilter directive. Beats `RUST_LOG` and the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Federal, regional and total tax on an income.
    Estimate {
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        income: Decimal,

        #[arg(short, long)]
        region: String,

        /// Tax actually paid; adds the estimated income and suggested contribution.
        #[arg(long, value_parser = parse_amount)]
        tax_paid: Option<Decimal>,
    },

    /// Income that would produce an amount of tax.
    Reverse {
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        tax_paid: Decimal,

        #[arg(short, long)]
        region: String,

        /// Search precision; the result is rounded to it.
        #[arg(long, value_parser = parse_amount)]
        tolerance: Option<Decimal>,
    },

    /// List the regions with a bracket table.
    Regions,

    /// Read commands from stdin until `quit`.
    Interactive,
}

impl Cli {
    fn apply_overrides(
        &self,
        config: &mut AppConfig,
    ) {
        if let Some(path) = &self.federal {
            config.federal_table = path.clone();
        }
        if let Some(path) = &self.regional {
            config.regional_table = path.clone();
        }
        if let Some(max_income) = self.max_income {
            config.solver.max_income = max_income;
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

/// Setup failures before logging exists are returned to the runtime, which
/// prints them. Later failures are logged once and turned into an exit code.
fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    cli.apply_overrides(&mut config);

    logging::init_logging(
        cli.log_level.as_deref(),
        &config.log_level,
        cli.log_file.as_deref(),
    )?;

    Ok(exit_code(run(cli, config)))
}

fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    cli: Cli,
    config: AppConfig,
) -> anyhow::Result<()> {
    let schedule =
        ScheduleLoader::load_schedule_from_paths(&config.federal_table, &config.regional_table)
            .with_context(|| {
                format!(
                    "failed to load bracket tables from '{}' and '{}'",
                    config.federal_table.display(),
                    config.regional_table.display()
                )
            })?;
    info!(regions = schedule.region_count(), "bracket tables loaded");

    let app = App::new(schedule, config.solver, cli.format).context("invalid solver settings")?;
    let mut session = Session::new();

    let output = match cli.command {
        Command::Estimate {
            income,
            region,
            tax_paid,
        } => {
            let report = app
                .estimate(&mut session, income, &region, tax_paid)
                .with_context(|| format!("cannot estimate tax on {income} in {region}"))?;
            render(&report, app.format())?
        }
        Command::Reverse {
            tax_paid,
            region,
            tolerance,
        } => {
            let report = app
                .reverse(&mut session, tax_paid, &region, tolerance)
                .with_context(|| format!("cannot estimate income for {tax_paid} tax in {region}"))?;
            render(&report, app.format())?
        }
        Command::Regions => render(&app.regions(), app.format())?,
        Command::Interactive => {
            let stdin = io::stdin();
            app.run_interactive(&mut session, stdin.lock(), io::stdout().lock())
                .context("interactive session failed")?;
            return Ok(());
        }
    };

    println!("{output}");
    Ok(())
}
