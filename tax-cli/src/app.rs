//! Command handlers shared by the one-shot subcommands and the interactive
//! session.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use rust_decimal::Decimal;
use tax_core::calculations::{CombinedTaxCalculator, InverseIncomeSolver, SolverConfig};
use tax_core::{RegionCode, TaxError, TaxQuery, TaxSchedule};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::logging;
use crate::report::{
    EstimateReport, OutputFormat, RegionList, RegionSummary, ReverseReport, render,
};
use crate::session::Session;
use crate::utils::{ParseAmountError, parse_amount};

const HELP: &str = "\
commands:
  income <amount> <region>   estimate tax on an income
  paid <amount> <region>     estimate the income behind an amount of tax paid
  regions                    list known regions
  log <level>                change the log level
  reset                      forget entered and estimated incomes
  help                       show this message
  quit                       leave the session";

/// Loaded tables plus the settings every command needs.
#[derive(Debug, Clone)]
pub struct App {
    schedule: TaxSchedule,
    solver: SolverConfig,
    format: OutputFormat,
}

impl App {
    pub fn new(
        schedule: TaxSchedule,
        solver: SolverConfig,
        format: OutputFormat,
    ) -> Result<Self, TaxError> {
        solver.validate()?;
        Ok(Self {
            schedule,
            solver,
            format,
        })
    }

    pub fn schedule(&self) -> &TaxSchedule {
        &self.schedule
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn solver(&self) -> Result<InverseIncomeSolver<'_>, TaxError> {
        InverseIncomeSolver::new(&self.schedule, self.solver.clone())
    }

    /// Forward estimate for `income` in `region`.
    ///
    /// With `tax_paid` the income behind that tax is estimated too. The
    /// session is only updated once every calculation has succeeded.
    pub fn estimate(
        &self,
        session: &mut Session,
        income: Decimal,
        region: &str,
        tax_paid: Option<Decimal>,
    ) -> Result<EstimateReport, TaxError> {
        let query = TaxQuery {
            income,
            region: RegionCode::new(region)?,
        };
        let breakdown = CombinedTaxCalculator::new(&self.schedule).evaluate_query(&query)?;
        let estimated_income = match tax_paid {
            Some(tax_paid) => Some(self.solver()?.income_for_tax_default(tax_paid, region)?),
            None => None,
        };

        session.record_entered_income(income);
        if let Some(estimated) = estimated_income {
            session.record_estimated_income(estimated);
        }

        Ok(EstimateReport {
            breakdown,
            tax_paid,
            estimated_income,
            suggested_contribution: session.suggested_contribution(),
        })
    }

    /// Estimates the income behind `tax_paid` in `region`.
    pub fn reverse(
        &self,
        session: &mut Session,
        tax_paid: Decimal,
        region: &str,
        tolerance: Option<Decimal>,
    ) -> Result<ReverseReport, TaxError> {
        let region_code = RegionCode::new(region)?;
        let tolerance = tolerance.unwrap_or(self.solver.tolerance);
        let estimated_income = self.solver()?.income_for_tax(tax_paid, region, tolerance)?;
        session.record_estimated_income(estimated_income);

        Ok(ReverseReport {
            region: region_code,
            tax_paid,
            tolerance,
            estimated_income,
            suggested_contribution: session.suggested_contribution(),
        })
    }

    pub fn regions(&self) -> RegionList {
        let summaries = self
            .schedule
            .regions()
            .filter_map(|code| {
                let table = self.schedule.regional(code.as_str()).ok()?;
                Some(RegionSummary {
                    code: code.clone(),
                    brackets: table.rows().len(),
                    top_rate: table.top_rate(),
                })
            })
            .collect();
        RegionList(summaries)
    }

    /// Runs a line-oriented session until `quit` or end of input.
    ///
    /// Command failures are reported on `output` and the session carries on;
    /// only I/O errors end it early.
    pub fn run_interactive<R, W>(
        &self,
        session: &mut Session,
        input: R,
        mut output: W,
    ) -> io::Result<()>
    where
        R: BufRead,
        W: Write,
    {
        info!("interactive session started");
        writeln!(output, "type 'help' for commands")?;
        prompt(&mut output)?;

        for line in input.lines() {
            let line = line?;
            match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => match self.execute(session, command) {
                    Ok(text) => writeln!(output, "{text}")?,
                    Err(error) => {
                        warn!(%line, "command failed: {error:#}");
                        writeln!(output, "error: {error:#}")?;
                    }
                },
                Err(error) => writeln!(output, "error: {error}")?,
            }
            prompt(&mut output)?;
        }

        writeln!(output)?;
        info!("interactive session ended");
        Ok(())
    }

    fn execute(
        &self,
        session: &mut Session,
        command: Command,
    ) -> anyhow::Result<String> {
        debug!(?command, "executing");
        let text = match command {
            Command::Income { amount, region } => {
                render(&self.estimate(session, amount, &region, None)?, self.format)?
            }
            Command::Paid { amount, region } => {
                render(&self.reverse(session, amount, &region, None)?, self.format)?
            }
            Command::Regions => render(&self.regions(), self.format)?,
            Command::Log { level } => {
                logging::set_log_level(&level).context("cannot change log level")?;
                format!("log level set to {level}")
            }
            Command::Reset => {
                session.clear();
                "session cleared".to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        };
        Ok(text)
    }
}

fn prompt<W: Write>(output: &mut W) -> io::Result<()> {
    write!(output, "> ")?;
    output.flush()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for commands")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Amount(#[from] ParseAmountError),
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Income { amount: Decimal, region: String },
    Paid { amount: Decimal, region: String },
    Regions,
    Log { level: String },
    Reset,
    Help,
    Quit,
}

impl Command {
    /// Parses a line. Blank lines give `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("income", [amount, region]) => Self::Income {
                amount: parse_amount(amount)?,
                region: region.to_string(),
            },
            ("income", _) => return Err(CommandError::Usage("income <amount> <region>")),
            ("paid", [amount, region]) => Self::Paid {
                amount: parse_amount(amount)?,
                region: region.to_string(),
            },
            ("paid", _) => return Err(CommandError::Usage("paid <amount> <region>")),
            ("regions", []) => Self::Regions,
            ("log", [level]) => Self::Log {
                level: level.to_string(),
            },
            ("log", _) => return Err(CommandError::Usage("log <level>")),
            ("reset", []) => Self::Reset,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            _ => return Err(CommandError::Unknown(line.trim().to_string())),
        };
        Ok(Some(command))
    }
}
