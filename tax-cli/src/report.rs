//! Printable results of the estimator commands.
//!
//! Text output rounds money half-up to cents and shows rates as percentages.
//! JSON output keeps the exact decimal values.

use std::fmt;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;
use tax_core::calculations::common::round_half_up;
use tax_core::{RegionCode, TaxBreakdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders `report` in the requested format, without a trailing newline.
pub fn render<T>(
    report: &T,
    format: OutputFormat,
) -> serde_json::Result<String>
where
    T: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Text => Ok(report.to_string().trim_end().to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", round_half_up(value))
}

fn percent(rate: Option<Decimal>) -> String {
    match rate {
        Some(rate) => format!("{:.2}%", round_half_up(rate * Decimal::ONE_HUNDRED)),
        None => "n/a".to_string(),
    }
}

fn line(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: impl fmt::Display,
) -> fmt::Result {
    writeln!(f, "{label:<24}{value}")
}

/// A forward estimate, optionally followed by the reverse estimate for the
/// tax actually paid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    #[serde(flatten)]
    pub breakdown: TaxBreakdown,
    pub tax_paid: Option<Decimal>,
    pub estimated_income: Option<Decimal>,
    pub suggested_contribution: Option<Decimal>,
}

impl fmt::Display for EstimateReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let b = &self.breakdown;
        line(f, "Region:", &b.region)?;
        line(f, "Income:", money(b.income))?;
        line(f, "Federal tax:", money(b.federal_tax))?;
        line(f, "Regional tax:", money(b.regional_tax))?;
        line(f, "Total tax:", money(b.total_tax))?;
        line(f, "Net income:", money(b.net_income))?;
        line(f, "Regional bracket rate:", percent(b.regional_rate))?;

        if let Some(tax_paid) = self.tax_paid {
            line(f, "Tax paid:", money(tax_paid))?;
        }
        if let Some(estimated) = self.estimated_income {
            line(f, "Estimated income:", money(estimated))?;
        }
        if let Some(contribution) = self.suggested_contribution {
            line(f, "Suggested contribution:", money(contribution))?;
        }
        Ok(())
    }
}

/// The income estimated from an amount of tax paid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReverseReport {
    pub region: RegionCode,
    pub tax_paid: Decimal,
    pub tolerance: Decimal,
    pub estimated_income: Decimal,
    pub suggested_contribution: Option<Decimal>,
}

impl fmt::Display for ReverseReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        line(f, "Region:", &self.region)?;
        line(f, "Tax paid:", money(self.tax_paid))?;
        line(f, "Estimated income:", money(self.estimated_income))?;
        if let Some(contribution) = self.suggested_contribution {
            line(f, "Suggested contribution:", money(contribution))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub code: RegionCode,
    pub brackets: usize,
    pub top_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RegionList(pub Vec<RegionSummary>);

impl fmt::Display for RegionList {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "no regional tables loaded");
        }
        for region in &self.0 {
            writeln!(
                f,
                "{:<6}{} brackets, top rate {}",
                region.code.as_str(),
                region.brackets,
                percent(Some(region.top_rate))
            )?;
        }
        Ok(())
    }
}
