//! Federal plus regional tax for one income.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::CombinedTaxCalculator;
//! use tax_core::{BracketRow, BracketTable, Jurisdiction, RegionCode, TaxSchedule};
//!
//! let federal = BracketTable::new(
//!     Jurisdiction::Federal,
//!     vec![
//!         BracketRow::new(dec!(0), Some(dec!(50000)), dec!(0.15)),
//!         BracketRow::new(dec!(50000), None, dec!(0.26)),
//!     ],
//! )
//! .unwrap();
//! let ontario = BracketTable::new(
//!     Jurisdiction::Region(RegionCode::new("ON").unwrap()),
//!     vec![
//!         BracketRow::new(dec!(0), Some(dec!(40000)), dec!(0.05)),
//!         BracketRow::new(dec!(40000), None, dec!(0.10)),
//!     ],
//! )
//! .unwrap();
//! let schedule = TaxSchedule::new(federal, [ontario]).unwrap();
//!
//! let calculator = CombinedTaxCalculator::new(&schedule);
//!
//! assert_eq!(calculator.total_tax(dec!(60000), "ON").unwrap(), dec!(14100));
//! assert_eq!(calculator.net_income(dec!(60000), "on").unwrap(), dec!(45900));
//! assert_eq!(calculator.bracket_rate(dec!(60000), "ON").unwrap(), Some(dec!(0.10)));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::marginal;
use crate::{RegionCode, TaxBreakdown, TaxError, TaxQuery, TaxSchedule};

/// Composes the federal table with one regional table.
///
/// The calculator only borrows the schedule and keeps no state between
/// calls, so it is cheap to create per query and safe to share.
#[derive(Debug, Clone, Copy)]
pub struct CombinedTaxCalculator<'a> {
    schedule: &'a TaxSchedule,
}

impl<'a> CombinedTaxCalculator<'a> {
    pub fn new(schedule: &'a TaxSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &'a TaxSchedule {
        self.schedule
    }

    /// Federal tax on `income`.
    ///
    /// # Errors
    ///
    /// [`TaxError::NegativeInput`] if `income` is negative.
    pub fn federal_tax(
        &self,
        income: Decimal,
    ) -> Result<Decimal, TaxError> {
        check_income(income)?;
        Ok(marginal::evaluate(income, self.schedule.federal()))
    }

    /// Regional tax on `income`.
    ///
    /// # Errors
    ///
    /// * [`TaxError::NegativeInput`] if `income` is negative.
    /// * [`TaxError::UnknownRegion`] if `region` has no table.
    pub fn regional_tax(
        &self,
        income: Decimal,
        region: &str,
    ) -> Result<Decimal, TaxError> {
        check_income(income)?;
        let table = self.schedule.regional(region)?;
        Ok(marginal::evaluate(income, table))
    }

    /// Federal plus regional tax on `income`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::regional_tax`].
    pub fn total_tax(
        &self,
        income: Decimal,
        region: &str,
    ) -> Result<Decimal, TaxError> {
        let regional = self.regional_tax(income, region)?;
        let federal = marginal::evaluate(income, self.schedule.federal());
        Ok(federal + regional)
    }

    /// `income` minus [`Self::total_tax`]; never computed any other way.
    pub fn net_income(
        &self,
        income: Decimal,
        region: &str,
    ) -> Result<Decimal, TaxError> {
        Ok(income - self.total_tax(income, region)?)
    }

    /// Marginal rate of the regional bracket containing `income`.
    ///
    /// Negative income has no bracket and yields `Ok(None)` rather than an
    /// error, matching [`marginal::bracket_rate`].
    ///
    /// # Errors
    ///
    /// [`TaxError::UnknownRegion`] if `region` has no table.
    pub fn bracket_rate(
        &self,
        income: Decimal,
        region: &str,
    ) -> Result<Option<Decimal>, TaxError> {
        let table = self.schedule.regional(region)?;
        Ok(marginal::bracket_rate(income, table))
    }

    /// Every figure of the forward calculation in one value.
    pub fn breakdown(
        &self,
        income: Decimal,
        region: &str,
    ) -> Result<TaxBreakdown, TaxError> {
        check_income(income)?;
        let table = self.schedule.regional(region)?;
        let region = RegionCode::new(region)?;

        let federal_tax = marginal::evaluate(income, self.schedule.federal());
        let regional_tax = marginal::evaluate(income, table);
        let total_tax = federal_tax + regional_tax;
        let net_income = income - total_tax;
        let regional_rate = marginal::bracket_rate(income, table);

        debug!(
            %income,
            %region,
            %federal_tax,
            %regional_tax,
            %total_tax,
            "computed tax breakdown"
        );

        Ok(TaxBreakdown {
            income,
            region,
            federal_tax,
            regional_tax,
            total_tax,
            net_income,
            regional_rate,
        })
    }

    /// [`Self::breakdown`] for a prepared query.
    pub fn evaluate_query(
        &self,
        query: &TaxQuery,
    ) -> Result<TaxBreakdown, TaxError> {
        self.breakdown(query.income, query.region.as_str())
    }
}

fn check_income(income: Decimal) -> Result<(), TaxError> {
    if income < Decimal::ZERO {
        return Err(TaxError::NegativeInput {
            field: "income",
            value: income,
        });
    }
    Ok(())
}
