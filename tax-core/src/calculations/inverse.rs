//! Estimating the income that produced a given amount of tax.
//!
//! Combined tax is continuous and non-decreasing in income, so the income
//! for a target tax can be found by bisection over `[0, max_income]`. The
//! search keeps `total_tax(lo) < target <= total_tax(hi)` and stops once the
//! interval is no wider than the tolerance, which takes
//! `log2(max_income / tolerance)` evaluations (30 for the defaults).
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{InverseIncomeSolver, SolverConfig};
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
//! let solver = InverseIncomeSolver::new(&schedule, SolverConfig::default()).unwrap();
//! let income = solver.income_for_tax(dec!(14100), "ON", dec!(0.01)).unwrap();
//!
//! assert!((income - dec!(60000)).abs() <= dec!(0.01));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::TaxError;
use crate::calculations::CombinedTaxCalculator;
use crate::calculations::common::round_to_tolerance;
use crate::models::TaxSchedule;

/// Bounds for the income search.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::SolverConfig;
///
/// let config = SolverConfig::default();
///
/// assert_eq!(config.max_income, dec!(10000000));
/// assert_eq!(config.tolerance, dec!(0.01));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Search ceiling. Targets above the tax owed at this income are
    /// reported as out of range instead of being searched for.
    pub max_income: Decimal,

    /// Width of the final search interval, used when a call does not
    /// supply its own. The result is rounded to this precision.
    pub tolerance: Decimal,

    /// Hard cap on bisection steps.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_income: Decimal::from(10_000_000),
            tolerance: Decimal::new(1, 2),
            max_iterations: 200,
        }
    }
}

impl SolverConfig {
    /// Checks that every bound is usable.
    ///
    /// # Errors
    ///
    /// [`TaxError::InvalidSolverConfig`] if `max_income` or `tolerance` is
    /// not positive, `max_income` is above [`max_income_limit`], or
    /// `max_iterations` is zero.
    pub fn validate(&self) -> Result<(), TaxError> {
        if self.max_income <= Decimal::ZERO {
            return Err(TaxError::InvalidSolverConfig(format!(
                "max_income must be positive, got {}",
                self.max_income
            )));
        }
        let limit = max_income_limit();
        if self.max_income > limit {
            return Err(TaxError::InvalidSolverConfig(format!(
                "max_income must not exceed {limit}, got {}",
                self.max_income
            )));
        }
        check_tolerance(self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(TaxError::InvalidSolverConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Largest usable search ceiling.
///
/// Federal plus regional tax is at most twice the income, so half of
/// [`Decimal::MAX`] keeps every sum in the search representable.
pub fn max_income_limit() -> Decimal {
    Decimal::MAX / Decimal::TWO
}

fn check_tolerance(tolerance: Decimal) -> Result<(), TaxError> {
    if tolerance <= Decimal::ZERO {
        return Err(TaxError::InvalidSolverConfig(format!(
            "tolerance must be positive, got {tolerance}"
        )));
    }
    Ok(())
}

/// Bisection search for the income behind a total tax amount.
#[derive(Debug, Clone)]
pub struct InverseIncomeSolver<'a> {
    calculator: CombinedTaxCalculator<'a>,
    config: SolverConfig,
}

impl<'a> InverseIncomeSolver<'a> {
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidSolverConfig`] if `config` does not validate.
    pub fn new(
        schedule: &'a TaxSchedule,
        config: SolverConfig,
    ) -> Result<Self, TaxError> {
        config.validate()?;
        Ok(Self {
            calculator: CombinedTaxCalculator::new(schedule),
            config,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// [`Self::income_for_tax`] with the configured default tolerance.
    pub fn income_for_tax_default(
        &self,
        target_tax: Decimal,
        region: &str,
    ) -> Result<Decimal, TaxError> {
        self.income_for_tax(target_tax, region, self.config.tolerance)
    }

    /// The lowest income whose combined tax in `region` reaches `target_tax`,
    /// within `tolerance` and rounded to the tolerance's precision.
    ///
    /// # Errors
    ///
    /// * [`TaxError::NegativeInput`] if `target_tax` is negative.
    /// * [`TaxError::InvalidSolverConfig`] if `tolerance` is not positive.
    /// * [`TaxError::UnknownRegion`] if `region` has no table.
    /// * [`TaxError::OutOfRange`] if `target_tax` is more than the tax owed at
    ///   the configured `max_income`.
    /// * [`TaxError::NotConverged`] if `max_iterations` is too small for the
    ///   requested tolerance.
    pub fn income_for_tax(
        &self,
        target_tax: Decimal,
        region: &str,
        tolerance: Decimal,
    ) -> Result<Decimal, TaxError> {
        if target_tax < Decimal::ZERO {
            return Err(TaxError::NegativeInput {
                field: "target tax",
                value: target_tax,
            });
        }
        check_tolerance(tolerance)?;

        let ceiling = self.config.max_income;
        let ceiling_tax = self.calculator.total_tax(ceiling, region)?;
        if target_tax > ceiling_tax {
            return Err(TaxError::OutOfRange {
                target: target_tax,
                ceiling,
                ceiling_tax,
            });
        }

        // Zero tax is first reached at zero income, even under a 0% bottom bracket.
        if target_tax.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let mut lo = Decimal::ZERO;
        let mut hi = ceiling;
        let mut iterations = 0;
        while hi - lo > tolerance {
            if iterations == self.config.max_iterations {
                return Err(TaxError::NotConverged { iterations });
            }
            iterations += 1;

            let mid = lo + (hi - lo) / Decimal::TWO;
            let tax = self.calculator.total_tax(mid, region)?;
            trace!(iterations, %lo, %hi, %mid, %tax, "bisection step");
            if tax < target_tax {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let income = round_to_tolerance(lo + (hi - lo) / Decimal::TWO, tolerance);
        debug!(%target_tax, region, %income, iterations, "solved income for tax");
        Ok(income)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, proptest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{BracketRow, BracketTable, Jurisdiction, RegionCode};

    fn region(code: &str) -> Jurisdiction {
        Jurisdiction::Region(RegionCode::new(code).unwrap())
    }

    fn test_schedule() -> TaxSchedule {
        let federal = BracketTable::new(
            Jurisdiction::Federal,
            vec![
                BracketRow::new(dec!(0), Some(dec!(50000)), dec!(0.15)),
                BracketRow::new(dec!(50000), None, dec!(0.26)),
            ],
        )
        .unwrap();
        let on = BracketTable::new(
            region("ON"),
            vec![
                BracketRow::new(dec!(0), Some(dec!(40000)), dec!(0.05)),
                BracketRow::new(dec!(40000), None, dec!(0.10)),
            ],
        )
        .unwrap();
        let yt = BracketTable::new(
            region("YT"),
            vec![
                BracketRow::new(dec!(0), Some(dec!(15000)), dec!(0)),
                BracketRow::new(dec!(15000), None, dec!(0.064)),
            ],
        )
        .unwrap();

        TaxSchedule::new(federal, [on, yt]).unwrap()
    }

    fn solver(schedule: &TaxSchedule) -> InverseIncomeSolver<'_> {
        InverseIncomeSolver::new(schedule, SolverConfig::default()).unwrap()
    }

    fn cents(value: u64) -> Decimal {
        Decimal::new(value as i64, 2)
    }

    // =========================================================================
    // SolverConfig tests
    // =========================================================================

    #[test]
    fn config_rejects_non_positive_ceiling() {
        let config = SolverConfig {
            max_income: dec!(0),
            ..SolverConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(TaxError::InvalidSolverConfig(_))
        ));
    }

    #[test]
    fn config_rejects_non_positive_tolerance() {
        let config = SolverConfig {
            tolerance: dec!(-0.01),
            ..SolverConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(TaxError::InvalidSolverConfig(_))
        ));
    }

    #[test]
    fn config_rejects_zero_iterations() {
        let config = SolverConfig {
            max_iterations: 0,
            ..SolverConfig::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_ceiling_beyond_limit() {
        let config = SolverConfig {
            max_income: Decimal::MAX,
            ..SolverConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(TaxError::InvalidSolverConfig(_))
        ));
        assert!(InverseIncomeSolver::new(&test_schedule(), config).is_err());
    }

    #[test]
    fn ceiling_at_limit_solves_without_overflow() {
        let schedule = test_schedule();
        let config = SolverConfig {
            max_income: max_income_limit(),
            ..SolverConfig::default()
        };
        let solver = InverseIncomeSolver::new(&schedule, config).unwrap();

        let income = solver.income_for_tax(dec!(14100), "ON", dec!(0.01)).unwrap();
        assert!((income - dec!(60000)).abs() <= dec!(0.01), "got {income}");

        let near_ceiling = CombinedTaxCalculator::new(&schedule)
            .total_tax(max_income_limit() / dec!(4), "ON")
            .unwrap();
        assert!(matches!(
            solver.income_for_tax(near_ceiling, "ON", dec!(0.01)),
            Ok(_) | Err(TaxError::NotConverged { .. })
        ));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let schedule = test_schedule();
        let config = SolverConfig {
            tolerance: dec!(0),
            ..SolverConfig::default()
        };

        assert!(InverseIncomeSolver::new(&schedule, config).is_err());
    }

    // =========================================================================
    // income_for_tax tests
    // =========================================================================

    #[test]
    fn recovers_two_bracket_scenario_income() {
        let schedule = test_schedule();

        let income = solver(&schedule)
            .income_for_tax(dec!(14100), "ON", dec!(0.01))
            .unwrap();

        assert!((income - dec!(60000)).abs() <= dec!(0.01), "got {income}");
    }

    #[test]
    fn result_is_rounded_to_tolerance_precision() {
        let schedule = test_schedule();

        let income = solver(&schedule)
            .income_for_tax(dec!(14100), "ON", dec!(0.01))
            .unwrap();

        assert!(income.scale() <= 2, "got {income}");
    }

    #[test]
    fn coarse_tolerance_rounds_to_whole_units() {
        let schedule = test_schedule();

        let income = solver(&schedule)
            .income_for_tax(dec!(14100), "ON", dec!(1))
            .unwrap();

        assert_eq!(income, dec!(60000));
    }

    #[test]
    fn zero_tax_is_zero_income() {
        let schedule = test_schedule();

        assert_eq!(
            solver(&schedule).income_for_tax(dec!(0), "ON", dec!(0.01)),
            Ok(dec!(0))
        );
    }

    #[test]
    fn zero_tax_is_zero_income_under_zero_rate_bracket() {
        let schedule = test_schedule();

        assert_eq!(
            solver(&schedule).income_for_tax(dec!(0), "YT", dec!(0.01)),
            Ok(dec!(0))
        );
    }

    #[test]
    fn default_tolerance_matches_explicit_cent() {
        let schedule = test_schedule();
        let solver = solver(&schedule);

        assert_eq!(
            solver.income_for_tax_default(dec!(5000), "ON"),
            solver.income_for_tax(dec!(5000), "ON", dec!(0.01))
        );
    }

    #[test]
    fn negative_target_is_rejected() {
        let schedule = test_schedule();

        assert_eq!(
            solver(&schedule).income_for_tax(dec!(-1), "ON", dec!(0.01)),
            Err(TaxError::NegativeInput {
                field: "target tax",
                value: dec!(-1)
            })
        );
    }

    #[test]
    fn non_positive_tolerance_is_rejected() {
        let schedule = test_schedule();

        assert!(matches!(
            solver(&schedule).income_for_tax(dec!(100), "ON", dec!(0)),
            Err(TaxError::InvalidSolverConfig(_))
        ));
    }

    #[test]
    fn unknown_region_is_rejected() {
        let schedule = test_schedule();

        assert_eq!(
            solver(&schedule).income_for_tax(dec!(100), "ZZ", dec!(0.01)),
            Err(TaxError::UnknownRegion("ZZ".to_string()))
        );
    }

    #[test]
    fn target_above_ceiling_is_out_of_range() {
        let schedule = test_schedule();
        let config = SolverConfig {
            max_income: dec!(100000),
            ..SolverConfig::default()
        };
        let solver = InverseIncomeSolver::new(&schedule, config).unwrap();

        // At 100000: 7500 + 13000 + 2000 + 6000
        let result = solver.income_for_tax(dec!(28500.01), "ON", dec!(0.01));

        assert_eq!(
            result,
            Err(TaxError::OutOfRange {
                target: dec!(28500.01),
                ceiling: dec!(100000),
                ceiling_tax: dec!(28500),
            })
        );
    }

    #[test]
    fn target_exactly_at_ceiling_is_in_range() {
        let schedule = test_schedule();
        let config = SolverConfig {
            max_income: dec!(100000),
            ..SolverConfig::default()
        };
        let solver = InverseIncomeSolver::new(&schedule, config).unwrap();

        let income = solver
            .income_for_tax(dec!(28500), "ON", dec!(0.01))
            .unwrap();

        assert!((income - dec!(100000)).abs() <= dec!(0.01), "got {income}");
    }

    #[test]
    fn too_few_iterations_is_reported() {
        let schedule = test_schedule();
        let config = SolverConfig {
            max_iterations: 5,
            ..SolverConfig::default()
        };
        let solver = InverseIncomeSolver::new(&schedule, config).unwrap();

        assert_eq!(
            solver.income_for_tax(dec!(14100), "ON", dec!(0.01)),
            Err(TaxError::NotConverged { iterations: 5 })
        );
    }

    #[test]
    fn finds_lowest_income_past_zero_rate_bracket() {
        let schedule = test_schedule();

        // YT is 0% up to 15000, so the first cent of regional tax comes after it.
        let income = solver(&schedule)
            .income_for_tax(dec!(2250), "YT", dec!(0.01))
            .unwrap();

        // 15000 * 0.15 federal, no regional tax yet.
        assert!((income - dec!(15000)).abs() <= dec!(0.01), "got {income}");
    }

    proptest! {
        #[test]
        fn round_trips_through_total_tax(income in 0u64..500_000_000) {
            let schedule = test_schedule();
            let calculator = CombinedTaxCalculator::new(&schedule);
            let income = cents(income);

            let tax = calculator.total_tax(income, "ON").unwrap();
            let solved = solver(&schedule).income_for_tax(tax, "ON", dec!(0.01)).unwrap();

            prop_assert!((solved - income).abs() <= dec!(0.01), "income {} solved {}", income, solved);
        }

        #[test]
        fn solved_income_reaches_target(target in 1u64..200_000_000) {
            let schedule = test_schedule();
            let calculator = CombinedTaxCalculator::new(&schedule);
            let target = cents(target);

            let solved = solver(&schedule).income_for_tax(target, "ON", dec!(0.01)).unwrap();
            let tax_above = calculator.total_tax(solved + dec!(0.01), "ON").unwrap();

            prop_assert!(tax_above >= target);
        }
    }
}
