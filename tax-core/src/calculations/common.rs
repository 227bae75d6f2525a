//! Rounding helpers shared by the calculators and the presentation layer.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Number of decimal places a tolerance is expressed in.
///
/// Trailing zeros are ignored, so `0.010` and `0.01` both give 2 and `5` gives 0.
pub fn precision_of(tolerance: Decimal) -> u32 {
    tolerance.normalize().scale()
}

/// Rounds `value` half-up to the decimal precision of `tolerance`.
///
/// The rounding error is at most half a unit in the tolerance's last place,
/// which never exceeds half the tolerance itself.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_to_tolerance;
///
/// assert_eq!(round_to_tolerance(dec!(60000.004657), dec!(0.01)), dec!(60000.00));
/// assert_eq!(round_to_tolerance(dec!(60000.5), dec!(1)), dec!(60001));
/// ```
pub fn round_to_tolerance(
    value: Decimal,
    tolerance: Decimal,
) -> Decimal {
    value.round_dp_with_strategy(
        precision_of(tolerance),
        RoundingStrategy::MidpointAwayFromZero,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    // =========================================================================
    // precision_of tests
    // =========================================================================

    #[test]
    fn precision_of_cent_tolerance() {
        assert_eq!(precision_of(dec!(0.01)), 2);
    }

    #[test]
    fn precision_of_ignores_trailing_zeros() {
        assert_eq!(precision_of(dec!(0.0100)), 2);
        assert_eq!(precision_of(dec!(1.0)), 0);
    }

    #[test]
    fn precision_of_whole_units() {
        assert_eq!(precision_of(dec!(5)), 0);
        assert_eq!(precision_of(dec!(100)), 0);
    }

    #[test]
    fn precision_of_fractional_tolerance() {
        assert_eq!(precision_of(dec!(0.25)), 2);
        assert_eq!(precision_of(dec!(0.5)), 1);
    }

    // =========================================================================
    // round_to_tolerance tests
    // =========================================================================

    #[test]
    fn round_to_tolerance_uses_tolerance_places() {
        assert_eq!(round_to_tolerance(dec!(1.23456), dec!(0.001)), dec!(1.235));
        assert_eq!(round_to_tolerance(dec!(1.23456), dec!(0.1)), dec!(1.2));
    }

    #[test]
    fn round_to_tolerance_rounds_midpoint_up() {
        assert_eq!(round_to_tolerance(dec!(0.005), dec!(0.01)), dec!(0.01));
    }
}
