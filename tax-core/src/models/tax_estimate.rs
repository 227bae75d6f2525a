use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::RegionCode;

/// A single income/region pair handed to the calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxQuery {
    pub income: Decimal,
    pub region: RegionCode,
}

/// Every figure of a forward calculation, for presentation.
///
/// `total_tax == federal_tax + regional_tax` and
/// `net_income == income - total_tax` hold exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub income: Decimal,
    pub region: RegionCode,
    pub federal_tax: Decimal,
    pub regional_tax: Decimal,
    pub total_tax: Decimal,
    pub net_income: Decimal,

    /// Marginal rate of the regional bracket holding `income`.
    /// `None` means no bracket matched, which is not the same as a 0% bracket.
    pub regional_rate: Option<Decimal>,
}
