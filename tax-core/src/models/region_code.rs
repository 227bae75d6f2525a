use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TaxError;

/// A region identifier such as `ON` or `BC`.
///
/// Codes are stored trimmed and uppercased, so equality, ordering and map
/// lookups are all case-insensitive.
///
/// ```
/// use tax_core::RegionCode;
///
/// let code = RegionCode::new(" on ").unwrap();
/// assert_eq!(code.as_str(), "ON");
/// assert_eq!(code, RegionCode::new("ON").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode(String);

impl RegionCode {
    pub fn new(code: &str) -> Result<Self, TaxError> {
        let normalized = code.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(TaxError::InvalidRegionCode);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RegionCode {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = TaxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<RegionCode> for String {
    fn from(code: RegionCode) -> Self {
        code.0
    }
}

/// The tax authority a bracket table belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    Federal,
    Region(RegionCode),
}

impl Jurisdiction {
    pub fn is_federal(&self) -> bool {
        matches!(self, Self::Federal)
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Federal => f.write_str("federal"),
            Self::Region(code) => write!(f, "region {code}"),
        }
    }
}
