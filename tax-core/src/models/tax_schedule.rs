use std::collections::BTreeMap;

use serde::Serialize;

use crate::TaxError;
use crate::models::{BracketTable, Jurisdiction, RegionCode};

/// A federal bracket table plus at most one table per region.
///
/// Built once by the loader and then only read. Calculators borrow it, so a
/// single schedule can serve any number of concurrent queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxSchedule {
    federal: BracketTable,
    regions: BTreeMap<RegionCode, BracketTable>,
}

impl TaxSchedule {
    /// Assembles a schedule from already validated tables.
    ///
    /// # Errors
    ///
    /// * [`TaxError::JurisdictionMismatch`] if `federal` is a regional table
    ///   or a regional table is marked federal.
    /// * [`TaxError::DuplicateRegion`] if two tables share a region.
    pub fn new(
        federal: BracketTable,
        regional: impl IntoIterator<Item = BracketTable>,
    ) -> Result<Self, TaxError> {
        if !federal.jurisdiction().is_federal() {
            return Err(TaxError::JurisdictionMismatch {
                expected: "federal",
                actual: federal.jurisdiction().clone(),
            });
        }

        let mut regions = BTreeMap::new();
        for table in regional {
            let code = match table.jurisdiction() {
                Jurisdiction::Region(code) => code.clone(),
                Jurisdiction::Federal => {
                    return Err(TaxError::JurisdictionMismatch {
                        expected: "regional",
                        actual: Jurisdiction::Federal,
                    });
                }
            };
            if regions.contains_key(&code) {
                return Err(TaxError::DuplicateRegion(code));
            }
            regions.insert(code, table);
        }

        Ok(Self { federal, regions })
    }

    pub fn federal(&self) -> &BracketTable {
        &self.federal
    }

    /// Looks up a regional table, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// [`TaxError::UnknownRegion`] when no table matches.
    pub fn regional(
        &self,
        region: &str,
    ) -> Result<&BracketTable, TaxError> {
        RegionCode::new(region)
            .ok()
            .and_then(|code| self.regions.get(&code))
            .ok_or_else(|| TaxError::UnknownRegion(region.trim().to_string()))
    }

    /// Known region codes in sorted order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionCode> {
        self.regions.keys()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}
