use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{BracketRow, BracketTable, Jurisdiction, RegionCode, TaxError, TaxSchedule};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur when loading bracket tables.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    /// `row` is 1-based, counting data rows only.
    #[error("invalid region code '{value}' on row {row}")]
    InvalidRegion { value: String, row: usize },

    #[error("cannot open '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rows parsed, but do not form a valid table or schedule.
    #[error("invalid bracket schedule: {0}")]
    Schedule(#[from] TaxError),
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

static REGION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("region pattern is valid")
});

/// A single record from the federal brackets CSV file.
///
/// - `low_range`: lower bound of the bracket
/// - `high_range`: upper bound (empty, `inf` or `infinity` for unlimited)
/// - `tax_rate`: marginal rate as a decimal (e.g., 0.15 for 15%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FederalBracketRecord {
    pub low_range: Decimal,
    #[serde(deserialize_with = "deserialize_upper_bound")]
    pub high_range: Option<Decimal>,
    pub tax_rate: Decimal,
}

/// A single record from the regional brackets CSV file.
///
/// Same columns as [`FederalBracketRecord`] plus `prov`, the region code.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegionalBracketRecord {
    pub prov: String,
    pub low_range: Decimal,
    #[serde(deserialize_with = "deserialize_upper_bound")]
    pub high_range: Option<Decimal>,
    pub tax_rate: Decimal,
}

fn deserialize_upper_bound<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("inf") || s.eq_ignore_ascii_case("infinity") => {
            Ok(None)
        }
        Some(s) => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Loader for federal and regional bracket tables stored as CSV.
///
/// Parsing and validation both happen here; the tables handed to
/// [`TaxSchedule`] are already known to be well formed.
pub struct ScheduleLoader;

impl ScheduleLoader {
    fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
    }

    /// Parse the federal bracket table from a CSV reader.
    ///
    /// Rows may appear in any order; they are sorted by `low_range` before
    /// validation.
    pub fn parse_federal<R: Read>(reader: R) -> Result<BracketTable, LoaderError> {
        let mut rows = Vec::new();
        for result in Self::csv_reader(reader).deserialize() {
            let record: FederalBracketRecord = result?;
            rows.push(BracketRow::new(
                record.low_range,
                record.high_range,
                record.tax_rate,
            ));
        }
        rows.sort_by(|a, b| a.low.cmp(&b.low));

        Ok(BracketTable::new(Jurisdiction::Federal, rows)?)
    }

    /// Parse every regional bracket table from a CSV reader.
    ///
    /// Rows are grouped by region code, case-insensitively, and each group is
    /// sorted by `low_range` before validation. Tables come back ordered by
    /// region code.
    pub fn parse_regional<R: Read>(reader: R) -> Result<Vec<BracketTable>, LoaderError> {
        let mut groups: BTreeMap<RegionCode, Vec<BracketRow>> = BTreeMap::new();

        for (idx, result) in Self::csv_reader(reader).deserialize().enumerate() {
            let record: RegionalBracketRecord = result?;
            let code = parse_region(&record.prov, idx + 1)?;
            groups.entry(code).or_default().push(BracketRow::new(
                record.low_range,
                record.high_range,
                record.tax_rate,
            ));
        }

        groups
            .into_iter()
            .map(|(code, mut rows)| {
                rows.sort_by(|a, b| a.low.cmp(&b.low));
                BracketTable::new(Jurisdiction::Region(code), rows).map_err(LoaderError::from)
            })
            .collect()
    }

    /// Parse both files and assemble a [`TaxSchedule`].
    pub fn load_schedule<F: Read, P: Read>(
        federal: F,
        regional: P,
    ) -> Result<TaxSchedule, LoaderError> {
        let federal = Self::parse_federal(federal)?;
        let regional = Self::parse_regional(regional)?;
        let schedule = TaxSchedule::new(federal, regional)?;

        if schedule.region_count() == 0 {
            warn!("regional bracket file contains no regions");
        }
        info!(
            federal_brackets = schedule.federal().rows().len(),
            regions = schedule.region_count(),
            "loaded bracket schedule"
        );

        Ok(schedule)
    }

    /// Open both files from disk and delegate to [`Self::load_schedule`].
    pub fn load_schedule_from_paths(
        federal: &Path,
        regional: &Path,
    ) -> Result<TaxSchedule, LoaderError> {
        let open = |path: &Path| {
            File::open(path).map_err(|source| LoaderError::Io {
                path: path.to_path_buf(),
                source,
            })
        };

        Self::load_schedule(open(federal)?, open(regional)?)
    }
}

fn parse_region(
    value: &str,
    row: usize,
) -> Result<RegionCode, LoaderError> {
    let invalid = || LoaderError::InvalidRegion {
        value: value.to_string(),
        row,
    };
    if !REGION_PATTERN.is_match(value.trim()) {
        return Err(invalid());
    }
    RegionCode::new(value).map_err(|_| invalid())
}
