mod region_code;
mod tax_bracket;
mod tax_estimate;
mod tax_schedule;

pub use region_code::{Jurisdiction, RegionCode};
pub use tax_bracket::{BracketRow, BracketTable};
pub use tax_estimate::{TaxBreakdown, TaxQuery};
pub use tax_schedule::TaxSchedule;
