//! Prefectural minimum wages.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One minimum-wage revision for a prefecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumWageRow {
    /// Prefecture name as it appears in work locations.
    pub prefecture: String,
    /// First day the wage applies.
    pub start_date: NaiveDate,
    /// Hourly minimum wage.
    pub hourly_wage: Decimal,
}

/// A resolved minimum wage for a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumWage {
    /// The prefecture the wage belongs to.
    pub prefecture: String,
    /// Hourly minimum wage.
    pub hourly_wage: Decimal,
}

/// Every known revision, in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimumWageTable {
    /// The revisions.
    #[serde(default)]
    pub rows: Vec<MinimumWageRow>,
}

impl MinimumWageTable {
    /// The wage in force on a date: the latest revision starting on or before it.
    pub fn lookup(&self, prefecture: &str, on_date: NaiveDate) -> Option<Decimal> {
        self.rows
            .iter()
            .filter(|row| row.prefecture == prefecture && row.start_date <= on_date)
            .max_by_key(|row| row.start_date)
            .map(|row| row.hourly_wage)
    }
}

/// Finds the first known prefecture named in a free-text work location.
pub fn parse_prefecture<'a>(location: &str, prefectures: &'a [String]) -> Option<&'a str> {
    prefectures
        .iter()
        .find(|name| !name.is_empty() && location.contains(name.as_str()))
        .map(String::as_str)
}
