//! Payment schedule model
//!
//! A schedule owns a set of instructions and the totals of the last generation
//! run, both as aggregate figures and as one row per generated batch.

use super::ids::ScheduleId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    /// Not generated yet
    New,
    /// Files generated, waiting for verification
    #[serde(rename = "Pending Verification")]
    PendingVerification,
}

impl ScheduleStatus {
    /// Returns the stored representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::New => "New",
            ScheduleStatus::PendingVerification => "Pending Verification",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(ScheduleStatus::New),
            "Pending Verification" => Ok(ScheduleStatus::PendingVerification),
            other => Err(format!("Unknown schedule status '{other}'")),
        }
    }
}

/// A payment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Schedule identifier
    pub id: ScheduleId,

    /// Date the schedule was selected for; used as requested collection date
    pub selection_date: NaiveDate,

    /// Number of records generated by the last run
    #[serde(default)]
    pub transactions: u64,

    /// Amount (minor units) generated by the last run
    #[serde(default)]
    pub amount: u64,

    /// Earliest due date of the last run
    #[serde(default)]
    pub first_collection_date: Option<NaiveDate>,

    /// Lifecycle status
    pub status: ScheduleStatus,
}

impl Schedule {
    /// Creates a new, never generated schedule
    pub fn new(id: ScheduleId, selection_date: NaiveDate) -> Self {
        Self {
            id,
            selection_date,
            transactions: 0,
            amount: 0,
            first_collection_date: None,
            status: ScheduleStatus::New,
        }
    }
}

/// Aggregate totals of one or more generated files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Number of records
    pub records: u64,
    /// Amount in minor units
    pub amount: u64,
    /// Earliest due date seen
    pub first_collection_date: Option<NaiveDate>,
}

impl RunTotals {
    /// Folds another set of totals into this one
    pub fn absorb(&mut self, other: &RunTotals) {
        self.records += other.records;
        self.amount = self.amount.saturating_add(other.amount);
        self.first_collection_date = match (self.first_collection_date, other.first_collection_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}

/// Persisted totals of one generated batch (payment information block)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotal {
    /// Creditor IBAN the batch was generated for
    pub creditor_iban: String,
    /// Sequence type code of the batch
    pub sequence_type: String,
    /// Payment information id
    pub batch_id: String,
    /// Number of transactions planned into the batch
    pub transactions: u64,
    /// Planned amount in minor units
    pub amount: u64,
    /// File the batch was written to
    pub filename: String,
    /// Message id of that file
    pub message_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_absorb_keeps_earliest_date() {
        let mut totals = RunTotals {
            records: 2,
            amount: 500,
            first_collection_date: Some(date(10)),
        };
        totals.absorb(&RunTotals {
            records: 3,
            amount: 250,
            first_collection_date: Some(date(4)),
        });

        assert_eq!(totals.records, 5);
        assert_eq!(totals.amount, 750);
        assert_eq!(totals.first_collection_date, Some(date(4)));
    }

    #[test]
    fn test_absorb_into_empty() {
        let mut totals = RunTotals::default();
        totals.absorb(&RunTotals {
            records: 1,
            amount: 1,
            first_collection_date: Some(date(1)),
        });
        assert_eq!(totals.first_collection_date, Some(date(1)));
    }

    #[test]
    fn test_schedule_status_serialization() {
        let json = serde_json::to_string(&ScheduleStatus::PendingVerification).unwrap();
        assert_eq!(json, "\"Pending Verification\"");
        assert_eq!("New".parse::<ScheduleStatus>(), Ok(ScheduleStatus::New));
    }
}
