//! Creditor profile
//!
//! The creditor side of every generated file: who collects, into which
//! account, and how many records one file and one batch may hold.

use super::errors::SddError;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named bank settings a creditor profile is assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Iban,
    Bic,
    CreditorId,
    Currency,
    RecordsPerFile,
    RecordsPerSequenceType,
    Upload,
}

impl SettingKey {
    /// All keys, in the order they are resolved
    pub const ALL: [SettingKey; 7] = [
        SettingKey::Iban,
        SettingKey::Bic,
        SettingKey::CreditorId,
        SettingKey::Currency,
        SettingKey::RecordsPerFile,
        SettingKey::RecordsPerSequenceType,
        SettingKey::Upload,
    ];

    /// Setting name as stored in bank configuration
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::Iban => "IBAN",
            SettingKey::Bic => "BIC",
            SettingKey::CreditorId => "CREDITOR_ID",
            SettingKey::Currency => "CURRENCY",
            SettingKey::RecordsPerFile => "RECORDS_PER_FILE",
            SettingKey::RecordsPerSequenceType => "RECORDS_PER_SEQUENCE_TYPE",
            SettingKey::Upload => "UPLOAD",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Creditor configuration for one bank account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditorProfile {
    /// Creditor (and initiating party) name
    pub name: String,
    /// Account the instructions are collected into
    pub iban: String,
    /// Creditor bank BIC
    pub bic: String,
    /// SEPA creditor scheme identifier
    pub creditor_id: String,
    /// ISO 4217 currency of the instructed amounts
    pub currency: String,
    /// Maximum records per file, 0 means unlimited
    pub records_per_file: u64,
    /// Maximum records per sequence-type batch, 0 means the file cap
    pub records_per_sequence_type: u64,
    /// Whether the delivery pipeline should upload generated files
    pub upload: bool,
}

impl CreditorProfile {
    /// Assembles a profile from named settings
    ///
    /// `lookup` returns the raw value of a setting or `None` when it is not
    /// configured. IBAN, BIC and CREDITOR_ID are required; CURRENCY defaults
    /// to `EUR`, the record caps default to 0 and UPLOAD to false.
    ///
    /// # Errors
    ///
    /// Returns [`SddError::Configuration`] when a required setting is missing
    /// or a cap is not a non-negative integer.
    pub fn from_settings<F>(name: impl Into<String>, lookup: F) -> Result<Self>
    where
        F: Fn(SettingKey) -> Option<String>,
    {
        let required = |key: SettingKey| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SddError::Configuration(format!("bank setting {key} is missing")))
        };

        let cap = |key: SettingKey| -> Result<u64> {
            match lookup(key).map(|v| v.trim().to_string()) {
                None => Ok(0),
                Some(v) if v.is_empty() => Ok(0),
                Some(v) => v.parse::<u64>().map_err(|_| {
                    SddError::Configuration(format!(
                        "bank setting {key} must be a non-negative integer, got '{v}'"
                    ))
                }),
            }
        };

        Ok(Self {
            name: name.into(),
            iban: required(SettingKey::Iban)?,
            bic: required(SettingKey::Bic)?,
            creditor_id: required(SettingKey::CreditorId)?,
            currency: lookup(SettingKey::Currency)
                .map(|v| v.trim().to_uppercase())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "EUR".to_string()),
            records_per_file: cap(SettingKey::RecordsPerFile)?,
            records_per_sequence_type: cap(SettingKey::RecordsPerSequenceType)?,
            upload: lookup(SettingKey::Upload)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
