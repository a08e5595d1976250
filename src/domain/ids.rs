//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through a generation run.
//! Each type keeps schedule, instruction and bank identifiers from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Payment schedule identifier
///
/// # Examples
///
/// ```
/// use sddgen::domain::ids::ScheduleId;
/// use std::str::FromStr;
///
/// let id = ScheduleId::from_str("42").unwrap();
/// assert_eq!(id.value(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(i64);

impl ScheduleId {
    /// Creates a new ScheduleId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScheduleId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| format!("Invalid schedule ID '{s}': expected an integer"))
    }
}

/// Instruction (single direct debit) identifier
///
/// Instructions are identified by their insertion position in the store,
/// which is also the tie-breaker of the deterministic sequence-type ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionId(i64);

impl InstructionId {
    /// Creates a new InstructionId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bank (creditor account configuration) identifier
///
/// # Examples
///
/// ```
/// use sddgen::domain::ids::BankId;
///
/// let bank = BankId::new("abn-main").unwrap();
/// assert_eq!(bank.as_str(), "abn-main");
/// assert!(BankId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankId(String);

impl BankId {
    /// Creates a new BankId from a string
    ///
    /// Returns `Err` if the identifier is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Bank ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the bank ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BankId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl AsRef<str> for BankId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of one generation run, used to correlate log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a fresh run identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_id_from_str() {
        let id: ScheduleId = " 17 ".parse().unwrap();
        assert_eq!(id, ScheduleId::new(17));
        assert!("abc".parse::<ScheduleId>().is_err());
    }

    #[test]
    fn test_instruction_id_ordering() {
        assert!(InstructionId::new(1) < InstructionId::new(2));
        assert_eq!(InstructionId::new(9).to_string(), "9");
    }

    #[test]
    fn test_bank_id_empty_fails() {
        assert!(BankId::new("").is_err());
        assert!(BankId::new("   ").is_err());
    }

    #[test]
    fn test_bank_id_serialization() {
        let id = BankId::new("rabo-collect").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"rabo-collect\"");
        let back: BankId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::generate(), RunId::generate());
    }
}
