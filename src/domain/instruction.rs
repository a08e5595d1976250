//! Direct debit instruction model
//!
//! An [`Instruction`] is one collection from one debtor. Field values are kept
//! exactly as stored: amount, mandate signature date and sequence type are raw
//! text so that the validator, not the loader, decides whether they are usable.

use super::ids::{InstructionId, ScheduleId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment method value that makes an instruction eligible for SDD generation
pub const DIRECT_DEBIT: &str = "Direct Debit";

/// SEPA sequence type of a collection within its mandate lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SequenceType {
    /// First collection of a recurrent mandate
    #[serde(rename = "FRST")]
    First,
    /// Recurrent collection
    #[serde(rename = "RCUR")]
    Recurrent,
    /// Final collection of a recurrent mandate
    #[serde(rename = "FNAL")]
    Final,
    /// One-off collection
    #[serde(rename = "OOFF")]
    OneOff,
}

impl SequenceType {
    /// All sequence types
    pub const ALL: [SequenceType; 4] = [
        SequenceType::First,
        SequenceType::Recurrent,
        SequenceType::Final,
        SequenceType::OneOff,
    ];

    /// Returns the ISO 20022 code
    pub fn code(&self) -> &'static str {
        match self {
            SequenceType::First => "FRST",
            SequenceType::Recurrent => "RCUR",
            SequenceType::Final => "FNAL",
            SequenceType::OneOff => "OOFF",
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for SequenceType {
    type Err = String;

    /// Parses a sequence type code. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SequenceType::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| format!("'{s}' is not one of FRST, RCUR, FNAL, OOFF"))
    }
}

/// Processing status of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstructionStatus {
    /// Emitted into a generated file and waiting for collection
    New,
    /// Collected by the bank
    Collected,
    /// Rejected during generation, see the failure reason
    Failed,
    /// Waiting for manual verification
    #[serde(rename = "Pending Verification")]
    PendingVerification,
}

impl InstructionStatus {
    /// Returns the stored representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionStatus::New => "New",
            InstructionStatus::Collected => "Collected",
            InstructionStatus::Failed => "Failed",
            InstructionStatus::PendingVerification => "Pending Verification",
        }
    }
}

impl fmt::Display for InstructionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InstructionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(InstructionStatus::New),
            "Collected" => Ok(InstructionStatus::Collected),
            "Failed" => Ok(InstructionStatus::Failed),
            "Pending Verification" => Ok(InstructionStatus::PendingVerification),
            other => Err(format!("Unknown instruction status '{other}'")),
        }
    }
}

/// A single direct debit instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Store identifier (insertion position)
    pub id: InstructionId,

    /// Schedule the instruction belongs to
    pub schedule_id: ScheduleId,

    /// Debtor account holder name
    pub account_holder_name: String,

    /// Debtor IBAN
    pub iban: String,

    /// Debtor bank BIC
    pub bic: String,

    /// Amount in minor units, as stored
    pub amount: String,

    /// Mandate reference
    pub mandate_id: String,

    /// Mandate signature date, as stored (`YYYY-MM-DD`)
    pub mandate_signed_on: String,

    /// Due (collection) date
    pub due_date: NaiveDate,

    /// Sequence type code, as stored
    pub sequence_type: String,

    /// End-to-end reference handed to the debtor bank
    pub end_to_end_id: String,

    /// Unstructured remittance text
    pub remittance_info: String,

    /// Payment method, only [`DIRECT_DEBIT`] is eligible
    #[serde(default = "default_payment_method")]
    pub payment_method: String,

    /// Creditor IBAN this instruction is collected into
    pub destination_iban: String,

    /// Processing status
    #[serde(default = "default_status")]
    pub status: InstructionStatus,

    /// Reason of the last failed generation attempt
    #[serde(default)]
    pub last_failure_reason: Option<String>,
}

fn default_payment_method() -> String {
    DIRECT_DEBIT.to_string()
}

fn default_status() -> InstructionStatus {
    InstructionStatus::New
}

impl Instruction {
    /// Returns a builder for constructing an instruction
    pub fn builder() -> InstructionBuilder {
        InstructionBuilder::default()
    }

    /// Whether this instruction takes part in a run for the given creditor IBAN
    pub fn is_eligible_for(&self, creditor_iban: &str) -> bool {
        self.payment_method == DIRECT_DEBIT && self.destination_iban == creditor_iban
    }
}

/// Builder for [`Instruction`]
///
/// Only the identifiers, the due date and the destination IBAN are required;
/// every text field defaults to empty so tests can construct broken records.
#[derive(Debug, Default)]
pub struct InstructionBuilder {
    id: Option<InstructionId>,
    schedule_id: Option<ScheduleId>,
    account_holder_name: String,
    iban: String,
    bic: String,
    amount: String,
    mandate_id: String,
    mandate_signed_on: String,
    due_date: Option<NaiveDate>,
    sequence_type: String,
    end_to_end_id: String,
    remittance_info: String,
    payment_method: Option<String>,
    destination_iban: Option<String>,
}

impl InstructionBuilder {
    /// Creates a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instruction ID
    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(InstructionId::new(id));
        self
    }

    /// Sets the schedule ID
    pub fn schedule_id(mut self, id: ScheduleId) -> Self {
        self.schedule_id = Some(id);
        self
    }

    /// Sets the debtor name
    pub fn account_holder_name(mut self, name: impl Into<String>) -> Self {
        self.account_holder_name = name.into();
        self
    }

    /// Sets the debtor IBAN
    pub fn iban(mut self, iban: impl Into<String>) -> Self {
        self.iban = iban.into();
        self
    }

    /// Sets the debtor BIC
    pub fn bic(mut self, bic: impl Into<String>) -> Self {
        self.bic = bic.into();
        self
    }

    /// Sets the raw amount in minor units
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }

    /// Sets the mandate reference
    pub fn mandate_id(mut self, mandate_id: impl Into<String>) -> Self {
        self.mandate_id = mandate_id.into();
        self
    }

    /// Sets the raw mandate signature date
    pub fn mandate_signed_on(mut self, date: impl Into<String>) -> Self {
        self.mandate_signed_on = date.into();
        self
    }

    /// Sets the due date
    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    /// Sets the raw sequence type code
    pub fn sequence_type(mut self, code: impl Into<String>) -> Self {
        self.sequence_type = code.into();
        self
    }

    /// Sets the end-to-end reference
    pub fn end_to_end_id(mut self, reference: impl Into<String>) -> Self {
        self.end_to_end_id = reference.into();
        self
    }

    /// Sets the remittance text
    pub fn remittance_info(mut self, text: impl Into<String>) -> Self {
        self.remittance_info = text.into();
        self
    }

    /// Sets the payment method
    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    /// Sets the destination (creditor) IBAN
    pub fn destination_iban(mut self, iban: impl Into<String>) -> Self {
        self.destination_iban = Some(iban.into());
        self
    }

    /// Builds the Instruction
    ///
    /// # Errors
    ///
    /// Returns an error if any required field is missing
    pub fn build(self) -> Result<Instruction, String> {
        Ok(Instruction {
            id: self.id.ok_or("id is required")?,
            schedule_id: self.schedule_id.ok_or("schedule_id is required")?,
            account_holder_name: self.account_holder_name,
            iban: self.iban,
            bic: self.bic,
            amount: self.amount,
            mandate_id: self.mandate_id,
            mandate_signed_on: self.mandate_signed_on,
            due_date: self.due_date.ok_or("due_date is required")?,
            sequence_type: self.sequence_type,
            end_to_end_id: self.end_to_end_id,
            remittance_info: self.remittance_info,
            payment_method: self.payment_method.unwrap_or_else(default_payment_method),
            destination_iban: self.destination_iban.ok_or("destination_iban is required")?,
            status: InstructionStatus::New,
            last_failure_reason: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InstructionBuilder {
        Instruction::builder()
            .id(1)
            .schedule_id(ScheduleId::new(7))
            .due_date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .destination_iban("NL91ABNA0417164300")
    }

    #[test]
    fn test_sequence_type_is_case_sensitive() {
        assert_eq!("RCUR".parse::<SequenceType>(), Ok(SequenceType::Recurrent));
        assert!("rcur".parse::<SequenceType>().is_err());
        assert!("".parse::<SequenceType>().is_err());
    }

    #[test]
    fn test_sequence_type_serde_uses_codes() {
        let json = serde_json::to_string(&SequenceType::OneOff).unwrap();
        assert_eq!(json, "\"OOFF\"");
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [
            InstructionStatus::New,
            InstructionStatus::Collected,
            InstructionStatus::Failed,
            InstructionStatus::PendingVerification,
        ] {
            assert_eq!(status.as_str().parse::<InstructionStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_builder_defaults() {
        let instruction = sample().build().unwrap();
        assert_eq!(instruction.payment_method, DIRECT_DEBIT);
        assert_eq!(instruction.status, InstructionStatus::New);
        assert!(instruction.amount.is_empty());
    }

    #[test]
    fn test_builder_missing_field() {
        let result = Instruction::builder().id(1).build();
        assert!(result.unwrap_err().contains("schedule_id is required"));
    }

    #[test]
    fn test_eligibility() {
        let instruction = sample().build().unwrap();
        assert!(instruction.is_eligible_for("NL91ABNA0417164300"));
        assert!(!instruction.is_eligible_for("DE89370400440532013000"));

        let card = sample().payment_method("Credit Card").build().unwrap();
        assert!(!card.is_eligible_for("NL91ABNA0417164300"));
    }
}
