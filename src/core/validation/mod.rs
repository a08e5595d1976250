//! Per-instruction validation
//!
//! The [`Validator`] decides whether one instruction may be written to a
//! file. It never fails as a run-level error: every problem is returned as a
//! [`ValidationError`] value that the caller records against the instruction.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. required fields, in [`Field::REQUIRED`] order
//! 2. functional checks, in [`Field::FUNCTIONAL`] order

pub mod iban;

pub use iban::{IbanCheck, Mod97IbanCheck};

use crate::config::ValidationConfig;
use crate::domain::money::parse_minor_units;
use crate::domain::{Instruction, Result, SddError, SequenceType};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::fmt;

const BIC_PATTERN: &str = r"[a-zA-Z]{4}[a-zA-Z]{2}[a-zA-Z0-9]{2}([a-zA-Z0-9]{3})?";
const MAX_END_TO_END_LEN: usize = 35;

/// Instruction fields the validator knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AccountHolderName,
    Iban,
    Bic,
    Amount,
    MandateId,
    MandateSignedOn,
    SequenceType,
    EndToEndId,
    RemittanceInfo,
}

impl Field {
    /// Fields that must be non-empty
    pub const REQUIRED: [Field; 6] = [
        Field::AccountHolderName,
        Field::Iban,
        Field::Amount,
        Field::MandateId,
        Field::MandateSignedOn,
        Field::RemittanceInfo,
    ];

    /// Fields with a functional check
    pub const FUNCTIONAL: [Field; 6] = [
        Field::Iban,
        Field::Bic,
        Field::Amount,
        Field::EndToEndId,
        Field::SequenceType,
        Field::MandateSignedOn,
    ];

    /// Stored field name
    pub fn name(&self) -> &'static str {
        match self {
            Field::AccountHolderName => "account_holder_name",
            Field::Iban => "iban",
            Field::Bic => "bic",
            Field::Amount => "amount",
            Field::MandateId => "mandate_id",
            Field::MandateSignedOn => "mandate_date_signed",
            Field::SequenceType => "sequence_type",
            Field::EndToEndId => "end_to_end_id",
            Field::RemittanceInfo => "remittance_info",
        }
    }

    /// Raw value of this field on an instruction
    pub fn value<'a>(&self, instruction: &'a Instruction) -> &'a str {
        match self {
            Field::AccountHolderName => &instruction.account_holder_name,
            Field::Iban => &instruction.iban,
            Field::Bic => &instruction.bic,
            Field::Amount => &instruction.amount,
            Field::MandateId => &instruction.mandate_id,
            Field::MandateSignedOn => &instruction.mandate_signed_on,
            Field::SequenceType => &instruction.sequence_type,
            Field::EndToEndId => &instruction.end_to_end_id,
            Field::RemittanceInfo => &instruction.remittance_info,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Why an instruction was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Required field is missing or blank
    Empty,
    /// Functional check failed
    Invalid(String),
    /// Valid, but its transaction block could not be emitted
    Emission(String),
}

/// A rejected instruction: the first field that failed and why
///
/// `field` is `None` for emission faults, which are not tied to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Option<Field>,
    pub violation: Violation,
}

impl ValidationError {
    fn empty(field: Field) -> Self {
        Self {
            field: Some(field),
            violation: Violation::Empty,
        }
    }

    fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            violation: Violation::Invalid(reason.into()),
        }
    }

    /// An instruction whose transaction block failed to emit
    pub fn emission(reason: impl Into<String>) -> Self {
        Self {
            field: None,
            violation: Violation::Emission(reason.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field.map(|field| field.name()).unwrap_or("transaction");
        match &self.violation {
            Violation::Empty => write!(f, "{field} is empty."),
            Violation::Invalid(reason) => write!(f, "{field} does not validate: {reason}"),
            Violation::Emission(reason) => write!(f, "{field} could not be written: {reason}"),
        }
    }
}

/// Values parsed while validating, in the form they are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckedInstruction {
    /// Amount in minor units
    pub amount: u64,
    pub mandate_signed_on: NaiveDate,
}

/// Stateless instruction validator
pub struct Validator {
    iban_check: Box<dyn IbanCheck>,
    bic: Regex,
    reject_future_mandates: bool,
    reference_date: Option<NaiveDate>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("bic", &self.bic.as_str())
            .field("reject_future_mandates", &self.reject_future_mandates)
            .finish()
    }
}

impl Validator {
    /// Creates a validator with the mod-97 IBAN check
    ///
    /// # Errors
    ///
    /// Returns an error if the BIC pattern cannot be compiled.
    pub fn new(config: &ValidationConfig) -> Result<Self> {
        Self::with_iban_check(config, Box::new(Mod97IbanCheck))
    }

    /// Creates a validator with a custom IBAN capability
    pub fn with_iban_check(config: &ValidationConfig, iban_check: Box<dyn IbanCheck>) -> Result<Self> {
        let pattern = if config.strict_bic {
            format!("^{BIC_PATTERN}$")
        } else {
            BIC_PATTERN.to_string()
        };
        let bic = Regex::new(&pattern)
            .map_err(|e| SddError::Configuration(format!("invalid BIC pattern: {e}")))?;

        Ok(Self {
            iban_check,
            bic,
            reject_future_mandates: config.reject_future_mandates,
            reference_date: None,
        })
    }

    /// Pins "today" for the future-mandate rule
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Validates an instruction
    ///
    /// On success the parsed amount and mandate date are returned, so the
    /// writer never parses them again.
    pub fn validate(
        &self,
        instruction: &Instruction,
    ) -> std::result::Result<CheckedInstruction, ValidationError> {
        for field in Field::REQUIRED {
            if field.value(instruction).trim().is_empty() {
                return Err(ValidationError::empty(field));
            }
        }

        let mut checked = CheckedInstruction::default();
        for field in Field::FUNCTIONAL {
            self.check(field, field.value(instruction), &mut checked)
                .map_err(|reason| ValidationError::invalid(field, reason))?;
        }

        Ok(checked)
    }

    fn check(
        &self,
        field: Field,
        value: &str,
        checked: &mut CheckedInstruction,
    ) -> std::result::Result<(), String> {
        match field {
            Field::Iban => self.iban_check.check(value),
            Field::Bic => self.check_bic(value),
            Field::Amount => {
                checked.amount = parse_amount(value)?;
                Ok(())
            }
            Field::EndToEndId => check_end_to_end_id(value),
            Field::SequenceType => value.parse::<SequenceType>().map(|_| ()),
            Field::MandateSignedOn => {
                checked.mandate_signed_on = self.parse_mandate_date(value)?;
                Ok(())
            }
            Field::AccountHolderName | Field::MandateId | Field::RemittanceInfo => Ok(()),
        }
    }

    fn check_bic(&self, value: &str) -> std::result::Result<(), String> {
        if self.bic.is_match(value) {
            Ok(())
        } else {
            Err(format!("{value} is not a valid BIC"))
        }
    }

    fn parse_mandate_date(&self, value: &str) -> std::result::Result<NaiveDate, String> {
        let signed = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| format!("{value} is not a valid ISO Date"))?;

        if self.reject_future_mandates {
            let today = self
                .reference_date
                .unwrap_or_else(|| Local::now().date_naive());
            if signed >= today {
                return Err(format!(
                    "mandate date {value} must be at least 1 day earlier than current day {today}"
                ));
            }
        }

        Ok(signed)
    }
}

fn parse_amount(value: &str) -> std::result::Result<u64, String> {
    parse_minor_units(value).ok_or_else(|| format!("{value} is not an amount in cents"))
}

fn check_end_to_end_id(value: &str) -> std::result::Result<(), String> {
    if !value.is_ascii() {
        Err(format!("{value} is not ASCII"))
    } else if value.len() > MAX_END_TO_END_LEN {
        Err(format!("{value} is longer than {MAX_END_TO_END_LEN} characters"))
    } else {
        Ok(())
    }
}
