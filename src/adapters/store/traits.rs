//! Store abstraction traits
//!
//! This module defines the traits that instruction and schedule stores must
//! implement to back a generation run.

use crate::domain::{
    BatchTotal, Instruction, InstructionId, InstructionStatus, Result, RunTotals, Schedule,
    ScheduleId, ScheduleStatus,
};
use async_trait::async_trait;

/// The set of instructions one run works on
///
/// Eligible instructions belong to the schedule, use the Direct Debit payment
/// method and are collected into `creditor_iban`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityScope {
    pub schedule_id: ScheduleId,
    pub creditor_iban: String,
}

impl EligibilityScope {
    pub fn new(schedule_id: ScheduleId, creditor_iban: impl Into<String>) -> Self {
        Self {
            schedule_id,
            creditor_iban: creditor_iban.into(),
        }
    }

    /// Whether an instruction falls inside this scope
    pub fn contains(&self, instruction: &Instruction) -> bool {
        instruction.schedule_id == self.schedule_id && instruction.is_eligible_for(&self.creditor_iban)
    }
}

/// Source of direct debit instructions
///
/// Window reads use one fixed ordering: sequence type code (byte order), then
/// instruction id. Planning depends on that ordering being stable.
#[async_trait]
pub trait InstructionSource: Send + Sync {
    /// Count eligible instructions
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    async fn count_eligible(&self, scope: &EligibilityScope) -> Result<u64>;

    /// Read a window of eligible instructions in the fixed ordering
    ///
    /// # Arguments
    ///
    /// * `scope` - Eligibility scope
    /// * `offset` - Number of instructions to skip
    /// * `limit` - Maximum number of instructions to return
    async fn fetch_window(
        &self,
        scope: &EligibilityScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Instruction>>;

    /// Read instructions by id, returned in the order of `ids`
    ///
    /// Ids that no longer exist are skipped.
    async fn fetch_by_ids(&self, ids: &[InstructionId]) -> Result<Vec<Instruction>>;

    /// Persist the outcome of one emission attempt
    async fn update_status(
        &self,
        id: InstructionId,
        status: InstructionStatus,
        failure_reason: Option<&str>,
    ) -> Result<()>;
}

/// Store of payment schedules and their generated totals
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Test the store connection
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    /// Load a schedule
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::SddError::Database`] if the schedule does not exist.
    async fn load_schedule(&self, id: ScheduleId) -> Result<Schedule>;

    /// Replace the batch totals previously generated for one creditor IBAN
    async fn replace_totals(
        &self,
        schedule: ScheduleId,
        creditor_iban: &str,
        rows: &[BatchTotal],
    ) -> Result<()>;

    /// Write aggregate run totals and the new status back to the schedule
    async fn update_schedule_totals(
        &self,
        schedule: ScheduleId,
        totals: &RunTotals,
        status: ScheduleStatus,
    ) -> Result<()>;

    /// List all batch totals of a schedule
    async fn list_totals(&self, schedule: ScheduleId) -> Result<Vec<BatchTotal>>;
}
