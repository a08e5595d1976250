//! Read-only store wrapper for dry runs
//!
//! Reads go to the wrapped store; writes are logged and dropped.

use super::traits::{EligibilityScope, InstructionSource, ScheduleStore};
use crate::domain::{
    BatchTotal, Instruction, InstructionId, InstructionStatus, Result, RunTotals, Schedule,
    ScheduleId, ScheduleStatus,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Store that never writes
pub struct DryRunStore {
    instructions: Arc<dyn InstructionSource>,
    schedules: Arc<dyn ScheduleStore>,
}

impl DryRunStore {
    pub fn new(instructions: Arc<dyn InstructionSource>, schedules: Arc<dyn ScheduleStore>) -> Self {
        Self {
            instructions,
            schedules,
        }
    }
}

#[async_trait]
impl InstructionSource for DryRunStore {
    async fn count_eligible(&self, scope: &EligibilityScope) -> Result<u64> {
        self.instructions.count_eligible(scope).await
    }

    async fn fetch_window(
        &self,
        scope: &EligibilityScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Instruction>> {
        self.instructions.fetch_window(scope, offset, limit).await
    }

    async fn fetch_by_ids(&self, ids: &[InstructionId]) -> Result<Vec<Instruction>> {
        self.instructions.fetch_by_ids(ids).await
    }

    async fn update_status(
        &self,
        id: InstructionId,
        status: InstructionStatus,
        failure_reason: Option<&str>,
    ) -> Result<()> {
        tracing::debug!(
            instruction_id = %id,
            status = %status,
            reason = failure_reason.unwrap_or_default(),
            "DRY RUN: would update instruction status"
        );
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for DryRunStore {
    async fn test_connection(&self) -> Result<()> {
        self.schedules.test_connection().await
    }

    async fn load_schedule(&self, id: ScheduleId) -> Result<Schedule> {
        self.schedules.load_schedule(id).await
    }

    async fn replace_totals(
        &self,
        schedule: ScheduleId,
        creditor_iban: &str,
        rows: &[BatchTotal],
    ) -> Result<()> {
        tracing::info!(
            schedule_id = %schedule,
            creditor_iban = creditor_iban,
            rows = rows.len(),
            "DRY RUN: would replace batch totals"
        );
        Ok(())
    }

    async fn update_schedule_totals(
        &self,
        schedule: ScheduleId,
        totals: &RunTotals,
        status: ScheduleStatus,
    ) -> Result<()> {
        tracing::info!(
            schedule_id = %schedule,
            records = totals.records,
            amount = totals.amount,
            status = %status.as_str(),
            "DRY RUN: would update schedule totals"
        );
        Ok(())
    }

    async fn list_totals(&self, schedule: ScheduleId) -> Result<Vec<BatchTotal>> {
        self.schedules.list_totals(schedule).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_writes_are_dropped() {
        let inner = Arc::new(MemoryStore::new());
        inner
            .insert_instruction(
                Instruction::builder()
                    .id(1)
                    .schedule_id(ScheduleId::new(1))
                    .due_date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
                    .destination_iban("NL91ABNA0417164300")
                    .build()
                    .unwrap(),
            )
            .await;

        let dry = DryRunStore::new(inner.clone(), inner.clone());
        dry.update_status(InstructionId::new(1), InstructionStatus::Failed, Some("x"))
            .await
            .unwrap();

        let stored = inner.instruction(InstructionId::new(1)).await.unwrap();
        assert_eq!(stored.status, InstructionStatus::New);
        assert!(dry.fetch_by_ids(&[InstructionId::new(1)]).await.unwrap().len() == 1);
    }
}
