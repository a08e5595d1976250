//! PostgreSQL adapter implementing the store traits
//!
//! Window reads order by `sequence_type COLLATE "C", id` so that the database
//! ordering matches byte order regardless of the cluster's default collation.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    batch_total_from_row, instruction_from_row, schedule_from_row, to_bigint,
    INSTRUCTION_COLUMNS, TOTAL_COLUMNS,
};
use crate::adapters::store::traits::{EligibilityScope, InstructionSource, ScheduleStore};
use crate::domain::{
    BatchTotal, Instruction, InstructionId, InstructionStatus, Result, RunTotals, Schedule,
    ScheduleId, ScheduleStatus, SddError, DIRECT_DEBIT,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// PostgreSQL implementation of the store traits
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl InstructionSource for PostgreSQLAdapter {
    async fn count_eligible(&self, scope: &EligibilityScope) -> Result<u64> {
        let rows = self
            .client
            .query(
                "SELECT COUNT(*) AS n FROM sdd_instructions \
                 WHERE schedule_id = $1 AND payment_method = $2 AND destination_iban = $3",
                &[
                    &scope.schedule_id.value(),
                    &DIRECT_DEBIT,
                    &scope.creditor_iban,
                ],
            )
            .await?;

        let count: i64 = match rows.first() {
            Some(row) => row
                .try_get("n")
                .map_err(|e| SddError::Database(format!("Failed to read count: {}", e)))?,
            None => 0,
        };
        Ok(count.max(0) as u64)
    }

    async fn fetch_window(
        &self,
        scope: &EligibilityScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Instruction>> {
        let query = format!(
            "SELECT {INSTRUCTION_COLUMNS} FROM sdd_instructions \
             WHERE schedule_id = $1 AND payment_method = $2 AND destination_iban = $3 \
             ORDER BY sequence_type COLLATE \"C\", id \
             OFFSET $4 LIMIT $5"
        );
        let offset = to_bigint(offset, "offset")?;
        let limit = to_bigint(limit, "limit")?;

        let rows = self
            .client
            .query(
                &query,
                &[
                    &scope.schedule_id.value(),
                    &DIRECT_DEBIT,
                    &scope.creditor_iban,
                    &offset,
                    &limit,
                ],
            )
            .await?;

        rows.iter().map(instruction_from_row).collect()
    }

    async fn fetch_by_ids(&self, ids: &[InstructionId]) -> Result<Vec<Instruction>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i64> = ids.iter().map(InstructionId::value).collect();
        let query = format!("SELECT {INSTRUCTION_COLUMNS} FROM sdd_instructions WHERE id = ANY($1)");
        let rows = self.client.query(&query, &[&raw]).await?;

        let mut by_id: HashMap<InstructionId, Instruction> = HashMap::with_capacity(rows.len());
        for row in &rows {
            let instruction = instruction_from_row(row)?;
            by_id.insert(instruction.id, instruction);
        }

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn update_status(
        &self,
        id: InstructionId,
        status: InstructionStatus,
        failure_reason: Option<&str>,
    ) -> Result<()> {
        let updated = self
            .client
            .execute(
                "UPDATE sdd_instructions \
                 SET status = $2, last_failure_reason = $3, updated_at = NOW() \
                 WHERE id = $1",
                &[&id.value(), &status.as_str(), &failure_reason],
            )
            .await?;

        if updated == 0 {
            return Err(SddError::Database(format!("Instruction {id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn load_schedule(&self, id: ScheduleId) -> Result<Schedule> {
        let rows = self
            .client
            .query(
                "SELECT id, selection_date, transactions, amount, first_collection_date, status \
                 FROM sdd_schedules WHERE id = $1",
                &[&id.value()],
            )
            .await?;

        match rows.first() {
            Some(row) => schedule_from_row(row),
            None => Err(SddError::Database(format!("Schedule {id} not found"))),
        }
    }

    async fn replace_totals(
        &self,
        schedule: ScheduleId,
        creditor_iban: &str,
        rows: &[BatchTotal],
    ) -> Result<()> {
        let mut connection = self.client.get_connection().await?;
        let transaction = connection
            .transaction()
            .await
            .map_err(|e| SddError::Database(format!("Failed to start transaction: {}", e)))?;

        transaction
            .execute(
                "DELETE FROM sdd_batch_totals WHERE schedule_id = $1 AND creditor_iban = $2",
                &[&schedule.value(), &creditor_iban],
            )
            .await
            .map_err(|e| SddError::Database(format!("Failed to clear batch totals: {}", e)))?;

        let insert = format!(
            "INSERT INTO sdd_batch_totals (schedule_id, {TOTAL_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        );
        for row in rows {
            let transactions = to_bigint(row.transactions, "transactions")?;
            let amount = to_bigint(row.amount, "amount")?;
            transaction
                .execute(
                    &insert,
                    &[
                        &schedule.value(),
                        &row.creditor_iban,
                        &row.sequence_type,
                        &row.batch_id,
                        &transactions,
                        &amount,
                        &row.filename,
                        &row.message_id,
                    ],
                )
                .await
                .map_err(|e| SddError::Database(format!("Failed to insert batch total: {}", e)))?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| SddError::Database(format!("Failed to commit batch totals: {}", e)))?;

        tracing::debug!(
            schedule_id = %schedule,
            creditor_iban = creditor_iban,
            rows = rows.len(),
            "Replaced batch totals"
        );
        Ok(())
    }

    async fn update_schedule_totals(
        &self,
        schedule: ScheduleId,
        totals: &RunTotals,
        status: ScheduleStatus,
    ) -> Result<()> {
        let records = to_bigint(totals.records, "transactions")?;
        let amount = to_bigint(totals.amount, "amount")?;

        let updated = self
            .client
            .execute(
                "UPDATE sdd_schedules \
                 SET transactions = $2, amount = $3, first_collection_date = $4, status = $5, \
                     updated_at = NOW() \
                 WHERE id = $1",
                &[
                    &schedule.value(),
                    &records,
                    &amount,
                    &totals.first_collection_date,
                    &status.as_str(),
                ],
            )
            .await?;

        if updated == 0 {
            return Err(SddError::Database(format!("Schedule {schedule} not found")));
        }
        Ok(())
    }

    async fn list_totals(&self, schedule: ScheduleId) -> Result<Vec<BatchTotal>> {
        let query = format!(
            "SELECT {TOTAL_COLUMNS} FROM sdd_batch_totals WHERE schedule_id = $1 \
             ORDER BY creditor_iban, filename, id"
        );
        let rows = self.client.query(&query, &[&schedule.value()]).await?;
        rows.iter().map(batch_total_from_row).collect()
    }
}
