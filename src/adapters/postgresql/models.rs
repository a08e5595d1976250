//! PostgreSQL row models
//!
//! Maps rows of `sdd_schedules`, `sdd_instructions` and `sdd_batch_totals` to
//! domain types.

use crate::domain::{
    BatchTotal, Instruction, InstructionId, InstructionStatus, Result, Schedule, ScheduleId,
    ScheduleStatus, SddError,
};
use tokio_postgres::Row;

/// Columns selected for an instruction, in [`instruction_from_row`] order
pub const INSTRUCTION_COLUMNS: &str = "id, schedule_id, account_holder_name, iban, bic, amount, \
     mandate_id, mandate_signed_on, due_date, sequence_type, end_to_end_id, remittance_info, \
     payment_method, destination_iban, status, last_failure_reason";

/// Columns selected for a batch total, in [`batch_total_from_row`] order
pub const TOTAL_COLUMNS: &str =
    "creditor_iban, sequence_type, batch_id, transactions, amount, filename, message_id";

fn column<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|e| SddError::Database(format!("Failed to read column {name}: {e}")))
}

fn non_negative(value: i64, name: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| SddError::Database(format!("Column {name} is negative: {value}")))
}

/// Converts an instruction row
pub fn instruction_from_row(row: &Row) -> Result<Instruction> {
    let status: String = column(row, "status")?;
    let status = status
        .parse::<InstructionStatus>()
        .map_err(SddError::Database)?;

    Ok(Instruction {
        id: InstructionId::new(column(row, "id")?),
        schedule_id: ScheduleId::new(column(row, "schedule_id")?),
        account_holder_name: column(row, "account_holder_name")?,
        iban: column(row, "iban")?,
        bic: column(row, "bic")?,
        amount: column(row, "amount")?,
        mandate_id: column(row, "mandate_id")?,
        mandate_signed_on: column(row, "mandate_signed_on")?,
        due_date: column(row, "due_date")?,
        sequence_type: column(row, "sequence_type")?,
        end_to_end_id: column(row, "end_to_end_id")?,
        remittance_info: column(row, "remittance_info")?,
        payment_method: column(row, "payment_method")?,
        destination_iban: column(row, "destination_iban")?,
        status,
        last_failure_reason: column(row, "last_failure_reason")?,
    })
}

/// Converts a schedule row
pub fn schedule_from_row(row: &Row) -> Result<Schedule> {
    let status: String = column(row, "status")?;

    Ok(Schedule {
        id: ScheduleId::new(column(row, "id")?),
        selection_date: column(row, "selection_date")?,
        transactions: non_negative(column(row, "transactions")?, "transactions")?,
        amount: non_negative(column(row, "amount")?, "amount")?,
        first_collection_date: column(row, "first_collection_date")?,
        status: status.parse::<ScheduleStatus>().map_err(SddError::Database)?,
    })
}

/// Converts a batch total row
pub fn batch_total_from_row(row: &Row) -> Result<BatchTotal> {
    Ok(BatchTotal {
        creditor_iban: column(row, "creditor_iban")?,
        sequence_type: column(row, "sequence_type")?,
        batch_id: column(row, "batch_id")?,
        transactions: non_negative(column(row, "transactions")?, "transactions")?,
        amount: non_negative(column(row, "amount")?, "amount")?,
        filename: column(row, "filename")?,
        message_id: column(row, "message_id")?,
    })
}

/// Converts a count to a BIGINT parameter
pub fn to_bigint(value: u64, name: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| SddError::Database(format!("{name} {value} does not fit in BIGINT")))
}
