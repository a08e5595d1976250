//! In-memory store with JSON file persistence
//!
//! Backs the `file` store target and the test suite. A store document holds
//! schedules, instructions and generated totals; the CLI loads it before a run
//! and writes it back afterwards.

use super::traits::{EligibilityScope, InstructionSource, ScheduleStore};
use crate::domain::{
    BatchTotal, Instruction, InstructionId, InstructionStatus, Result, RunTotals, Schedule,
    ScheduleId, ScheduleStatus, SddError,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;

/// A batch total row together with its schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredTotal {
    schedule_id: ScheduleId,
    #[serde(flatten)]
    total: BatchTotal,
}

/// Serialized form of a store
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    schedules: Vec<Schedule>,
    #[serde(default)]
    instructions: Vec<Instruction>,
    #[serde(default)]
    totals: Vec<StoredTotal>,
}

#[derive(Debug, Default)]
struct State {
    schedules: BTreeMap<ScheduleId, Schedule>,
    instructions: BTreeMap<InstructionId, Instruction>,
    totals: Vec<StoredTotal>,
}

/// Instruction and schedule store held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a JSON document
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a store document.
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            SddError::Database(format!("Failed to read store file {}: {}", path.display(), e))
        })?;
        let document: StoreDocument = serde_json::from_str(&content)?;

        let store = Self::new();
        {
            let mut state = store.state.write().await;
            state.schedules = document.schedules.into_iter().map(|s| (s.id, s)).collect();
            state.instructions = document
                .instructions
                .into_iter()
                .map(|i| (i.id, i))
                .collect();
            state.totals = document.totals;
        }

        tracing::debug!(path = %path.display(), "Loaded JSON store");
        Ok(store)
    }

    /// Writes the store back as a JSON document
    pub async fn save_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let document = {
            let state = self.state.read().await;
            StoreDocument {
                schedules: state.schedules.values().cloned().collect(),
                instructions: state.instructions.values().cloned().collect(),
                totals: state.totals.clone(),
            }
        };

        let json = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(path, json).await.map_err(|e| {
            SddError::Database(format!("Failed to write store file {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), "Saved JSON store");
        Ok(())
    }

    /// Adds or replaces a schedule
    pub async fn insert_schedule(&self, schedule: Schedule) {
        self.state.write().await.schedules.insert(schedule.id, schedule);
    }

    /// Adds or replaces an instruction
    pub async fn insert_instruction(&self, instruction: Instruction) {
        self.state
            .write()
            .await
            .instructions
            .insert(instruction.id, instruction);
    }

    /// Returns a copy of one instruction
    pub async fn instruction(&self, id: InstructionId) -> Option<Instruction> {
        self.state.read().await.instructions.get(&id).cloned()
    }

    /// Eligible instructions in window order
    fn ordered<'a>(state: &'a State, scope: &EligibilityScope) -> Vec<&'a Instruction> {
        let mut eligible: Vec<&Instruction> = state
            .instructions
            .values()
            .filter(|i| scope.contains(i))
            .collect();
        // BTreeMap iteration is already by id; a stable sort keeps that as tie-breaker
        eligible.sort_by(|a, b| a.sequence_type.as_bytes().cmp(b.sequence_type.as_bytes()));
        eligible
    }
}

#[async_trait]
impl InstructionSource for MemoryStore {
    async fn count_eligible(&self, scope: &EligibilityScope) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.instructions.values().filter(|i| scope.contains(i)).count() as u64)
    }

    async fn fetch_window(
        &self,
        scope: &EligibilityScope,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Instruction>> {
        let state = self.state.read().await;
        Ok(Self::ordered(&state, scope)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn fetch_by_ids(&self, ids: &[InstructionId]) -> Result<Vec<Instruction>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.instructions.get(id).cloned())
            .collect())
    }

    async fn update_status(
        &self,
        id: InstructionId,
        status: InstructionStatus,
        failure_reason: Option<&str>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let instruction = state
            .instructions
            .get_mut(&id)
            .ok_or_else(|| SddError::Database(format!("Instruction {id} not found")))?;

        instruction.status = status;
        instruction.last_failure_reason = failure_reason.map(str::to_string);
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn load_schedule(&self, id: ScheduleId) -> Result<Schedule> {
        self.state
            .read()
            .await
            .schedules
            .get(&id)
            .cloned()
            .ok_or_else(|| SddError::Database(format!("Schedule {id} not found")))
    }

    async fn replace_totals(
        &self,
        schedule: ScheduleId,
        creditor_iban: &str,
        rows: &[BatchTotal],
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .totals
            .retain(|t| !(t.schedule_id == schedule && t.total.creditor_iban == creditor_iban));
        state.totals.extend(rows.iter().cloned().map(|total| StoredTotal {
            schedule_id: schedule,
            total,
        }));
        Ok(())
    }

    async fn update_schedule_totals(
        &self,
        schedule: ScheduleId,
        totals: &RunTotals,
        status: ScheduleStatus,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let entry = state
            .schedules
            .get_mut(&schedule)
            .ok_or_else(|| SddError::Database(format!("Schedule {schedule} not found")))?;

        entry.transactions = totals.records;
        entry.amount = totals.amount;
        entry.first_collection_date = totals.first_collection_date;
        entry.status = status;
        Ok(())
    }

    async fn list_totals(&self, schedule: ScheduleId) -> Result<Vec<BatchTotal>> {
        let state = self.state.read().await;
        Ok(state
            .totals
            .iter()
            .filter(|t| t.schedule_id == schedule)
            .map(|t| t.total.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const CREDITOR: &str = "NL91ABNA0417164300";

    fn instruction(id: i64, sequence_type: &str) -> Instruction {
        Instruction::builder()
            .id(id)
            .schedule_id(ScheduleId::new(1))
            .sequence_type(sequence_type)
            .amount("100")
            .due_date(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
            .destination_iban(CREDITOR)
            .build()
            .unwrap()
    }

    fn total(iban: &str, batch: &str) -> BatchTotal {
        BatchTotal {
            creditor_iban: iban.to_string(),
            sequence_type: "RCUR".to_string(),
            batch_id: batch.to_string(),
            transactions: 1,
            amount: 100,
            filename: "F.xml".to_string(),
            message_id: "M".to_string(),
        }
    }

    #[tokio::test]
    async fn test_window_ordering_by_sequence_type_then_id() {
        let store = MemoryStore::new();
        for (id, seq) in [(1, "RCUR"), (2, "FRST"), (3, "RCUR"), (4, "FRST"), (5, "OOFF")] {
            store.insert_instruction(instruction(id, seq)).await;
        }
        let scope = EligibilityScope::new(ScheduleId::new(1), CREDITOR);

        let window = store.fetch_window(&scope, 0, 10).await.unwrap();
        let ids: Vec<i64> = window.iter().map(|i| i.id.value()).collect();
        assert_eq!(ids, vec![2, 4, 5, 1, 3]);

        let page = store.fetch_window(&scope, 1, 2).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|i| i.id.value()).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[tokio::test]
    async fn test_count_respects_scope() {
        let store = MemoryStore::new();
        store.insert_instruction(instruction(1, "RCUR")).await;
        let mut other_bank = instruction(2, "RCUR");
        other_bank.destination_iban = "DE89370400440532013000".into();
        store.insert_instruction(other_bank).await;
        let mut card = instruction(3, "RCUR");
        card.payment_method = "Credit Card".into();
        store.insert_instruction(card).await;

        let scope = EligibilityScope::new(ScheduleId::new(1), CREDITOR);
        assert_eq!(store.count_eligible(&scope).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_by_ids_keeps_requested_order() {
        let store = MemoryStore::new();
        for id in 1..=3 {
            store.insert_instruction(instruction(id, "RCUR")).await;
        }
        let ids = [InstructionId::new(3), InstructionId::new(99), InstructionId::new(1)];
        let fetched = store.fetch_by_ids(&ids).await.unwrap();
        let got: Vec<i64> = fetched.iter().map(|i| i.id.value()).collect();
        assert_eq!(got, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryStore::new();
        store.insert_instruction(instruction(1, "RCUR")).await;

        store
            .update_status(InstructionId::new(1), InstructionStatus::Failed, Some("bad"))
            .await
            .unwrap();
        let stored = store.instruction(InstructionId::new(1)).await.unwrap();
        assert_eq!(stored.status, InstructionStatus::Failed);
        assert_eq!(stored.last_failure_reason.as_deref(), Some("bad"));

        assert!(store
            .update_status(InstructionId::new(2), InstructionStatus::New, None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_replace_totals_only_touches_one_creditor() {
        let store = MemoryStore::new();
        let schedule = ScheduleId::new(1);
        store
            .replace_totals(schedule, CREDITOR, &[total(CREDITOR, "A")])
            .await
            .unwrap();
        store
            .replace_totals(schedule, "OTHER", &[total("OTHER", "B")])
            .await
            .unwrap();
        store
            .replace_totals(schedule, CREDITOR, &[total(CREDITOR, "C")])
            .await
            .unwrap();

        let mut ids: Vec<String> = store
            .list_totals(schedule)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.batch_id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["B", "C"]);
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.json");

        let store = MemoryStore::new();
        store
            .insert_schedule(Schedule::new(
                ScheduleId::new(1),
                NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            ))
            .await;
        store.insert_instruction(instruction(1, "FRST")).await;
        store
            .replace_totals(ScheduleId::new(1), CREDITOR, &[total(CREDITOR, "A")])
            .await
            .unwrap();
        store.save_json_file(&path).await.unwrap();

        let loaded = MemoryStore::from_json_file(&path).await.unwrap();
        assert!(loaded.load_schedule(ScheduleId::new(1)).await.is_ok());
        assert!(loaded.instruction(InstructionId::new(1)).await.is_some());
        assert_eq!(loaded.list_totals(ScheduleId::new(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_schedule_is_database_error() {
        let store = MemoryStore::new();
        let err = store.load_schedule(ScheduleId::new(9)).await.unwrap_err();
        assert!(matches!(err, SddError::Database(_)));
    }
}
