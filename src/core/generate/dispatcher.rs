//! Per-bank dispatch of a schedule
//!
//! A schedule is generated once per configured bank. Each bank gets its own
//! creditor profile and its own [`FileOrchestrator`] run.

use super::orchestrator::{FileOrchestrator, GenerationOptions};
use super::summary::GenerationSummary;
use crate::adapters::handoff::HandoffNotifier;
use crate::adapters::settings::SettingsProvider;
use crate::adapters::storage::FileStorage;
use crate::adapters::store::{InstructionSource, ScheduleStore};
use crate::core::validation::Validator;
use crate::domain::{BankId, Result, RunTotals, ScheduleId, ScheduleStatus, SddError};

/// Result of one bank's run
#[derive(Debug)]
pub struct BankRun {
    pub bank: BankId,
    /// `None` when the bank had nothing eligible
    pub summary: Option<GenerationSummary>,
}

/// Runs a schedule for a list of banks, one after another
pub struct BankDispatcher<'a> {
    instructions: &'a dyn InstructionSource,
    schedules: &'a dyn ScheduleStore,
    storage: &'a dyn FileStorage,
    notifier: &'a dyn HandoffNotifier,
    validator: &'a Validator,
    settings: &'a dyn SettingsProvider,
    creditor_name: String,
    options: GenerationOptions,
}

impl<'a> BankDispatcher<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instructions: &'a dyn InstructionSource,
        schedules: &'a dyn ScheduleStore,
        storage: &'a dyn FileStorage,
        notifier: &'a dyn HandoffNotifier,
        validator: &'a Validator,
        settings: &'a dyn SettingsProvider,
        creditor_name: impl Into<String>,
    ) -> Self {
        Self {
            instructions,
            schedules,
            storage,
            notifier,
            validator,
            settings,
            creditor_name: creditor_name.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Generate `schedule_id` for `banks`, or for every configured bank when empty
    ///
    /// Every profile is resolved before the first run starts, so a
    /// misconfigured bank fails the dispatch without creating any file.
    ///
    /// # Errors
    ///
    /// Returns [`SddError::EmptySchedule`] when no bank had eligible
    /// instructions, and the first error of any other kind as-is.
    pub async fn dispatch(&self, schedule_id: ScheduleId, banks: &[BankId]) -> Result<Vec<BankRun>> {
        let schedule = self.schedules.load_schedule(schedule_id).await?;

        let banks = if banks.is_empty() {
            self.settings.banks()
        } else {
            banks.to_vec()
        };
        if banks.is_empty() {
            return Err(SddError::Configuration("no banks configured".to_string()));
        }

        let profiles = banks
            .iter()
            .map(|bank| {
                self.settings
                    .creditor_profile(bank, &self.creditor_name)
                    .map(|profile| (bank.clone(), profile))
            })
            .collect::<Result<Vec<_>>>()?;

        let orchestrator = FileOrchestrator::new(
            self.instructions,
            self.schedules,
            self.storage,
            self.notifier,
            self.validator,
        )
        .with_options(self.options);

        let mut runs = Vec::with_capacity(profiles.len());
        for (bank, profile) in profiles {
            tracing::info!(bank = %bank, schedule_id = %schedule_id, "Generating for bank");

            match orchestrator.generate(&schedule, &profile).await {
                Ok(summary) => runs.push(BankRun {
                    bank,
                    summary: Some(summary),
                }),
                Err(SddError::EmptySchedule(reason)) => {
                    tracing::warn!(bank = %bank, reason = %reason, "Nothing to generate, skipping bank");
                    runs.push(BankRun {
                        bank,
                        summary: None,
                    });
                }
                Err(e) => {
                    tracing::error!(bank = %bank, error = %e, "Generation failed, stopping dispatch");
                    return Err(e);
                }
            }
        }

        let completed: Vec<&GenerationSummary> =
            runs.iter().filter_map(|r| r.summary.as_ref()).collect();

        if completed.is_empty() {
            return Err(SddError::EmptySchedule(format!(
                "schedule {schedule_id} has no eligible instructions for any bank"
            )));
        }

        // Each bank run overwrites the aggregate with its own figures
        if completed.len() > 1 {
            let mut combined = RunTotals::default();
            for summary in &completed {
                combined.absorb(&summary.totals);
            }
            self.schedules
                .update_schedule_totals(schedule_id, &combined, ScheduleStatus::PendingVerification)
                .await?;
            tracing::info!(
                schedule_id = %schedule_id,
                banks = completed.len(),
                records = combined.records,
                "Combined schedule totals written"
            );
        }

        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::handoff::LogNotifier;
    use crate::adapters::settings::ConfigSettings;
    use crate::adapters::storage::LocalStorage;
    use crate::adapters::store::MemoryStore;
    use crate::config::{BankConfig, SettingValue, ValidationConfig};
    use crate::domain::{Instruction, Schedule};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    const ABN: &str = "NL91ABNA0417164300";
    const ING: &str = "NL69INGB0123456789";

    fn bank(id: &str, iban: &str, bic: &str) -> BankConfig {
        let mut settings = BTreeMap::new();
        settings.insert("IBAN".to_string(), SettingValue::Text(iban.to_string()));
        settings.insert("BIC".to_string(), SettingValue::Text(bic.to_string()));
        settings.insert(
            "CREDITOR_ID".to_string(),
            SettingValue::Text("NL98ZZZ999999990000".to_string()),
        );
        settings.insert("RECORDS_PER_FILE".to_string(), SettingValue::Integer(0));
        BankConfig {
            id: id.to_string(),
            settings,
        }
    }

    fn settings() -> ConfigSettings {
        ConfigSettings::new(vec![bank("abn", ABN, "ABNANL2A"), bank("ing", ING, "INGBNL2A")])
    }

    fn instruction(id: i64, destination: &str, amount: &str) -> Instruction {
        Instruction::builder()
            .id(id)
            .schedule_id(ScheduleId::new(1))
            .account_holder_name("J. Jansen")
            .iban("DE89370400440532013000")
            .bic("COBADEFFXXX")
            .amount(amount)
            .mandate_id(format!("MNDT-{id}"))
            .mandate_signed_on("2022-09-30")
            .due_date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
            .sequence_type("RCUR")
            .end_to_end_id(format!("E2E-{id}"))
            .remittance_info("Membership fee")
            .destination_iban(destination)
            .build()
            .unwrap()
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_schedule(Schedule::new(
                ScheduleId::new(1),
                NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
            ))
            .await;
        store
    }

    #[tokio::test]
    async fn test_combined_totals_over_banks() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path()).unwrap();
        let store = store().await;
        store.insert_instruction(instruction(1, ABN, "1000")).await;
        store.insert_instruction(instruction(2, ABN, "1000")).await;
        store.insert_instruction(instruction(3, ING, "500")).await;
        let validator = Validator::new(&ValidationConfig::default()).unwrap();
        let settings = settings();

        let runs = BankDispatcher::new(&store, &store, &storage, &LogNotifier, &validator, &settings, "Acme")
            .dispatch(ScheduleId::new(1), &[])
            .await
            .unwrap();

        assert_eq!(runs.len(), 2);
        let schedule = store.load_schedule(ScheduleId::new(1)).await.unwrap();
        assert_eq!(schedule.transactions, 3);
        assert_eq!(schedule.amount, 2500);
        assert_eq!(store.list_totals(ScheduleId::new(1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_bank_is_skipped() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path()).unwrap();
        let store = store().await;
        store.insert_instruction(instruction(1, ABN, "1000")).await;
        let validator = Validator::new(&ValidationConfig::default()).unwrap();
        let settings = settings();

        let runs = BankDispatcher::new(&store, &store, &storage, &LogNotifier, &validator, &settings, "Acme")
            .dispatch(ScheduleId::new(1), &[])
            .await
            .unwrap();

        assert!(runs[0].summary.is_some());
        assert!(runs[1].summary.is_none());
    }

    #[tokio::test]
    async fn test_all_banks_empty_is_empty_schedule() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path()).unwrap();
        let store = store().await;
        let validator = Validator::new(&ValidationConfig::default()).unwrap();
        let settings = settings();

        let err = BankDispatcher::new(&store, &store, &storage, &LogNotifier, &validator, &settings, "Acme")
            .dispatch(ScheduleId::new(1), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, SddError::EmptySchedule(_)));
    }

    #[tokio::test]
    async fn test_unknown_bank_fails_before_any_run() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path()).unwrap();
        let store = store().await;
        store.insert_instruction(instruction(1, ABN, "1000")).await;
        let validator = Validator::new(&ValidationConfig::default()).unwrap();
        let settings = settings();
        let banks = [BankId::new("abn").unwrap(), BankId::new("rabo").unwrap()];

        let err = BankDispatcher::new(&store, &store, &storage, &LogNotifier, &validator, &settings, "Acme")
            .dispatch(ScheduleId::new(1), &banks)
            .await
            .unwrap_err();

        assert!(matches!(err, SddError::Configuration(_)));
        let untouched = store.instruction(crate::domain::InstructionId::new(1)).await.unwrap();
        assert!(untouched.last_failure_reason.is_none());
        assert!(store.list_totals(ScheduleId::new(1)).await.unwrap().is_empty());
    }
}
