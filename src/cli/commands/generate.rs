//! Generate command implementation
//!
//! This module implements the `generate` command: one schedule, generated
//! for every requested bank.

use crate::adapters::handoff::{create_notifier, HandoffNotifier, LogNotifier};
use crate::adapters::settings::ConfigSettings;
use crate::adapters::storage::LocalStorage;
use crate::adapters::store::create_store;
use crate::config::load_config;
use crate::core::generate::{BankDispatcher, BankRun, GenerationOptions};
use crate::core::validation::Validator;
use crate::domain::money::format_minor_units;
use crate::domain::{BankId, ScheduleId, SddError};
use clap::Args;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Schedule to generate
    #[arg(short, long)]
    pub schedule: i64,

    /// Bank id(s) to generate for (comma-separated, default: all configured banks)
    #[arg(short, long, value_delimiter = ',')]
    pub bank: Vec<String>,

    /// Dry run mode - write and check files but change nothing and deliver nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Exit code for an error that ended the command
pub fn exit_code(error: &SddError) -> i32 {
    match error {
        SddError::Configuration(_) => 2,
        SddError::EmptySchedule(_) => 3,
        _ => 5,
    }
}

/// Exit code for a dispatch that completed
fn completion_code(runs: &[BankRun]) -> i32 {
    let clean = runs
        .iter()
        .filter_map(|r| r.summary.as_ref())
        .all(|s| s.is_successful());
    if clean {
        0
    } else {
        1
    }
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(schedule_id = self.schedule, "Starting generate command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let banks = match self
            .bank
            .iter()
            .map(|b| BankId::new(b.trim()))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(banks) => banks,
            Err(e) => {
                eprintln!("Invalid bank id: {e}");
                return Ok(2);
            }
        };

        let validator = match Validator::new(&config.validation) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Failed to set up validation: {e}");
                return Ok(exit_code(&e));
            }
        };

        let notifier: Box<dyn HandoffNotifier> = if self.dry_run {
            Box::new(LogNotifier)
        } else {
            match create_notifier(&config.handoff) {
                Ok(n) => n,
                Err(e) => {
                    eprintln!("Failed to set up handoff: {e}");
                    return Ok(2);
                }
            }
        };

        let storage = LocalStorage::new(&config.output.storage_root)?;

        let store = match create_store(&config.store).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open store");
                eprintln!("Failed to connect to store: {e}");
                return Ok(4);
            }
        };
        if let Err(e) = store.schedules().test_connection().await {
            eprintln!("Failed to connect to store: {e}");
            return Ok(4);
        }

        let store = if self.dry_run {
            tracing::info!("Dry run mode enabled - no statuses or totals will be written");
            println!("🔍 DRY RUN MODE - nothing will be written to the store or delivered");
            println!();
            store.dry_run()
        } else {
            store
        };

        if !self.yes && !self.dry_run {
            println!("Generation:");
            println!("  Schedule: {}", self.schedule);
            println!(
                "  Banks: {}",
                if banks.is_empty() {
                    "All".to_string()
                } else {
                    self.bank.join(", ")
                }
            );
            println!("  Store: {:?}", config.store.target);
            println!("  Handoff: {}", config.handoff.kind);
            println!();
            print!("Proceed with generation? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Generation cancelled.");
                return Ok(0);
            }
        }

        let settings = ConfigSettings::new(config.banks.clone());
        let dispatcher = BankDispatcher::new(
            store.instructions(),
            store.schedules(),
            &storage,
            notifier.as_ref(),
            &validator,
            &settings,
            config.initiating_party.name.clone(),
        )
        .with_options(GenerationOptions::from_config(&config));

        let result = dispatcher.dispatch(ScheduleId::new(self.schedule), &banks).await;

        // Statuses written before a failure are kept
        if let Err(e) = store.persist().await {
            tracing::error!(error = %e, "Failed to save store document");
            eprintln!("Failed to save store: {e}");
            return Ok(5);
        }

        let runs = match result {
            Ok(runs) => runs,
            Err(e) => {
                tracing::error!(error = %e, "Generation failed");
                eprintln!("Generation failed: {e}");
                return Ok(exit_code(&e));
            }
        };

        print_runs(&runs);

        let code = completion_code(&runs);
        if code == 0 {
            println!("✅ Generation completed successfully!");
        } else {
            println!("⚠️  Generation completed with failures");
        }
        Ok(code)
    }
}

fn print_runs(runs: &[BankRun]) {
    println!();
    println!("📊 Generation Summary:");
    for run in runs {
        let Some(summary) = &run.summary else {
            println!("  {}: nothing eligible", run.bank);
            continue;
        };

        println!("  {} ({}):", run.bank, summary.creditor_iban);
        println!("    Run: {}", summary.run_id);
        println!("    Files: {}", summary.files.len());
        println!("    Planned: {}", summary.totals.records);
        println!("    Control Sum: {}", format_minor_units(summary.totals.amount));
        println!("    Emitted: {}", summary.emitted);
        println!("    Failed: {}", summary.failed);
        println!("    Duration: {:.2}s", summary.duration.as_secs_f64());

        for file in &summary.files {
            println!("    - {} ({} bytes, sha256 {})", file.filename, file.bytes, file.checksum);
            if !file.verification.issues.is_empty() {
                println!("      {}", file.verification.format_summary());
            }
        }

        for (i, failure) in summary.failures.iter().enumerate() {
            if i == 10 {
                println!("    ... and {} more failures", summary.failures.len() - 10);
                break;
            }
            println!("    ✗ {} [{}]: {}", failure.instruction_id, failure.sequence_type, failure.reason);
        }

        for error in &summary.errors {
            println!("    ⚠️  {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("       Context: {context}");
            }
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generate::{GenerationSummary, RecordFailure};
    use crate::domain::{InstructionId, RunId};
    use test_case::test_case;

    #[test_case(SddError::Configuration("caps".into()), 2 ; "configuration")]
    #[test_case(SddError::EmptySchedule("none".into()), 3 ; "empty schedule")]
    #[test_case(SddError::Storage("disk full".into()), 5 ; "storage")]
    #[test_case(SddError::Handoff("refused".into()), 5 ; "handoff")]
    fn test_exit_code(error: SddError, expected: i32) {
        assert_eq!(exit_code(&error), expected);
    }

    fn run(bank: &str, failed: bool) -> BankRun {
        let mut summary = GenerationSummary::new(RunId::generate(), ScheduleId::new(1), "NL91ABNA0417164300");
        if failed {
            summary.add_failure(RecordFailure {
                instruction_id: InstructionId::new(1),
                sequence_type: "RCUR".into(),
                filename: "F.xml".into(),
                reason: "BIC is empty.".into(),
            });
        }
        BankRun {
            bank: BankId::new(bank).unwrap(),
            summary: Some(summary),
        }
    }

    #[test]
    fn test_completion_code() {
        assert_eq!(completion_code(&[run("abn", false)]), 0);
        assert_eq!(completion_code(&[run("abn", false), run("ing", true)]), 1);
        let skipped = BankRun {
            bank: BankId::new("rabo").unwrap(),
            summary: None,
        };
        assert_eq!(completion_code(&[run("abn", false), skipped]), 0);
    }
}
