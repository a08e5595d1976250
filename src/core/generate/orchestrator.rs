//! File orchestrator - runs one schedule for one creditor
//!
//! A run counts the eligible instructions, resolves the record caps, then for
//! each file plans it, streams it through the [`DocumentWriter`], verifies it
//! and hands it off. Totals are written back to the schedule once all files
//! are done. Files created in local storage are removed on every exit path.

use super::summary::{
    GeneratedFile, GenerationError, GenerationErrorType, GenerationSummary, RecordFailure,
};
use super::workspace::GeneratedFiles;
use crate::adapters::handoff::{HandoffNotifier, ReadyFile};
use crate::adapters::storage::FileStorage;
use crate::adapters::store::{EligibilityScope, InstructionSource, ScheduleStore};
use crate::config::{SddConfig, VerificationConfig};
use crate::core::document::{
    naming, DocumentWriter, QuickXmlSink, WriteOutcome, XmlSink, DEFAULT_FLUSH_EVERY,
};
use crate::core::planning::{BatchPlan, BatchPlanner, RecordCaps, DEFAULT_PAGE_SIZE};
use crate::core::validation::Validator;
use crate::core::verification::Verifier;
use crate::domain::{
    BatchTotal, CreditorProfile, Instruction, InstructionId, InstructionStatus, Result, RunId, Schedule,
    ScheduleStatus, SddError,
};
use crate::{log_error_with_context, log_record_rejected, log_run_complete, log_run_start};
use chrono::Local;
use std::collections::HashSet;
use std::time::Instant;

/// Tuning knobs of a run
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    /// Instructions between flushes inside a batch
    pub flush_every: u64,
    /// Instructions per store round trip, for planning and writing
    pub page_size: u64,
    pub verification: VerificationConfig,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            flush_every: DEFAULT_FLUSH_EVERY,
            page_size: DEFAULT_PAGE_SIZE,
            verification: VerificationConfig::default(),
        }
    }
}

impl GenerationOptions {
    pub fn from_config(config: &SddConfig) -> Self {
        Self {
            flush_every: config.output.flush_every as u64,
            page_size: DEFAULT_PAGE_SIZE,
            verification: config.verification,
        }
    }
}

/// Builds a fresh sink for every file
type SinkFactory<'a, S> = Box<dyn Fn() -> S + Send + Sync + 'a>;

/// Generates the files of one schedule for one creditor
///
/// Files are emitted through [`QuickXmlSink`] unless another sink is
/// supplied with [`FileOrchestrator::with_sink`].
pub struct FileOrchestrator<'a, S: XmlSink = QuickXmlSink> {
    instructions: &'a dyn InstructionSource,
    schedules: &'a dyn ScheduleStore,
    storage: &'a dyn FileStorage,
    notifier: &'a dyn HandoffNotifier,
    validator: &'a Validator,
    new_sink: SinkFactory<'a, S>,
    options: GenerationOptions,
}

impl<'a> FileOrchestrator<'a> {
    pub fn new(
        instructions: &'a dyn InstructionSource,
        schedules: &'a dyn ScheduleStore,
        storage: &'a dyn FileStorage,
        notifier: &'a dyn HandoffNotifier,
        validator: &'a Validator,
    ) -> Self {
        Self {
            instructions,
            schedules,
            storage,
            notifier,
            validator,
            new_sink: Box::new(QuickXmlSink::new),
            options: GenerationOptions::default(),
        }
    }
}

impl<'a, S: XmlSink> FileOrchestrator<'a, S> {
    /// Emits files through sinks built by `new_sink`
    pub fn with_sink<T: XmlSink>(
        self,
        new_sink: impl Fn() -> T + Send + Sync + 'a,
    ) -> FileOrchestrator<'a, T> {
        FileOrchestrator {
            instructions: self.instructions,
            schedules: self.schedules,
            storage: self.storage,
            notifier: self.notifier,
            validator: self.validator,
            new_sink: Box::new(new_sink),
            options: self.options,
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = GenerationOptions {
            flush_every: options.flush_every.max(1),
            page_size: options.page_size.max(1),
            verification: options.verification,
        };
        self
    }

    /// Generate all files of `schedule` for `profile`
    ///
    /// # Errors
    ///
    /// - [`SddError::EmptySchedule`] when nothing is eligible
    /// - [`SddError::Configuration`] when the record caps are inconsistent
    ///
    /// Both are raised before any file is created. Store, storage and handoff
    /// failures abort the run; files already created are still removed.
    pub async fn generate(
        &self,
        schedule: &Schedule,
        profile: &CreditorProfile,
    ) -> Result<GenerationSummary> {
        let start = Instant::now();
        let run_id = RunId::generate();
        let scope = EligibilityScope::new(schedule.id, &profile.iban);

        let eligible = self.instructions.count_eligible(&scope).await?;
        if eligible == 0 {
            return Err(SddError::EmptySchedule(format!(
                "schedule {} has no eligible instructions for creditor {}",
                schedule.id, profile.iban
            )));
        }

        let caps = RecordCaps::resolve(profile, eligible)?;
        let number_of_files = caps.number_of_files(eligible);
        log_run_start!(run_id, schedule.id, profile.iban, eligible, number_of_files);

        let mut summary = GenerationSummary::new(run_id, schedule.id, &profile.iban);
        summary.eligible = eligible;

        let mut files = GeneratedFiles::new(self.storage);
        let outcome = self
            .run(schedule, profile, &scope, caps, number_of_files, &mut files, &mut summary)
            .await;

        let created = files.len();
        let leftover = files.release().await;
        tracing::debug!(created, leftover, "Local files released");

        if let Err(e) = outcome {
            log_error_with_context!(e, "Generation run aborted");
            return Err(e);
        }

        if leftover > 0 {
            summary.add_error(GenerationError::new(
                GenerationErrorType::Cleanup,
                format!("{leftover} generated file(s) could not be removed"),
            ));
        }

        summary.duration = start.elapsed();
        log_run_complete!(run_id, summary.emitted, summary.failed, summary.duration);
        summary.log_summary();

        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        schedule: &Schedule,
        profile: &CreditorProfile,
        scope: &EligibilityScope,
        caps: RecordCaps,
        number_of_files: u64,
        files: &mut GeneratedFiles<'_>,
        summary: &mut GenerationSummary,
    ) -> Result<()> {
        let run_started = Local::now().naive_local();
        let planner = BatchPlanner::new(self.instructions).with_page_size(self.options.page_size);
        let mut batch_totals = Vec::new();

        for file_index in 0..number_of_files {
            let plan = planner.plan(scope, caps, file_index).await?;
            if plan.totals.records == 0 {
                tracing::warn!(
                    file_index,
                    "Eligible set shrank during the run, no instructions left to plan"
                );
                break;
            }

            let filename = naming::filename(&profile.iban, run_started, file_index + 1);
            files.track(&filename);

            let file = self
                .write_file(schedule, profile, &plan, &filename, &mut batch_totals, summary)
                .await?;
            self.hand_off(profile, &file).await?;
            summary.add_file(file);
        }

        self.schedules
            .replace_totals(schedule.id, &profile.iban, &batch_totals)
            .await?;
        self.schedules
            .update_schedule_totals(schedule.id, &summary.totals, ScheduleStatus::PendingVerification)
            .await?;
        summary.batch_totals = batch_totals;

        Ok(())
    }

    async fn write_file(
        &self,
        schedule: &Schedule,
        profile: &CreditorProfile,
        plan: &BatchPlan,
        filename: &str,
        batch_totals: &mut Vec<BatchTotal>,
        summary: &mut GenerationSummary,
    ) -> Result<GeneratedFile> {
        tracing::info!(
            file = %filename,
            records = plan.totals.records,
            batches = plan.batches().count(),
            "Writing file"
        );

        let mut writer = DocumentWriter::new((self.new_sink)(), self.storage, self.validator, profile)
            .with_flush_every(self.options.flush_every);
        writer.open(filename)?;
        let message_id = writer
            .write_header(plan.totals.records, plan.totals.amount)
            .await?;

        let mut emitted = 0u64;
        let mut rejected = 0u64;
        let mut batches = 0usize;

        for group in &plan.groups {
            for (index, batch) in group.batches.iter().enumerate() {
                let batch_id = writer
                    .open_batch(
                        &group.sequence_type,
                        index + 1,
                        batch.records,
                        batch.amount,
                        schedule.selection_date,
                    )
                    .await?;

                let page = usize::try_from(self.options.page_size).unwrap_or(usize::MAX);
                for ids in batch.instruction_ids.chunks(page) {
                    let instructions = self.instructions.fetch_by_ids(ids).await?;
                    if instructions.len() < ids.len() {
                        self.record_missing(ids, &instructions, filename, summary);
                    }

                    for instruction in &instructions {
                        match writer.write_instruction(instruction).await? {
                            WriteOutcome::Written => {
                                emitted += 1;
                                self.persist_status(instruction.id, InstructionStatus::New, None, summary)
                                    .await;
                            }
                            WriteOutcome::Rejected(rejection) => {
                                rejected += 1;
                                let reason = rejection.to_string();
                                log_record_rejected!(instruction.id, instruction.sequence_type, reason);
                                self.persist_status(
                                    instruction.id,
                                    InstructionStatus::Failed,
                                    Some(&reason),
                                    summary,
                                )
                                .await;
                                summary.add_failure(RecordFailure {
                                    instruction_id: instruction.id,
                                    sequence_type: instruction.sequence_type.clone(),
                                    filename: filename.to_string(),
                                    reason,
                                });
                            }
                        }
                    }
                }

                writer.close_batch().await?;
                batches += 1;

                tracing::debug!(
                    file = %filename,
                    batch_id = %batch_id,
                    sequence_type = %group.sequence_type,
                    records = batch.records,
                    "Batch closed"
                );

                batch_totals.push(BatchTotal {
                    creditor_iban: profile.iban.clone(),
                    sequence_type: group.sequence_type.clone(),
                    batch_id,
                    transactions: batch.records,
                    amount: batch.amount,
                    filename: filename.to_string(),
                    message_id: message_id.clone(),
                });
            }
        }

        let closed = writer.close_document().await?;

        let report = Verifier::new(self.storage, self.options.verification).verify(&closed)?;
        if report.checksum_verified == Some(false) {
            return Err(SddError::Storage(format!(
                "{} in storage does not match the bytes written",
                closed.filename
            )));
        }
        if !report.issues.is_empty() {
            if self.options.verification.enforce_schema {
                return Err(SddError::Validation(format!(
                    "{} failed the structural check: {}",
                    closed.filename,
                    report.format_summary()
                )));
            }
            summary.add_error(
                GenerationError::new(
                    GenerationErrorType::Verification,
                    format!("{} structural issue(s)", report.issues.len()),
                )
                .with_context(closed.filename.clone()),
            );
        }

        Ok(GeneratedFile {
            filename: closed.filename,
            message_id: closed.message_id,
            bytes: closed.bytes,
            checksum: closed.checksum,
            planned: plan.totals.clone(),
            batches,
            emitted,
            rejected,
            verification: report,
        })
    }

    async fn hand_off(&self, profile: &CreditorProfile, file: &GeneratedFile) -> Result<()> {
        let ready = ReadyFile {
            path: self.storage.path(&file.filename),
            filename: file.filename.clone(),
            upload: profile.upload,
            message_id: file.message_id.clone(),
            checksum: file.checksum.clone(),
        };
        self.notifier.file_ready(&ready).await?;
        tracing::info!(
            file = %file.filename,
            notifier = self.notifier.name(),
            upload = profile.upload,
            "File handed off"
        );
        Ok(())
    }

    async fn persist_status(
        &self,
        id: InstructionId,
        status: InstructionStatus,
        reason: Option<&str>,
        summary: &mut GenerationSummary,
    ) {
        if let Err(e) = self.instructions.update_status(id, status, reason).await {
            tracing::error!(
                instruction_id = %id,
                status = %status,
                error = %e,
                "Failed to persist instruction status"
            );
            summary.add_error(
                GenerationError::new(GenerationErrorType::StatusUpdate, e.to_string())
                    .with_context(format!("instruction {id}")),
            );
        }
    }

    fn record_missing(
        &self,
        requested: &[InstructionId],
        found: &[Instruction],
        filename: &str,
        summary: &mut GenerationSummary,
    ) {
        let found: HashSet<InstructionId> = found.iter().map(|i| i.id).collect();
        for id in requested.iter().filter(|id| !found.contains(id)) {
            tracing::warn!(instruction_id = %id, file = %filename, "Planned instruction no longer exists");
            summary.add_error(
                GenerationError::new(
                    GenerationErrorType::MissingInstruction,
                    "planned instruction no longer exists",
                )
                .with_context(format!("instruction {id}")),
            );
        }
    }
}
