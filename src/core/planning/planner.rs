//! Batch planning
//!
//! Computes, for one physical file, which instructions it holds and how they
//! split into sequence-type batches, before any XML is written. The plan
//! records the member ids of every batch; the writing pass fetches exactly
//! those ids, so header totals and written content come from the same list.

use crate::adapters::store::{EligibilityScope, InstructionSource};
use crate::domain::money::parse_minor_units;
use crate::domain::{CreditorProfile, InstructionId, Result, RunTotals, SddError};
use serde::Serialize;

/// Default number of instructions read per store round trip
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Resolved record limits for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCaps {
    /// Records per file
    pub per_file: u64,
    /// Records per sequence-type batch
    pub per_sequence: u64,
}

impl RecordCaps {
    /// Resolves the caps of a creditor profile against the eligible count
    ///
    /// A per-file cap of 0 means unlimited (one file holding `total`
    /// records). A per-sequence cap of 0 falls back to the per-file cap.
    ///
    /// # Errors
    ///
    /// Returns [`SddError::Configuration`] when a limited per-file cap is
    /// smaller than the per-sequence cap.
    pub fn resolve(profile: &CreditorProfile, total: u64) -> Result<Self> {
        let unlimited = profile.records_per_file == 0;
        let per_file = if unlimited {
            total.max(1)
        } else {
            profile.records_per_file
        };
        let per_sequence = if profile.records_per_sequence_type > 0 {
            profile.records_per_sequence_type
        } else {
            per_file
        };

        if !unlimited && per_sequence > per_file {
            return Err(SddError::Configuration(format!(
                "RECORDS_PER_SEQUENCE_TYPE ({per_sequence}) may never exceed RECORDS_PER_FILE ({per_file})"
            )));
        }

        Ok(Self {
            per_file,
            per_sequence,
        })
    }

    /// Number of files needed for `total` records
    pub fn number_of_files(&self, total: u64) -> u64 {
        total.div_ceil(self.per_file)
    }
}

/// One payment information block of a file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubBatch {
    /// Planned record count
    pub records: u64,
    /// Planned amount in minor units
    pub amount: u64,
    /// Members, in window order
    pub instruction_ids: Vec<InstructionId>,
}

/// Consecutive batches sharing one sequence type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceGroup {
    /// Sequence type code as stored
    pub sequence_type: String,
    pub batches: Vec<SubBatch>,
}

/// Plan of one physical file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    /// Zero-based file index within the run
    pub file_index: u64,
    /// File totals
    pub totals: RunTotals,
    /// Sequence groups in window order
    pub groups: Vec<SequenceGroup>,
}

impl BatchPlan {
    /// Sum of record counts over all batches
    pub fn batch_record_sum(&self) -> u64 {
        self.batches().map(|(_, b)| b.records).sum()
    }

    /// Iterates `(sequence_type, batch)` in plan order
    pub fn batches(&self) -> impl Iterator<Item = (&str, &SubBatch)> {
        self.groups
            .iter()
            .flat_map(|g| g.batches.iter().map(move |b| (g.sequence_type.as_str(), b)))
    }

    fn push(&mut self, sequence_type: &str, per_sequence: u64, id: InstructionId, amount: u64) {
        let start_group = self
            .groups
            .last()
            .map_or(true, |g| g.sequence_type != sequence_type);
        if start_group {
            self.groups.push(SequenceGroup {
                sequence_type: sequence_type.to_string(),
                batches: Vec::new(),
            });
        }

        // A group always exists at this point
        if let Some(group) = self.groups.last_mut() {
            let start_batch = group
                .batches
                .last()
                .map_or(true, |b| b.records >= per_sequence);
            if start_batch {
                group.batches.push(SubBatch::default());
            }
            if let Some(batch) = group.batches.last_mut() {
                batch.records += 1;
                batch.amount = batch.amount.saturating_add(amount);
                batch.instruction_ids.push(id);
            }
        }
    }
}

/// Plans files from an instruction source
pub struct BatchPlanner<'a> {
    source: &'a dyn InstructionSource,
    page_size: u64,
}

impl<'a> BatchPlanner<'a> {
    /// Creates a planner reading pages of [`DEFAULT_PAGE_SIZE`]
    pub fn new(source: &'a dyn InstructionSource) -> Self {
        Self {
            source,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the page size used for window reads
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Plans the file at `file_index`
    ///
    /// Covers the window `[file_index * per_file, file_index * per_file + per_file)`
    /// of the eligible instructions.
    pub async fn plan(
        &self,
        scope: &EligibilityScope,
        caps: RecordCaps,
        file_index: u64,
    ) -> Result<BatchPlan> {
        if caps.per_sequence == 0 || caps.per_file == 0 {
            return Err(SddError::Configuration(
                "record caps must be greater than zero".to_string(),
            ));
        }

        let mut plan = BatchPlan {
            file_index,
            totals: RunTotals::default(),
            groups: Vec::new(),
        };

        let start = file_index * caps.per_file;
        let mut read = 0u64;

        while read < caps.per_file {
            let limit = self.page_size.min(caps.per_file - read);
            let page = self.source.fetch_window(scope, start + read, limit).await?;
            let fetched = page.len() as u64;

            for instruction in page {
                let amount = match parse_minor_units(&instruction.amount) {
                    Some(amount) => amount,
                    None => {
                        tracing::warn!(
                            instruction_id = %instruction.id,
                            amount = %instruction.amount,
                            "Amount is not in minor units, planning it as 0"
                        );
                        0
                    }
                };

                plan.totals.absorb(&RunTotals {
                    records: 1,
                    amount,
                    first_collection_date: Some(instruction.due_date),
                });
                plan.push(&instruction.sequence_type, caps.per_sequence, instruction.id, amount);
            }

            read += fetched;
            if fetched < limit {
                break;
            }
        }

        tracing::debug!(
            file_index = file_index,
            records = plan.totals.records,
            amount = plan.totals.amount,
            groups = plan.groups.len(),
            "Planned file"
        );

        Ok(plan)
    }
}
