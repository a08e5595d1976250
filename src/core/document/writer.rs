//! pain.008.001.02 document writer
//!
//! Streams one physical file: group header, repeated payment information
//! blocks (batches) holding direct debit transactions, then the closing
//! tags. The writer is a state machine:
//!
//! ```text
//! Closed -> Open -> HeaderWritten -> { BatchOpen -> BatchClosed }* -> DocumentClosed
//! ```
//!
//! Calls made in the wrong state return [`SddError::InvalidState`]. Emitted
//! bytes are appended to storage at every batch boundary, at document close
//! and every `flush_every` instructions inside a batch, so memory use does
//! not grow with the size of a schedule.

use super::naming;
use super::sink::XmlSink;
use crate::adapters::storage::FileStorage;
use crate::core::validation::{CheckedInstruction, ValidationError, Validator};
use crate::core::verification::checksum::StreamingChecksum;
use crate::domain::money::format_minor_units;
use crate::domain::{CreditorProfile, Instruction, Result, SddError};
use chrono::{Local, NaiveDate};
use std::fmt;

/// pain.008.001.02 namespace
pub const PAIN_008_NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:pain.008.001.02";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Default number of instructions between flushes inside a batch
pub const DEFAULT_FLUSH_EVERY: u64 = 1000;

/// Writer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Closed,
    Open,
    HeaderWritten,
    BatchOpen,
    BatchClosed,
    DocumentClosed,
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Result of handing one instruction to the writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Transaction block emitted
    Written,
    /// Nothing emitted; the caller records the rejection
    Rejected(ValidationError),
}

/// A completed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedDocument {
    pub filename: String,
    pub message_id: String,
    /// Bytes appended to storage
    pub bytes: u64,
    /// Hex SHA-256 of the appended bytes
    pub checksum: String,
}

/// Streaming writer for one pain.008.001.02 file
pub struct DocumentWriter<'a, S: XmlSink> {
    sink: S,
    storage: &'a dyn FileStorage,
    validator: &'a Validator,
    creditor: &'a CreditorProfile,
    flush_every: u64,
    state: WriterState,
    filename: Option<String>,
    message_id: Option<String>,
    checksum: StreamingChecksum,
    batch_attempts: u64,
}

impl<'a, S: XmlSink> DocumentWriter<'a, S> {
    /// Creates a writer in the `Closed` state
    pub fn new(
        sink: S,
        storage: &'a dyn FileStorage,
        validator: &'a Validator,
        creditor: &'a CreditorProfile,
    ) -> Self {
        Self {
            sink,
            storage,
            validator,
            creditor,
            flush_every: DEFAULT_FLUSH_EVERY,
            state: WriterState::Closed,
            filename: None,
            message_id: None,
            checksum: StreamingChecksum::new(),
            batch_attempts: 0,
        }
    }

    /// Sets the number of instructions between flushes inside a batch
    pub fn with_flush_every(mut self, flush_every: u64) -> Self {
        self.flush_every = flush_every.max(1);
        self
    }

    /// Current state
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Name of the file being written
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    fn ensure_state(&self, allowed: &[WriterState], operation: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SddError::InvalidState {
                operation,
                state: self.state.to_string(),
            })
        }
    }

    /// Starts a new document named `filename`
    pub fn open(&mut self, filename: impl Into<String>) -> Result<()> {
        self.ensure_state(&[WriterState::Closed], "open document")?;
        self.sink.declaration()?;
        self.filename = Some(filename.into());
        self.state = WriterState::Open;
        Ok(())
    }

    /// Writes the group header and returns the generated message id
    pub async fn write_header(&mut self, total_records: u64, total_amount: u64) -> Result<String> {
        self.ensure_state(&[WriterState::Open], "write header")?;

        let now = Local::now().naive_local();
        let message_id = naming::message_id(now);

        self.sink.start_element(
            "Document",
            &[("xmlns", PAIN_008_NAMESPACE), ("xmlns:xsi", XSI_NAMESPACE)],
        )?;
        self.sink.start_element("CstmrDrctDbtInitn", &[])?;

        self.sink.start_element("GrpHdr", &[])?;
        self.sink.text_element("MsgId", &[], &message_id)?;
        self.sink
            .text_element("CreDtTm", &[], &now.format("%Y-%m-%dT%H:%M:%S").to_string())?;
        self.sink
            .text_element("NbOfTxs", &[], &total_records.to_string())?;
        self.sink
            .text_element("CtrlSum", &[], &format_minor_units(total_amount))?;
        self.sink.start_element("InitgPty", &[])?;
        self.sink.text_element("Nm", &[], &self.creditor.name)?;
        self.sink.end_element()?;
        self.sink.end_element()?;

        self.message_id = Some(message_id.clone());
        self.state = WriterState::HeaderWritten;
        self.flush().await?;

        Ok(message_id)
    }

    /// Opens a payment information block and returns its id
    pub async fn open_batch(
        &mut self,
        sequence_type: &str,
        section: usize,
        record_count: u64,
        amount: u64,
        collection_date: NaiveDate,
    ) -> Result<String> {
        self.ensure_state(
            &[WriterState::HeaderWritten, WriterState::BatchClosed],
            "open batch",
        )?;

        let batch_id = naming::batch_id(section, sequence_type, Local::now().naive_local());
        let creditor = self.creditor;
        let sink = &mut self.sink;

        sink.start_element("PmtInf", &[])?;
        sink.text_element("PmtInfId", &[], &batch_id)?;
        sink.text_element("PmtMtd", &[], "DD")?;
        sink.text_element("NbOfTxs", &[], &record_count.to_string())?;
        sink.text_element("CtrlSum", &[], &format_minor_units(amount))?;

        sink.start_element("PmtTpInf", &[])?;
        sink.start_element("SvcLvl", &[])?;
        sink.text_element("Cd", &[], "SEPA")?;
        sink.end_element()?;
        sink.start_element("LclInstrm", &[])?;
        sink.text_element("Cd", &[], "CORE")?;
        sink.end_element()?;
        sink.text_element("SeqTp", &[], sequence_type)?;
        sink.end_element()?;

        sink.text_element(
            "ReqdColltnDt",
            &[],
            &collection_date.format("%Y-%m-%d").to_string(),
        )?;

        sink.start_element("Cdtr", &[])?;
        sink.text_element("Nm", &[], &creditor.name)?;
        sink.end_element()?;

        sink.start_element("CdtrAcct", &[])?;
        sink.start_element("Id", &[])?;
        sink.text_element("IBAN", &[], &creditor.iban)?;
        sink.end_element()?;
        sink.end_element()?;

        sink.start_element("CdtrAgt", &[])?;
        sink.start_element("FinInstnId", &[])?;
        sink.text_element("BIC", &[], &creditor.bic)?;
        sink.end_element()?;
        sink.end_element()?;

        sink.text_element("ChrgBr", &[], "SLEV")?;

        sink.start_element("CdtrSchmeId", &[])?;
        sink.text_element("Nm", &[], &creditor.name)?;
        sink.start_element("Id", &[])?;
        sink.start_element("PrvtId", &[])?;
        sink.start_element("Othr", &[])?;
        sink.text_element("Id", &[], &creditor.creditor_id)?;
        sink.start_element("SchmeNm", &[])?;
        sink.text_element("Prtry", &[], "SEPA")?;
        sink.end_element()?;
        sink.end_element()?;
        sink.end_element()?;
        sink.end_element()?;
        sink.end_element()?;

        self.batch_attempts = 0;
        self.state = WriterState::BatchOpen;
        self.flush().await?;

        Ok(batch_id)
    }

    /// Validates an instruction and, if valid, emits its transaction block
    ///
    /// A rejection is returned as [`WriteOutcome::Rejected`]; the batch stays
    /// open and the next instruction can be written. A sink fault inside the
    /// transaction block is a rejection too: the partial block is rolled
    /// back so the surrounding batch keeps its nesting.
    pub async fn write_instruction(&mut self, instruction: &Instruction) -> Result<WriteOutcome> {
        self.ensure_state(&[WriterState::BatchOpen], "write instruction")?;

        let outcome = match self.validator.validate(instruction) {
            Ok(checked) => {
                self.sink.checkpoint();
                match self.emit_transaction(instruction, &checked) {
                    Ok(()) => WriteOutcome::Written,
                    Err(e) => {
                        self.sink.rollback()?;
                        tracing::warn!(
                            instruction_id = %instruction.id,
                            error = %e,
                            "Transaction block rolled back"
                        );
                        WriteOutcome::Rejected(ValidationError::emission(e.to_string()))
                    }
                }
            }
            Err(rejection) => WriteOutcome::Rejected(rejection),
        };

        self.batch_attempts += 1;
        if self.batch_attempts % self.flush_every == 0 {
            self.flush().await?;
        }

        Ok(outcome)
    }

    fn emit_transaction(&mut self, instruction: &Instruction, checked: &CheckedInstruction) -> Result<()> {
        let amount = format_minor_units(checked.amount);
        let signed_on = checked.mandate_signed_on.format("%Y-%m-%d").to_string();
        let currency = self.creditor.currency.as_str();
        let sink = &mut self.sink;

        sink.start_element("DrctDbtTxInf", &[])?;

        sink.start_element("PmtId", &[])?;
        sink.text_element("EndToEndId", &[], &instruction.end_to_end_id)?;
        sink.end_element()?;

        sink.text_element("InstdAmt", &[("Ccy", currency)], &amount)?;

        sink.start_element("DrctDbtTx", &[])?;
        sink.start_element("MndtRltdInf", &[])?;
        sink.text_element("MndtId", &[], &instruction.mandate_id)?;
        sink.text_element("DtOfSgntr", &[], &signed_on)?;
        sink.end_element()?;
        sink.end_element()?;

        sink.start_element("DbtrAgt", &[])?;
        sink.start_element("FinInstnId", &[])?;
        sink.text_element("BIC", &[], &instruction.bic)?;
        sink.end_element()?;
        sink.end_element()?;

        sink.start_element("Dbtr", &[])?;
        sink.text_element("Nm", &[], &instruction.account_holder_name)?;
        sink.end_element()?;

        sink.start_element("DbtrAcct", &[])?;
        sink.start_element("Id", &[])?;
        sink.text_element("IBAN", &[], &instruction.iban)?;
        sink.end_element()?;
        sink.end_element()?;

        sink.start_element("RmtInf", &[])?;
        sink.text_element("Ustrd", &[], &instruction.remittance_info)?;
        sink.end_element()?;

        sink.end_element()
    }

    /// Closes the current payment information block
    pub async fn close_batch(&mut self) -> Result<()> {
        self.ensure_state(&[WriterState::BatchOpen], "close batch")?;
        self.sink.end_element()?;
        self.state = WriterState::BatchClosed;
        self.flush().await
    }

    /// Closes the document and returns what was written
    pub async fn close_document(&mut self) -> Result<ClosedDocument> {
        self.ensure_state(
            &[WriterState::HeaderWritten, WriterState::BatchClosed],
            "close document",
        )?;

        // CstmrDrctDbtInitn, Document
        while self.sink.depth() > 0 {
            self.sink.end_element()?;
        }
        self.state = WriterState::DocumentClosed;
        self.flush().await?;

        let checksum = std::mem::take(&mut self.checksum);
        Ok(ClosedDocument {
            filename: self.filename.clone().unwrap_or_default(),
            message_id: self.message_id.clone().unwrap_or_default(),
            bytes: checksum.bytes(),
            checksum: checksum.finish(),
        })
    }

    /// Appends everything buffered so far to storage
    pub async fn flush(&mut self) -> Result<()> {
        let filename = match (&self.state, &self.filename) {
            (WriterState::Closed, _) | (_, None) => {
                return Err(SddError::InvalidState {
                    operation: "flush",
                    state: self.state.to_string(),
                })
            }
            (_, Some(name)) => name,
        };

        let chunk = self.sink.take_buffer();
        if chunk.is_empty() {
            return Ok(());
        }

        self.storage.append(filename, &chunk).await?;
        self.checksum.update(&chunk);
        tracing::trace!(file = %filename, bytes = chunk.len(), "Flushed chunk");
        Ok(())
    }
}
