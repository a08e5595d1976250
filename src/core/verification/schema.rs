//! Structural pain.008.001.02 conformance check
//!
//! A single streaming pass over a written file that checks the parts of the
//! pain.008.001.02 schema the generator is responsible for:
//!
//! - namespace, group header and payment information fields
//! - declared transaction counts and control sums against the transactions
//!   actually present
//! - the length and pattern facets of the fields copied from instructions
//!   and creditor settings (`Max35Text`, `Max70Text`, `Max140Text`,
//!   `IBAN2007Identifier`, `BICIdentifier`, `ActiveOrHistoricCurrencyCode`,
//!   `ISODate`)
//!
//! Names are held to 70 characters, the SEPA limit banks enforce.
//!
//! Problems are collected into the report; the check itself never fails.

use super::report::VerificationReport;
use crate::core::document::PAIN_008_NAMESPACE;
use crate::domain::money::parse_decimal;
use crate::domain::{Result, SddError, SequenceType};
use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::io::BufRead;

const MAX_ID_LEN: usize = 35;
const MAX_NAME_LEN: usize = 70;
const MAX_REMITTANCE_LEN: usize = 140;

const IBAN_PATTERN: &str = r"^[A-Z]{2}[0-9]{2}[a-zA-Z0-9]{1,30}$";
const BIC_PATTERN: &str = r"^[A-Z]{6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3})?$";
const CURRENCY_PATTERN: &str = r"^[A-Z]{3}$";

/// Simple-type restriction of a leaf element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facet {
    /// 1 to n characters
    Text(usize),
    Iban,
    Bic,
    IsoDate,
}

impl Facet {
    /// Facet of `name` when it sits under `parent`
    ///
    /// `MsgId` and `PmtInfId` are checked with their block instead.
    fn of(name: &str, parent: Option<&str>) -> Option<Facet> {
        match (name, parent) {
            ("EndToEndId", Some("PmtId"))
            | ("MndtId", Some("MndtRltdInf"))
            | ("Id", Some("Othr")) => Some(Facet::Text(MAX_ID_LEN)),
            ("Nm", Some("InitgPty" | "Cdtr" | "Dbtr" | "CdtrSchmeId")) => {
                Some(Facet::Text(MAX_NAME_LEN))
            }
            ("Ustrd", Some("RmtInf")) => Some(Facet::Text(MAX_REMITTANCE_LEN)),
            ("IBAN", Some("Id")) => Some(Facet::Iban),
            ("BIC", Some("FinInstnId")) => Some(Facet::Bic),
            ("DtOfSgntr", Some("MndtRltdInf")) => Some(Facet::IsoDate),
            _ => None,
        }
    }
}

/// Compiled identifier patterns
#[derive(Debug)]
struct Patterns {
    iban: Regex,
    bic: Regex,
    currency: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| SddError::Configuration(format!("invalid schema pattern {pattern}: {e}")))
        };
        Ok(Self {
            iban: compile(IBAN_PATTERN)?,
            bic: compile(BIC_PATTERN)?,
            currency: compile(CURRENCY_PATTERN)?,
        })
    }
}

#[derive(Debug, Default)]
struct Declared {
    nb_of_txs: Option<String>,
    ctrl_sum: Option<String>,
}

#[derive(Debug, Default)]
struct GroupHeader {
    declared: Declared,
    msg_id: Option<String>,
    cre_dt_tm: Option<String>,
    initg_pty_nm: Option<String>,
}

#[derive(Debug, Default)]
struct PaymentInfo {
    index: usize,
    declared: Declared,
    pmt_inf_id: Option<String>,
    pmt_mtd: Option<String>,
    seq_tp: Option<String>,
    reqd_colltn_dt: Option<String>,
    transactions: u64,
    amount: u64,
}

#[derive(Debug, Default)]
struct Totals {
    transactions: u64,
    amount: u64,
}

/// Streaming structural checker
#[derive(Debug)]
pub struct StructuralSchemaCheck {
    patterns: Patterns,
    stack: Vec<String>,
    /// Whether the innermost open element has had text
    has_text: bool,
    header: GroupHeader,
    current: Option<PaymentInfo>,
    totals: Totals,
    seen_initiation: bool,
}

impl StructuralSchemaCheck {
    /// # Errors
    ///
    /// Returns an error if an identifier pattern cannot be compiled.
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: Patterns::new()?,
            stack: Vec::new(),
            has_text: false,
            header: GroupHeader::default(),
            current: None,
            totals: Totals::default(),
            seen_initiation: false,
        })
    }

    /// Runs the check over `input`, recording findings in `report`
    pub fn check<R: BufRead>(mut self, input: R, report: &mut VerificationReport) {
        report.schema_checked = true;

        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => self.on_start(&e, report),
                Ok(Event::Empty(e)) => {
                    self.on_start(&e, report);
                    self.on_end(report);
                }
                Ok(Event::Text(t)) => match t.unescape() {
                    Ok(text) => self.on_text(&text, report),
                    Err(e) => report.record_issue(self.path(), format!("invalid text: {e}")),
                },
                Ok(Event::End(_)) => self.on_end(report),
                Ok(Event::Eof) => break,
                Err(e) => {
                    report.record_issue(
                        self.path(),
                        format!(
                            "not well-formed at byte {}: {}",
                            reader.buffer_position(),
                            e
                        ),
                    );
                    return;
                }
                _ => {}
            }
            buf.clear();
        }

        self.finish(report);
    }

    fn path(&self) -> String {
        if self.stack.is_empty() {
            "/".to_string()
        } else {
            self.stack.join("/")
        }
    }

    fn parent(&self) -> Option<&str> {
        self.stack.iter().rev().nth(1).map(String::as_str)
    }

    fn inside(&self, name: &str) -> bool {
        self.stack.iter().any(|s| s == name)
    }

    fn on_start(&mut self, e: &BytesStart<'_>, report: &mut VerificationReport) {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

        if self.stack.is_empty() {
            self.check_root(&name, e, report);
        }
        if name == "CstmrDrctDbtInitn" && self.stack.len() == 1 {
            self.seen_initiation = true;
        }

        self.stack.push(name);
        self.has_text = false;

        match self.stack.last().map(String::as_str) {
            Some("PmtInf") => {
                report.batches += 1;
                self.current = Some(PaymentInfo {
                    index: report.batches,
                    ..Default::default()
                });
            }
            Some("DrctDbtTxInf") => {
                report.transactions += 1;
                if let Some(pmt) = self.current.as_mut() {
                    pmt.transactions += 1;
                }
                self.totals.transactions += 1;
            }
            Some("InstdAmt") => {
                let currency = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.as_ref() == b"Ccy")
                    .map(|a| String::from_utf8_lossy(&a.value).into_owned());
                match currency {
                    None => report.record_issue(self.path(), "InstdAmt has no Ccy attribute"),
                    Some(code) if !self.patterns.currency.is_match(&code) => report.record_issue(
                        self.path(),
                        format!("Ccy {code} is not a three-letter currency code"),
                    ),
                    Some(_) => {}
                }
            }
            _ => {}
        }
    }

    fn check_root(&self, name: &str, e: &BytesStart<'_>, report: &mut VerificationReport) {
        if name != "Document" {
            report.record_issue(name, "root element is not Document");
            return;
        }
        let namespace = e
            .attributes()
            .flatten()
            .find(|a| a.key.as_ref() == b"xmlns")
            .map(|a| String::from_utf8_lossy(&a.value).into_owned());
        if namespace.as_deref() != Some(PAIN_008_NAMESPACE) {
            report.record_issue(
                "Document",
                format!(
                    "namespace is {}, expected {}",
                    namespace.as_deref().unwrap_or("missing"),
                    PAIN_008_NAMESPACE
                ),
            );
        }
    }

    fn on_text(&mut self, text: &str, report: &mut VerificationReport) {
        let name = match self.stack.last() {
            Some(name) => name.clone(),
            None => return,
        };
        let parent = self.parent().map(str::to_string);
        let value = Some(text.to_string());

        self.has_text = true;
        if let Some(facet) = Facet::of(&name, parent.as_deref()) {
            self.check_facet(facet, &name, text, report);
        }

        if self.inside("GrpHdr") {
            match (name.as_str(), parent.as_deref()) {
                ("MsgId", Some("GrpHdr")) => self.header.msg_id = value,
                ("CreDtTm", Some("GrpHdr")) => self.header.cre_dt_tm = value,
                ("NbOfTxs", Some("GrpHdr")) => self.header.declared.nb_of_txs = value,
                ("CtrlSum", Some("GrpHdr")) => self.header.declared.ctrl_sum = value,
                ("Nm", Some("InitgPty")) => self.header.initg_pty_nm = value,
                _ => {}
            }
            return;
        }

        if name == "InstdAmt" {
            match parse_decimal(text) {
                Some(amount) => {
                    self.totals.amount = self.totals.amount.saturating_add(amount);
                    if let Some(pmt) = self.current.as_mut() {
                        pmt.amount = pmt.amount.saturating_add(amount);
                    }
                }
                None => report.record_issue(self.path(), format!("{text} is not a decimal amount")),
            }
            return;
        }

        if let Some(pmt) = self.current.as_mut() {
            match (name.as_str(), parent.as_deref()) {
                ("PmtInfId", Some("PmtInf")) => pmt.pmt_inf_id = value,
                ("PmtMtd", Some("PmtInf")) => pmt.pmt_mtd = value,
                ("NbOfTxs", Some("PmtInf")) => pmt.declared.nb_of_txs = value,
                ("CtrlSum", Some("PmtInf")) => pmt.declared.ctrl_sum = value,
                ("SeqTp", Some("PmtTpInf")) => pmt.seq_tp = value,
                ("ReqdColltnDt", Some("PmtInf")) => pmt.reqd_colltn_dt = value,
                _ => {}
            }
        }
    }

    fn check_facet(&self, facet: Facet, name: &str, text: &str, report: &mut VerificationReport) {
        let problem = match facet {
            Facet::Text(max) => {
                let len = text.chars().count();
                (len == 0 || len > max)
                    .then(|| format!("{name} must be 1 to {max} characters, found {len}"))
            }
            Facet::Iban => (!self.patterns.iban.is_match(text))
                .then(|| format!("IBAN {text} does not match IBAN2007Identifier")),
            Facet::Bic => (!self.patterns.bic.is_match(text))
                .then(|| format!("BIC {text} does not match BICIdentifier")),
            Facet::IsoDate => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .is_err()
                .then(|| format!("{name} {text} is not an ISO date")),
        };
        if let Some(reason) = problem {
            report.record_issue(self.path(), reason);
        }
    }

    fn on_end(&mut self, report: &mut VerificationReport) {
        if !self.has_text {
            if let Some(name) = self.stack.last() {
                if let Some(facet) = Facet::of(name, self.parent()) {
                    self.check_facet(facet, name, "", report);
                }
            }
        }
        // the parent has child elements, so no facet of its own applies
        self.has_text = true;

        let closing_payment = self.stack.last().map(String::as_str) == Some("PmtInf");
        if closing_payment {
            if let Some(pmt) = self.current.take() {
                let path = format!("{}[{}]", self.path(), pmt.index);
                check_payment_info(&path, &pmt, report);
            }
        }
        self.stack.pop();
    }

    fn finish(self, report: &mut VerificationReport) {
        if !self.seen_initiation {
            report.record_issue("Document", "CstmrDrctDbtInitn is missing");
            return;
        }

        let path = "Document/CstmrDrctDbtInitn/GrpHdr";
        let header = &self.header;

        match header.msg_id.as_deref() {
            None => report.record_issue(path, "MsgId is missing"),
            Some(id) if id.is_empty() || id.len() > MAX_ID_LEN => {
                report.record_issue(path, format!("MsgId {id} must be 1 to {MAX_ID_LEN} characters"))
            }
            Some(_) => {}
        }
        match header.cre_dt_tm.as_deref() {
            None => report.record_issue(path, "CreDtTm is missing"),
            Some(ts) if NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S").is_err() => {
                report.record_issue(path, format!("CreDtTm {ts} is not an ISO date time"))
            }
            Some(_) => {}
        }
        if header.initg_pty_nm.as_deref().map_or(true, str::is_empty) {
            report.record_issue(path, "InitgPty/Nm is missing");
        }

        check_declared(
            path,
            &header.declared,
            self.totals.transactions,
            self.totals.amount,
            report,
        );
    }
}

fn check_payment_info(path: &str, pmt: &PaymentInfo, report: &mut VerificationReport) {
    match pmt.pmt_inf_id.as_deref() {
        None => report.record_issue(path, "PmtInfId is missing"),
        Some(id) if id.is_empty() || id.len() > MAX_ID_LEN => report.record_issue(
            path,
            format!("PmtInfId {id} must be 1 to {MAX_ID_LEN} characters"),
        ),
        Some(_) => {}
    }
    if pmt.pmt_mtd.as_deref() != Some("DD") {
        report.record_issue(path, "PmtMtd must be DD");
    }
    match pmt.seq_tp.as_deref() {
        None => report.record_issue(path, "SeqTp is missing"),
        Some(code) if code.parse::<SequenceType>().is_err() => {
            report.record_issue(path, format!("SeqTp {code} is not a sequence type"))
        }
        Some(_) => {}
    }
    match pmt.reqd_colltn_dt.as_deref() {
        None => report.record_issue(path, "ReqdColltnDt is missing"),
        Some(date) if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() => {
            report.record_issue(path, format!("ReqdColltnDt {date} is not an ISO date"))
        }
        Some(_) => {}
    }
    if pmt.transactions == 0 {
        report.record_issue(path, "PmtInf holds no DrctDbtTxInf");
    }

    check_declared(path, &pmt.declared, pmt.transactions, pmt.amount, report);
}

fn check_declared(
    path: &str,
    declared: &Declared,
    transactions: u64,
    amount: u64,
    report: &mut VerificationReport,
) {
    match declared.nb_of_txs.as_deref().map(str::parse::<u64>) {
        None => report.record_issue(path, "NbOfTxs is missing"),
        Some(Err(_)) => report.record_issue(path, "NbOfTxs is not a number"),
        Some(Ok(n)) if n != transactions => report.record_issue(
            path,
            format!("NbOfTxs is {n}, found {transactions} transactions"),
        ),
        Some(Ok(_)) => {}
    }

    match declared.ctrl_sum.as_deref() {
        None => report.record_issue(path, "CtrlSum is missing"),
        Some(sum) => match parse_decimal(sum) {
            None => report.record_issue(path, format!("CtrlSum {sum} is not a decimal amount")),
            Some(declared_amount) if declared_amount != amount => report.record_issue(
                path,
                format!(
                    "CtrlSum is {sum}, transactions add up to {}",
                    crate::domain::money::format_minor_units(amount)
                ),
            ),
            Some(_) => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(xml: &str) -> VerificationReport {
        let mut report = VerificationReport::new("T.xml");
        StructuralSchemaCheck::new().unwrap().check(xml.as_bytes(), &mut report);
        report
    }

    fn transaction(amount: &str) -> String {
        format!(
            "<DrctDbtTxInf><PmtId><EndToEndId>E</EndToEndId></PmtId>\
             <InstdAmt Ccy=\"EUR\">{amount}</InstdAmt></DrctDbtTxInf>"
        )
    }

    fn document(group_count: u64, group_sum: &str, batch_count: u64, batch_sum: &str, txs: &[&str]) -> String {
        let body: String = txs.iter().map(|a| transaction(a)).collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Document xmlns=\"{PAIN_008_NAMESPACE}\"><CstmrDrctDbtInitn>\
             <GrpHdr><MsgId>01012025-abc</MsgId><CreDtTm>2025-01-01T10:00:00</CreDtTm>\
             <NbOfTxs>{group_count}</NbOfTxs><CtrlSum>{group_sum}</CtrlSum>\
             <InitgPty><Nm>Acme</Nm></InitgPty></GrpHdr>\
             <PmtInf><PmtInfId>PAY-ID-1-RCUR-20250101T100000</PmtInfId><PmtMtd>DD</PmtMtd>\
             <NbOfTxs>{batch_count}</NbOfTxs><CtrlSum>{batch_sum}</CtrlSum>\
             <PmtTpInf><SvcLvl><Cd>SEPA</Cd></SvcLvl><SeqTp>RCUR</SeqTp></PmtTpInf>\
             <ReqdColltnDt>2025-01-03</ReqdColltnDt>{body}</PmtInf>\
             </CstmrDrctDbtInitn></Document>"
        )
    }

    #[test]
    fn test_clean_document_has_no_issues() {
        let report = run(&document(2, "3.50", 2, "3.50", &["1.50", "2.00"]));
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert_eq!(report.batches, 1);
        assert_eq!(report.transactions, 2);
    }

    #[test]
    fn test_count_gap_is_reported_for_batch_and_group() {
        let report = run(&document(3, "5.00", 3, "5.00", &["1.50", "2.00"]));
        let reasons: Vec<&str> = report.issues.iter().map(|i| i.reason.as_str()).collect();

        assert!(reasons.contains(&"NbOfTxs is 3, found 2 transactions"));
        assert!(reasons.iter().any(|r| r.starts_with("CtrlSum is 5.00")));
        assert_eq!(report.issues.len(), 4);
        assert!(report.issues[0].path.ends_with("PmtInf[1]"));
    }

    #[test]
    fn test_wrong_namespace() {
        let xml = document(1, "1.00", 1, "1.00", &["1.00"]).replace(PAIN_008_NAMESPACE, "urn:other");
        let report = run(&xml);
        assert!(report.issues[0].reason.starts_with("namespace is urn:other"));
    }

    #[test]
    fn test_invalid_sequence_type_and_date() {
        let xml = document(1, "1.00", 1, "1.00", &["1.00"])
            .replace("<SeqTp>RCUR</SeqTp>", "<SeqTp>rcur</SeqTp>")
            .replace("2025-01-03", "03-01-2025");
        let report = run(&xml);
        let reasons: Vec<&str> = report.issues.iter().map(|i| i.reason.as_str()).collect();
        assert!(reasons.contains(&"SeqTp rcur is not a sequence type"));
        assert!(reasons.contains(&"ReqdColltnDt 03-01-2025 is not an ISO date"));
    }

    #[test]
    fn test_missing_currency() {
        let xml = document(1, "1.00", 1, "1.00", &["1.00"]).replace(" Ccy=\"EUR\"", "");
        let report = run(&xml);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].reason, "InstdAmt has no Ccy attribute");
    }

    fn full_transaction(mandate: &str, name: &str, bic: &str, iban: &str, signed: &str, ustrd: &str) -> String {
        format!(
            "<DrctDbtTxInf><PmtId><EndToEndId>E2E-1</EndToEndId></PmtId>\
             <InstdAmt Ccy=\"EUR\">1.00</InstdAmt>\
             <DrctDbtTx><MndtRltdInf><MndtId>{mandate}</MndtId><DtOfSgntr>{signed}</DtOfSgntr></MndtRltdInf></DrctDbtTx>\
             <DbtrAgt><FinInstnId><BIC>{bic}</BIC></FinInstnId></DbtrAgt>\
             <Dbtr><Nm>{name}</Nm></Dbtr>\
             <DbtrAcct><Id><IBAN>{iban}</IBAN></Id></DbtrAcct>\
             <RmtInf><Ustrd>{ustrd}</Ustrd></RmtInf></DrctDbtTxInf>"
        )
    }

    fn with_transaction(tx: &str) -> VerificationReport {
        let xml = document(1, "1.00", 1, "1.00", &["1.00"]).replace(&transaction("1.00"), tx);
        run(&xml)
    }

    fn reasons(report: &VerificationReport) -> Vec<String> {
        report.issues.iter().map(|i| i.reason.clone()).collect()
    }

    const MANDATE: &str = "MNDT-1";
    const NAME: &str = "J. Jansen";
    const BIC: &str = "COBADEFFXXX";
    const IBAN: &str = "DE89370400440532013000";
    const SIGNED: &str = "2022-09-30";
    const USTRD: &str = "Membership fee";

    #[test]
    fn test_complete_transaction_has_no_issues() {
        let report = with_transaction(&full_transaction(MANDATE, NAME, BIC, IBAN, SIGNED, USTRD));
        assert!(report.issues.is_empty(), "{:?}", report.issues);
    }

    #[test]
    fn test_mandate_id_longer_than_35() {
        let mandate = "M".repeat(60);
        let report = with_transaction(&full_transaction(&mandate, NAME, BIC, IBAN, SIGNED, USTRD));
        assert_eq!(reasons(&report), vec!["MndtId must be 1 to 35 characters, found 60"]);
        assert!(report.issues[0].path.ends_with("MndtRltdInf/MndtId"));
    }

    #[test]
    fn test_end_to_end_id_longer_than_35() {
        let tx = full_transaction(MANDATE, NAME, BIC, IBAN, SIGNED, USTRD)
            .replace("E2E-1", &"E".repeat(36));
        let report = with_transaction(&tx);
        assert_eq!(reasons(&report), vec!["EndToEndId must be 1 to 35 characters, found 36"]);
    }

    #[test]
    fn test_debtor_name_longer_than_70() {
        let name = "N".repeat(90);
        let report = with_transaction(&full_transaction(MANDATE, &name, BIC, IBAN, SIGNED, USTRD));
        assert_eq!(reasons(&report), vec!["Nm must be 1 to 70 characters, found 90"]);
    }

    #[test]
    fn test_empty_debtor_name() {
        let report = with_transaction(&full_transaction(MANDATE, "", BIC, IBAN, SIGNED, USTRD));
        assert_eq!(reasons(&report), vec!["Nm must be 1 to 70 characters, found 0"]);
    }

    #[test]
    fn test_initiating_party_name_longer_than_70() {
        let xml = document(1, "1.00", 1, "1.00", &["1.00"])
            .replace("<Nm>Acme</Nm>", &format!("<Nm>{}</Nm>", "A".repeat(71)));
        let report = run(&xml);
        assert_eq!(reasons(&report), vec!["Nm must be 1 to 70 characters, found 71"]);
        assert!(report.issues[0].path.ends_with("InitgPty/Nm"));
    }

    #[test]
    fn test_remittance_longer_than_140() {
        let ustrd = "U".repeat(200);
        let report = with_transaction(&full_transaction(MANDATE, NAME, BIC, IBAN, SIGNED, &ustrd));
        assert_eq!(reasons(&report), vec!["Ustrd must be 1 to 140 characters, found 200"]);
    }

    #[test]
    fn test_bic_pattern() {
        let report = with_transaction(&full_transaction(MANDATE, NAME, "xxCOBADEFFXXXyy", IBAN, SIGNED, USTRD));
        assert_eq!(reasons(&report), vec!["BIC xxCOBADEFFXXXyy does not match BICIdentifier"]);
    }

    #[test]
    fn test_iban_pattern() {
        let report = with_transaction(&full_transaction(MANDATE, NAME, BIC, "de89 3704", SIGNED, USTRD));
        assert_eq!(reasons(&report), vec!["IBAN de89 3704 does not match IBAN2007Identifier"]);
    }

    #[test]
    fn test_currency_pattern() {
        let xml = document(1, "1.00", 1, "1.00", &["1.00"]).replace("Ccy=\"EUR\"", "Ccy=\"eur\"");
        let report = run(&xml);
        assert_eq!(reasons(&report), vec!["Ccy eur is not a three-letter currency code"]);
    }

    #[test]
    fn test_signature_date_must_be_iso() {
        let report = with_transaction(&full_transaction(MANDATE, NAME, BIC, IBAN, "30-09-2022", USTRD));
        assert_eq!(reasons(&report), vec!["DtOfSgntr 30-09-2022 is not an ISO date"]);
    }

    #[test]
    fn test_malformed_xml_is_an_issue_not_a_panic() {
        let report = run("<Document><CstmrDrctDbtInitn></Document>");
        let last = report.issues.last().unwrap();
        assert!(last.reason.starts_with("not well-formed"));
    }

    #[test]
    fn test_wrong_root() {
        let report = run("<Other/>");
        assert!(report.issues.iter().any(|i| i.reason == "root element is not Document"));
    }
}
