//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use sddgen::adapters::store::MemoryStore;
use sddgen::domain::{CreditorProfile, Instruction, Schedule, ScheduleId};
use std::path::Path;

pub const CREDITOR_IBAN: &str = "NL91ABNA0417164300";

pub fn profile(per_file: u64, per_sequence: u64) -> CreditorProfile {
    CreditorProfile {
        name: "Acme Sports Club".into(),
        iban: CREDITOR_IBAN.into(),
        bic: "ABNANL2A".into(),
        creditor_id: "NL98ZZZ999999990000".into(),
        currency: "EUR".into(),
        records_per_file: per_file,
        records_per_sequence_type: per_sequence,
        upload: true,
    }
}

pub fn schedule() -> Schedule {
    Schedule::new(ScheduleId::new(1), NaiveDate::from_ymd_opt(2025, 4, 3).unwrap())
}

pub fn instruction(id: i64, sequence_type: &str, amount: &str) -> Instruction {
    Instruction::builder()
        .id(id)
        .schedule_id(ScheduleId::new(1))
        .account_holder_name(format!("Member {id}"))
        .iban("DE89370400440532013000")
        .bic("COBADEFFXXX")
        .amount(amount)
        .mandate_id(format!("MNDT-{id}"))
        .mandate_signed_on("2022-09-30")
        .due_date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap())
        .sequence_type(sequence_type)
        .end_to_end_id(format!("E2E-{id}"))
        .remittance_info("Membership fee")
        .destination_iban(CREDITOR_IBAN)
        .build()
        .unwrap()
}

/// Store holding the schedule and `count` RCUR instructions of 12.50
pub async fn seeded_store(count: i64) -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_schedule(schedule()).await;
    for id in 1..=count {
        store.insert_instruction(instruction(id, "RCUR", "1250")).await;
    }
    store
}

/// Names of the files in a directory, sorted
pub fn files_in(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Number of occurrences of `needle` in `haystack`
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
