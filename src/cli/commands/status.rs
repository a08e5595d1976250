//! Status command implementation
//!
//! This module implements the `status` command for displaying a schedule's
//! aggregate totals and the per-batch totals of its last generation.

use crate::adapters::store::create_store;
use crate::config::load_config;
use crate::domain::money::format_minor_units;
use crate::domain::ScheduleId;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Schedule to show
    #[arg(short, long)]
    pub schedule: i64,

    /// Only show batches of this creditor IBAN
    #[arg(long)]
    pub iban: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(schedule_id = self.schedule, "Checking schedule status");

        println!("📊 Schedule Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2);
            }
        };

        let store = match create_store(&config.store).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to connect to store");
                println!("   Error: {}", e);
                return Ok(4);
            }
        };

        let schedule_id = ScheduleId::new(self.schedule);
        let schedule = match store.schedules().load_schedule(schedule_id).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to load schedule {}", schedule_id);
                println!("   Error: {}", e);
                return Ok(5);
            }
        };

        println!("Schedule {}:", schedule.id);
        println!("  Status: {}", schedule.status);
        println!("  Selection Date: {}", schedule.selection_date);
        println!("  Transactions: {}", schedule.transactions);
        println!("  Amount: {}", format_minor_units(schedule.amount));
        println!(
            "  First Collection: {}",
            schedule
                .first_collection_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        println!();

        let totals = match store.schedules().list_totals(schedule_id).await {
            Ok(t) => t,
            Err(e) => {
                println!("❌ Failed to load batch totals");
                println!("   Error: {}", e);
                return Ok(5);
            }
        };

        let filtered: Vec<_> = totals
            .iter()
            .filter(|t| self.iban.as_deref().map_or(true, |iban| t.creditor_iban == iban))
            .collect();

        if filtered.is_empty() {
            println!("No batches generated yet.");
            println!("Run 'sddgen generate --schedule {}' to generate files.", schedule.id);
            return Ok(0);
        }

        println!("Found {} batch(es):", filtered.len());
        println!();
        println!(
            "{:<20} {:<6} {:<36} {:>8} {:>14}  {:<45}",
            "Creditor IBAN", "Seq", "Batch ID", "Txs", "Amount", "File"
        );
        println!("{}", "-".repeat(135));

        for total in filtered {
            println!(
                "{:<20} {:<6} {:<36} {:>8} {:>14}  {:<45}",
                total.creditor_iban,
                total.sequence_type,
                total.batch_id,
                total.transactions,
                format_minor_units(total.amount),
                total.filename
            );
        }

        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::domain::Schedule;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_status_args() {
        let args = StatusArgs {
            schedule: 12,
            iban: Some("NL91ABNA0417164300".to_string()),
        };
        assert_eq!(args.schedule, 12);
        assert!(args.iban.is_some());
    }

    #[tokio::test]
    async fn test_status_of_file_store() {
        let temp = TempDir::new().unwrap();
        let store_path = temp.path().join("store.json");
        let store = MemoryStore::new();
        store
            .insert_schedule(Schedule::new(
                ScheduleId::new(12),
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            ))
            .await;
        store.save_json_file(&store_path).await.unwrap();

        let config_path = temp.path().join("sddgen.toml");
        std::fs::write(
            &config_path,
            format!(
                "[initiating_party]\nname = \"Acme\"\n\n[store]\ntarget = \"file\"\npath = \"{}\"\n\n[[banks]]\nid = \"abn\"\n",
                store_path.display()
            ),
        )
        .unwrap();

        let args = StatusArgs {
            schedule: 12,
            iban: None,
        };
        let code = args.execute(config_path.to_str().unwrap()).await.unwrap();
        assert_eq!(code, 0);

        let missing = StatusArgs {
            schedule: 99,
            iban: None,
        };
        assert_eq!(missing.execute(config_path.to_str().unwrap()).await.unwrap(), 5);
    }
}
