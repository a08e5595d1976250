//! Bank settings providers
//!
//! A creditor profile is assembled from named per-bank settings. The shipped
//! provider reads them from the `[[banks]]` tables of the configuration file.

use crate::config::BankConfig;
use crate::domain::{BankId, CreditorProfile, Result, SddError, SettingKey};

/// Source of per-bank named settings
pub trait SettingsProvider: Send + Sync {
    /// Raw value of one setting, `None` when the bank does not set it
    fn setting(&self, bank: &BankId, key: SettingKey) -> Option<String>;

    /// All configured banks, in configuration order
    fn banks(&self) -> Vec<BankId>;

    /// Whether a bank is configured
    fn has_bank(&self, bank: &BankId) -> bool {
        self.banks().contains(bank)
    }

    /// Assembles the creditor profile of one bank
    ///
    /// # Errors
    ///
    /// Returns [`SddError::Configuration`] if the bank is unknown or a
    /// required setting is missing or malformed.
    fn creditor_profile(&self, bank: &BankId, creditor_name: &str) -> Result<CreditorProfile> {
        if !self.has_bank(bank) {
            return Err(SddError::Configuration(format!("Unknown bank '{bank}'")));
        }
        CreditorProfile::from_settings(creditor_name, |key| self.setting(bank, key)).map_err(
            |e| match e {
                SddError::Configuration(msg) => {
                    SddError::Configuration(format!("bank '{bank}': {msg}"))
                }
                other => other,
            },
        )
    }
}

/// Settings read from the configuration file
#[derive(Debug, Clone)]
pub struct ConfigSettings {
    banks: Vec<BankConfig>,
}

impl ConfigSettings {
    pub fn new(banks: Vec<BankConfig>) -> Self {
        Self { banks }
    }
}

impl SettingsProvider for ConfigSettings {
    fn setting(&self, bank: &BankId, key: SettingKey) -> Option<String> {
        self.banks
            .iter()
            .find(|b| b.id == bank.as_str())
            .and_then(|b| b.setting(key))
    }

    fn banks(&self) -> Vec<BankId> {
        self.banks
            .iter()
            .filter_map(|b| BankId::new(b.id.clone()).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingValue;
    use std::collections::BTreeMap;

    fn provider() -> ConfigSettings {
        let mut settings = BTreeMap::new();
        for (k, v) in [
            ("IBAN", "NL91ABNA0417164300"),
            ("BIC", "ABNANL2A"),
            ("CREDITOR_ID", "NL98ZZZ999999990000"),
        ] {
            settings.insert(k.to_string(), SettingValue::Text(v.to_string()));
        }
        settings.insert("RECORDS_PER_FILE".to_string(), SettingValue::Integer(250));
        settings.insert("RECORDS_PER_SEQUENCE_TYPE".to_string(), SettingValue::Integer(100));
        settings.insert("UPLOAD".to_string(), SettingValue::Flag(true));

        ConfigSettings::new(vec![
            BankConfig {
                id: "abn".to_string(),
                settings,
            },
            BankConfig {
                id: "empty".to_string(),
                settings: BTreeMap::new(),
            },
        ])
    }

    #[test]
    fn test_banks_in_order() {
        let ids: Vec<String> = provider().banks().iter().map(ToString::to_string).collect();
        assert_eq!(ids, vec!["abn", "empty"]);
    }

    #[test]
    fn test_creditor_profile_from_settings() {
        let bank = BankId::new("abn").unwrap();
        let profile = provider().creditor_profile(&bank, "Stichting").unwrap();
        assert_eq!(profile.name, "Stichting");
        assert_eq!(profile.iban, "NL91ABNA0417164300");
        assert_eq!(profile.currency, "EUR");
        assert_eq!(profile.records_per_file, 250);
        assert_eq!(profile.records_per_sequence_type, 100);
        assert!(profile.upload);
    }

    #[test]
    fn test_missing_required_setting_names_bank() {
        let bank = BankId::new("empty").unwrap();
        let err = provider().creditor_profile(&bank, "Stichting").unwrap_err();
        assert!(err.to_string().contains("bank 'empty'"));
        assert!(err.to_string().contains("IBAN"));
    }

    #[test]
    fn test_unknown_bank() {
        let bank = BankId::new("ing").unwrap();
        assert!(matches!(
            provider().creditor_profile(&bank, "Stichting"),
            Err(SddError::Configuration(_))
        ));
    }
}
