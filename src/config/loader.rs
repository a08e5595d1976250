//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{HandoffKind, SddConfig, StoreTarget};
use crate::config::secret_string;
use crate::domain::errors::SddError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SddConfig
/// 4. Applies environment variable overrides (SDD_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is not set, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use sddgen::config::loader::load_config;
///
/// let config = load_config("sddgen.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SddConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SddError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SddError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// See [`load_config`].
pub fn parse_config(contents: &str) -> Result<SddConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SddConfig = toml::from_str(&contents)
        .map_err(|e| SddError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        SddError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SddError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        // Comments are copied verbatim
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SddError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Applies environment variable overrides using SDD_* prefix
///
/// Environment variables follow the pattern: SDD_<SECTION>_<KEY>
/// For example: SDD_OUTPUT_STORAGE_ROOT, SDD_HANDOFF_KIND
fn apply_env_overrides(config: &mut SddConfig) {
    if let Ok(val) = std::env::var("SDD_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SDD_INITIATING_PARTY_NAME") {
        config.initiating_party.name = val;
    }

    // Store overrides
    if let Ok(val) = std::env::var("SDD_STORE_TARGET") {
        match val.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => config.store.target = StoreTarget::PostgreSQL,
            "file" => config.store.target = StoreTarget::File,
            other => tracing::warn!(value = other, "Ignoring unknown SDD_STORE_TARGET"),
        }
    }
    if let Ok(val) = std::env::var("SDD_STORE_PATH") {
        config.store.path = Some(PathBuf::from(val));
    }
    if let Some(ref mut pg) = config.store.postgresql {
        if let Ok(val) = std::env::var("SDD_STORE_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Some(n) = std::env::var("SDD_STORE_POSTGRESQL_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            pg.max_connections = n;
        }
    }

    // Output overrides
    if let Ok(val) = std::env::var("SDD_OUTPUT_STORAGE_ROOT") {
        config.output.storage_root = PathBuf::from(val);
    }
    if let Some(n) = std::env::var("SDD_OUTPUT_FLUSH_EVERY")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.output.flush_every = n;
    }

    // Validation and verification overrides
    if let Some(flag) = env_flag("SDD_VALIDATION_STRICT_BIC") {
        config.validation.strict_bic = flag;
    }
    if let Some(flag) = env_flag("SDD_VALIDATION_REJECT_FUTURE_MANDATES") {
        config.validation.reject_future_mandates = flag;
    }
    if let Some(flag) = env_flag("SDD_VERIFICATION_ENABLE_SCHEMA_CHECK") {
        config.verification.enable_schema_check = flag;
    }
    if let Some(flag) = env_flag("SDD_VERIFICATION_ENFORCE_SCHEMA") {
        config.verification.enforce_schema = flag;
    }

    // Handoff overrides
    if let Ok(val) = std::env::var("SDD_HANDOFF_KIND") {
        match val.to_ascii_lowercase().as_str() {
            "outbox" => config.handoff.kind = HandoffKind::Outbox,
            "webhook" => config.handoff.kind = HandoffKind::Webhook,
            "log" => config.handoff.kind = HandoffKind::Log,
            other => tracing::warn!(value = other, "Ignoring unknown SDD_HANDOFF_KIND"),
        }
    }
    if let Ok(val) = std::env::var("SDD_HANDOFF_OUTBOX_DIR") {
        config.handoff.outbox_dir = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("SDD_HANDOFF_WEBHOOK_URL") {
        config.handoff.webhook_url = Some(val);
    }
    if let Ok(val) = std::env::var("SDD_HANDOFF_WEBHOOK_TOKEN") {
        config.handoff.webhook_token = Some(secret_string(val));
    }

    // Logging overrides
    if let Some(flag) = env_flag("SDD_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = flag;
    }
    if let Ok(val) = std::env::var("SDD_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[initiating_party]
name = "Stichting Voorbeeld"

[store]
target = "file"
path = "schedule.json"

[[banks]]
id = "main"

[banks.settings]
IBAN = "NL91ABNA0417164300"
BIC = "ABNANL2A"
CREDITOR_ID = "NL98ZZZ999999990000"
RECORDS_PER_FILE = 250
UPLOAD = true
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("SDD_TEST_LOADER_VAR", "test_value");
        let input = "token = \"${SDD_TEST_LOADER_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"\n");
        std::env::remove_var("SDD_TEST_LOADER_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("SDD_TEST_MISSING_VAR");
        let input = "token = \"${SDD_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("SDD_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        std::env::remove_var("SDD_TEST_COMMENTED_VAR");
        let input = "# token = \"${SDD_TEST_COMMENTED_VAR}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(SddError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.initiating_party.name, "Stichting Voorbeeld");
        assert_eq!(config.banks.len(), 1);
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.handoff.kind, HandoffKind::Log);
        assert!(config.verification.enable_schema_check);
    }

    #[test]
    fn test_parse_config_rejects_invalid() {
        let text = MINIMAL.replace("Stichting Voorbeeld", "");
        assert!(matches!(parse_config(&text), Err(SddError::Configuration(_))));
    }
}
