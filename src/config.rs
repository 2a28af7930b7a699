use crate::error::{ErrorContext, IntakeError};
use crate::intake::{ERROR_RESET, SUCCESS_RESET};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_NAME: &str = ".cnc-intake";

/// Runtime settings for an intake session.
///
/// Validation rules (allowed formats, size ceiling) are fixed and live in
/// [`crate::intake`]; only timing and plumbing are configurable here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntakeConfig {
    #[serde(rename = "successResetMs")]
    pub success_reset_ms: u64,
    #[serde(rename = "errorResetMs")]
    pub error_reset_ms: u64,
    #[serde(rename = "eventBusCapacity")]
    pub event_bus_capacity: usize,
    #[serde(rename = "simulatedTransportDelayMs")]
    pub simulated_transport_delay_ms: u64,
    #[serde(rename = "logLevel")]
    pub log_level: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            success_reset_ms: SUCCESS_RESET.as_millis() as u64,
            error_reset_ms: ERROR_RESET.as_millis() as u64,
            event_bus_capacity: 100,
            simulated_transport_delay_ms: 1_500,
            log_level: "info".to_string(),
        }
    }
}

impl IntakeConfig {
    pub fn success_reset(&self) -> Duration {
        Duration::from_millis(self.success_reset_ms)
    }

    pub fn error_reset(&self) -> Duration {
        Duration::from_millis(self.error_reset_ms)
    }

    pub fn simulated_transport_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_transport_delay_ms)
    }

    /// Reject settings that would break the session's invariants
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.success_reset_ms == 0 || self.error_reset_ms == 0 {
            return Err(IntakeError::Config(
                "status reset delays must be greater than zero".to_string(),
            ));
        }
        if self.event_bus_capacity == 0 {
            return Err(IntakeError::Config(
                "eventBusCapacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn get_config_dir() -> Result<PathBuf, IntakeError> {
    dirs::home_dir()
        .map(|home_dir| home_dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| IntakeError::Config("Could not find home directory".to_string()))
}

pub fn get_config_file_path() -> Result<PathBuf, IntakeError> {
    Ok(get_config_dir()?.join("config.json"))
}

pub fn get_logs_dir() -> Result<PathBuf, IntakeError> {
    Ok(get_config_dir()?.join("logs"))
}

/// Create a directory owned by the current user only (700 on Unix)
fn ensure_private_dir(dir: &Path) -> Result<(), IntakeError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut permissions = fs::metadata(dir)?.permissions();
            permissions.set_mode(0o700);
            fs::set_permissions(dir, permissions)?;
        }
    }
    Ok(())
}

pub fn ensure_config_dir() -> Result<(), IntakeError> {
    ensure_private_dir(&get_config_dir()?)
}

pub fn ensure_logs_dir() -> Result<(), IntakeError> {
    ensure_private_dir(&get_logs_dir()?)
}

pub fn load_config() -> Result<IntakeConfig, IntakeError> {
    ensure_config_dir()?;
    load_config_from(&get_config_file_path()?)
}

pub fn load_config_from(path: &Path) -> Result<IntakeConfig, IntakeError> {
    if !path.exists() {
        return Ok(IntakeConfig::default());
    }

    let content = fs::read_to_string(path).context("Failed to read config file")?;
    let config: IntakeConfig =
        serde_json::from_str(&content).context("Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &IntakeConfig) -> Result<(), IntakeError> {
    ensure_config_dir()?;
    save_config_to(config, &get_config_file_path()?)
}

pub fn save_config_to(config: &IntakeConfig, path: &Path) -> Result<(), IntakeError> {
    config.validate()?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;

    // Set permissions to 600 (read/write for owner only) on Unix systems
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_mode(0o600);
        fs::set_permissions(path, permissions)?;
    }

    Ok(())
}
