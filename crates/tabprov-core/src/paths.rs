use crate::error::{ProvisionError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// On-device paths
// ---------------------------------------------------------------------------

pub const REMOTE_WIFI: &str = "/sdcard/wifi";
pub const REMOTE_TLA: &str = "/sdcard/tla";
pub const REMOTE_PART_CODE: &str = "/sdcard/part_code";

// ---------------------------------------------------------------------------
// Local files
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "tabprov.yaml";
pub const WIFI_CREDENTIALS_FILE: &str = "wifi.yaml";
pub const RECORD_PREFIX: &str = "tablet-";

/// `<output_dir>/tablet-<TEAM>.yaml`, team code uppercased.
pub fn record_path(output_dir: &Path, team: &str) -> PathBuf {
    output_dir.join(format!("{RECORD_PREFIX}{}.yaml", team.to_uppercase()))
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Code validation
// ---------------------------------------------------------------------------

static CODE_RE: OnceLock<Regex> = OnceLock::new();

fn code_re() -> &'static Regex {
    CODE_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\-]+$").unwrap())
}

/// The serial becomes `ANDROID_SERIAL` and the record's `serial_number`.
pub fn validate_serial(serial: &str) -> Result<()> {
    if serial.is_empty() || serial.chars().any(char::is_whitespace) {
        return Err(ProvisionError::InvalidSerial(serial.to_string()));
    }
    Ok(())
}

/// Team codes end up in record file names; keep them to a safe alphabet.
pub fn validate_team_code(code: &str) -> Result<()> {
    if code.len() > 32 || !code_re().is_match(code) {
        return Err(ProvisionError::InvalidTeamCode(code.to_string()));
    }
    Ok(())
}

pub fn validate_part_code(code: &str) -> Result<()> {
    if code.len() > 64 || !code_re().is_match(code) {
        return Err(ProvisionError::InvalidPartCode(code.to_string()));
    }
    Ok(())
}
