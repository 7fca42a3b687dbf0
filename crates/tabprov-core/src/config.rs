use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

/// Fixed waits around the recovery reboot. Recovery mode does not answer
/// straight after `reboot recovery`, and the wiped device needs a moment
/// before it reappears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default = "default_recovery_settle")]
    pub recovery_settle_secs: u64,
    #[serde(default = "default_post_wipe_settle")]
    pub post_wipe_settle_secs: u64,
}

fn default_recovery_settle() -> u64 {
    80
}

fn default_post_wipe_settle() -> u64 {
    10
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            recovery_settle_secs: default_recovery_settle(),
            post_wipe_settle_secs: default_post_wipe_settle(),
        }
    }
}

impl Timings {
    /// No waiting at all; for tests and for benches where the operator
    /// confirms recovery mode by hand.
    pub fn zero() -> Self {
        Self {
            recovery_settle_secs: 0,
            post_wipe_settle_secs: 0,
        }
    }

    pub fn recovery_settle(&self) -> Duration {
        Duration::from_secs(self.recovery_settle_secs)
    }

    pub fn post_wipe_settle(&self) -> Duration {
        Duration::from_secs(self.post_wipe_settle_secs)
    }
}

// ---------------------------------------------------------------------------
// BrowserConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_browser_url")]
    pub url: String,
    /// Where the downloaded package is kept between runs.
    #[serde(default = "default_browser_archive")]
    pub archive: PathBuf,
    /// Entry inside the package that holds the APK.
    #[serde(default = "default_browser_entry")]
    pub entry: String,
    #[serde(default = "default_browser_apk")]
    pub apk: PathBuf,
}

fn default_browser_url() -> String {
    "https://storage.googleapis.com/chromium-browser-continuous/Android/296734/chrome-android.zip"
        .to_string()
}

fn default_browser_archive() -> PathBuf {
    PathBuf::from("chromium.zip")
}

fn default_browser_entry() -> String {
    "chrome-android/apks/ChromeShell.apk".to_string()
}

fn default_browser_apk() -> PathBuf {
    PathBuf::from("chromium.apk")
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            url: default_browser_url(),
            archive: default_browser_archive(),
            entry: default_browser_entry(),
            apk: default_browser_apk(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProvisionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Explicit path to the adb binary; otherwise found on PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adb_path: Option<PathBuf>,
    /// Pass `-r` to `adb install`.
    #[serde(default = "default_true")]
    pub reinstall: bool,
    #[serde(default)]
    pub timings: Timings,
    /// Ask the operator to confirm recovery mode before wiping.
    #[serde(default)]
    pub confirm_recovery: bool,
    /// Serial the tablets report while in recovery.
    #[serde(default = "default_placeholder_serial")]
    pub placeholder_serial: String,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default = "default_app_apk")]
    pub app_apk: PathBuf,
    /// Collect the MAC address and write `tablet-<TEAM>.yaml`.
    #[serde(default = "default_true")]
    pub write_record: bool,
    #[serde(default = "default_dot")]
    pub output_dir: PathBuf,
    /// Where short-lived files staged for `adb push` are created.
    #[serde(default = "default_dot")]
    pub scratch_dir: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_placeholder_serial() -> String {
    "0123456789ABCDEF".to_string()
}

fn default_app_apk() -> PathBuf {
    PathBuf::from("../app/app/build/outputs/apk/app-debug.apk")
}

fn default_dot() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            adb_path: None,
            reinstall: true,
            timings: Timings::default(),
            confirm_recovery: false,
            placeholder_serial: default_placeholder_serial(),
            browser: BrowserConfig::default(),
            app_apk: default_app_apk(),
            write_record: true,
            output_dir: default_dot(),
            scratch_dir: default_dot(),
        }
    }
}

impl ProvisionConfig {
    /// Load `path`, or the defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    /// Load `tabprov.yaml` from `dir`, falling back to defaults.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load(&paths::config_path(dir))
    }

    /// Check the config for combinations that make a run unsafe or useless.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.timings.recovery_settle_secs == 0 && !self.confirm_recovery {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "recovery_settle_secs is 0 and confirm_recovery is off: \
                          the wipe may be sent before recovery mode is up"
                    .to_string(),
            });
        }
        if self.placeholder_serial.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "placeholder_serial must not be empty".to_string(),
            });
        }
        if self.browser.entry.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "browser.entry must name an archive entry".to_string(),
            });
        }
        warnings
    }
}
