//! The device bridge seam.
//!
//! Every interaction with a tablet goes through [`DeviceBridge::execute`],
//! which runs one [`BridgeCommand`] against the device addressed by an
//! optional selector (the serial number adb knows the device by). The
//! production implementation is [`Adb`]; tests substitute a recorder.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ProvisionError, Result};

/// Environment variable adb reads to pick a device when several are attached.
pub const SERIAL_ENV: &str = "ANDROID_SERIAL";

/// On-device file that holds the wireless interface's MAC address.
pub const MAC_ADDRESS_PATH: &str = "/sys/class/net/wlan0/address";

// ---------------------------------------------------------------------------
// BridgeCommand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    StartServer,
    WaitForDevice,
    Reboot(String),
    WipeData,
    Install { apk: PathBuf, reinstall: bool },
    Push { local: PathBuf, remote: String },
    ReadMacAddress,
}

impl BridgeCommand {
    /// The argument vector passed to the bridge binary.
    pub fn args(&self) -> Vec<String> {
        match self {
            BridgeCommand::StartServer => vec!["start-server".into()],
            BridgeCommand::WaitForDevice => vec!["wait-for-device".into()],
            BridgeCommand::Reboot(target) => vec!["reboot".into(), target.clone()],
            BridgeCommand::WipeData => {
                vec!["shell".into(), "recovery".into(), "--wipe_data".into()]
            }
            BridgeCommand::Install { apk, reinstall } => {
                let mut args = vec!["install".to_string()];
                if *reinstall {
                    args.push("-r".into());
                }
                args.push(apk.to_string_lossy().into_owned());
                args
            }
            BridgeCommand::Push { local, remote } => vec![
                "push".into(),
                local.to_string_lossy().into_owned(),
                remote.clone(),
            ],
            BridgeCommand::ReadMacAddress => {
                vec!["shell".into(), "cat".into(), MAC_ADDRESS_PATH.into()]
            }
        }
    }

    /// Short name used in logs and recorded in test doubles.
    pub fn verb(&self) -> &'static str {
        match self {
            BridgeCommand::StartServer => "start-server",
            BridgeCommand::WaitForDevice => "wait-for-device",
            BridgeCommand::Reboot(_) => "reboot",
            BridgeCommand::WipeData => "wipe-data",
            BridgeCommand::Install { .. } => "install",
            BridgeCommand::Push { .. } => "push",
            BridgeCommand::ReadMacAddress => "read-mac-address",
        }
    }
}

impl fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adb {}", self.args().join(" "))
    }
}

// ---------------------------------------------------------------------------
// DeviceBridge
// ---------------------------------------------------------------------------

pub trait DeviceBridge {
    /// Run `cmd` against the device named by `selector` (or whichever device
    /// adb picks when `None`). Returns captured stdout when the command exits
    /// zero; any other exit is an error.
    fn execute(&mut self, selector: Option<&str>, cmd: &BridgeCommand) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Adb
// ---------------------------------------------------------------------------

/// Runs the real `adb` binary as a blocking subprocess.
#[derive(Debug, Clone)]
pub struct Adb {
    program: PathBuf,
}

impl Adb {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate `adb` on `PATH`.
    pub fn locate() -> Result<Self> {
        which::which("adb")
            .map(Self::new)
            .map_err(|_| ProvisionError::BridgeNotInstalled)
    }

    /// Use `explicit` if given, otherwise search `PATH`.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(p) => Ok(Self::new(p)),
            None => Self::locate(),
        }
    }
}

impl DeviceBridge for Adb {
    fn execute(&mut self, selector: Option<&str>, cmd: &BridgeCommand) -> Result<String> {
        let mut command = Command::new(&self.program);
        command.args(cmd.args());
        // The selector only ever reaches the child's environment.
        match selector {
            Some(serial) => command.env(SERIAL_ENV, serial),
            None => command.env_remove(SERIAL_ENV),
        };

        tracing::debug!(serial = selector.unwrap_or("-"), "running {cmd}");

        let output = command.output().map_err(|e| ProvisionError::BridgeSpawn {
            command: cmd.to_string(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProvisionError::CommandFailed {
                command: cmd.to_string(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_vectors_match_adb_syntax() {
        assert_eq!(BridgeCommand::StartServer.args(), ["start-server"]);
        assert_eq!(BridgeCommand::WaitForDevice.args(), ["wait-for-device"]);
        assert_eq!(
            BridgeCommand::Reboot("recovery".into()).args(),
            ["reboot", "recovery"]
        );
        assert_eq!(
            BridgeCommand::WipeData.args(),
            ["shell", "recovery", "--wipe_data"]
        );
        assert_eq!(
            BridgeCommand::ReadMacAddress.args(),
            ["shell", "cat", "/sys/class/net/wlan0/address"]
        );
        assert_eq!(
            BridgeCommand::Push {
                local: PathBuf::from("wifi"),
                remote: "/sdcard/wifi".into()
            }
            .args(),
            ["push", "wifi", "/sdcard/wifi"]
        );
    }

    #[test]
    fn install_adds_reinstall_flag_only_when_requested() {
        let apk = PathBuf::from("chromium.apk");
        let with = BridgeCommand::Install {
            apk: apk.clone(),
            reinstall: true,
        };
        let without = BridgeCommand::Install {
            apk,
            reinstall: false,
        };
        assert_eq!(with.args(), ["install", "-r", "chromium.apk"]);
        assert_eq!(without.args(), ["install", "chromium.apk"]);
    }

    #[test]
    fn display_reads_like_a_shell_command() {
        assert_eq!(
            BridgeCommand::Reboot("recovery".into()).to_string(),
            "adb reboot recovery"
        );
    }

    #[test]
    fn spawn_failure_is_reported() {
        let mut adb = Adb::new("/nonexistent/definitely-not-adb");
        let err = adb
            .execute(None, &BridgeCommand::StartServer)
            .unwrap_err();
        assert!(matches!(err, ProvisionError::BridgeSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_command_failure() {
        let mut adb = Adb::new("false");
        let err = adb
            .execute(Some("ABC123"), &BridgeCommand::WaitForDevice)
            .unwrap_err();
        assert!(matches!(err, ProvisionError::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn selector_is_passed_to_the_child_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("adb");
        std::fs::write(&script, "#!/bin/sh\necho \"$ANDROID_SERIAL $*\"\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut adb = Adb::new(&script);
        let out = adb
            .execute(Some("XYZ789"), &BridgeCommand::Reboot("recovery".into()))
            .unwrap();
        assert_eq!(out.trim(), "XYZ789 reboot recovery");
        assert_ne!(std::env::var(SERIAL_ENV).ok().as_deref(), Some("XYZ789"));
    }
}
