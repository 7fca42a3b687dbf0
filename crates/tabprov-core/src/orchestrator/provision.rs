//! The full wipe-and-provision run, for one tablet or a bench session of
//! several.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::assets;
use crate::bridge::{BridgeCommand, DeviceBridge};
use crate::config::ProvisionConfig;
use crate::credentials::{WifiCredentials, WifiPasswords};
use crate::error::{ProvisionError, Result};
use crate::operator::Operator;
use crate::paths;
use crate::push::{push_device_file, DeviceFile};
use crate::record::ProvisioningRecord;

use super::state::{DeviceSession, ProvisionState};

pub const RECOVERY_TARGET: &str = "recovery";

const NEXT_TABLET_PROMPT: &str =
    "Next tablet as '<serial> <team> <part>' (blank line to finish):";

// ---------------------------------------------------------------------------
// ProvisionRequest
// ---------------------------------------------------------------------------

/// Everything needed to provision one tablet, checked before any device
/// interaction happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub serial_number: String,
    pub team_code: String,
    pub part_code: String,
    pub wifi: WifiCredentials,
}

impl ProvisionRequest {
    pub fn new(
        serial_number: &str,
        team_code: &str,
        part_code: &str,
        passwords: &WifiPasswords,
    ) -> Result<Self> {
        paths::validate_serial(serial_number)?;
        paths::validate_team_code(team_code)?;
        paths::validate_part_code(part_code)?;
        let wifi = WifiCredentials::for_team(passwords, team_code)?;
        Ok(Self {
            serial_number: serial_number.to_string(),
            team_code: team_code.to_string(),
            part_code: part_code.to_string(),
            wifi,
        })
    }

    /// Parse an operator-typed `serial team part` line.
    pub fn parse_line(line: &str, passwords: &WifiPasswords) -> Result<Self> {
        match line.split_whitespace().collect::<Vec<_>>()[..] {
            [serial, team, part] => Self::new(serial, team, part, passwords),
            _ => Err(ProvisionError::InvalidRequestLine(line.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    pub record: Option<ProvisioningRecord>,
    pub record_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Sleeper
// ---------------------------------------------------------------------------

/// How the fixed settle delays are waited out.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

// ---------------------------------------------------------------------------
// Provisioner
// ---------------------------------------------------------------------------

pub struct Provisioner<'a> {
    bridge: &'a mut dyn DeviceBridge,
    operator: &'a mut dyn Operator,
    config: &'a ProvisionConfig,
    sleeper: Box<dyn Sleeper>,
    state: ProvisionState,
    history: Vec<ProvisionState>,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        bridge: &'a mut dyn DeviceBridge,
        operator: &'a mut dyn Operator,
        config: &'a ProvisionConfig,
    ) -> Self {
        Self {
            bridge,
            operator,
            config,
            sleeper: Box::new(ThreadSleeper),
            state: ProvisionState::Idle,
            history: vec![ProvisionState::Idle],
        }
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn state(&self) -> ProvisionState {
        self.state
    }

    /// Every state the run has passed through, in order.
    pub fn history(&self) -> &[ProvisionState] {
        &self.history
    }

    /// Run the whole workflow for one tablet. Any failing step leaves the
    /// provisioner in `Failed` and returns the error; nothing is retried.
    pub fn run(&mut self, request: &ProvisionRequest) -> Result<ProvisionOutcome> {
        let result = self.preflight().and_then(|()| self.provision(request));
        self.finish(result)
    }

    /// Provision `first`, then keep asking the operator for the next tablet
    /// until they enter a blank line or close input. Asset preparation and
    /// the adb server start happen once for the whole session. A line that
    /// does not parse, or names a team without a password, is re-asked
    /// without touching the device; a failing device ends the session.
    pub fn run_batch(
        &mut self,
        first: &ProvisionRequest,
        passwords: &WifiPasswords,
    ) -> Result<Vec<ProvisionOutcome>> {
        let mut outcomes = vec![self.run(first)?];
        while let Some(request) = self.next_request(passwords)? {
            let result = self.provision(&request);
            outcomes.push(self.finish(result)?);
        }
        tracing::info!(devices = outcomes.len(), "provisioning session finished");
        Ok(outcomes)
    }

    fn next_request(&mut self, passwords: &WifiPasswords) -> Result<Option<ProvisionRequest>> {
        loop {
            let line = match self.operator.ask(NEXT_TABLET_PROMPT)? {
                Some(line) if !line.is_empty() => line,
                _ => return Ok(None),
            };
            match ProvisionRequest::parse_line(&line, passwords) {
                Ok(request) => return Ok(Some(request)),
                Err(e) => self.operator.say(&format!("{e}; try again."), true),
            }
        }
    }

    fn finish(&mut self, result: Result<ProvisionOutcome>) -> Result<ProvisionOutcome> {
        match result {
            Ok(outcome) => {
                self.advance(ProvisionState::Done);
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!(state = %self.state, "provisioning failed: {e}");
                self.advance(ProvisionState::Failed);
                Err(e)
            }
        }
    }

    fn provision(&mut self, request: &ProvisionRequest) -> Result<ProvisionOutcome> {
        let config = self.config;
        let mut session = DeviceSession::new(&request.serial_number);

        self.advance(ProvisionState::WaitingForDevice);
        self.wait_for_device(&session)?;

        self.advance(ProvisionState::Rebooting);
        self.operator
            .say(&format!("Rebooting to {RECOVERY_TARGET}."), true);
        self.exec(
            Some(session.selector()),
            &BridgeCommand::Reboot(RECOVERY_TARGET.to_string()),
        )?;
        self.settle("recovery mode", config.timings.recovery_settle());
        if config.confirm_recovery {
            self.operator
                .confirm("Press return when device is in recovery mode.")?;
        }

        self.advance(ProvisionState::WipingData);
        self.wipe(&mut session)?;

        self.advance(ProvisionState::AwaitingUsbDebugging);
        self.settle("wiped device", config.timings.post_wipe_settle());
        self.operator
            .say("!!! Now re-enable USB debugging on the tablet. !!!", true);
        self.wait_for_device(&session)?;

        self.advance(ProvisionState::Installing);
        self.install(&session, &config.browser.apk)?;
        self.install(&session, &config.app_apk)?;

        self.advance(ProvisionState::ConfiguringDevice);
        self.push(&session, DeviceFile::Wifi, &request.wifi.render())?;
        self.push(&session, DeviceFile::Tla, &format!("{}\n", request.team_code))?;
        self.push(
            &session,
            DeviceFile::PartCode,
            &format!("{}\n", request.part_code),
        )?;

        self.advance(ProvisionState::AwaitingManualAppSetup);
        self.operator
            .say("!!! Now install the competition app to the home screen. !!!", true);
        self.operator.say("!!! Now run the competition app. !!!", true);
        self.operator.confirm("Press return when done.")?;

        self.advance(ProvisionState::Recording);
        if !config.write_record {
            return Ok(ProvisionOutcome {
                record: None,
                record_path: None,
            });
        }
        let (record, path) = self.record(&session, request)?;
        Ok(ProvisionOutcome {
            record: Some(record),
            record_path: Some(path),
        })
    }

    /// Local checks and asset preparation; nothing here touches the tablet.
    fn preflight(&mut self) -> Result<()> {
        assets::prepare_browser(&self.config.browser, self.operator)?;
        if !self.config.app_apk.exists() {
            return Err(ProvisionError::AssetMissing(self.config.app_apk.clone()));
        }
        self.exec(None, &BridgeCommand::StartServer)?;
        Ok(())
    }

    fn wait_for_device(&mut self, session: &DeviceSession) -> Result<()> {
        self.operator.say("Waiting for a device… ", false);
        self.exec(Some(session.selector()), &BridgeCommand::WaitForDevice)?;
        self.operator.say("found!", true);
        Ok(())
    }

    /// Send the wipe while addressing the tablet by its recovery identity,
    /// then point the session back at the real serial whatever the outcome.
    fn wipe(&mut self, session: &mut DeviceSession) -> Result<()> {
        self.operator.say("Wiping data… ", false);
        session.select_placeholder(&self.config.placeholder_serial);
        let wiped = self.exec(Some(session.selector()), &BridgeCommand::WipeData);
        session.restore();
        wiped?;
        self.operator.say("done.", true);
        Ok(())
    }

    fn install(&mut self, session: &DeviceSession, apk: &Path) -> Result<()> {
        self.operator
            .say(&format!("Installing '{}'… ", apk.display()), false);
        self.exec(
            Some(session.selector()),
            &BridgeCommand::Install {
                apk: apk.to_path_buf(),
                reinstall: self.config.reinstall,
            },
        )?;
        self.operator.say("done.", true);
        Ok(())
    }

    fn push(&mut self, session: &DeviceSession, file: DeviceFile, content: &str) -> Result<()> {
        self.operator
            .say(&format!("Pushing '{}' to the tablet… ", file.name()), false);
        push_device_file(
            self.bridge,
            Some(session.selector()),
            &self.config.scratch_dir,
            file,
            content,
        )?;
        self.operator.say("done.", true);
        Ok(())
    }

    fn record(
        &mut self,
        session: &DeviceSession,
        request: &ProvisionRequest,
    ) -> Result<(ProvisioningRecord, PathBuf)> {
        self.operator
            .say("Saving information about the tablet… ", false);
        let mac = self.exec(Some(session.selector()), &BridgeCommand::ReadMacAddress)?;
        let record = ProvisioningRecord {
            serial_number: session.serial().to_string(),
            mac_address: mac.trim().to_string(),
            part_code: request.part_code.clone(),
        };
        let path = record.save(&self.config.output_dir, &request.team_code)?;
        self.operator.say("done.", true);
        tracing::info!(path = %path.display(), "provisioning record written");
        Ok((record, path))
    }

    fn exec(&mut self, selector: Option<&str>, cmd: &BridgeCommand) -> Result<String> {
        self.bridge.execute(selector, cmd)
    }

    fn settle(&mut self, what: &str, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        tracing::info!(secs = delay.as_secs(), "waiting for {what}");
        self.sleeper.sleep(delay);
    }

    fn advance(&mut self, next: ProvisionState) {
        tracing::info!(from = %self.state, to = %next, "state transition");
        self.state = next;
        self.history.push(next);
    }
}
