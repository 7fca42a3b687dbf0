use std::fmt;

// ---------------------------------------------------------------------------
// ProvisionState
// ---------------------------------------------------------------------------

/// Where a provisioning run currently is.
///
/// Transitions: `Idle → WaitingForDevice → Rebooting → WipingData →
/// AwaitingUsbDebugging → Installing → ConfiguringDevice →
/// AwaitingManualAppSetup → Recording → Done`, with any step able to end
/// in `Failed`. In a batch run `Done` loops back to `WaitingForDevice` for
/// the next tablet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionState {
    Idle,
    WaitingForDevice,
    Rebooting,
    WipingData,
    AwaitingUsbDebugging,
    Installing,
    ConfiguringDevice,
    AwaitingManualAppSetup,
    Recording,
    Done,
    Failed,
}

impl ProvisionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ProvisionState::Idle => "idle",
            ProvisionState::WaitingForDevice => "waiting_for_device",
            ProvisionState::Rebooting => "rebooting",
            ProvisionState::WipingData => "wiping_data",
            ProvisionState::AwaitingUsbDebugging => "awaiting_usb_debugging",
            ProvisionState::Installing => "installing",
            ProvisionState::ConfiguringDevice => "configuring_device",
            ProvisionState::AwaitingManualAppSetup => "awaiting_manual_app_setup",
            ProvisionState::Recording => "recording",
            ProvisionState::Done => "done",
            ProvisionState::Failed => "failed",
        }
    }
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeviceSession
// ---------------------------------------------------------------------------

/// The tablet being worked on and the serial adb should address it by.
///
/// A wipe resets the tablet to a factory debug identity, so for the window
/// around the wipe command the selector points at the placeholder serial
/// instead of the real one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSession {
    serial: String,
    selector: String,
}

impl DeviceSession {
    pub fn new(serial: impl Into<String>) -> Self {
        let serial = serial.into();
        Self {
            selector: serial.clone(),
            serial,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn select_placeholder(&mut self, placeholder: &str) {
        self.selector = placeholder.to_string();
    }

    pub fn restore(&mut self) {
        self.selector = self.serial.clone();
    }
}
