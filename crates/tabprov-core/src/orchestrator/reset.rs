//! Wipe-only loop: factory-reset tablets one after another without
//! provisioning them.

use crate::bridge::{BridgeCommand, DeviceBridge};
use crate::error::{ProvisionError, Result};
use crate::operator::Operator;

use super::provision::RECOVERY_TARGET;

/// Reset up to `limit` devices (or until the operator closes input when
/// `limit` is `None`). Returns how many devices were wiped.
///
/// Whichever device adb sees is used; no serial selector is applied, and the
/// operator's confirmation gates the wipe instead of a fixed delay.
pub fn reset_loop(
    bridge: &mut dyn DeviceBridge,
    operator: &mut dyn Operator,
    limit: Option<usize>,
) -> Result<usize> {
    bridge.execute(None, &BridgeCommand::StartServer)?;

    let mut wiped = 0;
    loop {
        if limit.is_some_and(|n| wiped >= n) {
            break;
        }
        operator.say("Waiting for a device… ", false);
        bridge.execute(None, &BridgeCommand::WaitForDevice)?;
        operator.say("found!", true);

        operator.say(&format!("Rebooting to {RECOVERY_TARGET}."), true);
        bridge.execute(None, &BridgeCommand::Reboot(RECOVERY_TARGET.to_string()))?;
        operator.confirm("Press return when device is in recovery mode.")?;

        operator.say("Wiping data… ", false);
        bridge.execute(None, &BridgeCommand::WipeData)?;
        operator.say("done.", true);
        wiped += 1;
        tracing::info!(wiped, "device reset");

        if limit.is_some_and(|n| wiped >= n) {
            break;
        }
        match operator.confirm("Press return to reset next device.") {
            Ok(()) => {}
            Err(ProvisionError::OperatorAborted) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(wiped)
}
