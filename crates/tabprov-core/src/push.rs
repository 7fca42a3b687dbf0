//! Staging small text files and pushing them to the tablet.

use std::io::Write;
use std::path::Path;

use crate::bridge::{BridgeCommand, DeviceBridge};
use crate::error::Result;
use crate::paths;

/// The configuration files the tablet app reads at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFile {
    Wifi,
    Tla,
    PartCode,
}

impl DeviceFile {
    pub fn name(self) -> &'static str {
        match self {
            DeviceFile::Wifi => "wifi",
            DeviceFile::Tla => "tla",
            DeviceFile::PartCode => "part_code",
        }
    }

    pub fn remote_path(self) -> &'static str {
        match self {
            DeviceFile::Wifi => paths::REMOTE_WIFI,
            DeviceFile::Tla => paths::REMOTE_TLA,
            DeviceFile::PartCode => paths::REMOTE_PART_CODE,
        }
    }
}

/// Write `content` to a scratch file under `scratch_dir`, push it to `remote`,
/// then delete the scratch file.
///
/// The scratch file is removed whether or not the push succeeded; a failed
/// push is still returned as an error.
pub fn write_and_push(
    bridge: &mut dyn DeviceBridge,
    selector: Option<&str>,
    scratch_dir: &Path,
    name: &str,
    content: &str,
    remote: &str,
) -> Result<()> {
    std::fs::create_dir_all(scratch_dir)?;
    let mut scratch = tempfile::Builder::new()
        .prefix(&format!("{name}."))
        .tempfile_in(scratch_dir)?;
    scratch.write_all(content.as_bytes())?;
    scratch.flush()?;

    let pushed = bridge.execute(
        selector,
        &BridgeCommand::Push {
            local: scratch.path().to_path_buf(),
            remote: remote.to_string(),
        },
    );
    let removed = scratch.close();

    pushed?;
    removed?;
    Ok(())
}

/// Push one of the well-known device files.
pub fn push_device_file(
    bridge: &mut dyn DeviceBridge,
    selector: Option<&str>,
    scratch_dir: &Path,
    file: DeviceFile,
    content: &str,
) -> Result<()> {
    write_and_push(
        bridge,
        selector,
        scratch_dir,
        file.name(),
        content,
        file.remote_path(),
    )
}
