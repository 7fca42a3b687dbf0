use crate::error::Result;
use crate::io::atomic_write;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the organisers keep about each provisioned tablet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningRecord {
    pub serial_number: String,
    pub mac_address: String,
    pub part_code: String,
}

impl ProvisioningRecord {
    /// Write `tablet-<TEAM>.yaml` into `output_dir` and return its path.
    pub fn save(&self, output_dir: &Path, team: &str) -> Result<PathBuf> {
        let path = paths::record_path(output_dir, team);
        let data = serde_yaml::to_string(self)?;
        atomic_write(&path, data.as_bytes())?;
        Ok(path)
    }
}
