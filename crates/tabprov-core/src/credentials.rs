use crate::error::{ProvisionError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Prefix of every competition network name.
pub const SSID_PREFIX: &str = "robot-";

/// Team code → WiFi password, as kept in `wifi.yaml`.
pub type WifiPasswords = BTreeMap<String, String>;

pub fn load_wifi_passwords(path: &Path) -> Result<WifiPasswords> {
    if !path.exists() {
        return Err(ProvisionError::AssetMissing(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    let map: BTreeMap<String, serde_yaml::Value> = serde_yaml::from_str(&data)?;
    // Passwords that look numeric parse as YAML numbers; keep their text.
    Ok(map
        .into_iter()
        .filter_map(|(team, v)| scalar_to_string(v).map(|pw| (team, pw)))
        .collect())
}

fn scalar_to_string(v: serde_yaml::Value) -> Option<String> {
    match v {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The SSID a team's robot broadcasts.
pub fn ssid_for(team: &str) -> String {
    format!("{SSID_PREFIX}{}", team.to_uppercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl WifiCredentials {
    /// Look `team` up in `passwords`: exact key first, then case-insensitively.
    pub fn for_team(passwords: &WifiPasswords, team: &str) -> Result<Self> {
        let password = passwords
            .get(team)
            .or_else(|| {
                passwords
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(team))
                    .map(|(_, v)| v)
            })
            .ok_or_else(|| ProvisionError::CredentialsMissing {
                team: team.to_string(),
            })?;
        Ok(Self {
            ssid: ssid_for(team),
            password: password.clone(),
        })
    }

    /// File body the tablet app reads: SSID line, then password line.
    pub fn render(&self) -> String {
        format!("{}\n{}\n", self.ssid, self.password)
    }
}
