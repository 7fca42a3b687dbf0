use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("adb not found on PATH: install the Android platform tools or pass --adb")]
    BridgeNotInstalled,

    #[error("failed to spawn '{command}': {reason}")]
    BridgeSpawn { command: String, reason: String },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("missing local asset: {}", .0.display())]
    AssetMissing(PathBuf),

    #[error("archive {} has no entry '{entry}'", archive.display())]
    ArchiveEntryMissing { archive: PathBuf, entry: String },

    #[error("malformed archive: {0}")]
    Archive(String),

    #[error("download of '{url}' failed: {reason}")]
    Download { url: String, reason: String },

    #[error("no WiFi password configured for team '{team}'")]
    CredentialsMissing { team: String },

    #[error("invalid serial number '{0}': must be non-empty with no whitespace")]
    InvalidSerial(String),

    #[error("invalid team code '{0}': must be letters, digits, '-' or '_'")]
    InvalidTeamCode(String),

    #[error("invalid part code '{0}': must be letters, digits, '-' or '_'")]
    InvalidPartCode(String),

    #[error("expected '<serial> <team> <part>', got '{0}'")]
    InvalidRequestLine(String),

    #[error("operator input closed before confirmation")]
    OperatorAborted,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
