//! Device workflows.
//!
//! `provision` drives a tablet through wipe, install, configuration and
//! recording, optionally looping on to further tablets; `reset` only wipes, device after device. Both talk to the
//! tablet exclusively through a `DeviceBridge` and to the human through an
//! `Operator`.

pub mod provision;
pub mod reset;
pub mod state;

pub use provision::{ProvisionOutcome, ProvisionRequest, Provisioner, Sleeper, ThreadSleeper};
pub use reset::reset_loop;
pub use state::{DeviceSession, ProvisionState};
