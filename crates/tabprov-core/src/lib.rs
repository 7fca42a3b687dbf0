pub mod assets;
pub mod bridge;
pub mod config;
pub mod credentials;
pub mod error;
pub mod io;
pub mod operator;
pub mod orchestrator;
pub mod paths;
pub mod push;
pub mod record;

#[cfg(test)]
mod testing;

pub use error::{ProvisionError, Result};
