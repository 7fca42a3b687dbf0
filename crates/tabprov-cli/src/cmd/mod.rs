pub mod fetch;
pub mod provision;
pub mod reset;

use std::io::Write;
use tabprov_core::bridge::Adb;
use tabprov_core::config::ProvisionConfig;
use tabprov_core::operator::TerminalOperator;

/// Bench operator on the terminal. With `--json`, progress goes to stderr so
/// stdout carries only the JSON document.
pub(crate) fn terminal_operator(
    json: bool,
) -> TerminalOperator<std::io::StdinLock<'static>, Box<dyn Write>> {
    let out: Box<dyn Write> = if json {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };
    TerminalOperator::new(std::io::stdin().lock(), out)
}

pub(crate) fn adb(config: &ProvisionConfig) -> anyhow::Result<Adb> {
    Ok(Adb::resolve(config.adb_path.as_deref())?)
}
