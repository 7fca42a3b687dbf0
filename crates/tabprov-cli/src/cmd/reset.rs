use crate::output::print_json;
use tabprov_core::config::ProvisionConfig;
use tabprov_core::orchestrator::reset_loop;

pub fn run(config: &ProvisionConfig, count: Option<usize>, json: bool) -> anyhow::Result<()> {
    let mut adb = super::adb(config)?;
    let mut operator = super::terminal_operator(json);

    let wiped = reset_loop(&mut adb, &mut operator, count)?;

    if json {
        print_json(&serde_json::json!({ "wiped": wiped }))?;
    } else {
        println!("Reset {wiped} device(s).");
    }
    Ok(())
}
