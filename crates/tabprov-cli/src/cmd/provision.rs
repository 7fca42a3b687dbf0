use crate::output::print_json;
use anyhow::Context;
use std::path::PathBuf;
use tabprov_core::config::ProvisionConfig;
use tabprov_core::credentials::load_wifi_passwords;
use tabprov_core::operator::Operator;
use tabprov_core::orchestrator::{ProvisionRequest, Provisioner};

pub struct Args {
    pub serial_number: String,
    pub team_code: String,
    pub part_code: String,
    pub wifi_credentials_file: PathBuf,
    pub batch: bool,
}

pub fn run(config: &ProvisionConfig, args: &Args, json: bool) -> anyhow::Result<()> {
    // Credentials and codes are checked before the tablet is touched.
    let passwords = load_wifi_passwords(&args.wifi_credentials_file).with_context(|| {
        format!(
            "failed to load WiFi credentials from {}",
            args.wifi_credentials_file.display()
        )
    })?;
    let request = ProvisionRequest::new(
        &args.serial_number,
        &args.team_code,
        &args.part_code,
        &passwords,
    )?;

    let mut adb = super::adb(config)?;
    let mut operator = super::terminal_operator(json);
    operator.say(
        &format!("Using WiFi network '{}'.", request.wifi.ssid),
        true,
    );

    let mut provisioner = Provisioner::new(&mut adb, &mut operator, config);
    let outcomes = if args.batch {
        provisioner
            .run_batch(&request, &passwords)
            .context("provisioning session failed")?
    } else {
        vec![provisioner
            .run(&request)
            .with_context(|| format!("provisioning {} failed", args.serial_number))?]
    };

    if json {
        return match (args.batch, outcomes.first()) {
            (false, Some(outcome)) => print_json(outcome),
            _ => print_json(&outcomes),
        };
    }
    for path in outcomes.iter().filter_map(|o| o.record_path.as_ref()) {
        println!("Wrote {}", path.display());
    }
    println!("DONE!");
    Ok(())
}
