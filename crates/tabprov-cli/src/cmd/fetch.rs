use tabprov_core::assets;
use tabprov_core::config::ProvisionConfig;

pub fn run(config: &ProvisionConfig) -> anyhow::Result<()> {
    let mut operator = super::terminal_operator(false);
    assets::prepare_browser(&config.browser, &mut operator)?;
    println!("{}", config.browser.apk.display());
    Ok(())
}
