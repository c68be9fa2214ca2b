#![cfg_attr(feature = "desktop", windows_subsystem = "windows")]

use anyhow::Context;
use automata::domain::config::AppSettings;
use automata::kernel::app::Application;
use automata::kernel::config::load_config;
use automata_desktop::{DesktopShell, init_logging};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let settings: AppSettings =
        load_config(None::<&str>).context("Critical: Configuration is malformed")?;
    let _log = init_logging(&settings)?;

    let shell = DesktopShell::new();
    let app = Application::builder()
        .catalog(automata::catalog())
        .settings(settings)
        .shell(shell.clone())
        .build()?;

    if !app.start(automata::FEATURES) {
        error!("Application failed to start");
        std::process::exit(1);
    }
    info!(status = ?app.get_status().features.features.keys().collect::<Vec<_>>(), "Features ready");

    run(&app, &shell)
}

#[cfg(feature = "desktop")]
fn run(app: &Application, shell: &DesktopShell) -> anyhow::Result<()> {
    let plan = shell.plan().context("Desktop shell was not configured")?;
    automata_desktop::DesktopApp::new(plan, app.context().endpoints()?).launch();
    Ok(())
}

#[cfg(not(feature = "desktop"))]
fn run(app: &Application, _shell: &DesktopShell) -> anyhow::Result<()> {
    let status = serde_json::to_string_pretty(&app.get_status())?;
    info!("Running headless; build with `--features desktop` for the web-view\n{status}");
    Ok(())
}
