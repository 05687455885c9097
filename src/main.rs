use cet_easy_install::config::InstallerConfig;
use cet_easy_install::report;
use cet_install_engine::InstallLifecycle;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = InstallerConfig::load()?;

    let default_level = cfg.log_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("CET Easy Install v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Work directory: {}", cfg.engine.resolve_work_dir().display());

    let lifecycle = InstallLifecycle::from_config(&cfg.engine)?;
    let report = report::build_startup_report(&cfg.engine, &lifecycle).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
