use anyhow::Context;

use quality_gate::api;
use quality_gate::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("invalid configuration")?;
    quality_gate::init_tracing(&settings.log_level, settings.log_json);

    tracing::info!("{} starting v{}", settings.app_name, settings.app_version);

    api::serve(settings).await?;
    Ok(())
}
