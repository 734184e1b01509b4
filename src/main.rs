use anyhow::Context;
use gridwatch_kernel::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load gridwatch settings")?;
    gridwatch_app::run(settings).await
}
