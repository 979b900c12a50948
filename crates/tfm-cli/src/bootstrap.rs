use std::path::Path;

use anyhow::Context;
use tfm_api::TfcClient;
use tfm_config::MigrateConfig;

/// Source and target clients for one run.
pub struct Clients {
    pub source: TfcClient,
    pub target: TfcClient,
}

pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<MigrateConfig> {
    load_dotenv()?;
    let config = MigrateConfig::load(explicit).context("failed to load tfmigrate configuration")?;
    config.source.require("source")?;
    config.target.require("target")?;
    Ok(config)
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}

/// Build both clients and check that each token authenticates.
pub async fn connect(config: &MigrateConfig) -> anyhow::Result<Clients> {
    let source = TfcClient::new(&config.source, &config.http).context("failed to build source client")?;
    let target = TfcClient::new(&config.target, &config.http).context("failed to build target client")?;

    for (side, client) in [("source", &source), ("target", &target)] {
        let account = client
            .account_details()
            .await
            .with_context(|| format!("unable to authenticate against the {side} at {}", client.base_url()))?;
        tracing::info!(
            side,
            host = client.hostname(),
            organization = client.organization(),
            user = %account.attributes.username,
            "configured"
        );
    }

    Ok(Clients { source, target })
}
