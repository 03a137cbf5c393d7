use std::sync::Arc;

use anyhow::{Context, Result};
use portal_accounts::AccountServices;
use portal_config::AppConfig;
use portal_directory::{HttpDirectoryClient, HttpMailer};
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Process-wide handles shared by every account request.
#[derive(Clone, Debug)]
pub struct PortalServices {
    pub accounts: AccountServices,
}

impl PortalServices {
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        let directory = HttpDirectoryClient::new(&config.directory).with_context(|| {
            format!(
                "failed to build directory client for {}",
                config.directory.base_url
            )
        })?;
        let mailer = HttpMailer::new(&config.mailer)
            .with_context(|| format!("failed to build mailer for {}", config.mailer.base_url))?;

        let accounts = AccountServices::from_config(config, Arc::new(directory), Arc::new(mailer));

        info!(
            sitekey = %config.session.sitekey,
            directory = %config.directory.base_url,
            mailer = %config.mailer.base_url,
            "account services initialised"
        );

        Ok(Self { accounts })
    }
}
