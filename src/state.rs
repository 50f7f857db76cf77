use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::clients::clerk::ClerkClient;
use crate::config::Config;
use crate::db::Store;
use crate::identity::IdentityProvider;
use crate::services::{
    OnboardingService, ProfileService, SeaOrmOnboardingService, SeaOrmProfileService,
};

/// Build the HTTP client used for identity provider calls.
fn build_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("medfolio/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .context("Failed to build HTTP client")
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub identity: Arc<dyn IdentityProvider>,

    pub onboarding_service: Arc<dyn OnboardingService>,

    pub profile_service: Arc<dyn ProfileService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_http_client(config.identity.request_timeout_seconds)?;
        let identity = Arc::new(
            ClerkClient::new(&config.identity, http_client)
                .context("Failed to configure identity provider")?,
        ) as Arc<dyn IdentityProvider>;

        Self::with_identity(config, identity).await
    }

    /// Builds state around a caller-supplied identity provider.
    pub async fn with_identity(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let onboarding_service = Arc::new(SeaOrmOnboardingService::new(
            store.clone(),
            identity.clone(),
        )) as Arc<dyn OnboardingService>;

        let profile_service =
            Arc::new(SeaOrmProfileService::new(store.clone())) as Arc<dyn ProfileService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            identity,
            onboarding_service,
            profile_service,
        })
    }
}
