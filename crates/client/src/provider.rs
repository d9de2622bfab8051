use async_trait::async_trait;
use cloudflare_speed_core::CloudflareConfig;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cloudflare::{CloudflareClient, cancellable};
use crate::error::Result;

/// Supplies an authenticated client handle on demand.
///
/// The façade never owns the client; which implementation is injected
/// decides whether the handle is shared process-wide or per scope.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    async fn get(&self, cancel: Option<&CancellationToken>) -> Result<Arc<CloudflareClient>>;
}

/// Builds the client on first use and shares it afterwards
pub struct CachedClientProvider {
    config: CloudflareConfig,
    client: OnceCell<Arc<CloudflareClient>>,
}

impl CachedClientProvider {
    pub fn new(config: CloudflareConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }
}

#[async_trait]
impl ClientProvider for CachedClientProvider {
    async fn get(&self, cancel: Option<&CancellationToken>) -> Result<Arc<CloudflareClient>> {
        let init = self.client.get_or_try_init(|| async {
            debug!(base_url = %self.config.base_url(), "Building Cloudflare client");
            CloudflareClient::new(&self.config).map(Arc::new)
        });
        let client = cancellable(cancel, init).await?;
        Ok(Arc::clone(client))
    }
}

/// Hands out a client built elsewhere
pub struct StaticClientProvider {
    client: Arc<CloudflareClient>,
}

impl StaticClientProvider {
    pub fn new(client: CloudflareClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl ClientProvider for StaticClientProvider {
    async fn get(&self, cancel: Option<&CancellationToken>) -> Result<Arc<CloudflareClient>> {
        cancellable(cancel, async { Ok(Arc::clone(&self.client)) }).await
    }
}
