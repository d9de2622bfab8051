// Cloudflare zone speed settings: client handle, provider seam and façade

pub mod cloudflare;
pub mod error;
pub mod provider;
pub mod speed;

pub use cloudflare::CloudflareClient;
pub use error::{RemoteCallError, Result};
pub use provider::{CachedClientProvider, ClientProvider, StaticClientProvider};
pub use speed::{OnOffSettingResponse, SingleSettingResponse, SpeedSettings};
