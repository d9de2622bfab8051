//! Typed façade over the zone "Speed" settings.
//!
//! Every operation acquires a client from the injected [`ClientProvider`],
//! logs the attempt, performs exactly one GET or PATCH and returns the
//! decoded envelope. Failures are logged and returned unchanged; nothing
//! is retried or cached here.

use cloudflare_speed_core::{
    CloudflareConfig, EnabledRequest, OnOff, OnOffRequest, SettingResponse, SpeedSetting,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cloudflare::cancellable;
use crate::error::Result;
use crate::provider::{CachedClientProvider, ClientProvider};

/// Response of the dedicated on/off sub-resources (Speed Brain, fonts)
pub type OnOffSettingResponse = SettingResponse<OnOff>;

/// Response of the string-keyed settings endpoint (Early Hints, 0-RTT)
pub type SingleSettingResponse = SettingResponse<Value>;

#[derive(Clone)]
pub struct SpeedSettings {
    provider: Arc<dyn ClientProvider>,
}

impl SpeedSettings {
    pub fn new(provider: Arc<dyn ClientProvider>) -> Self {
        Self { provider }
    }

    /// Façade backed by a lazily built, shared client
    pub fn from_config(config: CloudflareConfig) -> Self {
        Self::new(Arc::new(CachedClientProvider::new(config)))
    }

    // ------------------------------------------------------------------
    // Speed Brain
    // ------------------------------------------------------------------

    pub async fn get_speed_brain_settings(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<OnOffSettingResponse> {
        self.fetch(SpeedSetting::SpeedBrain, zone_id, cancel).await
    }

    pub async fn update_speed_brain_settings(
        &self,
        zone_id: &str,
        enabled: bool,
        cancel: Option<&CancellationToken>,
    ) -> Result<OnOffSettingResponse> {
        let body = OnOffRequest::new(enabled);
        self.store(SpeedSetting::SpeedBrain, zone_id, enabled, Write::Update, &body, cancel)
            .await
    }

    pub async fn enable_speed_brain(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<OnOffSettingResponse> {
        let body = OnOffRequest::new(true);
        self.store(SpeedSetting::SpeedBrain, zone_id, true, Write::Enable, &body, cancel)
            .await
    }

    pub async fn disable_speed_brain(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<OnOffSettingResponse> {
        let body = OnOffRequest::new(false);
        self.store(SpeedSetting::SpeedBrain, zone_id, false, Write::Disable, &body, cancel)
            .await
    }

    // ------------------------------------------------------------------
    // Font optimization
    // ------------------------------------------------------------------

    pub async fn get_font_settings(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<OnOffSettingResponse> {
        self.fetch(SpeedSetting::Fonts, zone_id, cancel).await
    }

    pub async fn update_font_settings(
        &self,
        zone_id: &str,
        enabled: bool,
        cancel: Option<&CancellationToken>,
    ) -> Result<OnOffSettingResponse> {
        let body = OnOffRequest::new(enabled);
        self.store(SpeedSetting::Fonts, zone_id, enabled, Write::Update, &body, cancel)
            .await
    }

    pub async fn enable_font_optimization(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<OnOffSettingResponse> {
        let body = OnOffRequest::new(true);
        self.store(SpeedSetting::Fonts, zone_id, true, Write::Enable, &body, cancel)
            .await
    }

    pub async fn disable_font_optimization(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<OnOffSettingResponse> {
        let body = OnOffRequest::new(false);
        self.store(SpeedSetting::Fonts, zone_id, false, Write::Disable, &body, cancel)
            .await
    }

    // ------------------------------------------------------------------
    // Early Hints
    // ------------------------------------------------------------------

    pub async fn get_early_hints_settings(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        self.fetch(SpeedSetting::EarlyHints, zone_id, cancel).await
    }

    pub async fn update_early_hints_settings(
        &self,
        zone_id: &str,
        enabled: bool,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        let body = EnabledRequest { enabled };
        self.store(SpeedSetting::EarlyHints, zone_id, enabled, Write::Update, &body, cancel)
            .await
    }

    pub async fn enable_early_hints(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        let body = EnabledRequest { enabled: true };
        self.store(SpeedSetting::EarlyHints, zone_id, true, Write::Enable, &body, cancel)
            .await
    }

    pub async fn disable_early_hints(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        let body = EnabledRequest { enabled: false };
        self.store(SpeedSetting::EarlyHints, zone_id, false, Write::Disable, &body, cancel)
            .await
    }

    // ------------------------------------------------------------------
    // 0-RTT connection resumption
    // ------------------------------------------------------------------

    pub async fn get_zero_rtt_settings(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        self.fetch(SpeedSetting::ZeroRtt, zone_id, cancel).await
    }

    pub async fn update_zero_rtt_settings(
        &self,
        zone_id: &str,
        enabled: bool,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        let body = EnabledRequest { enabled };
        self.store(SpeedSetting::ZeroRtt, zone_id, enabled, Write::Update, &body, cancel)
            .await
    }

    pub async fn enable_zero_rtt(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        let body = EnabledRequest { enabled: true };
        self.store(SpeedSetting::ZeroRtt, zone_id, true, Write::Enable, &body, cancel)
            .await
    }

    pub async fn disable_zero_rtt(
        &self,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        let body = EnabledRequest { enabled: false };
        self.store(SpeedSetting::ZeroRtt, zone_id, false, Write::Disable, &body, cancel)
            .await
    }

    // ------------------------------------------------------------------
    // Setting-generic entry points
    // ------------------------------------------------------------------

    /// Read any speed setting, leaving the value undecoded
    pub async fn get(
        &self,
        setting: SpeedSetting,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        self.fetch(setting, zone_id, cancel).await
    }

    /// Write any speed setting using its own payload shape
    pub async fn set(
        &self,
        setting: SpeedSetting,
        zone_id: &str,
        enabled: bool,
        cancel: Option<&CancellationToken>,
    ) -> Result<SingleSettingResponse> {
        let body = setting.request_body(enabled);
        self.store(setting, zone_id, enabled, Write::Update, &body, cancel).await
    }

    async fn fetch<V: DeserializeOwned>(
        &self,
        setting: SpeedSetting,
        zone_id: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<SettingResponse<V>> {
        info!(
            zone_id,
            setting = setting.path_segment(),
            "Getting {} settings for zone {}",
            setting,
            zone_id
        );

        let result: Result<SettingResponse<V>> = async {
            let client = self.provider.get(cancel).await?;
            let url = client.zone_setting_url(zone_id, setting.path_segment())?;
            cancellable(cancel, client.get_json(url)).await
        }
        .await;

        if let Err(e) = &result {
            error!(
                zone_id,
                setting = setting.path_segment(),
                error = %e,
                "Error getting {} settings for zone {}",
                setting,
                zone_id
            );
        }
        result
    }

    async fn store<B, V>(
        &self,
        setting: SpeedSetting,
        zone_id: &str,
        enabled: bool,
        write: Write,
        body: &B,
        cancel: Option<&CancellationToken>,
    ) -> Result<SettingResponse<V>>
    where
        B: Serialize + Sync + ?Sized,
        V: DeserializeOwned,
    {
        info!(
            zone_id,
            setting = setting.path_segment(),
            enabled,
            "{}",
            write.attempt(setting, zone_id, enabled)
        );

        let result: Result<SettingResponse<V>> = async {
            let client = self.provider.get(cancel).await?;
            let url = client.zone_setting_url(zone_id, setting.path_segment())?;
            cancellable(cancel, client.patch_json(url, body)).await
        }
        .await;

        if let Err(e) = &result {
            error!(
                zone_id,
                setting = setting.path_segment(),
                enabled,
                error = %e,
                "{}",
                write.failure(setting, zone_id)
            );
        }
        result
    }
}

/// Which public operation issued a PATCH; only the log wording differs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Write {
    Update,
    Enable,
    Disable,
}

impl Write {
    fn attempt(self, setting: SpeedSetting, zone_id: &str, enabled: bool) -> String {
        match self {
            Write::Update => format!(
                "Updating {} settings for zone {} to {}",
                setting, zone_id, enabled
            ),
            Write::Enable => format!("Enabling {} for zone {}", setting, zone_id),
            Write::Disable => format!("Disabling {} for zone {}", setting, zone_id),
        }
    }

    fn failure(self, setting: SpeedSetting, zone_id: &str) -> String {
        match self {
            Write::Update => format!("Error updating {} settings for zone {}", setting, zone_id),
            Write::Enable => format!("Error enabling {} for zone {}", setting, zone_id),
            Write::Disable => format!("Error disabling {} for zone {}", setting, zone_id),
        }
    }
}
