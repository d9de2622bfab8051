// Cloudflare v4 API client handle

use cloudflare_speed_core::{ApiMessage, CloudflareConfig, SettingResponse};
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{RemoteCallError, Result};

/// Authenticated handle to the Cloudflare API
#[derive(Debug, Clone)]
pub struct CloudflareClient {
    client: reqwest::Client,
    base_url: Url,
}

/// Error-only view of the envelope, used for non-2xx bodies
#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

impl CloudflareClient {
    /// Create new Cloudflare API client
    pub fn new(config: &CloudflareConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|e| RemoteCallError::Client(format!("invalid API token: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| RemoteCallError::Client(e.to_string()))?;

        let base_url = Url::parse(config.base_url()).map_err(|e| {
            RemoteCallError::Client(format!("invalid base URL '{}': {}", config.base_url(), e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteCallError::Client(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/zones/{zone_id}/settings/{segment}`
    ///
    /// The zone id is pushed as a single path segment, so reserved
    /// characters are percent-encoded rather than interpreted.
    pub fn zone_setting_url(&self, zone_id: &str, segment: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RemoteCallError::Client(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["zones", zone_id, "settings", segment]);
        Ok(url)
    }

    /// GET a setting and decode the envelope
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<SettingResponse<T>> {
        let response = self.client.get(url).send().await?;
        decode_envelope(response).await
    }

    /// PATCH a setting with a JSON body and decode the envelope
    pub async fn patch_json<B, T>(&self, url: Url, body: &B) -> Result<SettingResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.patch(url).json(body).send().await?;
        decode_envelope(response).await
    }
}

async fn decode_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<SettingResponse<T>> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(api_error(status.as_u16(), &body));
    }

    let envelope: SettingResponse<T> = serde_json::from_str(&body)?;
    if !envelope.success {
        let first = envelope.errors.first();
        return Err(RemoteCallError::Api {
            status: status.as_u16(),
            code: first.map(|e| e.code),
            message: first
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "Unknown Cloudflare API error".to_string()),
        });
    }

    Ok(envelope)
}

fn api_error(status: u16, body: &str) -> RemoteCallError {
    let first = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.errors.into_iter().next());

    match first {
        Some(error) => RemoteCallError::Api {
            status,
            code: Some(error.code),
            message: error.message,
        },
        None => {
            let body = body.trim();
            RemoteCallError::Api {
                status,
                code: None,
                message: if body.is_empty() {
                    "empty response body".to_string()
                } else {
                    body.to_string()
                },
            }
        }
    }
}

/// Race `fut` against the caller's token.
///
/// When the token fires first the request future is dropped, which aborts
/// the in-flight HTTP call.
pub async fn cancellable<F, T>(cancel: Option<&CancellationToken>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match cancel {
        None => fut.await,
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(RemoteCallError::Cancelled),
                result = fut => result,
            }
        }
    }
}
