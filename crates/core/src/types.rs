use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Zone-level speed settings exposed by the façade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedSetting {
    SpeedBrain,
    Fonts,
    EarlyHints,
    ZeroRtt,
}

/// How a setting encodes its boolean on the wire.
///
/// Speed Brain and fonts have dedicated sub-resources taking `{"value":"on"}`;
/// Early Hints and 0-RTT go through the string-keyed settings endpoint and
/// take `{"enabled":true}`. The remote API is inconsistent here, not us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireStyle {
    OnOff,
    EnabledFlag,
}

impl SpeedSetting {
    pub const ALL: [SpeedSetting; 4] = [
        SpeedSetting::SpeedBrain,
        SpeedSetting::Fonts,
        SpeedSetting::EarlyHints,
        SpeedSetting::ZeroRtt,
    ];

    /// Path segment under `/zones/{zone_id}/settings/`
    pub fn path_segment(self) -> &'static str {
        match self {
            SpeedSetting::SpeedBrain => "speed_brain",
            SpeedSetting::Fonts => "fonts",
            SpeedSetting::EarlyHints => "early_hints",
            SpeedSetting::ZeroRtt => "0rtt",
        }
    }

    /// Human-readable name used in log lines and CLI output
    pub fn display_name(self) -> &'static str {
        match self {
            SpeedSetting::SpeedBrain => "Speed Brain",
            SpeedSetting::Fonts => "font optimization",
            SpeedSetting::EarlyHints => "Early Hints",
            SpeedSetting::ZeroRtt => "0-RTT",
        }
    }

    pub fn wire_style(self) -> WireStyle {
        match self {
            SpeedSetting::SpeedBrain | SpeedSetting::Fonts => WireStyle::OnOff,
            SpeedSetting::EarlyHints | SpeedSetting::ZeroRtt => WireStyle::EnabledFlag,
        }
    }

    /// Minimal PATCH payload for this setting
    pub fn request_body(self, enabled: bool) -> serde_json::Value {
        match self.wire_style() {
            WireStyle::OnOff => serde_json::json!(OnOffRequest::new(enabled)),
            WireStyle::EnabledFlag => serde_json::json!(EnabledRequest { enabled }),
        }
    }
}

impl fmt::Display for SpeedSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SpeedSetting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "speed_brain" | "speedbrain" | "brain" => Ok(SpeedSetting::SpeedBrain),
            "fonts" | "font" | "font_optimization" => Ok(SpeedSetting::Fonts),
            "early_hints" | "earlyhints" | "hints" => Ok(SpeedSetting::EarlyHints),
            "0rtt" | "0_rtt" | "zero_rtt" | "zerortt" => Ok(SpeedSetting::ZeroRtt),
            _ => Err(Error::UnknownSetting(s.to_string())),
        }
    }
}

/// Enumerated on/off value used by the dedicated setting sub-resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    pub fn is_on(self) -> bool {
        self == OnOff::On
    }
}

impl From<bool> for OnOff {
    fn from(enabled: bool) -> Self {
        if enabled { OnOff::On } else { OnOff::Off }
    }
}

impl fmt::Display for OnOff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnOff::On => f.write_str("on"),
            OnOff::Off => f.write_str("off"),
        }
    }
}

/// PATCH body for Speed Brain and fonts: `{"value":"on"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnOffRequest {
    pub value: OnOff,
}

impl OnOffRequest {
    pub fn new(enabled: bool) -> Self {
        Self {
            value: OnOff::from(enabled),
        }
    }
}

/// PATCH body for string-keyed settings: `{"enabled":true}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledRequest {
    pub enabled: bool,
}

/// Error or informational message in the v4 envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single zone setting as returned in `result`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSetting<V> {
    pub id: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub value: Option<V>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<DateTime<Utc>>,
    /// Fields this crate does not model, kept so the payload stays intact
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response envelope for every get/patch of a speed setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingResponse<V> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    #[serde(default = "Option::default")]
    pub result: Option<ZoneSetting<V>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Values that can be read as an on/off toggle
pub trait AsToggle {
    fn as_toggle(&self) -> Option<bool>;
}

impl AsToggle for OnOff {
    fn as_toggle(&self) -> Option<bool> {
        Some(self.is_on())
    }
}

impl AsToggle for serde_json::Value {
    fn as_toggle(&self) -> Option<bool> {
        match self {
            serde_json::Value::Bool(b) => Some(*b),
            serde_json::Value::String(s) => match s.as_str() {
                "on" => Some(true),
                "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl<V: AsToggle> ZoneSetting<V> {
    /// `enabled` when the API sent it, otherwise `value` read as on/off
    pub fn is_enabled(&self) -> Option<bool> {
        self.enabled
            .or_else(|| self.value.as_ref().and_then(AsToggle::as_toggle))
    }
}

impl<V: AsToggle> SettingResponse<V> {
    pub fn is_enabled(&self) -> Option<bool> {
        self.result.as_ref().and_then(ZoneSetting::is_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_segments() {
        assert_eq!(SpeedSetting::SpeedBrain.path_segment(), "speed_brain");
        assert_eq!(SpeedSetting::Fonts.path_segment(), "fonts");
        assert_eq!(SpeedSetting::EarlyHints.path_segment(), "early_hints");
        assert_eq!(SpeedSetting::ZeroRtt.path_segment(), "0rtt");
    }

    #[test]
    fn test_parse_setting_aliases() {
        assert_eq!(
            "speed-brain".parse::<SpeedSetting>().unwrap(),
            SpeedSetting::SpeedBrain
        );
        assert_eq!("Fonts".parse::<SpeedSetting>().unwrap(), SpeedSetting::Fonts);
        assert_eq!(
            "early_hints".parse::<SpeedSetting>().unwrap(),
            SpeedSetting::EarlyHints
        );
        assert_eq!("0rtt".parse::<SpeedSetting>().unwrap(), SpeedSetting::ZeroRtt);
        assert_eq!("zero-rtt".parse::<SpeedSetting>().unwrap(), SpeedSetting::ZeroRtt);
        assert!("brotli".parse::<SpeedSetting>().is_err());
    }

    #[test]
    fn test_request_bodies_keep_wire_asymmetry() {
        assert_eq!(SpeedSetting::SpeedBrain.request_body(true), json!({"value": "on"}));
        assert_eq!(SpeedSetting::Fonts.request_body(false), json!({"value": "off"}));
        assert_eq!(SpeedSetting::EarlyHints.request_body(true), json!({"enabled": true}));
        assert_eq!(SpeedSetting::ZeroRtt.request_body(false), json!({"enabled": false}));
    }

    #[test]
    fn test_decode_speed_brain_envelope() {
        let body = json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": {
                "id": "speed_brain",
                "value": "on",
                "editable": true,
                "modified_on": "2024-06-01T12:00:00Z"
            }
        });
        let response: SettingResponse<OnOff> = serde_json::from_value(body).unwrap();
        let result = response.result.as_ref().unwrap();
        assert_eq!(result.id, "speed_brain");
        assert_eq!(result.value, Some(OnOff::On));
        assert_eq!(result.editable, Some(true));
        assert!(result.modified_on.is_some());
        assert_eq!(response.is_enabled(), Some(true));
    }

    #[test]
    fn test_generic_setting_prefers_enabled_flag() {
        let body = json!({
            "success": true,
            "result": { "id": "early_hints", "value": "off", "enabled": true }
        });
        let response: SettingResponse<serde_json::Value> = serde_json::from_value(body).unwrap();
        assert!(response.errors.is_empty());
        assert_eq!(response.is_enabled(), Some(true));
    }

    #[test]
    fn test_generic_setting_without_result() {
        let body = json!({
            "success": false,
            "errors": [{ "code": 1003, "message": "Invalid zone" }]
        });
        let response: SettingResponse<serde_json::Value> = serde_json::from_value(body).unwrap();
        assert_eq!(response.errors[0].code, 1003);
        assert_eq!(response.is_enabled(), None);
    }

    #[test]
    fn test_unmodelled_fields_survive_reencoding() {
        let body = json!({
            "success": true,
            "errors": [],
            "messages": [{ "code": 0, "message": "ok", "source": { "pointer": "/value" } }],
            "result": { "id": "0rtt", "value": "on", "editable": true, "time_remaining": 3600 },
            "result_info": { "count": 1 }
        });
        let response: SettingResponse<serde_json::Value> =
            serde_json::from_value(body.clone()).unwrap();

        let result = response.result.as_ref().unwrap();
        assert_eq!(result.extra.get("time_remaining"), Some(&json!(3600)));
        assert_eq!(response.extra.get("result_info"), Some(&json!({ "count": 1 })));
        assert_eq!(serde_json::to_value(&response).unwrap(), body);
    }
}
