use anyhow::{Context, Result};
use chrono::Local;
use cloudflare_speed_client::{SingleSettingResponse, SpeedSettings};
use cloudflare_speed_core::SpeedSetting;
use cloudflare_speed_core::config::{config_path, resolve_config};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::Options;

fn load_settings(opts: &Options) -> Result<SpeedSettings> {
    let path = match &opts.config {
        Some(path) => path.clone(),
        None => config_path()?,
    };
    debug!(path = %path.display(), "Resolving Cloudflare configuration");
    let config = resolve_config(&path).context("Failed to load Cloudflare configuration")?;
    debug!(base_url = %config.base_url(), "Using Cloudflare API");
    Ok(SpeedSettings::from_config(config))
}

fn state_label(enabled: Option<bool>) -> &'static str {
    match enabled {
        Some(true) => "on",
        Some(false) => "off",
        None => "unknown",
    }
}

/// One human-readable line per setting
fn describe(setting: SpeedSetting, response: &SingleSettingResponse) -> String {
    let mut line = format!(
        "{:<18} {}",
        setting.display_name(),
        state_label(response.is_enabled())
    );

    if let Some(result) = &response.result {
        if result.editable == Some(false) {
            line.push_str(" (read-only)");
        }
        if let Some(modified) = result.modified_on {
            line.push_str(&format!(
                "  modified {}",
                modified.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ));
        }
    }
    line
}

fn print_response(
    opts: &Options,
    setting: SpeedSetting,
    response: &SingleSettingResponse,
) -> Result<()> {
    if opts.json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        println!("{}", describe(setting, response));
    }
    Ok(())
}

/// Show the current state of one setting
pub async fn get(
    opts: &Options,
    setting: SpeedSetting,
    zone_id: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    let settings = load_settings(opts)?;
    let response = settings
        .get(setting, zone_id, Some(cancel))
        .await
        .with_context(|| format!("Failed to read {} for zone {}", setting, zone_id))?;
    print_response(opts, setting, &response)
}

/// Turn one setting on or off
pub async fn set(
    opts: &Options,
    setting: SpeedSetting,
    zone_id: &str,
    enabled: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let settings = load_settings(opts)?;
    let response = settings
        .set(setting, zone_id, enabled, Some(cancel))
        .await
        .with_context(|| format!("Failed to update {} for zone {}", setting, zone_id))?;

    if !opts.json {
        println!(
            "✓ {} {} for zone {}",
            setting.display_name(),
            if enabled { "enabled" } else { "disabled" },
            zone_id
        );
    }
    print_response(opts, setting, &response)
}

/// Show all four settings, fetched concurrently
pub async fn status(opts: &Options, zone_id: &str, cancel: &CancellationToken) -> Result<()> {
    let settings = load_settings(opts)?;

    let (speed_brain, fonts, early_hints, zero_rtt) = tokio::try_join!(
        settings.get(SpeedSetting::SpeedBrain, zone_id, Some(cancel)),
        settings.get(SpeedSetting::Fonts, zone_id, Some(cancel)),
        settings.get(SpeedSetting::EarlyHints, zone_id, Some(cancel)),
        settings.get(SpeedSetting::ZeroRtt, zone_id, Some(cancel)),
    )
    .with_context(|| format!("Failed to read speed settings for zone {}", zone_id))?;

    let responses = [
        (SpeedSetting::SpeedBrain, speed_brain),
        (SpeedSetting::Fonts, fonts),
        (SpeedSetting::EarlyHints, early_hints),
        (SpeedSetting::ZeroRtt, zero_rtt),
    ];

    if opts.json {
        let map: serde_json::Map<String, serde_json::Value> = responses
            .iter()
            .map(|(setting, response)| -> Result<(String, serde_json::Value)> {
                Ok((
                    setting.path_segment().to_string(),
                    serde_json::to_value(response)?,
                ))
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }

    println!("⚡ Speed settings for zone {}", zone_id);
    for (setting, response) in &responses {
        println!("   {}", describe(*setting, response));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    fn response(result: serde_json::Value) -> SingleSettingResponse {
        serde_json::from_value(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": result
        }))
        .unwrap()
    }

    #[test]
    fn test_describe_on_off_value() {
        let r = response(json!({ "id": "speed_brain", "value": "on" }));
        let line = describe(SpeedSetting::SpeedBrain, &r);
        assert!(line.starts_with("Speed Brain"));
        assert!(line.ends_with("on"));
    }

    #[test]
    fn test_describe_enabled_flag_read_only() {
        let r = response(json!({ "id": "0rtt", "enabled": false, "editable": false }));
        let line = describe(SpeedSetting::ZeroRtt, &r);
        assert!(line.contains("off"));
        assert!(line.contains("(read-only)"));
    }

    #[test]
    fn test_describe_unknown_state() {
        let r = response(json!({ "id": "early_hints", "value": { "mode": "auto" } }));
        assert!(describe(SpeedSetting::EarlyHints, &r).contains("unknown"));
    }

    #[test]
    fn test_describe_includes_modified_time() {
        let r = response(json!({
            "id": "fonts",
            "value": "off",
            "modified_on": "2024-06-01T12:00:00Z"
        }));
        assert!(describe(SpeedSetting::Fonts, &r).contains("modified 2024-06-0"));
    }

    #[test]
    fn test_state_label() {
        assert_eq!(state_label(Some(true)), "on");
        assert_eq!(state_label(Some(false)), "off");
        assert_eq!(state_label(None), "unknown");
    }

    #[test]
    #[traced_test]
    fn test_load_settings_reports_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[cloudflare]\napi_token = \"file-token\"\nbase_url = \"http://127.0.0.1:9\"\n",
        )
        .unwrap();

        let opts = Options {
            json: false,
            config: Some(path.clone()),
        };
        assert!(load_settings(&opts).is_ok());
        assert!(logs_contain("Resolving Cloudflare configuration"));
        assert!(logs_contain(&path.display().to_string()));
    }
}
