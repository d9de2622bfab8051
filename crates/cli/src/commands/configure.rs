use anyhow::{Context, Result};
use cloudflare_speed_core::config::{
    CloudflareConfig, DEFAULT_BASE_URL, GlobalConfig, config_path, load_config, save_config,
};
use std::io::{self, Write};
use std::path::PathBuf;

/// Helper to read user input
fn read_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Show only the first few characters of a token
fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    format!("{}...", visible)
}

/// Pick the new value: empty input keeps `current`, "default" clears it
fn choose_base_url(input: &str, current: Option<String>) -> Option<String> {
    if input.is_empty() {
        current
    } else if input.eq_ignore_ascii_case("default") {
        None
    } else {
        Some(input.trim_end_matches('/').to_string())
    }
}

/// Configure Cloudflare API credentials
pub async fn run(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => config_path()?,
    };

    println!("🔧 Configuring Cloudflare API access...\n");

    let existing = load_config(&path)
        .context("Failed to read config file")?
        .unwrap_or_default();

    println!("📋 You'll need:");
    println!("   1. Cloudflare API Token (Zone > Zone Settings > Edit)");
    println!("      Create at: https://dash.cloudflare.com/profile/api-tokens");
    println!("   2. API base URL (optional, defaults to {})", DEFAULT_BASE_URL);
    println!();

    let current_token = existing.cloudflare.api_token.clone();
    let api_token = if !current_token.is_empty() {
        let input = read_input(&format!(
            "API Token [current: {}]: ",
            mask_token(&current_token)
        ))?;
        if input.is_empty() { current_token } else { input }
    } else {
        read_input("API Token: ")?
    };

    if api_token.is_empty() {
        anyhow::bail!("API token is required");
    }

    let current_url = existing.cloudflare.base_url.clone();
    let prompt = match &current_url {
        Some(url) => format!(
            "Base URL [current: {}] (press Enter to keep, 'default' to reset): ",
            url
        ),
        None => "Base URL (optional, press Enter to skip): ".to_string(),
    };
    let base_url = choose_base_url(&read_input(&prompt)?, current_url);

    let config = GlobalConfig {
        cloudflare: CloudflareConfig {
            api_token,
            base_url,
            timeout_secs: existing.cloudflare.timeout_secs,
        },
    };

    save_config(&path, &config).context("Failed to write config file")?;

    println!();
    println!("✅ Configuration saved to: {}", path.display());
    println!("🚀 Try: cloudflare-speed status --zone <zone-id>");

    Ok(())
}
